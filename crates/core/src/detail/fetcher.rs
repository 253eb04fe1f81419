//! Detail fetch state machine.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{DetailError, DetailPhase, DetailSnapshot, MAX_USER_RATING, MIN_USER_RATING};
use crate::catalog::{Catalog, CatalogError, MovieDetail};
use crate::config::AppConfig;
use crate::fetch::{spawn_cancellable, InFlight};
use crate::metrics::{DETAIL_FETCHES, STALE_RESPONSES};
use crate::title::{TitleGuard, TitleSink};

const COMPONENT: &str = "detail";

static IDLE: DetailPhase = DetailPhase::Idle;

/// Outcome of one detail fetch, keyed by the session that issued it.
#[derive(Debug)]
pub struct DetailCompletion {
    /// Serial of the session that issued the fetch.
    pub session: u64,
    /// Selected id the fetch was issued for.
    pub id: String,
    /// Catalog outcome.
    pub outcome: Result<MovieDetail, CatalogError>,
}

/// State owned by one selection. Dropping it cancels the fetch and
/// releases the title override.
#[derive(Debug)]
struct DetailSession {
    serial: u64,
    id: String,
    phase: DetailPhase,
    user_rating: Option<u8>,
    rating_revisions: u32,
    title: Option<TitleGuard>,
    in_flight: Option<InFlight>,
}

impl DetailSession {
    fn snapshot(&self) -> DetailSnapshot {
        DetailSnapshot {
            id: self.id.clone(),
            phase: self.phase.clone(),
            user_rating: self.user_rating,
            rating_revisions: self.rating_revisions,
        }
    }
}

/// Fetches and holds the detail for the current selection.
pub struct DetailFetcher {
    catalog: Arc<dyn Catalog>,
    title: Arc<dyn TitleSink>,
    default_title: String,
    title_prefix: String,
    next_serial: u64,
    active: Option<DetailSession>,
    completions_tx: mpsc::UnboundedSender<DetailCompletion>,
    completions_rx: mpsc::UnboundedReceiver<DetailCompletion>,
}

impl DetailFetcher {
    /// Create an idle fetcher.
    pub fn new(catalog: Arc<dyn Catalog>, title: Arc<dyn TitleSink>, config: &AppConfig) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        Self {
            catalog,
            title,
            default_title: config.default_title.clone(),
            title_prefix: config.title_prefix.clone(),
            next_serial: 0,
            active: None,
            completions_tx,
            completions_rx,
        }
    }

    /// Current phase; `Idle` when nothing is selected.
    pub fn phase(&self) -> &DetailPhase {
        self.active.as_ref().map_or(&IDLE, |s| &s.phase)
    }

    /// Id of the open session.
    pub fn selected_id(&self) -> Option<&str> {
        self.active.as_ref().map(|s| s.id.as_str())
    }

    /// Snapshot of the open session.
    pub fn snapshot(&self) -> Option<DetailSnapshot> {
        self.active.as_ref().map(DetailSession::snapshot)
    }

    /// The loaded detail, if the session is `Ready`.
    pub fn ready_detail(&self) -> Option<&MovieDetail> {
        self.phase().detail()
    }

    /// Provisional rating for the open session.
    pub fn user_rating(&self) -> Option<u8> {
        self.active.as_ref().and_then(|s| s.user_rating)
    }

    /// How many times the provisional rating changed in the open session.
    pub fn rating_revisions(&self) -> u32 {
        self.active.as_ref().map_or(0, |s| s.rating_revisions)
    }

    /// Open a session for `id`, replacing any open session.
    ///
    /// The session enters `Loading` immediately. Returns its serial.
    /// Must be called from within a Tokio runtime.
    pub fn open(&mut self, id: impl Into<String>) -> u64 {
        let id = id.into();

        // Tear down the previous session before the new one starts.
        self.active = None;

        self.next_serial += 1;
        let serial = self.next_serial;

        let catalog = Arc::clone(&self.catalog);
        let tx = self.completions_tx.clone();
        let fetch_id = id.clone();
        let reply_id = id.clone();

        debug!(session = serial, "Fetching detail for {}", id);

        let in_flight = spawn_cancellable(
            COMPONENT,
            async move { catalog.movie(&fetch_id).await },
            move |outcome| {
                let _ = tx.send(DetailCompletion {
                    session: serial,
                    id: reply_id,
                    outcome,
                });
            },
        );

        self.active = Some(DetailSession {
            serial,
            id,
            phase: DetailPhase::Loading,
            user_rating: None,
            rating_revisions: 0,
            title: None,
            in_flight: Some(in_flight),
        });

        serial
    }

    /// Close the open session. Returns whether one was open.
    pub fn close(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Record a provisional rating. Returns the revision count.
    ///
    /// Each change of value counts as one revision; re-submitting the same
    /// rating does not.
    pub fn set_user_rating(&mut self, rating: u8) -> Result<u32, DetailError> {
        let session = self.active.as_mut().ok_or(DetailError::NoSelection)?;

        if !(MIN_USER_RATING..=MAX_USER_RATING).contains(&rating) {
            return Err(DetailError::InvalidRating(rating));
        }
        if !matches!(session.phase, DetailPhase::Ready(_)) {
            return Err(DetailError::NotReady);
        }

        if session.user_rating != Some(rating) {
            session.user_rating = Some(rating);
            session.rating_revisions += 1;
        }

        Ok(session.rating_revisions)
    }

    /// Wait for the next fetch to report back.
    ///
    /// Cancel-safe; pends forever while nothing is outstanding.
    pub async fn next_completion(&mut self) -> DetailCompletion {
        match self.completions_rx.recv().await {
            Some(completion) => completion,
            None => std::future::pending().await,
        }
    }

    /// Apply a completion. Returns whether the state changed.
    ///
    /// Completions that do not belong to the open session are discarded.
    pub fn apply(&mut self, completion: DetailCompletion) -> bool {
        let cancelled = matches!(completion.outcome, Err(CatalogError::Cancelled));

        let Some(session) = self
            .active
            .as_mut()
            .filter(|s| s.serial == completion.session && s.id == completion.id)
        else {
            debug!(
                session = completion.session,
                "Discarding detail response for abandoned selection {}",
                completion.id
            );
            if !cancelled {
                STALE_RESPONSES.with_label_values(&[COMPONENT]).inc();
            }
            return false;
        };

        match completion.outcome {
            Err(CatalogError::Cancelled) => false,
            Ok(detail) => {
                DETAIL_FETCHES.with_label_values(&["ok"]).inc();
                let title = format!("{}{}", self.title_prefix, detail.title);
                session.in_flight = None;
                session.title = Some(TitleGuard::acquire(
                    Arc::clone(&self.title),
                    &title,
                    self.default_title.clone(),
                ));
                session.phase = DetailPhase::Ready(detail);
                true
            }
            Err(err) => {
                warn!("Failed to load details for {}: {}", completion.id, err);
                DETAIL_FETCHES.with_label_values(&[err.label()]).inc();
                session.in_flight = None;
                session.phase = DetailPhase::Failed(err.to_string());
                true
            }
        }
    }

    /// Wait for the next completion and apply it.
    pub async fn settle(&mut self) -> bool {
        let completion = self.next_completion().await;
        self.apply(completion)
    }
}
