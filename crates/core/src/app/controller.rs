//! Application controller.

use std::sync::Arc;

use tracing::{debug, info};

use super::{AppError, Key, KeyOutcome, ResultsPane, Selection, SidePane, View};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::detail::{DetailCompletion, DetailError, DetailFetcher, DetailPhase};
use crate::metrics::WATCHED_MUTATIONS;
use crate::search::{SearchCompletion, SearchPipeline, SearchState};
use crate::store::PersistentStore;
use crate::summary::WatchlistSummary;
use crate::title::TitleSink;
use crate::watched::{WatchedEntry, WatchedList};

/// A network completion from either component.
#[derive(Debug)]
pub enum Completion {
    Search(SearchCompletion),
    Detail(DetailCompletion),
}

/// Owns all client state and wires user actions to it.
///
/// Everything runs on the caller's task: user actions are method calls, and
/// network completions are pulled with [`AppController::next_completion`]
/// and applied with [`AppController::apply`]. Nothing changes state between
/// those calls.
pub struct AppController {
    search: SearchPipeline,
    detail: DetailFetcher,
    watched: WatchedList,
    selection: Selection,
}

impl AppController {
    /// Build a controller and seed the watched list from `store`.
    pub fn new(
        catalog: Arc<dyn Catalog>,
        title: Arc<dyn TitleSink>,
        store: PersistentStore,
        config: &Config,
    ) -> Self {
        Self {
            search: SearchPipeline::new(Arc::clone(&catalog), &config.search),
            detail: DetailFetcher::new(catalog, title, &config.app),
            watched: WatchedList::load(store, config.storage.watched_key.clone()),
            selection: Selection::None,
        }
    }

    pub fn search_state(&self) -> &SearchState {
        self.search.state()
    }

    pub fn query(&self) -> &str {
        &self.search.state().query
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn detail_phase(&self) -> &DetailPhase {
        self.detail.phase()
    }

    pub fn watched(&self) -> &WatchedList {
        &self.watched
    }

    pub fn summary(&self) -> WatchlistSummary {
        self.watched.summary()
    }

    /// Change the search query. Returns whether it changed.
    ///
    /// A change that starts a new search closes any open detail view.
    pub fn set_query(&mut self, query: impl Into<String>) -> bool {
        let query = query.into();
        let starts_search = self.search.is_searchable(&query);

        let changed = self.search.set_query(query);
        if changed && starts_search {
            self.close();
        }
        changed
    }

    /// Select `id`, or deselect it if it is already selected.
    pub fn select(&mut self, id: &str) -> &Selection {
        self.selection = self.selection.toggle(id);

        match self.selection.id() {
            Some(id) => {
                debug!("Selected {}", id);
                self.detail.open(id);
            }
            None => {
                self.detail.close();
            }
        }

        &self.selection
    }

    /// Close the detail view. Returns whether one was open.
    pub fn close(&mut self) -> bool {
        self.selection = Selection::None;
        self.detail.close()
    }

    /// Record the provisional rating for the selected movie.
    pub fn set_user_rating(&mut self, rating: u8) -> Result<u32, AppError> {
        Ok(self.detail.set_user_rating(rating)?)
    }

    /// Append `entry` to the watched list, persist it and close the detail
    /// view. An id already in the list is rejected and nothing changes.
    pub fn add_watched(&mut self, entry: WatchedEntry) -> Result<(), AppError> {
        if self.watched.contains(&entry.id) {
            info!("Rejected duplicate watched entry {}", entry.id);
            WATCHED_MUTATIONS.with_label_values(&["rejected"]).inc();
            return Err(AppError::AlreadyWatched(entry.id));
        }

        self.watched.add(entry);
        self.close();
        Ok(())
    }

    /// Add the selected movie with its provisional rating.
    ///
    /// Unknown catalog rating or runtime are recorded as 0.
    pub fn watch_selected(&mut self) -> Result<WatchedEntry, AppError> {
        let Some(id) = self.selection.id() else {
            return Err(DetailError::NoSelection.into());
        };
        if self.watched.contains(id) {
            return Err(AppError::AlreadyWatched(id.to_string()));
        }

        let detail = self.detail.ready_detail().ok_or(DetailError::NotReady)?;
        let user_rating = self.detail.user_rating().ok_or(AppError::NotRated)?;

        let entry = WatchedEntry {
            id: detail.id.clone(),
            title: detail.title.clone(),
            year: detail.year.clone(),
            poster_url: detail.poster_url.clone(),
            catalog_rating: detail.catalog_rating.unwrap_or(0.0),
            runtime_minutes: detail.runtime_minutes.unwrap_or(0),
            user_rating,
            rating_revision_count: self.detail.rating_revisions(),
        };

        self.add_watched(entry.clone())?;
        Ok(entry)
    }

    /// Remove `id` from the watched list. Returns whether it was there.
    pub fn delete_watched(&mut self, id: &str) -> bool {
        self.watched.remove(id)
    }

    /// React to a key press.
    pub fn handle_key(&mut self, key: Key, query_focused: bool) -> KeyOutcome {
        match key {
            Key::Escape => {
                if self.close() {
                    KeyOutcome::Closed
                } else {
                    KeyOutcome::Ignored
                }
            }
            Key::Enter if !query_focused => {
                self.set_query("");
                KeyOutcome::FocusQuery
            }
            _ => KeyOutcome::Ignored,
        }
    }

    /// Wait for the next network completion.
    ///
    /// Cancel-safe; pends forever while nothing is outstanding.
    pub async fn next_completion(&mut self) -> Completion {
        tokio::select! {
            completion = self.search.next_completion() => Completion::Search(completion),
            completion = self.detail.next_completion() => Completion::Detail(completion),
        }
    }

    /// Apply a completion. Returns whether the state changed.
    pub fn apply(&mut self, completion: Completion) -> bool {
        match completion {
            Completion::Search(completion) => self.search.apply(completion),
            Completion::Detail(completion) => self.detail.apply(completion),
        }
    }

    /// Wait for the next completion and apply it.
    pub async fn settle(&mut self) -> bool {
        let completion = self.next_completion().await;
        self.apply(completion)
    }

    /// Whether a search or detail fetch is still loading.
    pub fn is_busy(&self) -> bool {
        self.search.state().is_loading || self.detail.phase().is_loading()
    }

    /// Decide what to render.
    pub fn view(&self) -> View {
        let state = self.search.state();

        let results = if state.is_loading {
            ResultsPane::Loading
        } else if let Some(message) = &state.error {
            ResultsPane::Error {
                message: message.clone(),
            }
        } else {
            ResultsPane::Results {
                items: state.results.clone(),
            }
        };

        let side = match self.detail.snapshot() {
            Some(detail) => SidePane::Detail {
                watched_rating: self.watched.get(&detail.id).map(|e| e.user_rating),
                detail,
            },
            None => SidePane::Watched {
                summary: self.watched.summary().rounded(),
                entries: self.watched.entries().to_vec(),
            },
        };

        View {
            query: state.query.clone(),
            result_count: state.results.len(),
            results,
            side,
        }
    }
}
