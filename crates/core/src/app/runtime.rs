//! Controller actor.
//!
//! The runtime task owns the [`AppController`]. [`AppHandle`]s send it
//! commands over a channel; the task interleaves those with network
//! completions, one at a time, and publishes a fresh [`AppSnapshot`] after
//! every change.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

use super::{AppController, AppError, Key, KeyOutcome, Selection, View};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::store::PersistentStore;
use crate::summary::WatchlistSummary;
use crate::title::SharedTitle;
use crate::watched::WatchedEntry;

/// The watched list and its aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchedView {
    pub entries: Vec<WatchedEntry>,
    pub summary: WatchlistSummary,
}

/// Everything the front-end needs to render, as of one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppSnapshot {
    /// Increases with every published change.
    pub revision: u64,
    pub title: String,
    pub selection: Selection,
    pub view: View,
    pub watched: WatchedView,
}

enum Command {
    SetQuery {
        query: String,
        reply: oneshot::Sender<bool>,
    },
    Select {
        id: String,
        reply: oneshot::Sender<Selection>,
    },
    Close {
        reply: oneshot::Sender<bool>,
    },
    SetRating {
        rating: u8,
        reply: oneshot::Sender<Result<u32, AppError>>,
    },
    WatchSelected {
        reply: oneshot::Sender<Result<WatchedEntry, AppError>>,
    },
    DeleteWatched {
        id: String,
        reply: oneshot::Sender<bool>,
    },
    Key {
        key: Key,
        query_focused: bool,
        reply: oneshot::Sender<KeyOutcome>,
    },
}

/// Handle for driving the controller.
///
/// This is cheaply cloneable and can be shared across tasks. The runtime
/// stops once every handle has been dropped.
#[derive(Clone)]
pub struct AppHandle {
    tx: mpsc::Sender<Command>,
    snapshot: watch::Receiver<AppSnapshot>,
}

impl AppHandle {
    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, AppError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| AppError::RuntimeStopped)?;
        rx.await.map_err(|_| AppError::RuntimeStopped)
    }

    /// Change the search query. Returns whether it changed.
    pub async fn set_query(&self, query: impl Into<String>) -> Result<bool, AppError> {
        let query = query.into();
        self.request(|reply| Command::SetQuery { query, reply }).await
    }

    /// Select `id`, or deselect it if already selected.
    pub async fn select(&self, id: impl Into<String>) -> Result<Selection, AppError> {
        let id = id.into();
        self.request(|reply| Command::Select { id, reply }).await
    }

    /// Close the detail view. Returns whether one was open.
    pub async fn close(&self) -> Result<bool, AppError> {
        self.request(|reply| Command::Close { reply }).await
    }

    /// Record the provisional rating. Returns the revision count.
    pub async fn set_user_rating(&self, rating: u8) -> Result<u32, AppError> {
        self.request(|reply| Command::SetRating { rating, reply })
            .await?
    }

    /// Add the selected movie to the watched list.
    pub async fn watch_selected(&self) -> Result<WatchedEntry, AppError> {
        self.request(|reply| Command::WatchSelected { reply }).await?
    }

    /// Remove `id` from the watched list. Returns whether it was there.
    pub async fn delete_watched(&self, id: impl Into<String>) -> Result<bool, AppError> {
        let id = id.into();
        self.request(|reply| Command::DeleteWatched { id, reply })
            .await
    }

    /// React to a key press.
    pub async fn handle_key(&self, key: Key, query_focused: bool) -> Result<KeyOutcome, AppError> {
        self.request(|reply| Command::Key {
            key,
            query_focused,
            reply,
        })
        .await
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> AppSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Wait for a snapshot satisfying `predicate`.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&AppSnapshot) -> bool,
    ) -> Result<AppSnapshot, AppError> {
        let mut rx = self.snapshot.clone();
        let snapshot = rx
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map_err(|_| AppError::RuntimeStopped)?;
        Ok(snapshot.clone())
    }
}

/// Background task owning the controller.
pub struct AppRuntime {
    controller: AppController,
    title: Arc<SharedTitle>,
    rx: mpsc::Receiver<Command>,
    snapshot: watch::Sender<AppSnapshot>,
    revision: u64,
}

impl AppRuntime {
    /// Run until every [`AppHandle`] is dropped.
    ///
    /// This should be spawned as a background task. Outstanding requests are
    /// cancelled and the title restored when it returns.
    pub async fn run(mut self) {
        info!("Application runtime started");

        loop {
            tokio::select! {
                command = self.rx.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                completion = self.controller.next_completion() => {
                    if self.controller.apply(completion) {
                        self.publish();
                    }
                }
            }
        }

        info!("Application runtime shutting down");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::SetQuery { query, reply } => {
                let changed = self.controller.set_query(query);
                self.respond(reply, changed);
            }
            Command::Select { id, reply } => {
                let selection = self.controller.select(&id).clone();
                self.respond(reply, selection);
            }
            Command::Close { reply } => {
                let closed = self.controller.close();
                self.respond(reply, closed);
            }
            Command::SetRating { rating, reply } => {
                let result = self.controller.set_user_rating(rating);
                self.respond(reply, result);
            }
            Command::WatchSelected { reply } => {
                let result = self.controller.watch_selected();
                self.respond(reply, result);
            }
            Command::DeleteWatched { id, reply } => {
                let removed = self.controller.delete_watched(&id);
                self.respond(reply, removed);
            }
            Command::Key {
                key,
                query_focused,
                reply,
            } => {
                let outcome = self.controller.handle_key(key, query_focused);
                self.respond(reply, outcome);
            }
        }
    }

    /// Publish first, so a caller that got its reply already sees the change.
    fn respond<T>(&mut self, reply: oneshot::Sender<T>, value: T) {
        self.publish();
        // The caller may have given up; the command still applied.
        let _ = reply.send(value);
    }

    fn publish(&mut self) {
        self.revision += 1;
        debug!(revision = self.revision, "Publishing snapshot");
        self.snapshot
            .send_replace(build_snapshot(&self.controller, &self.title, self.revision));
    }
}

fn build_snapshot(controller: &AppController, title: &SharedTitle, revision: u64) -> AppSnapshot {
    let watched = controller.watched();
    AppSnapshot {
        revision,
        title: title.current(),
        selection: controller.selection().clone(),
        view: controller.view(),
        watched: WatchedView {
            entries: watched.entries().to_vec(),
            summary: watched.summary().rounded(),
        },
    }
}

/// Create a complete application.
///
/// Returns:
/// - `AppHandle` - for driving the controller (clone this to share across tasks)
/// - `AppRuntime` - spawn this as a background task with `tokio::spawn(runtime.run())`
///
/// The watched list is loaded from `store` before this returns.
pub fn create_app(
    catalog: Arc<dyn Catalog>,
    store: PersistentStore,
    config: &Config,
) -> (AppHandle, AppRuntime) {
    let title = Arc::new(SharedTitle::new(config.app.default_title.clone()));
    let controller = AppController::new(catalog, title.clone(), store, config);

    let initial = build_snapshot(&controller, &title, 0);
    let (snapshot_tx, snapshot_rx) = watch::channel(initial);
    let (tx, rx) = mpsc::channel(config.app.command_buffer);

    let handle = AppHandle {
        tx,
        snapshot: snapshot_rx,
    };
    let runtime = AppRuntime {
        controller,
        title,
        rx,
        snapshot: snapshot_tx,
        revision: 0,
    };
    (handle, runtime)
}
