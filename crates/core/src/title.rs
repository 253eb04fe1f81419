//! Document title side effect.
//!
//! While a movie's detail view is showing, the page title names that movie.
//! The override is held by a [`TitleGuard`]; dropping the guard restores the
//! default title, so every way out of a detail view (close, re-selection,
//! controller teardown) releases it exactly once.

use std::sync::{Arc, RwLock};

/// Where the page title is displayed.
pub trait TitleSink: Send + Sync {
    /// Replace the displayed title.
    fn set_title(&self, title: &str);
}

/// In-process title holder. The front-end reads [`SharedTitle::current`]
/// and mirrors it into the page.
#[derive(Debug)]
pub struct SharedTitle {
    current: RwLock<String>,
}

impl SharedTitle {
    /// Create a holder showing `initial`.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: RwLock::new(initial.into()),
        }
    }

    /// Currently displayed title.
    pub fn current(&self) -> String {
        self.current.read().unwrap().clone()
    }
}

impl TitleSink for SharedTitle {
    fn set_title(&self, title: &str) {
        *self.current.write().unwrap() = title.to_string();
    }
}

/// Scoped title override. Restores `restore_to` when dropped.
pub struct TitleGuard {
    sink: Arc<dyn TitleSink>,
    restore_to: String,
}

impl TitleGuard {
    /// Show `title` until the guard is dropped.
    pub fn acquire(sink: Arc<dyn TitleSink>, title: &str, restore_to: impl Into<String>) -> Self {
        sink.set_title(title);
        Self {
            sink,
            restore_to: restore_to.into(),
        }
    }
}

impl Drop for TitleGuard {
    fn drop(&mut self) {
        self.sink.set_title(&self.restore_to);
    }
}

impl std::fmt::Debug for TitleGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TitleGuard")
            .field("restore_to", &self.restore_to)
            .finish()
    }
}
