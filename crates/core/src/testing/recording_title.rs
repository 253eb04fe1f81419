//! Title sink that records every change.

use std::sync::Mutex;

use crate::title::TitleSink;

/// [`TitleSink`] keeping the full history of titles it was given.
#[derive(Debug, Default)]
pub struct RecordingTitle {
    history: Mutex<Vec<String>>,
}

impl RecordingTitle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every title set so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().unwrap().clone()
    }

    /// Last title set, or the empty string if none was.
    pub fn current(&self) -> String {
        self.history.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

impl TitleSink for RecordingTitle {
    fn set_title(&self, title: &str) {
        self.history.lock().unwrap().push(title.to_string());
    }
}
