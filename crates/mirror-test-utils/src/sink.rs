//! Progress sink that records lines for assertions.

use std::sync::Mutex;

use mirror_git::ProgressSink;

/// Sink that stores every reported line.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines reported so far.
    ///
    /// # Panics
    /// Panics if the line mutex is poisoned.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("recording sink poisoned").clone()
    }

    /// Whether any recorded line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl ProgressSink for RecordingSink {
    fn line(&self, text: &str) {
        self.lines
            .lock()
            .expect("recording sink poisoned")
            .push(text.to_string());
    }
}
