//! In-memory recorders for exercising the conversation without a backend
//!
//! ```
//! use contest_bot::testing::MemoryRecorder;
//!
//! let recorder = MemoryRecorder::new();
//! assert!(recorder.submissions().is_empty());
//! ```

use std::sync::Mutex;

use async_trait::async_trait;

use crate::recording::{RecordError, Recorder, Submission};

/// Keeps every recorded submission in memory.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    submissions: Mutex<Vec<Submission>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, oldest first.
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions
            .lock()
            .map(|list| list.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Recorder for MemoryRecorder {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn record(&self, submission: &Submission) -> Result<(), RecordError> {
        if let Ok(mut list) = self.submissions.lock() {
            list.push(submission.clone());
        }
        Ok(())
    }
}

/// Rejects every submission with a permanent API error.
#[derive(Debug, Default)]
pub struct FailingRecorder;

#[async_trait]
impl Recorder for FailingRecorder {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn record(&self, _submission: &Submission) -> Result<(), RecordError> {
        Err(RecordError::Api {
            service: "Sheets",
            status: 403,
            message: "The caller does not have permission".to_string(),
        })
    }
}
