//! Submission recording backends
//!
//! A [`Recorder`] persists one accepted submission. Two strategies exist:
//! - [`RelayRecorder`]: forwards a formatted message to the moderation chat
//! - [`SheetsRecorder`]: appends a row to a Google spreadsheet
//!
//! Either one is wrapped in [`ReliableRecorder`] for retries and duplicate
//! suppression. The strategy is chosen with the `RECORDER` variable.

pub mod google_auth;
pub mod relay;
pub mod reliable;
pub mod sheets;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use sha2::{Digest, Sha256};
use teloxide::types::ChatId;
use teloxide::Bot;
use thiserror::Error;

use crate::conversation::types::{Entry, Genre, League, Submitter, NOT_APPLICABLE};
use crate::core::{config, ConfigError};

pub use relay::RelayRecorder;
pub use reliable::ReliableRecorder;
pub use sheets::SheetsRecorder;

/// One accepted contest submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub submitted_at: DateTime<Local>,
    pub user_id: i64,
    pub handle: String,
    pub league: League,
    pub genre: Option<Genre>,
    pub link: String,
}

impl Submission {
    /// Builds the record for `submitter`, timestamped now.
    pub fn new(submitter: &Submitter, entry: Entry, link: impl Into<String>) -> Self {
        Self::at(Local::now(), submitter, entry, link)
    }

    pub fn at(submitted_at: DateTime<Local>, submitter: &Submitter, entry: Entry, link: impl Into<String>) -> Self {
        Self {
            submitted_at,
            user_id: submitter.user_id,
            handle: submitter.handle(),
            league: entry.league(),
            genre: entry.genre(),
            link: link.into(),
        }
    }

    pub fn genre_label(&self) -> String {
        self.genre
            .map(|g| g.to_string())
            .unwrap_or_else(|| NOT_APPLICABLE.to_string())
    }

    /// `YYYY-MM-DD HH:MM` in local time.
    pub fn timestamp_label(&self) -> String {
        self.submitted_at.format("%Y-%m-%d %H:%M").to_string()
    }

    /// Spreadsheet row: timestamp, league, genre, handle, link.
    pub fn row(&self) -> [String; 5] {
        [
            self.timestamp_label(),
            self.league.to_string(),
            self.genre_label(),
            self.handle.clone(),
            self.link.clone(),
        ]
    }

    /// Key identifying "the same submission" within a time bucket of `window`.
    ///
    /// Two submissions share a key when user, league, genre and link are
    /// equal and both timestamps fall into the same bucket.
    pub fn idempotency_key(&self, window: Duration) -> String {
        let bucket = self.submitted_at.timestamp().div_euclid(window.as_secs().max(1) as i64);
        let mut hasher = Sha256::new();
        hasher.update(self.user_id.to_be_bytes());
        hasher.update(self.league.tag().as_bytes());
        hasher.update([0]);
        hasher.update(self.genre_label().as_bytes());
        hasher.update([0]);
        hasher.update(self.link.as_bytes());
        hasher.update(bucket.to_be_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Recording failures.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Network-level failure talking to a backend
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Credentials unusable or the token exchange was refused
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Backend answered with a non-success status
    #[error("{service} API returned {status}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// Spreadsheet (or its first sheet) could not be found
    #[error("spreadsheet not found: {0}")]
    NotFound(String),

    /// Relay message could not be delivered
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl RecordError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        use teloxide::RequestError;

        match self {
            RecordError::Transport(_) => true,
            RecordError::Api { status, .. } => *status == 429 || *status >= 500,
            RecordError::Telegram(e) => matches!(
                e,
                RequestError::Network(_) | RequestError::RetryAfter(_) | RequestError::Io(_)
            ),
            RecordError::Auth(_) | RecordError::NotFound(_) | RecordError::Config(_) => false,
        }
    }
}

/// Persists accepted submissions.
#[async_trait]
pub trait Recorder: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    async fn record(&self, submission: &Submission) -> Result<(), RecordError>;
}

/// Which backend records submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderKind {
    Relay,
    Sheets,
}

impl fmt::Display for RecorderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecorderKind::Relay => f.write_str("relay"),
            RecorderKind::Sheets => f.write_str("sheets"),
        }
    }
}

impl FromStr for RecorderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relay" | "telegram" => Ok(RecorderKind::Relay),
            "sheets" | "spreadsheet" | "gsheets" => Ok(RecorderKind::Sheets),
            other => Err(ConfigError::Invalid {
                name: "RECORDER",
                value: other.to_string(),
            }),
        }
    }
}

/// Builds the configured recorder, wrapped with retries and deduplication.
pub fn build_recorder(bot: &Bot) -> Result<Arc<dyn Recorder>, RecordError> {
    let inner: Arc<dyn Recorder> = match config::recording::kind()? {
        RecorderKind::Relay => {
            let chat_id = config::moderation::admin_chat_id()?;
            Arc::new(RelayRecorder::new(bot.clone(), ChatId(chat_id)))
        }
        RecorderKind::Sheets => Arc::new(SheetsRecorder::from_config()?),
    };

    log::info!("Submissions are recorded via {}", inner.name());
    Ok(Arc::new(ReliableRecorder::from_config(inner)))
}
