use thiserror::Error;

/// Centralized error types for the application
///
/// Process-level failures (startup, CLI subcommands, Telegram plumbing) are
/// converted to this enum. Recorder failures have their own
/// [`RecordError`](crate::recording::RecordError) because the conversation
/// layer reports them to the user instead of bubbling them up.
#[derive(Error, Debug)]
pub enum AppError {
    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Recording backend errors
    #[error("Recording error: {0}")]
    Record(#[from] crate::recording::RecordError),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Errors raised while reading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("{0} is not set")]
    Missing(&'static str),

    /// A variable is set but its value can't be used
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}
