//! Core utilities: configuration, errors, logging, link validation

pub mod config;
pub mod error;
pub mod logging;
pub mod validation;

// Re-exports for convenience
pub use error::{AppError, AppResult, ConfigError};
pub use logging::{init_logger, log_startup_configuration};
pub use validation::{extract_url, is_allowed, LinkPolicy, LinkValidator, LinkVerdict};
