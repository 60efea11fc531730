//! contest-bot - Telegram bot for yourtunēs CONTEST submissions
//!
//! Users pick a league (and a genre for the genre league), send a release
//! link, and the bot records the submission for the moderators.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging and link validation
//! - `conversation`: the submission dialogue (transition table, sessions, engine)
//! - `recording`: where accepted submissions go (moderation chat or Google Sheets)
//! - `telegram`: Telegram bot integration and handlers
//! - `testing`: in-memory recorders for tests and local runs

pub mod cli;
pub mod conversation;
pub mod core;
pub mod recording;
pub mod telegram;
pub mod testing;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult};
pub use conversation::{Conversation, SessionStore};
pub use recording::{Recorder, Submission};
