//! Submission dialogue
//!
//! - [`types`]: leagues, genres, stages, inputs and replies
//! - [`machine`]: the `(stage, input) -> step` table
//! - [`store`]: per-user sessions with expiry
//! - [`engine`]: runs the table against the store, validator and recorder

pub mod engine;
pub mod machine;
pub mod store;
pub mod types;

pub use engine::Conversation;
pub use machine::{transition, Step};
pub use store::SessionStore;
pub use types::{Entry, Genre, Input, League, Reply, Session, Stage, Submitter};
