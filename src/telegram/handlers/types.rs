//! Handler types, dependencies, and sender helpers

use std::sync::Arc;

use teloxide::types::User;

use crate::conversation::{Conversation, Submitter};
use crate::core::config;
use crate::telegram::texts::CopyContext;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub conversation: Arc<Conversation>,
    pub copy: Arc<CopyContext>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(conversation: Arc<Conversation>, copy: CopyContext) -> Self {
        Self {
            conversation,
            copy: Arc::new(copy),
        }
    }

    /// Copy settings taken from the conversation's validator and `HELP_URL`.
    pub fn with_configured_copy(conversation: Arc<Conversation>) -> Self {
        let copy = CopyContext {
            allowed_domains: conversation.validator().allowed_domains().to_vec(),
            help_url: config::links::HELP_URL.clone(),
        };
        Self::new(conversation, copy)
    }
}

/// Submitter identity of a Telegram user.
pub fn submitter_from_user(user: &User) -> Submitter {
    Submitter::new(user.id.0 as i64, user.username.clone())
}
