//! Common test utilities
//!
//! This module is shared across all integration tests

#![allow(dead_code)]

use std::sync::Arc;

use contest_bot::conversation::{Conversation, SessionStore};
use contest_bot::core::{LinkPolicy, LinkValidator};
use contest_bot::recording::Recorder;
use contest_bot::telegram::texts::CopyContext;
use contest_bot::telegram::HandlerDeps;

pub const ALLOWED_DOMAINS: &[&str] = &["yourtunes.net", "www.yourtunes.net"];

pub fn allow_list_validator() -> LinkValidator {
    LinkValidator::new(
        LinkPolicy::AllowList,
        ALLOWED_DOMAINS.iter().map(|d| d.to_string()).collect(),
    )
}

/// Conversation over a fresh session store and the default allow-list.
pub fn conversation_with(recorder: Arc<dyn Recorder>) -> Arc<Conversation> {
    Arc::new(Conversation::new(
        Arc::new(SessionStore::default()),
        allow_list_validator(),
        recorder,
    ))
}

/// Handler dependencies sharing `conversation`, without a help link.
pub fn deps_for(conversation: Arc<Conversation>) -> HandlerDeps {
    HandlerDeps::new(
        conversation,
        CopyContext {
            allowed_domains: ALLOWED_DOMAINS.iter().map(|d| d.to_string()).collect(),
            help_url: None,
        },
    )
}
