use std::sync::Arc;

use super::machine::{transition, Step};
use super::store::SessionStore;
use super::types::{Entry, Input, Reply, Session, Stage, Submitter};
use crate::core::{LinkValidator, LinkVerdict};
use crate::recording::{Recorder, Submission};

/// Drives one user's conversation: session lookup, transition, validation
/// and recording.
pub struct Conversation {
    sessions: Arc<SessionStore>,
    validator: LinkValidator,
    recorder: Arc<dyn Recorder>,
    report_errors: bool,
}

impl Conversation {
    pub fn new(sessions: Arc<SessionStore>, validator: LinkValidator, recorder: Arc<dyn Recorder>) -> Self {
        Self {
            sessions,
            validator,
            recorder,
            report_errors: false,
        }
    }

    /// Include the recorder's error text in failure replies.
    pub fn with_error_reports(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn validator(&self) -> &LinkValidator {
        &self.validator
    }

    /// Current session of `user`.
    pub fn session(&self, user: i64) -> Session {
        self.sessions.get(user)
    }

    /// Applies `input` to the submitter's session.
    ///
    /// Returns the reply to show, or `None` when the input is not expected
    /// in the current stage (nothing is sent and nothing changes).
    pub async fn handle(&self, submitter: &Submitter, input: Input) -> Option<Reply> {
        let user = submitter.user_id;
        let current = self.sessions.get(user);

        let Some(step) = transition(&current.stage, input) else {
            log::debug!("Ignoring input from user {} in stage {:?}", user, current.stage);
            return None;
        };

        let reply = match step {
            Step::Advance { stage, reply } => {
                self.sessions.put(user, Session::at(stage));
                reply
            }
            Step::Stay(reply) => {
                self.sessions.put(user, current);
                reply
            }
            Step::ReceiveLink { entry, text } => self.receive_link(submitter, entry, &text).await,
        };
        Some(reply)
    }

    async fn receive_link(&self, submitter: &Submitter, entry: Entry, text: &str) -> Reply {
        let user = submitter.user_id;

        let link = match self.validator.check(text) {
            LinkVerdict::Accepted(link) => link,
            LinkVerdict::NoLink => {
                self.sessions.put(user, Session::at(Stage::AwaitingLink(entry)));
                return Reply::NoLinkFound;
            }
            LinkVerdict::Rejected(url) => {
                log::info!("User {} sent a link outside the allow-list: {}", user, url);
                self.sessions.put(user, Session::at(Stage::AwaitingLink(entry)));
                return Reply::LinkRejected { url };
            }
        };

        self.sessions.clear(user);
        let submission = Submission::new(submitter, entry, link);

        match self.recorder.record(&submission).await {
            Ok(()) => {
                log::info!(
                    "Submission accepted: user={} league={} genre={} link={}",
                    user,
                    submission.league.tag(),
                    submission.genre_label(),
                    submission.link
                );
                Reply::Accepted
            }
            Err(e) => {
                log::error!("Failed to record submission of user {}: {}", user, e);
                Reply::RecordFailed {
                    diagnostic: self.report_errors.then(|| e.to_string()),
                }
            }
        }
    }
}
