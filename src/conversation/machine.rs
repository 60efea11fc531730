//! Transition table of the submission dialogue
//!
//! ```text
//! Idle ──submit──▶ ChoosingLeague ──GENRES──▶ ChoosingGenre ──genre──▶ AwaitingLink
//!                        │                                                 ▲  │
//!                        └──────────────────AI─────────────────────────────┘  │
//!                                                                             ▼
//!                                        Idle ◀── recorded / recording failed
//! ```
//!
//! `/start` and the submit button work from any stage. Every other
//! (stage, input) pair not listed in [`transition`] is ignored.

use super::types::{Entry, Input, League, Reply, Stage};

/// Result of feeding one input to the current stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Move to `stage` and answer with `reply`
    Advance { stage: Stage, reply: Reply },
    /// Keep the current stage and session data, answer with `reply`
    Stay(Reply),
    /// Text arrived while waiting for the link; validation and recording decide the rest
    ReceiveLink { entry: Entry, text: String },
}

impl Step {
    fn advance(stage: Stage, reply: Reply) -> Self {
        Step::Advance { stage, reply }
    }
}

/// Looks up the step for `input` in `stage`. `None` means the input is not
/// expected here and must be ignored.
pub fn transition(stage: &Stage, input: Input) -> Option<Step> {
    let step = match (stage, input) {
        (_, Input::Restart) => Step::advance(Stage::Idle, Reply::Entry),
        (_, Input::BeginSubmission) => Step::advance(Stage::ChoosingLeague, Reply::ChooseLeague),

        (Stage::ChoosingLeague, Input::ChooseLeague(League::GenreLeague)) => {
            Step::advance(Stage::ChoosingGenre, Reply::ChooseGenre)
        }
        (Stage::ChoosingLeague, Input::ChooseLeague(League::AiLeague)) => {
            Step::advance(Stage::AwaitingLink(Entry::AiLeague), Reply::AskLink)
        }

        (Stage::ChoosingGenre, Input::ChooseGenre(genre)) => {
            Step::advance(Stage::AwaitingLink(Entry::GenreLeague(genre)), Reply::AskLink)
        }

        (Stage::AwaitingLink(entry), Input::Text(text)) => Step::ReceiveLink { entry: *entry, text },
        (Stage::AwaitingLink(_), Input::NonText) => Step::Stay(Reply::SendAsText),

        _ => return None,
    };
    Some(step)
}
