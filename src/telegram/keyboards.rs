//! Inline keyboards and their callback payloads

use std::str::FromStr;

use strum::IntoEnumIterator;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::conversation::types::{Genre, Input, League};

const SUBMIT_TRACK: &str = "submit_track";
const LEAGUE_PREFIX: &str = "league:";
const GENRE_PREFIX: &str = "genre:";

/// What an inline button asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    SubmitTrack,
    League(League),
    Genre(Genre),
}

impl CallbackAction {
    /// Parses callback data; unknown payloads yield `None`.
    pub fn parse(data: &str) -> Option<Self> {
        if data == SUBMIT_TRACK {
            return Some(CallbackAction::SubmitTrack);
        }
        if let Some(tag) = data.strip_prefix(LEAGUE_PREFIX) {
            return League::from_tag(tag).map(CallbackAction::League);
        }
        if let Some(label) = data.strip_prefix(GENRE_PREFIX) {
            return Genre::from_str(label).ok().map(CallbackAction::Genre);
        }
        None
    }

    pub fn as_data(&self) -> String {
        match self {
            CallbackAction::SubmitTrack => SUBMIT_TRACK.to_string(),
            CallbackAction::League(league) => format!("{}{}", LEAGUE_PREFIX, league.tag()),
            CallbackAction::Genre(genre) => format!("{}{}", GENRE_PREFIX, genre),
        }
    }

    pub fn into_input(self) -> Input {
        match self {
            CallbackAction::SubmitTrack => Input::BeginSubmission,
            CallbackAction::League(league) => Input::ChooseLeague(league),
            CallbackAction::Genre(genre) => Input::ChooseGenre(genre),
        }
    }
}

fn button(label: impl Into<String>, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label.into(), action.as_data())
}

/// Single "Подать трек" button.
pub fn start_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![button("Подать трек", CallbackAction::SubmitTrack)]])
}

/// One row per league.
pub fn league_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        League::iter()
            .map(|league| vec![button(league.to_string(), CallbackAction::League(league))])
            .collect::<Vec<_>>(),
    )
}

/// One row per genre.
pub fn genre_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        Genre::iter()
            .map(|genre| vec![button(genre.to_string(), CallbackAction::Genre(genre))])
            .collect::<Vec<_>>(),
    )
}
