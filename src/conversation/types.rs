//! Conversation vocabulary: leagues, genres, stages, inputs and replies

use strum::{Display, EnumIter, EnumString};

/// Top-level contest category a submission is entered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum League {
    #[strum(to_string = "ЛИГА ЖАНРОВ")]
    GenreLeague,
    #[strum(to_string = "AI ЛИГА")]
    AiLeague,
}

impl League {
    /// Stable tag used in callback data (`league:<tag>`).
    pub fn tag(self) -> &'static str {
        match self {
            League::GenreLeague => "GENRES",
            League::AiLeague => "AI",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "GENRES" => Some(League::GenreLeague),
            "AI" => Some(League::AiLeague),
            _ => None,
        }
    }
}

/// Sub-category, only for Genre League entries.
///
/// The display label doubles as the callback payload (`genre:<label>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum Genre {
    #[strum(to_string = "Рэп")]
    Rap,
    #[strum(to_string = "Рок")]
    Rock,
    #[strum(to_string = "Поп")]
    Pop,
    #[strum(to_string = "Электронная")]
    Electronic,
}

/// Placeholder shown wherever a value does not apply (genre of an AI League
/// entry, a user without a username).
pub const NOT_APPLICABLE: &str = "—";

/// League and genre collected so far; a genre exists only for the Genre League.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    GenreLeague(Genre),
    AiLeague,
}

impl Entry {
    pub fn league(self) -> League {
        match self {
            Entry::GenreLeague(_) => League::GenreLeague,
            Entry::AiLeague => League::AiLeague,
        }
    }

    pub fn genre(self) -> Option<Genre> {
        match self {
            Entry::GenreLeague(genre) => Some(genre),
            Entry::AiLeague => None,
        }
    }

    /// Genre label, or the not-applicable placeholder.
    pub fn genre_label(self) -> String {
        self.genre()
            .map(|g| g.to_string())
            .unwrap_or_else(|| NOT_APPLICABLE.to_string())
    }
}

/// Where a user is in the submission dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    ChoosingLeague,
    ChoosingGenre,
    AwaitingLink(Entry),
}

/// Per-user transient conversation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Session {
    pub stage: Stage,
}

impl Session {
    pub fn at(stage: Stage) -> Self {
        Self { stage }
    }

    pub fn is_idle(&self) -> bool {
        self.stage == Stage::Idle
    }

    pub fn league(&self) -> Option<League> {
        match self.stage {
            Stage::ChoosingGenre => Some(League::GenreLeague),
            Stage::AwaitingLink(entry) => Some(entry.league()),
            Stage::Idle | Stage::ChoosingLeague => None,
        }
    }

    pub fn genre(&self) -> Option<Genre> {
        match self.stage {
            Stage::AwaitingLink(entry) => entry.genre(),
            _ => None,
        }
    }
}

/// The person sending a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitter {
    pub user_id: i64,
    pub username: Option<String>,
}

impl Submitter {
    pub fn new(user_id: i64, username: Option<String>) -> Self {
        Self { user_id, username }
    }

    /// `@username`, or the placeholder for users without one.
    pub fn handle(&self) -> String {
        match self.username.as_deref() {
            Some(name) if !name.is_empty() => format!("@{}", name),
            _ => NOT_APPLICABLE.to_string(),
        }
    }
}

/// Something the user did, already classified by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// `/start`
    Restart,
    /// "Подать трек" button
    BeginSubmission,
    ChooseLeague(League),
    ChooseGenre(Genre),
    Text(String),
    /// A message without text (photo, sticker, voice...)
    NonText,
}

/// What the bot answers with. Rendering is up to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Welcome text with the "submit track" button
    Entry,
    /// League buttons
    ChooseLeague,
    /// Genre buttons
    ChooseGenre,
    /// Ask for the release link
    AskLink,
    /// The message wasn't text
    SendAsText,
    /// Text without an http(s) link
    NoLinkFound,
    /// Link host isn't allowed
    LinkRejected { url: String },
    /// Submission recorded
    Accepted,
    /// Recording failed; the user has to start over
    RecordFailed { diagnostic: Option<String> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_league_labels_and_tags() {
        assert_eq!(League::GenreLeague.to_string(), "ЛИГА ЖАНРОВ");
        assert_eq!(League::AiLeague.to_string(), "AI ЛИГА");
        for league in League::iter() {
            assert_eq!(League::from_tag(league.tag()), Some(league));
        }
        assert_eq!(League::from_tag("ROCK"), None);
    }

    #[test]
    fn test_genre_labels_parse_back() {
        let labels: Vec<String> = Genre::iter().map(|g| g.to_string()).collect();
        assert_eq!(labels, vec!["Рэп", "Рок", "Поп", "Электронная"]);
        assert_eq!(Genre::from_str("Рок").unwrap(), Genre::Rock);
        assert!(Genre::from_str("Джаз").is_err());
    }

    #[test]
    fn test_entry_genre_only_for_genre_league() {
        assert_eq!(Entry::GenreLeague(Genre::Pop).genre(), Some(Genre::Pop));
        assert_eq!(Entry::AiLeague.genre(), None);
        assert_eq!(Entry::AiLeague.genre_label(), NOT_APPLICABLE);
        assert_eq!(Entry::AiLeague.league(), League::AiLeague);
    }

    #[test]
    fn test_session_fields_follow_stage() {
        let session = Session::at(Stage::AwaitingLink(Entry::GenreLeague(Genre::Rap)));
        assert_eq!(session.league(), Some(League::GenreLeague));
        assert_eq!(session.genre(), Some(Genre::Rap));

        let session = Session::at(Stage::ChoosingLeague);
        assert_eq!(session.league(), None);
        assert!(Session::default().is_idle());
    }

    #[test]
    fn test_submitter_handle() {
        assert_eq!(Submitter::new(1, Some("artist".into())).handle(), "@artist");
        assert_eq!(Submitter::new(1, Some(String::new())).handle(), NOT_APPLICABLE);
        assert_eq!(Submitter::new(1, None).handle(), NOT_APPLICABLE);
    }
}
