use clap::{Parser, Subcommand, ValueEnum};

use crate::conversation::types::{Entry, Genre};

#[derive(Parser)]
#[command(name = "contest-bot")]
#[command(author, version, about = "Telegram bot that collects yourtunes CONTEST submissions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot in normal mode
    Run {
        /// Use webhook mode instead of long polling
        #[arg(long)]
        webhook: bool,
    },

    /// Check a message against the configured link policy
    CheckLink {
        /// Message text as a user would send it
        text: String,
    },

    /// Send one synthetic submission through the configured recorder
    TestRecord {
        #[arg(long, value_enum, default_value_t = LeagueArg::Genres)]
        league: LeagueArg,

        /// Genre for the genre league
        #[arg(long, value_enum, default_value_t = GenreArg::Rock)]
        genre: GenreArg,

        #[arg(long, default_value = "https://yourtunes.net/r/test")]
        link: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LeagueArg {
    Genres,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GenreArg {
    Rap,
    Rock,
    Pop,
    Electronic,
}

impl From<GenreArg> for Genre {
    fn from(arg: GenreArg) -> Self {
        match arg {
            GenreArg::Rap => Genre::Rap,
            GenreArg::Rock => Genre::Rock,
            GenreArg::Pop => Genre::Pop,
            GenreArg::Electronic => Genre::Electronic,
        }
    }
}

/// Entry described by the `test-record` flags; the genre is ignored for the AI league.
pub fn entry_from_args(league: LeagueArg, genre: GenreArg) -> Entry {
    match league {
        LeagueArg::Genres => Entry::GenreLeague(genre.into()),
        LeagueArg::Ai => Entry::AiLeague,
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
