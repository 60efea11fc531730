use async_trait::async_trait;
use indoc::formatdoc;
use teloxide::prelude::*;
use teloxide::types::ChatId;

use super::{RecordError, Recorder, Submission};

/// Forwards submissions as plain-text messages to the moderation chat.
pub struct RelayRecorder {
    bot: Bot,
    chat_id: ChatId,
}

impl RelayRecorder {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }
}

/// Moderation message for one submission.
pub fn format_relay_text(submission: &Submission) -> String {
    formatdoc! {"
        yourtunēs CONTEST — Заявка

        Лига: {league}
        Жанр: {genre}
        Пользователь: {handle}

        Ссылка:
        {link}",
        league = submission.league,
        genre = submission.genre_label(),
        handle = submission.handle,
        link = submission.link,
    }
}

#[async_trait]
impl Recorder for RelayRecorder {
    fn name(&self) -> &'static str {
        "relay"
    }

    async fn record(&self, submission: &Submission) -> Result<(), RecordError> {
        self.bot
            .send_message(self.chat_id, format_relay_text(submission))
            .await?;
        log::debug!(
            "Relayed submission of user {} to chat {}",
            submission.user_id,
            self.chat_id
        );
        Ok(())
    }
}
