//! User-facing copy (HTML parse mode) and reply rendering

use indoc::formatdoc;
use teloxide::types::InlineKeyboardMarkup;
use teloxide::utils::html;

use super::keyboards::{genre_keyboard, league_keyboard, start_keyboard};
use crate::conversation::types::Reply;

pub const CHOOSE_LEAGUE: &str = "Выбери лигу";
pub const CHOOSE_GENRE: &str = "Выбери жанр";
pub const SEND_AS_TEXT: &str = "Пожалуйста, отправь ссылку текстом одним сообщением.";
pub const ACCEPTED: &str = "Заявка принята. Спасибо за участие в yourtunēs CONTEST.";

pub fn start_text() -> String {
    formatdoc! {"
        {title}
        Онлайн музыкальный конкурс.
        Нажми кнопку, чтобы подать трек.",
        title = html::bold("yourtunēs CONTEST"),
    }
}

pub fn ask_link_text() -> String {
    formatdoc! {"
        Отправь ссылку на релиз одним сообщением.

        ⚠️ {warning}",
        warning = html::italic(
            "Внимание: принимаются только треки,\nофициально выпущенные через сервис дистрибуции yourtunēs."
        ),
    }
}

/// Settings that shape the link-related copy.
#[derive(Debug, Clone, Default)]
pub struct CopyContext {
    pub allowed_domains: Vec<String>,
    pub help_url: Option<String>,
}

impl CopyContext {
    fn example_link(&self) -> String {
        let domain = self
            .allowed_domains
            .first()
            .map(String::as_str)
            .unwrap_or("yourtunes.net");
        format!("https://{}/…", domain)
    }

    fn help_suffix(&self) -> String {
        match &self.help_url {
            Some(url) => format!("\n\n{}", html::link(url, "Где взять ссылку на релиз")),
            None => String::new(),
        }
    }
}

pub fn no_link_text(ctx: &CopyContext) -> String {
    format!(
        "В сообщении нет ссылки. Отправь ссылку на релиз вида {} одним сообщением.{}",
        html::code_inline(&ctx.example_link()),
        ctx.help_suffix()
    )
}

pub fn link_rejected_text(url: &str, ctx: &CopyContext) -> String {
    let domains = if ctx.allowed_domains.is_empty() {
        html::escape("yourtunes.net")
    } else {
        ctx.allowed_domains
            .iter()
            .map(|d| html::escape(d))
            .collect::<Vec<_>>()
            .join(", ")
    };

    formatdoc! {"
        Эта ссылка не подходит: {url}

        Принимаются только релизы, выпущенные через yourtunēs.
        Ссылка должна вести на {domains}, например {example}.{help}",
        url = html::escape(url),
        domains = domains,
        example = html::code_inline(&ctx.example_link()),
        help = ctx.help_suffix(),
    }
}

pub fn record_failed_text(diagnostic: Option<&str>) -> String {
    let mut text = String::from(
        "Не удалось сохранить заявку 😔\nПопробуй ещё раз чуть позже: нажми /start и подай трек заново.",
    );
    if let Some(diagnostic) = diagnostic {
        text.push_str("\n\n");
        text.push_str(&html::code_inline(diagnostic));
    }
    text
}

/// A reply ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Rendered {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    fn with_keyboard(text: impl Into<String>, keyboard: InlineKeyboardMarkup) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

pub fn render(reply: &Reply, ctx: &CopyContext) -> Rendered {
    match reply {
        Reply::Entry => Rendered::with_keyboard(start_text(), start_keyboard()),
        Reply::ChooseLeague => Rendered::with_keyboard(CHOOSE_LEAGUE, league_keyboard()),
        Reply::ChooseGenre => Rendered::with_keyboard(CHOOSE_GENRE, genre_keyboard()),
        Reply::AskLink => Rendered::plain(ask_link_text()),
        Reply::SendAsText => Rendered::plain(SEND_AS_TEXT),
        Reply::NoLinkFound => Rendered::plain(no_link_text(ctx)),
        Reply::LinkRejected { url } => Rendered::plain(link_rejected_text(url, ctx)),
        Reply::Accepted => Rendered::plain(ACCEPTED),
        Reply::RecordFailed { diagnostic } => Rendered::plain(record_failed_text(diagnostic.as_deref())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx() -> CopyContext {
        CopyContext {
            allowed_domains: vec!["yourtunes.net".into(), "www.yourtunes.net".into()],
            help_url: None,
        }
    }

    #[test]
    fn test_start_text() {
        assert_eq!(
            start_text(),
            "<b>yourtunēs CONTEST</b>\nОнлайн музыкальный конкурс.\nНажми кнопку, чтобы подать трек."
        );
    }

    #[test]
    fn test_ask_link_warns_about_distribution() {
        let text = ask_link_text();
        assert!(text.starts_with("Отправь ссылку на релиз одним сообщением.\n\n⚠️ <i>"));
        assert!(text.contains("сервис дистрибуции yourtunēs"));
    }

    #[test]
    fn test_rejection_escapes_url_and_lists_domains() {
        let text = link_rejected_text("https://evil.com/?a=<b>&c", &ctx());
        assert!(text.contains("https://evil.com/?a=&lt;b&gt;&amp;c"));
        assert!(text.contains("yourtunes.net, www.yourtunes.net"));
        assert!(!text.contains("<a href"));
    }

    #[test]
    fn test_help_link_when_configured() {
        let ctx = CopyContext {
            help_url: Some("https://yourtunes.net/help".into()),
            ..ctx()
        };
        assert!(link_rejected_text("https://soundcloud.com/x", &ctx).contains("<a href=\"https://yourtunes.net/help\">"));
        assert!(no_link_text(&ctx).contains("https://yourtunes.net/help"));
    }

    #[test]
    fn test_failure_text_diagnostic() {
        assert!(!record_failed_text(None).contains("<code>"));
        assert!(record_failed_text(Some("403 <denied>")).contains("<code>403 &lt;denied&gt;</code>"));
    }

    #[test]
    fn test_render_keyboards() {
        assert!(render(&Reply::Entry, &ctx()).keyboard.is_some());
        assert!(render(&Reply::ChooseLeague, &ctx()).keyboard.is_some());
        assert!(render(&Reply::AskLink, &ctx()).keyboard.is_none());
        assert_eq!(render(&Reply::Accepted, &ctx()).text, ACCEPTED);
    }
}
