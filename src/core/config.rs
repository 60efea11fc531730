//! Configuration for the contest bot.
//!
//! Every value is read once from the environment (or `.env`) on first access.

use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: contest-bot.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "contest-bot.log".to_string()));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Webhook URL for Telegram updates
/// Read from WEBHOOK_URL environment variable
pub static WEBHOOK_URL: Lazy<Option<String>> = Lazy::new(|| non_empty_var("WEBHOOK_URL"));

/// Port the webhook listener binds to
/// Read from WEBHOOK_PORT environment variable
/// Default: 8080
pub static WEBHOOK_PORT: Lazy<u16> = Lazy::new(|| {
    env::var("WEBHOOK_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080)
});

/// Reads an environment variable, treating blank values as unset.
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Parses a boolean flag the way operators tend to write them.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Moderation chat configuration (relay recorder)
pub mod moderation {
    use super::non_empty_var;
    use crate::core::ConfigError;
    use once_cell::sync::Lazy;

    /// Chat ID of the closed moderation chat that receives relayed submissions
    /// Read from ADMIN_CHAT_ID environment variable
    pub static ADMIN_CHAT_ID: Lazy<Result<Option<i64>, ConfigError>> =
        Lazy::new(|| parse_chat_id(non_empty_var("ADMIN_CHAT_ID").as_deref()));

    /// `Ok(None)` when unset; a value that is not an integer is an error.
    pub fn parse_chat_id(raw: Option<&str>) -> Result<Option<i64>, ConfigError> {
        raw.map(|value| {
            value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "ADMIN_CHAT_ID",
                value: value.to_string(),
            })
        })
        .transpose()
    }

    /// The moderation chat, required by the relay recorder.
    pub fn admin_chat_id() -> Result<i64, ConfigError> {
        (*ADMIN_CHAT_ID).clone()?.ok_or(ConfigError::Missing("ADMIN_CHAT_ID"))
    }
}

/// Recording backend configuration
pub mod recording {
    use super::{non_empty_var, parse_flag, Duration};
    use crate::recording::RecorderKind;
    use once_cell::sync::Lazy;
    use std::env;

    /// Which recorder handles accepted submissions
    /// Read from RECORDER environment variable (`relay` or `sheets`)
    /// Default: relay
    pub static RECORDER: Lazy<String> = Lazy::new(|| non_empty_var("RECORDER").unwrap_or_else(|| "relay".to_string()));

    /// Parsed recorder kind. Unknown values are reported when the recorder is built.
    pub fn kind() -> Result<RecorderKind, crate::core::ConfigError> {
        RECORDER.parse()
    }

    /// Attempts per submission before the failure is reported to the user
    /// Read from RECORD_MAX_ATTEMPTS environment variable
    /// Default: 3
    pub static MAX_ATTEMPTS: Lazy<usize> = Lazy::new(|| {
        env::var("RECORD_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(3)
    });

    /// Delay before the first retry (in milliseconds)
    pub const RETRY_MIN_DELAY_MS: u64 = 500;

    /// Upper bound for a single retry delay (in seconds)
    pub const RETRY_MAX_DELAY_SECS: u64 = 8;

    pub fn retry_min_delay() -> Duration {
        Duration::from_millis(RETRY_MIN_DELAY_MS)
    }

    pub fn retry_max_delay() -> Duration {
        Duration::from_secs(RETRY_MAX_DELAY_SECS)
    }

    /// Window in which an identical submission is recorded only once
    /// Read from DEDUPE_WINDOW_SECS environment variable
    /// Default: 600 (10 minutes)
    pub static DEDUPE_WINDOW_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("DEDUPE_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(600)
    });

    /// Longest accepted dedupe window (in seconds): 30 days
    pub const MAX_DEDUPE_WINDOW_SECS: u64 = 30 * 24 * 3600;

    pub fn dedupe_window() -> Duration {
        clamp_dedupe_window(*DEDUPE_WINDOW_SECS)
    }

    pub fn clamp_dedupe_window(secs: u64) -> Duration {
        if secs > MAX_DEDUPE_WINDOW_SECS {
            log::warn!(
                "DEDUPE_WINDOW_SECS={} is too long, using {}",
                secs,
                MAX_DEDUPE_WINDOW_SECS
            );
        }
        Duration::from_secs(secs.min(MAX_DEDUPE_WINDOW_SECS))
    }

    /// Include the backend error text in the failure reply
    /// Read from REPORT_RECORD_ERRORS environment variable
    /// Default: false
    pub static REPORT_ERRORS: Lazy<bool> = Lazy::new(|| {
        env::var("REPORT_RECORD_ERRORS")
            .ok()
            .and_then(|v| parse_flag(&v))
            .unwrap_or(false)
    });
}

/// Google Sheets configuration (sheets recorder)
pub mod sheets {
    use super::non_empty_var;
    use once_cell::sync::Lazy;

    /// Name of the spreadsheet that receives submissions
    /// Read from SPREADSHEET_NAME environment variable
    pub static SPREADSHEET_NAME: Lazy<String> =
        Lazy::new(|| non_empty_var("SPREADSHEET_NAME").unwrap_or_else(|| "yourtunes CONTEST".to_string()));

    /// Spreadsheet ID; skips the Drive lookup by name when set
    /// Read from SPREADSHEET_ID environment variable
    pub static SPREADSHEET_ID: Lazy<Option<String>> = Lazy::new(|| non_empty_var("SPREADSHEET_ID"));

    /// Path to a service account key file
    /// Read from GOOGLE_CREDENTIALS_FILE or GOOGLE_APPLICATION_CREDENTIALS
    pub static CREDENTIALS_FILE: Lazy<Option<String>> =
        Lazy::new(|| non_empty_var("GOOGLE_CREDENTIALS_FILE").or_else(|| non_empty_var("GOOGLE_APPLICATION_CREDENTIALS")));

    /// Inline service account key (the JSON document itself)
    /// Read from GOOGLE_CREDENTIALS_JSON environment variable
    pub static CREDENTIALS_JSON: Lazy<Option<String>> = Lazy::new(|| non_empty_var("GOOGLE_CREDENTIALS_JSON"));

    pub const SHEETS_API_URL: &str = "https://sheets.googleapis.com";
    pub const DRIVE_API_URL: &str = "https://www.googleapis.com";

    /// OAuth scopes: read/write spreadsheets and look files up on Drive
    pub const SCOPES: &[&str] = &[
        "https://www.googleapis.com/auth/spreadsheets",
        "https://www.googleapis.com/auth/drive",
    ];
}

/// Submission link policy
pub mod links {
    use super::non_empty_var;
    use crate::core::validation::LinkPolicy;
    use once_cell::sync::Lazy;

    pub const DEFAULT_ALLOWED_DOMAINS: &[&str] = &["yourtunes.net", "www.yourtunes.net"];

    pub fn parse_domains(raw: &str) -> Vec<String> {
        raw.split([',', ' ', '\n', '\t'])
            .map(|part| part.trim().trim_end_matches('.').to_ascii_lowercase())
            .filter(|part| !part.is_empty())
            .collect()
    }

    /// Hosts accepted as release links
    /// Read from ALLOWED_LINK_DOMAINS environment variable (comma-separated)
    pub static ALLOWED_DOMAINS: Lazy<Vec<String>> = Lazy::new(|| {
        non_empty_var("ALLOWED_LINK_DOMAINS")
            .map(|raw| parse_domains(&raw))
            .filter(|domains| !domains.is_empty())
            .unwrap_or_else(|| DEFAULT_ALLOWED_DOMAINS.iter().map(|d| d.to_string()).collect())
    });

    /// How strictly submitted text is checked
    /// Read from LINK_POLICY environment variable (`any`, `extract`, `allowlist`)
    /// Default: allowlist
    pub static POLICY: Lazy<LinkPolicy> = Lazy::new(|| {
        non_empty_var("LINK_POLICY")
            .and_then(|raw| match raw.parse() {
                Ok(policy) => Some(policy),
                Err(_) => {
                    log::warn!("Unknown LINK_POLICY '{}', falling back to allowlist", raw);
                    None
                }
            })
            .unwrap_or(LinkPolicy::AllowList)
    });

    /// Help page linked from the rejection message
    /// Read from HELP_URL environment variable
    pub static HELP_URL: Lazy<Option<String>> = Lazy::new(|| non_empty_var("HELP_URL"));
}

/// Conversation session configuration
pub mod session {
    use super::Duration;
    use once_cell::sync::Lazy;
    use std::env;

    /// Idle time after which an unfinished conversation is forgotten (in seconds)
    /// Read from SESSION_TTL_SECS environment variable; 0 disables expiry
    /// Default: 86400 (24 hours)
    pub static TTL_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400)
    });

    pub fn ttl() -> Option<Duration> {
        match *TTL_SECS {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Interval between sweeps of expired sessions (in seconds)
    pub const CLEANUP_INTERVAL_SECS: u64 = 600;

    pub fn cleanup_interval() -> Duration {
        Duration::from_secs(CLEANUP_INTERVAL_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for HTTP requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag(" YES "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_parse_domains_normalizes_entries() {
        assert_eq!(
            links::parse_domains("YourTunes.net, www.yourtunes.net.\nfoo.org"),
            vec!["yourtunes.net", "www.yourtunes.net", "foo.org"]
        );
        assert!(links::parse_domains(" , ").is_empty());
    }

    #[test]
    fn test_parse_chat_id() {
        assert_eq!(moderation::parse_chat_id(None), Ok(None));
        assert_eq!(moderation::parse_chat_id(Some(" -1001234567890 ")), Ok(Some(-1_001_234_567_890)));
        assert_eq!(
            moderation::parse_chat_id(Some("-100abc")),
            Err(crate::core::ConfigError::Invalid {
                name: "ADMIN_CHAT_ID",
                value: "-100abc".to_string(),
            })
        );
    }

    #[test]
    fn test_dedupe_window_is_clamped() {
        assert_eq!(recording::clamp_dedupe_window(0), Duration::ZERO);
        assert_eq!(recording::clamp_dedupe_window(600), Duration::from_secs(600));
        assert_eq!(
            recording::clamp_dedupe_window(u64::MAX),
            Duration::from_secs(recording::MAX_DEDUPE_WINDOW_SECS)
        );
    }
}
