//! Release link validation
//!
//! Submitted text goes through two checks:
//! - extraction of the first `http(s)://` token from free text
//! - a host allow-list (exact match, port stripped, case-insensitive)
//!
//! Both are pure string/URI inspection; no network access happens here.

use lazy_regex::regex;
use strum::{Display, EnumString};
use url::Url;

/// How strictly a submitted message is checked before it is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LinkPolicy {
    /// Any text is accepted verbatim
    Any,
    /// The message must contain an http(s) URL; any host is accepted
    Extract,
    /// The URL host must be on the allow-list
    #[strum(to_string = "allowlist", serialize = "allow-list")]
    AllowList,
}

/// Outcome of checking a submitted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkVerdict {
    /// The link to record
    Accepted(String),
    /// No http(s) URL in the message
    NoLink,
    /// A URL was found but its host is not allowed
    Rejected(String),
}

/// Returns the first `http://` or `https://` token in `text`, verbatim.
///
/// A token is a contiguous run of non-whitespace characters; the scheme is
/// matched case-insensitively.
///
/// # Examples
/// ```
/// use contest_bot::core::validation::extract_url;
///
/// assert_eq!(extract_url("мой трек: https://yourtunes.net/r/xyz !"), Some("https://yourtunes.net/r/xyz"));
/// assert_eq!(extract_url("no links here"), None);
/// ```
pub fn extract_url(text: &str) -> Option<&str> {
    regex!(r"(?i)https?://\S+").find(text).map(|m| m.as_str())
}

/// Checks that the URL host is one of `allowed_domains`.
///
/// The URL must parse, use the http or https scheme and have a host. The host
/// comparison is exact: subdomains must be listed on their own.
///
/// # Examples
/// ```
/// use contest_bot::core::validation::is_allowed;
///
/// let allowed = ["yourtunes.net"];
/// assert!(is_allowed("https://yourtunes.net/abc", &allowed));
/// assert!(is_allowed("https://YourTunes.NET:443/abc", &allowed));
/// assert!(!is_allowed("https://evil.com/yourtunes.net", &allowed));
/// assert!(!is_allowed("not a url", &allowed));
/// ```
pub fn is_allowed<S: AsRef<str>>(url: &str, allowed_domains: &[S]) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }

    let Some(host) = parsed.host_str() else {
        return false;
    };

    allowed_domains
        .iter()
        .any(|domain| domain.as_ref().eq_ignore_ascii_case(host))
}

/// Applies a [`LinkPolicy`] and an allow-list to submitted text.
#[derive(Debug, Clone)]
pub struct LinkValidator {
    policy: LinkPolicy,
    allowed_domains: Vec<String>,
}

impl LinkValidator {
    pub fn new(policy: LinkPolicy, allowed_domains: Vec<String>) -> Self {
        Self {
            policy,
            allowed_domains,
        }
    }

    /// Validator built from `LINK_POLICY` and `ALLOWED_LINK_DOMAINS`.
    pub fn from_config() -> Self {
        use crate::core::config::links;
        Self::new(*links::POLICY, links::ALLOWED_DOMAINS.clone())
    }

    pub fn policy(&self) -> LinkPolicy {
        self.policy
    }

    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }

    pub fn check(&self, text: &str) -> LinkVerdict {
        if self.policy == LinkPolicy::Any {
            return LinkVerdict::Accepted(text.trim().to_string());
        }

        let Some(url) = extract_url(text) else {
            return LinkVerdict::NoLink;
        };

        if self.policy == LinkPolicy::AllowList && !is_allowed(url, &self.allowed_domains) {
            return LinkVerdict::Rejected(url.to_string());
        }

        LinkVerdict::Accepted(url.to_string())
    }
}
