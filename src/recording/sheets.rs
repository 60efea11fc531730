//! Google Sheets recorder
//!
//! Appends one row per submission to the first worksheet of the contest
//! spreadsheet: timestamp, league, genre, handle, link.
//!
//! The spreadsheet is found by name through the Drive API unless an ID is
//! configured. The resolved ID and worksheet title are cached for the
//! lifetime of the recorder and forgotten when the spreadsheet disappears.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use url::Url;

use super::google_auth::{ServiceAccountKey, TokenProvider};
use super::{RecordError, Recorder, Submission};
use crate::core::config;

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Which spreadsheet receives the rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpreadsheetRef {
    Id(String),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    id: String,
    sheet_title: String,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

pub struct SheetsRecorder {
    tokens: TokenProvider,
    client: reqwest::Client,
    spreadsheet: SpreadsheetRef,
    sheets_url: String,
    drive_url: String,
    target: Mutex<Option<Target>>,
}

impl SheetsRecorder {
    pub fn new(key: ServiceAccountKey, spreadsheet: SpreadsheetRef, client: reqwest::Client) -> Self {
        Self {
            tokens: TokenProvider::new(key, config::sheets::SCOPES, client.clone()),
            client,
            spreadsheet,
            sheets_url: config::sheets::SHEETS_API_URL.to_string(),
            drive_url: config::sheets::DRIVE_API_URL.to_string(),
            target: Mutex::new(None),
        }
    }

    /// Points the recorder at different API hosts (used against mock servers).
    pub fn with_endpoints(mut self, sheets_url: impl Into<String>, drive_url: impl Into<String>) -> Self {
        self.sheets_url = sheets_url.into();
        self.drive_url = drive_url.into();
        self
    }

    /// Recorder for the configured spreadsheet and service account.
    pub fn from_config() -> Result<Self, RecordError> {
        let key = ServiceAccountKey::from_config()?;
        let spreadsheet = match config::sheets::SPREADSHEET_ID.as_deref() {
            Some(id) => SpreadsheetRef::Id(id.to_string()),
            None => SpreadsheetRef::Name(config::sheets::SPREADSHEET_NAME.clone()),
        };
        let client = reqwest::Client::builder()
            .timeout(config::network::timeout())
            .build()?;
        log::info!(
            "Sheets recorder: {:?} as {}",
            spreadsheet,
            key.client_email
        );
        Ok(Self::new(key, spreadsheet, client))
    }

    /// Sends a request with a bearer token, refreshing the token once on 401.
    async fn send_authorized<F>(&self, service: &'static str, build: F) -> Result<Response, RecordError>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let mut refreshed = false;
        loop {
            let token = self.tokens.token().await?;
            let response = build(&self.client).bearer_auth(token).send().await?;
            let status = response.status();

            if status == StatusCode::UNAUTHORIZED && !refreshed {
                log::warn!("{} API rejected the access token, refreshing", service);
                self.tokens.invalidate().await;
                refreshed = true;
                continue;
            }
            if status == StatusCode::UNAUTHORIZED {
                return Err(RecordError::Auth(format!("{} API keeps answering 401", service)));
            }
            if !status.is_success() {
                return Err(RecordError::Api {
                    service,
                    status: status.as_u16(),
                    message: response.text().await.unwrap_or_default(),
                });
            }
            return Ok(response);
        }
    }

    async fn find_by_name(&self, name: &str) -> Result<String, RecordError> {
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            escape_query_literal(name),
            SPREADSHEET_MIME
        );
        let url = format!("{}/drive/v3/files", self.drive_url.trim_end_matches('/'));

        let list: FileList = self
            .send_authorized("Drive", |client| {
                client.get(&url).query(&[
                    ("q", query.as_str()),
                    ("fields", "files(id,name)"),
                    ("pageSize", "1"),
                    ("supportsAllDrives", "true"),
                    ("includeItemsFromAllDrives", "true"),
                ])
            })
            .await?
            .json()
            .await?;

        list.files
            .into_iter()
            .next()
            .map(|file| file.id)
            .ok_or_else(|| RecordError::NotFound(name.to_string()))
    }

    async fn first_sheet_title(&self, id: &str) -> Result<String, RecordError> {
        let url = self.spreadsheet_url(id, &[])?;
        let meta: SpreadsheetMeta = self
            .send_authorized("Sheets", |client| {
                client.get(url.clone()).query(&[("fields", "sheets.properties.title")])
            })
            .await
            .map_err(|e| not_found_on_404(e, id))?
            .json()
            .await?;

        meta.sheets
            .into_iter()
            .next()
            .map(|sheet| sheet.properties.title)
            .ok_or_else(|| RecordError::NotFound(format!("{} has no worksheets", id)))
    }

    async fn resolve(&self) -> Result<Target, RecordError> {
        let mut target = self.target.lock().await;
        if let Some(resolved) = target.as_ref() {
            return Ok(resolved.clone());
        }

        let id = match &self.spreadsheet {
            SpreadsheetRef::Id(id) => id.clone(),
            SpreadsheetRef::Name(name) => self.find_by_name(name).await?,
        };
        let sheet_title = self.first_sheet_title(&id).await?;
        log::info!("Recording submissions to spreadsheet {} / '{}'", id, sheet_title);

        let resolved = Target { id, sheet_title };
        *target = Some(resolved.clone());
        Ok(resolved)
    }

    async fn forget_target(&self) {
        *self.target.lock().await = None;
    }

    fn spreadsheet_url(&self, id: &str, tail: &[&str]) -> Result<Url, RecordError> {
        let invalid = || RecordError::NotFound(format!("bad Sheets endpoint {}", self.sheets_url));
        let mut url = Url::parse(&self.sheets_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", id])
            .extend(tail);
        Ok(url)
    }

    async fn append(&self, target: &Target, submission: &Submission) -> Result<(), RecordError> {
        let range = format!("{}!A:E:append", quote_sheet_title(&target.sheet_title));
        let url = self.spreadsheet_url(&target.id, &["values", &range])?;
        let body = json!({ "values": [submission.row()] });

        self.send_authorized("Sheets", |client| {
            client
                .post(url.clone())
                .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
                .json(&body)
        })
        .await
        .map_err(|e| not_found_on_404(e, &target.id))?;
        Ok(())
    }
}

#[async_trait]
impl Recorder for SheetsRecorder {
    fn name(&self) -> &'static str {
        "sheets"
    }

    async fn record(&self, submission: &Submission) -> Result<(), RecordError> {
        let target = self.resolve().await?;
        match self.append(&target, submission).await {
            Err(RecordError::NotFound(what)) => {
                self.forget_target().await;
                Err(RecordError::NotFound(what))
            }
            other => other,
        }
    }
}

fn not_found_on_404(err: RecordError, id: &str) -> RecordError {
    match err {
        RecordError::Api { status: 404, .. } => RecordError::NotFound(id.to_string()),
        other => other,
    }
}

/// Escapes a value for a single-quoted Drive query literal.
fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Quotes a worksheet title for A1 notation (`'My sheet'`).
fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_query_literal() {
        assert_eq!(escape_query_literal("yourtunes CONTEST"), "yourtunes CONTEST");
        assert_eq!(escape_query_literal("Bob's sheet"), "Bob\\'s sheet");
        assert_eq!(escape_query_literal("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_quote_sheet_title() {
        assert_eq!(quote_sheet_title("Лист1"), "'Лист1'");
        assert_eq!(quote_sheet_title("It's"), "'It''s'");
    }

    #[test]
    fn test_not_found_mapping() {
        let err = not_found_on_404(
            RecordError::Api {
                service: "Sheets",
                status: 404,
                message: String::new(),
            },
            "abc",
        );
        assert!(matches!(err, RecordError::NotFound(id) if id == "abc"));

        let err = not_found_on_404(RecordError::Auth("x".into()), "abc");
        assert!(matches!(err, RecordError::Auth(_)));
    }
}
