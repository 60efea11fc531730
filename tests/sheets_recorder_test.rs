//! Sheets recorder against mocked OAuth, Drive and Sheets endpoints

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use contest_bot::conversation::{Entry, Genre, Submitter};
use contest_bot::recording::google_auth::ServiceAccountKey;
use contest_bot::recording::sheets::SpreadsheetRef;
use contest_bot::recording::{RecordError, Recorder, SheetsRecorder, Submission};

const TEST_PRIVATE_KEY: &str = include_str!("fixtures/test_service_account_key.pem");
const SPREADSHEET_ID: &str = "sheet-123";

fn service_account(server: &MockServer) -> ServiceAccountKey {
    let key = json!({
        "type": "service_account",
        "project_id": "contest",
        "private_key_id": "key-1",
        "private_key": TEST_PRIVATE_KEY,
        "client_email": "contest-bot@contest.iam.gserviceaccount.com",
        "token_uri": format!("{}/token", server.uri()),
    });
    ServiceAccountKey::from_json(&key.to_string()).unwrap()
}

fn recorder(server: &MockServer, spreadsheet: SpreadsheetRef) -> SheetsRecorder {
    SheetsRecorder::new(service_account(server), spreadsheet, reqwest::Client::new())
        .with_endpoints(server.uri(), server.uri())
}

fn rock_submission() -> Submission {
    Submission::new(
        &Submitter::new(42, Some("artist".into())),
        Entry::GenreLeague(Genre::Rock),
        "https://yourtunes.net/r/xyz",
    )
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.test-token",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_drive_lookup(server: &MockServer, files: Value) {
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(header("authorization", "Bearer ya29.test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": files })))
        .mount(server)
        .await;
}

async fn mount_sheet_meta(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{}", SPREADSHEET_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sheets": [
                { "properties": { "title": "Заявки" } },
                { "properties": { "title": "Архив" } }
            ]
        })))
        .mount(server)
        .await;
}

fn append_path() -> String {
    format!("^/v4/spreadsheets/{}/values/.+:append$", SPREADSHEET_ID)
}

async fn mount_append(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path_regex(append_path()))
        .and(query_param("valueInputOption", "RAW"))
        .and(query_param("insertDataOption", "INSERT_ROWS"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "spreadsheetId": SPREADSHEET_ID })))
        .mount(server)
        .await;
}

async fn requests_to(server: &MockServer, path_prefix: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path().starts_with(path_prefix))
        .collect()
}

#[tokio::test]
async fn test_appends_row_to_first_sheet_of_named_spreadsheet() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_drive_lookup(&server, json!([{ "id": SPREADSHEET_ID, "name": "yourtunes CONTEST" }])).await;
    mount_sheet_meta(&server).await;
    mount_append(&server, 200).await;

    let submission = rock_submission();
    recorder(&server, SpreadsheetRef::Name("yourtunes CONTEST".into()))
        .record(&submission)
        .await
        .unwrap();

    let token_requests = requests_to(&server, "/token").await;
    let form = String::from_utf8_lossy(&token_requests[0].body).to_string();
    assert!(form.contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"));
    assert!(form.contains("assertion=ey"), "assertion should be a JWT: {}", form);

    let lookups = requests_to(&server, "/drive/v3/files").await;
    let query: String = lookups[0]
        .url
        .query_pairs()
        .find(|(k, _)| k == "q")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    assert_eq!(
        query,
        "name = 'yourtunes CONTEST' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false"
    );

    let appends = requests_to(&server, &format!("/v4/spreadsheets/{}/values/", SPREADSHEET_ID)).await;
    assert_eq!(appends.len(), 1);
    let decoded_path = urlencoding::decode(appends[0].url.path()).unwrap();
    assert!(decoded_path.ends_with("/values/'Заявки'!A:E:append"), "{}", decoded_path);

    let body: Value = serde_json::from_slice(&appends[0].body).unwrap();
    assert_eq!(
        body,
        json!({
            "values": [[
                submission.timestamp_label(),
                "ЛИГА ЖАНРОВ",
                "Рок",
                "@artist",
                "https://yourtunes.net/r/xyz"
            ]]
        })
    );
}

#[tokio::test]
async fn test_token_and_spreadsheet_are_resolved_once() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_drive_lookup(&server, json!([{ "id": SPREADSHEET_ID }])).await;
    mount_sheet_meta(&server).await;
    mount_append(&server, 200).await;

    let sheets = recorder(&server, SpreadsheetRef::Name("yourtunes CONTEST".into()));
    sheets.record(&rock_submission()).await.unwrap();
    sheets.record(&rock_submission()).await.unwrap();

    assert_eq!(requests_to(&server, "/drive/v3/files").await.len(), 1);
    assert_eq!(
        requests_to(&server, &format!("/v4/spreadsheets/{}/values/", SPREADSHEET_ID))
            .await
            .len(),
        2
    );
}

#[tokio::test]
async fn test_configured_id_skips_drive_lookup() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_sheet_meta(&server).await;
    mount_append(&server, 200).await;

    recorder(&server, SpreadsheetRef::Id(SPREADSHEET_ID.into()))
        .record(&rock_submission())
        .await
        .unwrap();

    assert!(requests_to(&server, "/drive").await.is_empty());
}

#[tokio::test]
async fn test_unknown_spreadsheet_name_is_not_found() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_drive_lookup(&server, json!([])).await;

    let err = recorder(&server, SpreadsheetRef::Name("missing".into()))
        .record(&rock_submission())
        .await
        .unwrap_err();

    assert!(matches!(&err, RecordError::NotFound(name) if name == "missing"), "got {:?}", err);
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_expired_token_is_refreshed_once() {
    let server = MockServer::start().await;
    mount_token(&server, 2).await;
    mount_sheet_meta(&server).await;
    Mock::given(method("POST"))
        .and(path_regex(append_path()))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": { "code": 401 } })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_append(&server, 200).await;

    recorder(&server, SpreadsheetRef::Id(SPREADSHEET_ID.into()))
        .record(&rock_submission())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_backend_outage_is_transient() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    mount_sheet_meta(&server).await;
    mount_append(&server, 503).await;

    let err = recorder(&server, SpreadsheetRef::Id(SPREADSHEET_ID.into()))
        .record(&rock_submission())
        .await
        .unwrap_err();

    assert!(matches!(err, RecordError::Api { status: 503, .. }), "got {:?}", err);
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_rejected_token_exchange_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        })))
        .mount(&server)
        .await;

    let err = recorder(&server, SpreadsheetRef::Id(SPREADSHEET_ID.into()))
        .record(&rock_submission())
        .await
        .unwrap_err();

    assert!(matches!(&err, RecordError::Auth(message) if message.contains("invalid_grant")), "got {:?}", err);
    assert!(!err.is_transient());
}
