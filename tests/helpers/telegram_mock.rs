//! Mock Telegram API server for testing
//!
//! Wiremock stand-in for the Bot API endpoints the crate calls directly.
//! Method names are matched case-insensitively since teloxide sends them
//! capitalized.

use serde_json::{json, Value};
use teloxide::Bot;
use wiremock::{
    matchers::{method, path_regex},
    Mock, MockServer, ResponseTemplate,
};

pub const TEST_BOT_TOKEN: &str = "123456:TEST_TOKEN";

pub struct TelegramMockServer {
    pub server: MockServer,
}

impl TelegramMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Bot pointed at this server
    pub fn bot(&self) -> Bot {
        let url = url::Url::parse(&self.server.uri()).expect("mock server uri");
        Bot::new(TEST_BOT_TOKEN).set_api_url(url)
    }

    fn method_path(name: &str) -> String {
        format!("(?i)^/bot{}/{}$", regex::escape(TEST_BOT_TOKEN), name)
    }

    pub async fn mock_ok(&self, api_method: &str, result: Value) {
        Mock::given(method("POST"))
            .and(path_regex(Self::method_path(api_method)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": result })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_error(&self, api_method: &str, description: &str) {
        Mock::given(method("POST"))
            .and(path_regex(Self::method_path(api_method)))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "error_code": 400,
                "description": description,
            })))
            .mount(&self.server)
            .await;
    }

    /// `getFile` answer pointing at `file_path`
    pub async fn mock_get_file(&self, file_id: &str, file_path: &str, size: u32) {
        self.mock_ok(
            "getFile",
            json!({
                "file_id": file_id,
                "file_unique_id": format!("unique-{}", file_id),
                "file_size": size,
                "file_path": file_path,
            }),
        )
        .await;
    }

    /// Teloxide percent-encodes the separators of the file path, so both forms match
    pub async fn mock_download(&self, file_path: &str, body: &[u8]) {
        let segments: Vec<String> = file_path.split('/').map(regex::escape).collect();
        Mock::given(method("GET"))
            .and(path_regex(format!(
                "^/file/bot{}/{}$",
                regex::escape(TEST_BOT_TOKEN),
                segments.join("(?:/|%2F)")
            )))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_send_message(&self, chat_id: i64) {
        self.mock_ok(
            "sendMessage",
            json!({
                "message_id": 1,
                "date": 1_700_000_000,
                "chat": { "id": chat_id, "type": "private", "first_name": "Test" },
                "from": { "id": 42, "is_bot": true, "first_name": "ACBot", "username": "ac_test_bot" },
                "text": "ok",
            }),
        )
        .await;
    }

    pub async fn received_paths(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|request| request.url.path().to_string())
            .collect()
    }
}
