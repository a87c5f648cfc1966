//! Canned-response transport for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::{Request, Response};

use super::client::HttpClient;

/// Answers every request with the same status and body, recording the URLs
/// it was asked for.
pub(crate) struct CannedClient {
    status: u16,
    body: String,
    urls: Mutex<Vec<String>>,
}

impl CannedClient {
    pub(crate) fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    pub(crate) fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            urls: Mutex::new(vec![]),
        }
    }

    pub(crate) fn last_url(&self) -> Option<String> {
        self.urls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl HttpClient for CannedClient {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        self.urls.lock().unwrap().push(req.url().to_string());
        let resp = http::Response::builder()
            .status(self.status)
            .body(self.body.clone())
            .unwrap();
        Ok(Response::from(resp))
    }
}
