//! HTTP transport seam shared by the source clients.

mod basic;
mod client;
pub mod auth;
#[cfg(test)]
pub(crate) mod testing;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Builds a bare `GET` request for `url`.
pub fn get_request(url: &str) -> Result<Request> {
    Ok(Request::new(Method::GET, url.parse()?))
}

/// Builds a `POST` request for `url` carrying `body` as JSON.
pub fn post_json_request<B: Serialize>(url: &str, body: &B) -> Result<Request> {
    let mut req = Request::new(Method::POST, url.parse()?);
    req.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    *req.body_mut() = Some(serde_json::to_vec(body)?.into());
    Ok(req)
}

/// Executes `req` and decodes a successful JSON response into `T`.
///
/// A non-success status is an error carrying the response body, so callers
/// can log what the API complained about. Errors never include the query
/// string: it may carry an API key.
pub async fn fetch_json<C: HttpClient, T: DeserializeOwned>(client: &C, req: Request) -> Result<T> {
    let url = req.url().clone();
    let resp = client
        .execute(req)
        .await
        .map_err(reqwest::Error::without_url)
        .with_context(|| format!("request to {} failed", url.path()))?;

    let status = resp.status();
    let bytes = resp
        .bytes()
        .await
        .map_err(reqwest::Error::without_url)
        .with_context(|| format!("failed to read response from {}", url.path()))?;
    if !status.is_success() {
        let body = String::from_utf8_lossy(&bytes);
        return Err(anyhow::anyhow!(
            "{} returned status {}: {}",
            url.path(),
            status,
            body
        ));
    }

    serde_json::from_slice(&bytes)
        .with_context(|| format!("unexpected response shape from {}", url.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::auth::UrlParam;
    use crate::fetch::testing::CannedClient;

    #[test]
    fn test_post_json_request_sets_body_and_content_type() {
        let body = serde_json::json!({ "location": { "latitude": 1.5 } });
        let req = post_json_request("https://example.com/v1/lookup", &body).unwrap();

        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.headers()[CONTENT_TYPE], "application/json");
        let sent: serde_json::Value =
            serde_json::from_slice(req.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(sent, body);
    }

    #[test]
    fn test_get_request_rejects_invalid_url() {
        assert!(get_request("not a url").is_err());
    }

    #[derive(Debug, serde::Deserialize)]
    struct Answer {
        value: u32,
    }

    #[tokio::test]
    async fn test_fetch_json_decodes_success() {
        let client = CannedClient::ok(r#"{"value": 7}"#);
        let req = get_request("https://example.com/v1/answer").unwrap();

        let answer: Answer = fetch_json(&client, req).await.unwrap();
        assert_eq!(answer.value, 7);
    }

    #[tokio::test]
    async fn test_fetch_json_rejects_non_success_status() {
        let client = CannedClient::status(503, "backend unavailable");
        let req = get_request("https://example.com/v1/answer").unwrap();

        let err = fetch_json::<_, Answer>(&client, req).await.unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("503"));
        assert!(msg.contains("backend unavailable"));
    }

    #[tokio::test]
    async fn test_fetch_json_rejects_unexpected_shape() {
        let client = CannedClient::ok(r#"{"value": "seven"}"#);
        let req = get_request("https://example.com/v1/answer").unwrap();

        let err = fetch_json::<_, Answer>(&client, req).await.unwrap_err();
        assert!(format!("{err:#}").contains("unexpected response shape"));
    }

    #[tokio::test]
    async fn test_url_param_appends_key() {
        let client = UrlParam::key(CannedClient::ok(r#"{"value": 1}"#), "abc123".to_string());
        let req = get_request("https://example.com/v1/answer?x=1").unwrap();

        fetch_json::<_, Answer>(&client, req).await.unwrap();
        assert_eq!(
            client.inner.last_url().unwrap(),
            "https://example.com/v1/answer?x=1&key=abc123"
        );
    }

    #[tokio::test]
    async fn test_transport_error_does_not_leak_key() {
        let client = UrlParam::key(BasicClient::new(), "SECRET_KEY_123".to_string());
        let req = post_json_request(
            "http://127.0.0.1:1/v1/currentConditions:lookup",
            &serde_json::json!({}),
        )
        .unwrap();

        let err = fetch_json::<_, Answer>(&client, req).await.unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("/v1/currentConditions:lookup"));
        assert!(!msg.contains("SECRET_KEY_123"));
    }
}
