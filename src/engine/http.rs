//! Thin reqwest wrapper for one-shot calls against the configured server.
//!
//! Each call is issued exactly once — no retry, no backoff. A non-2xx status
//! is a normal response here (the tracker derives failure from it); only
//! transport-level problems surface as errors.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::config::ServerConfig;
use crate::domain::HttpMethod;
use crate::error::{Error, Result};

/// Everything captured about one HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub elapsed: Duration,
}

impl HttpResponse {
    /// Parse the body as JSON if it is JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// A configured client bound to one base URL, with optional API-key
/// pass-through (`Authorization: Bearer` plus `X-API-Key`).
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpClient {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    pub async fn get(&self, path: &str) -> Result<HttpResponse> {
        self.request(HttpMethod::Get, path, None, &BTreeMap::new())
            .await
    }

    pub async fn post_json(&self, path: &str, payload: &Value) -> Result<HttpResponse> {
        self.request(HttpMethod::Post, path, Some(payload), &BTreeMap::new())
            .await
    }

    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
        extra_headers: &BTreeMap<String, String>,
    ) -> Result<HttpResponse> {
        let mut request = self
            .client
            .request(method.into(), self.url_for(path))
            .headers(build_headers(extra_headers)?);

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key).header("X-API-Key", key);
        }
        if let Some(payload) = body {
            request = request.json(payload);
        }

        let started = Instant::now();
        let response = request.send().await?;

        let status = response.status();
        let mut headers = BTreeMap::new();
        for (key, value) in response.headers() {
            headers.insert(
                key.to_string(),
                value.to_str().unwrap_or_default().to_string(),
            );
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("text/plain")
            .to_string();

        let bytes = response.bytes().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            headers,
            body: String::from_utf8_lossy(&bytes).to_string(),
            content_type,
            size_bytes: bytes.len() as u64,
            elapsed: started.elapsed(),
        })
    }
}

/// Validate and assemble a header map from string pairs. Empty keys are
/// skipped.
pub fn build_headers(input: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for (key, value) in input {
        if key.is_empty() {
            continue;
        }

        let header_name =
            HeaderName::from_bytes(key.as_bytes()).map_err(|err| Error::InvalidHeader {
                name: key.clone(),
                reason: err.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|err| Error::InvalidHeader {
            name: key.clone(),
            reason: err.to_string(),
        })?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_headers_accepts_valid_pairs() {
        let mut input = BTreeMap::new();
        input.insert("Content-Type".to_string(), "application/json".to_string());
        input.insert(String::new(), "skipped".to_string());
        let headers = build_headers(&input).unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
    }

    #[test]
    fn build_headers_rejects_invalid_names() {
        let mut input = BTreeMap::new();
        input.insert("bad header".to_string(), "value".to_string());
        let err = build_headers(&input).unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { .. }));
    }

    #[test]
    fn url_for_joins_with_and_without_leading_slash() {
        let config = ServerConfig {
            base_url: "http://127.0.0.1:8080/".to_string(),
            ..ServerConfig::default()
        };
        let client = HttpClient::new(&config).unwrap();
        assert_eq!(client.url_for("/health"), "http://127.0.0.1:8080/health");
        assert_eq!(client.url_for("health"), "http://127.0.0.1:8080/health");
    }

    #[test]
    fn response_json_parses_when_possible() {
        let response = HttpResponse {
            status: 200,
            status_text: "OK".into(),
            headers: BTreeMap::new(),
            body: r#"{"status":"healthy"}"#.into(),
            content_type: "application/json".into(),
            size_bytes: 20,
            elapsed: Duration::from_millis(5),
        };
        assert_eq!(response.json().unwrap()["status"], "healthy");

        let plain = HttpResponse {
            body: "<html>".into(),
            ..response
        };
        assert!(plain.json().is_none());
    }
}
