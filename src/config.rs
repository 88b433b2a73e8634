//! Run configuration: where the server is, how to authenticate, and where
//! the logs go. Everything is overridable through `PROBEMAN_*` environment
//! variables.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub log_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            api_key: None,
            timeout_secs: 30,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl ServerConfig {
    /// Defaults overlaid with `PROBEMAN_BASE_URL`, `PROBEMAN_API_KEY`,
    /// `PROBEMAN_TIMEOUT_SECS`, and `PROBEMAN_LOG_DIR` where set. A
    /// non-numeric timeout keeps the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = env::var("PROBEMAN_BASE_URL") {
            if !base_url.is_empty() {
                config.base_url = base_url;
            }
        }
        if let Ok(api_key) = env::var("PROBEMAN_API_KEY") {
            if !api_key.is_empty() {
                config.api_key = Some(api_key);
            }
        }
        if let Ok(timeout) = env::var("PROBEMAN_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                config.timeout_secs = secs;
            }
        }
        if let Ok(log_dir) = env::var("PROBEMAN_LOG_DIR") {
            if !log_dir.is_empty() {
                config.log_dir = PathBuf::from(log_dir);
            }
        }
        config
    }
}

/// The endpoint catalog swept by the availability suite: logical name and
/// path, in sweep order.
pub fn known_endpoints() -> Vec<(&'static str, &'static str)> {
    vec![
        ("chat", "/chat"),
        ("completions", "/v1/completions"),
        ("chat_completions", "/v1/chat/completions"),
        ("embeddings", "/v1/embeddings"),
        ("documents", "/documents"),
        ("document_upload", "/documents/upload"),
        ("search", "/search"),
        ("search_advanced", "/search/advanced"),
        ("workflows", "/workflows"),
        ("health", "/health"),
        ("models", "/models"),
        ("engines", "/engines"),
        ("vector_search", "/vector-search"),
        ("retrieve", "/retrieve"),
        ("parse_pdf", "/parse-pdf"),
        ("parse_docx", "/parse-docx"),
        ("agents", "/agents"),
        ("agents_health", "/agents/health"),
        ("agents_metrics", "/agents/metrics"),
    ]
}
