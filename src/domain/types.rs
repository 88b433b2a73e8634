use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::logging::clock;

// ─── HTTP Types ───────────────────────────────────────────────────────────────

/// HTTP method of a tracked call, serialized as its upper-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

// ─── Log Record ───────────────────────────────────────────────────────────────

/// Request half of a log record. The payload here is the sanitized copy;
/// the size is measured on the original.
#[derive(Debug, Clone, Serialize)]
pub struct RequestInfo {
    pub payload: Value,
    pub size_bytes: u64,
}

/// Response half of a log record.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseInfo {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Timing of a tracked call.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceInfo {
    pub duration_seconds: f64,
    pub requests_per_second: f64,
}

impl PerformanceInfo {
    pub fn from_duration(seconds: f64) -> Self {
        Self {
            duration_seconds: round_to_3(seconds),
            requests_per_second: if seconds > 0.0 {
                round_to_2(1.0 / seconds)
            } else {
                0.0
            },
        }
    }
}

/// One emitted event: a single outbound call and whatever was captured about
/// it. Immutable once constructed; `success` is computed by the constructor
/// from `error` and `response` only, never set by callers.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub test_name: String,
    pub endpoint: String,
    pub method: HttpMethod,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
}

impl LogRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        test_name: String,
        endpoint: String,
        method: HttpMethod,
        request: Option<RequestInfo>,
        response: Option<ResponseInfo>,
        performance: Option<PerformanceInfo>,
        error: Option<String>,
        metadata: Option<BTreeMap<String, Value>>,
    ) -> Self {
        let success = Self::derive_success(error.as_deref(), response.as_ref());
        Self {
            timestamp: clock::format_datetime(clock::epoch_ms()),
            test_name,
            endpoint,
            method,
            success,
            request,
            response,
            performance,
            error,
            metadata,
        }
    }

    /// `success == no error AND (no response OR status < 400)`.
    ///
    /// A scope that captured neither a response nor an error therefore logs
    /// as success; the derivation only looks at what was captured.
    pub fn derive_success(error: Option<&str>, response: Option<&ResponseInfo>) -> bool {
        error.is_none() && response.map_or(true, |r| r.status_code < 400)
    }
}

// ─── Test Outcomes ────────────────────────────────────────────────────────────

/// Status of one test invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Pass,
    Fail,
    Skip,
    Warning,
}

impl TestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::Pass => "PASS",
            TestStatus::Fail => "FAIL",
            TestStatus::Skip => "SKIP",
            TestStatus::Warning => "WARNING",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            TestStatus::Pass => "✅",
            TestStatus::Fail => "❌",
            TestStatus::Skip => "⏭️",
            TestStatus::Warning => "⚠️",
        }
    }
}

/// The recorded result of one test invocation. Categories are free-form
/// strings so new groupings need no schema change. Created once by the run
/// loop, never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct TestOutcome {
    pub name: String,
    pub category: String,
    pub status: TestStatus,
    pub duration: f64,
    pub details: String,
    pub error_message: String,
    pub timestamp: String,
}

impl TestOutcome {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        status: TestStatus,
        duration: f64,
        details: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            status,
            duration,
            details: details.into(),
            error_message: error_message.into(),
            timestamp: clock::format_clock(clock::epoch_ms()),
        }
    }
}

// ─── Derived Summaries ────────────────────────────────────────────────────────

/// Per-status totals over a set of outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub warnings: usize,
}

impl StatusCounts {
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64 * 100.0
        }
    }
}

/// Aggregate over the outcomes of one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategorySummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub warnings: usize,
    pub avg_duration: f64,
    pub total_duration: f64,
}

/// One entry in the slowest-test ranking.
#[derive(Debug, Clone, Serialize)]
pub struct SlowTest {
    pub name: String,
    pub category: String,
    pub duration: f64,
}

/// Pure projection over the outcome sequence — never stored, so two reports
/// over the same outcomes are identical.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub counts: StatusCounts,
    pub total_duration: f64,
    pub avg_duration: f64,
    pub categories: BTreeMap<String, CategorySummary>,
    pub slowest: Vec<SlowTest>,
    pub failures: Vec<TestOutcome>,
    pub recommendations: Vec<String>,
}

pub(crate) fn round_to_3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

pub(crate) fn round_to_2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
