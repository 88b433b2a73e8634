//! Scoped tracking of one outbound call.
//!
//! Constructing a [`RequestTracker`] starts the clock; dropping it emits
//! exactly one record, on every exit path — normal completion, `?`, or an
//! unwinding panic. The tracker observes failures, it never suppresses them:
//! a transport error is recorded via [`RequestTracker::set_error`] and then
//! propagated by the caller.

use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::mem;
use std::sync::Arc;
use std::time::Instant;

use crate::domain::{HttpMethod, LogRecord, PerformanceInfo, RequestInfo, ResponseInfo};
use crate::engine::http::HttpResponse;
use crate::logging::{sanitize, StructuredLogger};

/// How much of a non-JSON body is kept for the record.
const RAW_BODY_PREVIEW_CHARS: usize = 500;

pub struct RequestTracker {
    logger: Arc<StructuredLogger>,
    test_name: String,
    endpoint: String,
    method: HttpMethod,
    request_payload: Option<Value>,
    metadata: Option<BTreeMap<String, Value>>,
    started: Instant,
    response: Option<ResponseInfo>,
    error: Option<String>,
}

impl RequestTracker {
    pub fn new(
        logger: Arc<StructuredLogger>,
        test_name: impl Into<String>,
        endpoint: impl Into<String>,
        method: HttpMethod,
    ) -> Self {
        Self {
            logger,
            test_name: test_name.into(),
            endpoint: endpoint.into(),
            method,
            request_payload: None,
            metadata: None,
            started: Instant::now(),
            response: None,
            error: None,
        }
    }

    /// Attach the outbound payload. The tracker keeps its own copy for
    /// logging; sanitization happens at emission, so the value passed to the
    /// transport is never modified.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.request_payload = Some(payload);
        self
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Capture a completed response: status, headers, body size, and a parsed
    /// copy of the body when it is JSON (a short raw preview otherwise).
    pub fn set_response(&mut self, response: &HttpResponse) {
        let data = match response.json() {
            Some(parsed) => sanitize(&parsed),
            None => {
                let preview: String = response.body.chars().take(RAW_BODY_PREVIEW_CHARS).collect();
                json!({ "raw_content": preview })
            }
        };
        self.response = Some(ResponseInfo {
            status_code: response.status,
            headers: response.headers.clone(),
            size_bytes: response.size_bytes,
            data: Some(data),
        });
    }

    /// Capture a failure reason (connection refused, timeout, ...).
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }
}

impl Drop for RequestTracker {
    fn drop(&mut self) {
        let duration = self.started.elapsed().as_secs_f64();
        let request = self.request_payload.take().map(|payload| RequestInfo {
            size_bytes: serde_json::to_vec(&payload)
                .map(|bytes| bytes.len() as u64)
                .unwrap_or(0),
            payload: sanitize(&payload),
        });
        let record = LogRecord::new(
            mem::take(&mut self.test_name),
            mem::take(&mut self.endpoint),
            self.method,
            request,
            self.response.take(),
            Some(PerformanceInfo::from_duration(duration)),
            self.error.take(),
            self.metadata.take(),
        );
        self.logger.emit(&record);
    }
}
