//! Dual-sink structured logger.
//!
//! One console-oriented sink gets human-readable lines (and, via a tee, the
//! per-run transcript file); one file-oriented sink gets every record as a
//! `ENDPOINT_TEST_ENTRY:` JSON entry. Constructed once per run and passed
//! around explicitly — there is no global logger.

use std::io;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::domain::{LogRecord, StatusCounts};
use crate::logging::clock;
use crate::logging::sink::{ConsoleSink, FileSink, LogSink, TeeSink};

const BANNER_WIDTH: usize = 80;
const CONSOLE_DATA_LIMIT: usize = 1000;
const CONSOLE_ERROR_LIMIT: usize = 120;

/// Name of the append-mode record log, cumulative across runs.
pub const ENDPOINT_LOG_FILE: &str = "endpoint_tests.log";

/// Name of the per-run transcript, truncated at process start.
pub const TRANSCRIPT_FILE: &str = "test_run.log";

pub struct StructuredLogger {
    console: Arc<dyn LogSink>,
    file: Arc<dyn LogSink>,
}

impl StructuredLogger {
    pub fn new(console: Arc<dyn LogSink>, file: Arc<dyn LogSink>) -> Self {
        Self { console, file }
    }

    /// Standard wiring for a run: console output mirrored line-for-line into
    /// a fresh transcript, record entries appended to the cumulative log.
    pub fn for_run(log_dir: &Path) -> io::Result<Self> {
        let transcript = FileSink::truncate(&log_dir.join(TRANSCRIPT_FILE))?;
        let console = TeeSink::new(vec![Box::new(ConsoleSink), Box::new(transcript)]);
        let file = FileSink::append(&log_dir.join(ENDPOINT_LOG_FILE))?;
        Ok(Self::new(Arc::new(console), Arc::new(file)))
    }

    /// Write a raw line to the console sink (and therefore the transcript).
    pub fn console_line(&self, line: &str) {
        self.write_console(line);
    }

    /// Emit one completed record: a summary line plus payload/response blocks
    /// on the console sink, the dated full JSON entry on the file sink.
    /// Called strictly after the tracked operation has completed, so a sink
    /// failure here can never corrupt the call's own result.
    pub fn emit(&self, record: &LogRecord) {
        let summary = format_summary_line(record);
        self.write_console(&summary);

        if let Some(request) = &record.request {
            if !request.payload.is_null() {
                if let Ok(payload) = serde_json::to_string_pretty(&request.payload) {
                    self.write_console(&format!("📤 Request Payload:\n{payload}"));
                }
            }
        }
        if let Some(response) = &record.response {
            match &response.data {
                Some(data) => {
                    if let Ok(mut text) = serde_json::to_string_pretty(data) {
                        if text.chars().count() > CONSOLE_DATA_LIMIT {
                            text = text.chars().take(CONSOLE_DATA_LIMIT).collect::<String>()
                                + "... [truncated]";
                        }
                        let label = if record.success {
                            "📥 Response Data:"
                        } else {
                            "📥 Error Response Data:"
                        };
                        self.write_console(&format!("{label}\n{text}"));
                    }
                }
                None if !record.success => {
                    self.write_console(&format!(
                        "📥 HTTP {} response (no JSON data available)",
                        response.status_code
                    ));
                }
                None => {}
            }
        }

        self.write_file(&format!(
            "{} - INFO - {summary}",
            clock::format_datetime(clock::epoch_ms())
        ));
        match serde_json::to_string_pretty(record) {
            Ok(entry) => self.write_file(&format!("ENDPOINT_TEST_ENTRY: {entry}")),
            Err(err) => eprintln!("failed to serialize log record: {err}"),
        }
    }

    /// Section marker at the start of a run.
    pub fn log_run_start(&self, name: &str, description: &str) {
        let separator = "=".repeat(BANNER_WIDTH);
        self.write_both(&separator);
        self.write_both(&format!("🚀 STARTING TEST SUITE: {name}"));
        if !description.is_empty() {
            self.write_both(&format!("📝 Description: {description}"));
        }
        self.write_both(&format!(
            "⏰ Started at: {}",
            clock::format_datetime(clock::epoch_ms())
        ));
        self.write_both(&separator);
    }

    /// Section marker at the end of a run, with an insight list derived from
    /// the counts. Presentational only — the counts stay authoritative.
    pub fn log_run_end(&self, name: &str, counts: &StatusCounts) {
        let separator = "=".repeat(BANNER_WIDTH);
        self.write_both(&separator);
        self.write_both(&format!("🏁 COMPLETED TEST SUITE: {name}"));

        let summary = json!({
            "overview": {
                "total_tests": counts.total,
                "passed": counts.passed,
                "failed": counts.failed,
                "skipped": counts.skipped,
                "warnings": counts.warnings,
                "success_rate": format!("{:.1}%", counts.success_rate()),
            },
            "insights": run_end_insights(counts),
        });
        if let Ok(text) = serde_json::to_string_pretty(&summary) {
            self.write_both(&format!("📊 Summary: {text}"));
        }

        self.write_both(&format!(
            "⏰ Completed at: {}",
            clock::format_datetime(clock::epoch_ms())
        ));
        self.write_both(&separator);
    }

    fn write_console(&self, line: &str) {
        if let Err(err) = self.console.write_line(line) {
            eprintln!("console sink error: {err}");
        }
    }

    fn write_file(&self, line: &str) {
        if let Err(err) = self.file.write_line(line) {
            eprintln!("file sink error: {err}");
        }
    }

    fn write_both(&self, line: &str) {
        self.write_console(line);
        self.write_file(line);
    }
}

fn format_summary_line(record: &LogRecord) -> String {
    let status = if record.success { "✅ PASS" } else { "❌ FAIL" };
    let mut line = format!(
        "[{status}] {} - {} {}",
        record.test_name, record.method, record.endpoint
    );
    if let Some(request) = &record.request {
        line.push_str(&format!(" | Request: {}B", request.size_bytes));
    }
    if let Some(response) = &record.response {
        line.push_str(&format!(
            " | Response: {} ({}B)",
            response.status_code, response.size_bytes
        ));
    }
    if let Some(performance) = &record.performance {
        line.push_str(&format!(" | Duration: {}s", performance.duration_seconds));
    }
    if let Some(error) = &record.error {
        let mut short: String = error.chars().take(CONSOLE_ERROR_LIMIT).collect();
        if error.chars().count() > CONSOLE_ERROR_LIMIT {
            short.push_str("...");
        }
        line.push_str(&format!(" | Error: {short}"));
    }
    line
}

/// Derived observations about a finished run.
pub fn run_end_insights(counts: &StatusCounts) -> Vec<String> {
    let mut insights = Vec::new();
    if counts.failed > counts.passed {
        insights
            .push("⚠️ More tests failed than passed - system may have significant issues".into());
    } else if counts.failed > 0 {
        insights.push(format!(
            "⚠️ {} test(s) failed - check individual test logs for details",
            counts.failed
        ));
    } else if counts.total > 0 && counts.passed == counts.total {
        insights.push("✅ All tests passed successfully".into());
    }
    if counts.skipped > 0 {
        insights.push(format!("ℹ️ {} test(s) were skipped", counts.skipped));
    }
    if counts.warnings > 0 {
        insights.push(format!("⚠️ {} test(s) had warnings", counts.warnings));
    }
    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HttpMethod, PerformanceInfo, RequestInfo, ResponseInfo};
    use crate::logging::sink::MemorySink;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn memory_logger() -> (StructuredLogger, Arc<MemorySink>, Arc<MemorySink>) {
        let console = Arc::new(MemorySink::new());
        let file = Arc::new(MemorySink::new());
        let logger = StructuredLogger::new(console.clone(), file.clone());
        (logger, console, file)
    }

    fn sample_record(status_code: u16) -> LogRecord {
        LogRecord::new(
            "Basic Completion".into(),
            "/v1/chat/completions".into(),
            HttpMethod::Post,
            Some(RequestInfo {
                payload: json!({ "model": "qwen3-0.6b" }),
                size_bytes: 24,
            }),
            Some(ResponseInfo {
                status_code,
                headers: BTreeMap::new(),
                size_bytes: 512,
                data: Some(json!({ "ok": true })),
            }),
            Some(PerformanceInfo::from_duration(1.5)),
            None,
            None,
        )
    }

    #[test]
    fn emit_writes_summary_line_and_json_entry() {
        let (logger, console, file) = memory_logger();
        logger.emit(&sample_record(200));

        let console_lines = console.lines();
        assert!(console_lines[0].starts_with("[✅ PASS] Basic Completion - POST /v1/chat/completions"));
        assert!(console_lines[0].contains("| Request: 24B"));
        assert!(console_lines[0].contains("| Response: 200 (512B)"));
        assert!(console_lines[0].contains("| Duration: 1.5s"));

        let file_lines = file.lines();
        assert_eq!(file_lines.len(), 2);
        assert!(file_lines[0].contains(" - INFO - [✅ PASS]"));
        let entry = file_lines[1]
            .strip_prefix("ENDPOINT_TEST_ENTRY: ")
            .expect("entry prefix");
        let parsed: serde_json::Value = serde_json::from_str(entry).unwrap();
        assert_eq!(parsed["test_name"], "Basic Completion");
        assert_eq!(parsed["success"], true);
        assert_eq!(parsed["response"]["status_code"], 200);
    }

    #[test]
    fn emit_marks_protocol_errors_as_fail() {
        let (logger, console, _file) = memory_logger();
        logger.emit(&sample_record(500));
        assert!(console.lines()[0].starts_with("[❌ FAIL]"));
    }

    #[test]
    fn exactly_one_entry_per_emit() {
        let (logger, _console, file) = memory_logger();
        logger.emit(&sample_record(200));
        logger.emit(&sample_record(404));
        let entries = file
            .lines()
            .into_iter()
            .filter(|line| line.starts_with("ENDPOINT_TEST_ENTRY: "))
            .count();
        assert_eq!(entries, 2);
    }

    #[test]
    fn a_failing_sink_never_aborts_emission() {
        struct FailingSink;
        impl crate::logging::sink::LogSink for FailingSink {
            fn write_line(&self, _line: &str) -> std::io::Result<()> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
            }
        }

        // Console sink broken: the file sink still gets the full record.
        let file = Arc::new(MemorySink::new());
        let logger = StructuredLogger::new(Arc::new(FailingSink), file.clone());
        logger.emit(&sample_record(200));
        let entries = file
            .lines()
            .into_iter()
            .filter(|line| line.starts_with("ENDPOINT_TEST_ENTRY: "))
            .count();
        assert_eq!(entries, 1);

        // Both sinks broken: emit still returns normally.
        let logger = StructuredLogger::new(Arc::new(FailingSink), Arc::new(FailingSink));
        logger.emit(&sample_record(500));
        logger.log_run_end("Suite", &StatusCounts::default());
    }

    #[test]
    fn run_end_insights_reflect_counts() {
        let insights = run_end_insights(&StatusCounts {
            total: 10,
            passed: 3,
            failed: 7,
            skipped: 0,
            warnings: 0,
        });
        assert!(insights[0].contains("More tests failed than passed"));

        let insights = run_end_insights(&StatusCounts {
            total: 5,
            passed: 5,
            failed: 0,
            skipped: 0,
            warnings: 0,
        });
        assert_eq!(insights, vec!["✅ All tests passed successfully"]);

        let insights = run_end_insights(&StatusCounts {
            total: 6,
            passed: 3,
            failed: 1,
            skipped: 2,
            warnings: 1,
        });
        assert!(insights.iter().any(|i| i.contains("1 test(s) failed")));
        assert!(insights.iter().any(|i| i.contains("2 test(s) were skipped")));
        assert!(insights.iter().any(|i| i.contains("1 test(s) had warnings")));
    }

    #[test]
    fn banners_go_to_both_sinks() {
        let (logger, console, file) = memory_logger();
        logger.log_run_start("Endpoint Test Suite", "smoke");
        assert!(console.lines().iter().any(|l| l.contains("STARTING TEST SUITE")));
        assert!(file.lines().iter().any(|l| l.contains("STARTING TEST SUITE")));
    }
}
