//! Accumulates test outcomes across a run.
//!
//! The outcome sequence is append-only and insertion-ordered (execution
//! order), which the reporter relies on for chronological and slowest-N
//! views. Test-logic failures are contained here: a test body returning an
//! error becomes a FAIL outcome, it never crashes the run loop.

use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::domain::{CategorySummary, StatusCounts, TestOutcome, TestStatus};
use crate::error::Error;
use crate::logging::StructuredLogger;

/// What a test body reports when it finishes without an error.
///
/// `Completed` is for bodies with no explicit pass/fail signal; finishing
/// without an error counts as a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestVerdict {
    Pass,
    Fail,
    Completed,
}

pub type TestResult = crate::error::Result<TestVerdict>;

pub struct TestSummary {
    logger: Arc<StructuredLogger>,
    results: Vec<TestOutcome>,
    started: Instant,
    server_reachable: Option<bool>,
    server_info: BTreeMap<String, Value>,
}

impl TestSummary {
    pub fn new(logger: Arc<StructuredLogger>) -> Self {
        Self {
            logger,
            results: Vec::new(),
            started: Instant::now(),
            server_reachable: None,
            server_info: BTreeMap::new(),
        }
    }

    /// Append one outcome. Outcomes are never removed or reordered.
    pub fn add_result(
        &mut self,
        name: impl Into<String>,
        category: impl Into<String>,
        status: TestStatus,
        duration: f64,
        details: impl Into<String>,
        error_message: impl Into<String>,
    ) {
        self.results.push(TestOutcome::new(
            name,
            category,
            status,
            duration,
            details,
            error_message,
        ));
    }

    pub fn set_server_status(&mut self, reachable: bool, info: BTreeMap<String, Value>) {
        self.server_reachable = Some(reachable);
        self.server_info = info;
    }

    pub fn server_reachable(&self) -> Option<bool> {
        self.server_reachable
    }

    pub fn server_info(&self) -> &BTreeMap<String, Value> {
        &self.server_info
    }

    pub fn results(&self) -> &[TestOutcome] {
        &self.results
    }

    /// Wall-clock seconds since the collector was created.
    pub fn elapsed(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts {
            total: self.results.len(),
            ..StatusCounts::default()
        };
        for outcome in &self.results {
            match outcome.status {
                TestStatus::Pass => counts.passed += 1,
                TestStatus::Fail => counts.failed += 1,
                TestStatus::Skip => counts.skipped += 1,
                TestStatus::Warning => counts.warnings += 1,
            }
        }
        counts
    }

    /// Exit-code driver: true iff no tracked test failed.
    pub fn all_passed(&self) -> bool {
        self.counts().failed == 0
    }

    /// Aggregate counts and durations for one category; zeroes when the
    /// category has no outcomes.
    pub fn category_summary(&self, category: &str) -> CategorySummary {
        let outcomes: Vec<&TestOutcome> = self
            .results
            .iter()
            .filter(|outcome| outcome.category == category)
            .collect();
        if outcomes.is_empty() {
            return CategorySummary::default();
        }

        let total_duration: f64 = outcomes.iter().map(|outcome| outcome.duration).sum();
        CategorySummary {
            total: outcomes.len(),
            passed: outcomes
                .iter()
                .filter(|o| o.status == TestStatus::Pass)
                .count(),
            failed: outcomes
                .iter()
                .filter(|o| o.status == TestStatus::Fail)
                .count(),
            skipped: outcomes
                .iter()
                .filter(|o| o.status == TestStatus::Skip)
                .count(),
            warnings: outcomes
                .iter()
                .filter(|o| o.status == TestStatus::Warning)
                .count(),
            avg_duration: total_duration / outcomes.len() as f64,
            total_duration,
        }
    }

    /// Progress line printed between sections of a run.
    pub fn quick_summary(&self) {
        let counts = self.counts();
        self.logger.console_line(&format!(
            "\n📊 Quick Summary: {}/{} tests passed, {} failed",
            counts.passed, counts.total, counts.failed
        ));
    }

    /// Run one test body, time it, and record its outcome.
    ///
    /// Classification: an explicit `Fail` verdict is a FAIL; explicit `Pass`
    /// and `Completed` (no boolean signal, no error) are both a PASS; an
    /// assertion error is a FAIL with an "Assertion failed" message; any
    /// other error is a FAIL carrying the error text. Returns whether the
    /// test passed.
    pub async fn run_test<Fut>(&mut self, name: &str, category: &str, test: Fut) -> bool
    where
        Fut: Future<Output = TestResult>,
    {
        self.logger.console_line(&format!("\n🧪 Running: {name}"));
        let started = Instant::now();
        let outcome = test.await;
        let duration = started.elapsed().as_secs_f64();

        match outcome {
            Ok(TestVerdict::Fail) => {
                self.add_result(
                    name,
                    category,
                    TestStatus::Fail,
                    duration,
                    "Test function returned False",
                    "",
                );
                self.logger
                    .console_line(&format!("❌ {name} - FAILED ({duration:.2}s)"));
                false
            }
            Ok(TestVerdict::Pass) => {
                self.add_result(
                    name,
                    category,
                    TestStatus::Pass,
                    duration,
                    "Test function returned True",
                    "",
                );
                self.logger
                    .console_line(&format!("✅ {name} - PASSED ({duration:.2}s)"));
                true
            }
            Ok(TestVerdict::Completed) => {
                self.add_result(
                    name,
                    category,
                    TestStatus::Pass,
                    duration,
                    "Test completed without exceptions",
                    "",
                );
                self.logger
                    .console_line(&format!("✅ {name} - COMPLETED ({duration:.2}s)"));
                true
            }
            Err(Error::Assertion(message)) => {
                self.add_result(
                    name,
                    category,
                    TestStatus::Fail,
                    duration,
                    "",
                    format!("Assertion failed: {message}"),
                );
                self.logger
                    .console_line(&format!("❌ {name} - FAILED ({duration:.2}s)"));
                self.logger
                    .console_line(&format!("   Assertion Error: {message}"));
                false
            }
            Err(err) => {
                self.add_result(name, category, TestStatus::Fail, duration, "", err.to_string());
                self.logger
                    .console_line(&format!("❌ {name} - FAILED ({duration:.2}s)"));
                self.logger.console_line(&format!("   Error: {err}"));
                false
            }
        }
    }
}
