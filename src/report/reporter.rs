//! Turns the accumulated outcomes into summaries, recommendations, and the
//! final multi-section report.
//!
//! Everything here is a pure projection over the outcome sequence: two
//! reports generated from the same outcomes are identical.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::domain::{RunSummary, SlowTest, TestOutcome, TestStatus};
use crate::logging::StructuredLogger;
use crate::report::collector::TestSummary;

/// A test slower than this triggers the performance recommendation.
pub const SLOW_TEST_THRESHOLD_SECS: f64 = 30.0;
/// Pass-rate tiers. Between the moderate and excellent bounds no tier
/// message is emitted.
pub const LOW_SUCCESS_RATE: f64 = 50.0;
pub const MODERATE_SUCCESS_RATE: f64 = 80.0;
pub const EXCELLENT_SUCCESS_RATE: f64 = 95.0;
/// How many entries the slowest-test ranking shows.
pub const SLOWEST_TEST_COUNT: usize = 5;

/// Project the collector's state into a [`RunSummary`].
pub fn summarize(collector: &TestSummary) -> RunSummary {
    let outcomes = collector.results();
    let counts = collector.counts();

    let mut categories = BTreeMap::new();
    for outcome in outcomes {
        if !categories.contains_key(&outcome.category) {
            categories.insert(
                outcome.category.clone(),
                collector.category_summary(&outcome.category),
            );
        }
    }

    let mut ranked: Vec<&TestOutcome> = outcomes.iter().collect();
    ranked.sort_by(|left, right| {
        right
            .duration
            .partial_cmp(&left.duration)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let slowest = ranked
        .iter()
        .take(SLOWEST_TEST_COUNT)
        .map(|outcome| SlowTest {
            name: outcome.name.clone(),
            category: outcome.category.clone(),
            duration: outcome.duration,
        })
        .collect();

    let failures = outcomes
        .iter()
        .filter(|outcome| outcome.status == TestStatus::Fail)
        .cloned()
        .collect();

    // Derived from the outcomes only; wall-clock time stays with the collector.
    let total_duration: f64 = outcomes.iter().map(|o| o.duration).sum();
    RunSummary {
        counts,
        total_duration,
        avg_duration: if counts.total > 0 {
            total_duration / counts.total as f64
        } else {
            0.0
        },
        categories,
        slowest,
        failures,
        recommendations: recommendations(outcomes, collector.server_reachable()),
    }
}

/// Deterministic heuristics over the outcomes. The thresholds are fixed
/// constants of the design; at most one pass-rate tier message is emitted.
pub fn recommendations(outcomes: &[TestOutcome], server_reachable: Option<bool>) -> Vec<String> {
    let mut recommendations = Vec::new();

    match server_reachable {
        Some(false) => recommendations.push(
            "🔧 Server is not responding. Check that the server is running and reachable"
                .to_string(),
        ),
        None => recommendations.push(
            "⚠️ Server status unclear. Consider implementing health check endpoints".to_string(),
        ),
        Some(true) => {}
    }

    let passed = outcomes
        .iter()
        .filter(|o| o.status == TestStatus::Pass)
        .count();
    let failed = outcomes
        .iter()
        .filter(|o| o.status == TestStatus::Fail)
        .count();

    if failed > passed {
        recommendations.push(
            "⚠️ More tests failed than passed - system may have significant issues".to_string(),
        );
    }

    let slow = outcomes
        .iter()
        .filter(|o| o.duration > SLOW_TEST_THRESHOLD_SECS)
        .count();
    if slow > 0 {
        recommendations.push(format!(
            "⏱️ {slow} test(s) are running slowly (>30s). Consider optimization"
        ));
    }

    let failing_categories: BTreeSet<&str> = outcomes
        .iter()
        .filter(|o| o.status == TestStatus::Fail)
        .map(|o| o.category.as_str())
        .collect();
    if !failing_categories.is_empty() {
        let list: Vec<&str> = failing_categories.into_iter().collect();
        recommendations.push(format!(
            "🔍 Failing categories: {} - check their logs for details",
            list.join(", ")
        ));
    }

    if !outcomes.is_empty() {
        let success_rate = passed as f64 / outcomes.len() as f64 * 100.0;
        if success_rate < LOW_SUCCESS_RATE {
            recommendations.push(
                "🚨 Low success rate (<50%). Review server setup and test configuration"
                    .to_string(),
            );
        } else if success_rate < MODERATE_SUCCESS_RATE {
            recommendations.push(
                "⚠️ Moderate success rate (<80%). Some components may need attention".to_string(),
            );
        } else if success_rate >= EXCELLENT_SUCCESS_RATE {
            recommendations.push(
                "🎉 Excellent success rate! System appears to be functioning well".to_string(),
            );
        }
    }

    recommendations
}

/// Renders the final report through the logger's console path, so the
/// transcript mirrors exactly what the console showed.
pub struct Reporter {
    logger: Arc<StructuredLogger>,
}

impl Reporter {
    pub fn new(logger: Arc<StructuredLogger>) -> Self {
        Self { logger }
    }

    pub fn print_detailed_summary(&self, collector: &TestSummary) {
        let run = summarize(collector);
        let line = |text: &str| self.logger.console_line(text);

        line(&format!("\n{}", "=".repeat(80)));
        line("📊 COMPREHENSIVE TEST SUMMARY");
        line(&"=".repeat(80));

        line("\n🖥️  SERVER STATUS:");
        match collector.server_reachable() {
            Some(true) => {
                line("   ✅ Server is responding");
                for (key, value) in collector.server_info() {
                    line(&format!("   • {key}: {value}"));
                }
            }
            Some(false) => line("   ❌ Server is not responding"),
            None => line("   ❓ Server status unknown"),
        }

        let counts = run.counts;
        line("\n📈 OVERALL STATISTICS:");
        line(&format!("   • Total Tests: {}", counts.total));
        if counts.total > 0 {
            let pct = |n: usize| n as f64 / counts.total as f64 * 100.0;
            line(&format!("   • Passed: {} ({:.1}%)", counts.passed, pct(counts.passed)));
            line(&format!("   • Failed: {} ({:.1}%)", counts.failed, pct(counts.failed)));
            line(&format!("   • Skipped: {} ({:.1}%)", counts.skipped, pct(counts.skipped)));
            line(&format!(
                "   • Warnings: {} ({:.1}%)",
                counts.warnings,
                pct(counts.warnings)
            ));
        } else {
            line("   • Passed: 0");
            line("   • Failed: 0");
        }
        line(&format!("   • Total Duration: {:.2}s", collector.elapsed()));
        line(&format!("   • Average Test Duration: {:.2}s", run.avg_duration));

        if !run.categories.is_empty() {
            line("\n📋 CATEGORY BREAKDOWN:");
            for (category, summary) in &run.categories {
                line(&format!("\n   {}:", category.to_uppercase()));
                line(&format!("     • Tests: {}", summary.total));
                line(&format!(
                    "     • Passed: {} | Failed: {} | Skipped: {} | Warnings: {}",
                    summary.passed, summary.failed, summary.skipped, summary.warnings
                ));
                line(&format!(
                    "     • Duration: {:.2}s (avg: {:.2}s)",
                    summary.total_duration, summary.avg_duration
                ));
                for outcome in collector
                    .results()
                    .iter()
                    .filter(|outcome| &outcome.category == category)
                {
                    line(&format!(
                        "       {} {} ({:.2}s)",
                        outcome.status.glyph(),
                        outcome.name,
                        outcome.duration
                    ));
                    if !outcome.error_message.is_empty() {
                        let mut short: String = outcome.error_message.chars().take(100).collect();
                        if outcome.error_message.chars().count() > 100 {
                            short.push_str("...");
                        }
                        line(&format!("         └─ Error: {short}"));
                    }
                }
            }
        }

        if !run.failures.is_empty() {
            line("\n❌ FAILED TESTS DETAIL:");
            for (position, outcome) in run.failures.iter().enumerate() {
                line(&format!(
                    "\n   {}. {} ({})",
                    position + 1,
                    outcome.name,
                    outcome.category
                ));
                line(&format!(
                    "      Time: {} | Duration: {:.2}s",
                    outcome.timestamp, outcome.duration
                ));
                if !outcome.error_message.is_empty() {
                    line(&format!("      Error: {}", outcome.error_message));
                }
                if !outcome.details.is_empty() {
                    line(&format!("      Details: {}", outcome.details));
                }
            }
        }

        if !run.slowest.is_empty() {
            line("\n⏱️  SLOWEST TESTS:");
            for (position, slow) in run.slowest.iter().enumerate() {
                line(&format!(
                    "   {}. {}: {:.2}s ({})",
                    position + 1,
                    slow.name,
                    slow.duration,
                    slow.category
                ));
            }
        }

        line("\n🎯 FINAL RESULT:");
        if counts.total == 0 {
            line("   ❓ NO TESTS WERE RUN");
        } else if counts.failed == 0 {
            line("   🎉 ALL TESTS PASSED!");
        } else {
            line(&format!("   ⚠️  {} TEST(S) FAILED", counts.failed));
        }
        line(&format!("   📊 Success Rate: {:.1}%", counts.success_rate()));

        if !run.recommendations.is_empty() {
            line("\n💡 RECOMMENDATIONS:");
            for (position, recommendation) in run.recommendations.iter().enumerate() {
                line(&format!("   {}. {recommendation}", position + 1));
            }
        }

        line(&"=".repeat(80));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::sink::MemorySink;
    use crate::logging::StructuredLogger;

    fn collector() -> TestSummary {
        let console = Arc::new(MemorySink::new());
        let file = Arc::new(MemorySink::new());
        TestSummary::new(Arc::new(StructuredLogger::new(console, file)))
    }

    fn outcomes(passed: usize, failed: usize) -> Vec<TestOutcome> {
        let mut outcomes = Vec::new();
        for index in 0..passed {
            outcomes.push(TestOutcome::new(
                format!("pass {index}"),
                "Cat",
                TestStatus::Pass,
                0.1,
                "",
                "",
            ));
        }
        for index in 0..failed {
            outcomes.push(TestOutcome::new(
                format!("fail {index}"),
                "Cat",
                TestStatus::Fail,
                0.1,
                "",
                "boom",
            ));
        }
        outcomes
    }

    fn tier_messages(recommendations: &[String]) -> Vec<&String> {
        recommendations
            .iter()
            .filter(|r| {
                r.contains("Low success rate")
                    || r.contains("Moderate success rate")
                    || r.contains("Excellent success rate")
            })
            .collect()
    }

    #[test]
    fn low_pass_rate_gets_the_low_tier_only() {
        let recommendations = recommendations(&outcomes(3, 7), Some(true));
        let tiers = tier_messages(&recommendations);
        assert_eq!(tiers.len(), 1);
        assert!(tiers[0].contains("Low success rate (<50%)"));
    }

    #[test]
    fn moderate_pass_rate_gets_the_moderate_tier_only() {
        let recommendations = recommendations(&outcomes(7, 3), Some(true));
        let tiers = tier_messages(&recommendations);
        assert_eq!(tiers.len(), 1);
        assert!(tiers[0].contains("Moderate success rate (<80%)"));
    }

    #[test]
    fn excellent_pass_rate_gets_the_excellent_tier_only() {
        // 24/25 = 96%
        let recommendations = recommendations(&outcomes(24, 1), Some(true));
        let tiers = tier_messages(&recommendations);
        assert_eq!(tiers.len(), 1);
        assert!(tiers[0].contains("Excellent success rate"));
    }

    #[test]
    fn between_moderate_and_excellent_no_tier_is_emitted() {
        // 9/10 = 90%
        let recommendations = recommendations(&outcomes(9, 1), Some(true));
        assert!(tier_messages(&recommendations).is_empty());
    }

    #[test]
    fn unreachable_server_gets_a_connectivity_recommendation() {
        let recommendations = recommendations(&[], Some(false));
        assert!(recommendations[0].contains("Server is not responding"));

        let unknown = super::recommendations(&[], None);
        assert!(unknown[0].contains("Server status unclear"));

        let reachable = super::recommendations(&[], Some(true));
        assert!(reachable.is_empty());
    }

    #[test]
    fn slow_tests_are_counted_in_the_performance_recommendation() {
        let mut slow = outcomes(2, 0);
        slow.push(TestOutcome::new("glacial", "Cat", TestStatus::Pass, 31.0, "", ""));
        slow.push(TestOutcome::new("slower", "Cat", TestStatus::Pass, 45.0, "", ""));
        let recommendations = recommendations(&slow, Some(true));
        assert!(recommendations
            .iter()
            .any(|r| r.contains("2 test(s) are running slowly (>30s)")));
    }

    #[test]
    fn more_failures_than_passes_warns_about_significant_issues() {
        let recommendations = recommendations(&outcomes(1, 2), Some(true));
        assert!(recommendations
            .iter()
            .any(|r| r.contains("More tests failed than passed")));
    }

    #[test]
    fn failing_categories_are_named() {
        let mut mixed = outcomes(1, 0);
        mixed.push(TestOutcome::new("a", "Engine Tests", TestStatus::Fail, 0.1, "", "x"));
        mixed.push(TestOutcome::new("b", "Agent System", TestStatus::Fail, 0.1, "", "y"));
        let recommendations = recommendations(&mixed, Some(true));
        assert!(recommendations
            .iter()
            .any(|r| r.contains("Agent System") && r.contains("Engine Tests")));
    }

    #[test]
    fn summarize_is_idempotent() {
        let mut collector = collector();
        collector.add_result("A", "Cat1", TestStatus::Pass, 1.0, "", "");
        collector.add_result("B", "Cat1", TestStatus::Fail, 2.0, "", "boom");
        collector.add_result("C", "Cat2", TestStatus::Pass, 0.5, "", "");
        collector.set_server_status(true, Default::default());

        let first = summarize(&collector);
        std::thread::sleep(std::time::Duration::from_millis(20));
        let second = summarize(&collector);
        assert_eq!(first.counts, second.counts);
        assert_eq!(first.categories, second.categories);
        assert_eq!(first.recommendations, second.recommendations);
        assert_eq!(first.failures.len(), second.failures.len());
        // Durations derive from the outcomes, not from when the report ran.
        assert_eq!(first.total_duration, second.total_duration);
        assert_eq!(first.avg_duration, second.avg_duration);
        assert_eq!(first.total_duration, 3.5);
    }

    #[test]
    fn summarize_ranks_slowest_and_collects_failures() {
        let mut collector = collector();
        for (name, duration) in [("a", 1.0), ("b", 5.0), ("c", 3.0), ("d", 2.0), ("e", 4.0), ("f", 6.0)] {
            collector.add_result(name, "Cat", TestStatus::Pass, duration, "", "");
        }
        collector.add_result("g", "Cat", TestStatus::Fail, 0.2, "", "broke");

        let run = summarize(&collector);
        assert_eq!(run.slowest.len(), SLOWEST_TEST_COUNT);
        assert_eq!(run.slowest[0].name, "f");
        assert_eq!(run.slowest[1].name, "b");
        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].name, "g");
        assert_eq!(run.counts.total, 7);
    }

    #[test]
    fn detailed_summary_lists_every_failure() {
        let console = Arc::new(MemorySink::new());
        let file = Arc::new(MemorySink::new());
        let logger = Arc::new(StructuredLogger::new(console.clone(), file));
        let mut collector = TestSummary::new(logger.clone());
        collector.set_server_status(true, Default::default());
        collector.add_result("ok", "Cat", TestStatus::Pass, 0.1, "", "");
        collector.add_result("broken one", "Cat", TestStatus::Fail, 0.2, "", "first error");
        collector.add_result("broken two", "Cat", TestStatus::Fail, 0.3, "", "second error");

        Reporter::new(logger).print_detailed_summary(&collector);

        let text = console.lines().join("\n");
        assert!(text.contains("FAILED TESTS DETAIL"));
        assert!(text.contains("broken one"));
        assert!(text.contains("first error"));
        assert!(text.contains("broken two"));
        assert!(text.contains("second error"));
        assert!(text.contains("SLOWEST TESTS"));
    }
}
