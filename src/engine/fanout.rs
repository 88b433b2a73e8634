//! Concurrent fan-out of independent requests.
//!
//! All inputs are launched before any result is collected, each on its own
//! task. One element failing (or panicking) never cancels its siblings, and
//! the returned results are always sorted by the original input index so
//! downstream reporting is deterministic regardless of completion order.
//! Whether a batch "passed" (e.g. a ≥80% success threshold) is the caller's
//! call — the batch reports raw per-element outcomes only.

use hdrhistogram::Histogram;
use std::future::Future;
use std::time::Instant;

use crate::domain::types::round_to_3;
use crate::error::{Error, Result};

/// Latencies above this are clamped when recorded (60s in microseconds).
const HISTOGRAM_MAX_US: u64 = 60_000_000;

/// Outcome of one element of a batch, tagged with its original index.
#[derive(Debug)]
pub struct FanOutResult<T> {
    pub index: usize,
    pub duration_seconds: f64,
    pub outcome: Result<T>,
}

/// All results of one batch, ordered by input index.
#[derive(Debug)]
pub struct FanOutBatch<T> {
    /// Wall-clock time for the whole batch, measured once around the join.
    pub total_duration: f64,
    pub results: Vec<FanOutResult<T>>,
}

/// Latency distribution over the per-element durations of a batch.
#[derive(Debug, Clone, Copy)]
pub struct LatencyStats {
    pub min_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
    pub stddev_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

#[derive(Default)]
struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }

        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    fn stddev(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        (self.m2 / (self.count as f64 - 1.0)).sqrt()
    }
}

/// Launch one task per input, wait for all of them, and return the outcomes
/// sorted by input index.
pub async fn run_fan_out<I, T, F, Fut>(inputs: Vec<I>, op: F) -> FanOutBatch<T>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(usize, I) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let started = Instant::now();

    let mut handles = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.into_iter().enumerate() {
        let fut = op(index, input);
        let handle = tokio::spawn(async move {
            let task_started = Instant::now();
            let outcome = fut.await;
            (task_started.elapsed().as_secs_f64(), outcome)
        });
        handles.push((index, handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (index, handle) in handles {
        match handle.await {
            Ok((duration_seconds, outcome)) => results.push(FanOutResult {
                index,
                duration_seconds,
                outcome,
            }),
            // A panicked element reports its own failure; siblings continue.
            Err(join_err) => results.push(FanOutResult {
                index,
                duration_seconds: started.elapsed().as_secs_f64(),
                outcome: Err(Error::TaskPanicked(join_err.to_string())),
            }),
        }
    }
    results.sort_by_key(|result| result.index);

    FanOutBatch {
        total_duration: started.elapsed().as_secs_f64(),
        results,
    }
}

impl<T> FanOutBatch<T> {
    pub fn succeeded(&self) -> usize {
        self.results
            .iter()
            .filter(|result| result.outcome.is_ok())
            .count()
    }

    pub fn success_ratio(&self) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            self.succeeded() as f64 / self.results.len() as f64
        }
    }

    /// Aggregate per-element latencies: running min/avg/max/stddev plus HDR
    /// percentiles.
    pub fn latency_stats(&self) -> Option<LatencyStats> {
        if self.results.is_empty() {
            return None;
        }
        let mut histogram = Histogram::<u64>::new_with_bounds(1, HISTOGRAM_MAX_US, 3).ok()?;
        let mut stats = RunningStats::default();

        for result in &self.results {
            let latency_ms = result.duration_seconds * 1000.0;
            stats.add(latency_ms);
            let latency_us = ((latency_ms * 1000.0).round().max(1.0) as u64).min(HISTOGRAM_MAX_US);
            let _ = histogram.record(latency_us);
        }

        Some(LatencyStats {
            min_ms: round_to_3(stats.min),
            avg_ms: round_to_3(stats.mean),
            max_ms: round_to_3(stats.max),
            stddev_ms: round_to_3(stats.stddev()),
            p50_ms: round_to_3(histogram.value_at_quantile(0.50) as f64 / 1000.0),
            p95_ms: round_to_3(histogram.value_at_quantile(0.95) as f64 / 1000.0),
            p99_ms: round_to_3(histogram.value_at_quantile(0.99) as f64 / 1000.0),
        })
    }
}
