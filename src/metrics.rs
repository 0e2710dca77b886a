//! Request statistics for the prediction service.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Latency samples kept for percentile computation
const LATENCY_WINDOW: usize = 10_000;

/// Metrics collector shared by all handlers
pub struct ServiceMetrics {
    /// Successful predictions
    predictions: AtomicU64,
    /// Predictions that failed in the scaler or model
    failures: AtomicU64,
    /// Submissions rejected by validation
    rejections: AtomicU64,
    /// Predictions by label
    by_label: RwLock<BTreeMap<String, u64>>,
    /// Prediction latencies (in microseconds)
    latencies: RwLock<Vec<u64>>,
    start_time: Instant,
}

/// Point-in-time view of [`ServiceMetrics`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub predictions: u64,
    pub failures: u64,
    pub rejections: u64,
    pub by_label: BTreeMap<String, u64>,
    pub latency: LatencyStats,
    pub uptime_secs: u64,
}

/// Latency statistics in microseconds
#[derive(Debug, Clone, Default, Serialize)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            predictions: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            rejections: AtomicU64::new(0),
            by_label: RwLock::new(BTreeMap::new()),
            latencies: RwLock::new(Vec::with_capacity(1000)),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction
    pub fn record_prediction(&self, processing_time: Duration, label: &str) {
        self.predictions.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut by_label) = self.by_label.write() {
            *by_label.entry(label.to_string()).or_insert(0) += 1;
        }

        if let Ok(mut times) = self.latencies.write() {
            times.push(processing_time.as_micros() as u64);
            if times.len() > LATENCY_WINDOW {
                times.drain(0..LATENCY_WINDOW / 2);
            }
        }
    }

    /// Record a prediction that failed after validation
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a submission rejected by validation
    pub fn record_rejection(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    fn latency_stats(&self) -> LatencyStats {
        let mut sorted = match self.latencies.read() {
            Ok(times) if !times.is_empty() => times.clone(),
            _ => return LatencyStats::default(),
        };
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let percentile = |p: f64| sorted[((count as f64 * p) as usize).min(count - 1)];

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: percentile(0.50),
            p95_us: percentile(0.95),
            p99_us: percentile(0.99),
            max_us: sorted[count - 1],
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            predictions: self.predictions.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            by_label: self
                .by_label
                .read()
                .map(|m| m.clone())
                .unwrap_or_default(),
            latency: self.latency_stats(),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let snapshot = self.snapshot();

        info!(
            predictions = snapshot.predictions,
            failures = snapshot.failures,
            rejections = snapshot.rejections,
            uptime_secs = snapshot.uptime_secs,
            "Service summary"
        );
        info!(
            mean_us = snapshot.latency.mean_us,
            p50_us = snapshot.latency.p50_us,
            p95_us = snapshot.latency.p95_us,
            p99_us = snapshot.latency.p99_us,
            "Prediction latency"
        );
        for (label, count) in &snapshot.by_label {
            info!(label = %label, count, "Predictions by label");
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}
