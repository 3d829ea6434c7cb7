//! Dispatch metrics collection.

use hdrhistogram::Histogram;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Metrics collector for kernel dispatches
#[derive(Debug)]
pub struct DispatchMetrics {
    dispatches: AtomicU64,
    bytes_uploaded: AtomicU64,
    bytes_downloaded: AtomicU64,

    // Latency histogram (protected by RwLock for interior mutability)
    latency_histogram: RwLock<Histogram<u64>>,

    start_time: Instant,
}

impl DispatchMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        // 3 significant figures, max value of 1 hour in nanoseconds
        let histogram = Histogram::new_with_max(3_600_000_000_000, 3)
            .expect("Failed to create histogram");

        Self {
            dispatches: AtomicU64::new(0),
            bytes_uploaded: AtomicU64::new(0),
            bytes_downloaded: AtomicU64::new(0),
            latency_histogram: RwLock::new(histogram),
            start_time: Instant::now(),
        }
    }

    /// Record one dispatch: end-to-end duration plus transfer volumes
    pub fn record_dispatch(&self, duration_ns: u64, uploaded: u64, downloaded: u64) {
        self.dispatches.fetch_add(1, Ordering::Relaxed);
        self.bytes_uploaded.fetch_add(uploaded, Ordering::Relaxed);
        self.bytes_downloaded.fetch_add(downloaded, Ordering::Relaxed);

        if let Some(mut hist) = self.latency_histogram.try_write() {
            let _ = hist.record(duration_ns);
        }
    }

    /// Get a snapshot of current metrics
    pub fn snapshot(&self) -> DispatchSnapshot {
        let histogram = self.latency_histogram.read();

        DispatchSnapshot {
            uptime: self.start_time.elapsed(),
            dispatches: self.dispatches.load(Ordering::Relaxed),
            bytes_uploaded: self.bytes_uploaded.load(Ordering::Relaxed),
            bytes_downloaded: self.bytes_downloaded.load(Ordering::Relaxed),
            avg_latency_ns: if histogram.len() > 0 {
                histogram.mean() as u64
            } else {
                0
            },
            p50_latency_ns: histogram.value_at_quantile(0.50),
            p95_latency_ns: histogram.value_at_quantile(0.95),
            p99_latency_ns: histogram.value_at_quantile(0.99),
            max_latency_ns: histogram.max(),
        }
    }

    /// Reset all metrics
    pub fn reset(&self) {
        self.dispatches.store(0, Ordering::Relaxed);
        self.bytes_uploaded.store(0, Ordering::Relaxed);
        self.bytes_downloaded.store(0, Ordering::Relaxed);

        if let Some(mut hist) = self.latency_histogram.try_write() {
            hist.reset();
        }
    }
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of dispatch metrics at a point in time
#[derive(Debug, Clone)]
pub struct DispatchSnapshot {
    /// Time since the collector was created
    pub uptime: std::time::Duration,
    /// Total dispatches recorded
    pub dispatches: u64,
    /// Total bytes written to the GPU
    pub bytes_uploaded: u64,
    /// Total bytes read back from the GPU
    pub bytes_downloaded: u64,
    /// Mean end-to-end dispatch latency
    pub avg_latency_ns: u64,
    /// Median dispatch latency
    pub p50_latency_ns: u64,
    /// 95th percentile dispatch latency
    pub p95_latency_ns: u64,
    /// 99th percentile dispatch latency
    pub p99_latency_ns: u64,
    /// Worst dispatch latency seen
    pub max_latency_ns: u64,
}

impl DispatchSnapshot {
    /// Calculate dispatches per second
    pub fn dispatches_per_second(&self) -> f64 {
        let seconds = self.uptime.as_secs_f64();
        if seconds == 0.0 {
            return 0.0;
        }
        self.dispatches as f64 / seconds
    }
}
