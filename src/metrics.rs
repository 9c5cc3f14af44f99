use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Per-process cleaning metrics, cumulative across cycles.
#[derive(Debug, Clone)]
pub struct Metrics {
    pub cycles_run: Arc<AtomicU64>,
    pub segments_evaluated: Arc<AtomicU64>,
    pub segments_selected: Arc<AtomicU64>,
    pub segments_skipped_clean: Arc<AtomicU64>,
    pub segments_skipped_protected: Arc<AtomicU64>,
    pub segments_skipped_not_reclaimable: Arc<AtomicU64>,
    pub segments_skipped_error: Arc<AtomicU64>,
    pub segments_skipped_utilization_cap: Arc<AtomicU64>,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            cycles_run: Arc::new(AtomicU64::new(0)),
            segments_evaluated: Arc::new(AtomicU64::new(0)),
            segments_selected: Arc::new(AtomicU64::new(0)),
            segments_skipped_clean: Arc::new(AtomicU64::new(0)),
            segments_skipped_protected: Arc::new(AtomicU64::new(0)),
            segments_skipped_not_reclaimable: Arc::new(AtomicU64::new(0)),
            segments_skipped_error: Arc::new(AtomicU64::new(0)),
            segments_skipped_utilization_cap: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn record_cycle(&self) {
        self.cycles_run.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evaluated(&self) {
        self.segments_evaluated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_selected(&self, count: u64) {
        self.segments_selected.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_skipped_clean(&self) {
        self.segments_skipped_clean.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_protected(&self) {
        self.segments_skipped_protected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_not_reclaimable(&self) {
        self.segments_skipped_not_reclaimable
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_error(&self) {
        self.segments_skipped_error.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_utilization_cap(&self) {
        self.segments_skipped_utilization_cap
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles_run: self.cycles_run.load(Ordering::Relaxed),
            segments_evaluated: self.segments_evaluated.load(Ordering::Relaxed),
            segments_selected: self.segments_selected.load(Ordering::Relaxed),
            segments_skipped_clean: self.segments_skipped_clean.load(Ordering::Relaxed),
            segments_skipped_protected: self.segments_skipped_protected.load(Ordering::Relaxed),
            segments_skipped_not_reclaimable: self
                .segments_skipped_not_reclaimable
                .load(Ordering::Relaxed),
            segments_skipped_error: self.segments_skipped_error.load(Ordering::Relaxed),
            segments_skipped_utilization_cap: self
                .segments_skipped_utilization_cap
                .load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`Metrics`] for reporting.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub cycles_run: u64,
    pub segments_evaluated: u64,
    pub segments_selected: u64,
    pub segments_skipped_clean: u64,
    pub segments_skipped_protected: u64,
    pub segments_skipped_not_reclaimable: u64,
    pub segments_skipped_error: u64,
    pub segments_skipped_utilization_cap: u64,
}
