use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing analysis activity.
#[derive(Default)]
pub struct UsageMetrics {
    documents_analyzed: AtomicU64,
    stages_completed: AtomicU64,
    advice_requests: AtomicU64,
}

impl UsageMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed analysis run and the number of stages it executed.
    pub fn record_analysis(&self, stage_count: u64) {
        self.documents_analyzed.fetch_add(1, Ordering::Relaxed);
        self.stages_completed.fetch_add(stage_count, Ordering::Relaxed);
    }

    /// Record a completed advice request.
    pub fn record_advice(&self) {
        self.advice_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_analyzed: self.documents_analyzed.load(Ordering::Relaxed),
            stages_completed: self.stages_completed.load(Ordering::Relaxed),
            advice_requests: self.advice_requests.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of usage counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of documents fully analyzed since startup.
    pub documents_analyzed: u64,
    /// Total stage calls completed across all successful runs.
    pub stages_completed: u64,
    /// Number of advice requests answered since startup.
    pub advice_requests: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_analyses_and_stages() {
        let metrics = UsageMetrics::new();
        metrics.record_analysis(3);
        metrics.record_analysis(3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_analyzed, 2);
        assert_eq!(snapshot.stages_completed, 6);
    }

    #[test]
    fn records_advice_requests() {
        let metrics = UsageMetrics::new();
        assert_eq!(metrics.snapshot().advice_requests, 0);
        metrics.record_advice();
        assert_eq!(metrics.snapshot().advice_requests, 1);
    }
}
