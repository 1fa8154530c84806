//! Minimal counters-and-timers interface (SPEC_FULL §6.1: "no Prometheus
//! exporter — that deployment concern stays out of scope, but the
//! *interface* is ambient stack and is carried anyway").

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Sink for pipeline/engine-adapter counters and timers. Call sites record
/// events (documents indexed, retry attempts, request latency); an exporter
/// is deliberately not provided.
pub trait MetricsCollector: Send + Sync {
    fn incr_counter(&self, name: &str, value: u64);
    fn record_timer(&self, name: &str, duration: Duration);
}

/// In-process collector used by tests and by the CLI's `status` command to
/// print a quick summary; not meant to survive process restart.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    counters: Mutex<HashMap<String, u64>>,
    timers: Mutex<HashMap<String, Vec<Duration>>>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter_value(&self, name: &str) -> u64 {
        self.counters.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    pub fn timer_samples(&self, name: &str) -> Vec<Duration> {
        self.timers.lock().unwrap().get(name).cloned().unwrap_or_default()
    }
}

impl MetricsCollector for InMemoryMetrics {
    fn incr_counter(&self, name: &str, value: u64) {
        *self.counters.lock().unwrap().entry(name.to_string()).or_insert(0) += value;
    }

    fn record_timer(&self, name: &str, duration: Duration) {
        self.timers
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = InMemoryMetrics::new();
        metrics.incr_counter("documents_indexed", 3);
        metrics.incr_counter("documents_indexed", 2);
        assert_eq!(metrics.counter_value("documents_indexed"), 5);
    }

    #[test]
    fn timers_record_each_sample() {
        let metrics = InMemoryMetrics::new();
        metrics.record_timer("write_latency", Duration::from_millis(10));
        metrics.record_timer("write_latency", Duration::from_millis(20));
        assert_eq!(metrics.timer_samples("write_latency").len(), 2);
    }

    #[test]
    fn unknown_counter_is_zero() {
        let metrics = InMemoryMetrics::new();
        assert_eq!(metrics.counter_value("nonexistent"), 0);
    }
}
