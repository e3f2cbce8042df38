//! Runtime metrics for the PDF proxy
//!
//! Lock-free atomic counters, shared across all request tasks. Recording
//! never blocks or fails the request path.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters collected over the life of the process
#[derive(Debug, Default)]
pub struct ProxyMetrics {
    requests_total: AtomicU64,
    missing_url: AtomicU64,
    origin_resolutions: AtomicU64,
    passthrough_resolutions: AtomicU64,
    candidate_attempts: AtomicU64,
    candidate_failures: AtomicU64,
    documents_streamed: AtomicU64,
    not_found: AtomicU64,
    upstream_failures: AtomicU64,
    bytes_to_client: AtomicU64,
}

impl ProxyMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_missing_url(&self) {
        self.missing_url.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_resolution(&self, origin: bool) {
        if origin {
            self.origin_resolutions.fetch_add(1, Ordering::Relaxed);
        } else {
            self.passthrough_resolutions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_candidate_attempts(&self, count: u64) {
        self.candidate_attempts.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_candidate_failures(&self, count: u64) {
        self.candidate_failures.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_document_streamed(&self) {
        self.documents_streamed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upstream_failure(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bytes_to_client(&self, bytes: u64) {
        self.bytes_to_client.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Take a consistent-enough snapshot for reporting
    pub fn get_stats(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            missing_url: self.missing_url.load(Ordering::Relaxed),
            origin_resolutions: self.origin_resolutions.load(Ordering::Relaxed),
            passthrough_resolutions: self.passthrough_resolutions.load(Ordering::Relaxed),
            candidate_attempts: self.candidate_attempts.load(Ordering::Relaxed),
            candidate_failures: self.candidate_failures.load(Ordering::Relaxed),
            documents_streamed: self.documents_streamed.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
            bytes_to_client: self.bytes_to_client.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of all counters
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub missing_url: u64,
    pub origin_resolutions: u64,
    pub passthrough_resolutions: u64,
    pub candidate_attempts: u64,
    pub candidate_failures: u64,
    pub documents_streamed: u64,
    pub not_found: u64,
    pub upstream_failures: u64,
    pub bytes_to_client: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = ProxyMetrics::new();
        let stats = metrics.get_stats();
        assert_eq!(stats.requests_total, 0);
        assert_eq!(stats.bytes_to_client, 0);
    }

    #[test]
    fn test_counters_accumulate() {
        let metrics = ProxyMetrics::new();
        metrics.record_request();
        metrics.record_request();
        metrics.record_resolution(true);
        metrics.record_resolution(false);
        metrics.record_candidate_attempts(2);
        metrics.record_candidate_failures(1);
        metrics.record_document_streamed();
        metrics.record_bytes_to_client(1024);
        metrics.record_bytes_to_client(512);

        let stats = metrics.get_stats();
        assert_eq!(stats.requests_total, 2);
        assert_eq!(stats.origin_resolutions, 1);
        assert_eq!(stats.passthrough_resolutions, 1);
        assert_eq!(stats.candidate_attempts, 2);
        assert_eq!(stats.candidate_failures, 1);
        assert_eq!(stats.documents_streamed, 1);
        assert_eq!(stats.bytes_to_client, 1536);
    }
}
