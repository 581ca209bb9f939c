//! Translation metrics and observability module.
//!
//! Counts what the translation generator does with the external service so
//! the admin API can report call volume and failure rates since start.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Translation counters shared by every generator clone.
#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Number of calls made to the translation service
    api_calls: AtomicUsize,

    /// Number of calls that failed (after retries)
    api_failures: AtomicUsize,

    /// Pairs skipped because a record already existed
    skipped_existing: AtomicUsize,

    /// Pairs rejected because the language code was not registered
    unsupported_languages: AtomicUsize,

    /// Translation records written
    records_created: AtomicUsize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a call to the translation service.
    pub fn record_api_call(&self) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed call to the translation service.
    pub fn record_api_failure(&self) {
        self.api_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_existing(&self) {
        self.skipped_existing.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unsupported_language(&self) {
        self.unsupported_languages.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_created(&self, count: usize) {
        self.records_created.fetch_add(count, Ordering::Relaxed);
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let calls = self.api_calls.load(Ordering::Relaxed);
        let failures = self.api_failures.load(Ordering::Relaxed);
        let api_success_rate = if calls > 0 {
            (calls.saturating_sub(failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            api_calls: calls,
            api_failures: failures,
            api_success_rate,
            skipped_existing: self.skipped_existing.load(Ordering::Relaxed),
            unsupported_languages: self.unsupported_languages.load(Ordering::Relaxed),
            records_created: self.records_created.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of the translation counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub api_calls: usize,
    pub api_failures: usize,

    /// API success rate as a percentage (0-100)
    pub api_success_rate: f64,

    pub skipped_existing: usize,
    pub unsupported_languages: usize,
    pub records_created: usize,
}
