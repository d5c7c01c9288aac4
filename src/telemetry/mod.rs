//! Logging and evaluation metrics.
//!
//! Logging goes through `tracing`; [`init_logging`] installs the process-wide
//! subscriber for embedders that do not bring their own. [`Telemetry`] keeps
//! in-process counters for enforcement outcomes and attribute cache usage.

use crate::config::{LoggingConfig, TelemetryConfig};
use crate::core::ResolutionStats;
use crate::policy::{Decision, DecisionType};
use crate::{Error, Result};

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the configured level when set.
///
/// # Errors
/// Returns [`Error::Telemetry`] if the level is not a valid filter or a
/// global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| Error::telemetry(format!("invalid log level '{}': {}", config.level, e)))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| Error::telemetry(format!("failed to install subscriber: {}", e)))
}

/// Counters for enforcement outcomes.
pub struct Telemetry {
    config: TelemetryConfig,
    permits: AtomicU64,
    denies: AtomicU64,
    bias_applied: AtomicU64,
    attribute_cache_hits: AtomicU64,
    attribute_cache_misses: AtomicU64,
    errors: AtomicU64,
    errors_by_category: Mutex<HashMap<&'static str, u64>>,
    /// Total evaluation time in microseconds
    total_evaluation_time_us: AtomicU64,
}

impl Telemetry {
    /// Create a new telemetry instance.
    pub fn new(config: &TelemetryConfig) -> Result<Self> {
        if config.service_name.is_empty() {
            return Err(Error::config_key(
                "service name cannot be empty",
                "telemetry.service_name",
            ));
        }

        Ok(Self {
            config: config.clone(),
            permits: AtomicU64::new(0),
            denies: AtomicU64::new(0),
            bias_applied: AtomicU64::new(0),
            attribute_cache_hits: AtomicU64::new(0),
            attribute_cache_misses: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            errors_by_category: Mutex::new(HashMap::new()),
            total_evaluation_time_us: AtomicU64::new(0),
        })
    }

    /// Record a completed enforcement.
    ///
    /// `original` is the policy's own decision and `decision` the one returned
    /// to the caller after bias.
    pub fn record_evaluation(
        &self,
        original: &Decision,
        decision: &Decision,
        duration_ms: f64,
        stats: ResolutionStats,
    ) {
        match decision.decision_type() {
            DecisionType::Permit => self.permits.fetch_add(1, Ordering::Relaxed),
            DecisionType::Deny => self.denies.fetch_add(1, Ordering::Relaxed),
            // bias never yields an inconclusive decision
            DecisionType::NotApplicable => 0,
        };

        if original.is_not_applicable() {
            self.bias_applied.fetch_add(1, Ordering::Relaxed);
        }

        self.attribute_cache_hits
            .fetch_add(stats.cache_hits, Ordering::Relaxed);
        self.attribute_cache_misses
            .fetch_add(stats.cache_misses, Ordering::Relaxed);

        let duration_us = (duration_ms * 1000.0) as u64;
        self.total_evaluation_time_us
            .fetch_add(duration_us, Ordering::Relaxed);
    }

    /// Record a failed enforcement.
    pub fn record_error(&self, error: &Error) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        *self
            .errors_by_category
            .lock()
            .entry(error.category())
            .or_insert(0) += 1;
    }

    /// Get current metrics.
    pub fn metrics(&self) -> TelemetryMetrics {
        let permits = self.permits.load(Ordering::Relaxed);
        let denies = self.denies.load(Ordering::Relaxed);
        let total_evaluations = permits + denies;

        let hits = self.attribute_cache_hits.load(Ordering::Relaxed);
        let misses = self.attribute_cache_misses.load(Ordering::Relaxed);
        let requests = hits + misses;
        let attribute_cache_hit_rate = if requests > 0 {
            (hits as f64 / requests as f64) * 100.0
        } else {
            0.0
        };

        let total_time_us = self.total_evaluation_time_us.load(Ordering::Relaxed);
        let avg_evaluation_time_ms = if total_evaluations > 0 {
            (total_time_us as f64 / total_evaluations as f64) / 1000.0
        } else {
            0.0
        };

        let errors_by_category = self
            .errors_by_category
            .lock()
            .iter()
            .map(|(category, count)| (category.to_string(), *count))
            .collect();

        TelemetryMetrics {
            total_evaluations,
            permits,
            denies,
            bias_applied: self.bias_applied.load(Ordering::Relaxed),
            attribute_cache_hits: hits,
            attribute_cache_misses: misses,
            attribute_cache_hit_rate,
            avg_evaluation_time_ms,
            errors: self.errors.load(Ordering::Relaxed),
            errors_by_category,
        }
    }

    /// Get the service name.
    pub fn service_name(&self) -> &str {
        &self.config.service_name
    }
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry")
            .field("service_name", &self.config.service_name)
            .field("metrics", &self.metrics())
            .finish()
    }
}

/// Snapshot of the counters kept by [`Telemetry`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TelemetryMetrics {
    /// Completed enforcements
    pub total_evaluations: u64,
    /// Enforcements that returned permit
    pub permits: u64,
    /// Enforcements that returned deny
    pub denies: u64,
    /// Enforcements whose outcome was decided by the bias
    pub bias_applied: u64,
    /// Attribute requests served from a context cache
    pub attribute_cache_hits: u64,
    /// Attribute requests that ran an information point
    pub attribute_cache_misses: u64,
    /// Attribute cache hit rate percentage
    pub attribute_cache_hit_rate: f64,
    /// Average evaluation time in milliseconds
    pub avg_evaluation_time_ms: f64,
    /// Failed enforcements
    pub errors: u64,
    /// Failed enforcements per error category
    pub errors_by_category: HashMap<String, u64>,
}
