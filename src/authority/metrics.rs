use std::time::Duration;

use prometheus::{
    Histogram, IntCounter, Registry, exponential_buckets, histogram_opts,
    register_histogram_with_registry, register_int_counter_with_registry,
};

/// Privilege check counters, registered on a prometheus [`Registry`].
#[derive(Clone)]
pub struct AuthMetrics {
    registry: Registry,
    checks: IntCounter,
    check_latency: Histogram,
}

/// Point-in-time reading of [`AuthMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub count: u64,
    pub total: Duration,
}

impl MetricsSnapshot {
    #[must_use]
    pub fn mean(&self) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }
        self.total / u32::try_from(self.count).unwrap_or(u32::MAX)
    }
}

impl AuthMetrics {
    /// Registers the check metrics on `registry`.
    ///
    /// Fails when the registry already holds metrics under the same names.
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        let checks = register_int_counter_with_registry!(
            "authority_check_total",
            "Total number of privilege checks answered by the checker",
            registry
        )?;

        // 10us up to roughly 10s.
        let opts = histogram_opts!(
            "authority_check_latency_seconds",
            "Latency of privilege checks, including remote fallback",
            exponential_buckets(0.000_01, 2.0, 21)?
        );
        let check_latency = register_histogram_with_registry!(opts, registry)?;

        Ok(Self {
            registry: registry.clone(),
            checks,
            check_latency,
        })
    }

    pub fn record(&self, elapsed: Duration) {
        self.checks.inc();
        self.check_latency.observe(elapsed.as_secs_f64());
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            count: self.checks.get(),
            total: Duration::from_secs_f64(self.check_latency.get_sample_sum()),
        }
    }
}

impl std::fmt::Debug for AuthMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthMetrics")
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_into_registry() {
        let registry = Registry::new();
        let metrics = AuthMetrics::new(&registry).unwrap();
        assert_eq!(metrics.snapshot().mean(), Duration::ZERO);
        metrics.record(Duration::from_millis(10));
        metrics.record(Duration::from_millis(30));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.count, 2);
        assert!((snapshot.total.as_secs_f64() - 0.04).abs() < 1e-9);
        assert!((snapshot.mean().as_secs_f64() - 0.02).abs() < 1e-6);

        let families = registry.gather();
        let names: Vec<&str> = families.iter().map(|family| family.get_name()).collect();
        assert!(names.contains(&"authority_check_total"));
        assert!(names.contains(&"authority_check_latency_seconds"));
        let histogram = families
            .iter()
            .find(|family| family.get_name() == "authority_check_latency_seconds")
            .unwrap();
        assert_eq!(histogram.get_metric()[0].get_histogram().get_sample_count(), 2);
    }

    #[test]
    fn second_registration_on_same_registry_fails() {
        let registry = Registry::new();
        let _first = AuthMetrics::new(&registry).unwrap();
        assert!(AuthMetrics::new(&registry).is_err());
    }
}
