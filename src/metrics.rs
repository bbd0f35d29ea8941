//! Prometheus metrics for the job state store.
//!
//! One counter family, labeled by partition and event kind. Counters move
//! on successful lifecycle transitions only; idempotent re-deletes and
//! no-op removals do not count.

use prometheus::{core::Collector, CounterVec, Opts, Registry};

/// Per-partition job lifecycle counters.
#[derive(Clone)]
pub struct JobMetrics {
    events: CounterVec,
    partition: String,
}

impl JobMetrics {
    pub fn new(partition_id: u32) -> Self {
        let events = CounterVec::new(
            Opts::new(
                "granary_job_events_total",
                "Total number of job lifecycle events",
            ),
            &["partition", "action"],
        )
        .expect("statically valid metric description");
        Self {
            events,
            partition: partition_id.to_string(),
        }
    }

    /// Register the counters with a registry, logging instead of failing if
    /// they are already registered (e.g. two partitions sharing a registry).
    pub fn register(&self, registry: &Registry) {
        register(registry, self.events.clone());
    }

    /// Current value of one event counter. Intended for tests and
    /// introspection; scraping goes through the registry.
    pub fn event_count(&self, action: &str) -> u64 {
        self.events
            .with_label_values(&[self.partition.as_str(), action])
            .get() as u64
    }

    fn inc(&self, action: &str) {
        self.events
            .with_label_values(&[self.partition.as_str(), action])
            .inc();
    }

    pub(crate) fn job_created(&self) {
        self.inc("created");
    }

    pub(crate) fn job_activated(&self) {
        self.inc("activated");
    }

    pub(crate) fn job_timed_out(&self) {
        self.inc("timed_out");
    }

    pub(crate) fn job_completed(&self) {
        self.inc("completed");
    }

    pub(crate) fn job_failed(&self) {
        self.inc("failed");
    }
}

/// Helper to register a metric, logging on failure.
fn register<C: Collector + Clone + 'static>(registry: &Registry, metric: C) {
    if let Err(e) = registry.register(Box::new(metric)) {
        tracing::warn!(error = %e, "failed to register metric");
    }
}
