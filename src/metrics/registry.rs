use super::{INDEX_GROW_TOTAL, LOOKUPS_TOTAL};
use anyhow::Result;
use metrics::{describe_counter, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Thin handle around the global metrics recorder.
///
/// The routing table emits its counters through the `metrics` crate macros
/// whether or not a recorder is installed. After `Metrics::install()` they are
/// collected, and the `PrometheusHandle` renders them in text format.
#[derive(Clone)]
pub struct Metrics {
    handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder and register metric descriptions.
    ///
    /// Fails if another recorder is already installed in this process.
    pub fn install() -> Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;

        describe_counter!(
            LOOKUPS_TOTAL,
            Unit::Count,
            "Path lookups against the routing table"
        );
        describe_counter!(
            INDEX_GROW_TOTAL,
            Unit::Count,
            "Literal index rebuilds caused by capacity exhaustion"
        );

        Ok(Self { handle })
    }

    /// Render all metrics in Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}
