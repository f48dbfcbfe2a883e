use std::sync::Arc;

use boreal_telemetry::metrics::MetricsRegistry;
use boreal_transport::publisher::Publisher;

/// Shared client identity and transport binding.
///
/// One handle is built per agent process and bound into every standalone
/// scheduler it runs; the display name travels in each published result,
/// and the transport and metrics registry are shared across all of them
/// concurrently. The handle does no configuration loading of its own.
pub struct ClientHandle {
    name: String,
    transport: Arc<dyn Publisher>,
    metrics: Arc<MetricsRegistry>,
}

impl ClientHandle {
    /// Create a handle with a fresh metrics registry.
    pub fn new(name: impl Into<String>, transport: Arc<dyn Publisher>) -> Self {
        Self::with_metrics(name, transport, Arc::new(MetricsRegistry::new()))
    }

    /// Create a handle recording into an existing registry, for processes
    /// that already expose one.
    pub fn with_metrics(
        name: impl Into<String>,
        transport: Arc<dyn Publisher>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            name: name.into(),
            transport,
            metrics,
        }
    }

    /// The identity display name published with every result.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The transport results are published through.
    pub fn transport(&self) -> &Arc<dyn Publisher> {
        &self.transport
    }

    /// The registry schedulers record tick and failure counts into.
    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }
}
