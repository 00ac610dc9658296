//! Export endpoint and batching configuration.

use std::time::Duration;

/// How finished spans are batched and where they are shipped.
///
/// The defaults match the collector deployment the dashboard runs against:
/// a bounded queue of 100 spans, batches of 10, a 500 ms periodic flush, and
/// a hard 30 s timeout per export request.
#[derive(Clone, Debug, PartialEq)]
pub struct TelemetryConfig {
    /// Base URL of the OTLP-compatible collector.
    pub endpoint: String,
    /// Path appended to `endpoint` for trace export.
    pub traces_path: String,
    /// Value reported as `service.name` on every exported span.
    pub service_name: String,
    /// Maximum number of spans waiting for export; newer spans are dropped
    /// once the queue is full.
    pub queue_capacity: usize,
    /// Spans per export request.
    pub batch_size: usize,
    /// Interval at which a partial batch is flushed anyway.
    pub flush_interval: Duration,
    /// Hard deadline for a single export request.
    pub export_timeout: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4318".to_string(),
            traces_path: "/v1/traces".to_string(),
            service_name: "eventflow-client".to_string(),
            queue_capacity: 100,
            batch_size: 10,
            flush_interval: Duration::from_millis(500),
            export_timeout: Duration::from_secs(30),
        }
    }
}

impl TelemetryConfig {
    /// Builder method to point exports at a different collector.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Builder method to change the reported service name.
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Full URL trace batches are POSTed to.
    pub fn traces_url(&self) -> String {
        format!(
            "{}{}",
            self.endpoint.trim_end_matches('/'),
            self.traces_path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traces_url_joins_cleanly() {
        let config = TelemetryConfig::default();
        assert_eq!(config.traces_url(), "http://localhost:4318/v1/traces");

        let config = config.with_endpoint("http://collector:4318/");
        assert_eq!(config.traces_url(), "http://collector:4318/v1/traces");
    }
}
