//! Trace export: the exporter seam and the OTLP/HTTP implementation.

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::TelemetryConfig;
use crate::span::{SpanRecord, SpanStatus};

/// Errors produced while shipping a batch to the collector.
///
/// These never reach business code; the worker logs and drops them.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("collector returned status {0}")]
    Status(u16),
}

/// Destination for finished span batches.
///
/// The production implementation is [`OtlpHttpExporter`]; tests install a
/// collecting stand-in.
#[async_trait]
pub trait TraceExporter: Send + Sync {
    async fn export(&self, batch: Vec<SpanRecord>) -> Result<(), ExportError>;
}

/// Ships span batches as OTLP/HTTP JSON to a collector endpoint.
pub struct OtlpHttpExporter {
    http: reqwest::Client,
    url: String,
    service_name: String,
}

impl OtlpHttpExporter {
    pub fn new(config: &TelemetryConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.export_timeout)
            .build()
            .unwrap_or_default();
        Self {
            http,
            url: config.traces_url(),
            service_name: config.service_name.clone(),
        }
    }

    fn body(&self, batch: &[SpanRecord]) -> Value {
        let spans: Vec<Value> = batch.iter().map(span_json).collect();
        json!({
            "resourceSpans": [{
                "resource": {
                    "attributes": [
                        { "key": "service.name", "value": { "stringValue": self.service_name } }
                    ]
                },
                "scopeSpans": [{
                    "scope": { "name": "eventflow-client" },
                    "spans": spans,
                }],
            }]
        })
    }
}

fn span_json(span: &SpanRecord) -> Value {
    let attributes: Vec<Value> = span
        .attributes
        .iter()
        .map(|(key, value)| json!({ "key": key, "value": { "stringValue": value } }))
        .collect();
    // OTLP encodes nanosecond timestamps as decimal strings
    json!({
        "traceId": span.trace_id,
        "spanId": span.span_id,
        "name": span.name,
        "kind": 1,
        "startTimeUnixNano": span.start_unix_nano.to_string(),
        "endTimeUnixNano": span.end_unix_nano.to_string(),
        "attributes": attributes,
        "status": {
            "code": match span.status {
                SpanStatus::Ok => 1,
                SpanStatus::Error => 2,
            }
        },
    })
}

#[async_trait]
impl TraceExporter for OtlpHttpExporter {
    async fn export(&self, batch: Vec<SpanRecord>) -> Result<(), ExportError> {
        let response = self.http.post(&self.url).json(&self.body(&batch)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::Status(status.as_u16()));
        }
        Ok(())
    }
}
