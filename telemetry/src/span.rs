//! Finished-span records queued for export.

use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

/// Terminal status of a finished span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanStatus {
    Ok,
    Error,
}

/// A completed, timed unit of work ready for export.
///
/// Identifiers are freshly generated per span; the client does not thread a
/// distributed trace context through its calls, so every span starts a
/// trace of its own.
#[derive(Clone, Debug, PartialEq)]
pub struct SpanRecord {
    pub trace_id: String,
    pub span_id: String,
    pub name: String,
    pub start_unix_nano: u64,
    pub end_unix_nano: u64,
    pub status: SpanStatus,
    pub attributes: Vec<(String, String)>,
}

/// An in-flight span; [`finish`](OpenSpan::finish) stamps the end time.
#[derive(Debug)]
pub struct OpenSpan {
    record: SpanRecord,
}

impl SpanRecord {
    /// Start timing a span now.
    pub fn begin(name: &str, attributes: &[(&str, &str)]) -> OpenSpan {
        let now = unix_nanos();
        OpenSpan {
            record: SpanRecord {
                trace_id: Uuid::new_v4().simple().to_string(),
                span_id: Uuid::new_v4().simple().to_string()[..16].to_string(),
                name: name.to_string(),
                start_unix_nano: now,
                end_unix_nano: now,
                status: SpanStatus::Ok,
                attributes: attributes
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            },
        }
    }

    /// A zero-duration span for fire-and-forget events.
    pub fn instant(name: &str, attributes: &[(&str, &str)]) -> SpanRecord {
        SpanRecord::begin(name, attributes).finish(SpanStatus::Ok)
    }
}

impl OpenSpan {
    /// Attach an attribute to the span while it is still open.
    pub fn record(&mut self, key: &str, value: &str) {
        self.record
            .attributes
            .push((key.to_string(), value.to_string()));
    }

    /// Stamp the end time and produce the exportable record.
    pub fn finish(mut self, status: SpanStatus) -> SpanRecord {
        self.record.end_unix_nano = unix_nanos();
        self.record.status = status;
        self.record
    }
}

fn unix_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
