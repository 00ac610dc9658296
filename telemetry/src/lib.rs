//! # Telemetry — traced spans and OTLP export for the EventFlow client
//!
//! Wraps outbound operations in timed spans and ships finished spans to an
//! OTLP-compatible collector, without ever affecting the wrapped operation's
//! outcome. Removing this layer changes telemetry and nothing else.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Export endpoint and batching knobs, with production defaults. |
//! | [`span`] | The finished-span record and its status. |
//! | [`export`] | The [`TraceExporter`] seam and the OTLP/HTTP JSON exporter. |
//! | shim | The [`Telemetry`] handle: `with_span`, `record_event`, the batch worker. |
//!
//! ## Failure isolation
//!
//! Span recording is fire-and-forget. A full queue drops the span, an export
//! failure is logged at debug level and swallowed, and `with_span` returns
//! the wrapped future's result bit-for-bit on both branches. Telemetry
//! faults never surface to business code.

pub mod config;
pub mod export;
mod shim;
pub mod span;

pub use config::TelemetryConfig;
pub use export::{ExportError, OtlpHttpExporter, TraceExporter};
pub use shim::Telemetry;
pub use span::{SpanRecord, SpanStatus};

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global fmt subscriber, honouring `RUST_LOG`.
///
/// Call once at binary startup, before any spans are created.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();
}
