use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::Instrument;

use crate::config::TelemetryConfig;
use crate::export::{OtlpHttpExporter, TraceExporter};
use crate::span::{SpanRecord, SpanStatus};

enum Message {
    Span(SpanRecord),
    Shutdown(oneshot::Sender<()>),
}

/// Handle for recording spans and events.
///
/// Clones share one export queue. A handle built with
/// [`Telemetry::disabled`] turns every call into a no-op, which is also the
/// proof that the shim is side-effect-transparent: business code behaves
/// identically with it on or off.
#[derive(Clone)]
pub struct Telemetry {
    tx: Option<mpsc::Sender<Message>>,
}

impl Telemetry {
    /// A no-op handle for tests and offline tooling.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Spawn the batch worker and export to the configured OTLP collector.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: TelemetryConfig) -> Self {
        let exporter = Arc::new(OtlpHttpExporter::new(&config));
        Self::with_exporter(config, exporter)
    }

    /// Spawn the batch worker against an arbitrary exporter.
    pub fn with_exporter(config: TelemetryConfig, exporter: Arc<dyn TraceExporter>) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        tokio::spawn(run_worker(rx, exporter, config));
        Self { tx: Some(tx) }
    }

    /// Run `operation` under a span named `name`.
    ///
    /// The result is returned unchanged on both branches; an `Err` marks the
    /// span as errored and records the error message.
    pub async fn with_span<T, E, F>(
        &self,
        name: &str,
        attributes: &[(&str, &str)],
        operation: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let traced = tracing::info_span!("operation", otel.name = %name);
        let mut span = SpanRecord::begin(name, attributes);
        let result = operation.instrument(traced).await;

        match &result {
            Ok(_) => self.enqueue(span.finish(SpanStatus::Ok)),
            Err(error) => {
                span.record("exception.message", &error.to_string());
                self.enqueue(span.finish(SpanStatus::Error));
            }
        }
        result
    }

    /// Record a fire-and-forget event. No return value, no control-flow
    /// effect.
    pub fn record_event(&self, name: &str, attributes: &[(&str, &str)]) {
        tracing::debug!(event = %name, "telemetry event");
        self.enqueue(SpanRecord::instant(name, attributes));
    }

    /// Flush buffered spans and stop the worker.
    pub async fn shutdown(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (ack_tx, ack_rx) = oneshot::channel();
        if tx.send(Message::Shutdown(ack_tx)).await.is_ok() {
            let _ = ack_rx.await;
        }
    }

    fn enqueue(&self, record: SpanRecord) {
        let Some(tx) = &self.tx else {
            return;
        };
        // A full queue drops the span rather than blocking the caller
        if tx.try_send(Message::Span(record)).is_err() {
            tracing::debug!("telemetry queue full, span dropped");
        }
    }
}

async fn run_worker(
    mut rx: mpsc::Receiver<Message>,
    exporter: Arc<dyn TraceExporter>,
    config: TelemetryConfig,
) {
    let mut batch: Vec<SpanRecord> = Vec::new();
    // First flush one interval out; interval() would tick immediately
    let start = tokio::time::Instant::now() + config.flush_interval;
    let mut ticker = tokio::time::interval_at(start, config.flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            message = rx.recv() => match message {
                Some(Message::Span(span)) => {
                    batch.push(span);
                    if batch.len() >= config.batch_size {
                        flush(exporter.as_ref(), &mut batch).await;
                    }
                }
                Some(Message::Shutdown(ack)) => {
                    flush(exporter.as_ref(), &mut batch).await;
                    let _ = ack.send(());
                    break;
                }
                None => {
                    flush(exporter.as_ref(), &mut batch).await;
                    break;
                }
            },
            _ = ticker.tick() => {
                flush(exporter.as_ref(), &mut batch).await;
            }
        }
    }
}

async fn flush(exporter: &dyn TraceExporter, batch: &mut Vec<SpanRecord>) {
    if batch.is_empty() {
        return;
    }
    let spans = std::mem::take(batch);
    if let Err(error) = exporter.export(spans).await {
        tracing::debug!(%error, "trace export failed");
    }
}
