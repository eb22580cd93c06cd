//! Non-blocking analytics dispatch and the background persistence worker.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::domain::analytics::{AnalyticsEvent, AnalyticsSink};

/// Handle used by services and handlers to emit analytics events.
///
/// Emitting never awaits: events go onto a bounded queue with `try_send` and
/// are dropped with a warning when the queue is full or closed. A disabled
/// dispatcher silently discards everything.
#[derive(Clone, Debug, Default)]
pub struct AnalyticsDispatcher {
    tx: Option<mpsc::Sender<AnalyticsEvent>>,
}

impl AnalyticsDispatcher {
    /// Creates an enabled dispatcher and the receiving end for the worker.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<AnalyticsEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx: Some(tx) }, rx)
    }

    /// Creates a dispatcher that discards every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Free slots left in the queue, or `None` when disabled.
    pub fn queue_capacity(&self) -> Option<usize> {
        self.tx.as_ref().map(|tx| tx.capacity())
    }

    pub fn is_closed(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| tx.is_closed())
    }

    /// Queues an event for persistence. Never fails the caller.
    pub fn emit(&self, event: AnalyticsEvent) {
        let Some(tx) = &self.tx else {
            return;
        };

        if let Err(e) = tx.try_send(event) {
            match e {
                mpsc::error::TrySendError::Full(ev) => {
                    tracing::warn!(event_type = %ev.event_type, "Analytics queue full, dropping event");
                }
                mpsc::error::TrySendError::Closed(ev) => {
                    tracing::warn!(event_type = %ev.event_type, "Analytics queue closed, dropping event");
                }
            }
        }
    }
}

/// Number of attempts made for each event before it is dropped.
pub const MAX_SINK_ATTEMPTS: usize = 3;

/// Drains the analytics queue into `sink` until every sender is dropped.
///
/// Each event is retried with exponential backoff; events that still fail
/// after [`MAX_SINK_ATTEMPTS`] attempts are logged and dropped.
pub async fn run_analytics_worker(
    mut rx: mpsc::Receiver<AnalyticsEvent>,
    sink: Arc<dyn AnalyticsSink>,
) {
    tracing::info!("Analytics worker started");

    while let Some(event) = rx.recv().await {
        let strategy = ExponentialBackoff::from_millis(10)
            .map(jitter)
            .take(MAX_SINK_ATTEMPTS - 1);

        let result = Retry::spawn(strategy, || {
            let sink = sink.clone();
            let event = event.clone();
            async move { sink.record(&event).await }
        })
        .await;

        if let Err(e) = result {
            tracing::error!(
                event_type = %event.event_type,
                short_id = ?event.short_id,
                error = %e,
                "Failed to persist analytics event, dropping"
            );
        }
    }

    tracing::info!("Analytics worker stopped");
}
