//! Notifier: best-effort order event fan-out
//!
//! ```text
//! request handler ──publish──▶ bounded mpsc ──▶ worker ──▶ NotificationSink
//!                  (never awaits)                          (DiscordWebhook)
//! ```
//!
//! The handler that triggered an event never waits for delivery and never
//! sees a delivery failure. A full queue drops the event with a warning.

pub mod discord;

use std::sync::Arc;

use async_trait::async_trait;
use shared::models::{ContactMessage, Order};
use tokio::sync::mpsc;

pub use discord::DiscordWebhook;

/// Uploaded proof-of-payment forwarded with a submission
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Outbound channel an event is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Payment-proof submissions
    Payment,
    /// Status changes and contact form
    Status,
}

/// Lifecycle and contact events
#[derive(Debug, Clone)]
pub enum Notification {
    /// New order created, status `pending`
    Submitted {
        order: Box<Order>,
        attachment: Option<Attachment>,
    },
    /// Persisted status change
    StatusChanged { order: Box<Order> },
    ContactSubmitted { message: ContactMessage },
}

impl Notification {
    pub fn channel(&self) -> Channel {
        match self {
            Notification::Submitted { .. } => Channel::Payment,
            Notification::StatusChanged { .. } | Notification::ContactSubmitted { .. } => {
                Channel::Status
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Notification::Submitted { .. } => "submitted",
            Notification::StatusChanged { .. } => "status_changed",
            Notification::ContactSubmitted { .. } => "contact_submitted",
        }
    }
}

/// Delivery backend; failures are handled (logged) inside `deliver`
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: Notification);
}

/// Cloneable publishing handle
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<Notification>,
}

impl Notifier {
    /// Start the delivery worker. It exits once every `Notifier` clone
    /// has been dropped and the queue is drained.
    pub fn spawn(sink: Arc<dyn NotificationSink>, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<Notification>(capacity.max(1));
        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                sink.deliver(notification).await;
            }
            tracing::debug!("Notification worker stopped");
        });
        Self { tx }
    }

    /// Queue an event without waiting
    pub fn publish(&self, notification: Notification) {
        let kind = notification.kind();
        match self.tx.try_send(notification) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(kind, "Notification queue full, event dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(kind, "Notification worker gone, event dropped");
            }
        }
    }
}

/// Sink that discards everything (webhooks disabled, tests)
pub struct NoopSink;

#[async_trait]
impl NotificationSink for NoopSink {
    async fn deliver(&self, notification: Notification) {
        tracing::debug!(kind = notification.kind(), "Notification discarded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct Forward(mpsc::UnboundedSender<Notification>);

    #[async_trait]
    impl NotificationSink for Forward {
        async fn deliver(&self, notification: Notification) {
            let _ = self.0.send(notification);
        }
    }

    /// Holds each delivery until a permit is released, then forwards it
    struct Gated {
        entered: mpsc::UnboundedSender<()>,
        gate: Arc<tokio::sync::Semaphore>,
        out: mpsc::UnboundedSender<Notification>,
    }

    #[async_trait]
    impl NotificationSink for Gated {
        async fn deliver(&self, notification: Notification) {
            let _ = self.entered.send(());
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
            let _ = self.out.send(notification);
        }
    }

    fn contact(id: &str) -> Notification {
        Notification::ContactSubmitted {
            message: ContactMessage {
                id: id.into(),
                name: "Ana".into(),
                email: "ana@example.com".into(),
                imvu_username: "ana".into(),
                message: "hi".into(),
                created_at: 1,
            },
        }
    }

    #[tokio::test]
    async fn published_events_reach_the_sink_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier = Notifier::spawn(Arc::new(Forward(tx)), 8);

        notifier.publish(contact("1"));
        notifier.publish(contact("2"));

        for expected in ["1", "2"] {
            let got = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .unwrap()
                .unwrap();
            match got {
                Notification::ContactSubmitted { message } => assert_eq!(message.id, expected),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn full_queue_drops_without_blocking() {
        let (entered_tx, mut entered) = mpsc::unbounded_channel();
        let (out_tx, mut out) = mpsc::unbounded_channel();
        let gate = Arc::new(tokio::sync::Semaphore::new(0));
        let notifier = Notifier::spawn(
            Arc::new(Gated {
                entered: entered_tx,
                gate: gate.clone(),
                out: out_tx,
            }),
            1,
        );

        notifier.publish(contact("0"));
        tokio::time::timeout(Duration::from_secs(1), entered.recv())
            .await
            .unwrap()
            .unwrap();

        // worker is busy with "0": "1" fills the queue, the rest are dropped
        let started = std::time::Instant::now();
        for i in 1..10 {
            notifier.publish(contact(&i.to_string()));
        }
        assert!(started.elapsed() < Duration::from_millis(100));

        gate.add_permits(10);
        for expected in ["0", "1"] {
            let got = tokio::time::timeout(Duration::from_secs(1), out.recv())
                .await
                .unwrap()
                .unwrap();
            match got {
                Notification::ContactSubmitted { message } => assert_eq!(message.id, expected),
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(
            tokio::time::timeout(Duration::from_millis(100), out.recv())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn publish_after_worker_exit_is_dropped() {
        let (tx, rx) = mpsc::channel::<Notification>(1);
        drop(rx);
        let notifier = Notifier { tx };
        notifier.publish(contact("1"));
        assert!(notifier.tx.is_closed());
    }

    #[test]
    fn channels_route_by_kind() {
        assert_eq!(contact("1").channel(), Channel::Status);
    }
}
