//! Notification intents for helpdesk service
//!
//! The service emits intents after a ticket change is committed. Delivery
//! (email, SMTP, templating) belongs to an external sink fed by a
//! [`NotificationDispatcher`] running on its own task:
//! - Publishing never blocks and never fails the originating operation
//! - Delivery failures are logged by the dispatcher and dropped

use crate::contract::model::Ticket;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// What happened to the ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TicketCreated,
    Assigned,
    Unassigned,
    NewReply,
    CustomerReply,
    StatusChanged,
}

/// Who should be told
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recipient {
    Customer { name: String, email: String },
    /// Contact details are resolved by the delivery side
    Agent { id: Uuid },
}

/// Structured notification intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationIntent {
    pub kind: NotificationKind,
    pub ticket_id: Uuid,
    pub ticket_number: String,
    pub subject: String,
    pub recipient: Recipient,
    /// Actor that caused the intent; None for customers and the system
    pub actor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl NotificationIntent {
    pub fn new(
        kind: NotificationKind,
        ticket: &Ticket,
        recipient: Recipient,
        actor_id: Option<Uuid>,
    ) -> Self {
        Self {
            kind,
            ticket_id: ticket.id,
            ticket_number: ticket.ticket_number.clone(),
            subject: ticket.subject.clone(),
            recipient,
            actor_id,
            created_at: Utc::now(),
        }
    }

    pub fn to_customer(kind: NotificationKind, ticket: &Ticket, actor_id: Option<Uuid>) -> Self {
        Self::new(
            kind,
            ticket,
            Recipient::Customer {
                name: ticket.customer.name.clone(),
                email: ticket.customer.email.clone(),
            },
            actor_id,
        )
    }

    pub fn to_agent(
        kind: NotificationKind,
        ticket: &Ticket,
        agent_id: Uuid,
        actor_id: Option<Uuid>,
    ) -> Self {
        Self::new(kind, ticket, Recipient::Agent { id: agent_id }, actor_id)
    }
}

/// Outbound side of the notification boundary
pub trait NotificationPublisher: Send + Sync {
    /// Hand an intent over for delivery without waiting for it
    fn publish(&self, intent: NotificationIntent) -> anyhow::Result<()>;
}

/// No-op publisher for testing or when notifications are disabled
pub struct NoOpNotificationPublisher;

impl NotificationPublisher for NoOpNotificationPublisher {
    fn publish(&self, _intent: NotificationIntent) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Publisher backed by a bounded queue drained by [`NotificationDispatcher`]
#[derive(Clone)]
pub struct ChannelNotificationPublisher {
    sender: mpsc::Sender<NotificationIntent>,
}

impl ChannelNotificationPublisher {
    /// Create a publisher and the receiving end for the dispatcher
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<NotificationIntent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl NotificationPublisher for ChannelNotificationPublisher {
    fn publish(&self, intent: NotificationIntent) -> anyhow::Result<()> {
        self.sender
            .try_send(intent)
            .map_err(|e| anyhow::anyhow!("notification queue rejected intent: {}", e))
    }
}

/// Delivery collaborator (mailer, webhook, ...)
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, intent: &NotificationIntent) -> anyhow::Result<()>;
}

/// Sink that only logs intents
pub struct TracingNotificationSink;

#[async_trait::async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn deliver(&self, intent: &NotificationIntent) -> anyhow::Result<()> {
        tracing::info!(
            kind = ?intent.kind,
            ticket = %intent.ticket_number,
            recipient = ?intent.recipient,
            "notification intent"
        );
        Ok(())
    }
}

/// Drains the notification queue into a sink until cancelled
pub struct NotificationDispatcher {
    receiver: mpsc::Receiver<NotificationIntent>,
    sink: std::sync::Arc<dyn NotificationSink>,
}

impl NotificationDispatcher {
    pub fn new(
        receiver: mpsc::Receiver<NotificationIntent>,
        sink: std::sync::Arc<dyn NotificationSink>,
    ) -> Self {
        Self { receiver, sink }
    }

    /// Returns the number of intents handed to the sink
    pub async fn run(mut self, cancel: CancellationToken) -> usize {
        let mut delivered = 0;
        loop {
            let intent = tokio::select! {
                _ = cancel.cancelled() => break,
                next = self.receiver.recv() => match next {
                    Some(intent) => intent,
                    None => break,
                },
            };
            match self.sink.deliver(&intent).await {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(
                    kind = ?intent.kind,
                    ticket = %intent.ticket_number,
                    error = %e,
                    "notification delivery failed"
                ),
            }
        }
        tracing::debug!(delivered, "notification dispatcher stopped");
        delivered
    }
}
