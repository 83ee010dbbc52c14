//! Native client implementation - wraps domain service for in-process calls

use crate::contract::{
    AttachmentRef, HelpdeskApi, HelpdeskError, NewTicket, PublicTicketView, SlaSnapshot, Ticket,
    TicketDetail, TicketFilter, TicketNote, TicketReply, TicketUpdate,
};
use crate::domain::Service;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Native client implementation that directly calls the domain service
///
/// This client is used for in-process communication without HTTP overhead.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
}

impl NativeClient {
    /// Create a new native client
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl HelpdeskApi for NativeClient {
    async fn create_ticket(&self, actor_id: Uuid, input: NewTicket) -> Result<Ticket, HelpdeskError> {
        let actor = self.service.resolve_actor(actor_id).await?;
        self.service.create_ticket(&actor, input).await
    }

    async fn get_ticket(&self, actor_id: Uuid, ticket_id: Uuid) -> Result<TicketDetail, HelpdeskError> {
        let actor = self.service.resolve_actor(actor_id).await?;
        self.service.get_ticket(&actor, ticket_id).await
    }

    async fn list_tickets(
        &self,
        actor_id: Uuid,
        filter: TicketFilter,
    ) -> Result<Vec<Ticket>, HelpdeskError> {
        let actor = self.service.resolve_actor(actor_id).await?;
        self.service.list_tickets(&actor, &filter).await
    }

    async fn update_ticket(
        &self,
        actor_id: Uuid,
        ticket_id: Uuid,
        update: TicketUpdate,
    ) -> Result<Ticket, HelpdeskError> {
        let actor = self.service.resolve_actor(actor_id).await?;
        self.service.update_ticket(&actor, ticket_id, update).await
    }

    async fn assign_ticket(
        &self,
        actor_id: Uuid,
        ticket_id: Uuid,
        assignee_id: Option<Uuid>,
        note: Option<String>,
    ) -> Result<Ticket, HelpdeskError> {
        let actor = self.service.resolve_actor(actor_id).await?;
        self.service
            .assign_ticket(&actor, ticket_id, assignee_id, note)
            .await
    }

    async fn escalate_ticket(
        &self,
        actor_id: Uuid,
        ticket_id: Uuid,
        reason: Option<String>,
    ) -> Result<Ticket, HelpdeskError> {
        let actor = self.service.resolve_actor(actor_id).await?;
        self.service.escalate_ticket(&actor, ticket_id, reason).await
    }

    async fn add_reply(
        &self,
        actor_id: Uuid,
        ticket_id: Uuid,
        message: String,
        attachments: Vec<AttachmentRef>,
    ) -> Result<TicketReply, HelpdeskError> {
        let actor = self.service.resolve_actor(actor_id).await?;
        self.service
            .add_reply(&actor, ticket_id, message, attachments)
            .await
    }

    async fn add_note(
        &self,
        actor_id: Uuid,
        ticket_id: Uuid,
        content: String,
        attachments: Vec<AttachmentRef>,
    ) -> Result<TicketNote, HelpdeskError> {
        let actor = self.service.resolve_actor(actor_id).await?;
        self.service
            .add_note(&actor, ticket_id, content, attachments)
            .await
    }

    async fn sla_status(
        &self,
        actor_id: Uuid,
        ticket_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<SlaSnapshot, HelpdeskError> {
        let actor = self.service.resolve_actor(actor_id).await?;
        self.service.sla_status(&actor, ticket_id, now).await
    }

    async fn close_stale_resolved(
        &self,
        actor_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, HelpdeskError> {
        let actor = self.service.resolve_actor(actor_id).await?;
        self.service.close_stale_resolved(&actor, now).await
    }

    async fn public_lookup(
        &self,
        ticket_number: &str,
        customer_email: &str,
    ) -> Result<PublicTicketView, HelpdeskError> {
        self.service.public_lookup(ticket_number, customer_email).await
    }

    async fn add_customer_reply(
        &self,
        ticket_number: &str,
        customer_email: &str,
        message: String,
        attachments: Vec<AttachmentRef>,
    ) -> Result<TicketReply, HelpdeskError> {
        self.service
            .add_customer_reply(ticket_number, customer_email, message, attachments)
            .await
    }
}
