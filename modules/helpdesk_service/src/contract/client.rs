//! Native client trait for inter-module communication
//!
//! This trait defines the API that other modules use to interact with the helpdesk.
//! NO HTTP - direct function calls. Agent-side calls identify the caller by
//! actor id; the implementation resolves and authorizes it.

use super::{
    error::HelpdeskError,
    model::{
        AttachmentRef, NewTicket, PublicTicketView, SlaSnapshot, Ticket, TicketDetail,
        TicketFilter, TicketNote, TicketReply, TicketUpdate,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Helpdesk API for inter-module communication
#[async_trait]
pub trait HelpdeskApi: Send + Sync {
    // ===== Ticket Operations =====

    async fn create_ticket(&self, actor_id: Uuid, input: NewTicket) -> Result<Ticket, HelpdeskError>;

    async fn get_ticket(&self, actor_id: Uuid, ticket_id: Uuid) -> Result<TicketDetail, HelpdeskError>;

    async fn list_tickets(
        &self,
        actor_id: Uuid,
        filter: TicketFilter,
    ) -> Result<Vec<Ticket>, HelpdeskError>;

    async fn update_ticket(
        &self,
        actor_id: Uuid,
        ticket_id: Uuid,
        update: TicketUpdate,
    ) -> Result<Ticket, HelpdeskError>;

    /// `None` unassigns
    async fn assign_ticket(
        &self,
        actor_id: Uuid,
        ticket_id: Uuid,
        assignee_id: Option<Uuid>,
        note: Option<String>,
    ) -> Result<Ticket, HelpdeskError>;

    async fn escalate_ticket(
        &self,
        actor_id: Uuid,
        ticket_id: Uuid,
        reason: Option<String>,
    ) -> Result<Ticket, HelpdeskError>;

    async fn add_reply(
        &self,
        actor_id: Uuid,
        ticket_id: Uuid,
        message: String,
        attachments: Vec<AttachmentRef>,
    ) -> Result<TicketReply, HelpdeskError>;

    async fn add_note(
        &self,
        actor_id: Uuid,
        ticket_id: Uuid,
        content: String,
        attachments: Vec<AttachmentRef>,
    ) -> Result<TicketNote, HelpdeskError>;

    async fn sla_status(
        &self,
        actor_id: Uuid,
        ticket_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<SlaSnapshot, HelpdeskError>;

    /// Admin-only sweep of long-resolved tickets; returns how many were closed
    async fn close_stale_resolved(
        &self,
        actor_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, HelpdeskError>;

    // ===== Customer Operations =====

    async fn public_lookup(
        &self,
        ticket_number: &str,
        customer_email: &str,
    ) -> Result<PublicTicketView, HelpdeskError>;

    async fn add_customer_reply(
        &self,
        ticket_number: &str,
        customer_email: &str,
        message: String,
        attachments: Vec<AttachmentRef>,
    ) -> Result<TicketReply, HelpdeskError>;
}
