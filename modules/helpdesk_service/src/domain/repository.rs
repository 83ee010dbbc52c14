//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories.rs

use super::access::VisibilityScope;
use crate::contract::{
    Actor, Attachment, Category, GlobalSetting, Priority, SlaConfig, SupportLevel, Ticket,
    TicketActivity, TicketFilter, TicketNote, TicketReply,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Repository for support levels
#[async_trait]
pub trait SupportLevelRepository: Send + Sync {
    async fn create(&self, level: &SupportLevel) -> Result<SupportLevel>;

    async fn update(&self, level: &SupportLevel) -> Result<SupportLevel>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SupportLevel>>;

    async fn find_by_code(&self, code: &str) -> Result<Option<SupportLevel>>;

    /// All levels, active or not, ordered by sort order
    async fn list_all(&self) -> Result<Vec<SupportLevel>>;
}

/// Repository for per-priority SLA targets
#[async_trait]
pub trait SlaConfigRepository: Send + Sync {
    /// Create or replace the row for `config.priority`
    async fn upsert(&self, config: &SlaConfig) -> Result<SlaConfig>;

    async fn find_by_priority(&self, priority: Priority) -> Result<Option<SlaConfig>>;

    async fn list_all(&self) -> Result<Vec<SlaConfig>>;
}

/// Repository for ticket categories
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: &Category) -> Result<Category>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>>;

    async fn list_all(&self) -> Result<Vec<Category>>;
}

/// Read access to agents and admins provisioned by the auth layer
#[async_trait]
pub trait ActorRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Actor>>;

    /// Active actors whose level is `level_id`
    async fn count_active_by_level(&self, level_id: Uuid) -> Result<u64>;
}

/// Repository for versioned global settings
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<GlobalSetting>>;

    /// Insert at version 1 or bump the version of an existing key
    async fn upsert(
        &self,
        key: &str,
        value: &serde_json::Value,
        updated_by: Option<Uuid>,
    ) -> Result<GlobalSetting>;
}

/// Failures of a ticket commit the service reacts to
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The stored version no longer matches the expected one
    #[error("stale write on ticket {ticket_id}: expected version {expected}")]
    StaleWrite { ticket_id: Uuid, expected: i64 },

    #[error("ticket number already taken: {0}")]
    DuplicateNumber(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Everything one ticket operation writes, applied in a single transaction
#[derive(Debug, Clone)]
pub struct TicketChangeSet {
    /// New state of the ticket
    pub ticket: Ticket,
    /// None inserts a new ticket; Some updates only if the stored version matches
    pub expected_version: Option<i64>,
    pub activities: Vec<TicketActivity>,
    pub reply: Option<TicketReply>,
    pub note: Option<TicketNote>,
    /// Attachments owned directly by the ticket
    pub attachments: Vec<Attachment>,
}

impl TicketChangeSet {
    pub fn insert(ticket: Ticket, activities: Vec<TicketActivity>) -> Self {
        Self {
            ticket,
            expected_version: None,
            activities,
            reply: None,
            note: None,
            attachments: Vec::new(),
        }
    }

    /// The stored ticket gets `expected_version + 1`
    pub fn update(mut ticket: Ticket, expected_version: i64, activities: Vec<TicketActivity>) -> Self {
        ticket.version = expected_version + 1;
        Self {
            ticket,
            expected_version: Some(expected_version),
            activities,
            reply: None,
            note: None,
            attachments: Vec::new(),
        }
    }

    pub fn with_reply(mut self, reply: TicketReply) -> Self {
        self.reply = Some(reply);
        self
    }

    pub fn with_note(mut self, note: TicketNote) -> Self {
        self.note = Some(note);
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }
}

/// Child records of a ticket, each list ordered by creation time
#[derive(Debug, Clone, Default)]
pub struct TicketRecords {
    pub replies: Vec<TicketReply>,
    pub notes: Vec<TicketNote>,
    pub attachments: Vec<Attachment>,
    pub activities: Vec<TicketActivity>,
}

/// Repository for the ticket aggregate
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Apply a change set atomically and return the stored ticket
    async fn commit(&self, change: TicketChangeSet) -> std::result::Result<Ticket, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>>;

    async fn find_by_number(&self, ticket_number: &str) -> Result<Option<Ticket>>;

    async fn number_exists(&self, ticket_number: &str) -> Result<bool>;

    /// Tickets with `start <= created_at < end`
    async fn count_created_between(&self, start: DateTime<Utc>, end: DateTime<Utc>)
        -> Result<u64>;

    /// Filtered list restricted to `scope`, newest first
    async fn search(&self, filter: &TicketFilter, scope: &VisibilityScope) -> Result<Vec<Ticket>>;

    /// Resolved tickets with `resolved_at <= cutoff`
    async fn find_resolved_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Ticket>>;

    async fn load_records(&self, ticket_id: Uuid) -> Result<TicketRecords>;
}
