//! Contract models for helpdesk service
//!
//! These models are transport-agnostic and used for inter-module communication.
//! NO serde derives - these are pure domain models.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ===== Actors & Support Levels =====

/// Actor role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Bypasses every capability check
    Admin,
    /// Gated by the capabilities of its support level
    Agent,
}

/// Capability set carried by a support level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelCapabilities {
    pub can_view_own_tickets: bool,
    pub can_view_team_tickets: bool,
    pub can_view_all_tickets: bool,
    pub can_create_ticket: bool,
    pub can_assign_ticket: bool,
    pub can_escalate_ticket: bool,
    pub can_resolve_ticket: bool,
    pub can_close_ticket: bool,
}

/// Support tier (L1, L2, ...) shared by agents and tickets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportLevel {
    pub id: Uuid,
    /// Unique short code, e.g. "L1"
    pub code: String,
    pub name: String,
    /// Unique ordering key; defines the escalation path
    pub sort_order: i32,
    pub is_active: bool,
    pub capabilities: LevelCapabilities,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Authenticated agent or admin performing an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub level: SupportLevel,
    pub is_active: bool,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Input for registering a support level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSupportLevel {
    pub code: String,
    pub name: String,
    pub sort_order: i32,
    pub capabilities: LevelCapabilities,
}

/// Partial update of a support level
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SupportLevelUpdate {
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    pub capabilities: Option<LevelCapabilities>,
}

// ===== Priority / Status =====

/// Ticket priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Self::Low, Self::Normal, Self::High, Self::Urgent];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

/// Ticket status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketStatus {
    Open,
    InProgress,
    Pending,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Pending => "pending",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    /// Statuses that are reopened by new reply activity
    pub fn reopens_on_reply(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed | Self::Pending)
    }

    /// Resolved or closed: the SLA clock has stopped
    pub fn is_done(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "pending" => Ok(Self::Pending),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

// ===== Reference data =====

/// Per-priority SLA target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlaConfig {
    pub id: Uuid,
    pub priority: Priority,
    /// Target resolution time in hours (>= 1)
    pub duration_hrs: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ticket category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// ===== Tickets =====

/// Customer contact carried on a ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
}

/// Ticket aggregate root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: Uuid,
    /// Unique human-readable number, e.g. "TKT-2610-0001"
    pub ticket_number: String,
    pub subject: String,
    pub description: String,
    pub category_id: Uuid,
    pub status: TicketStatus,
    pub priority: Priority,
    /// Current handling tier
    pub level: SupportLevel,
    pub assignee_id: Option<Uuid>,
    pub created_by_id: Uuid,
    pub customer: Customer,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Stamped on first entry into `resolved`, never cleared
    pub resolved_at: Option<DateTime<Utc>>,
    /// Stamped on first entry into `closed`, never cleared
    pub closed_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency token, bumped on every committed change
    pub version: i64,
}

/// Activity type recorded in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityType {
    Created,
    StatusChange,
    PriorityChange,
    LevelChange,
    Assign,
    Escalate,
    Reply,
    Note,
    CustomerReply,
    AttachmentAdded,
}

impl ActivityType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::StatusChange => "status_change",
            Self::PriorityChange => "priority_change",
            Self::LevelChange => "level_change",
            Self::Assign => "assign",
            Self::Escalate => "escalate",
            Self::Reply => "reply",
            Self::Note => "note",
            Self::CustomerReply => "customer_reply",
            Self::AttachmentAdded => "attachment_added",
        }
    }

    /// Activity types exposed through the unauthenticated lookup
    pub fn is_public(self) -> bool {
        matches!(
            self,
            Self::Created | Self::StatusChange | Self::Reply | Self::Escalate | Self::CustomerReply
        )
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "status_change" => Ok(Self::StatusChange),
            "priority_change" => Ok(Self::PriorityChange),
            "level_change" => Ok(Self::LevelChange),
            "assign" => Ok(Self::Assign),
            "escalate" => Ok(Self::Escalate),
            "reply" => Ok(Self::Reply),
            "note" => Ok(Self::Note),
            "customer_reply" => Ok(Self::CustomerReply),
            "attachment_added" => Ok(Self::AttachmentAdded),
            other => Err(format!("unknown activity type '{}'", other)),
        }
    }
}

/// Immutable audit-log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketActivity {
    pub id: Uuid,
    pub ticket_id: Uuid,
    /// None for customer-originated or system activity
    pub author_id: Option<Uuid>,
    pub activity_type: ActivityType,
    pub description: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Attachment metadata supplied by the caller; file bytes live elsewhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub file_name: String,
    pub file_key: String,
    pub file_url: String,
    pub file_size: i64,
    pub file_type: String,
}

/// Stored attachment reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub reply_id: Option<Uuid>,
    pub note_id: Option<Uuid>,
    pub file_name: String,
    pub file_key: String,
    pub file_url: String,
    pub file_size: i64,
    pub file_type: String,
    pub uploaded_by_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Customer-visible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketReply {
    pub id: Uuid,
    pub ticket_id: Uuid,
    /// None when the reply came from the customer
    pub author_id: Option<Uuid>,
    pub from_customer: bool,
    pub message: String,
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
}

/// Agent-only note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketNote {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
}

/// Ticket with its owned records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDetail {
    pub ticket: Ticket,
    pub replies: Vec<TicketReply>,
    pub notes: Vec<TicketNote>,
    /// Attachments added directly to the ticket
    pub attachments: Vec<Attachment>,
    pub activities: Vec<TicketActivity>,
}

/// Input for opening a ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub subject: String,
    pub description: String,
    pub category_id: Option<Uuid>,
    pub priority: Option<Priority>,
    pub level_id: Option<Uuid>,
    pub customer: Customer,
    /// Explicit due date; otherwise derived from the SLA table
    pub due_date: Option<DateTime<Utc>>,
    pub attachments: Vec<AttachmentRef>,
}

/// Explicit ticket update
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TicketUpdate {
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
    pub level_id: Option<Uuid>,
    /// `Some(None)` removes the due date
    pub due_date: Option<Option<DateTime<Utc>>>,
}

/// Ticket list filters; all present filters are AND-combined
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
    pub level_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    /// Free text over ticket number, subject, customer name and email
    pub search: Option<String>,
}

/// Restricted projection served to unauthenticated customers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicTicketView {
    pub ticket_number: String,
    pub subject: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: Priority,
    pub level_code: String,
    pub customer_name: String,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub replies: Vec<TicketReply>,
    pub activities: Vec<TicketActivity>,
}

// ===== SLA display =====

/// SLA progress bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaState {
    Normal,
    Warning,
    Critical,
    Done,
}

impl SlaState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Done => "done",
        }
    }
}

/// Read-only SLA progress for a ticket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlaSnapshot {
    pub elapsed_minutes: i64,
    pub target_minutes: i64,
    /// Elapsed as a percentage of target
    pub percent: f64,
    pub state: SlaState,
    /// True when the target came from the display fallback, not a due date
    pub fallback_target: bool,
}

// ===== Global settings =====

/// Versioned key/value row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalSetting {
    pub key: String,
    pub value: serde_json::Value,
    pub version: i64,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}
