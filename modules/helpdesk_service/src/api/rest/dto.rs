//! REST DTOs with serde derives for HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// ===== Support Level DTOs =====

/// Capability flags of a support level
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LevelCapabilitiesDto {
    pub can_view_own_tickets: bool,
    pub can_view_team_tickets: bool,
    pub can_view_all_tickets: bool,
    pub can_create_ticket: bool,
    pub can_assign_ticket: bool,
    pub can_escalate_ticket: bool,
    pub can_resolve_ticket: bool,
    pub can_close_ticket: bool,
}

/// Support level response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupportLevelDto {
    pub id: Uuid,

    #[schema(example = "L2")]
    pub code: String,

    #[schema(example = "Level 2 - Specialist")]
    pub name: String,

    /// Escalation rank; higher is more senior
    pub sort_order: i32,

    pub is_active: bool,

    pub capabilities: LevelCapabilitiesDto,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Create support level request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateSupportLevelRequest {
    #[schema(example = "L4")]
    pub code: String,

    pub name: String,

    pub sort_order: i32,

    #[serde(default)]
    pub capabilities: LevelCapabilitiesDto,
}

/// Partial support level update
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateSupportLevelRequest {
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    pub capabilities: Option<LevelCapabilitiesDto>,
}

// ===== SLA / Category DTOs =====

/// SLA target for one priority
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlaConfigDto {
    pub id: Uuid,

    #[schema(example = "high")]
    pub priority: String,

    /// Target resolution time in hours
    #[schema(example = 8)]
    pub duration_hrs: i32,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Create or replace the SLA target of a priority
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpsertSlaConfigRequest {
    pub duration_hrs: i32,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ===== Attachment DTOs =====

/// Reference to a file already uploaded to external storage
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttachmentRefDto {
    #[schema(example = "screenshot.png")]
    pub file_name: String,

    /// Storage key assigned by the upload service
    pub file_key: String,

    pub file_url: String,

    /// Size in bytes
    pub file_size: i64,

    #[schema(example = "image/png")]
    pub file_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttachmentDto {
    pub id: Uuid,
    pub file_name: String,
    pub file_key: String,
    pub file_url: String,
    pub file_size: i64,
    pub file_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_by_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// ===== Ticket DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerDto {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

/// Ticket response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketDto {
    pub id: Uuid,

    #[schema(example = "TKT-2503-0001")]
    pub ticket_number: String,

    pub subject: String,

    pub description: String,

    pub category_id: Uuid,

    #[schema(example = "open")]
    pub status: String,

    #[schema(example = "normal")]
    pub priority: String,

    pub level_id: Uuid,

    #[schema(example = "L1")]
    pub level_code: String,

    pub assignee_id: Option<Uuid>,

    pub created_by_id: Uuid,

    pub customer: CustomerDto,

    pub due_date: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    pub resolved_at: Option<DateTime<Utc>>,

    pub closed_at: Option<DateTime<Utc>>,

    /// Concurrency version, bumped on every change
    pub version: i64,
}

/// Create ticket request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTicketRequest {
    pub subject: String,

    pub description: String,

    pub category_id: Option<Uuid>,

    /// Defaults to "normal"
    #[schema(example = "high")]
    pub priority: Option<String>,

    pub level_id: Option<Uuid>,

    pub customer_name: String,

    pub customer_email: String,

    #[serde(default)]
    pub customer_phone: Option<String>,

    #[serde(default)]
    pub customer_company: Option<String>,

    /// Overrides the SLA-derived due date
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub attachments: Vec<AttachmentRefDto>,
}

/// Explicit ticket update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateTicketRequest {
    #[schema(example = "resolved")]
    pub status: Option<String>,
    pub priority: Option<String>,
    pub level_id: Option<Uuid>,
    /// Absent leaves the due date alone, `null` clears it
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

/// Distinguishes an explicit `null` from a missing field
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Assign request; a null assignee unassigns
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignTicketRequest {
    pub assignee_id: Option<Uuid>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EscalateTicketRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReplyRequest {
    pub message: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentRefDto>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NoteRequest {
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentRefDto>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AttachFilesRequest {
    pub attachments: Vec<AttachmentRefDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReplyDto {
    pub id: Uuid,
    pub author_id: Option<Uuid>,
    pub from_customer: bool,
    pub message: String,
    pub attachments: Vec<AttachmentDto>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteDto {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub attachments: Vec<AttachmentDto>,
    pub created_at: DateTime<Utc>,
}

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityDto {
    pub id: Uuid,
    pub author_id: Option<Uuid>,
    #[schema(example = "status_change")]
    pub activity_type: String,
    pub description: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Ticket with all child records
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TicketDetailDto {
    pub ticket: TicketDto,
    pub replies: Vec<ReplyDto>,
    pub notes: Vec<NoteDto>,
    /// Files attached directly to the ticket
    pub attachments: Vec<AttachmentDto>,
    pub activities: Vec<ActivityDto>,
}

/// List of tickets
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TicketListResponse {
    pub items: Vec<TicketDto>,
    pub total: usize,
}

/// Query parameters for listing tickets
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTicketsQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub level_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    /// Matches ticket number, subject, customer name or email
    pub search: Option<String>,
}

/// SLA progress of a ticket
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlaStatusDto {
    pub elapsed_minutes: i64,
    pub target_minutes: i64,
    pub percent: f64,
    #[schema(example = "warning")]
    pub state: String,
    /// True when no due date is set and the display fallback was used
    pub fallback_target: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AutoCloseResponse {
    /// Number of tickets closed
    pub closed: usize,
}

// ===== Public lookup DTOs =====

#[derive(Debug, Clone, Deserialize)]
pub struct PublicLookupQuery {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicReplyDto {
    pub from_customer: bool,
    pub message: String,
    pub attachments: Vec<AttachmentDto>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicActivityDto {
    pub activity_type: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Customer-facing ticket projection, without notes or agent identities
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicTicketDto {
    pub ticket_number: String,
    pub subject: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub level_code: String,
    pub customer_name: String,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub replies: Vec<PublicReplyDto>,
    pub activities: Vec<PublicActivityDto>,
}

/// Customer reply, authenticated by the ticket's customer email
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CustomerReplyRequest {
    pub email: String,
    pub message: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentRefDto>,
}

// ===== Settings DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SettingDto {
    #[schema(example = "auto_close_days")]
    pub key: String,
    pub value: serde_json::Value,
    pub version: i64,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateSettingRequest {
    pub value: serde_json::Value,
}

/// Stored rows plus the values in effect after defaults are applied
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SettingsListResponse {
    pub items: Vec<SettingDto>,
    pub effective: EffectiveSettingsDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EffectiveSettingsDto {
    pub ticket_prefix: String,
    pub sla_fallback_hours: i64,
    pub auto_close_days: i64,
}

// Note: Conversion implementations live in mapper.rs
