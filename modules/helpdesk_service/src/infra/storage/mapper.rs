//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models

use super::entity::{
    activity, actor, attachment, category, note, reply, setting, sla_config, support_level,
    ticket,
};
use crate::contract::{
    Actor, Attachment, Category, Customer, GlobalSetting, LevelCapabilities, Role, SlaConfig,
    SupportLevel, Ticket, TicketActivity, TicketNote, TicketReply,
};
use anyhow::{anyhow, Result};
use sea_orm::ActiveValue::Set;
use std::str::FromStr;

fn parse<T: FromStr<Err = String>>(value: &str) -> Result<T> {
    value.parse::<T>().map_err(|e| anyhow!(e))
}

// ===== Support Level Conversions =====

/// JSON representation of capability flags for database storage
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct CapabilitiesJson {
    can_view_own_tickets: bool,
    can_view_team_tickets: bool,
    can_view_all_tickets: bool,
    can_create_ticket: bool,
    can_assign_ticket: bool,
    can_escalate_ticket: bool,
    can_resolve_ticket: bool,
    can_close_ticket: bool,
}

impl From<CapabilitiesJson> for LevelCapabilities {
    fn from(json: CapabilitiesJson) -> Self {
        Self {
            can_view_own_tickets: json.can_view_own_tickets,
            can_view_team_tickets: json.can_view_team_tickets,
            can_view_all_tickets: json.can_view_all_tickets,
            can_create_ticket: json.can_create_ticket,
            can_assign_ticket: json.can_assign_ticket,
            can_escalate_ticket: json.can_escalate_ticket,
            can_resolve_ticket: json.can_resolve_ticket,
            can_close_ticket: json.can_close_ticket,
        }
    }
}

impl From<&LevelCapabilities> for CapabilitiesJson {
    fn from(caps: &LevelCapabilities) -> Self {
        Self {
            can_view_own_tickets: caps.can_view_own_tickets,
            can_view_team_tickets: caps.can_view_team_tickets,
            can_view_all_tickets: caps.can_view_all_tickets,
            can_create_ticket: caps.can_create_ticket,
            can_assign_ticket: caps.can_assign_ticket,
            can_escalate_ticket: caps.can_escalate_ticket,
            can_resolve_ticket: caps.can_resolve_ticket,
            can_close_ticket: caps.can_close_ticket,
        }
    }
}

pub(crate) fn capabilities_to_json(caps: &LevelCapabilities) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(CapabilitiesJson::from(caps))?)
}

impl TryFrom<support_level::Model> for SupportLevel {
    type Error = anyhow::Error;

    fn try_from(entity: support_level::Model) -> Result<Self> {
        let caps: CapabilitiesJson = serde_json::from_value(entity.capabilities)?;
        Ok(Self {
            id: entity.id,
            code: entity.code,
            name: entity.name,
            sort_order: entity.sort_order,
            is_active: entity.is_active,
            capabilities: caps.into(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

impl TryFrom<&SupportLevel> for support_level::ActiveModel {
    type Error = anyhow::Error;

    fn try_from(model: &SupportLevel) -> Result<Self> {
        Ok(Self {
            id: Set(model.id),
            code: Set(model.code.clone()),
            name: Set(model.name.clone()),
            sort_order: Set(model.sort_order),
            is_active: Set(model.is_active),
            capabilities: Set(capabilities_to_json(&model.capabilities)?),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        })
    }
}

// ===== SLA / Category Conversions =====

impl TryFrom<sla_config::Model> for SlaConfig {
    type Error = anyhow::Error;

    fn try_from(entity: sla_config::Model) -> Result<Self> {
        Ok(Self {
            id: entity.id,
            priority: parse(&entity.priority)?,
            duration_hrs: entity.duration_hrs,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

impl From<&SlaConfig> for sla_config::ActiveModel {
    fn from(model: &SlaConfig) -> Self {
        Self {
            id: Set(model.id),
            priority: Set(model.priority.as_str().to_string()),
            duration_hrs: Set(model.duration_hrs),
            is_active: Set(model.is_active),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}

impl From<category::Model> for Category {
    fn from(entity: category::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            is_active: entity.is_active,
            created_at: entity.created_at,
        }
    }
}

impl From<&Category> for category::ActiveModel {
    fn from(model: &Category) -> Self {
        Self {
            id: Set(model.id),
            name: Set(model.name.clone()),
            description: Set(model.description.clone()),
            is_active: Set(model.is_active),
            created_at: Set(model.created_at),
        }
    }
}

// ===== Actor Conversions =====

fn parse_role(value: &str) -> Result<Role> {
    match value {
        "admin" => Ok(Role::Admin),
        "agent" => Ok(Role::Agent),
        other => Err(anyhow!("unknown role '{}'", other)),
    }
}

/// Actors carry their full level
pub fn actor_from_row(entity: actor::Model, level: SupportLevel) -> Result<Actor> {
    Ok(Actor {
        id: entity.id,
        name: entity.name,
        email: entity.email,
        role: parse_role(&entity.role)?,
        level,
        is_active: entity.is_active,
    })
}

// ===== Ticket Conversions =====

/// Tickets carry their full level; the repository resolves it
pub fn ticket_from_row(entity: ticket::Model, level: SupportLevel) -> Result<Ticket> {
    Ok(Ticket {
        id: entity.id,
        ticket_number: entity.ticket_number,
        subject: entity.subject,
        description: entity.description,
        category_id: entity.category_id,
        status: parse(&entity.status)?,
        priority: parse(&entity.priority)?,
        level,
        assignee_id: entity.assignee_id,
        created_by_id: entity.created_by_id,
        customer: Customer {
            name: entity.customer_name,
            email: entity.customer_email,
            phone: entity.customer_phone,
            company: entity.customer_company,
        },
        due_date: entity.due_date,
        created_at: entity.created_at,
        updated_at: entity.updated_at,
        resolved_at: entity.resolved_at,
        closed_at: entity.closed_at,
        version: entity.version,
    })
}

impl From<&Ticket> for ticket::ActiveModel {
    fn from(model: &Ticket) -> Self {
        Self {
            id: Set(model.id),
            ticket_number: Set(model.ticket_number.clone()),
            subject: Set(model.subject.clone()),
            description: Set(model.description.clone()),
            category_id: Set(model.category_id),
            status: Set(model.status.as_str().to_string()),
            priority: Set(model.priority.as_str().to_string()),
            level_id: Set(model.level.id),
            assignee_id: Set(model.assignee_id),
            created_by_id: Set(model.created_by_id),
            customer_name: Set(model.customer.name.clone()),
            customer_email: Set(model.customer.email.clone()),
            customer_phone: Set(model.customer.phone.clone()),
            customer_company: Set(model.customer.company.clone()),
            due_date: Set(model.due_date),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
            resolved_at: Set(model.resolved_at),
            closed_at: Set(model.closed_at),
            version: Set(model.version),
        }
    }
}

// ===== Child Record Conversions =====

impl TryFrom<activity::Model> for TicketActivity {
    type Error = anyhow::Error;

    fn try_from(entity: activity::Model) -> Result<Self> {
        Ok(Self {
            id: entity.id,
            ticket_id: entity.ticket_id,
            author_id: entity.author_id,
            activity_type: parse(&entity.activity_type)?,
            description: entity.description,
            old_value: entity.old_value,
            new_value: entity.new_value,
            created_at: entity.created_at,
        })
    }
}

impl From<&TicketActivity> for activity::ActiveModel {
    fn from(model: &TicketActivity) -> Self {
        Self {
            id: Set(model.id),
            ticket_id: Set(model.ticket_id),
            author_id: Set(model.author_id),
            activity_type: Set(model.activity_type.as_str().to_string()),
            description: Set(model.description.clone()),
            old_value: Set(model.old_value.clone()),
            new_value: Set(model.new_value.clone()),
            created_at: Set(model.created_at),
            position: Set(0),
        }
    }
}

impl From<attachment::Model> for Attachment {
    fn from(entity: attachment::Model) -> Self {
        Self {
            id: entity.id,
            ticket_id: entity.ticket_id,
            reply_id: entity.reply_id,
            note_id: entity.note_id,
            file_name: entity.file_name,
            file_key: entity.file_key,
            file_url: entity.file_url,
            file_size: entity.file_size,
            file_type: entity.file_type,
            uploaded_by_id: entity.uploaded_by_id,
            created_at: entity.created_at,
        }
    }
}

impl From<&Attachment> for attachment::ActiveModel {
    fn from(model: &Attachment) -> Self {
        Self {
            id: Set(model.id),
            ticket_id: Set(model.ticket_id),
            reply_id: Set(model.reply_id),
            note_id: Set(model.note_id),
            file_name: Set(model.file_name.clone()),
            file_key: Set(model.file_key.clone()),
            file_url: Set(model.file_url.clone()),
            file_size: Set(model.file_size),
            file_type: Set(model.file_type.clone()),
            uploaded_by_id: Set(model.uploaded_by_id),
            created_at: Set(model.created_at),
        }
    }
}

/// Attachments are joined in by the repository
pub fn reply_from_row(entity: reply::Model, attachments: Vec<Attachment>) -> TicketReply {
    TicketReply {
        id: entity.id,
        ticket_id: entity.ticket_id,
        author_id: entity.author_id,
        from_customer: entity.from_customer,
        message: entity.message,
        attachments,
        created_at: entity.created_at,
    }
}

impl From<&TicketReply> for reply::ActiveModel {
    fn from(model: &TicketReply) -> Self {
        Self {
            id: Set(model.id),
            ticket_id: Set(model.ticket_id),
            author_id: Set(model.author_id),
            from_customer: Set(model.from_customer),
            message: Set(model.message.clone()),
            created_at: Set(model.created_at),
        }
    }
}

pub fn note_from_row(entity: note::Model, attachments: Vec<Attachment>) -> TicketNote {
    TicketNote {
        id: entity.id,
        ticket_id: entity.ticket_id,
        author_id: entity.author_id,
        content: entity.content,
        attachments,
        created_at: entity.created_at,
    }
}

impl From<&TicketNote> for note::ActiveModel {
    fn from(model: &TicketNote) -> Self {
        Self {
            id: Set(model.id),
            ticket_id: Set(model.ticket_id),
            author_id: Set(model.author_id),
            content: Set(model.content.clone()),
            created_at: Set(model.created_at),
        }
    }
}

// ===== Setting Conversions =====

impl From<setting::Model> for GlobalSetting {
    fn from(entity: setting::Model) -> Self {
        Self {
            key: entity.key,
            value: entity.value,
            version: entity.version,
            updated_by: entity.updated_by,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_capabilities_json_tolerates_missing_flags() {
        let now = Utc::now();
        let row = support_level::Model {
            id: Uuid::new_v4(),
            code: "L1".to_string(),
            name: "Level 1".to_string(),
            sort_order: 1,
            is_active: true,
            capabilities: serde_json::json!({ "can_create_ticket": true }),
            created_at: now,
            updated_at: now,
        };
        let level = SupportLevel::try_from(row).unwrap();
        assert!(level.capabilities.can_create_ticket);
        assert!(!level.capabilities.can_view_all_tickets);
    }

    #[test]
    fn test_unknown_activity_type_is_rejected() {
        let now = Utc::now();
        let row = activity::Model {
            id: Uuid::new_v4(),
            ticket_id: Uuid::new_v4(),
            author_id: None,
            activity_type: "deleted".to_string(),
            description: String::new(),
            old_value: None,
            new_value: None,
            created_at: now,
            position: 0,
        };
        assert!(TicketActivity::try_from(row).is_err());
    }
}
