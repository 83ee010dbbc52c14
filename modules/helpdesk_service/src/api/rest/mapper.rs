//! Mapper implementations for converting between DTOs and contract models
//!
//! This module contains all From/Into implementations for bidirectional
//! conversion between REST DTOs and transport-agnostic contract models.
//! Request conversions that parse enumerations are fallible and report
//! validation errors.

use super::dto::*;
use crate::contract::{self, HelpdeskError, Priority, TicketStatus};
use crate::domain::HelpdeskSettings;

pub fn parse_priority(value: &str) -> Result<Priority, HelpdeskError> {
    value.parse().map_err(HelpdeskError::validation)
}

pub fn parse_status(value: &str) -> Result<TicketStatus, HelpdeskError> {
    value.parse().map_err(HelpdeskError::validation)
}

// ===== Support level conversions =====

impl From<contract::LevelCapabilities> for LevelCapabilitiesDto {
    fn from(caps: contract::LevelCapabilities) -> Self {
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

impl From<LevelCapabilitiesDto> for contract::LevelCapabilities {
    fn from(dto: LevelCapabilitiesDto) -> Self {
        Self {
            can_view_own_tickets: dto.can_view_own_tickets,
            can_view_team_tickets: dto.can_view_team_tickets,
            can_view_all_tickets: dto.can_view_all_tickets,
            can_create_ticket: dto.can_create_ticket,
            can_assign_ticket: dto.can_assign_ticket,
            can_escalate_ticket: dto.can_escalate_ticket,
            can_resolve_ticket: dto.can_resolve_ticket,
            can_close_ticket: dto.can_close_ticket,
        }
    }
}

impl From<contract::SupportLevel> for SupportLevelDto {
    fn from(level: contract::SupportLevel) -> Self {
        Self {
            id: level.id,
            code: level.code,
            name: level.name,
            sort_order: level.sort_order,
            is_active: level.is_active,
            capabilities: level.capabilities.into(),
            created_at: level.created_at,
            updated_at: level.updated_at,
        }
    }
}

impl From<CreateSupportLevelRequest> for contract::NewSupportLevel {
    fn from(req: CreateSupportLevelRequest) -> Self {
        Self {
            code: req.code,
            name: req.name,
            sort_order: req.sort_order,
            capabilities: req.capabilities.into(),
        }
    }
}

impl From<UpdateSupportLevelRequest> for contract::SupportLevelUpdate {
    fn from(req: UpdateSupportLevelRequest) -> Self {
        Self {
            name: req.name,
            sort_order: req.sort_order,
            capabilities: req.capabilities.map(Into::into),
        }
    }
}

// ===== SLA / category conversions =====

impl From<contract::SlaConfig> for SlaConfigDto {
    fn from(config: contract::SlaConfig) -> Self {
        Self {
            id: config.id,
            priority: config.priority.to_string(),
            duration_hrs: config.duration_hrs,
            is_active: config.is_active,
            created_at: config.created_at,
            updated_at: config.updated_at,
        }
    }
}

impl From<contract::Category> for CategoryDto {
    fn from(category: contract::Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            is_active: category.is_active,
            created_at: category.created_at,
        }
    }
}

// ===== Attachment conversions =====

impl From<AttachmentRefDto> for contract::AttachmentRef {
    fn from(dto: AttachmentRefDto) -> Self {
        Self {
            file_name: dto.file_name,
            file_key: dto.file_key,
            file_url: dto.file_url,
            file_size: dto.file_size,
            file_type: dto.file_type,
        }
    }
}

pub fn attachment_refs(dtos: Vec<AttachmentRefDto>) -> Vec<contract::AttachmentRef> {
    dtos.into_iter().map(Into::into).collect()
}

impl From<contract::Attachment> for AttachmentDto {
    fn from(attachment: contract::Attachment) -> Self {
        Self {
            id: attachment.id,
            file_name: attachment.file_name,
            file_key: attachment.file_key,
            file_url: attachment.file_url,
            file_size: attachment.file_size,
            file_type: attachment.file_type,
            uploaded_by_id: attachment.uploaded_by_id,
            created_at: attachment.created_at,
        }
    }
}

fn attachment_dtos(attachments: Vec<contract::Attachment>) -> Vec<AttachmentDto> {
    attachments.into_iter().map(Into::into).collect()
}

// ===== Ticket conversions =====

impl From<contract::Ticket> for TicketDto {
    fn from(ticket: contract::Ticket) -> Self {
        Self {
            id: ticket.id,
            ticket_number: ticket.ticket_number,
            subject: ticket.subject,
            description: ticket.description,
            category_id: ticket.category_id,
            status: ticket.status.to_string(),
            priority: ticket.priority.to_string(),
            level_id: ticket.level.id,
            level_code: ticket.level.code,
            assignee_id: ticket.assignee_id,
            created_by_id: ticket.created_by_id,
            customer: CustomerDto {
                name: ticket.customer.name,
                email: ticket.customer.email,
                phone: ticket.customer.phone,
                company: ticket.customer.company,
            },
            due_date: ticket.due_date,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
            resolved_at: ticket.resolved_at,
            closed_at: ticket.closed_at,
            version: ticket.version,
        }
    }
}

impl TryFrom<CreateTicketRequest> for contract::NewTicket {
    type Error = HelpdeskError;

    fn try_from(req: CreateTicketRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            subject: req.subject,
            description: req.description,
            category_id: req.category_id,
            priority: req.priority.as_deref().map(parse_priority).transpose()?,
            level_id: req.level_id,
            customer: contract::Customer {
                name: req.customer_name,
                email: req.customer_email.trim().to_string(),
                phone: req.customer_phone,
                company: req.customer_company,
            },
            due_date: req.due_date,
            attachments: attachment_refs(req.attachments),
        })
    }
}

impl TryFrom<UpdateTicketRequest> for contract::TicketUpdate {
    type Error = HelpdeskError;

    fn try_from(req: UpdateTicketRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            status: req.status.as_deref().map(parse_status).transpose()?,
            priority: req.priority.as_deref().map(parse_priority).transpose()?,
            level_id: req.level_id,
            due_date: req.due_date,
        })
    }
}

impl TryFrom<ListTicketsQuery> for contract::TicketFilter {
    type Error = HelpdeskError;

    fn try_from(query: ListTicketsQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            status: query.status.as_deref().map(parse_status).transpose()?,
            priority: query.priority.as_deref().map(parse_priority).transpose()?,
            level_id: query.level_id,
            assignee_id: query.assignee_id,
            category_id: query.category_id,
            search: query.search,
        })
    }
}

impl From<contract::TicketReply> for ReplyDto {
    fn from(reply: contract::TicketReply) -> Self {
        Self {
            id: reply.id,
            author_id: reply.author_id,
            from_customer: reply.from_customer,
            message: reply.message,
            attachments: attachment_dtos(reply.attachments),
            created_at: reply.created_at,
        }
    }
}

impl From<contract::TicketNote> for NoteDto {
    fn from(note: contract::TicketNote) -> Self {
        Self {
            id: note.id,
            author_id: note.author_id,
            content: note.content,
            attachments: attachment_dtos(note.attachments),
            created_at: note.created_at,
        }
    }
}

impl From<contract::TicketActivity> for ActivityDto {
    fn from(activity: contract::TicketActivity) -> Self {
        Self {
            id: activity.id,
            author_id: activity.author_id,
            activity_type: activity.activity_type.to_string(),
            description: activity.description,
            old_value: activity.old_value,
            new_value: activity.new_value,
            created_at: activity.created_at,
        }
    }
}

impl From<contract::TicketDetail> for TicketDetailDto {
    fn from(detail: contract::TicketDetail) -> Self {
        Self {
            ticket: detail.ticket.into(),
            replies: detail.replies.into_iter().map(Into::into).collect(),
            notes: detail.notes.into_iter().map(Into::into).collect(),
            attachments: attachment_dtos(detail.attachments),
            activities: detail.activities.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<contract::SlaSnapshot> for SlaStatusDto {
    fn from(snapshot: contract::SlaSnapshot) -> Self {
        Self {
            elapsed_minutes: snapshot.elapsed_minutes,
            target_minutes: snapshot.target_minutes,
            percent: snapshot.percent,
            state: snapshot.state.as_str().to_string(),
            fallback_target: snapshot.fallback_target,
        }
    }
}

// ===== Public lookup conversions =====

impl From<contract::PublicTicketView> for PublicTicketDto {
    fn from(view: contract::PublicTicketView) -> Self {
        Self {
            ticket_number: view.ticket_number,
            subject: view.subject,
            description: view.description,
            status: view.status.to_string(),
            priority: view.priority.to_string(),
            level_code: view.level_code,
            customer_name: view.customer_name,
            due_date: view.due_date,
            created_at: view.created_at,
            resolved_at: view.resolved_at,
            closed_at: view.closed_at,
            replies: view
                .replies
                .into_iter()
                .map(|r| PublicReplyDto {
                    from_customer: r.from_customer,
                    message: r.message,
                    attachments: attachment_dtos(r.attachments),
                    created_at: r.created_at,
                })
                .collect(),
            activities: view
                .activities
                .into_iter()
                .map(|a| PublicActivityDto {
                    activity_type: a.activity_type.to_string(),
                    description: a.description,
                    created_at: a.created_at,
                })
                .collect(),
        }
    }
}

// ===== Settings conversions =====

impl From<contract::GlobalSetting> for SettingDto {
    fn from(setting: contract::GlobalSetting) -> Self {
        Self {
            key: setting.key,
            value: setting.value,
            version: setting.version,
            updated_by: setting.updated_by,
            updated_at: setting.updated_at,
        }
    }
}

impl From<HelpdeskSettings> for EffectiveSettingsDto {
    fn from(settings: HelpdeskSettings) -> Self {
        Self {
            ticket_prefix: settings.ticket_prefix,
            sla_fallback_hours: settings.sla_fallback_hours,
            auto_close_days: settings.auto_close_days,
        }
    }
}
