//! HTTP request handlers - thin layer that delegates to domain service

use super::{
    dto::*,
    error::{map_domain_error, Problem},
    mapper::{attachment_refs, parse_priority},
};
use crate::contract::{Actor, NewTicket, TicketFilter, TicketUpdate};
use crate::domain::Service;
use axum::{
    extract::{FromRequestParts, Path, Query},
    http::{request::Parts, StatusCode},
    Extension, Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Header carrying the authenticated actor id
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Authenticated caller, resolved from the `x-actor-id` header
pub struct CurrentActor(pub Actor);

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Problem::unauthorized(format!("missing {} header", ACTOR_HEADER)))?;
        let actor_id = Uuid::parse_str(raw.trim())
            .map_err(|_| Problem::unauthorized(format!("malformed {} header", ACTOR_HEADER)))?;

        let Extension(service) = Extension::<Arc<Service>>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                tracing::error!("Helpdesk service extension missing: {}", e);
                Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            })?;

        let actor = service
            .resolve_actor(actor_id)
            .await
            .map_err(|_| Problem::unauthorized("unknown or inactive actor"))?;
        Ok(Self(actor))
    }
}

// ===== Ticket Handlers =====

/// Create a new ticket
pub async fn create_ticket(
    service: Arc<Service>,
    actor: Actor,
    Json(req): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<TicketDto>), Problem> {
    let input = NewTicket::try_from(req).map_err(map_domain_error)?;
    let ticket = service
        .create_ticket(&actor, input)
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(ticket.into())))
}

/// List tickets visible to the caller
pub async fn list_tickets(
    service: Arc<Service>,
    actor: Actor,
    Query(query): Query<ListTicketsQuery>,
) -> Result<Json<TicketListResponse>, Problem> {
    let filter = TicketFilter::try_from(query).map_err(map_domain_error)?;
    let tickets = service
        .list_tickets(&actor, &filter)
        .await
        .map_err(map_domain_error)?;

    let items: Vec<TicketDto> = tickets.into_iter().map(|t| t.into()).collect();
    let total = items.len();

    Ok(Json(TicketListResponse { items, total }))
}

/// Get a ticket with its replies, notes and activity log
pub async fn get_ticket(
    service: Arc<Service>,
    actor: Actor,
    Path(ticket_id): Path<Uuid>,
) -> Result<Json<TicketDetailDto>, Problem> {
    let detail = service
        .get_ticket(&actor, ticket_id)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(detail.into()))
}

pub async fn update_ticket(
    service: Arc<Service>,
    actor: Actor,
    Path(ticket_id): Path<Uuid>,
    Json(req): Json<UpdateTicketRequest>,
) -> Result<Json<TicketDto>, Problem> {
    let update = TicketUpdate::try_from(req).map_err(map_domain_error)?;
    let ticket = service
        .update_ticket(&actor, ticket_id, update)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(ticket.into()))
}

/// Assign, reassign or unassign a ticket
pub async fn assign_ticket(
    service: Arc<Service>,
    actor: Actor,
    Path(ticket_id): Path<Uuid>,
    Json(req): Json<AssignTicketRequest>,
) -> Result<Json<TicketDto>, Problem> {
    let ticket = service
        .assign_ticket(&actor, ticket_id, req.assignee_id, req.note)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(ticket.into()))
}

/// Move a ticket to the next active support level
pub async fn escalate_ticket(
    service: Arc<Service>,
    actor: Actor,
    Path(ticket_id): Path<Uuid>,
    Json(req): Json<EscalateTicketRequest>,
) -> Result<Json<TicketDto>, Problem> {
    let ticket = service
        .escalate_ticket(&actor, ticket_id, req.reason)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(ticket.into()))
}

pub async fn add_reply(
    service: Arc<Service>,
    actor: Actor,
    Path(ticket_id): Path<Uuid>,
    Json(req): Json<ReplyRequest>,
) -> Result<(StatusCode, Json<ReplyDto>), Problem> {
    let reply = service
        .add_reply(&actor, ticket_id, req.message, attachment_refs(req.attachments))
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(reply.into())))
}

pub async fn add_note(
    service: Arc<Service>,
    actor: Actor,
    Path(ticket_id): Path<Uuid>,
    Json(req): Json<NoteRequest>,
) -> Result<(StatusCode, Json<NoteDto>), Problem> {
    let note = service
        .add_note(&actor, ticket_id, req.content, attachment_refs(req.attachments))
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(note.into())))
}

pub async fn attach_files(
    service: Arc<Service>,
    actor: Actor,
    Path(ticket_id): Path<Uuid>,
    Json(req): Json<AttachFilesRequest>,
) -> Result<(StatusCode, Json<Vec<AttachmentDto>>), Problem> {
    let attachments = service
        .attach_files(&actor, ticket_id, attachment_refs(req.attachments))
        .await
        .map_err(map_domain_error)?;

    Ok((
        StatusCode::CREATED,
        Json(attachments.into_iter().map(|a| a.into()).collect()),
    ))
}

/// SLA progress of a ticket at request time
pub async fn sla_status(
    service: Arc<Service>,
    actor: Actor,
    Path(ticket_id): Path<Uuid>,
) -> Result<Json<SlaStatusDto>, Problem> {
    let snapshot = service
        .sla_status(&actor, ticket_id, Utc::now())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(snapshot.into()))
}

/// Close tickets that stayed resolved past the auto-close window
pub async fn auto_close(
    service: Arc<Service>,
    actor: Actor,
) -> Result<Json<AutoCloseResponse>, Problem> {
    let closed = service
        .close_stale_resolved(&actor, Utc::now())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(AutoCloseResponse { closed }))
}

// ===== Public (customer) Handlers =====

/// Look up a ticket by number, authenticated by the customer email
pub async fn public_lookup(
    service: Arc<Service>,
    Path(ticket_number): Path<String>,
    Query(query): Query<PublicLookupQuery>,
) -> Result<Json<PublicTicketDto>, Problem> {
    let view = service
        .public_lookup(&ticket_number, &query.email)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(view.into()))
}

pub async fn add_customer_reply(
    service: Arc<Service>,
    Path(ticket_number): Path<String>,
    Json(req): Json<CustomerReplyRequest>,
) -> Result<(StatusCode, Json<PublicReplyDto>), Problem> {
    let reply = service
        .add_customer_reply(
            &ticket_number,
            &req.email,
            req.message,
            attachment_refs(req.attachments),
        )
        .await
        .map_err(map_domain_error)?;

    Ok((
        StatusCode::CREATED,
        Json(PublicReplyDto {
            from_customer: reply.from_customer,
            message: reply.message,
            attachments: reply.attachments.into_iter().map(|a| a.into()).collect(),
            created_at: reply.created_at,
        }),
    ))
}

// ===== Support Level Handlers =====

pub async fn list_levels(service: Arc<Service>) -> Result<Json<Vec<SupportLevelDto>>, Problem> {
    let levels = service
        .list_support_levels()
        .await
        .map_err(map_domain_error)?;

    Ok(Json(levels.into_iter().map(|l| l.into()).collect()))
}

pub async fn create_level(
    service: Arc<Service>,
    actor: Actor,
    Json(req): Json<CreateSupportLevelRequest>,
) -> Result<(StatusCode, Json<SupportLevelDto>), Problem> {
    let level = service
        .create_support_level(&actor, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(level.into())))
}

pub async fn update_level(
    service: Arc<Service>,
    actor: Actor,
    Path(level_id): Path<Uuid>,
    Json(req): Json<UpdateSupportLevelRequest>,
) -> Result<Json<SupportLevelDto>, Problem> {
    let level = service
        .update_support_level(&actor, level_id, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(level.into()))
}

/// Deactivate a level no active agent belongs to
pub async fn deactivate_level(
    service: Arc<Service>,
    actor: Actor,
    Path(level_id): Path<Uuid>,
) -> Result<Json<SupportLevelDto>, Problem> {
    let level = service
        .deactivate_support_level(&actor, level_id)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(level.into()))
}

// ===== SLA Config / Category Handlers =====

pub async fn list_sla_configs(service: Arc<Service>) -> Result<Json<Vec<SlaConfigDto>>, Problem> {
    let configs = service
        .list_sla_configs()
        .await
        .map_err(map_domain_error)?;

    Ok(Json(configs.into_iter().map(|c| c.into()).collect()))
}

pub async fn upsert_sla_config(
    service: Arc<Service>,
    actor: Actor,
    Path(priority): Path<String>,
    Json(req): Json<UpsertSlaConfigRequest>,
) -> Result<Json<SlaConfigDto>, Problem> {
    let priority = parse_priority(&priority).map_err(map_domain_error)?;
    let config = service
        .upsert_sla_config(&actor, priority, req.duration_hrs, req.is_active)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(config.into()))
}

pub async fn list_categories(service: Arc<Service>) -> Result<Json<Vec<CategoryDto>>, Problem> {
    let categories = service
        .list_categories()
        .await
        .map_err(map_domain_error)?;

    Ok(Json(categories.into_iter().map(|c| c.into()).collect()))
}

pub async fn create_category(
    service: Arc<Service>,
    actor: Actor,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryDto>), Problem> {
    let category = service
        .create_category(&actor, req.name, req.description)
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(category.into())))
}

// ===== Settings Handlers =====

/// Stored overrides plus the merged values the service runs with
pub async fn list_settings(service: Arc<Service>) -> Result<Json<SettingsListResponse>, Problem> {
    let items = service.list_settings().await.map_err(map_domain_error)?;
    let effective = service
        .effective_settings()
        .await
        .map_err(map_domain_error)?;

    Ok(Json(SettingsListResponse {
        items: items.into_iter().map(|s| s.into()).collect(),
        effective: effective.into(),
    }))
}

pub async fn update_setting(
    service: Arc<Service>,
    actor: Actor,
    Path(key): Path<String>,
    Json(req): Json<UpdateSettingRequest>,
) -> Result<Json<SettingDto>, Problem> {
    let setting = service
        .update_setting(&actor, &key, req.value)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(setting.into()))
}
