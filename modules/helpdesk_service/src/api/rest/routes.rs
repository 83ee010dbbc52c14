//! Route registration for the helpdesk REST API

use super::{
    dto::*,
    error::Problem,
    handlers::{self, CurrentActor},
};
use crate::domain::Service;
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, patch, post, put},
    Extension, Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

/// Register all REST routes
pub fn register_routes(router: Router, service: Arc<Service>) -> anyhow::Result<Router> {
    let router = router
        // Ticket endpoints
        .route("/tickets", get(list_tickets_handler).post(create_ticket_handler))
        .route(
            "/tickets/{id}",
            get(get_ticket_handler).patch(update_ticket_handler),
        )
        .route("/tickets/{id}/assign", post(assign_ticket_handler))
        .route("/tickets/{id}/escalate", post(escalate_ticket_handler))
        .route("/tickets/{id}/replies", post(add_reply_handler))
        .route("/tickets/{id}/notes", post(add_note_handler))
        .route("/tickets/{id}/attachments", post(attach_files_handler))
        .route("/tickets/{id}/sla", get(sla_status_handler))
        .route("/maintenance/auto-close", post(auto_close_handler))
        // Customer-facing endpoints
        .route("/public/tickets/{number}", get(public_lookup_handler))
        .route(
            "/public/tickets/{number}/replies",
            post(add_customer_reply_handler),
        )
        // Reference data endpoints
        .route("/levels", get(list_levels_handler).post(create_level_handler))
        .route("/levels/{id}", patch(update_level_handler))
        .route("/levels/{id}/deactivate", post(deactivate_level_handler))
        .route("/sla-configs", get(list_sla_configs_handler))
        .route("/sla-configs/{priority}", put(upsert_sla_config_handler))
        .route(
            "/categories",
            get(list_categories_handler).post(create_category_handler),
        )
        // Settings endpoints
        .route("/settings", get(list_settings_handler))
        .route("/settings/{key}", put(update_setting_handler))
        // Add service as extension for handlers
        .layer(Extension(service));

    Ok(router)
}

// ===== Handler wrappers that extract service from Extension =====

async fn create_ticket_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(actor): CurrentActor,
    json: Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<TicketDto>), Problem> {
    handlers::create_ticket(service, actor, json).await
}

async fn list_tickets_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(actor): CurrentActor,
    query: Query<ListTicketsQuery>,
) -> Result<Json<TicketListResponse>, Problem> {
    handlers::list_tickets(service, actor, query).await
}

async fn get_ticket_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(actor): CurrentActor,
    path: Path<Uuid>,
) -> Result<Json<TicketDetailDto>, Problem> {
    handlers::get_ticket(service, actor, path).await
}

async fn update_ticket_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(actor): CurrentActor,
    path: Path<Uuid>,
    json: Json<UpdateTicketRequest>,
) -> Result<Json<TicketDto>, Problem> {
    handlers::update_ticket(service, actor, path, json).await
}

async fn assign_ticket_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(actor): CurrentActor,
    path: Path<Uuid>,
    json: Json<AssignTicketRequest>,
) -> Result<Json<TicketDto>, Problem> {
    handlers::assign_ticket(service, actor, path, json).await
}

async fn escalate_ticket_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(actor): CurrentActor,
    path: Path<Uuid>,
    json: Json<EscalateTicketRequest>,
) -> Result<Json<TicketDto>, Problem> {
    handlers::escalate_ticket(service, actor, path, json).await
}

async fn add_reply_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(actor): CurrentActor,
    path: Path<Uuid>,
    json: Json<ReplyRequest>,
) -> Result<(StatusCode, Json<ReplyDto>), Problem> {
    handlers::add_reply(service, actor, path, json).await
}

async fn add_note_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(actor): CurrentActor,
    path: Path<Uuid>,
    json: Json<NoteRequest>,
) -> Result<(StatusCode, Json<NoteDto>), Problem> {
    handlers::add_note(service, actor, path, json).await
}

async fn attach_files_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(actor): CurrentActor,
    path: Path<Uuid>,
    json: Json<AttachFilesRequest>,
) -> Result<(StatusCode, Json<Vec<AttachmentDto>>), Problem> {
    handlers::attach_files(service, actor, path, json).await
}

async fn sla_status_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(actor): CurrentActor,
    path: Path<Uuid>,
) -> Result<Json<SlaStatusDto>, Problem> {
    handlers::sla_status(service, actor, path).await
}

async fn auto_close_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<AutoCloseResponse>, Problem> {
    handlers::auto_close(service, actor).await
}

async fn public_lookup_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<String>,
    query: Query<PublicLookupQuery>,
) -> Result<Json<PublicTicketDto>, Problem> {
    handlers::public_lookup(service, path, query).await
}

async fn add_customer_reply_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<String>,
    json: Json<CustomerReplyRequest>,
) -> Result<(StatusCode, Json<PublicReplyDto>), Problem> {
    handlers::add_customer_reply(service, path, json).await
}

async fn list_levels_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(_actor): CurrentActor,
) -> Result<Json<Vec<SupportLevelDto>>, Problem> {
    handlers::list_levels(service).await
}

async fn create_level_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(actor): CurrentActor,
    json: Json<CreateSupportLevelRequest>,
) -> Result<(StatusCode, Json<SupportLevelDto>), Problem> {
    handlers::create_level(service, actor, json).await
}

async fn update_level_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(actor): CurrentActor,
    path: Path<Uuid>,
    json: Json<UpdateSupportLevelRequest>,
) -> Result<Json<SupportLevelDto>, Problem> {
    handlers::update_level(service, actor, path, json).await
}

async fn deactivate_level_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(actor): CurrentActor,
    path: Path<Uuid>,
) -> Result<Json<SupportLevelDto>, Problem> {
    handlers::deactivate_level(service, actor, path).await
}

async fn list_sla_configs_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(_actor): CurrentActor,
) -> Result<Json<Vec<SlaConfigDto>>, Problem> {
    handlers::list_sla_configs(service).await
}

async fn upsert_sla_config_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(actor): CurrentActor,
    path: Path<String>,
    json: Json<UpsertSlaConfigRequest>,
) -> Result<Json<SlaConfigDto>, Problem> {
    handlers::upsert_sla_config(service, actor, path, json).await
}

async fn list_categories_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(_actor): CurrentActor,
) -> Result<Json<Vec<CategoryDto>>, Problem> {
    handlers::list_categories(service).await
}

async fn create_category_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(actor): CurrentActor,
    json: Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryDto>), Problem> {
    handlers::create_category(service, actor, json).await
}

async fn list_settings_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(_actor): CurrentActor,
) -> Result<Json<SettingsListResponse>, Problem> {
    handlers::list_settings(service).await
}

async fn update_setting_handler(
    Extension(service): Extension<Arc<Service>>,
    CurrentActor(actor): CurrentActor,
    path: Path<String>,
    json: Json<UpdateSettingRequest>,
) -> Result<Json<SettingDto>, Problem> {
    handlers::update_setting(service, actor, path, json).await
}
