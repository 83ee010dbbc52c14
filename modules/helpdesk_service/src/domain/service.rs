//! Domain service - business logic orchestration

use super::access::{self, VisibilityScope};
use super::activity::{self, StatusReason};
use super::escalation;
use super::events::{NotificationIntent, NotificationKind, NotificationPublisher};
use super::lifecycle::TicketMutation;
use super::repository::{
    ActorRepository, CategoryRepository, SettingsRepository, SlaConfigRepository, StoreError,
    SupportLevelRepository, TicketChangeSet, TicketRepository,
};
use super::settings::HelpdeskSettings;
use super::sla;
use super::ticket_number;
use super::validation;
use crate::config::Config;
use crate::contract::{
    ActivityType, Actor, Attachment, AttachmentRef, Category, DeniedAction, GlobalSetting,
    HelpdeskError, NewSupportLevel, NewTicket, Priority, PublicTicketView, SlaConfig,
    SlaSnapshot, SupportLevel, SupportLevelUpdate, Ticket, TicketDetail, TicketFilter,
    TicketNote, TicketReply, TicketStatus, TicketUpdate,
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Storage collaborators of the service
#[derive(Clone)]
pub struct Repositories {
    pub levels: Arc<dyn SupportLevelRepository>,
    pub sla_configs: Arc<dyn SlaConfigRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub actors: Arc<dyn ActorRepository>,
    pub tickets: Arc<dyn TicketRepository>,
    pub settings: Arc<dyn SettingsRepository>,
}

/// Domain service for the ticket lifecycle
pub struct Service {
    repos: Repositories,
    notifier: Arc<dyn NotificationPublisher>,
    config: Config,
}

fn internal(error: anyhow::Error) -> HelpdeskError {
    tracing::error!(error = ?error, "helpdesk storage failure");
    HelpdeskError::Internal
}

fn store_failure(error: StoreError) -> HelpdeskError {
    match error {
        StoreError::StaleWrite { ticket_id, .. } => HelpdeskError::conflict(format!(
            "ticket {} was modified concurrently, reload and retry",
            ticket_id
        )),
        StoreError::DuplicateNumber(number) => {
            HelpdeskError::conflict(format!("ticket number {} already exists", number))
        }
        StoreError::Other(e) => internal(e),
    }
}

fn materialize_attachments(
    refs: Vec<AttachmentRef>,
    ticket_id: Uuid,
    reply_id: Option<Uuid>,
    note_id: Option<Uuid>,
    uploaded_by_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> Vec<Attachment> {
    refs.into_iter()
        .map(|r| Attachment {
            id: Uuid::new_v4(),
            ticket_id,
            reply_id,
            note_id,
            file_name: r.file_name,
            file_key: r.file_key,
            file_url: r.file_url,
            file_size: r.file_size,
            file_type: r.file_type,
            uploaded_by_id,
            created_at: now,
        })
        .collect()
}

impl Service {
    /// Create a new service instance
    pub fn new(repos: Repositories, notifier: Arc<dyn NotificationPublisher>, config: Config) -> Self {
        Self {
            repos,
            notifier,
            config,
        }
    }

    // ===== Helpers =====

    /// Publish intents after commit; failures never reach the caller
    fn notify(&self, intents: Vec<NotificationIntent>) {
        for intent in intents {
            if let Err(e) = self.notifier.publish(intent) {
                tracing::warn!(error = %e, "failed to publish notification intent");
            }
        }
    }

    async fn load_ticket(&self, ticket_id: Uuid) -> Result<Ticket, HelpdeskError> {
        self.repos
            .tickets
            .find_by_id(ticket_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| HelpdeskError::not_found("ticket", ticket_id))
    }

    async fn load_level(&self, level_id: Uuid) -> Result<SupportLevel, HelpdeskError> {
        self.repos
            .levels
            .find_by_id(level_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| HelpdeskError::not_found("support level", level_id))
    }

    async fn load_active_level(&self, level_id: Uuid) -> Result<SupportLevel, HelpdeskError> {
        let level = self.load_level(level_id).await?;
        if !level.is_active {
            return Err(HelpdeskError::validation(format!(
                "support level {} is inactive",
                level.code
            )));
        }
        Ok(level)
    }

    async fn actor_name(&self, actor_id: Uuid) -> String {
        match self.repos.actors.find_by_id(actor_id).await {
            Ok(Some(actor)) => actor.name,
            Ok(None) => actor_id.to_string(),
            Err(e) => {
                tracing::warn!(%actor_id, error = %e, "could not resolve actor name");
                actor_id.to_string()
            }
        }
    }

    async fn commit(&self, change: TicketChangeSet) -> Result<Ticket, HelpdeskError> {
        self.repos.tickets.commit(change).await.map_err(store_failure)
    }

    /// Ticket matching both number and customer email; any mismatch is NotFound
    async fn find_public_ticket(
        &self,
        ticket_number: &str,
        customer_email: &str,
    ) -> Result<Ticket, HelpdeskError> {
        let not_found = || HelpdeskError::not_found("ticket", ticket_number);
        let ticket = self
            .repos
            .tickets
            .find_by_number(ticket_number)
            .await
            .map_err(internal)?
            .ok_or_else(not_found)?;
        if ticket.customer.email != customer_email {
            return Err(not_found());
        }
        Ok(ticket)
    }

    // ===== Actors & Settings =====

    /// Resolve the authenticated actor supplied by the auth layer
    pub async fn resolve_actor(&self, actor_id: Uuid) -> Result<Actor, HelpdeskError> {
        self.repos
            .actors
            .find_by_id(actor_id)
            .await
            .map_err(internal)?
            .filter(|a| a.is_active)
            .ok_or_else(|| HelpdeskError::not_found("actor", actor_id))
    }

    /// Effective settings: stored rows merged over configured defaults
    pub async fn effective_settings(&self) -> Result<HelpdeskSettings, HelpdeskError> {
        let rows = self.repos.settings.list_all().await.map_err(internal)?;
        Ok(HelpdeskSettings::merge(&self.config, &rows))
    }

    pub async fn list_settings(&self) -> Result<Vec<GlobalSetting>, HelpdeskError> {
        self.repos.settings.list_all().await.map_err(internal)
    }

    pub async fn update_setting(
        &self,
        actor: &Actor,
        key: &str,
        value: serde_json::Value,
    ) -> Result<GlobalSetting, HelpdeskError> {
        access::ensure_admin(actor)?;
        HelpdeskSettings::validate(key, &value)?;
        let row = self
            .repos
            .settings
            .upsert(key, &value, Some(actor.id))
            .await
            .map_err(internal)?;
        tracing::info!(key, version = row.version, actor = %actor.id, "setting updated");
        Ok(row)
    }

    // ===== Ticket Operations =====

    /// Open a new ticket
    pub async fn create_ticket(&self, actor: &Actor, input: NewTicket) -> Result<Ticket, HelpdeskError> {
        access::ensure(access::can_create(actor), DeniedAction::Create)?;
        let (category_id, level_id) = validation::validate_new_ticket(&input)?;

        let category = self
            .repos
            .categories
            .find_by_id(category_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| HelpdeskError::not_found("category", category_id))?;
        if !category.is_active {
            return Err(HelpdeskError::validation(format!(
                "category {} is inactive",
                category.name
            )));
        }
        let level = self.load_active_level(level_id).await?;

        let priority = input.priority.unwrap_or(Priority::Normal);
        let now = Utc::now();
        let due_date = match input.due_date {
            Some(due) => Some(due),
            None => {
                let config = self
                    .repos
                    .sla_configs
                    .find_by_priority(priority)
                    .await
                    .map_err(internal)?;
                sla::compute_due_date(now, config.as_ref())
            }
        };

        let settings = self.effective_settings().await?;
        let (day_start, day_end) = ticket_number::day_bounds(now);
        let created_today = self
            .repos
            .tickets
            .count_created_between(day_start, day_end)
            .await
            .map_err(internal)?;
        let candidates = [
            ticket_number::sequence_number(&settings.ticket_prefix, now, created_today),
            ticket_number::fallback_number(&settings.ticket_prefix, now),
        ];

        let ticket_id = Uuid::new_v4();
        for number in candidates {
            if self
                .repos
                .tickets
                .number_exists(&number)
                .await
                .map_err(internal)?
            {
                tracing::warn!(ticket_number = %number, "ticket number collision, retrying");
                continue;
            }

            let ticket = Ticket {
                id: ticket_id,
                ticket_number: number.clone(),
                subject: input.subject.trim().to_string(),
                description: input.description.clone(),
                category_id,
                status: TicketStatus::Open,
                priority,
                level: level.clone(),
                assignee_id: None,
                created_by_id: actor.id,
                customer: input.customer.clone(),
                due_date,
                created_at: now,
                updated_at: now,
                resolved_at: None,
                closed_at: None,
                version: 1,
            };
            let mut mutation = TicketMutation::new(ticket, Some(actor.id), now);
            mutation.record(ActivityType::Created, activity::created(&number));
            let (ticket, activities) = mutation.finish();
            let attachments = materialize_attachments(
                input.attachments.clone(),
                ticket_id,
                None,
                None,
                Some(actor.id),
                now,
            );

            match self
                .repos
                .tickets
                .commit(TicketChangeSet::insert(ticket, activities).with_attachments(attachments))
                .await
            {
                Ok(stored) => {
                    tracing::info!(
                        ticket = %stored.ticket_number,
                        level = %stored.level.code,
                        priority = %stored.priority,
                        actor = %actor.id,
                        "ticket created"
                    );
                    self.notify(vec![NotificationIntent::to_customer(
                        NotificationKind::TicketCreated,
                        &stored,
                        Some(actor.id),
                    )]);
                    return Ok(stored);
                }
                Err(StoreError::DuplicateNumber(taken)) => {
                    tracing::warn!(ticket_number = %taken, "ticket number taken at insert, retrying");
                }
                Err(e) => return Err(store_failure(e)),
            }
        }

        Err(HelpdeskError::conflict(
            "could not allocate a unique ticket number",
        ))
    }

    /// Ticket with replies, notes, attachments and activity log
    pub async fn get_ticket(&self, actor: &Actor, ticket_id: Uuid) -> Result<TicketDetail, HelpdeskError> {
        let ticket = self.load_ticket(ticket_id).await?;
        access::ensure(access::can_view(actor, &ticket), DeniedAction::View)?;
        let records = self
            .repos
            .tickets
            .load_records(ticket_id)
            .await
            .map_err(internal)?;
        Ok(TicketDetail {
            ticket,
            replies: records.replies,
            notes: records.notes,
            attachments: records.attachments,
            activities: records.activities,
        })
    }

    /// Tickets visible to the actor that match the filter
    pub async fn list_tickets(
        &self,
        actor: &Actor,
        filter: &TicketFilter,
    ) -> Result<Vec<Ticket>, HelpdeskError> {
        let levels = self.repos.levels.list_all().await.map_err(internal)?;
        let scope = VisibilityScope::for_actor(actor, &levels);
        self.repos
            .tickets
            .search(filter, &scope)
            .await
            .map_err(internal)
    }

    /// Explicit status/priority/level/due-date update
    pub async fn update_ticket(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
        update: TicketUpdate,
    ) -> Result<Ticket, HelpdeskError> {
        let ticket = self.load_ticket(ticket_id).await?;
        access::ensure(access::can_mutate(actor, &ticket), DeniedAction::Mutate)?;

        let new_level = match update.level_id {
            Some(level_id) => Some(self.load_active_level(level_id).await?),
            None => None,
        };

        let expected = ticket.version;
        let old_status = ticket.status;
        let mut mutation = TicketMutation::new(ticket, Some(actor.id), Utc::now());
        if let Some(level) = new_level {
            mutation.set_level(level);
        }
        if let Some(priority) = update.priority {
            mutation.set_priority(priority);
        }
        if let Some(status) = update.status {
            mutation.set_status(status, StatusReason::Explicit);
        }
        let due_date_changed = match update.due_date {
            Some(due_date) if due_date != mutation.ticket().due_date => {
                mutation.set_due_date(due_date);
                true
            }
            _ => false,
        };
        if mutation.activities().is_empty() && !due_date_changed {
            return Ok(mutation.ticket().clone());
        }

        let (ticket, activities) = mutation.finish();
        let stored = self
            .commit(TicketChangeSet::update(ticket, expected, activities))
            .await?;
        tracing::debug!(ticket = %stored.ticket_number, actor = %actor.id, "ticket updated");

        if stored.status != old_status {
            self.notify(vec![NotificationIntent::to_customer(
                NotificationKind::StatusChanged,
                &stored,
                Some(actor.id),
            )]);
        }
        Ok(stored)
    }

    /// Set or clear the assignee
    pub async fn assign_ticket(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
        new_assignee_id: Option<Uuid>,
        note: Option<String>,
    ) -> Result<Ticket, HelpdeskError> {
        let ticket = self.load_ticket(ticket_id).await?;
        access::ensure(
            access::can_assign_ticket(actor, &ticket, new_assignee_id),
            DeniedAction::Assign,
        )?;

        let old_assignee_id = ticket.assignee_id;
        if old_assignee_id == new_assignee_id {
            return Ok(ticket);
        }

        let new_assignee = match new_assignee_id {
            Some(id) => Some(
                self.resolve_actor(id)
                    .await
                    .map_err(|_| HelpdeskError::not_found("assignee", id))?,
            ),
            None => None,
        };
        let old_name = match old_assignee_id {
            Some(id) => Some(self.actor_name(id).await),
            None => None,
        };

        let expected = ticket.version;
        let mut mutation = TicketMutation::new(ticket, Some(actor.id), Utc::now());
        mutation.assign(
            new_assignee.as_ref().map(|a| (a.id, a.name.as_str())),
            old_name.as_deref(),
            note.as_deref(),
        );
        let (ticket, activities) = mutation.finish();
        let stored = self
            .commit(TicketChangeSet::update(ticket, expected, activities))
            .await?;
        tracing::info!(
            ticket = %stored.ticket_number,
            from = ?old_assignee_id,
            to = ?new_assignee_id,
            actor = %actor.id,
            "ticket assignment changed"
        );

        let mut intents = Vec::new();
        if let Some(new_id) = new_assignee_id {
            if old_assignee_id.is_none() {
                intents.push(NotificationIntent::to_customer(
                    NotificationKind::Assigned,
                    &stored,
                    Some(actor.id),
                ));
            }
            intents.push(NotificationIntent::to_agent(
                NotificationKind::Assigned,
                &stored,
                new_id,
                Some(actor.id),
            ));
        }
        if let Some(old_id) = old_assignee_id {
            intents.push(NotificationIntent::to_agent(
                NotificationKind::Unassigned,
                &stored,
                old_id,
                Some(actor.id),
            ));
        }
        self.notify(intents);
        Ok(stored)
    }

    /// Move the ticket to the next support level and release its assignee
    pub async fn escalate_ticket(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
        reason: Option<String>,
    ) -> Result<Ticket, HelpdeskError> {
        let ticket = self.load_ticket(ticket_id).await?;
        access::ensure(access::can_escalate(actor, &ticket), DeniedAction::Escalate)?;

        let levels = self.repos.levels.list_all().await.map_err(internal)?;
        let next = escalation::next_level(&levels, ticket.level.sort_order)
            .cloned()
            .ok_or_else(|| HelpdeskError::TerminalState {
                level: ticket.level.code.clone(),
            })?;

        let old_assignee_id = ticket.assignee_id;
        let expected = ticket.version;
        let mut mutation = TicketMutation::new(ticket, Some(actor.id), Utc::now());
        mutation.escalate(next, reason.as_deref());
        let (ticket, activities) = mutation.finish();
        let stored = self
            .commit(TicketChangeSet::update(ticket, expected, activities))
            .await?;
        tracing::info!(
            ticket = %stored.ticket_number,
            level = %stored.level.code,
            actor = %actor.id,
            "ticket escalated"
        );

        if let Some(old_id) = old_assignee_id {
            self.notify(vec![NotificationIntent::to_agent(
                NotificationKind::Unassigned,
                &stored,
                old_id,
                Some(actor.id),
            )]);
        }
        Ok(stored)
    }

    /// Agent reply; claims unassigned tickets for non-admin actors
    pub async fn add_reply(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
        message: String,
        attachments: Vec<AttachmentRef>,
    ) -> Result<TicketReply, HelpdeskError> {
        validation::validate_message(&message)?;
        validation::validate_attachments(&attachments)?;
        let ticket = self.load_ticket(ticket_id).await?;
        access::ensure(access::can_reply(actor, &ticket), DeniedAction::Mutate)?;

        let now = Utc::now();
        let claims = ticket.assignee_id.is_none() && !actor.is_admin();
        let expected = ticket.version;
        let mut mutation = TicketMutation::new(ticket, Some(actor.id), now);
        if claims {
            mutation.claim_via_reply(actor.id, &actor.name);
        }
        mutation.apply_reply(false);
        mutation.record(ActivityType::Reply, activity::reply_added(&actor.name));
        let (ticket, activities) = mutation.finish();

        let reply_id = Uuid::new_v4();
        let reply = TicketReply {
            id: reply_id,
            ticket_id,
            author_id: Some(actor.id),
            from_customer: false,
            message,
            attachments: materialize_attachments(
                attachments,
                ticket_id,
                Some(reply_id),
                None,
                Some(actor.id),
                now,
            ),
            created_at: now,
        };
        let stored = self
            .commit(TicketChangeSet::update(ticket, expected, activities).with_reply(reply.clone()))
            .await?;
        tracing::debug!(
            ticket = %stored.ticket_number,
            actor = %actor.id,
            claimed = claims,
            "reply added"
        );

        self.notify(vec![NotificationIntent::to_customer(
            NotificationKind::NewReply,
            &stored,
            Some(actor.id),
        )]);
        Ok(reply)
    }

    /// Agent-only note
    pub async fn add_note(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
        content: String,
        attachments: Vec<AttachmentRef>,
    ) -> Result<TicketNote, HelpdeskError> {
        validation::validate_message(&content)?;
        validation::validate_attachments(&attachments)?;
        let ticket = self.load_ticket(ticket_id).await?;
        access::ensure(access::can_mutate(actor, &ticket), DeniedAction::Mutate)?;

        let now = Utc::now();
        let expected = ticket.version;
        let mut mutation = TicketMutation::new(ticket, Some(actor.id), now);
        mutation.record(ActivityType::Note, activity::note_added(&actor.name));
        let (ticket, activities) = mutation.finish();

        let note_id = Uuid::new_v4();
        let note = TicketNote {
            id: note_id,
            ticket_id,
            author_id: actor.id,
            content,
            attachments: materialize_attachments(
                attachments,
                ticket_id,
                None,
                Some(note_id),
                Some(actor.id),
                now,
            ),
            created_at: now,
        };
        self.commit(TicketChangeSet::update(ticket, expected, activities).with_note(note.clone()))
            .await?;
        Ok(note)
    }

    /// Attach files directly to the ticket
    pub async fn attach_files(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
        refs: Vec<AttachmentRef>,
    ) -> Result<Vec<Attachment>, HelpdeskError> {
        if refs.is_empty() {
            return Err(HelpdeskError::validation("at least one attachment is required"));
        }
        validation::validate_attachments(&refs)?;
        let ticket = self.load_ticket(ticket_id).await?;
        access::ensure(access::can_mutate(actor, &ticket), DeniedAction::Mutate)?;

        let now = Utc::now();
        let expected = ticket.version;
        let attachments =
            materialize_attachments(refs, ticket_id, None, None, Some(actor.id), now);
        let mut mutation = TicketMutation::new(ticket, Some(actor.id), now);
        mutation.record(
            ActivityType::AttachmentAdded,
            activity::attachments_added(attachments.len()),
        );
        let (ticket, activities) = mutation.finish();
        self.commit(
            TicketChangeSet::update(ticket, expected, activities)
                .with_attachments(attachments.clone()),
        )
        .await?;
        Ok(attachments)
    }

    /// SLA progress at `now`; read-only
    pub async fn sla_status(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<SlaSnapshot, HelpdeskError> {
        let ticket = self.load_ticket(ticket_id).await?;
        access::ensure(access::can_view(actor, &ticket), DeniedAction::View)?;
        let settings = self.effective_settings().await?;
        Ok(sla::snapshot(&ticket, now, settings.sla_fallback_hours))
    }

    /// Close tickets that stayed resolved for the configured number of days
    pub async fn close_stale_resolved(
        &self,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<usize, HelpdeskError> {
        access::ensure_admin(actor)?;
        let settings = self.effective_settings().await?;
        let cutoff = Duration::try_days(settings.auto_close_days)
            .and_then(|age| now.checked_sub_signed(age))
            .ok_or_else(|| {
                HelpdeskError::validation(format!(
                    "auto_close_days {} is out of range",
                    settings.auto_close_days
                ))
            })?;
        let stale = self
            .repos
            .tickets
            .find_resolved_before(cutoff)
            .await
            .map_err(internal)?;

        let mut closed = 0;
        for ticket in stale {
            let expected = ticket.version;
            let mut mutation = TicketMutation::new(ticket, None, now);
            if !mutation.set_status(TicketStatus::Closed, StatusReason::AutoClose) {
                continue;
            }
            let (ticket, activities) = mutation.finish();
            match self
                .repos
                .tickets
                .commit(TicketChangeSet::update(ticket, expected, activities))
                .await
            {
                Ok(stored) => {
                    closed += 1;
                    self.notify(vec![NotificationIntent::to_customer(
                        NotificationKind::StatusChanged,
                        &stored,
                        None,
                    )]);
                }
                Err(StoreError::StaleWrite { ticket_id, .. }) => {
                    tracing::warn!(%ticket_id, "ticket changed during auto-close, skipped");
                }
                Err(e) => return Err(store_failure(e)),
            }
        }
        tracing::info!(closed, cutoff = %cutoff, "auto-close finished");
        Ok(closed)
    }

    // ===== Public lookup =====

    /// Restricted projection for an unauthenticated customer
    pub async fn public_lookup(
        &self,
        ticket_number: &str,
        customer_email: &str,
    ) -> Result<PublicTicketView, HelpdeskError> {
        let ticket = self.find_public_ticket(ticket_number, customer_email).await?;
        let records = self
            .repos
            .tickets
            .load_records(ticket.id)
            .await
            .map_err(internal)?;

        Ok(PublicTicketView {
            ticket_number: ticket.ticket_number,
            subject: ticket.subject,
            description: ticket.description,
            status: ticket.status,
            priority: ticket.priority,
            level_code: ticket.level.code,
            customer_name: ticket.customer.name,
            due_date: ticket.due_date,
            created_at: ticket.created_at,
            resolved_at: ticket.resolved_at,
            closed_at: ticket.closed_at,
            replies: records.replies,
            activities: records
                .activities
                .into_iter()
                .filter(|a| a.activity_type.is_public())
                .collect(),
        })
    }

    /// Customer reply through the public lookup path
    pub async fn add_customer_reply(
        &self,
        ticket_number: &str,
        customer_email: &str,
        message: String,
        attachments: Vec<AttachmentRef>,
    ) -> Result<TicketReply, HelpdeskError> {
        validation::validate_message(&message)?;
        validation::validate_attachments(&attachments)?;
        let ticket = self.find_public_ticket(ticket_number, customer_email).await?;

        let now = Utc::now();
        let ticket_id = ticket.id;
        let customer_name = ticket.customer.name.clone();
        let expected = ticket.version;
        let mut mutation = TicketMutation::new(ticket, None, now);
        mutation.apply_reply(true);
        mutation.record(
            ActivityType::CustomerReply,
            activity::customer_replied(&customer_name),
        );
        let (ticket, activities) = mutation.finish();

        let reply_id = Uuid::new_v4();
        let reply = TicketReply {
            id: reply_id,
            ticket_id,
            author_id: None,
            from_customer: true,
            message,
            attachments: materialize_attachments(
                attachments,
                ticket_id,
                Some(reply_id),
                None,
                None,
                now,
            ),
            created_at: now,
        };
        let stored = self
            .commit(TicketChangeSet::update(ticket, expected, activities).with_reply(reply.clone()))
            .await?;
        tracing::debug!(ticket = %stored.ticket_number, status = %stored.status, "customer replied");

        if let Some(assignee_id) = stored.assignee_id {
            self.notify(vec![NotificationIntent::to_agent(
                NotificationKind::CustomerReply,
                &stored,
                assignee_id,
                None,
            )]);
        }
        Ok(reply)
    }

    // ===== Support Levels =====

    pub async fn list_support_levels(&self) -> Result<Vec<SupportLevel>, HelpdeskError> {
        self.repos.levels.list_all().await.map_err(internal)
    }

    /// Reject a sort order already used by another active level
    async fn ensure_sort_order_free(
        &self,
        sort_order: i32,
        exclude: Option<Uuid>,
    ) -> Result<(), HelpdeskError> {
        let levels = self.repos.levels.list_all().await.map_err(internal)?;
        let taken = levels
            .iter()
            .any(|l| l.is_active && l.sort_order == sort_order && Some(l.id) != exclude);
        if taken {
            return Err(HelpdeskError::conflict(format!(
                "sort order {} is already used by an active level",
                sort_order
            )));
        }
        Ok(())
    }

    pub async fn create_support_level(
        &self,
        actor: &Actor,
        input: NewSupportLevel,
    ) -> Result<SupportLevel, HelpdeskError> {
        access::ensure_admin(actor)?;
        validation::validate_new_level(&input)?;

        if self
            .repos
            .levels
            .find_by_code(&input.code)
            .await
            .map_err(internal)?
            .is_some()
        {
            return Err(HelpdeskError::conflict(format!(
                "support level code already exists: {}",
                input.code
            )));
        }
        self.ensure_sort_order_free(input.sort_order, None).await?;

        let now = Utc::now();
        let level = SupportLevel {
            id: Uuid::new_v4(),
            code: input.code,
            name: input.name.trim().to_string(),
            sort_order: input.sort_order,
            is_active: true,
            capabilities: input.capabilities,
            created_at: now,
            updated_at: now,
        };
        let created = self.repos.levels.create(&level).await.map_err(internal)?;
        tracing::info!(code = %created.code, sort_order = created.sort_order, "support level created");
        Ok(created)
    }

    pub async fn update_support_level(
        &self,
        actor: &Actor,
        level_id: Uuid,
        update: SupportLevelUpdate,
    ) -> Result<SupportLevel, HelpdeskError> {
        access::ensure_admin(actor)?;
        let mut level = self.load_level(level_id).await?;

        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(HelpdeskError::validation("name is required"));
            }
            level.name = name.trim().to_string();
        }
        if let Some(sort_order) = update.sort_order {
            if sort_order != level.sort_order && level.is_active {
                self.ensure_sort_order_free(sort_order, Some(level.id)).await?;
            }
            level.sort_order = sort_order;
        }
        if let Some(capabilities) = update.capabilities {
            level.capabilities = capabilities;
        }
        level.updated_at = Utc::now();

        self.repos.levels.update(&level).await.map_err(internal)
    }

    /// Soft-deactivate a level that no active actor references
    pub async fn deactivate_support_level(
        &self,
        actor: &Actor,
        level_id: Uuid,
    ) -> Result<SupportLevel, HelpdeskError> {
        access::ensure_admin(actor)?;
        let mut level = self.load_level(level_id).await?;
        if !level.is_active {
            return Ok(level);
        }

        let in_use = self
            .repos
            .actors
            .count_active_by_level(level_id)
            .await
            .map_err(internal)?;
        if in_use > 0 {
            return Err(HelpdeskError::conflict(format!(
                "support level {} is still assigned to {} active user(s)",
                level.code, in_use
            )));
        }

        let levels = self.repos.levels.list_all().await.map_err(internal)?;
        let remaining: Vec<SupportLevel> = levels.into_iter().filter(|l| l.id != level_id).collect();
        if escalation::entry_level(&remaining).is_none() {
            return Err(HelpdeskError::conflict(
                "cannot deactivate the last active support level",
            ));
        }

        level.is_active = false;
        level.updated_at = Utc::now();
        let updated = self.repos.levels.update(&level).await.map_err(internal)?;
        tracing::info!(code = %updated.code, "support level deactivated");
        Ok(updated)
    }

    // ===== SLA Configs =====

    pub async fn list_sla_configs(&self) -> Result<Vec<SlaConfig>, HelpdeskError> {
        self.repos.sla_configs.list_all().await.map_err(internal)
    }

    pub async fn upsert_sla_config(
        &self,
        actor: &Actor,
        priority: Priority,
        duration_hrs: i32,
        is_active: bool,
    ) -> Result<SlaConfig, HelpdeskError> {
        access::ensure_admin(actor)?;
        validation::validate_sla_duration(duration_hrs)?;

        let now = Utc::now();
        let existing = self
            .repos
            .sla_configs
            .find_by_priority(priority)
            .await
            .map_err(internal)?;
        let config = SlaConfig {
            id: existing.as_ref().map_or_else(Uuid::new_v4, |c| c.id),
            priority,
            duration_hrs,
            is_active,
            created_at: existing.as_ref().map_or(now, |c| c.created_at),
            updated_at: now,
        };
        self.repos.sla_configs.upsert(&config).await.map_err(internal)
    }

    // ===== Categories =====

    pub async fn list_categories(&self) -> Result<Vec<Category>, HelpdeskError> {
        self.repos.categories.list_all().await.map_err(internal)
    }

    pub async fn create_category(
        &self,
        actor: &Actor,
        name: String,
        description: Option<String>,
    ) -> Result<Category, HelpdeskError> {
        access::ensure_admin(actor)?;
        if name.trim().is_empty() {
            return Err(HelpdeskError::validation("name is required"));
        }
        let category = Category {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            description,
            is_active: true,
            created_at: Utc::now(),
        };
        self.repos.categories.create(&category).await.map_err(internal)
    }
}
