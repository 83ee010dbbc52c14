//! SeaORM repository implementations

use crate::contract::{
    Actor, Attachment, Category, GlobalSetting, Priority, SlaConfig, SupportLevel, Ticket,
    TicketActivity, TicketFilter, TicketStatus,
};
use crate::domain::access::VisibilityScope;
use crate::domain::repository::{
    ActorRepository, CategoryRepository, SettingsRepository, SlaConfigRepository, StoreError,
    SupportLevelRepository, TicketChangeSet, TicketRecords, TicketRepository,
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, SqlErr,
    TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::entity::{
    activity, actor, attachment, category, note, reply, setting, sla_config, support_level,
    ticket,
};
use super::mapper;

/// Load the given levels keyed by id
async fn levels_by_id<C: ConnectionTrait>(
    db: &C,
    ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, SupportLevel>> {
    let rows = support_level::Entity::find()
        .filter(support_level::Column::Id.is_in(ids))
        .all(db)
        .await?;
    rows.into_iter()
        .map(|row| SupportLevel::try_from(row).map(|level| (level.id, level)))
        .collect()
}

/// Attach the full level to each ticket row
async fn hydrate_tickets<C: ConnectionTrait>(db: &C, rows: Vec<ticket::Model>) -> Result<Vec<Ticket>> {
    let mut level_ids: Vec<Uuid> = rows.iter().map(|r| r.level_id).collect();
    level_ids.sort_unstable();
    level_ids.dedup();
    let levels = levels_by_id(db, level_ids).await?;

    rows.into_iter()
        .map(|row| {
            let level = levels
                .get(&row.level_id)
                .cloned()
                .ok_or_else(|| anyhow!("ticket {} references missing level {}", row.id, row.level_id))?;
            mapper::ticket_from_row(row, level)
        })
        .collect()
}

// ===== Support Level Repository =====

pub struct SeaOrmSupportLevelRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmSupportLevelRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SupportLevelRepository for SeaOrmSupportLevelRepository {
    async fn create(&self, level: &SupportLevel) -> Result<SupportLevel> {
        let active_model = support_level::ActiveModel::try_from(level)?;

        let result = support_level::Entity::insert(active_model)
            .exec_with_returning(&*self.db)
            .await?;

        result.try_into()
    }

    async fn update(&self, level: &SupportLevel) -> Result<SupportLevel> {
        let active_model = support_level::ActiveModel::try_from(level)?;

        let result = support_level::Entity::update(active_model)
            .exec(&*self.db)
            .await?;

        result.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SupportLevel>> {
        let result = support_level::Entity::find_by_id(id).one(&*self.db).await?;
        result.map(SupportLevel::try_from).transpose()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<SupportLevel>> {
        let result = support_level::Entity::find()
            .filter(support_level::Column::Code.eq(code))
            .one(&*self.db)
            .await?;
        result.map(SupportLevel::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<SupportLevel>> {
        let results = support_level::Entity::find()
            .order_by_asc(support_level::Column::SortOrder)
            .order_by_asc(support_level::Column::Code)
            .all(&*self.db)
            .await?;

        results
            .into_iter()
            .map(SupportLevel::try_from)
            .collect::<Result<Vec<_>>>()
    }
}

// ===== SLA Config Repository =====

pub struct SeaOrmSlaConfigRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmSlaConfigRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SlaConfigRepository for SeaOrmSlaConfigRepository {
    async fn upsert(&self, config: &SlaConfig) -> Result<SlaConfig> {
        let existing = sla_config::Entity::find()
            .filter(sla_config::Column::Priority.eq(config.priority.as_str()))
            .one(&*self.db)
            .await?;

        let active: sla_config::ActiveModel = config.into();
        let result = if existing.is_some() {
            sla_config::Entity::update(active).exec(&*self.db).await?
        } else {
            sla_config::Entity::insert(active)
                .exec_with_returning(&*self.db)
                .await?
        };

        result.try_into()
    }

    async fn find_by_priority(&self, priority: Priority) -> Result<Option<SlaConfig>> {
        let result = sla_config::Entity::find()
            .filter(sla_config::Column::Priority.eq(priority.as_str()))
            .one(&*self.db)
            .await?;
        result.map(SlaConfig::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<SlaConfig>> {
        let results = sla_config::Entity::find().all(&*self.db).await?;
        let mut configs = results
            .into_iter()
            .map(SlaConfig::try_from)
            .collect::<Result<Vec<_>>>()?;
        configs.sort_by_key(|c| c.priority);
        Ok(configs)
    }
}

// ===== Category Repository =====

pub struct SeaOrmCategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCategoryRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for SeaOrmCategoryRepository {
    async fn create(&self, category: &Category) -> Result<Category> {
        let active_model: category::ActiveModel = category.into();

        let result = category::Entity::insert(active_model)
            .exec_with_returning(&*self.db)
            .await?;

        Ok(result.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        let result = category::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Category>> {
        let results = category::Entity::find()
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }
}

// ===== Actor Repository =====

pub struct SeaOrmActorRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmActorRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActorRepository for SeaOrmActorRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Actor>> {
        let Some(row) = actor::Entity::find_by_id(id).one(&*self.db).await? else {
            return Ok(None);
        };
        let level = support_level::Entity::find_by_id(row.level_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| anyhow!("actor {} references missing level {}", row.id, row.level_id))?;

        mapper::actor_from_row(row, level.try_into()?).map(Some)
    }

    async fn count_active_by_level(&self, level_id: Uuid) -> Result<u64> {
        let count = actor::Entity::find()
            .filter(actor::Column::LevelId.eq(level_id))
            .filter(actor::Column::IsActive.eq(true))
            .count(&*self.db)
            .await?;

        Ok(count)
    }
}

// ===== Settings Repository =====

pub struct SeaOrmSettingsRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmSettingsRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettingsRepository for SeaOrmSettingsRepository {
    async fn list_all(&self) -> Result<Vec<GlobalSetting>> {
        let results = setting::Entity::find()
            .order_by_asc(setting::Column::Key)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn upsert(
        &self,
        key: &str,
        value: &serde_json::Value,
        updated_by: Option<Uuid>,
    ) -> Result<GlobalSetting> {
        let existing = setting::Entity::find_by_id(key.to_string())
            .one(&*self.db)
            .await?;

        let result = match existing {
            Some(row) => {
                let version = row.version;
                let mut active: setting::ActiveModel = row.into();
                active.value = Set(value.clone());
                active.version = Set(version + 1);
                active.updated_by = Set(updated_by);
                active.updated_at = Set(Utc::now());
                active.update(&*self.db).await?
            }
            None => {
                let active = setting::ActiveModel {
                    key: Set(key.to_string()),
                    value: Set(value.clone()),
                    version: Set(1),
                    updated_by: Set(updated_by),
                    updated_at: Set(Utc::now()),
                };
                setting::Entity::insert(active)
                    .exec_with_returning(&*self.db)
                    .await?
            }
        };

        Ok(result.into())
    }
}

// ===== Ticket Repository =====

pub struct SeaOrmTicketRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmTicketRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

const LIKE_ESCAPE: char = '\\';

/// Search text is matched literally; `%` and `_` lose their wildcard meaning
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// `LOWER(col) LIKE pattern`, same case rule on SQLite and Postgres
fn lower_like(column: ticket::Column, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

fn db_failure(e: DbErr) -> StoreError {
    StoreError::Other(e.into())
}

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

async fn insert_attachments<C: ConnectionTrait>(db: &C, attachments: &[Attachment]) -> Result<(), DbErr> {
    if attachments.is_empty() {
        return Ok(());
    }
    let models: Vec<attachment::ActiveModel> = attachments.iter().map(Into::into).collect();
    attachment::Entity::insert_many(models)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn insert_activities<C: ConnectionTrait>(
    db: &C,
    activities: &[TicketActivity],
) -> Result<(), DbErr> {
    if activities.is_empty() {
        return Ok(());
    }
    let models: Vec<activity::ActiveModel> = activities
        .iter()
        .enumerate()
        .map(|(position, a)| {
            let mut model: activity::ActiveModel = a.into();
            model.position = Set(position as i32);
            model
        })
        .collect();
    activity::Entity::insert_many(models)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

#[async_trait]
impl TicketRepository for SeaOrmTicketRepository {
    async fn commit(&self, change: TicketChangeSet) -> std::result::Result<Ticket, StoreError> {
        let txn = self.db.begin().await.map_err(db_failure)?;
        let ticket_model: ticket::ActiveModel = (&change.ticket).into();

        match change.expected_version {
            None => {
                if let Err(e) = ticket::Entity::insert(ticket_model)
                    .exec_without_returning(&txn)
                    .await
                {
                    if is_unique_violation(&e) {
                        return Err(StoreError::DuplicateNumber(change.ticket.ticket_number));
                    }
                    return Err(db_failure(e));
                }
            }
            Some(expected) => {
                let result = ticket::Entity::update_many()
                    .set(ticket_model)
                    .filter(ticket::Column::Id.eq(change.ticket.id))
                    .filter(ticket::Column::Version.eq(expected))
                    .exec(&txn)
                    .await
                    .map_err(db_failure)?;
                if result.rows_affected == 0 {
                    return Err(StoreError::StaleWrite {
                        ticket_id: change.ticket.id,
                        expected,
                    });
                }
            }
        }

        if let Some(new_reply) = &change.reply {
            let model: reply::ActiveModel = new_reply.into();
            reply::Entity::insert(model)
                .exec_without_returning(&txn)
                .await
                .map_err(db_failure)?;
            insert_attachments(&txn, &new_reply.attachments)
                .await
                .map_err(db_failure)?;
        }
        if let Some(new_note) = &change.note {
            let model: note::ActiveModel = new_note.into();
            note::Entity::insert(model)
                .exec_without_returning(&txn)
                .await
                .map_err(db_failure)?;
            insert_attachments(&txn, &new_note.attachments)
                .await
                .map_err(db_failure)?;
        }
        insert_attachments(&txn, &change.attachments)
            .await
            .map_err(db_failure)?;
        insert_activities(&txn, &change.activities)
            .await
            .map_err(db_failure)?;

        txn.commit().await.map_err(db_failure)?;
        tracing::debug!(
            ticket = %change.ticket.ticket_number,
            version = change.ticket.version,
            activities = change.activities.len(),
            "ticket change committed"
        );
        Ok(change.ticket)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>> {
        let Some(row) = ticket::Entity::find_by_id(id).one(&*self.db).await? else {
            return Ok(None);
        };
        Ok(hydrate_tickets(&*self.db, vec![row]).await?.pop())
    }

    async fn find_by_number(&self, ticket_number: &str) -> Result<Option<Ticket>> {
        let Some(row) = ticket::Entity::find()
            .filter(ticket::Column::TicketNumber.eq(ticket_number))
            .one(&*self.db)
            .await?
        else {
            return Ok(None);
        };
        Ok(hydrate_tickets(&*self.db, vec![row]).await?.pop())
    }

    async fn number_exists(&self, ticket_number: &str) -> Result<bool> {
        let count = ticket::Entity::find()
            .filter(ticket::Column::TicketNumber.eq(ticket_number))
            .count(&*self.db)
            .await?;

        Ok(count > 0)
    }

    async fn count_created_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<u64> {
        let count = ticket::Entity::find()
            .filter(ticket::Column::CreatedAt.gte(start))
            .filter(ticket::Column::CreatedAt.lt(end))
            .count(&*self.db)
            .await?;

        Ok(count)
    }

    async fn search(&self, filter: &TicketFilter, scope: &VisibilityScope) -> Result<Vec<Ticket>> {
        let mut query = ticket::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(ticket::Column::Status.eq(status.as_str()));
        }
        if let Some(priority) = filter.priority {
            query = query.filter(ticket::Column::Priority.eq(priority.as_str()));
        }
        if let Some(level_id) = filter.level_id {
            query = query.filter(ticket::Column::LevelId.eq(level_id));
        }
        if let Some(assignee_id) = filter.assignee_id {
            query = query.filter(ticket::Column::AssigneeId.eq(assignee_id));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(ticket::Column::CategoryId.eq(category_id));
        }
        if let Some(text) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", escape_like(&text.to_lowercase()));
            query = query.filter(
                Condition::any()
                    .add(lower_like(ticket::Column::TicketNumber, &pattern))
                    .add(lower_like(ticket::Column::Subject, &pattern))
                    .add(lower_like(ticket::Column::CustomerName, &pattern))
                    .add(lower_like(ticket::Column::CustomerEmail, &pattern)),
            );
        }
        if let VisibilityScope::Restricted {
            actor_id,
            level_ids,
        } = scope
        {
            query = query.filter(
                Condition::any()
                    .add(ticket::Column::LevelId.is_in(level_ids.clone()))
                    .add(ticket::Column::AssigneeId.eq(*actor_id))
                    .add(ticket::Column::CreatedById.eq(*actor_id)),
            );
        }

        let rows = query
            .order_by_desc(ticket::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        hydrate_tickets(&*self.db, rows).await
    }

    async fn find_resolved_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Ticket>> {
        let rows = ticket::Entity::find()
            .filter(ticket::Column::Status.eq(TicketStatus::Resolved.as_str()))
            .filter(ticket::Column::ResolvedAt.lte(cutoff))
            .order_by_asc(ticket::Column::ResolvedAt)
            .all(&*self.db)
            .await?;

        hydrate_tickets(&*self.db, rows).await
    }

    async fn load_records(&self, ticket_id: Uuid) -> Result<TicketRecords> {
        let attachment_rows = attachment::Entity::find()
            .filter(attachment::Column::TicketId.eq(ticket_id))
            .order_by_asc(attachment::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let mut by_reply: HashMap<Uuid, Vec<Attachment>> = HashMap::new();
        let mut by_note: HashMap<Uuid, Vec<Attachment>> = HashMap::new();
        let mut attachments = Vec::new();
        for row in attachment_rows {
            let item: Attachment = row.into();
            match (item.reply_id, item.note_id) {
                (Some(reply_id), _) => by_reply.entry(reply_id).or_default().push(item),
                (None, Some(note_id)) => by_note.entry(note_id).or_default().push(item),
                (None, None) => attachments.push(item),
            }
        }

        let replies = reply::Entity::find()
            .filter(reply::Column::TicketId.eq(ticket_id))
            .order_by_asc(reply::Column::CreatedAt)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|row| {
                let files = by_reply.remove(&row.id).unwrap_or_default();
                mapper::reply_from_row(row, files)
            })
            .collect();

        let notes = note::Entity::find()
            .filter(note::Column::TicketId.eq(ticket_id))
            .order_by_asc(note::Column::CreatedAt)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|row| {
                let files = by_note.remove(&row.id).unwrap_or_default();
                mapper::note_from_row(row, files)
            })
            .collect();

        let activities = activity::Entity::find()
            .filter(activity::Column::TicketId.eq(ticket_id))
            .order_by_asc(activity::Column::CreatedAt)
            .order_by_asc(activity::Column::Position)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(TicketActivity::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(TicketRecords {
            replies,
            notes,
            attachments,
            activities,
        })
    }
}
