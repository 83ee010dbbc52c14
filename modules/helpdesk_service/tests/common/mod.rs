//! Common test utilities: in-memory repositories and a seeded helpdesk

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use helpdesk_service::config::Config;
use helpdesk_service::contract::*;
use helpdesk_service::domain::access::VisibilityScope;
use helpdesk_service::domain::{
    ActorRepository, CategoryRepository, NotificationIntent, NotificationKind,
    NotificationPublisher, Recipient, Repositories, Service, SettingsRepository,
    SlaConfigRepository, StoreError, SupportLevelRepository, TicketChangeSet, TicketRecords,
    TicketRepository,
};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}

// ===== Mock repositories =====

#[derive(Default)]
pub struct MockLevelRepo {
    data: RwLock<HashMap<Uuid, SupportLevel>>,
}

#[async_trait]
impl SupportLevelRepository for MockLevelRepo {
    async fn create(&self, level: &SupportLevel) -> anyhow::Result<SupportLevel> {
        self.data.write().insert(level.id, level.clone());
        Ok(level.clone())
    }

    async fn update(&self, level: &SupportLevel) -> anyhow::Result<SupportLevel> {
        let mut data = self.data.write();
        if !data.contains_key(&level.id) {
            anyhow::bail!("support level {} not found", level.id);
        }
        data.insert(level.id, level.clone());
        Ok(level.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<SupportLevel>> {
        Ok(self.data.read().get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> anyhow::Result<Option<SupportLevel>> {
        Ok(self.data.read().values().find(|l| l.code == code).cloned())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<SupportLevel>> {
        let mut levels: Vec<SupportLevel> = self.data.read().values().cloned().collect();
        levels.sort_by_key(|l| l.sort_order);
        Ok(levels)
    }
}

#[derive(Default)]
pub struct MockSlaConfigRepo {
    data: RwLock<HashMap<Priority, SlaConfig>>,
}

#[async_trait]
impl SlaConfigRepository for MockSlaConfigRepo {
    async fn upsert(&self, config: &SlaConfig) -> anyhow::Result<SlaConfig> {
        self.data.write().insert(config.priority, config.clone());
        Ok(config.clone())
    }

    async fn find_by_priority(&self, priority: Priority) -> anyhow::Result<Option<SlaConfig>> {
        Ok(self.data.read().get(&priority).cloned())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<SlaConfig>> {
        Ok(self.data.read().values().cloned().collect())
    }
}

#[derive(Default)]
pub struct MockCategoryRepo {
    data: RwLock<HashMap<Uuid, Category>>,
}

impl MockCategoryRepo {
    pub fn insert(&self, category: Category) {
        self.data.write().insert(category.id, category);
    }
}

#[async_trait]
impl CategoryRepository for MockCategoryRepo {
    async fn create(&self, category: &Category) -> anyhow::Result<Category> {
        self.insert(category.clone());
        Ok(category.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Category>> {
        Ok(self.data.read().get(&id).cloned())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Category>> {
        Ok(self.data.read().values().cloned().collect())
    }
}

#[derive(Default)]
pub struct MockActorRepo {
    data: RwLock<HashMap<Uuid, Actor>>,
}

impl MockActorRepo {
    pub fn insert(&self, actor: Actor) {
        self.data.write().insert(actor.id, actor);
    }
}

#[async_trait]
impl ActorRepository for MockActorRepo {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Actor>> {
        Ok(self.data.read().get(&id).cloned())
    }

    async fn count_active_by_level(&self, level_id: Uuid) -> anyhow::Result<u64> {
        Ok(self
            .data
            .read()
            .values()
            .filter(|a| a.is_active && a.level.id == level_id)
            .count() as u64)
    }
}

#[derive(Default)]
pub struct MockSettingsRepo {
    data: RwLock<HashMap<String, GlobalSetting>>,
}

#[async_trait]
impl SettingsRepository for MockSettingsRepo {
    async fn list_all(&self) -> anyhow::Result<Vec<GlobalSetting>> {
        let mut rows: Vec<GlobalSetting> = self.data.read().values().cloned().collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(rows)
    }

    async fn upsert(
        &self,
        key: &str,
        value: &serde_json::Value,
        updated_by: Option<Uuid>,
    ) -> anyhow::Result<GlobalSetting> {
        let mut data = self.data.write();
        let version = data.get(key).map_or(1, |row| row.version + 1);
        let row = GlobalSetting {
            key: key.to_string(),
            value: value.clone(),
            version,
            updated_by,
            updated_at: Utc::now(),
        };
        data.insert(key.to_string(), row.clone());
        Ok(row)
    }
}

#[derive(Default)]
struct TicketStore {
    tickets: HashMap<Uuid, Ticket>,
    replies: Vec<TicketReply>,
    notes: Vec<TicketNote>,
    attachments: Vec<Attachment>,
    activities: Vec<TicketActivity>,
    /// Numbers reported as taken by `number_exists`
    reserved: HashSet<String>,
    /// Numbers that pass `number_exists` but fail on insert
    racing: HashSet<String>,
    /// Next versioned update is rejected as if another writer won
    lose_next_update: bool,
}

/// Ticket store honouring version checks and number uniqueness
#[derive(Default)]
pub struct MockTicketRepo {
    store: RwLock<TicketStore>,
}

impl MockTicketRepo {
    pub fn get(&self, id: Uuid) -> Option<Ticket> {
        self.store.read().tickets.get(&id).cloned()
    }

    pub fn count(&self) -> usize {
        self.store.read().tickets.len()
    }

    pub fn reserve_number(&self, number: &str) {
        self.store.write().reserved.insert(number.to_string());
    }

    pub fn race_number(&self, number: &str) {
        self.store.write().racing.insert(number.to_string());
    }

    /// Simulate a concurrent writer committing between load and commit
    pub fn lose_next_update(&self) {
        self.store.write().lose_next_update = true;
    }

    pub fn set_resolved_at(&self, id: Uuid, resolved_at: DateTime<Utc>) {
        if let Some(ticket) = self.store.write().tickets.get_mut(&id) {
            ticket.resolved_at = Some(resolved_at);
        }
    }

    pub fn activities_of(&self, id: Uuid) -> Vec<TicketActivity> {
        self.store
            .read()
            .activities
            .iter()
            .filter(|a| a.ticket_id == id)
            .cloned()
            .collect()
    }

    pub fn print_state(&self, context: &str) {
        let store = self.store.read();
        println!("\n========== TicketRepository State: {} ==========", context);
        println!("Total tickets: {}", store.tickets.len());
        for ticket in store.tickets.values() {
            println!(
                "  {} [{}] level={} assignee={:?} v{}",
                ticket.ticket_number, ticket.status, ticket.level.code, ticket.assignee_id, ticket.version
            );
        }
        println!("Activities: {}", store.activities.len());
        println!("====================================================\n");
    }
}

#[async_trait]
impl TicketRepository for MockTicketRepo {
    async fn commit(&self, change: TicketChangeSet) -> Result<Ticket, StoreError> {
        let mut store = self.store.write();
        let ticket = change.ticket;
        match change.expected_version {
            None => {
                let taken = store.reserved.contains(&ticket.ticket_number)
                    || store.racing.contains(&ticket.ticket_number)
                    || store
                        .tickets
                        .values()
                        .any(|t| t.ticket_number == ticket.ticket_number);
                if taken {
                    return Err(StoreError::DuplicateNumber(ticket.ticket_number));
                }
            }
            Some(expected) => {
                if std::mem::take(&mut store.lose_next_update) {
                    return Err(StoreError::StaleWrite {
                        ticket_id: ticket.id,
                        expected,
                    });
                }
                let current = store
                    .tickets
                    .get(&ticket.id)
                    .map(|t| t.version)
                    .ok_or_else(|| StoreError::Other(anyhow::anyhow!("ticket {} not found", ticket.id)))?;
                if current != expected {
                    return Err(StoreError::StaleWrite {
                        ticket_id: ticket.id,
                        expected,
                    });
                }
            }
        }

        store.tickets.insert(ticket.id, ticket.clone());
        if let Some(reply) = change.reply {
            store.replies.push(reply);
        }
        if let Some(note) = change.note {
            store.notes.push(note);
        }
        store.attachments.extend(change.attachments);
        store.activities.extend(change.activities);
        Ok(ticket)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Ticket>> {
        Ok(self.get(id))
    }

    async fn find_by_number(&self, ticket_number: &str) -> anyhow::Result<Option<Ticket>> {
        Ok(self
            .store
            .read()
            .tickets
            .values()
            .find(|t| t.ticket_number == ticket_number)
            .cloned())
    }

    async fn number_exists(&self, ticket_number: &str) -> anyhow::Result<bool> {
        let store = self.store.read();
        Ok(store.reserved.contains(ticket_number)
            || store.tickets.values().any(|t| t.ticket_number == ticket_number))
    }

    async fn count_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<u64> {
        Ok(self
            .store
            .read()
            .tickets
            .values()
            .filter(|t| t.created_at >= start && t.created_at < end)
            .count() as u64)
    }

    async fn search(
        &self,
        filter: &TicketFilter,
        scope: &VisibilityScope,
    ) -> anyhow::Result<Vec<Ticket>> {
        let needle = filter.search.as_ref().map(|s| s.to_lowercase());
        let mut tickets: Vec<Ticket> = self
            .store
            .read()
            .tickets
            .values()
            .filter(|t| scope.admits(t))
            .filter(|t| filter.status.map_or(true, |s| t.status == s))
            .filter(|t| filter.priority.map_or(true, |p| t.priority == p))
            .filter(|t| filter.level_id.map_or(true, |id| t.level.id == id))
            .filter(|t| filter.assignee_id.map_or(true, |id| t.assignee_id == Some(id)))
            .filter(|t| filter.category_id.map_or(true, |id| t.category_id == id))
            .filter(|t| {
                needle.as_ref().map_or(true, |n| {
                    t.subject.to_lowercase().contains(n)
                        || t.ticket_number.to_lowercase().contains(n)
                        || t.customer.email.to_lowercase().contains(n)
                        || t.customer.name.to_lowercase().contains(n)
                })
            })
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }

    async fn find_resolved_before(&self, cutoff: DateTime<Utc>) -> anyhow::Result<Vec<Ticket>> {
        Ok(self
            .store
            .read()
            .tickets
            .values()
            .filter(|t| t.status == TicketStatus::Resolved)
            .filter(|t| t.resolved_at.is_some_and(|at| at <= cutoff))
            .cloned()
            .collect())
    }

    async fn load_records(&self, ticket_id: Uuid) -> anyhow::Result<TicketRecords> {
        let store = self.store.read();
        Ok(TicketRecords {
            replies: store
                .replies
                .iter()
                .filter(|r| r.ticket_id == ticket_id)
                .cloned()
                .collect(),
            notes: store
                .notes
                .iter()
                .filter(|n| n.ticket_id == ticket_id)
                .cloned()
                .collect(),
            attachments: store
                .attachments
                .iter()
                .filter(|a| a.ticket_id == ticket_id)
                .cloned()
                .collect(),
            activities: store
                .activities
                .iter()
                .filter(|a| a.ticket_id == ticket_id)
                .cloned()
                .collect(),
        })
    }
}

/// Publisher that keeps every intent for assertions
#[derive(Default)]
pub struct RecordingPublisher {
    intents: RwLock<Vec<NotificationIntent>>,
}

impl RecordingPublisher {
    pub fn all(&self) -> Vec<NotificationIntent> {
        self.intents.read().clone()
    }

    pub fn clear(&self) {
        self.intents.write().clear();
    }

    pub fn of_kind(&self, kind: NotificationKind) -> Vec<NotificationIntent> {
        self.intents
            .read()
            .iter()
            .filter(|i| i.kind == kind)
            .cloned()
            .collect()
    }

    pub fn to_agent(&self, agent_id: Uuid) -> Vec<NotificationIntent> {
        self.intents
            .read()
            .iter()
            .filter(|i| i.recipient == Recipient::Agent { id: agent_id })
            .cloned()
            .collect()
    }
}

impl NotificationPublisher for RecordingPublisher {
    fn publish(&self, intent: NotificationIntent) -> anyhow::Result<()> {
        self.intents.write().push(intent);
        Ok(())
    }
}

// ===== Seeded helpdesk =====

pub fn capabilities(team: bool, all: bool) -> LevelCapabilities {
    LevelCapabilities {
        can_view_own_tickets: true,
        can_view_team_tickets: team,
        can_view_all_tickets: all,
        can_create_ticket: true,
        can_assign_ticket: team,
        can_escalate_ticket: !all,
        can_resolve_ticket: true,
        can_close_ticket: team,
    }
}

pub fn level(code: &str, sort_order: i32, caps: LevelCapabilities) -> SupportLevel {
    let now = Utc::now();
    SupportLevel {
        id: Uuid::new_v4(),
        code: code.to_string(),
        name: format!("Level {}", sort_order),
        sort_order,
        is_active: true,
        capabilities: caps,
        created_at: now,
        updated_at: now,
    }
}

fn actor(name: &str, role: Role, level: &SupportLevel) -> Actor {
    Actor {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@helpdesk.test", name.to_lowercase()),
        role,
        level: level.clone(),
        is_active: true,
    }
}

/// Service over in-memory repositories with L1-L3, a handful of actors, a
/// category and SLA targets for high (8h) and normal (24h) priority.
pub struct TestHelpdesk {
    pub service: Arc<Service>,
    pub levels: Arc<MockLevelRepo>,
    pub sla_configs: Arc<MockSlaConfigRepo>,
    pub categories: Arc<MockCategoryRepo>,
    pub actors: Arc<MockActorRepo>,
    pub tickets: Arc<MockTicketRepo>,
    pub settings: Arc<MockSettingsRepo>,
    pub notifications: Arc<RecordingPublisher>,
    pub l1: SupportLevel,
    pub l2: SupportLevel,
    pub l3: SupportLevel,
    pub admin: Actor,
    /// L1 agent
    pub alice: Actor,
    /// Second L1 agent
    pub bob: Actor,
    /// L2 agent (team visibility, may assign)
    pub carol: Actor,
    /// L3 agent (sees everything)
    pub dave: Actor,
    pub category: Category,
}

impl TestHelpdesk {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let levels = Arc::new(MockLevelRepo::default());
        let sla_configs = Arc::new(MockSlaConfigRepo::default());
        let categories = Arc::new(MockCategoryRepo::default());
        let actors = Arc::new(MockActorRepo::default());
        let tickets = Arc::new(MockTicketRepo::default());
        let settings = Arc::new(MockSettingsRepo::default());
        let notifications = Arc::new(RecordingPublisher::default());

        let l1 = level("L1", 1, capabilities(false, false));
        let l2 = level("L2", 2, capabilities(true, false));
        let l3 = level("L3", 3, capabilities(true, true));
        for l in [&l1, &l2, &l3] {
            levels.data.write().insert(l.id, l.clone());
        }

        let admin = actor("Admin", Role::Admin, &l3);
        let alice = actor("Alice", Role::Agent, &l1);
        let bob = actor("Bob", Role::Agent, &l1);
        let carol = actor("Carol", Role::Agent, &l2);
        let dave = actor("Dave", Role::Agent, &l3);
        for a in [&admin, &alice, &bob, &carol, &dave] {
            actors.insert(a.clone());
        }

        let now = Utc::now();
        for (priority, hours) in [(Priority::High, 8), (Priority::Normal, 24)] {
            sla_configs.data.write().insert(
                priority,
                SlaConfig {
                    id: Uuid::new_v4(),
                    priority,
                    duration_hrs: hours,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                },
            );
        }

        let category = Category {
            id: Uuid::new_v4(),
            name: "Billing".to_string(),
            description: None,
            is_active: true,
            created_at: now,
        };
        categories.insert(category.clone());

        let repos = Repositories {
            levels: levels.clone(),
            sla_configs: sla_configs.clone(),
            categories: categories.clone(),
            actors: actors.clone(),
            tickets: tickets.clone(),
            settings: settings.clone(),
        };
        let service = Arc::new(Service::new(repos, notifications.clone(), config));

        Self {
            service,
            levels,
            sla_configs,
            categories,
            actors,
            tickets,
            settings,
            notifications,
            l1,
            l2,
            l3,
            admin,
            alice,
            bob,
            carol,
            dave,
            category,
        }
    }

    pub fn new_ticket(&self, subject: &str, priority: Option<Priority>) -> NewTicket {
        NewTicket {
            subject: subject.to_string(),
            description: format!("{} - details", subject),
            category_id: Some(self.category.id),
            priority,
            level_id: Some(self.l1.id),
            customer: Customer {
                name: "Wati Ngata".to_string(),
                email: "wati@customer.test".to_string(),
                phone: None,
                company: Some("Ngata Freight".to_string()),
            },
            due_date: None,
            attachments: Vec::new(),
        }
    }

    /// Ticket at L1 created by the admin, unassigned and open
    pub async fn open_ticket(&self, subject: &str) -> Ticket {
        match self
            .service
            .create_ticket(&self.admin, self.new_ticket(subject, None))
            .await
        {
            Ok(ticket) => ticket,
            Err(e) => panic!("failed to create ticket '{}': {}", subject, e),
        }
    }

    pub fn add_actor(&self, name: &str, role: Role, level: &SupportLevel) -> Actor {
        let a = actor(name, role, level);
        self.actors.insert(a.clone());
        a
    }
}

pub fn attachment(name: &str) -> AttachmentRef {
    AttachmentRef {
        file_name: name.to_string(),
        file_key: format!("uploads/{}", name),
        file_url: format!("https://files.helpdesk.test/{}", name),
        file_size: 2048,
        file_type: "application/pdf".to_string(),
    }
}
