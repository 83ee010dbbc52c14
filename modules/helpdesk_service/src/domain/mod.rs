//! Domain layer - business logic and services

pub mod access;
pub mod activity;
pub mod escalation;
pub mod events;
pub mod lifecycle;
pub mod repository;
pub mod service;
pub mod settings;
pub mod sla;
pub mod ticket_number;
pub mod validation;

pub use events::{
    ChannelNotificationPublisher, NoOpNotificationPublisher, NotificationDispatcher,
    NotificationIntent, NotificationKind, NotificationPublisher, NotificationSink, Recipient,
    TracingNotificationSink,
};
pub use repository::{
    ActorRepository, CategoryRepository, SettingsRepository, SlaConfigRepository, StoreError,
    SupportLevelRepository, TicketChangeSet, TicketRecords, TicketRepository,
};
pub use service::{Repositories, Service};
pub use settings::HelpdeskSettings;
