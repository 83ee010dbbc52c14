//! Module declaration and lifecycle implementation

use crate::config::Config;
use crate::contract::HelpdeskApi;
use crate::domain::{
    ChannelNotificationPublisher, NotificationDispatcher, NotificationIntent, NotificationSink,
    Service,
};
use anyhow::Result;
use parking_lot::{Mutex, RwLock};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Helpdesk service module
///
/// Lifecycle: [`migrate`](Self::migrate), [`init`](Self::init), then
/// [`register_rest`](Self::register_rest) and [`serve`](Self::serve) for the
/// notification dispatcher.
pub struct HelpdeskServiceModule {
    config: RwLock<Config>,
    service: RwLock<Option<Arc<Service>>>,
    notifications: Mutex<Option<mpsc::Receiver<NotificationIntent>>>,
}

impl Default for HelpdeskServiceModule {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl HelpdeskServiceModule {
    pub fn new(config: Config) -> Self {
        Self {
            config: RwLock::new(config),
            service: RwLock::new(None),
            notifications: Mutex::new(None),
        }
    }

    /// Apply database migrations
    pub async fn migrate(&self, db: &DatabaseConnection) -> Result<()> {
        use crate::infra::storage::migrations::Migrator;
        use sea_orm_migration::MigratorTrait;

        Migrator::up(db, None).await?;
        tracing::info!("Helpdesk service migrations completed");
        Ok(())
    }

    /// Build repositories, the notification queue and the domain service
    pub fn init(&self, conn: Arc<DatabaseConnection>) -> Result<()> {
        let config = self.config.read().clone();
        config.validate()?;
        let repos = crate::infra::storage::repositories(conn);

        let (publisher, receiver) =
            ChannelNotificationPublisher::channel(config.notification_queue_capacity);
        *self.notifications.lock() = Some(receiver);

        let service = Arc::new(Service::new(repos, Arc::new(publisher), config));
        *self.service.write() = Some(service);

        tracing::info!("Helpdesk service initialized");
        Ok(())
    }

    fn service(&self) -> Result<Arc<Service>> {
        self.service
            .read()
            .as_ref()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))
    }

    /// In-process client
    pub fn native_client(&self) -> Result<Arc<dyn HelpdeskApi>> {
        let client = crate::api::native::NativeClient::new(self.service()?);
        Ok(Arc::new(client))
    }

    pub fn register_rest(&self, router: axum::Router) -> Result<axum::Router> {
        let service = self.service()?;
        tracing::info!("Registering helpdesk service REST routes");
        crate::api::rest::routes::register_routes(router, service)
    }

    /// Run the notification dispatcher until `cancel` fires
    pub async fn serve(
        self: Arc<Self>,
        cancel: CancellationToken,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<()> {
        let receiver = self
            .notifications
            .lock()
            .take()
            .ok_or_else(|| anyhow::anyhow!("notification dispatcher already running or module not initialized"))?;

        let delivered = NotificationDispatcher::new(receiver, sink).run(cancel).await;
        tracing::info!(delivered, "Helpdesk notification dispatcher stopped");
        Ok(())
    }
}
