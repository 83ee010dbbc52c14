//! Storage layer - database entities and repositories

pub mod entity;
pub mod mapper;
pub mod migrations;
pub mod repositories;

use crate::domain::Repositories;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Wire every SeaORM repository onto one connection
pub fn repositories(conn: Arc<DatabaseConnection>) -> Repositories {
    use repositories::*;

    Repositories {
        levels: Arc::new(SeaOrmSupportLevelRepository::new(conn.clone())),
        sla_configs: Arc::new(SeaOrmSlaConfigRepository::new(conn.clone())),
        categories: Arc::new(SeaOrmCategoryRepository::new(conn.clone())),
        actors: Arc::new(SeaOrmActorRepository::new(conn.clone())),
        tickets: Arc::new(SeaOrmTicketRepository::new(conn.clone())),
        settings: Arc::new(SeaOrmSettingsRepository::new(conn)),
    }
}
