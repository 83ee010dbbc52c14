//! Database migrations for helpdesk service

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_reference_data::Migration),
            Box::new(m20250301_000002_create_tickets::Migration),
            Box::new(m20250301_000003_create_ticket_records::Migration),
            Box::new(m20250301_000004_create_settings::Migration),
            Box::new(m20250301_000005_seed_defaults::Migration),
        ]
    }
}

fn created_at<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

mod m20250301_000001_create_reference_data {
    use super::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SupportLevels::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(SupportLevels::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(SupportLevels::Code).string_len(20).not_null().unique_key())
                        .col(ColumnDef::new(SupportLevels::Name).string().not_null())
                        .col(ColumnDef::new(SupportLevels::SortOrder).integer().not_null())
                        .col(ColumnDef::new(SupportLevels::IsActive).boolean().not_null().default(true))
                        .col(ColumnDef::new(SupportLevels::Capabilities).json().not_null())
                        .col(created_at(SupportLevels::CreatedAt))
                        .col(created_at(SupportLevels::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SlaConfigs::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(SlaConfigs::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(SlaConfigs::Priority).string_len(16).not_null().unique_key())
                        .col(ColumnDef::new(SlaConfigs::DurationHrs).integer().not_null())
                        .col(ColumnDef::new(SlaConfigs::IsActive).boolean().not_null().default(true))
                        .col(created_at(SlaConfigs::CreatedAt))
                        .col(created_at(SlaConfigs::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Categories::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Categories::Name).string().not_null())
                        .col(ColumnDef::new(Categories::Description).text())
                        .col(ColumnDef::new(Categories::IsActive).boolean().not_null().default(true))
                        .col(created_at(Categories::CreatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Actors::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Actors::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Actors::Name).string().not_null())
                        .col(ColumnDef::new(Actors::Email).string().not_null().unique_key())
                        .col(ColumnDef::new(Actors::Role).string_len(16).not_null())
                        .col(ColumnDef::new(Actors::LevelId).uuid().not_null())
                        .col(ColumnDef::new(Actors::IsActive).boolean().not_null().default(true))
                        .col(created_at(Actors::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_actors_level")
                                .from(Actors::Table, Actors::LevelId)
                                .to(SupportLevels::Table, SupportLevels::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_actors_level_id")
                        .table(Actors::Table)
                        .col(Actors::LevelId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Actors::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SlaConfigs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SupportLevels::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum SupportLevels {
        Table,
        Id,
        Code,
        Name,
        SortOrder,
        IsActive,
        Capabilities,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum SlaConfigs {
        Table,
        Id,
        Priority,
        DurationHrs,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Categories {
        Table,
        Id,
        Name,
        Description,
        IsActive,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Actors {
        Table,
        Id,
        Name,
        Email,
        Role,
        LevelId,
        IsActive,
        CreatedAt,
    }
}

mod m20250301_000002_create_tickets {
    use super::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Tickets::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Tickets::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Tickets::TicketNumber).string_len(32).not_null().unique_key())
                        .col(ColumnDef::new(Tickets::Subject).string().not_null())
                        .col(ColumnDef::new(Tickets::Description).text().not_null())
                        .col(ColumnDef::new(Tickets::CategoryId).uuid().not_null())
                        .col(ColumnDef::new(Tickets::Status).string_len(16).not_null())
                        .col(ColumnDef::new(Tickets::Priority).string_len(16).not_null())
                        .col(ColumnDef::new(Tickets::LevelId).uuid().not_null())
                        .col(ColumnDef::new(Tickets::AssigneeId).uuid())
                        .col(ColumnDef::new(Tickets::CreatedById).uuid().not_null())
                        .col(ColumnDef::new(Tickets::CustomerName).string().not_null())
                        .col(ColumnDef::new(Tickets::CustomerEmail).string().not_null())
                        .col(ColumnDef::new(Tickets::CustomerPhone).string())
                        .col(ColumnDef::new(Tickets::CustomerCompany).string())
                        .col(ColumnDef::new(Tickets::DueDate).timestamp_with_time_zone())
                        .col(created_at(Tickets::CreatedAt))
                        .col(created_at(Tickets::UpdatedAt))
                        .col(ColumnDef::new(Tickets::ResolvedAt).timestamp_with_time_zone())
                        .col(ColumnDef::new(Tickets::ClosedAt).timestamp_with_time_zone())
                        .col(ColumnDef::new(Tickets::Version).big_integer().not_null().default(1))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tickets_level")
                                .from(Tickets::Table, Tickets::LevelId)
                                .to(SupportLevels::Table, SupportLevels::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tickets_category")
                                .from(Tickets::Table, Tickets::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            for (name, col) in [
                ("idx_tickets_status", Tickets::Status),
                ("idx_tickets_level_id", Tickets::LevelId),
                ("idx_tickets_assignee_id", Tickets::AssigneeId),
                ("idx_tickets_created_at", Tickets::CreatedAt),
            ] {
                manager
                    .create_index(
                        Index::create()
                            .name(name)
                            .table(Tickets::Table)
                            .col(col)
                            .to_owned(),
                    )
                    .await?;
            }

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Tickets::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Tickets {
        Table,
        Id,
        TicketNumber,
        Subject,
        Description,
        CategoryId,
        Status,
        Priority,
        LevelId,
        AssigneeId,
        CreatedById,
        CustomerName,
        CustomerEmail,
        CustomerPhone,
        CustomerCompany,
        DueDate,
        CreatedAt,
        UpdatedAt,
        ResolvedAt,
        ClosedAt,
        Version,
    }

    #[derive(DeriveIden)]
    enum SupportLevels {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Categories {
        Table,
        Id,
    }
}

mod m20250301_000003_create_ticket_records {
    use super::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    fn ticket_fk<T: IntoIden + 'static>(name: &str, table: T, col: T) -> ForeignKeyCreateStatement {
        ForeignKey::create()
            .name(name)
            .from(table, col)
            .to(Tickets::Table, Tickets::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TicketActivities::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(TicketActivities::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(TicketActivities::TicketId).uuid().not_null())
                        .col(ColumnDef::new(TicketActivities::AuthorId).uuid())
                        .col(ColumnDef::new(TicketActivities::ActivityType).string_len(32).not_null())
                        .col(ColumnDef::new(TicketActivities::Description).text().not_null())
                        .col(ColumnDef::new(TicketActivities::OldValue).string())
                        .col(ColumnDef::new(TicketActivities::NewValue).string())
                        .col(created_at(TicketActivities::CreatedAt))
                        .col(ColumnDef::new(TicketActivities::Position).integer().not_null().default(0))
                        .foreign_key(&mut ticket_fk(
                            "fk_ticket_activities_ticket",
                            TicketActivities::Table,
                            TicketActivities::TicketId,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TicketReplies::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(TicketReplies::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(TicketReplies::TicketId).uuid().not_null())
                        .col(ColumnDef::new(TicketReplies::AuthorId).uuid())
                        .col(ColumnDef::new(TicketReplies::FromCustomer).boolean().not_null().default(false))
                        .col(ColumnDef::new(TicketReplies::Message).text().not_null())
                        .col(created_at(TicketReplies::CreatedAt))
                        .foreign_key(&mut ticket_fk(
                            "fk_ticket_replies_ticket",
                            TicketReplies::Table,
                            TicketReplies::TicketId,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TicketNotes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(TicketNotes::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(TicketNotes::TicketId).uuid().not_null())
                        .col(ColumnDef::new(TicketNotes::AuthorId).uuid().not_null())
                        .col(ColumnDef::new(TicketNotes::Content).text().not_null())
                        .col(created_at(TicketNotes::CreatedAt))
                        .foreign_key(&mut ticket_fk(
                            "fk_ticket_notes_ticket",
                            TicketNotes::Table,
                            TicketNotes::TicketId,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Attachments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Attachments::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Attachments::TicketId).uuid().not_null())
                        .col(ColumnDef::new(Attachments::ReplyId).uuid())
                        .col(ColumnDef::new(Attachments::NoteId).uuid())
                        .col(ColumnDef::new(Attachments::FileName).string().not_null())
                        .col(ColumnDef::new(Attachments::FileKey).string().not_null())
                        .col(ColumnDef::new(Attachments::FileUrl).string().not_null())
                        .col(ColumnDef::new(Attachments::FileSize).big_integer().not_null())
                        .col(ColumnDef::new(Attachments::FileType).string().not_null())
                        .col(ColumnDef::new(Attachments::UploadedById).uuid())
                        .col(created_at(Attachments::CreatedAt))
                        .foreign_key(&mut ticket_fk(
                            "fk_attachments_ticket",
                            Attachments::Table,
                            Attachments::TicketId,
                        ))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_ticket_activities_ticket_id")
                        .table(TicketActivities::Table)
                        .col(TicketActivities::TicketId)
                        .col(TicketActivities::CreatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_ticket_replies_ticket_id")
                        .table(TicketReplies::Table)
                        .col(TicketReplies::TicketId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_attachments_ticket_id")
                        .table(Attachments::Table)
                        .col(Attachments::TicketId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Attachments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(TicketNotes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(TicketReplies::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(TicketActivities::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Tickets {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum TicketActivities {
        Table,
        Id,
        TicketId,
        AuthorId,
        ActivityType,
        Description,
        OldValue,
        NewValue,
        CreatedAt,
        Position,
    }

    #[derive(DeriveIden)]
    enum TicketReplies {
        Table,
        Id,
        TicketId,
        AuthorId,
        FromCustomer,
        Message,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum TicketNotes {
        Table,
        Id,
        TicketId,
        AuthorId,
        Content,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Attachments {
        Table,
        Id,
        TicketId,
        ReplyId,
        NoteId,
        FileName,
        FileKey,
        FileUrl,
        FileSize,
        FileType,
        UploadedById,
        CreatedAt,
    }
}

mod m20250301_000004_create_settings {
    use super::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Settings::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Settings::Key).string_len(64).not_null().primary_key())
                        .col(ColumnDef::new(Settings::Value).json().not_null())
                        .col(ColumnDef::new(Settings::Version).big_integer().not_null().default(1))
                        .col(ColumnDef::new(Settings::UpdatedBy).uuid())
                        .col(created_at(Settings::UpdatedAt))
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Settings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Settings {
        Table,
        Key,
        Value,
        Version,
        UpdatedBy,
        UpdatedAt,
    }
}

/// Default L1-L3 levels and per-priority SLA targets
mod m20250301_000005_seed_defaults {
    use super::m20250301_000001_create_reference_data::{SlaConfigs, SupportLevels};
    use super::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    const LEVELS: [(&str, &str, i32, bool, bool); 3] = [
        ("L1", "Level 1 - Frontline", 1, false, false),
        ("L2", "Level 2 - Specialist", 2, true, false),
        ("L3", "Level 3 - Expert", 3, true, true),
    ];

    const SLA_HOURS: [(&str, i32); 4] = [("urgent", 4), ("high", 8), ("normal", 24), ("low", 72)];

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut levels = Query::insert()
                .into_table(SupportLevels::Table)
                .columns([
                    SupportLevels::Id,
                    SupportLevels::Code,
                    SupportLevels::Name,
                    SupportLevels::SortOrder,
                    SupportLevels::IsActive,
                    SupportLevels::Capabilities,
                ])
                .to_owned();
            for (code, name, sort_order, team, all) in LEVELS {
                let capabilities = serde_json::json!({
                    "can_view_own_tickets": true,
                    "can_view_team_tickets": team,
                    "can_view_all_tickets": all,
                    "can_create_ticket": true,
                    "can_assign_ticket": team,
                    "can_escalate_ticket": !all,
                    "can_resolve_ticket": true,
                    "can_close_ticket": team,
                });
                levels
                    .values([
                        uuid::Uuid::new_v4().into(),
                        code.into(),
                        name.into(),
                        sort_order.into(),
                        true.into(),
                        capabilities.into(),
                    ])
                    .map_err(|e| DbErr::Migration(e.to_string()))?;
            }
            manager.exec_stmt(levels).await?;

            let mut sla = Query::insert()
                .into_table(SlaConfigs::Table)
                .columns([
                    SlaConfigs::Id,
                    SlaConfigs::Priority,
                    SlaConfigs::DurationHrs,
                    SlaConfigs::IsActive,
                ])
                .to_owned();
            for (priority, hours) in SLA_HOURS {
                sla.values([
                    uuid::Uuid::new_v4().into(),
                    priority.into(),
                    hours.into(),
                    true.into(),
                ])
                .map_err(|e| DbErr::Migration(e.to_string()))?;
            }
            manager.exec_stmt(sla).await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .exec_stmt(Query::delete().from_table(SlaConfigs::Table).to_owned())
                .await?;
            manager
                .exec_stmt(
                    Query::delete()
                        .from_table(SupportLevels::Table)
                        .and_where(Expr::col(SupportLevels::Code).is_in(LEVELS.map(|l| l.0)))
                        .to_owned(),
                )
                .await
        }
    }
}
