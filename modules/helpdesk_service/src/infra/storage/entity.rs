//! SeaORM entities for database tables
//!
//! Enumerations (status, priority, role, activity type) are stored as their
//! snake_case string form; level capabilities as a JSON document.

/// Support level table entity
pub mod support_level {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "support_levels")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,

        #[sea_orm(unique)]
        pub code: String,

        pub name: String,

        /// Escalation rank, unique among active levels
        pub sort_order: i32,

        pub is_active: bool,

        /// Capability flags as JSON
        pub capabilities: Json,

        pub created_at: DateTimeUtc,

        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Per-priority SLA target
pub mod sla_config {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "sla_configs")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,

        #[sea_orm(unique)]
        pub priority: String,

        pub duration_hrs: i32,

        pub is_active: bool,

        pub created_at: DateTimeUtc,

        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod category {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "categories")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,

        pub name: String,

        #[sea_orm(column_type = "Text", nullable)]
        pub description: Option<String>,

        pub is_active: bool,

        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Agents and admins, written by the auth layer
pub mod actor {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "actors")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,

        pub name: String,

        #[sea_orm(unique)]
        pub email: String,

        /// "admin" or "agent"
        pub role: String,

        pub level_id: Uuid,

        pub is_active: bool,

        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::support_level::Entity",
            from = "Column::LevelId",
            to = "super::support_level::Column::Id"
        )]
        SupportLevel,
    }

    impl Related<super::support_level::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::SupportLevel.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Ticket table entity
pub mod ticket {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "tickets")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,

        #[sea_orm(unique)]
        pub ticket_number: String,

        pub subject: String,

        #[sea_orm(column_type = "Text")]
        pub description: String,

        pub category_id: Uuid,

        pub status: String,

        pub priority: String,

        pub level_id: Uuid,

        pub assignee_id: Option<Uuid>,

        pub created_by_id: Uuid,

        pub customer_name: String,

        pub customer_email: String,

        pub customer_phone: Option<String>,

        pub customer_company: Option<String>,

        pub due_date: Option<DateTimeUtc>,

        pub created_at: DateTimeUtc,

        pub updated_at: DateTimeUtc,

        pub resolved_at: Option<DateTimeUtc>,

        pub closed_at: Option<DateTimeUtc>,

        /// Optimistic concurrency counter
        pub version: i64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::support_level::Entity",
            from = "Column::LevelId",
            to = "super::support_level::Column::Id"
        )]
        SupportLevel,
    }

    impl Related<super::support_level::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::SupportLevel.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Append-only audit log
pub mod activity {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "ticket_activities")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,

        pub ticket_id: Uuid,

        pub author_id: Option<Uuid>,

        pub activity_type: String,

        #[sea_orm(column_type = "Text")]
        pub description: String,

        pub old_value: Option<String>,

        pub new_value: Option<String>,

        pub created_at: DateTimeUtc,

        /// Order within one change set; activities of a change share `created_at`
        pub position: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod reply {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "ticket_replies")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,

        pub ticket_id: Uuid,

        pub author_id: Option<Uuid>,

        pub from_customer: bool,

        #[sea_orm(column_type = "Text")]
        pub message: String,

        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod note {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "ticket_notes")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,

        pub ticket_id: Uuid,

        pub author_id: Uuid,

        #[sea_orm(column_type = "Text")]
        pub content: String,

        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Attachment metadata; the file itself lives in external storage
pub mod attachment {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "attachments")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,

        pub ticket_id: Uuid,

        pub reply_id: Option<Uuid>,

        pub note_id: Option<Uuid>,

        pub file_name: String,

        pub file_key: String,

        pub file_url: String,

        pub file_size: i64,

        pub file_type: String,

        pub uploaded_by_id: Option<Uuid>,

        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Versioned global settings
pub mod setting {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "settings")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub key: String,

        pub value: Json,

        pub version: i64,

        pub updated_by: Option<Uuid>,

        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
