//! Contract layer - public API for inter-module communication
//!
//! This layer contains transport-agnostic models and the native client trait.
//! NO serde derives on models - these are pure domain types.

pub mod client;
pub mod error;
pub mod model;

pub use client::HelpdeskApi;
pub use error::{DeniedAction, HelpdeskError};
pub use model::{
    ActivityType, Actor, Attachment, AttachmentRef, Category, Customer, GlobalSetting,
    LevelCapabilities, NewSupportLevel, NewTicket, Priority, PublicTicketView, Role, SlaConfig,
    SlaSnapshot, SlaState, SupportLevel, SupportLevelUpdate, Ticket, TicketActivity,
    TicketDetail, TicketFilter, TicketNote, TicketReply, TicketStatus, TicketUpdate,
};
