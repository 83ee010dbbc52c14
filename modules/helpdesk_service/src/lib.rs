//! Helpdesk Service Module
//!
//! Ticket lifecycle, tiered support levels with escalation, SLA tracking,
//! an append-only activity log and a customer self-service lookup.

// Public exports
pub mod contract;
pub use contract::{
    client::HelpdeskApi, error::HelpdeskError, Actor, NewTicket, Priority, SupportLevel, Ticket,
    TicketStatus,
};

pub mod module;
pub use module::HelpdeskServiceModule;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
