//! Contract error types for helpdesk service
//!
//! These errors are transport-agnostic and used for inter-module communication.

use std::fmt;

/// Action an actor was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeniedAction {
    View,
    Mutate,
    Assign,
    Escalate,
    Create,
    /// Reference data and settings administration
    Administer,
}

impl fmt::Display for DeniedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::View => "view this ticket",
            Self::Mutate => "update this ticket",
            Self::Assign => "assign this ticket",
            Self::Escalate => "escalate this ticket",
            Self::Create => "create tickets",
            Self::Administer => "manage helpdesk configuration",
        })
    }
}

/// Helpdesk service domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HelpdeskError {
    /// Ticket, level, category or actor missing
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Access control evaluator refused the action
    #[error("Permission denied: not allowed to {action}")]
    PermissionDenied { action: DeniedAction },

    /// Missing or malformed input
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Escalation requested at the highest active level
    #[error("Ticket is already at the highest support level ({level})")]
    TerminalState { level: String },

    /// Duplicate keys, stale writes, exhausted ticket number retries
    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    #[error("Internal error")]
    Internal,
}

impl HelpdeskError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn denied(action: DeniedAction) -> Self {
        Self::PermissionDenied { action }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }
}
