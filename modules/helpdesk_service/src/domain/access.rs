//! Access control evaluator
//!
//! Pure functions over an actor and a ticket. Admins bypass every check;
//! agents are gated by the capability set of their support level.

use crate::contract::{Actor, DeniedAction, HelpdeskError, SupportLevel, Ticket};
use uuid::Uuid;

fn is_assignee(actor: &Actor, ticket: &Ticket) -> bool {
    ticket.assignee_id == Some(actor.id)
}

fn is_creator(actor: &Actor, ticket: &Ticket) -> bool {
    ticket.created_by_id == actor.id
}

/// Whether the actor may see the ticket at all
pub fn can_view(actor: &Actor, ticket: &Ticket) -> bool {
    if actor.is_admin() {
        return true;
    }
    let caps = &actor.level.capabilities;
    if caps.can_view_all_tickets {
        return true;
    }
    if caps.can_view_team_tickets && ticket.level.sort_order <= actor.level.sort_order {
        return true;
    }
    is_assignee(actor, ticket) || is_creator(actor, ticket)
}

/// Status, priority, level, note and attachment edits
pub fn can_mutate(actor: &Actor, ticket: &Ticket) -> bool {
    actor.is_admin() || is_assignee(actor, ticket) || is_creator(actor, ticket)
}

/// Replies are also open to anyone claiming an unassigned ticket
pub fn can_reply(actor: &Actor, ticket: &Ticket) -> bool {
    can_mutate(actor, ticket) || ticket.assignee_id.is_none()
}

pub fn can_assign(actor: &Actor) -> bool {
    actor.is_admin() || actor.level.capabilities.can_assign_ticket
}

/// Assignment is granted by capability, or as a first-responder claim where
/// the actor takes an unassigned ticket for themselves.
pub fn can_assign_ticket(actor: &Actor, ticket: &Ticket, new_assignee: Option<Uuid>) -> bool {
    can_assign(actor) || (ticket.assignee_id.is_none() && new_assignee == Some(actor.id))
}

pub fn can_escalate(actor: &Actor, ticket: &Ticket) -> bool {
    if actor.is_admin() {
        return true;
    }
    let involved =
        ticket.assignee_id.is_none() || is_assignee(actor, ticket) || is_creator(actor, ticket);
    involved && actor.level.capabilities.can_escalate_ticket
}

pub fn can_create(actor: &Actor) -> bool {
    actor.is_admin() || actor.level.capabilities.can_create_ticket
}

/// Turn an evaluator verdict into a typed denial
pub fn ensure(allowed: bool, action: DeniedAction) -> Result<(), HelpdeskError> {
    if allowed {
        Ok(())
    } else {
        Err(HelpdeskError::denied(action))
    }
}

pub fn ensure_admin(actor: &Actor) -> Result<(), HelpdeskError> {
    ensure(actor.is_admin(), DeniedAction::Administer)
}

/// Storage-level form of [`can_view`] used to filter ticket queries.
///
/// `Restricted` admits a ticket when its level is one of `level_ids`, or when
/// the actor is its assignee or creator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityScope {
    All,
    Restricted { actor_id: Uuid, level_ids: Vec<Uuid> },
}

impl VisibilityScope {
    /// Build the scope for an actor given every known level (active or not)
    pub fn for_actor(actor: &Actor, levels: &[SupportLevel]) -> Self {
        if actor.is_admin() || actor.level.capabilities.can_view_all_tickets {
            return Self::All;
        }
        let level_ids = if actor.level.capabilities.can_view_team_tickets {
            levels
                .iter()
                .filter(|l| l.sort_order <= actor.level.sort_order)
                .map(|l| l.id)
                .collect()
        } else {
            Vec::new()
        };
        Self::Restricted {
            actor_id: actor.id,
            level_ids,
        }
    }

    pub fn admits(&self, ticket: &Ticket) -> bool {
        match self {
            Self::All => true,
            Self::Restricted {
                actor_id,
                level_ids,
            } => {
                level_ids.contains(&ticket.level.id)
                    || ticket.assignee_id == Some(*actor_id)
                    || ticket.created_by_id == *actor_id
            }
        }
    }
}
