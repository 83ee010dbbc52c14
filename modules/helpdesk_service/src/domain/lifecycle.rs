//! Ticket state machine
//!
//! A [`TicketMutation`] applies lifecycle rules to an in-memory ticket and
//! collects the activity records the change must produce. Nothing is
//! persisted here; the service commits the result as one change set.

use super::activity::{self, StatusReason};
use crate::contract::{
    ActivityType, Priority, SupportLevel, Ticket, TicketActivity, TicketStatus,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub struct TicketMutation {
    ticket: Ticket,
    author_id: Option<Uuid>,
    now: DateTime<Utc>,
    activities: Vec<TicketActivity>,
}

impl TicketMutation {
    /// `author_id` is None for customer and system changes
    pub fn new(ticket: Ticket, author_id: Option<Uuid>, now: DateTime<Utc>) -> Self {
        Self {
            ticket,
            author_id,
            now,
            activities: Vec::new(),
        }
    }

    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    pub fn activities(&self) -> &[TicketActivity] {
        &self.activities
    }

    fn push(
        &mut self,
        activity_type: ActivityType,
        description: String,
        old_value: Option<String>,
        new_value: Option<String>,
    ) {
        self.activities.push(TicketActivity {
            id: Uuid::new_v4(),
            ticket_id: self.ticket.id,
            author_id: self.author_id,
            activity_type,
            description,
            old_value,
            new_value,
            created_at: self.now,
        });
    }

    /// Append an activity that carries no old/new values
    pub fn record(&mut self, activity_type: ActivityType, description: String) {
        self.push(activity_type, description, None, None);
    }

    /// Move to `status`, stamping resolve/close times on first entry only
    fn apply_status(&mut self, status: TicketStatus) {
        self.ticket.status = status;
        match status {
            TicketStatus::Resolved if self.ticket.resolved_at.is_none() => {
                self.ticket.resolved_at = Some(self.now);
            }
            TicketStatus::Closed if self.ticket.closed_at.is_none() => {
                self.ticket.closed_at = Some(self.now);
            }
            _ => {}
        }
    }

    /// Logged status transition. Returns false when the status is unchanged.
    pub fn set_status(&mut self, status: TicketStatus, reason: StatusReason) -> bool {
        let old = self.ticket.status;
        if old == status {
            return false;
        }
        self.apply_status(status);
        self.push(
            ActivityType::StatusChange,
            activity::status_changed(old, status, reason),
            Some(old.as_str().to_string()),
            Some(status.as_str().to_string()),
        );
        true
    }

    /// Status rules triggered by a new reply.
    ///
    /// Resolved, closed and pending tickets reopen with a logged transition.
    /// An agent answering an open ticket moves it to in-progress as part of
    /// the reply itself, without a separate status activity.
    pub fn apply_reply(&mut self, from_customer: bool) {
        let status = self.ticket.status;
        if status.reopens_on_reply() {
            let reason = if from_customer {
                StatusReason::CustomerResponse
            } else {
                StatusReason::AgentResponse
            };
            self.set_status(TicketStatus::Open, reason);
        } else if !from_customer && status == TicketStatus::Open {
            self.apply_status(TicketStatus::InProgress);
        }
    }

    /// Due date is left untouched on purpose
    pub fn set_priority(&mut self, priority: Priority) -> bool {
        let old = self.ticket.priority;
        if old == priority {
            return false;
        }
        self.ticket.priority = priority;
        self.push(
            ActivityType::PriorityChange,
            activity::priority_changed(old, priority),
            Some(old.as_str().to_string()),
            Some(priority.as_str().to_string()),
        );
        true
    }

    /// Explicit level re-assignment; may move down as well as up
    pub fn set_level(&mut self, level: SupportLevel) -> bool {
        if self.ticket.level.id == level.id {
            return false;
        }
        let old_code = self.ticket.level.code.clone();
        self.push(
            ActivityType::LevelChange,
            activity::level_changed(&old_code, &level.code),
            Some(old_code),
            Some(level.code.clone()),
        );
        self.ticket.level = level;
        true
    }

    pub fn set_due_date(&mut self, due_date: Option<DateTime<Utc>>) {
        self.ticket.due_date = due_date;
    }

    /// Set or clear the assignee, logging old/new assignee names
    pub fn assign(
        &mut self,
        new_assignee: Option<(Uuid, &str)>,
        old_name: Option<&str>,
        note: Option<&str>,
    ) {
        self.ticket.assignee_id = new_assignee.map(|(id, _)| id);
        let new_name = new_assignee.map(|(_, name)| name);
        self.push(
            ActivityType::Assign,
            activity::assigned(old_name, new_name, note),
            old_name.map(str::to_string),
            new_name.map(str::to_string),
        );
    }

    /// First-responder claim performed as a side effect of replying
    pub fn claim_via_reply(&mut self, actor_id: Uuid, actor_name: &str) {
        self.ticket.assignee_id = Some(actor_id);
        self.push(
            ActivityType::Assign,
            activity::claimed_via_reply(actor_name),
            None,
            Some(actor_name.to_string()),
        );
    }

    /// Raise to `next` and clear the assignee for re-triage
    pub fn escalate(&mut self, next: SupportLevel, reason: Option<&str>) {
        let old_code = self.ticket.level.code.clone();
        self.push(
            ActivityType::Escalate,
            activity::escalated(&old_code, &next.code, reason),
            Some(old_code),
            Some(next.code.clone()),
        );
        self.ticket.level = next;
        self.ticket.assignee_id = None;
    }

    pub fn finish(mut self) -> (Ticket, Vec<TicketActivity>) {
        self.ticket.updated_at = self.now;
        (self.ticket, self.activities)
    }
}
