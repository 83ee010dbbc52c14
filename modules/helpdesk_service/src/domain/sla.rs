//! SLA due-date computation and display progress
//!
//! The display fallback target only feeds [`snapshot`]; it is never written
//! back as a ticket due date.

use crate::contract::{SlaConfig, SlaSnapshot, SlaState, Ticket};
use crate::config::Config;
use chrono::{DateTime, Duration, Utc};

/// Warning bucket starts at this share of the target
pub const WARNING_RATIO: f64 = 0.75;

/// Stored due date for a new ticket; inactive configs never apply
pub fn compute_due_date(
    created_at: DateTime<Utc>,
    config: Option<&SlaConfig>,
) -> Option<DateTime<Utc>> {
    config
        .filter(|c| c.is_active)
        .and_then(|c| {
            Duration::try_hours(i64::from(c.duration_hrs))
                .and_then(|d| created_at.checked_add_signed(d))
        })
}

/// Elapsed/target progress of a ticket at `now`
pub fn snapshot(ticket: &Ticket, now: DateTime<Utc>, fallback_hours: i64) -> SlaSnapshot {
    let clock_end = if ticket.status.is_done() {
        ticket.resolved_at.or(ticket.closed_at).unwrap_or(now)
    } else {
        now
    };
    let elapsed = (clock_end - ticket.created_at).max(Duration::zero());

    let (target, fallback_target) = match ticket.due_date {
        Some(due) => ((due - ticket.created_at).max(Duration::zero()), false),
        None => (fallback_target(fallback_hours), true),
    };

    let elapsed_secs = elapsed.num_seconds() as f64;
    let target_secs = target.num_seconds() as f64;
    let percent = if target_secs > 0.0 {
        elapsed_secs / target_secs * 100.0
    } else {
        100.0
    };

    let state = if ticket.status.is_done() {
        SlaState::Done
    } else if elapsed_secs >= target_secs {
        SlaState::Critical
    } else if elapsed_secs >= target_secs * WARNING_RATIO {
        SlaState::Warning
    } else {
        SlaState::Normal
    };

    SlaSnapshot {
        elapsed_minutes: elapsed.num_minutes(),
        target_minutes: target.num_minutes(),
        percent,
        state,
        fallback_target,
    }
}

fn fallback_target(fallback_hours: i64) -> Duration {
    Duration::try_hours(fallback_hours)
        .or_else(|| Duration::try_hours(Config::default().sla_fallback_hours))
        .unwrap_or_else(Duration::zero)
}
