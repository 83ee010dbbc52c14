//! Activity descriptions
//!
//! Activities store a structured type plus old/new codes; the description is
//! the Indonesian text shown in the dashboard timeline.

use crate::contract::{Priority, TicketStatus};

pub fn status_label(status: TicketStatus) -> &'static str {
    match status {
        TicketStatus::Open => "Terbuka",
        TicketStatus::InProgress => "Sedang Diproses",
        TicketStatus::Pending => "Menunggu",
        TicketStatus::Resolved => "Selesai",
        TicketStatus::Closed => "Ditutup",
    }
}

pub fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "Rendah",
        Priority::Normal => "Normal",
        Priority::High => "Tinggi",
        Priority::Urgent => "Mendesak",
    }
}

/// Why a status changed when it was not an explicit edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusReason {
    Explicit,
    CustomerResponse,
    AgentResponse,
    AutoClose,
}

pub fn status_changed(old: TicketStatus, new: TicketStatus, reason: StatusReason) -> String {
    let base = format!(
        "Status diubah dari {} menjadi {}",
        status_label(old),
        status_label(new)
    );
    match reason {
        StatusReason::Explicit => base,
        StatusReason::CustomerResponse => format!("{} (tanggapan pelanggan)", base),
        StatusReason::AgentResponse => format!("{} (balasan agen)", base),
        StatusReason::AutoClose => format!("{} (ditutup otomatis)", base),
    }
}

pub fn priority_changed(old: Priority, new: Priority) -> String {
    format!(
        "Prioritas diubah dari {} menjadi {}",
        priority_label(old),
        priority_label(new)
    )
}

pub fn level_changed(old_code: &str, new_code: &str) -> String {
    format!("Level dukungan diubah dari {} menjadi {}", old_code, new_code)
}

pub fn assigned(old_name: Option<&str>, new_name: Option<&str>, note: Option<&str>) -> String {
    let base = match (old_name, new_name) {
        (None, Some(new)) => format!("Tiket ditugaskan kepada {}", new),
        (Some(old), Some(new)) => format!("Tiket dipindahkan dari {} kepada {}", old, new),
        (Some(old), None) => format!("Penugasan {} dilepas", old),
        (None, None) => "Tiket tidak ditugaskan".to_string(),
    };
    match note {
        Some(note) if !note.trim().is_empty() => format!("{}: {}", base, note.trim()),
        _ => base,
    }
}

pub fn claimed_via_reply(name: &str) -> String {
    format!("Tiket diambil oleh {} melalui balasan", name)
}

pub fn escalated(old_code: &str, new_code: &str, reason: Option<&str>) -> String {
    let base = format!("Tiket dieskalasi dari {} ke {}", old_code, new_code);
    match reason {
        Some(reason) if !reason.trim().is_empty() => format!("{}. Alasan: {}", base, reason.trim()),
        _ => base,
    }
}

pub fn created(ticket_number: &str) -> String {
    format!("Tiket {} dibuat", ticket_number)
}

pub fn reply_added(author: &str) -> String {
    format!("Balasan ditambahkan oleh {}", author)
}

pub fn customer_replied(customer: &str) -> String {
    format!("Pelanggan {} membalas tiket", customer)
}

pub fn note_added(author: &str) -> String {
    format!("Catatan internal ditambahkan oleh {}", author)
}

pub fn attachments_added(count: usize) -> String {
    format!("{} lampiran ditambahkan", count)
}
