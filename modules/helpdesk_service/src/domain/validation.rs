//! Input validation for ticket and reference-data operations

use crate::contract::{AttachmentRef, HelpdeskError, NewSupportLevel, NewTicket};
use uuid::Uuid;

/// Upper bound for subject lines
pub const MAX_SUBJECT_LEN: usize = 255;

fn require(value: &str, field: &str) -> Result<(), HelpdeskError> {
    if value.trim().is_empty() {
        return Err(HelpdeskError::validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Validate an email address
///
/// Accepts `local@domain.tld`: exactly one '@', non-empty local part, and a
/// domain containing a dot that neither starts nor ends the domain.
pub fn validate_email(email: &str) -> Result<(), HelpdeskError> {
    let invalid = || HelpdeskError::validation(format!("'{}' is not a valid email address", email));

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid());
    };
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }
    Ok(())
}

/// Required fields of a new ticket; returns the category and level ids
pub fn validate_new_ticket(ticket: &NewTicket) -> Result<(Uuid, Uuid), HelpdeskError> {
    require(&ticket.subject, "subject")?;
    if ticket.subject.chars().count() > MAX_SUBJECT_LEN {
        return Err(HelpdeskError::validation(format!(
            "subject must be at most {} characters",
            MAX_SUBJECT_LEN
        )));
    }
    require(&ticket.description, "description")?;
    let category_id = ticket
        .category_id
        .ok_or_else(|| HelpdeskError::validation("categoryId is required"))?;
    require(&ticket.customer.name, "customerName")?;
    require(&ticket.customer.email, "customerEmail")?;
    validate_email(&ticket.customer.email)?;
    let level_id = ticket
        .level_id
        .ok_or_else(|| HelpdeskError::validation("levelId is required"))?;
    validate_attachments(&ticket.attachments)?;
    Ok((category_id, level_id))
}

pub fn validate_message(message: &str) -> Result<(), HelpdeskError> {
    require(message, "message")
}

pub fn validate_attachments(attachments: &[AttachmentRef]) -> Result<(), HelpdeskError> {
    for attachment in attachments {
        require(&attachment.file_name, "fileName")?;
        require(&attachment.file_key, "fileKey")?;
        if attachment.file_size < 0 {
            return Err(HelpdeskError::validation(format!(
                "attachment '{}' has a negative size",
                attachment.file_name
            )));
        }
    }
    Ok(())
}

/// Level codes are short identifiers such as "L1" or "TIER_2"
pub fn validate_level_code(code: &str) -> Result<(), HelpdeskError> {
    require(code, "code")?;
    if code.len() > 20 {
        return Err(HelpdeskError::validation("code must be at most 20 characters"));
    }
    let valid = code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(HelpdeskError::validation(format!(
            "code '{}' contains invalid characters. Only letters, digits, '_' and '-' are allowed",
            code
        )));
    }
    Ok(())
}

pub fn validate_new_level(level: &NewSupportLevel) -> Result<(), HelpdeskError> {
    validate_level_code(&level.code)?;
    require(&level.name, "name")
}

pub fn validate_sla_duration(duration_hrs: i32) -> Result<(), HelpdeskError> {
    if duration_hrs < 1 {
        return Err(HelpdeskError::validation("durationHrs must be at least 1"));
    }
    Ok(())
}
