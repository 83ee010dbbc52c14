//! Global settings with typed accessors
//!
//! Settings are stored as versioned key/value rows. Defaults come from the
//! module [`Config`] and are merged with stored rows at read time.

use crate::config::Config;
use crate::contract::{GlobalSetting, HelpdeskError};
use serde_json::Value;

pub const TICKET_PREFIX: &str = "ticket_prefix";
pub const SLA_FALLBACK_HOURS: &str = "sla_fallback_hours";
pub const AUTO_CLOSE_DAYS: &str = "auto_close_days";

pub const KNOWN_KEYS: [&str; 3] = [TICKET_PREFIX, SLA_FALLBACK_HOURS, AUTO_CLOSE_DAYS];

/// One year
pub const MAX_SLA_FALLBACK_HOURS: i64 = 8_760;
/// Ten years
pub const MAX_AUTO_CLOSE_DAYS: i64 = 3_650;

/// Effective settings after merging stored rows over defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpdeskSettings {
    pub ticket_prefix: String,
    pub sla_fallback_hours: i64,
    pub auto_close_days: i64,
}

impl HelpdeskSettings {
    pub fn defaults(config: &Config) -> Self {
        Self {
            ticket_prefix: config.ticket_prefix.clone(),
            sla_fallback_hours: config.sla_fallback_hours,
            auto_close_days: config.auto_close_days,
        }
    }

    /// Stored values that fail to parse are ignored in favour of the default
    pub fn merge(config: &Config, rows: &[GlobalSetting]) -> Self {
        let mut settings = Self::defaults(config);
        for row in rows {
            let applied = match row.key.as_str() {
                TICKET_PREFIX => parse_prefix(&row.value).map(|v| settings.ticket_prefix = v),
                SLA_FALLBACK_HOURS => parse_bounded(&row.value, MAX_SLA_FALLBACK_HOURS)
                    .map(|v| settings.sla_fallback_hours = v),
                AUTO_CLOSE_DAYS => parse_bounded(&row.value, MAX_AUTO_CLOSE_DAYS)
                    .map(|v| settings.auto_close_days = v),
                _ => Ok(()),
            };
            if let Err(reason) = applied {
                tracing::warn!(key = %row.key, %reason, "ignoring invalid stored setting");
            }
        }
        settings
    }

    /// Check a value before it is written
    pub fn validate(key: &str, value: &Value) -> Result<(), HelpdeskError> {
        let result = match key {
            TICKET_PREFIX => parse_prefix(value).map(|_| ()),
            SLA_FALLBACK_HOURS => parse_bounded(value, MAX_SLA_FALLBACK_HOURS).map(|_| ()),
            AUTO_CLOSE_DAYS => parse_bounded(value, MAX_AUTO_CLOSE_DAYS).map(|_| ()),
            other => Err(format!(
                "unknown setting '{}', expected one of: {}",
                other,
                KNOWN_KEYS.join(", ")
            )),
        };
        result.map_err(HelpdeskError::validation)
    }
}

fn parse_prefix(value: &Value) -> Result<String, String> {
    let prefix = value
        .as_str()
        .ok_or_else(|| "ticket_prefix must be a string".to_string())?;
    if prefix.is_empty() || prefix.len() > 10 {
        return Err("ticket_prefix must be 1-10 characters".to_string());
    }
    if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("ticket_prefix may only contain ASCII letters and digits".to_string());
    }
    Ok(prefix.to_string())
}

fn parse_bounded(value: &Value, max: i64) -> Result<i64, String> {
    match value.as_i64() {
        Some(n) => check_range(n, max),
        None => Err(format!("expected an integer between 1 and {}, got {}", max, value)),
    }
}

/// Range check shared by stored settings and [`Config`] loading
pub fn check_range(n: i64, max: i64) -> Result<i64, String> {
    if (1..=max).contains(&n) {
        Ok(n)
    } else {
        Err(format!("expected an integer between 1 and {}, got {}", max, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn row(key: &str, value: Value) -> GlobalSetting {
        GlobalSetting {
            key: key.to_string(),
            value,
            version: 1,
            updated_by: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_defaults_from_config() {
        let settings = HelpdeskSettings::merge(&Config::default(), &[]);
        assert_eq!(settings.ticket_prefix, "TKT");
        assert_eq!(settings.sla_fallback_hours, 48);
        assert_eq!(settings.auto_close_days, 7);
    }

    #[test]
    fn test_stored_rows_override_defaults() {
        let rows = vec![
            row(TICKET_PREFIX, json!("HD")),
            row(SLA_FALLBACK_HOURS, json!(24)),
            row("unrelated", json!(true)),
        ];
        let settings = HelpdeskSettings::merge(&Config::default(), &rows);
        assert_eq!(settings.ticket_prefix, "HD");
        assert_eq!(settings.sla_fallback_hours, 24);
        assert_eq!(settings.auto_close_days, 7);
    }

    #[test]
    fn test_invalid_rows_fall_back() {
        let rows = vec![
            row(AUTO_CLOSE_DAYS, json!(0)),
            row(TICKET_PREFIX, json!(12)),
            row(SLA_FALLBACK_HOURS, json!(i64::MAX / 2)),
        ];
        let settings = HelpdeskSettings::merge(&Config::default(), &rows);
        assert_eq!(settings.auto_close_days, 7);
        assert_eq!(settings.ticket_prefix, "TKT");
        assert_eq!(settings.sla_fallback_hours, 48);
    }

    #[test]
    fn test_validate() {
        assert!(HelpdeskSettings::validate(AUTO_CLOSE_DAYS, &json!(3)).is_ok());
        assert!(HelpdeskSettings::validate(AUTO_CLOSE_DAYS, &json!("3")).is_err());
        assert!(HelpdeskSettings::validate(AUTO_CLOSE_DAYS, &json!(MAX_AUTO_CLOSE_DAYS)).is_ok());
        assert!(HelpdeskSettings::validate(AUTO_CLOSE_DAYS, &json!(100_000_000)).is_err());
        assert!(HelpdeskSettings::validate(SLA_FALLBACK_HOURS, &json!(8_761)).is_err());
        assert!(HelpdeskSettings::validate(TICKET_PREFIX, &json!("TK-1")).is_err());
        assert!(matches!(
            HelpdeskSettings::validate("smtp_host", &json!("mail")),
            Err(HelpdeskError::Validation { .. })
        ));
    }
}
