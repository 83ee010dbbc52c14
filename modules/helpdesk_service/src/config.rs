//! Configuration for helpdesk service module

use serde::Deserialize;

/// Helpdesk service configuration
///
/// Values here are defaults; rows in the global settings table override the
/// ones that have a settings key.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Prefix of generated ticket numbers
    #[serde(default = "default_ticket_prefix")]
    pub ticket_prefix: String,

    /// SLA target (hours) used for progress display when a ticket has no due date
    #[serde(default = "default_sla_fallback_hours")]
    pub sla_fallback_hours: i64,

    /// Resolved tickets older than this many days are closed by auto-close
    #[serde(default = "default_auto_close_days")]
    pub auto_close_days: i64,

    /// Capacity of the outbound notification queue
    #[serde(default = "default_notification_queue_capacity")]
    pub notification_queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ticket_prefix: default_ticket_prefix(),
            sla_fallback_hours: default_sla_fallback_hours(),
            auto_close_days: default_auto_close_days(),
            notification_queue_capacity: default_notification_queue_capacity(),
        }
    }
}

impl Config {
    /// Reject values the settings table would also refuse
    pub fn validate(&self) -> anyhow::Result<()> {
        use crate::domain::settings::{check_range, MAX_AUTO_CLOSE_DAYS, MAX_SLA_FALLBACK_HOURS};

        check_range(self.sla_fallback_hours, MAX_SLA_FALLBACK_HOURS)
            .map_err(|e| anyhow::anyhow!("sla_fallback_hours: {}", e))?;
        check_range(self.auto_close_days, MAX_AUTO_CLOSE_DAYS)
            .map_err(|e| anyhow::anyhow!("auto_close_days: {}", e))?;
        if self.notification_queue_capacity == 0 {
            anyhow::bail!("notification_queue_capacity must be at least 1");
        }
        Ok(())
    }
}

fn default_ticket_prefix() -> String {
    "TKT".to_string()
}

fn default_sla_fallback_hours() -> i64 {
    48
}

fn default_auto_close_days() -> i64 {
    7
}

fn default_notification_queue_capacity() -> usize {
    1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let cfg: Config = serde_yaml::from_str("ticket_prefix: HD\nauto_close_days: 3\n").unwrap();
        assert_eq!(cfg.ticket_prefix, "HD");
        assert_eq!(cfg.auto_close_days, 3);
        assert_eq!(cfg.sla_fallback_hours, 48);
        assert_eq!(cfg.notification_queue_capacity, 1024);
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        assert!(Config::default().validate().is_ok());
        let cfg: Config = serde_yaml::from_str("auto_close_days: 100000000\n").unwrap();
        assert!(cfg.validate().is_err());
        let cfg: Config = serde_yaml::from_str("sla_fallback_hours: 0\n").unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(serde_yaml::from_str::<Config>("ticket_prefx: HD\n").is_err());
    }
}
