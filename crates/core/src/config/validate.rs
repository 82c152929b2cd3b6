use chrono::Duration;

use super::{types::Config, CollaboratorBackend, ConfigError};
use crate::poller::attempt_budget;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Poller intervals and backoff bounds are usable
/// - The poll budget outlasts the operation handle TTL, so a stuck job ends
///   up `Lost` rather than `TimedOut` first
/// - Autopilot goals and interval are non-zero
/// - The http collaborator backend has a base URL
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    let poller = &config.poller;
    if poller.tick_interval_ms == 0 {
        return Err(invalid("poller.tick_interval_ms cannot be 0"));
    }
    if poller.max_attempts == 0 {
        return Err(invalid("poller.max_attempts cannot be 0"));
    }
    if poller.max_backoff_ms < poller.initial_backoff_ms {
        return Err(invalid(
            "poller.max_backoff_ms must be >= poller.initial_backoff_ms",
        ));
    }

    if config.pipeline.operation_ttl_hours <= 0 {
        return Err(invalid("pipeline.operation_ttl_hours must be positive"));
    }
    let ttl = Duration::try_hours(config.pipeline.operation_ttl_hours)
        .ok_or_else(|| invalid("pipeline.operation_ttl_hours is out of range"))?;
    let budget = attempt_budget(poller);
    if budget < ttl {
        return Err(ConfigError::ValidationError(format!(
            "poller.max_attempts ({}) only covers {} minutes of polling, less than the {}h operation TTL",
            poller.max_attempts,
            budget.num_minutes(),
            config.pipeline.operation_ttl_hours
        )));
    }

    let autopilot = &config.autopilot;
    if autopilot.daily_short_goal == 0 && autopilot.weekly_long_goal == 0 {
        return Err(invalid("autopilot goals cannot both be 0"));
    }
    if autopilot.enabled && autopilot.interval_secs == 0 {
        return Err(invalid("autopilot.interval_secs cannot be 0"));
    }

    if config.collaborators.backend == CollaboratorBackend::Http
        && config
            .collaborators
            .base_url
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .is_empty()
    {
        return Err(invalid(
            "collaborators.base_url is required for the http backend",
        ));
    }

    Ok(())
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::ValidationError(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CollaboratorsConfig, ServerConfig};

    fn valid_config() -> Config {
        Config {
            collaborators: CollaboratorsConfig {
                base_url: Some("http://localhost:9400".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                port: 0,
                ..Default::default()
            },
            ..valid_config()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_missing_base_url_fails() {
        let mut config = valid_config();
        config.collaborators.base_url = Some("  ".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_backoff_bounds() {
        let mut config = valid_config();
        config.poller.initial_backoff_ms = 10_000;
        config.poller.max_backoff_ms = 5_000;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("max_backoff_ms"));
    }

    #[test]
    fn test_validate_poll_budget_must_cover_ttl() {
        let mut config = valid_config();
        config.poller.max_attempts = 60;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("max_attempts"));

        // A shorter TTL is covered by the same budget
        config.pipeline.operation_ttl_hours = 4;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_enabled_autopilot_needs_interval() {
        let mut config = valid_config();
        config.autopilot.enabled = true;
        config.autopilot.interval_secs = 0;
        assert!(validate_config(&config).is_err());
    }
}
