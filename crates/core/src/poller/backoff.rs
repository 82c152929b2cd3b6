use chrono::{DateTime, Duration, Utc};

use super::config::PollerConfig;

/// Poll bookkeeping for one `Processing` video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSchedule {
    /// Unfinished polls so far.
    pub attempts: u32,
    /// Earliest time of the next poll.
    pub next_poll_at: DateTime<Utc>,
}

impl PollSchedule {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_poll_at <= now
    }
}

/// Delay before the next poll after `attempts` unfinished polls.
///
/// `min(initial * 2^(attempts - 1), max)`.
pub fn backoff_delay(config: &PollerConfig, attempts: u32) -> Duration {
    let exponent = attempts.saturating_sub(1).min(32);
    let millis = config
        .initial_backoff_ms
        .saturating_mul(1u64 << exponent)
        .min(config.max_backoff_ms);
    Duration::milliseconds(i64::try_from(millis).unwrap_or(i64::MAX))
}

/// Time from the first unfinished poll of a video until it times out.
///
/// The sum of the delays after polls `1..max_attempts`. A still-running job
/// outlives its operation handle only if this exceeds the handle TTL.
pub fn attempt_budget(config: &PollerConfig) -> Duration {
    let max = Duration::milliseconds(i64::try_from(config.max_backoff_ms).unwrap_or(i64::MAX));
    let mut total = Duration::zero();
    for attempts in 1..config.max_attempts {
        let delay = backoff_delay(config, attempts);
        if delay >= max {
            // Every remaining delay is capped.
            let remaining = i32::try_from(config.max_attempts - attempts).unwrap_or(i32::MAX);
            return max
                .checked_mul(remaining)
                .and_then(|rest| total.checked_add(&rest))
                .unwrap_or(Duration::MAX);
        }
        total = total + delay;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(initial: u64, max: u64) -> PollerConfig {
        PollerConfig {
            initial_backoff_ms: initial,
            max_backoff_ms: max,
            ..Default::default()
        }
    }

    #[test]
    fn test_backoff_doubles() {
        let config = config(1000, 60_000);
        assert_eq!(backoff_delay(&config, 1), Duration::milliseconds(1000));
        assert_eq!(backoff_delay(&config, 2), Duration::milliseconds(2000));
        assert_eq!(backoff_delay(&config, 4), Duration::milliseconds(8000));
    }

    #[test]
    fn test_backoff_is_capped() {
        let config = config(1000, 5000);
        assert_eq!(backoff_delay(&config, 10), Duration::milliseconds(5000));
        assert_eq!(backoff_delay(&config, u32::MAX), Duration::milliseconds(5000));
    }

    #[test]
    fn test_zero_attempts_uses_initial() {
        let config = config(1000, 5000);
        assert_eq!(backoff_delay(&config, 0), Duration::milliseconds(1000));
    }

    #[test]
    fn test_attempt_budget_sums_delays() {
        let config = PollerConfig {
            max_attempts: 5,
            ..config(1000, 5000)
        };
        // 1s + 2s + 4s + 5s
        assert_eq!(attempt_budget(&config), Duration::milliseconds(12_000));
    }

    #[test]
    fn test_attempt_budget_single_attempt_is_zero() {
        let config = PollerConfig {
            max_attempts: 1,
            ..config(1000, 5000)
        };
        assert_eq!(attempt_budget(&config), Duration::zero());
    }

    #[test]
    fn test_default_budget_outlives_handle_ttl() {
        assert!(attempt_budget(&PollerConfig::default()) > Duration::hours(24));
    }

    #[test]
    fn test_schedule_due() {
        let now = Utc::now();
        let schedule = PollSchedule {
            attempts: 1,
            next_poll_at: now,
        };
        assert!(schedule.is_due(now));
        assert!(!schedule.is_due(now - Duration::seconds(1)));
    }
}
