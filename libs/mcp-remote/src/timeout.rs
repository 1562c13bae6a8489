//! Initialization timeout policy (spec §4.5): the configured value is
//! clamped into `[2min, 5min]` so a misconfigured server neither blocks
//! startup indefinitely nor gets cut off before a slow handshake completes.

use std::time::Duration;

const MIN_INIT_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_INIT_TIMEOUT: Duration = Duration::from_secs(300);

pub fn effective_init_timeout(configured: Duration) -> Duration {
    configured.clamp(MIN_INIT_TIMEOUT, MAX_INIT_TIMEOUT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_floor_is_raised_to_two_minutes() {
        assert_eq!(effective_init_timeout(Duration::from_secs(5)), MIN_INIT_TIMEOUT);
    }

    #[test]
    fn above_ceiling_is_capped_to_five_minutes() {
        assert_eq!(effective_init_timeout(Duration::from_secs(600)), MAX_INIT_TIMEOUT);
    }

    #[test]
    fn value_within_range_is_unchanged() {
        let configured = Duration::from_secs(180);
        assert_eq!(effective_init_timeout(configured), configured);
    }
}
