//! Exponential backoff with jitter for reconnection.

use std::time::Duration;

use rand::Rng;

/// Calculate the delay before reconnect attempt `attempt` (1-based).
///
/// Doubles from `base_ms` up to `max_ms`, plus up to 10% jitter so a fleet
/// of gateways does not reconnect in lockstep.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponent = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponent).min(max_ms);

    let jitter_range = delay_ms / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(delay_ms + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_grow_until_capped() {
        let b1 = calculate_backoff(1, 100, 2000);
        assert!(b1.as_millis() >= 100 && b1.as_millis() < 120);

        let b3 = calculate_backoff(3, 100, 2000);
        assert!(b3.as_millis() >= 400 && b3.as_millis() < 450);

        let capped = calculate_backoff(12, 100, 2000);
        assert!(capped.as_millis() >= 2000 && capped.as_millis() < 2210);
    }

    #[test]
    fn attempt_zero_is_immediate() {
        assert_eq!(calculate_backoff(0, 100, 2000), Duration::from_millis(0));
    }

    #[test]
    fn huge_attempt_does_not_overflow() {
        let d = calculate_backoff(64, 100, 5000);
        assert!(d.as_millis() >= 5000);
    }
}
