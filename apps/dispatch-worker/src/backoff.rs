// [apps/dispatch-worker/src/backoff.rs]
//! Exponential backoff with jitter: `base · 2^(attempts-1) ·
//! jitter(0.5..1.5)`, capped at `max_backoff`. Pure aside from the
//! jitter draw, so the cap and growth rate are easy to test in
//! isolation from the random component.

use rand::Rng;

pub fn next_delay_seconds(base_seconds: f64, attempts: u32, max_backoff_seconds: f64) -> f64 {
    let exponent = attempts.saturating_sub(1);
    let growth = base_seconds * 2f64.powi(exponent as i32);
    let jitter = rand::thread_rng().gen_range(0.5..1.5);
    (growth * jitter).min(max_backoff_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_attempt_is_roughly_base() {
        let delay = next_delay_seconds(1.0, 1, 300.0);
        assert!((0.5..=1.5).contains(&delay), "delay was {delay}");
    }

    #[test]
    fn delay_grows_exponentially_with_attempts() {
        let delay = next_delay_seconds(1.0, 4, 300.0);
        assert!((4.0..=12.0).contains(&delay), "delay was {delay}");
    }

    #[test]
    fn delay_never_exceeds_cap() {
        let delay = next_delay_seconds(1.0, 20, 300.0);
        assert!(delay <= 300.0);
    }
}
