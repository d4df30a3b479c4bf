use std::time::Duration;

/// Backoff progress of a single logical call.
///
/// The value is immutable: [`RetryState::next`] returns the state for the
/// following attempt instead of mutating in place, so a reissued request
/// always carries exactly the counter it was scheduled with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryState {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Base delay in milliseconds, doubled on every retry.
    pub base_delay_ms: u64,
    /// Upper bound for a single delay in milliseconds.
    pub max_delay_ms: u64,
    /// Number of retries scheduled so far.
    pub attempt: u32,
}

impl RetryState {
    /// Fresh state for a new call. `base_delay_ms` is clamped to at least 1.
    pub fn new(max_retries: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms: base_delay_ms.max(1),
            max_delay_ms,
            attempt: 0,
        }
    }

    /// State for the next retry, or `None` once the budget is exhausted.
    pub fn next(self) -> Option<Self> {
        let attempt = self.attempt.saturating_add(1);
        if attempt > self.max_retries {
            return None;
        }
        Some(Self { attempt, ..self })
    }

    /// Delay to wait before issuing this attempt:
    /// `min(base_delay_ms * 2^attempt, max_delay_ms)`.
    pub fn delay(&self) -> Duration {
        let multiplier = 1u64.checked_shl(self.attempt).unwrap_or(u64::MAX);
        let delay_ms = self
            .base_delay_ms
            .saturating_mul(multiplier)
            .min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::RetryState;

    #[test]
    fn delays_double_per_attempt() {
        let first = RetryState::new(3, 1_000, 30_000).next().unwrap();
        let second = first.next().unwrap();
        let third = second.next().unwrap();

        assert_eq!(first.delay(), Duration::from_millis(2_000));
        assert_eq!(second.delay(), Duration::from_millis(4_000));
        assert_eq!(third.delay(), Duration::from_millis(8_000));
        assert_eq!(third.next(), None);
    }

    #[test]
    fn delay_is_capped() {
        let mut state = RetryState::new(40, 1_000, 30_000);
        for _ in 0..5 {
            state = state.next().unwrap();
        }
        assert_eq!(state.delay(), Duration::from_millis(30_000));

        for _ in 0..35 {
            state = state.next().unwrap();
        }
        assert_eq!(state.attempt, 40);
        assert_eq!(state.delay(), Duration::from_millis(30_000));
    }

    #[test]
    fn zero_retries_abandons_immediately() {
        assert_eq!(RetryState::new(0, 250, 30_000).next(), None);
    }

    #[test]
    fn base_delay_is_never_zero() {
        let state = RetryState::new(1, 0, 30_000).next().unwrap();
        assert_eq!(state.base_delay_ms, 1);
        assert_eq!(state.delay(), Duration::from_millis(2));
    }
}
