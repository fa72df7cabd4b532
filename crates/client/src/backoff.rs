//! Retry backoff schedule.
//!
//! Failed submissions retry with exponential backoff, capped so a
//! stalled service does not park a run for minutes between attempts.

use std::time::Duration;

/// An exponential backoff schedule.
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    /// Delay before the first retry.
    pub initial: Duration,
    /// Multiplier applied per retry.
    pub factor: f64,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Total attempts, including the first.
    pub max_attempts: usize,
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(2),
            factor: 2.0,
            max_delay: Duration::from_secs(60),
            max_attempts: 10,
        }
    }
}

impl BackoffSchedule {
    /// Delay before retry `attempt` (1-based). Attempt 0 is the initial
    /// request and has no delay.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exponent = (attempt - 1) as i32;
        let scaled = self.initial.as_secs_f64() * self.factor.powi(exponent);
        Duration::from_secs_f64(scaled.min(self.max_delay.as_secs_f64()))
    }
}
