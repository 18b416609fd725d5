//! Reconnect backoff policy.
//!
//! The facade reconnects with a linear backoff: the n-th attempt waits
//! `base_delay * n`, and no attempt is scheduled once `max_attempts` have been
//! used. This is independent of any retry logic inside the wrapped chain
//! libraries.

use std::time::Duration;

/// Linear reconnect policy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
	/// Maximum number of reconnect attempts before giving up
	pub max_attempts: u32,

	/// Base delay, multiplied by the attempt number
	pub base_delay: Duration,
}

impl ReconnectPolicy {
	/// Creates a new policy
	pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
		Self {
			max_attempts,
			base_delay,
		}
	}

	/// Whether another attempt may be scheduled after `attempts_made` attempts
	pub fn can_retry(&self, attempts_made: u32) -> bool {
		attempts_made < self.max_attempts
	}

	/// Delay before the given 1-based attempt, or `None` when the attempt is
	/// out of range
	pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
		if attempt == 0 || attempt > self.max_attempts {
			return None;
		}
		Some(self.base_delay.saturating_mul(attempt))
	}
}
