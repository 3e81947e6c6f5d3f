//! Supervised reconnect policy.
//!
//! Disabled by default: a dropped connection leaves the room read-only until
//! the caller retries explicitly. When enabled, reconnects are capped and
//! spaced with exponential backoff plus jitter, and never attempted after the
//! server rejected the caller.

use std::time::Duration;

use rand::Rng;
use turf_proto::CloseReason;

/// Default first backoff step.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Default backoff ceiling.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Reconnect schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Attempts allowed per outage. 0 disables reconnecting.
    pub max_attempts: u32,
    /// Delay before the first attempt (before jitter).
    pub base_delay: Duration,
    /// Upper bound for any delay.
    pub max_delay: Duration,
}

impl ReconnectPolicy {
    /// Never reconnect automatically.
    pub fn disabled() -> Self {
        Self { max_attempts: 0, base_delay: DEFAULT_BASE_DELAY, max_delay: DEFAULT_MAX_DELAY }
    }

    /// Reconnect up to `max_attempts` times with default delays.
    pub fn exponential(max_attempts: u32) -> Self {
        Self { max_attempts, ..Self::disabled() }
    }

    /// Delay before attempt number `attempt` (0-based) after `reason`.
    ///
    /// Returns `None` when the policy is disabled, attempts are used up, or
    /// `reason` is a rejection. The delay is `base * 2^attempt` capped at
    /// `max_delay`, then jittered uniformly into `[d/2, d]`.
    pub fn next_delay<R: Rng + ?Sized>(
        &self,
        reason: CloseReason,
        attempt: u32,
        rng: &mut R,
    ) -> Option<Duration> {
        if reason.is_rejection() || attempt >= self.max_attempts {
            return None;
        }

        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        let ceiling = self.base_delay.saturating_mul(factor).min(self.max_delay);

        let ceiling_ms = u64::try_from(ceiling.as_millis()).unwrap_or(u64::MAX);
        let floor_ms = ceiling_ms / 2;
        let jittered = rng.gen_range(floor_ms..=ceiling_ms);
        Some(Duration::from_millis(jittered))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}
