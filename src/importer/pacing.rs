//! Request pacing driven by the API's quota and backoff signals
//!
//! After each response the [`RateLimiter`] records the remaining quota and
//! schedules a resume time. Before the next request the importer waits for
//! that time through a [`Clock`], which tests replace with a manual one.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Upper bound on any single scheduled pause
pub const MAX_PAUSE: Duration = Duration::from_secs(24 * 60 * 60);

/// Time source and sleep hook
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Real clock backed by the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How long to hold off after the API signals pressure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    /// Pause once `quota_remaining` reaches zero
    pub quota_pause: Duration,
    /// Added on top of every explicit `backoff` hint
    pub backoff_padding: Duration,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            quota_pause: Duration::from_secs(10),
            backoff_padding: Duration::from_secs(5),
        }
    }
}

impl PacingPolicy {
    /// Pause owed after a response with the given signals, if any.
    ///
    /// Capped at [`MAX_PAUSE`].
    pub fn pause_for(&self, quota_remaining: i64, backoff_secs: Option<u64>) -> Option<Duration> {
        let mut pause = Duration::ZERO;
        if quota_remaining <= 0 {
            pause = pause.saturating_add(self.quota_pause);
        }
        if let Some(backoff) = backoff_secs {
            pause = pause
                .saturating_add(Duration::from_secs(backoff))
                .saturating_add(self.backoff_padding);
        }
        (!pause.is_zero()).then_some(pause.min(MAX_PAUSE))
    }
}

pub struct RateLimiter {
    policy: PacingPolicy,
    clock: Arc<dyn Clock>,
    quota_remaining: Option<i64>,
    resume_at: Option<Instant>,
}

impl RateLimiter {
    pub fn new(policy: PacingPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy,
            clock,
            quota_remaining: None,
            resume_at: None,
        }
    }

    /// Last quota reported by the API (`None` before the first response)
    pub fn quota_remaining(&self) -> Option<i64> {
        self.quota_remaining
    }

    pub fn resume_at(&self) -> Option<Instant> {
        self.resume_at
    }

    /// Record the signals of a response and schedule the next resume time.
    ///
    /// Returns the pause that was scheduled. A later resume time already on
    /// the books is never pulled forward.
    pub fn observe(&mut self, quota_remaining: i64, backoff_secs: Option<u64>) -> Option<Duration> {
        self.quota_remaining = Some(quota_remaining);

        let pause = self.policy.pause_for(quota_remaining, backoff_secs)?;
        let now = self.clock.now();
        let candidate = now
            .checked_add(pause)
            .or_else(|| now.checked_add(MAX_PAUSE))
            .unwrap_or(now);
        self.resume_at = Some(match self.resume_at {
            Some(existing) if existing > candidate => existing,
            _ => candidate,
        });

        tracing::debug!(
            quota_remaining,
            backoff = ?backoff_secs,
            pause_secs = pause.as_secs(),
            "Scheduled pause before next request"
        );
        Some(pause)
    }

    /// Block until the scheduled resume time. Returns how long it slept.
    pub async fn wait_turn(&mut self) -> Duration {
        let Some(resume_at) = self.resume_at.take() else {
            return Duration::ZERO;
        };

        let now = self.clock.now();
        if resume_at <= now {
            return Duration::ZERO;
        }

        let wait = resume_at - now;
        tracing::info!(wait_secs = wait.as_secs(), "Pausing for API rate limit");
        self.clock.sleep(wait).await;
        wait
    }
}
