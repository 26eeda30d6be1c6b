//! Polling for eventually-consistent reads.
//!
//! A [`Poller`] invokes a read until a predicate accepts its result or the
//! attempt budget runs out, sleeping a fixed delay between attempts. A read
//! that fails is returned to the caller at once; only "not yet satisfied"
//! results consume the budget.
//!
//! ```rust,no_run
//! use adprobe::poll::{PollConfig, Poller};
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), String> {
//! let poller = Poller::new(PollConfig::new(5, Duration::from_millis(200)).unwrap());
//! let outcome = poller
//!     .poll_non_empty(|| async { Ok::<Vec<u32>, String>(vec![1]) })
//!     .await?;
//! assert!(outcome.is_satisfied());
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod outcome;

use crate::error::{AdprobeError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

pub use cancel::{cancel_pair, CancelHandle, CancelReason, CancelToken};
pub use outcome::{HasItems, PollOutcome};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Attempt budget and pacing for a [`Poller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    max_attempts: u32,
    delay: Duration,
    deadline: Option<Duration>,
}

impl PollConfig {
    /// # Errors
    ///
    /// Returns [`AdprobeError::Config`] if `max_attempts` is zero.
    pub fn new(max_attempts: u32, delay: Duration) -> Result<Self> {
        if max_attempts == 0 {
            return Err(AdprobeError::Config(
                "poll max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            max_attempts,
            delay,
            deadline: None,
        })
    }

    /// Overall time limit for one poll, counted from its first read.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}

impl Default for PollConfig {
    /// 5 attempts, 1 second apart, no deadline.
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_DELAY,
            deadline: None,
        }
    }
}

/// Stateless apart from its configuration; one value can serve any number of
/// concurrent polls.
#[derive(Debug, Clone, Default)]
pub struct Poller {
    config: PollConfig,
    cancel: Option<CancelToken>,
}

impl Poller {
    pub fn new(config: PollConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Read until `satisfied` accepts the result.
    ///
    /// Returns `Ok(Satisfied)` as soon as a read satisfies the predicate,
    /// `Ok(Exhausted)` with the last read once `max_attempts` reads have
    /// been made, and `Ok(Cancelled)` if the cancel token fires or the
    /// deadline passes. There is no delay after the final read.
    ///
    /// # Errors
    ///
    /// The first `Err` produced by `op` is returned unchanged, before any
    /// further delay or read.
    pub async fn poll_until<T, E, F, Fut, P>(
        &self,
        mut op: F,
        mut satisfied: P,
    ) -> std::result::Result<PollOutcome<T>, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        P: FnMut(&T) -> bool,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let deadline = self.config.deadline.map(|d| Instant::now() + d);
        let mut last: Option<T> = None;
        let mut attempts: u32 = 0;

        loop {
            if let Some(reason) = self.interrupted_now(deadline) {
                return Ok(cancelled(last, attempts, reason));
            }

            let value = tokio::select! {
                biased;
                reason = interruption(self.cancel.as_ref(), deadline) => {
                    return Ok(cancelled(last, attempts, reason));
                }
                read = op() => read?,
            };
            attempts += 1;

            if satisfied(&value) {
                tracing::debug!(attempts, max_attempts, "poll satisfied");
                return Ok(PollOutcome::Satisfied { value, attempts });
            }

            if attempts >= max_attempts {
                tracing::info!(
                    "poll exhausted after {} attempts without a satisfying read",
                    attempts
                );
                return Ok(PollOutcome::Exhausted { value, attempts });
            }

            tracing::debug!(
                attempt = attempts,
                max_attempts,
                delay_ms = self.config.delay.as_millis() as u64,
                "poll not yet satisfied, retrying"
            );
            last = Some(value);

            tokio::select! {
                biased;
                reason = interruption(self.cancel.as_ref(), deadline) => {
                    return Ok(cancelled(last, attempts, reason));
                }
                _ = tokio::time::sleep(self.config.delay) => {}
            }
        }
    }

    /// [`Poller::poll_until`] with the non-empty-collection predicate.
    pub async fn poll_non_empty<T, E, F, Fut>(
        &self,
        op: F,
    ) -> std::result::Result<PollOutcome<T>, E>
    where
        T: HasItems,
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        self.poll_until(op, |value: &T| value.has_items()).await
    }

    fn interrupted_now(&self, deadline: Option<Instant>) -> Option<CancelReason> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Some(CancelReason::Signal);
        }
        match deadline {
            Some(d) if Instant::now() >= d => Some(CancelReason::Deadline),
            _ => None,
        }
    }
}

fn cancelled<T>(last: Option<T>, attempts: u32, reason: CancelReason) -> PollOutcome<T> {
    tracing::info!(attempts, ?reason, "poll cancelled");
    PollOutcome::Cancelled {
        last,
        attempts,
        reason,
    }
}

/// Resolves with the first of: the cancel token firing, the deadline passing.
/// Never resolves when neither is configured.
async fn interruption(cancel: Option<&CancelToken>, deadline: Option<Instant>) -> CancelReason {
    let signal = async {
        match cancel {
            Some(token) => token.cancelled().await,
            None => std::future::pending::<()>().await,
        }
    };
    let timer = async {
        match deadline {
            Some(d) => tokio::time::sleep_until(d).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        biased;
        _ = signal => CancelReason::Signal,
        _ = timer => CancelReason::Deadline,
    }
}
