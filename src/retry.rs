//! Exponential-backoff retry for unreliable network operations.
//!
//! Every retried call in the application goes through [`RetryExecutor`] so
//! that backoff, jitter, and retry logging behave the same way at every call
//! site. Callers decide which errors are worth retrying by passing a
//! classifier; everything else is surfaced immediately.

use std::fmt;
use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::{error, warn};

/// Tuning knobs for a retried operation.
///
/// The defaults match the behavior used for token refresh and IAM calls:
/// five retries, half-second initial delay, doubling up to a minute, with
/// jitter to avoid synchronized retry storms across clients.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
  /// Maximum number of retries after the initial attempt.
  pub max_retries: u32,
  /// Delay before the first retry.
  pub base_delay: Duration,
  /// Ceiling applied to the computed delay.
  pub max_delay: Duration,
  /// Multiplier applied per retry.
  pub backoff_factor: f64,
  /// Scale each delay by a uniform random factor in `[0.5, 1.5)`.
  pub jitter: bool,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_retries: 5,
      base_delay: Duration::from_millis(500),
      max_delay: Duration::from_secs(60),
      backoff_factor: 2.0,
      jitter: true,
    }
  }
}

impl RetryPolicy {
  /// Compute the unjittered delay before retry number `attempt + 1`.
  ///
  /// # Arguments
  /// * `attempt` - Zero-based index of the attempt that just failed.
  ///
  /// # Returns
  /// `min(base_delay * backoff_factor^attempt, max_delay)`.
  pub fn delay_for(&self, attempt: u32) -> Duration {
    let raw = self.base_delay.as_secs_f64() * self.backoff_factor.powi(attempt as i32);
    Duration::from_secs_f64(raw.min(self.max_delay.as_secs_f64()))
  }

  /// Apply jitter to a computed delay, if enabled.
  fn jittered(&self, delay: Duration) -> Duration {
    if !self.jitter {
      return delay;
    }
    let factor: f64 = rand::thread_rng().gen_range(0.5..1.5);
    Duration::from_secs_f64(delay.as_secs_f64() * factor)
  }
}

/// Details handed to a [`RetryObserver`] before each sleep.
pub struct RetryEvent<'a> {
  /// Retry number, starting at 1 for the first retry.
  pub attempt: u32,
  /// Delay that will be slept after the observer returns.
  pub delay: Duration,
  /// The error that triggered this retry.
  pub error: &'a dyn fmt::Display,
  /// Name of the operation being retried, for logs and metrics.
  pub operation: &'a str,
}

/// Sink for per-retry notifications (metrics counters, progress output).
///
/// Observer failures are logged and swallowed; they never affect the retry
/// loop itself.
pub trait RetryObserver {
  /// Called once per retry, before the backoff sleep.
  fn on_retry(&mut self, event: &RetryEvent<'_>) -> anyhow::Result<()>;
}

/// Error returned by [`RetryExecutor::execute`].
#[derive(Debug)]
pub enum RetryError<E> {
  /// The retry ceiling was reached; carries the last underlying error.
  Exhausted {
    /// Number of retries performed (not counting the initial attempt).
    attempts: u32,
    /// The error from the final attempt.
    last: E,
  },
  /// The operation failed with an error the classifier deemed non-retryable.
  Aborted(E),
}

impl<E> RetryError<E> {
  /// Unwrap the underlying error regardless of variant.
  pub fn into_inner(self) -> E {
    match self {
      Self::Exhausted { last, .. } => last,
      Self::Aborted(err) => err,
    }
  }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Exhausted { attempts, last } => {
        write!(f, "operation failed after {attempts} retries: {last}")
      }
      Self::Aborted(err) => write!(f, "{err}"),
    }
  }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Exhausted { last, .. } => Some(last),
      Self::Aborted(err) => Some(err),
    }
  }
}

/// Runs fallible operations with exponential backoff.
pub struct RetryExecutor<'a> {
  policy: RetryPolicy,
  observer: Option<&'a mut dyn RetryObserver>,
}

impl<'a> RetryExecutor<'a> {
  /// Create an executor with the given policy and no observer.
  pub fn new(policy: RetryPolicy) -> Self {
    Self { policy, observer: None }
  }

  /// Create an executor that reports each retry to `observer`.
  pub fn with_observer(policy: RetryPolicy, observer: &'a mut dyn RetryObserver) -> Self {
    Self {
      policy,
      observer: Some(observer),
    }
  }

  /// Run `op`, retrying on errors the classifier accepts.
  ///
  /// The first attempt runs immediately. A non-retryable error is returned
  /// at once as [`RetryError::Aborted`] without consuming a retry slot. Once
  /// `max_retries` retries have been spent, the last error is returned as
  /// [`RetryError::Exhausted`].
  ///
  /// # Arguments
  /// * `operation` - Name used in logs and observer events.
  /// * `is_retryable` - Classifier deciding which errors trigger a retry.
  /// * `op` - The operation to run.
  pub fn execute<T, E, F, R>(&mut self, operation: &str, is_retryable: R, mut op: F) -> Result<T, RetryError<E>>
  where
    E: fmt::Display,
    F: FnMut() -> Result<T, E>,
    R: Fn(&E) -> bool,
  {
    let mut attempt: u32 = 0;

    loop {
      match op() {
        Ok(value) => return Ok(value),
        Err(err) if !is_retryable(&err) => return Err(RetryError::Aborted(err)),
        Err(err) => {
          if attempt >= self.policy.max_retries {
            error!(
              "{operation} failed after {} retries: {err}",
              self.policy.max_retries
            );
            return Err(RetryError::Exhausted { attempts: attempt, last: err });
          }

          let delay = self.policy.jittered(self.policy.delay_for(attempt));
          attempt += 1;

          warn!(
            "retry {attempt}/{} for {operation} after error: {err}; waiting {:.2}s",
            self.policy.max_retries,
            delay.as_secs_f64()
          );

          if let Some(observer) = self.observer.as_mut() {
            let event = RetryEvent {
              attempt,
              delay,
              error: &err,
              operation,
            };
            if let Err(observer_err) = observer.on_retry(&event) {
              // Observers are best-effort; a broken metrics sink must not
              // break the retry loop.
              error!("retry observer failed for {operation}: {observer_err}");
            }
          }

          thread::sleep(delay);
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
      max_retries,
      base_delay: Duration::from_millis(1),
      max_delay: Duration::from_millis(4),
      backoff_factor: 2.0,
      jitter: false,
    }
  }

  #[test]
  fn test_delay_sequence_doubles_and_caps() {
    let policy = RetryPolicy {
      max_retries: 10,
      base_delay: Duration::from_secs(1),
      max_delay: Duration::from_secs(60),
      backoff_factor: 2.0,
      jitter: false,
    };

    let delays: Vec<f64> = (0..8).map(|a| policy.delay_for(a).as_secs_f64()).collect();
    assert_eq!(delays, vec![1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 60.0, 60.0]);
  }

  #[test]
  fn test_jittered_delay_stays_in_bounds() {
    let policy = RetryPolicy {
      jitter: true,
      ..fast_policy(3)
    };
    let base = Duration::from_secs(8);

    for _ in 0..256 {
      let jittered = policy.jittered(base).as_secs_f64();
      assert!(jittered >= 4.0, "expected {jittered} >= 4.0");
      assert!(jittered < 12.0, "expected {jittered} < 12.0");
    }
  }

  #[test]
  fn test_retry_ceiling_performs_initial_attempt_plus_retries() {
    let mut calls = 0;
    let mut executor = RetryExecutor::new(fast_policy(3));

    let result: Result<(), _> = executor.execute(
      "always-fails",
      |_| true,
      || {
        calls += 1;
        Err("transient failure")
      },
    );

    assert_eq!(calls, 4);
    match result {
      Err(RetryError::Exhausted { attempts, last }) => {
        assert_eq!(attempts, 3);
        assert_eq!(last, "transient failure");
      }
      other => panic!("expected Exhausted, got {other:?}"),
    }
  }

  #[test]
  fn test_non_retryable_error_propagates_immediately() {
    let mut calls = 0;
    let mut executor = RetryExecutor::new(fast_policy(5));

    let result: Result<(), _> = executor.execute(
      "bad-request",
      |_| false,
      || {
        calls += 1;
        Err("permanent failure")
      },
    );

    assert_eq!(calls, 1);
    assert!(matches!(result, Err(RetryError::Aborted("permanent failure"))));
  }

  #[test]
  fn test_succeeds_after_transient_failures() {
    let mut calls = 0;
    let mut executor = RetryExecutor::new(fast_policy(5));

    let result = executor.execute(
      "flaky",
      |_| true,
      || {
        calls += 1;
        if calls < 3 { Err("transient") } else { Ok(calls) }
      },
    );

    assert_eq!(result.unwrap(), 3);
    assert_eq!(calls, 3);
  }

  struct CountingObserver {
    attempts_seen: Vec<u32>,
    fail: bool,
  }

  impl RetryObserver for CountingObserver {
    fn on_retry(&mut self, event: &RetryEvent<'_>) -> anyhow::Result<()> {
      self.attempts_seen.push(event.attempt);
      if self.fail {
        anyhow::bail!("metrics sink unavailable");
      }
      Ok(())
    }
  }

  #[test]
  fn test_observer_sees_one_based_attempt_numbers() {
    let mut observer = CountingObserver {
      attempts_seen: Vec::new(),
      fail: false,
    };

    {
      let mut executor = RetryExecutor::with_observer(fast_policy(2), &mut observer);
      let _: Result<(), _> = executor.execute("observed", |_| true, || Err("nope"));
    }

    assert_eq!(observer.attempts_seen, vec![1, 2]);
  }

  #[test]
  fn test_observer_failure_does_not_affect_retry_loop() {
    let mut observer = CountingObserver {
      attempts_seen: Vec::new(),
      fail: true,
    };

    let mut calls = 0;
    let result = {
      let mut executor = RetryExecutor::with_observer(fast_policy(2), &mut observer);
      executor.execute(
        "observed-flaky",
        |_| true,
        || {
          calls += 1;
          if calls < 2 { Err("transient") } else { Ok(calls) }
        },
      )
    };

    assert_eq!(result.unwrap(), 2);
    assert_eq!(observer.attempts_seen, vec![1]);
  }

  #[test]
  fn test_into_inner_unwraps_both_variants() {
    let exhausted: RetryError<&str> = RetryError::Exhausted {
      attempts: 2,
      last: "late",
    };
    let aborted: RetryError<&str> = RetryError::Aborted("early");

    assert_eq!(exhausted.into_inner(), "late");
    assert_eq!(aborted.into_inner(), "early");
  }
}
