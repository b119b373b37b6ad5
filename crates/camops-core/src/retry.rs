use crate::error::{OpsError, Result};
use std::time::Duration;

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// Bounded poll-with-timeout: fixed interval, fixed maximum attempt count,
/// error after exhausting attempts. Any action that waits on an external
/// dependency (database coming up, HTTP health endpoint) goes through this
/// instead of hand-rolling its own loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 15,
        }
    }
}

impl RetryPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Invoke `f` up to `max_attempts` times, sleeping `interval` between
    /// attempts. Returns the first success, or `RetryExhausted` carrying the
    /// last failure once attempts run out. `what` names the awaited thing
    /// for the error message.
    pub fn poll<T>(&self, what: &str, mut f: impl FnMut() -> Result<T>) -> Result<T> {
        let attempts = self.max_attempts.max(1);
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            match f() {
                Ok(v) => return Ok(v),
                Err(e) => {
                    tracing::debug!(what, attempt, error = %e, "poll attempt failed");
                    last_error = e.to_string();
                }
            }
            if attempt < attempts {
                std::thread::sleep(self.interval);
            }
        }
        Err(OpsError::RetryExhausted {
            what: what.to_string(),
            attempts,
            last_error,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(Duration::from_millis(1), max_attempts)
    }

    #[test]
    fn first_success_returns_immediately() {
        let calls = Cell::new(0);
        let out = fast(5)
            .poll("thing", || {
                calls.set(calls.get() + 1);
                Ok(42)
            })
            .unwrap();
        assert_eq!(out, 42);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn succeeds_after_transient_failures() {
        let calls = Cell::new(0);
        let out = fast(5).poll("thing", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(OpsError::Precondition("not ready".into()))
            } else {
                Ok("ready")
            }
        });
        assert_eq!(out.unwrap(), "ready");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn exhaustion_reports_attempts_and_last_error() {
        let calls = Cell::new(0u32);
        let err = fast(4)
            .poll::<()>("database", || {
                calls.set(calls.get() + 1);
                Err(OpsError::Precondition("still starting".into()))
            })
            .unwrap_err();
        assert_eq!(calls.get(), 4);
        match err {
            OpsError::RetryExhausted {
                what,
                attempts,
                last_error,
            } => {
                assert_eq!(what, "database");
                assert_eq!(attempts, 4);
                assert!(last_error.contains("still starting"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let calls = Cell::new(0);
        let _ = fast(0).poll::<()>("thing", || {
            calls.set(calls.get() + 1);
            Err(OpsError::Precondition("no".into()))
        });
        assert_eq!(calls.get(), 1);
    }
}
