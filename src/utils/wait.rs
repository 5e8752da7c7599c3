//! Bounded condition polling
//!
//! Every wait in the scenarios is a sleep-and-recheck loop with a fixed
//! interval and a hard deadline. Deadline expiry is an explicit
//! [`CheckError::Timeout`], never an indefinite hang.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::CheckError;

/// Interval and deadline for a polling loop
#[derive(Clone, Copy, Debug)]
pub struct PollOptions {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollOptions {
    pub fn new(interval_secs: u64, timeout_secs: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval_secs),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// Poll `check` until it yields `Some(value)` or the deadline elapses.
///
/// `check` errors propagate immediately; `Ok(None)` means "not yet". The
/// deadline is evaluated before each sleep, so the loop always runs at least
/// one attempt.
pub async fn poll_until<T, F, Fut>(what: &str, opts: PollOptions, mut check: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + opts.timeout;

    loop {
        if let Some(value) = check().await? {
            return Ok(value);
        }

        if Instant::now() + opts.interval > deadline {
            return Err(CheckError::timeout(what, opts.timeout.as_secs()).into());
        }

        debug!("Waiting for {what}");
        sleep(opts.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_poll_until_returns_on_success() {
        let attempts = AtomicU32::new(0);
        let opts = PollOptions {
            interval: Duration::from_millis(10),
            timeout: Duration::from_secs(5),
        };

        let result: Result<u32> = tokio_test::block_on(poll_until("counter", opts, || {
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok(if n >= 3 { Some(n) } else { None }) }
        }));

        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_poll_until_times_out() {
        let opts = PollOptions {
            interval: Duration::from_millis(10),
            timeout: Duration::from_millis(30),
        };

        let result: Result<()> =
            poll_until("never", opts, || async { Ok(None) }).await;

        let err = result.unwrap_err();
        match err.downcast_ref::<CheckError>() {
            Some(CheckError::Timeout { what, .. }) => assert_eq!(what, "never"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_poll_until_propagates_check_errors() {
        let opts = PollOptions::new(1, 5);

        let result: Result<()> = poll_until("broken", opts, || async {
            Err(anyhow::anyhow!("backend unavailable"))
        })
        .await;

        assert!(result.unwrap_err().to_string().contains("backend"));
    }
}
