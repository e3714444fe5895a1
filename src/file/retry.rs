use std::{fmt::Display, io, num::NonZeroU32, time::Duration};

use backoff::backoff::{Backoff, Constant};
use serde::{Deserialize, Serialize};

use super::FileErr;

/// Serializable retry settings, validated into a [`Retry`] with
/// [`Retry::from_config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total number of attempts, including the first.
    pub tries: u32,

    /// Pause between attempts, in milliseconds.
    #[serde(rename = "delay_ms", with = "millis")]
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { tries: 1, delay: Duration::ZERO }
    }
}

/// A validated retry policy: a fixed number of attempts with an optional
/// fixed pause between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retry {
    tries: NonZeroU32,
    delay: Duration,
}

impl Retry {
    /// A single attempt.
    pub const ONCE: Retry = Retry { tries: NonZeroU32::MIN, delay: Duration::ZERO };

    /// Fails with [`FileErr::Tries`] if `tries` is zero.
    pub fn new(tries: u32) -> Result<Self, FileErr> {
        let tries = NonZeroU32::new(tries).ok_or(FileErr::Tries(tries))?;
        Ok(Self { tries, delay: Duration::ZERO })
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn from_config(config: &RetryConfig) -> Result<Self, FileErr> {
        Ok(Self::new(config.tries)?.with_delay(config.delay))
    }

    #[inline]
    pub fn tries(&self) -> u32 {
        self.tries.get()
    }

    #[inline]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Calls `op` until it succeeds, the error is not `retryable`, or every
    /// attempt is spent. Returns the last error on failure.
    pub fn run<T, E: Display>(
        &self,
        mut op: impl FnMut() -> Result<T, E>,
        retryable: impl Fn(&E) -> bool,
    ) -> Result<T, E> {
        let tries = self.tries();
        let mut attempt = 1;
        let classify = || {
            op().map_err(|err| {
                if retryable(&err) {
                    backoff::Error::transient(err)
                } else {
                    backoff::Error::permanent(err)
                }
            })
        };
        let notify = |err: E, delay: Duration| {
            tracing::warn!(attempt, tries, error = %err, ?delay, "attempt failed, retrying");
            attempt += 1;
        };

        backoff::retry_notify(Attempts::new(self), classify, notify).map_err(|err| match err {
            backoff::Error::Permanent(err) => err,
            backoff::Error::Transient { err, .. } => err,
        })
    }
}

/// A constant backoff which gives up once `tries - 1` retries are spent.
struct Attempts {
    delay: Constant,
    retries: u32,
    left: u32,
}

impl Attempts {
    fn new(retry: &Retry) -> Self {
        let retries = retry.tries() - 1;
        Self { delay: Constant::new(retry.delay), retries, left: retries }
    }
}

impl Backoff for Attempts {
    fn reset(&mut self) {
        self.left = self.retries;
        self.delay.reset();
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        self.left = self.left.checked_sub(1)?;
        self.delay.next_backoff()
    }
}

impl Default for Retry {
    fn default() -> Self {
        Self::ONCE
    }
}

/// Returns true for I/O errors which may succeed when repeated.
pub fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
            | io::ErrorKind::ResourceBusy
    )
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(delay: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
