use std::fmt::Display;
use std::thread;
use std::time::Duration;
use log::warn;

/// Errors that can tell whether trying again may succeed
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Bounded retry with linear backoff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, delay: Duration::from_millis(500) }
    }
}

/// Calls the given function until it succeeds, fails with a non transient error or the
/// policy runs out of attempts. The sleep between attempts grows linearly with the
/// number of failed attempts.
///
/// # Arguments
///
/// * 'policy' - max attempts and base delay
/// * 'what' - description of the call, used when logging failed attempts
/// * 'f' - the fallible call
pub fn retry_with<T, E, F>(policy: &RetryPolicy, what: &str, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: Transient + Display,
{
    let mut attempt: u32 = 1;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                warn!("{} failed (attempt {}/{}): {}", what, attempt, policy.max_attempts, e);
                thread::sleep(policy.delay * attempt);
                attempt += 1;
            },
            Err(e) => return Err(e),
        }
    }
}

/// Retries a fallible call according to a RetryPolicy, see retry_with
#[macro_export]
macro_rules! retry {
    ($policy:expr, $what:expr, $f:expr) => {
        $crate::retry::retry_with(&$policy, $what, $f)
    };
}
