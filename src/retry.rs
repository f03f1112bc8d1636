use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::context::{Attempt, Context};
use crate::error::Error;
use crate::middleware::{Middleware, Next};
use crate::transport::Transport;

pub(crate) const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Attempt budget and fixed inter-attempt delay for one call.
///
/// `max` counts re-attempts beyond the first call. `max == 0` disables
/// retries entirely and the delay is never applied, whatever its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max: usize,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max: usize, delay: Duration) -> Self {
        Self { max, delay }
    }

    pub const fn disabled() -> Self {
        Self::new(0, DEFAULT_RETRY_DELAY)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

/// A failure is worth re-attempting when the transport timed out or a
/// middleware surfaced a server-class status. Client statuses and
/// failures without a status code are terminal.
pub(crate) fn retryable(error: &Error) -> bool {
    match error {
        Error::Timeout { .. } => true,
        _ => error.status().is_some_and(|status| status >= 500),
    }
}

/// Drive the composed chain until it resolves, fails terminally, or the
/// retry budget runs out.
///
/// Middleware observe every individual attempt; this loop observes each
/// attempt's final outcome. A retry records the failure in `ctx.retries`,
/// sleeps the configured delay and clears `ctx.res` before re-entering
/// the chain. The returned error is always the last attempt's.
pub(crate) async fn run_with_retries(
    transport: &dyn Transport,
    middleware: &[Arc<dyn Middleware>],
    ctx: &mut Context,
) -> crate::Result<()> {
    loop {
        let error = match Next::new(transport, middleware).run(ctx).await {
            Ok(()) => return Ok(()),
            Err(error) => error,
        };
        if !retryable(&error) || ctx.retries.len() >= ctx.retry_policy.max {
            return Err(error);
        }
        ctx.retries.push(Attempt {
            status: error.status(),
            reason: error.to_string(),
        });
        debug!(
            attempt = ctx.retries.len(),
            delay_ms = ctx.retry_policy.delay.as_millis() as u64,
            "re-attempting after transient failure"
        );
        if !ctx.retry_policy.delay.is_zero() {
            sleep(ctx.retry_policy.delay).await;
        }
        ctx.res = None;
    }
}
