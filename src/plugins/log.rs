use std::sync::Arc;

use tracing::{info, warn};

use crate::context::Context;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::retry::retryable;

/// Sink for the request logger. The default forwards to `tracing`.
pub trait RequestLog: Send + Sync {
    fn info(&self, line: &str);
    fn warn(&self, line: &str);
}

struct TracingLog;

impl RequestLog for TracingLog {
    fn info(&self, line: &str) {
        info!("{line}");
    }

    fn warn(&self, line: &str) {
        warn!("{line}");
    }
}

/// Request logger emitting through `tracing`.
///
/// Successful calls log one info line, `"<METHOD> <URL> <status>
/// <elapsed> ms"`; the elapsed segment is omitted when time capture is
/// disabled. Failed attempts the retry engine is about to re-run log a
/// warn line prefixed with the 1-based attempt number.
pub fn logger() -> Logger {
    logger_with(TracingLog)
}

/// Request logger emitting through a caller-supplied sink.
pub fn logger_with<L>(log: L) -> Logger
where
    L: RequestLog + 'static,
{
    Logger { log: Arc::new(log) }
}

pub struct Logger {
    log: Arc<dyn RequestLog>,
}

impl Middleware for Logger {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, crate::Result<()>> {
        Box::pin(async move {
            let result = next.run(ctx).await;
            match &result {
                Ok(()) => {
                    if let Some(line) = success_line(ctx) {
                        self.log.info(&line);
                    }
                }
                Err(error) => {
                    // Warn only when the engine is about to re-run the
                    // attempt; terminal failures surface to the caller.
                    if retryable(error) && ctx.retries.len() < ctx.retry_policy.max {
                        self.log.warn(&attempt_line(ctx, error.status()));
                    }
                }
            }
            result
        })
    }
}

fn elapsed_segment(ctx: &Context) -> String {
    match ctx.res.as_ref().and_then(|res| res.elapsed) {
        Some(elapsed) => format!(" {} ms", elapsed.as_millis()),
        None => String::new(),
    }
}

fn success_line(ctx: &Context) -> Option<String> {
    let res = ctx.res.as_ref()?;
    Some(format!(
        "{} {} {}{}",
        ctx.req.method,
        ctx.req.url,
        res.status.as_u16(),
        elapsed_segment(ctx),
    ))
}

fn attempt_line(ctx: &Context, status: Option<u16>) -> String {
    let attempt = ctx.retries.len() + 1;
    let mut line = format!("Attempt {attempt} {} {}", ctx.req.method, ctx.req.url);
    let status = status.or_else(|| ctx.res.as_ref().map(|res| res.status.as_u16()));
    if let Some(status) = status {
        line.push_str(&format!(" {status}"));
    }
    line.push_str(&elapsed_segment(ctx));
    line
}
