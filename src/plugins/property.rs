use serde_json::Value;
use tracing::debug;

use crate::context::Context;
use crate::middleware::{BoxFuture, Middleware, Next};

/// Middleware that assigns `value` at a dotted `path` inside the
/// [`Context`] before the rest of the pipeline runs.
///
/// Path resolution follows [`Context::set_path`]: `opts` paths traverse
/// and create intermediate maps, `req.timeout`, `retry_policy.max` and
/// `retry_policy.delay_ms` address the typed fields, and anything else is
/// ignored with a debug line.
pub fn set_property(path: impl Into<String>, value: impl Into<Value>) -> SetProperty {
    SetProperty {
        path: path.into(),
        value: value.into(),
    }
}

pub struct SetProperty {
    path: String,
    value: Value,
}

impl Middleware for SetProperty {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, crate::Result<()>> {
        Box::pin(async move {
            if !ctx.set_path(&self.path, self.value.clone()) {
                debug!(path = %self.path, "ignoring assignment to unknown context path");
            }
            next.run(ctx).await
        })
    }
}
