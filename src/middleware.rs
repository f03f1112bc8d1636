use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::transport::Transport;

/// Boxed future threaded through the middleware chain.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One layer of the request pipeline.
///
/// Layers compose onion-style: work before `next.run(ctx)` is the
/// pre-phase, work after it resolves is the post-phase. Registration
/// order is entry order; post-phases run in reverse. A layer that never
/// invokes `next` short-circuits the call: the transport is not entered,
/// later layers do not run, and the layer is responsible for populating
/// `ctx.res` itself if it resolves successfully.
///
/// An `Err` from any layer rejects the chain; outer layers observe it as
/// the result of `next.run(ctx).await` and may recover or re-raise. A
/// layer that wants finalizer semantics binds that result instead of
/// propagating it with `?`.
///
/// Plain functions (and closures) with the matching signature implement
/// the trait directly:
///
/// ```
/// use courier::{BoxFuture, Context, Next, Result};
///
/// fn tag_requests<'a>(ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<()>> {
///     Box::pin(async move {
///         ctx.req.query_pairs.push(("traced".into(), "1".into()));
///         next.run(ctx).await
///     })
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, crate::Result<()>>;
}

impl std::fmt::Debug for dyn Middleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Middleware")
    }
}

impl<F> Middleware for F
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, crate::Result<()>>,
    F: Send + Sync + 'static,
{
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, crate::Result<()>> {
        (self)(ctx, next)
    }
}

/// The remainder of the pipeline: the layers registered after the current
/// one, terminated by the transport leaf.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    transport: &'a dyn Transport,
    middleware: &'a [Arc<dyn Middleware>],
}

impl<'a> Next<'a> {
    pub(crate) fn new(transport: &'a dyn Transport, middleware: &'a [Arc<dyn Middleware>]) -> Self {
        Self {
            transport,
            middleware,
        }
    }

    /// Run the rest of the chain against `ctx`; resolves once every inner
    /// layer and the transport have finished mutating it.
    pub fn run<'b>(self, ctx: &'b mut Context) -> BoxFuture<'b, crate::Result<()>>
    where
        'a: 'b,
    {
        match self.middleware.split_first() {
            Some((current, rest)) => current.handle(ctx, Next::new(self.transport, rest)),
            None => self.transport.execute(ctx),
        }
    }
}
