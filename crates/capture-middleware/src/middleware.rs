//! Core middleware trait and the continuation type.
//!
//! Every gate implements [`Middleware`]. A gate receives the request context,
//! the request, and a [`Next`] continuation. Calling `next.run` passes the
//! request deeper; returning without calling it short-circuits the chain.
//! Failures are returned as `Err(CaptureError)` and travel back up to the
//! recovery gate, which renders them.
//!
//! # Example
//!
//! ```ignore
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut MiddlewareContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, CaptureResult<Response>> {
//!         Box::pin(async move {
//!             let response = next.run(ctx, request).await;
//!             tracing::debug!(elapsed = ?ctx.elapsed(), "done");
//!             response
//!         })
//!     }
//! }
//! ```

use crate::context::MiddlewareContext;
use crate::types::{Request, Response};
use capture_core::CaptureResult;

pub use capture_core::BoxFuture;

/// Terminal handler invoked after every gate has passed.
pub type HandlerFn<'a> = Box<
    dyn FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, CaptureResult<Response>>
        + Send
        + 'a,
>;

/// A request gate.
///
/// # Invariants
///
/// - A gate calls `next.run()` at most once
/// - A gate that short-circuits never calls `next.run()`
pub trait Middleware: Send + Sync + 'static {
    /// Returns the stage name, used in logs.
    fn name(&self) -> &'static str;

    /// Processes the request, optionally delegating to `next`.
    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, CaptureResult<Response>>;
}

/// Continuation to the rest of the chain.
///
/// Consumed by [`Next::run`], so it can only be invoked once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Handler(HandlerFn<'a>),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that invokes `middleware` before `next`.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes the handler.
    pub fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, CaptureResult<Response>>
            + Send
            + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invokes the next gate or the handler.
    pub async fn run(self, ctx: &mut MiddlewareContext, request: Request) -> CaptureResult<Response> {
        match self.inner {
            NextInner::Chain { middleware, next } => {
                ctx.record_stage(middleware.name());
                middleware.process(ctx, request, *next).await
            }
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}
