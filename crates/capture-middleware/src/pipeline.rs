//! Fixed-order gate pipeline.
//!
//! Every capture request passes through four gates, outermost first:
//!
//! 1. **Recovery** - converts failures and panics into error envelopes
//! 2. **Method** - rejects anything but POST
//! 3. **Auth** - checks Basic credentials
//! 4. **Validation** - schema check, decode, semantic validation
//!
//! [`Pipeline::capture`] always assembles exactly this order. The generic
//! [`PipelineBuilder`] exists for tests and tooling.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::stages::{
    AuthMiddleware, BodyLimits, Credentials, MethodMiddleware, RecoveryMiddleware,
    ValidationMiddleware,
};
use crate::types::{Request, Response};
use capture_core::{CaptureResult, SchemaValidator};
use std::sync::Arc;

/// A type-erased gate.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An ordered, immutable chain of gates.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::capture(credentials, Arc::new(SchemaValidator::new()?));
/// let response = pipeline
///     .process(MiddlewareContext::new(), request, |ctx, _req| {
///         let entry = ctx.take_entry();
///         Box::pin(async move { /* save entry */ })
///     })
///     .await?;
/// ```
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates an empty pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Creates the capture pipeline: recovery, method, auth, validation.
    #[must_use]
    pub fn capture(credentials: Credentials, schema: Arc<SchemaValidator>) -> Self {
        Self::capture_with_limits(credentials, schema, BodyLimits::default())
    }

    /// Creates the capture pipeline with explicit body limits.
    ///
    /// The body is read by the validation gate, so a request refused by the
    /// method or auth gate is answered without reading it.
    #[must_use]
    pub fn capture_with_limits(
        credentials: Credentials,
        schema: Arc<SchemaValidator>,
        limits: BodyLimits,
    ) -> Self {
        Self::builder()
            .add_stage(RecoveryMiddleware::new())
            .add_stage(MethodMiddleware::new())
            .add_stage(AuthMiddleware::new(credentials))
            .add_stage(ValidationMiddleware::with_limits(schema, limits))
            .build()
    }

    /// Runs `request` through every gate and then `handler`.
    ///
    /// With a recovery gate at the front this never returns `Err`.
    pub async fn process<H>(
        &self,
        mut ctx: MiddlewareContext,
        request: Request,
        handler: H,
    ) -> CaptureResult<Response>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, CaptureResult<Response>>
            + Send
            + 'static,
    {
        let next = self.build_chain(handler);
        next.run(&mut ctx, request).await
    }

    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, CaptureResult<Response>>
            + Send
            + 'a,
    {
        let mut next = Next::handler(handler);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Returns the names of all gates in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|m| m.name()).collect()
    }

    /// Returns the number of gates.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a gate. Gates run in the order they are added.
    #[must_use]
    pub fn add_stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

/// The capture pipeline's stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Panic and error recovery.
    Recovery = 1,
    /// POST-only gate.
    Method = 2,
    /// Basic authentication.
    Auth = 3,
    /// Schema and semantic validation.
    Validation = 4,
}

impl Stage {
    /// Returns the stage name, matching [`Middleware::name`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Recovery => "recovery",
            Self::Method => "method",
            Self::Auth => "auth",
            Self::Validation => "validation",
        }
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [Stage; 4] {
        [Self::Recovery, Self::Method, Self::Auth, Self::Validation]
    }
}
