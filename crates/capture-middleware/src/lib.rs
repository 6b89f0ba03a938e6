//! # Capture Middleware
//!
//! The request gates of the campaign capture service.
//!
//! ```text
//! Request → Recovery → Method → Auth → Validation → Handler
//!              ↑                                       │
//! Response ←───┴──────── Result<Response, CaptureError> ┘
//! ```
//!
//! Each gate either passes the request deeper or short-circuits with an
//! error. The recovery gate renders every error (and every panic) as a JSON
//! envelope, so nothing reaches the client unformatted.
//!
//! ## Example
//!
//! ```
//! use capture_middleware::pipeline::Stage;
//!
//! let stages = Stage::all();
//! assert_eq!(stages.len(), 4);
//! assert_eq!(stages[0].name(), "recovery");
//! assert_eq!(stages[3].name(), "validation");
//! ```

#![doc(html_root_url = "https://docs.rs/capture-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

pub use context::MiddlewareContext;
pub use middleware::{BoxFuture, Middleware, Next};
pub use pipeline::{Pipeline, PipelineBuilder, Stage};
pub use stages::{BodyLimits, Credentials};
pub use types::{
    boxed_body, full_body, BoxError, Request, RequestBody, Response, ResponseExt, JSON_CONTENT_TYPE,
};
