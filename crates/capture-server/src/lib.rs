//! # Capture Server
//!
//! Hyper HTTP/1.1 server for the capture endpoint.
//!
//! - [`CaptureService`] routes one request: the capture path goes through
//!   the gate pipeline and is saved to the store, `GET /health` reports
//!   liveness, anything else is a 404 envelope.
//! - [`Server`] binds, accepts connections until a [`ShutdownSignal`]
//!   fires, drains in-flight connections and closes the store.
//!
//! ## Example
//!
//! ```rust,ignore
//! use capture_server::{CaptureService, Server};
//!
//! let service = CaptureService::new(&config, store)?;
//! Server::new(config.server.clone(), service).run().await?;
//! ```

#![doc(html_root_url = "https://docs.rs/capture-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod health;
mod server;
mod service;
pub mod shutdown;

pub use error::ServerError;
pub use health::{HealthCheck, HealthStatus};
pub use server::Server;
pub use service::CaptureService;
pub use shutdown::{ConnectionTracker, ShutdownSignal};
