//! # Capture
//!
//! **Campaign entry capture service**
//!
//! Accepts contest and campaign entry submissions over HTTP, checks them
//! against a fixed gate pipeline and stores each accepted entry once.
//!
//! ```text
//! POST /campaign → Recovery → Method → Auth → Validation → save → {"status":200,"entryId":…}
//! ```
//!
//! The crates behind this facade:
//!
//! - [`core`]: entry model, schema, errors, envelopes, the store port
//! - [`middleware`]: the gates and the pipeline
//! - [`store`]: SQLite and in-memory stores
//! - [`config`]: layered configuration
//! - [`telemetry`]: logging setup
//! - [`server`]: routing, accept loop, shutdown
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use capture::prelude::*;
//!
//! let config = ConfigLoader::new().with_env_prefix("CAPTURE").load()?;
//! let store = capture::store::connect(&config.store.url, &config.store.table)?;
//! let service = CaptureService::new(&config, store)?;
//! Server::new(config.server.clone(), service).run().await?;
//! ```

#![doc(html_root_url = "https://docs.rs/capture/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use capture_config as config;
pub use capture_core as core;
pub use capture_middleware as middleware;
pub use capture_server as server;
pub use capture_store as store;
pub use capture_telemetry as telemetry;

/// Common imports.
pub mod prelude {
    pub use capture_config::{CaptureConfig, ConfigError, ConfigLoader};
    pub use capture_core::{
        CaptureError, CaptureResult, Entrant, Entry, EntryItem, EntryStore, Perms, PublicId,
        SchemaValidator, StoreError, SubmitAction, Validate,
    };
    pub use capture_middleware::{Credentials, MiddlewareContext, Pipeline};
    pub use capture_server::{CaptureService, Server, ShutdownSignal};
    pub use capture_store::{MemoryStore, SqliteStore};
    pub use capture_telemetry::{init_logging, LogConfig, LogFormat};
}
