//! Liveness reporting for `GET /health`.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Body of the health response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    /// Always `healthy` while the process serves requests.
    pub status: String,

    /// Service name.
    pub service: String,

    /// Crate version.
    pub version: String,

    /// Seconds since the service was constructed.
    pub uptime_seconds: u64,

    /// Backend named by the store (`sqlite`, `memory`).
    pub store: String,
}

/// Produces [`HealthStatus`] snapshots.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    service: String,
    version: String,
    store: String,
    start_time: Instant,
}

impl HealthCheck {
    /// Starts the uptime clock.
    #[must_use]
    pub fn new(
        service: impl Into<String>,
        version: impl Into<String>,
        store: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
            store: store.into(),
            start_time: Instant::now(),
        }
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> HealthStatus {
        HealthStatus {
            status: "healthy".to_string(),
            service: self.service.clone(),
            version: self.version.clone(),
            uptime_seconds: self.uptime().as_secs(),
            store: self.store.clone(),
        }
    }

    /// Time since construction.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
