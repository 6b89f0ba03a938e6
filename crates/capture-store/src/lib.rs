//! # Capture Store
//!
//! Storage backends implementing [`capture_core::EntryStore`].
//!
//! - [`SqliteStore`] - one JSON document row per entry in a SQLite table
//! - [`MemoryStore`] - in-process list, for development and tests
//!
//! [`connect`] picks a backend from a store URL:
//!
//! | URL | Backend |
//! |-----|---------|
//! | `memory:` | [`MemoryStore`] |
//! | `sqlite::memory:` | in-memory [`SqliteStore`] |
//! | `sqlite:<path>` / `sqlite://<path>` | file-backed [`SqliteStore`] |

#![doc(html_root_url = "https://docs.rs/capture-store/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use capture_core::{EntryStore, StoreError};
use std::path::Path;
use std::sync::Arc;

/// Opens the store described by `url`, writing to `table` where relevant.
pub fn connect(url: &str, table: &str) -> Result<Arc<dyn EntryStore>, StoreError> {
    if url == "memory:" || url == "memory://" {
        return Ok(Arc::new(MemoryStore::new()));
    }

    let location = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .ok_or_else(|| StoreError::Config(format!("unsupported store url '{url}'")))?;

    let store = if location == ":memory:" {
        SqliteStore::open_in_memory(table)?
    } else if location.is_empty() {
        return Err(StoreError::Config("sqlite url has no path".to_string()));
    } else {
        SqliteStore::open(Path::new(location), table)?
    };
    Ok(Arc::new(store))
}

/// Checks that `table` is a plain SQL identifier.
pub fn validate_table_name(table: &str) -> Result<(), StoreError> {
    let mut chars = table.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::Config(format!("invalid table name '{table}'")))
    }
}
