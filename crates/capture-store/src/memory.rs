//! In-memory store.

use capture_core::{BoxFuture, Entry, EntryStore, StoreError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Keeps saved entries in a list. Can be told to fail every save.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<Entry>>,
    closed: AtomicBool,
    failing: bool,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose every save fails with a backend error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Returns a copy of every saved entry, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<Entry> {
        self.entries.lock().clone()
    }

    /// Number of saved entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing has been saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true once [`EntryStore::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl EntryStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn save<'a>(&'a self, entry: &'a Entry) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            if self.is_closed() {
                return Err(StoreError::Closed);
            }
            if self.failing {
                return Err(StoreError::backend("memory store configured to fail"));
            }
            self.entries.lock().push(entry.clone());
            Ok(())
        })
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
