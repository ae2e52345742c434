//! Place stores - pluggable persistence for place records.
//!
//! A store owns the rows and is the sole source of truth; everything
//! above it holds transient copies. Besides CRUD by identity, a store
//! exposes an invalidation stream that is bumped after every committed
//! write, so observers can re-query and stay consistent without polling.
//!
//! ## Example
//!
//! ```ignore
//! use placemap::{InMemoryPlaceStore, NewPlace, PlaceStore};
//!
//! let store = InMemoryPlaceStore::new();
//! let mut invalidations = store.invalidations();
//!
//! let place = store.insert(&draft)?;
//! invalidations.changed().await?; // fires after the insert commits
//! let all = store.select_all()?;
//! ```

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

use std::fmt;

use tokio::sync::watch;

use crate::place::{NewPlace, Place};

pub use memory::InMemoryPlaceStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqlitePlaceStore;

/// Abstract CRUD storage for place records.
pub trait PlaceStore: Send + Sync {
    /// Every row, ordered by ascending id (insertion order).
    fn select_all(&self) -> Result<Vec<Place>, StoreError>;

    /// Look up one row by id. Returns None if not found.
    fn select_by_id(&self, id: i64) -> Result<Option<Place>, StoreError>;

    /// Persist a draft, assigning a fresh id. Returns the stored row.
    fn insert(&self, draft: &NewPlace) -> Result<Place, StoreError>;

    /// Overwrite the row with the same id. `NotFound` if the id is absent.
    fn update(&self, place: &Place) -> Result<(), StoreError>;

    /// Update only the favorite flag. `NotFound` if the id is absent.
    fn set_favorite(&self, id: i64, favorite: bool) -> Result<(), StoreError>;

    /// Remove the row by id. Returns true when a row was removed.
    fn delete(&self, id: i64) -> Result<bool, StoreError>;

    /// Receiver bumped after every committed insert/update/delete.
    ///
    /// The carried counter has no meaning beyond "something changed";
    /// observers re-query on each change notification.
    fn invalidations(&self) -> watch::Receiver<u64>;
}

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Read/write failure in the underlying storage.
    Storage(String),
    /// No row with the given id.
    NotFound { id: i64 },
    /// A stored row could not be decoded.
    Corrupted(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Storage(msg) => write!(f, "place storage error: {}", msg),
            StoreError::NotFound { id } => write!(f, "place not found: {}", id),
            StoreError::Corrupted(msg) => write!(f, "corrupted place row: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Change broadcaster shared by store implementations.
///
/// Wraps a watch channel carrying a monotonically increasing counter.
/// Custom stores outside this crate can reuse it to satisfy
/// [`PlaceStore::invalidations`].
pub struct InvalidationTracker {
    tx: watch::Sender<u64>,
}

impl Default for InvalidationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl InvalidationTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx }
    }

    /// Subscribe to future invalidations. The current counter value is
    /// considered already seen.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    /// Signal that a write committed.
    pub fn bump(&self) {
        self.tx.send_modify(|generation| *generation += 1);
    }
}
