//! InMemoryPlaceStore - map-backed store for testing and development.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::watch;

use super::{InvalidationTracker, PlaceStore, StoreError};
use crate::place::{NewPlace, Place};

/// In-memory place store backed by a BTreeMap keyed by id, so
/// `select_all` comes back in insertion order for free.
///
/// Rows are held as serialized JSON, mirroring what a real store keeps,
/// so decode failures surface the same way they would elsewhere.
/// Clone-friendly via Arc.
#[derive(Clone)]
pub struct InMemoryPlaceStore {
    rows: Arc<RwLock<BTreeMap<i64, Vec<u8>>>>,
    next_id: Arc<AtomicI64>,
    tracker: Arc<InvalidationTracker>,
}

impl Default for InMemoryPlaceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPlaceStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
            tracker: Arc::new(InvalidationTracker::new()),
        }
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn decode(bytes: &[u8]) -> Result<Place, StoreError> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupted(e.to_string()))
    }

    fn encode(place: &Place) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(place).map_err(|e| StoreError::Storage(e.to_string()))
    }
}

impl PlaceStore for InMemoryPlaceStore {
    fn select_all(&self) -> Result<Vec<Place>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        rows.values().map(|bytes| Self::decode(bytes)).collect()
    }

    fn select_by_id(&self, id: i64) -> Result<Option<Place>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        match rows.get(&id) {
            Some(bytes) => Ok(Some(Self::decode(bytes)?)),
            None => Ok(None),
        }
    }

    fn insert(&self, draft: &NewPlace) -> Result<Place, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let place = draft.clone().into_place(id);
        let bytes = Self::encode(&place)?;

        {
            let mut rows = self
                .rows
                .write()
                .map_err(|_| StoreError::Storage("lock poisoned".into()))?;
            rows.insert(id, bytes);
        }

        self.tracker.bump();
        Ok(place)
    }

    fn update(&self, place: &Place) -> Result<(), StoreError> {
        let bytes = Self::encode(place)?;

        {
            let mut rows = self
                .rows
                .write()
                .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

            if !rows.contains_key(&place.id) {
                return Err(StoreError::NotFound { id: place.id });
            }
            rows.insert(place.id, bytes);
        }

        self.tracker.bump();
        Ok(())
    }

    fn set_favorite(&self, id: i64, favorite: bool) -> Result<(), StoreError> {
        {
            let mut rows = self
                .rows
                .write()
                .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

            let bytes = rows.get(&id).ok_or(StoreError::NotFound { id })?;
            let mut place = Self::decode(bytes)?;
            place.is_favorite = favorite;
            rows.insert(id, Self::encode(&place)?);
        }

        self.tracker.bump();
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let removed = {
            let mut rows = self
                .rows
                .write()
                .map_err(|_| StoreError::Storage("lock poisoned".into()))?;
            rows.remove(&id).is_some()
        };

        if removed {
            self.tracker.bump();
        }
        Ok(removed)
    }

    fn invalidations(&self) -> watch::Receiver<u64> {
        self.tracker.subscribe()
    }
}
