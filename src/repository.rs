//! PlaceRepository - mediation layer between the store and the view-model.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task;
use tracing::{debug, info};

use crate::place::{default_places, Coordinate, NewPlace, Place};
use crate::store::{PlaceStore, StoreError};

/// Thin asynchronous pass-through over a [`PlaceStore`].
///
/// Every store call runs on the blocking pool, so callers on an
/// async/UI context never block on the database. Validation of
/// user-supplied fields happens here, at the boundary between
/// application logic and storage.
#[derive(Clone)]
pub struct PlaceRepository {
    store: Arc<dyn PlaceStore>,
}

impl PlaceRepository {
    pub fn new(store: Arc<dyn PlaceStore>) -> Self {
        Self { store }
    }

    /// Receiver bumped after every committed write; observers re-query
    /// [`select_all`](Self::select_all) on each change.
    pub fn observe_all(&self) -> watch::Receiver<u64> {
        self.store.invalidations()
    }

    pub async fn select_all(&self) -> Result<Vec<Place>, PlaceError> {
        let store = Arc::clone(&self.store);
        run_blocking(move || store.select_all()).await
    }

    pub async fn select_by_id(&self, id: i64) -> Result<Option<Place>, PlaceError> {
        let store = Arc::clone(&self.store);
        run_blocking(move || store.select_by_id(id)).await
    }

    /// Validate and persist a draft; the store assigns the id.
    pub async fn insert(&self, draft: NewPlace) -> Result<Place, PlaceError> {
        validate(&draft.name, draft.coordinate())?;
        let store = Arc::clone(&self.store);
        run_blocking(move || store.insert(&draft)).await
    }

    /// Validate and persist changes to an existing row.
    pub async fn update(&self, place: Place) -> Result<(), PlaceError> {
        validate(&place.name, place.coordinate())?;
        let store = Arc::clone(&self.store);
        run_blocking(move || store.update(&place)).await
    }

    pub async fn delete(&self, place: &Place) -> Result<(), PlaceError> {
        let store = Arc::clone(&self.store);
        let id = place.id;
        run_blocking(move || store.delete(id)).await?;
        Ok(())
    }

    /// Set the favorite flag to the opposite of `currently_favorite`.
    ///
    /// The new value is computed from what the caller passes, not
    /// re-read from the store - one write, no extra round trip. Two
    /// callers toggling the same row concurrently can therefore undo
    /// each other; with a single UI writer that cannot happen.
    pub async fn toggle_favorite(
        &self,
        id: i64,
        currently_favorite: bool,
    ) -> Result<(), PlaceError> {
        let store = Arc::clone(&self.store);
        debug!(id, favorite = !currently_favorite, "toggling favorite");
        run_blocking(move || store.set_favorite(id, !currently_favorite)).await
    }

    /// Insert the fixed seed set.
    ///
    /// Does not check whether the store is empty - that is the
    /// caller's job. Rows are inserted one by one; a failure partway
    /// leaves the earlier rows in place.
    pub async fn insert_default_places(&self) -> Result<(), PlaceError> {
        let store = Arc::clone(&self.store);
        let inserted = run_blocking(move || {
            let seeds = default_places();
            let count = seeds.len();
            for seed in &seeds {
                store.insert(seed)?;
            }
            Ok(count)
        })
        .await?;
        info!(count = inserted, "inserted default places");
        Ok(())
    }
}

async fn run_blocking<T, F>(op: F) -> Result<T, PlaceError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
{
    task::spawn_blocking(op)
        .await
        .map_err(|e| PlaceError::Store(StoreError::Storage(format!("store task failed: {e}"))))?
        .map_err(PlaceError::from)
}

fn validate(name: &str, coordinate: Coordinate) -> Result<(), PlaceError> {
    if name.trim().is_empty() {
        return Err(PlaceError::EmptyName);
    }
    if !coordinate.in_bounds() {
        return Err(PlaceError::CoordinateOutOfRange {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        });
    }
    Ok(())
}

/// Error type for repository operations.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceError {
    /// The underlying store failed.
    Store(StoreError),
    /// A place needs a non-empty display name.
    EmptyName,
    /// Latitude must be within [-90, 90] and longitude within [-180, 180].
    CoordinateOutOfRange { latitude: f64, longitude: f64 },
}

impl fmt::Display for PlaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceError::Store(err) => write!(f, "{}", err),
            PlaceError::EmptyName => write!(f, "place name must not be empty"),
            PlaceError::CoordinateOutOfRange {
                latitude,
                longitude,
            } => write!(f, "coordinate out of range: ({}, {})", latitude, longitude),
        }
    }
}

impl std::error::Error for PlaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlaceError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for PlaceError {
    fn from(err: StoreError) -> Self {
        PlaceError::Store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::place::category;
    use crate::store::InMemoryPlaceStore;

    fn repository() -> PlaceRepository {
        PlaceRepository::new(Arc::new(InMemoryPlaceStore::new()))
    }

    fn draft(name: &str, latitude: f64, longitude: f64) -> NewPlace {
        NewPlace::new(
            name,
            "",
            Coordinate::new(latitude, longitude),
            category::OTRO,
            "#43A047",
        )
    }

    #[tokio::test]
    async fn insert_rejects_empty_and_whitespace_names() {
        let repo = repository();
        let err = repo.insert(draft("", 21.0, -100.0)).await.unwrap_err();
        assert_eq!(err, PlaceError::EmptyName);
        let err = repo.insert(draft("   ", 21.0, -100.0)).await.unwrap_err();
        assert_eq!(err, PlaceError::EmptyName);
        assert!(repo.select_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_rejects_out_of_range_coordinates() {
        let repo = repository();
        let err = repo.insert(draft("a", 95.0, 0.0)).await.unwrap_err();
        assert_eq!(
            err,
            PlaceError::CoordinateOutOfRange {
                latitude: 95.0,
                longitude: 0.0
            }
        );
    }

    #[tokio::test]
    async fn update_validates_too() {
        let repo = repository();
        let place = repo.insert(draft("a", 21.0, -100.0)).await.unwrap();

        let mut renamed = place.clone();
        renamed.name = String::new();
        assert_eq!(
            repo.update(renamed).await.unwrap_err(),
            PlaceError::EmptyName
        );

        let mut moved = place;
        moved.longitude = -200.0;
        assert!(matches!(
            repo.update(moved).await.unwrap_err(),
            PlaceError::CoordinateOutOfRange { .. }
        ));
    }

    #[tokio::test]
    async fn update_missing_row_surfaces_not_found() {
        let repo = repository();
        let ghost = draft("ghost", 21.0, -100.0).into_place(404);
        assert_eq!(
            repo.update(ghost).await.unwrap_err(),
            PlaceError::Store(StoreError::NotFound { id: 404 })
        );
    }

    #[tokio::test]
    async fn toggle_uses_the_callers_value_not_the_stores() {
        let repo = repository();
        let place = repo.insert(draft("a", 21.0, -100.0)).await.unwrap();

        // Caller believes the row is already a favorite; the store says
        // otherwise. The caller's snapshot wins.
        repo.toggle_favorite(place.id, true).await.unwrap();
        let loaded = repo.select_by_id(place.id).await.unwrap().unwrap();
        assert!(!loaded.is_favorite);

        repo.toggle_favorite(place.id, loaded.is_favorite)
            .await
            .unwrap();
        let loaded = repo.select_by_id(place.id).await.unwrap().unwrap();
        assert!(loaded.is_favorite);
    }

    #[tokio::test]
    async fn seed_insert_does_not_check_emptiness() {
        let repo = repository();
        repo.insert_default_places().await.unwrap();
        let first = repo.select_all().await.unwrap().len();
        assert!(first > 0);

        // Calling again happily doubles the rows; the emptiness check
        // belongs to the caller.
        repo.insert_default_places().await.unwrap();
        assert_eq!(repo.select_all().await.unwrap().len(), first * 2);
    }
}
