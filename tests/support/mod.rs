use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;

use placemap::{
    InvalidationTracker, NewPlace, Place, PlaceStore, SharedWatcher, StoreError,
};

/// Store double whose every operation fails, for exercising the error
/// paths without a real backend.
pub struct FailingStore {
    tracker: InvalidationTracker,
}

impl FailingStore {
    pub fn new() -> Self {
        Self {
            tracker: InvalidationTracker::new(),
        }
    }

    fn fail<T>() -> Result<T, StoreError> {
        Err(StoreError::Storage("disk full".into()))
    }
}

impl PlaceStore for FailingStore {
    fn select_all(&self) -> Result<Vec<Place>, StoreError> {
        Self::fail()
    }

    fn select_by_id(&self, _id: i64) -> Result<Option<Place>, StoreError> {
        Self::fail()
    }

    fn insert(&self, _draft: &NewPlace) -> Result<Place, StoreError> {
        Self::fail()
    }

    fn update(&self, _place: &Place) -> Result<(), StoreError> {
        Self::fail()
    }

    fn set_favorite(&self, _id: i64, _favorite: bool) -> Result<(), StoreError> {
        Self::fail()
    }

    fn delete(&self, _id: i64) -> Result<bool, StoreError> {
        Self::fail()
    }

    fn invalidations(&self) -> watch::Receiver<u64> {
        self.tracker.subscribe()
    }
}

/// Wait (bounded) until the watched snapshot satisfies the predicate,
/// returning it.
pub async fn settle<T, F>(watcher: &mut SharedWatcher<T>, predicate: F) -> T
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&T) -> bool,
{
    timeout(Duration::from_secs(2), async {
        loop {
            let latest = watcher.latest();
            if predicate(&latest) {
                return latest;
            }
            watcher.changed().await.expect("signal closed while settling");
        }
    })
    .await
    .expect("signal never settled to the expected state")
}
