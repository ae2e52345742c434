//! MapViewModel - the reactive state holder behind the map screen.
//!
//! Holds every piece of UI-observable state and the asynchronous
//! operations that mutate it. The UI watches signals and calls
//! operations; the view-model talks to the repository; committed writes
//! flow back up through the live places signal. A linear, acyclic data
//! flow with no feedback loops.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use placemap::{InMemoryPlaceStore, MapViewModel, PlaceRepository, DOLORES_HIDALGO};
//!
//! let repository = Arc::new(PlaceRepository::new(Arc::new(InMemoryPlaceStore::new())));
//! let view_model = MapViewModel::new(repository);
//! view_model.activate().await?; // seeds the store when empty
//!
//! let mut places = view_model.places().watch();
//! view_model
//!     .add_place("Parroquia", "", DOLORES_HIDALGO, "iglesia", "#E53935")
//!     .await?;
//! places.changed().await?;
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::place::{Coordinate, NewPlace, Place, DOLORES_HIDALGO};
use crate::repository::{PlaceError, PlaceRepository};
use crate::signal::{SharedSignal, Signal};
use crate::statistics::PlaceStatistics;

/// How long the shared signals keep pumping after their last watcher
/// detaches, so a transient detach does not restart the store query
/// loop.
const DEFAULT_SHARE_GRACE: Duration = Duration::from_secs(5);

const ADD_FAILED: &str = "No se pudo agregar el lugar. Intenta nuevamente.";
const UPDATE_FAILED: &str = "No se pudo actualizar el lugar. Intenta nuevamente.";

/// Reactive state holder mediating between the repository and the
/// presentation layer.
///
/// Every mutating operation returns its outcome to the caller; the
/// presentation layer decides what to surface. Add and update failures
/// additionally publish a user-facing message to
/// [`error_message`](Self::error_message).
///
/// Must be created from within a Tokio runtime (the shared signals
/// spawn their pumps on it).
pub struct MapViewModel {
    repository: Arc<PlaceRepository>,
    places: SharedSignal<Vec<Place>>,
    statistics: SharedSignal<PlaceStatistics>,
    selected_place: Signal<Option<Place>>,
    selected_category: Signal<Option<String>>,
    show_dialog: Signal<bool>,
    map_center: Signal<Coordinate>,
    error_message: Signal<Option<String>>,
    activated: AtomicBool,
}

impl MapViewModel {
    pub fn new(repository: Arc<PlaceRepository>) -> Self {
        Self::with_grace(repository, DEFAULT_SHARE_GRACE)
    }

    /// Override the idle grace period of the shared places/statistics
    /// signals. Call before handing out watchers.
    pub fn with_share_grace(self, grace: Duration) -> Self {
        Self::with_grace(self.repository, grace)
    }

    /// Override the initial map center (defaults to Dolores Hidalgo).
    pub fn with_default_center(self, center: Coordinate) -> Self {
        self.map_center.set(center);
        self
    }

    fn with_grace(repository: Arc<PlaceRepository>, grace: Duration) -> Self {
        let places = places_signal(Arc::clone(&repository), grace);
        let statistics = statistics_signal(places.clone(), grace);
        Self {
            repository,
            places,
            statistics,
            selected_place: Signal::new(None),
            selected_category: Signal::new(None),
            show_dialog: Signal::new(false),
            map_center: Signal::new(DOLORES_HIDALGO),
            error_message: Signal::new(None),
            activated: AtomicBool::new(false),
        }
    }

    /// Live view of the whole store, re-emitted after every committed
    /// write. Empty until the first query completes.
    pub fn places(&self) -> &SharedSignal<Vec<Place>> {
        &self.places
    }

    /// Aggregates recomputed from every places emission.
    pub fn statistics(&self) -> &SharedSignal<PlaceStatistics> {
        &self.statistics
    }

    /// The place being edited, if any.
    pub fn selected_place(&self) -> &Signal<Option<Place>> {
        &self.selected_place
    }

    /// The active category filter. Purely presentation-local: the
    /// places signal is never filtered here.
    pub fn selected_category(&self) -> &Signal<Option<String>> {
        &self.selected_category
    }

    /// Whether the add/edit dialog is visible.
    pub fn show_dialog(&self) -> &Signal<bool> {
        &self.show_dialog
    }

    /// Current map center.
    pub fn map_center(&self) -> &Signal<Coordinate> {
        &self.map_center
    }

    /// User-facing failure banner; `None` when there is nothing to show.
    pub fn error_message(&self) -> &Signal<Option<String>> {
        &self.error_message
    }

    /// One-time initialization: when the store's current snapshot is
    /// empty, insert the default seed set.
    ///
    /// Guarded so the view-model's own logic can never trigger the
    /// seed twice; the guard is released again if the initial read
    /// fails, so a transient storage error does not disable seeding
    /// forever. The check-then-act is not transactional, which is fine
    /// while this component is the only writer at startup.
    pub async fn activate(&self) -> Result<(), PlaceError> {
        if self.activated.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let snapshot = match self.repository.select_all().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.activated.store(false, Ordering::SeqCst);
                return Err(err);
            }
        };

        if snapshot.is_empty() {
            info!("store is empty, seeding default places");
            self.repository.insert_default_places().await?;
        }
        Ok(())
    }

    /// Create and persist a new place; the store assigns the id.
    ///
    /// On failure the banner message is set and the error is still
    /// returned to the caller.
    pub async fn add_place(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        coordinate: Coordinate,
        category: impl Into<String>,
        marker_color: impl Into<String>,
    ) -> Result<Place, PlaceError> {
        let draft = NewPlace::new(name, description, coordinate, category, marker_color);
        debug!(name = %draft.name, "adding place");

        match self.repository.insert(draft).await {
            Ok(place) => {
                info!(id = place.id, "place added");
                Ok(place)
            }
            Err(err) => {
                error!(%err, "failed to add place");
                self.error_message.set(Some(ADD_FAILED.to_string()));
                Err(err)
            }
        }
    }

    /// Persist changes to an existing place. On success the selection
    /// is cleared and the dialog closed; on failure both stay as they
    /// are and the banner message is set.
    pub async fn update_place(&self, place: Place) -> Result<(), PlaceError> {
        debug!(id = place.id, "updating place");

        match self.repository.update(place).await {
            Ok(()) => {
                self.selected_place.set(None);
                self.show_dialog.set(false);
                Ok(())
            }
            Err(err) => {
                error!(%err, "failed to update place");
                self.error_message.set(Some(UPDATE_FAILED.to_string()));
                Err(err)
            }
        }
    }

    pub async fn delete_place(&self, place: &Place) -> Result<(), PlaceError> {
        debug!(id = place.id, "deleting place");
        let result = self.repository.delete(place).await;
        if let Err(err) = &result {
            warn!(%err, "failed to delete place");
        }
        result
    }

    /// Flip the favorite flag, judged from the snapshot the caller
    /// holds (see [`PlaceRepository::toggle_favorite`]).
    pub async fn toggle_favorite(&self, place: &Place) -> Result<(), PlaceError> {
        let result = self
            .repository
            .toggle_favorite(place.id, place.is_favorite)
            .await;
        if let Err(err) = &result {
            warn!(%err, "failed to toggle favorite");
        }
        result
    }

    /// Publish the category filter. Filtering the places list itself is
    /// the watcher's concern, not a state mutation here.
    pub fn filter_by_category(&self, category: Option<String>) {
        self.selected_category.set(category);
    }

    /// Open the dialog in add mode, centering the map on the tapped
    /// coordinate.
    pub fn show_add_dialog(&self, coordinate: Coordinate) {
        self.map_center.set(coordinate);
        self.selected_place.set(None);
        self.show_dialog.set(true);
    }

    /// Open the dialog in edit mode for the given place.
    pub fn show_edit_dialog(&self, place: Place) {
        self.selected_place.set(Some(place));
        self.show_dialog.set(true);
    }

    /// Close the dialog and drop any selection.
    pub fn dismiss_dialog(&self) {
        self.show_dialog.set(false);
        self.selected_place.set(None);
    }

    /// Clear the failure banner once the UI has shown it.
    pub fn clear_error(&self) {
        self.error_message.set(None);
    }
}

/// Live places signal: re-queries the store on every invalidation while
/// watched, torn down after the idle grace.
fn places_signal(repository: Arc<PlaceRepository>, grace: Duration) -> SharedSignal<Vec<Place>> {
    SharedSignal::new(Vec::new(), grace, move |out| {
        let repository = Arc::clone(&repository);
        async move {
            let mut invalidations = repository.observe_all();
            loop {
                match repository.select_all().await {
                    Ok(places) => out.set(places),
                    Err(err) => warn!(%err, "live places query failed"),
                }
                if invalidations.changed().await.is_err() {
                    // Store gone; nothing further to observe.
                    break;
                }
            }
        }
    })
}

/// Statistics signal: re-aggregates on every places emission. Watching
/// statistics transitively keeps the places pump alive.
fn statistics_signal(
    places: SharedSignal<Vec<Place>>,
    grace: Duration,
) -> SharedSignal<PlaceStatistics> {
    SharedSignal::new(PlaceStatistics::default(), grace, move |out| {
        let places = places.clone();
        async move {
            let mut watcher = places.watch();
            loop {
                out.set(PlaceStatistics::aggregate(&watcher.latest()));
                if watcher.changed().await.is_err() {
                    break;
                }
            }
        }
    })
}
