mod marker;
mod navigation;
mod place;
mod repository;
mod signal;
mod statistics;
mod store;
mod view_model;

pub use marker::{MarkerError, MarkerIcon, MarkerIconCache, Rgba};
pub use navigation::{directions, map_view, share_message, share_subject, DeepLink};
pub use place::{
    category, default_places, filter_places, Coordinate, NewPlace, Place, DOLORES_HIDALGO,
};
pub use repository::{PlaceError, PlaceRepository};
pub use signal::{SharedSignal, SharedWatcher, Signal, SignalClosed, Watcher};
pub use statistics::PlaceStatistics;
pub use store::{InMemoryPlaceStore, InvalidationTracker, PlaceStore, StoreError};
#[cfg(feature = "sqlite")]
pub use store::SqlitePlaceStore;
pub use view_model::MapViewModel;
