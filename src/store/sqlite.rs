//! SqlitePlaceStore - the on-device database behind the map.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, Row};
use tokio::sync::watch;

use super::{InvalidationTracker, PlaceStore, StoreError};
use crate::place::{NewPlace, Place};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS places (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT    NOT NULL,
    description  TEXT    NOT NULL,
    latitude     REAL    NOT NULL,
    longitude    REAL    NOT NULL,
    category     TEXT    NOT NULL,
    marker_color TEXT    NOT NULL,
    is_favorite  INTEGER NOT NULL DEFAULT 0,
    created_at   INTEGER NOT NULL
);
";

const COLUMNS: &str =
    "id, name, description, latitude, longitude, category, marker_color, is_favorite, created_at";

/// SQLite-backed place store. The single `places` table is created on
/// open; there is no migration machinery.
///
/// The connection sits behind a mutex so the store can be shared across
/// threads; writers are serialized by that lock.
pub struct SqlitePlaceStore {
    conn: Mutex<Connection>,
    tracker: Arc<InvalidationTracker>,
}

impl SqlitePlaceStore {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(storage)?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory database, handy for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(storage)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(storage)?;
        Ok(Self {
            conn: Mutex::new(conn),
            tracker: Arc::new(InvalidationTracker::new()),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Storage("connection lock poisoned".into()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Place> {
        Ok(Place {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            latitude: row.get(3)?,
            longitude: row.get(4)?,
            category: row.get(5)?,
            marker_color: row.get(6)?,
            is_favorite: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}

fn storage(err: rusqlite::Error) -> StoreError {
    StoreError::Storage(err.to_string())
}

impl PlaceStore for SqlitePlaceStore {
    fn select_all(&self) -> Result<Vec<Place>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!("SELECT {COLUMNS} FROM places ORDER BY id ASC"))
            .map_err(storage)?;

        let rows = stmt.query_map([], Self::map_row).map_err(storage)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(storage)
    }

    fn select_by_id(&self, id: i64) -> Result<Option<Place>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!("SELECT {COLUMNS} FROM places WHERE id = ?1"))
            .map_err(storage)?;

        let mut rows = stmt.query_map(params![id], Self::map_row).map_err(storage)?;
        match rows.next() {
            Some(row) => Ok(Some(row.map_err(storage)?)),
            None => Ok(None),
        }
    }

    fn insert(&self, draft: &NewPlace) -> Result<Place, StoreError> {
        let id = {
            let conn = self.lock()?;
            conn.execute(
                "INSERT INTO places
                     (name, description, latitude, longitude, category, marker_color, is_favorite, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    draft.name,
                    draft.description,
                    draft.latitude,
                    draft.longitude,
                    draft.category,
                    draft.marker_color,
                    draft.is_favorite,
                    draft.created_at,
                ],
            )
            .map_err(storage)?;
            conn.last_insert_rowid()
        };

        self.tracker.bump();
        Ok(draft.clone().into_place(id))
    }

    fn update(&self, place: &Place) -> Result<(), StoreError> {
        let changed = {
            let conn = self.lock()?;
            conn.execute(
                "UPDATE places
                 SET name = ?1, description = ?2, latitude = ?3, longitude = ?4,
                     category = ?5, marker_color = ?6, is_favorite = ?7, created_at = ?8
                 WHERE id = ?9",
                params![
                    place.name,
                    place.description,
                    place.latitude,
                    place.longitude,
                    place.category,
                    place.marker_color,
                    place.is_favorite,
                    place.created_at,
                    place.id,
                ],
            )
            .map_err(storage)?
        };

        if changed == 0 {
            return Err(StoreError::NotFound { id: place.id });
        }

        self.tracker.bump();
        Ok(())
    }

    fn set_favorite(&self, id: i64, favorite: bool) -> Result<(), StoreError> {
        let changed = {
            let conn = self.lock()?;
            conn.execute(
                "UPDATE places SET is_favorite = ?1 WHERE id = ?2",
                params![favorite, id],
            )
            .map_err(storage)?
        };

        if changed == 0 {
            return Err(StoreError::NotFound { id });
        }

        self.tracker.bump();
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let removed = {
            let conn = self.lock()?;
            conn.execute("DELETE FROM places WHERE id = ?1", params![id])
                .map_err(storage)?
        };

        if removed > 0 {
            self.tracker.bump();
        }
        Ok(removed > 0)
    }

    fn invalidations(&self) -> watch::Receiver<u64> {
        self.tracker.subscribe()
    }
}
