//! Place records - the tourist points of interest shown on the map.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Well-known category labels.
///
/// Categories are an open set of strings; these are the labels the
/// application ships with and the seed set uses. Anything else falls
/// under no particular constant and is still accepted.
pub mod category {
    pub const IGLESIA: &str = "iglesia";
    pub const MUSEO: &str = "museo";
    pub const RESTAURANTE: &str = "restaurante";
    pub const PLAZA: &str = "plaza";
    pub const OTRO: &str = "otro";

    /// All well-known labels, useful for UI pickers.
    pub const ALL: [&str; 5] = [IGLESIA, MUSEO, RESTAURANTE, PLAZA, OTRO];
}

/// A point on the map in floating-point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Default map center: downtown Dolores Hidalgo.
pub const DOLORES_HIDALGO: Coordinate = Coordinate {
    latitude: 21.1560,
    longitude: -100.9318,
};

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether latitude is within [-90, 90] and longitude within [-180, 180].
    pub fn in_bounds(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A stored place. The id is assigned by the store on insert and is
/// unique and immutable for the lifetime of the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub category: String,
    pub marker_color: String,
    pub is_favorite: bool,
    /// Unix milliseconds at draft construction.
    pub created_at: i64,
}

impl Place {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// A draft place: everything a [`Place`] carries except the id, which
/// the store assigns on insert. `created_at` is stamped at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlace {
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub category: String,
    pub marker_color: String,
    pub is_favorite: bool,
    pub created_at: i64,
}

impl NewPlace {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        coordinate: Coordinate,
        category: impl Into<String>,
        marker_color: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            category: category.into(),
            marker_color: marker_color.into(),
            is_favorite: false,
            created_at: now_millis(),
        }
    }

    /// Override the favorite flag (drafts default to not-favorite).
    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.is_favorite = favorite;
        self
    }

    /// Override the creation timestamp. Mainly useful in tests that
    /// need a deterministic ordering.
    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// The stored row this draft becomes once the store assigns `id`.
    pub fn into_place(self, id: i64) -> Place {
        Place {
            id,
            name: self.name,
            description: self.description,
            latitude: self.latitude,
            longitude: self.longitude,
            category: self.category,
            marker_color: self.marker_color,
            is_favorite: self.is_favorite,
            created_at: self.created_at,
        }
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// The fixed starter set inserted when the store is found empty on first
/// activation.
pub fn default_places() -> Vec<NewPlace> {
    vec![
        NewPlace::new(
            "Parroquia de Nuestra Señora de los Dolores",
            "Templo donde Miguel Hidalgo dio el Grito de Independencia en 1810.",
            Coordinate::new(21.15650, -100.93194),
            category::IGLESIA,
            "#E53935",
        ),
        NewPlace::new(
            "Museo Casa de Hidalgo",
            "Casa donde vivió el cura Miguel Hidalgo y Costilla.",
            Coordinate::new(21.15562, -100.93294),
            category::MUSEO,
            "#1E88E5",
        ),
        NewPlace::new(
            "Museo José Alfredo Jiménez",
            "Museo dedicado a la vida y obra del compositor dolorense.",
            Coordinate::new(21.15747, -100.93161),
            category::MUSEO,
            "#8E24AA",
        ),
        NewPlace::new(
            "Jardín del Grande Hidalgo",
            "Plaza principal frente a la parroquia, corazón del centro histórico.",
            Coordinate::new(21.15609, -100.93230),
            category::PLAZA,
            "#43A047",
        ),
        NewPlace::new(
            "Nieves del Jardín",
            "Puesto tradicional de las famosas nieves exóticas de Dolores.",
            Coordinate::new(21.15585, -100.93210),
            category::RESTAURANTE,
            "#FB8C00",
        ),
    ]
}

/// Filter a places snapshot down to one category.
///
/// Filtering is a presentation concern - the view-model only publishes
/// the selected category, and screens apply it to whichever snapshot
/// they render. `None` keeps everything.
pub fn filter_places(places: &[Place], category: Option<&str>) -> Vec<Place> {
    match category {
        None => places.to_vec(),
        Some(label) => places
            .iter()
            .filter(|place| place.category == label)
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_stamps_creation_time_and_defaults() {
        let draft = NewPlace::new(
            "Parroquia",
            "",
            Coordinate::new(21.1560, -100.9318),
            category::IGLESIA,
            "#E53935",
        );
        assert!(!draft.is_favorite);
        assert!(draft.created_at > 0);
    }

    #[test]
    fn into_place_preserves_all_attributes() {
        let draft = NewPlace::new(
            "Parroquia",
            "Templo principal",
            Coordinate::new(21.1560, -100.9318),
            category::IGLESIA,
            "#E53935",
        )
        .with_favorite(true)
        .with_created_at(42);

        let place = draft.clone().into_place(7);
        assert_eq!(place.id, 7);
        assert_eq!(place.name, draft.name);
        assert_eq!(place.category, category::IGLESIA);
        assert!(place.is_favorite);
        assert_eq!(place.created_at, 42);
    }

    #[test]
    fn coordinate_bounds() {
        assert!(DOLORES_HIDALGO.in_bounds());
        assert!(!Coordinate::new(91.0, 0.0).in_bounds());
        assert!(!Coordinate::new(-91.0, 0.0).in_bounds());
        assert!(!Coordinate::new(0.0, 181.0).in_bounds());
        assert!(!Coordinate::new(0.0, -181.0).in_bounds());
    }

    #[test]
    fn seed_set_uses_known_categories() {
        let seeds = default_places();
        assert!(!seeds.is_empty());
        for seed in &seeds {
            assert!(category::ALL.contains(&seed.category.as_str()));
            assert!(seed.coordinate().in_bounds());
            assert!(seed.marker_color.starts_with('#'));
        }
    }

    #[test]
    fn filter_places_by_category() {
        let places: Vec<Place> = default_places()
            .into_iter()
            .enumerate()
            .map(|(i, draft)| draft.into_place(i as i64 + 1))
            .collect();

        let museums = filter_places(&places, Some(category::MUSEO));
        assert_eq!(museums.len(), 2);
        assert!(museums.iter().all(|p| p.category == category::MUSEO));

        let all = filter_places(&places, None);
        assert_eq!(all.len(), places.len());

        let none = filter_places(&places, Some("mirador"));
        assert!(none.is_empty());
    }
}
