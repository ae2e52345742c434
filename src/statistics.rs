//! Derived statistics over the current places snapshot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::place::Place;

/// Aggregate figures recomputed from every places emission. Never
/// persisted; the view-model republishes a fresh value each time the
/// places stream changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceStatistics {
    pub total_places: usize,
    pub favorite_count: usize,
    /// Category label to number of places carrying it.
    pub category_counts: HashMap<String, usize>,
    /// Greatest `created_at`; ties broken by greatest id.
    pub most_recent_place: Option<Place>,
}

impl PlaceStatistics {
    pub fn aggregate(places: &[Place]) -> Self {
        let mut category_counts: HashMap<String, usize> = HashMap::new();
        for place in places {
            *category_counts.entry(place.category.clone()).or_insert(0) += 1;
        }

        let most_recent_place = places
            .iter()
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
            .cloned();

        Self {
            total_places: places.len(),
            favorite_count: places.iter().filter(|p| p.is_favorite).count(),
            category_counts,
            most_recent_place,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::place::{Coordinate, NewPlace};

    fn place(id: i64, category: &str, favorite: bool, created_at: i64) -> Place {
        NewPlace::new(
            format!("lugar-{id}"),
            "",
            Coordinate::new(21.0, -100.0),
            category,
            "#E53935",
        )
        .with_favorite(favorite)
        .with_created_at(created_at)
        .into_place(id)
    }

    #[test]
    fn empty_snapshot_aggregates_to_default() {
        assert_eq!(PlaceStatistics::aggregate(&[]), PlaceStatistics::default());
    }

    #[test]
    fn counts_categories_and_favorites() {
        let places = vec![
            place(1, "museo", true, 10),
            place(2, "museo", false, 20),
            place(3, "plaza", true, 30),
        ];

        let stats = PlaceStatistics::aggregate(&places);
        assert_eq!(stats.total_places, 3);
        assert_eq!(stats.favorite_count, 2);
        assert_eq!(stats.category_counts.get("museo"), Some(&2));
        assert_eq!(stats.category_counts.get("plaza"), Some(&1));
        assert_eq!(stats.most_recent_place.as_ref().map(|p| p.id), Some(3));
    }

    #[test]
    fn most_recent_prefers_greatest_creation_time() {
        let places = vec![place(1, "otro", false, 500), place(2, "otro", false, 100)];
        let stats = PlaceStatistics::aggregate(&places);
        assert_eq!(stats.most_recent_place.as_ref().map(|p| p.id), Some(1));
    }

    #[test]
    fn most_recent_tie_breaks_by_greatest_id() {
        let places = vec![
            place(4, "otro", false, 100),
            place(9, "otro", false, 100),
            place(2, "otro", false, 100),
        ];
        let stats = PlaceStatistics::aggregate(&places);
        assert_eq!(stats.most_recent_place.as_ref().map(|p| p.id), Some(9));
    }
}
