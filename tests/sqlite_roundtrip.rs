#![cfg(feature = "sqlite")]

mod support;

use std::sync::Arc;

use placemap::{
    category, default_places, Coordinate, MapViewModel, PlaceRepository, SqlitePlaceStore,
};
use support::settle;

/// The whole stack - view-model, repository, SQLite store - wired the
/// way the application runs it.
#[tokio::test]
async fn full_stack_over_sqlite() {
    let store = Arc::new(SqlitePlaceStore::open_in_memory().unwrap());
    let repository = Arc::new(PlaceRepository::new(store));
    let view_model = MapViewModel::new(Arc::clone(&repository));

    view_model.activate().await.unwrap();
    let mut places = view_model.places().watch();
    let seeded = settle(&mut places, |p| p.len() == default_places().len()).await;
    assert!(seeded.iter().any(|p| p.category == category::IGLESIA));

    let added = view_model
        .add_place(
            "Mirador del Llanito",
            "Vista panorámica a las afueras de la ciudad.",
            Coordinate::new(21.1403, -100.9425),
            category::OTRO,
            "#00897B",
        )
        .await
        .unwrap();
    let snapshot = settle(&mut places, |p| p.len() == seeded.len() + 1).await;
    assert!(snapshot.iter().any(|p| p.id == added.id));

    view_model.toggle_favorite(&added).await.unwrap();
    let snapshot = settle(&mut places, |p| {
        p.iter().any(|place| place.id == added.id && place.is_favorite)
    })
    .await;

    let mut statistics = view_model.statistics().watch();
    let stats = settle(&mut statistics, |s| s.total_places == snapshot.len()).await;
    assert_eq!(stats.favorite_count, 1);

    let favorite = snapshot.iter().find(|p| p.id == added.id).unwrap();
    view_model.delete_place(favorite).await.unwrap();
    settle(&mut places, |p| p.len() == seeded.len()).await;
}

#[tokio::test]
async fn database_file_survives_reopen() {
    let dir = std::env::temp_dir().join(format!("placemap-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("places.db");

    let added = {
        let store = Arc::new(SqlitePlaceStore::open(&path).unwrap());
        let repository = Arc::new(PlaceRepository::new(store));
        let view_model = MapViewModel::new(Arc::clone(&repository));
        view_model
            .add_place(
                "Parroquia",
                "",
                Coordinate::new(21.1560, -100.9318),
                category::IGLESIA,
                "#E53935",
            )
            .await
            .unwrap()
    };

    let store = Arc::new(SqlitePlaceStore::open(&path).unwrap());
    let repository = Arc::new(PlaceRepository::new(store));
    let all = repository.select_all().await.unwrap();
    assert_eq!(all, vec![added]);

    std::fs::remove_dir_all(&dir).ok();
}
