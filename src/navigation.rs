//! Deep links into an external maps application, with web fallbacks.
//!
//! The crate only builds the URIs; the host application tries the app
//! URI first and opens the web URI when the maps application is not
//! installed. Scheme and host strings are specific to one provider and
//! live here as module constants.

use crate::place::Place;

const NAVIGATION_SCHEME: &str = "google.navigation";
const GEO_SCHEME: &str = "geo";
const WEB_DIRECTIONS: &str = "https://www.google.com/maps/dir/?api=1";
const WEB_SEARCH: &str = "https://www.google.com/maps/search/?api=1";

/// A pair of URIs for one action: the maps application deep link and
/// the browser fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLink {
    pub app_uri: String,
    pub web_uri: String,
}

/// Turn-by-turn navigation to the place (driving mode).
pub fn directions(place: &Place) -> DeepLink {
    DeepLink {
        app_uri: format!(
            "{NAVIGATION_SCHEME}:q={},{}&mode=d",
            place.latitude, place.longitude
        ),
        web_uri: format!(
            "{WEB_DIRECTIONS}&destination={},{}",
            place.latitude, place.longitude
        ),
    }
}

/// Show the place on the map without starting navigation.
pub fn map_view(place: &Place) -> DeepLink {
    DeepLink {
        app_uri: format!(
            "{GEO_SCHEME}:{lat},{lon}?q={lat},{lon}({name})",
            lat = place.latitude,
            lon = place.longitude,
            name = place.name
        ),
        web_uri: format!(
            "{WEB_SEARCH}&query={},{}",
            place.latitude, place.longitude
        ),
    }
}

/// Plain-text payload for the platform share sheet.
pub fn share_message(place: &Place) -> String {
    format!(
        "📍 {name}\n{description}\n\n🗺️ Ver en Google Maps:\n{WEB_SEARCH}&query={lat},{lon}\n\n✨ Compartido desde Turismo Dolores Hidalgo",
        name = place.name,
        description = place.description,
        lat = place.latitude,
        lon = place.longitude,
    )
}

/// Subject line accompanying [`share_message`].
pub fn share_subject(place: &Place) -> String {
    format!("Lugar turístico: {}", place.name)
}
