use serde::Serialize;

pub mod directions;
pub mod geocoding;
pub mod location;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point on the map in floating-point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Coordinate { lat, lng }
    }

    /// Great-circle distance to `other` in metres.
    pub fn distance_meters(&self, other: Coordinate) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();

        let sin_dlat = (dlat / 2.0).sin();
        let sin_dlng = (dlng / 2.0).sin();

        let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlng * sin_dlng;
        2.0 * EARTH_RADIUS_M * h.sqrt().asin()
    }
}

/// One autocomplete candidate. The label doubles as the reference for
/// resolving the place later: selections are forward-geocoded by it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceSuggestion {
    pub label: String,
}

/// A computed driving route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub polyline: Vec<Coordinate>,
    pub distance_meters: f64,
}
