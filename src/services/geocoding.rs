use super::{Coordinate, PlaceSuggestion};

use crate::{GenericError, ResolutionError, SuggestionError};

use async_trait::async_trait;
use google_maps::prelude::*;
use log::*;
use rust_decimal::prelude::ToPrimitive;

/// The suggestion list never grows past this many provider entries.
pub const SUGGESTION_LIMIT: usize = 5;

#[async_trait]
pub trait PlaceResolver {
    /// Autocomplete candidates for a free-text query, capped at
    /// [`SUGGESTION_LIMIT`]. An empty list means no matches.
    async fn suggest(&self, query: &str) -> Result<Vec<PlaceSuggestion>, SuggestionError>;

    /// Forward geocoding of an address string.
    async fn resolve_to_coordinate(&self, address: &str) -> Result<Coordinate, ResolutionError>;

    /// Reverse geocoding of a map coordinate.
    async fn resolve_to_address(&self, coordinate: Coordinate) -> Result<String, ResolutionError>;
}

pub struct GoogleMapsResolver {
    client: GoogleMapsClient,
}

impl GoogleMapsResolver {
    pub fn new() -> Result<Self, GenericError> {
        Ok(GoogleMapsResolver {
            client: GoogleMapsClient::new(&dotenv::var("GOOGLE_MAPS_TOKEN")?),
        })
    }
}

pub(crate) fn coordinate_from(latlng: &LatLng) -> Coordinate {
    Coordinate {
        lat: latlng.lat.to_f64().unwrap_or_default(),
        lng: latlng.lng.to_f64().unwrap_or_default(),
    }
}

#[async_trait]
impl PlaceResolver for GoogleMapsResolver {
    async fn suggest(&self, query: &str) -> Result<Vec<PlaceSuggestion>, SuggestionError> {
        let response = self
            .client
            .place_autocomplete(query.to_string())
            .execute()
            .await
            .map_err(|err| SuggestionError::Provider(err.to_string()))?;
        trace!("Received autocomplete predictions from Google Maps.");
        Ok(response
            .predictions
            .into_iter()
            .take(SUGGESTION_LIMIT)
            .map(|prediction| PlaceSuggestion {
                label: prediction.description,
            })
            .collect())
    }

    async fn resolve_to_coordinate(&self, address: &str) -> Result<Coordinate, ResolutionError> {
        let response = self
            .client
            .geocoding()
            .with_address(address)
            .execute()
            .await
            .map_err(|err| ResolutionError::Provider(err.to_string()))?;
        let location = &response
            .results
            .first()
            .ok_or(ResolutionError::NoMatch)?
            .geometry
            .location;
        trace!("Received coordinates from Google Maps geocoding API.");
        Ok(coordinate_from(location))
    }

    async fn resolve_to_address(&self, coordinate: Coordinate) -> Result<String, ResolutionError> {
        let latlng = LatLng::try_from_f64(coordinate.lat, coordinate.lng)
            .map_err(|err| ResolutionError::Provider(err.to_string()))?;
        let response = self
            .client
            .reverse_geocoding(latlng)
            .execute()
            .await
            .map_err(|err| ResolutionError::Provider(err.to_string()))?;
        let placemark = response.results.first().ok_or(ResolutionError::NoMatch)?;
        trace!("Received placemark from Google Maps reverse geocoding API.");

        let component = |kind: PlaceType| {
            placemark
                .address_components
                .iter()
                .find(|component| component.types.contains(&kind))
                .map(|component| component.long_name.clone())
        };

        // Street number + street name when the placemark has them,
        // otherwise the provider's formatted address.
        let address = match (component(PlaceType::StreetNumber), component(PlaceType::Route)) {
            (Some(number), Some(street)) => format!("{number} {street}"),
            (None, Some(street)) => street,
            _ => placemark.formatted_address.clone(),
        };
        Ok(address)
    }
}
