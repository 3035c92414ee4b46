use super::geocoding::coordinate_from;
use super::{Coordinate, RouteSummary};

use crate::{GenericError, RouteError};

use async_trait::async_trait;
use google_maps::prelude::*;
use log::*;
use rust_decimal::prelude::ToPrimitive;

#[async_trait]
pub trait RouteResolver {
    /// Computes a driving route between two coordinates. The caller is
    /// responsible for cancelling a superseded computation before
    /// issuing a new one.
    async fn compute_route(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<RouteSummary, RouteError>;
}

pub struct GoogleMapsDirections {
    client: GoogleMapsClient,
}

impl GoogleMapsDirections {
    pub fn new() -> Result<Self, GenericError> {
        Ok(GoogleMapsDirections {
            client: GoogleMapsClient::new(&dotenv::var("GOOGLE_MAPS_TOKEN")?),
        })
    }
}

#[async_trait]
impl RouteResolver for GoogleMapsDirections {
    async fn compute_route(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<RouteSummary, RouteError> {
        let origin = LatLng::try_from_f64(from.lat, from.lng)
            .map_err(|err| RouteError::Provider(err.to_string()))?;
        let destination = LatLng::try_from_f64(to.lat, to.lng)
            .map_err(|err| RouteError::Provider(err.to_string()))?;

        let response = self
            .client
            .directions(Location::LatLng(origin), Location::LatLng(destination))
            .with_travel_mode(TravelMode::Driving)
            .execute()
            .await
            .map_err(|err| RouteError::Provider(err.to_string()))?;
        let route = response.routes.first().ok_or(RouteError::NoRoute)?;
        trace!("Received driving route from Google Maps directions API.");

        let mut polyline = Vec::new();
        let mut distance_meters = 0.0;
        for leg in &route.legs {
            distance_meters += leg.distance.value.to_f64().unwrap_or_default();
            for step in &leg.steps {
                polyline.push(coordinate_from(&step.start_location));
            }
            if let Some(step) = leg.steps.last() {
                polyline.push(coordinate_from(&step.end_location));
            }
        }

        Ok(RouteSummary {
            polyline,
            distance_meters,
        })
    }
}
