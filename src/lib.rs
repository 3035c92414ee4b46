pub mod fmt;
pub mod planner;
pub mod services;

use thiserror::Error;

pub type GenericError = Box<dyn std::error::Error + Send + Sync>;

/// Autocomplete provider failure. Never fatal: the caller logs it and
/// leaves the current suggestion list unchanged.
#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("autocomplete provider failure: {0}")]
    Provider(String),
}

/// Forward or reverse geocoding failure.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("no place matches the requested location")]
    NoMatch,
    #[error("geocoding provider failure: {0}")]
    Provider(String),
}

/// Driving-route computation failure.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("no drivable route between the requested coordinates")]
    NoRoute,
    #[error("directions provider failure: {0}")]
    Provider(String),
}

pub use planner::{
    ActiveField, DisplayCommand, PlannerHandle, PlannerInput, PlannerPhase, TripPlanner, TripState,
};
pub use services::{Coordinate, PlaceSuggestion, RouteSummary};
