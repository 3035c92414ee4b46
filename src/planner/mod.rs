//! The trip-planner workflow: one task owns the session state and
//! sequences autocomplete, geocoding and route computation around it.
//!
//! All resolver calls run as spawned tasks; their completions come back
//! over the planner's channel tagged with the generation they were
//! issued under. Superseding an operation aborts the old task and bumps
//! the generation, so a stale completion is never applied.

mod generation;

use std::sync::Arc;

use log::*;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::fmt;
use crate::services::directions::RouteResolver;
use crate::services::geocoding::{PlaceResolver, SUGGESTION_LIMIT};
use crate::services::location::LocationProvider;
use crate::services::{Coordinate, PlaceSuggestion, RouteSummary};
use crate::{ResolutionError, RouteError, SuggestionError};

use generation::{Generation, PendingOps};

/// Map drags closer than this to the previous centre do not refresh
/// the pin address.
const RECENTER_MIN_METERS: f64 = 50.0;

const CURRENT_LOCATION_LABEL: &str = "Use Current Location";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveField {
    Start,
    Destination,
}

/// One row of the suggestion list. The current-location row is
/// injected by the planner, never by the provider, and only while the
/// start field is active.
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionEntry {
    CurrentLocation,
    Place(PlaceSuggestion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerPhase {
    Idle,
    EditingStart,
    EditingDestination,
    SuggestionsShown,
    Resolving,
    RouteComputing,
    RouteDisplayed,
}

/// The mutable session state. Owned by the planner task; nothing else
/// mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct TripState {
    pub active_field: ActiveField,
    pub entries: Vec<SuggestionEntry>,
    pub start: Option<Coordinate>,
    pub destination: Option<Coordinate>,
    pub active_route: Option<RouteSummary>,
    pub phase: PlannerPhase,
}

/// Events from the display layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerInput {
    BeginEditing(ActiveField),
    TextChanged(ActiveField, String),
    /// Return key / search button: clears the list and queries the
    /// submitted text fresh.
    Submit(ActiveField, String),
    SelectEntry(usize),
    MapRecentered(Coordinate),
    Reset,
}

/// Commands to the display layer.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCommand {
    SetRegion(Coordinate),
    SetStartFieldText(String),
    SetDestinationFieldText(String),
    SetSuggestions(Vec<String>),
    SetPins {
        start: Coordinate,
        destination: Coordinate,
    },
    ShowRoute {
        polyline: Vec<Coordinate>,
        distance_label: String,
        price_label: String,
    },
    ClearRoute,
}

enum Completion {
    Suggestions {
        generation: Generation,
        result: Result<Vec<PlaceSuggestion>, SuggestionError>,
    },
    PlaceResolved {
        generation: Generation,
        field: ActiveField,
        label: String,
        result: Result<Coordinate, ResolutionError>,
    },
    CenterAddress {
        generation: Generation,
        coordinate: Coordinate,
        result: Result<String, ResolutionError>,
    },
    Route {
        generation: Generation,
        result: Result<RouteSummary, RouteError>,
    },
}

enum Message {
    Input(PlannerInput),
    Done(Completion),
}

/// Cheap cloneable sender for feeding inputs to a running planner.
#[derive(Clone)]
pub struct PlannerHandle {
    tx: UnboundedSender<Message>,
}

impl PlannerHandle {
    pub fn send(&self, input: PlannerInput) {
        if self.tx.send(Message::Input(input)).is_err() {
            warn!("Planner task is gone; dropping input.");
        }
    }
}

pub struct TripPlanner<P, R, L> {
    places: Arc<P>,
    routes: Arc<R>,
    location: L,
    state: TripState,
    previous_center: Option<Coordinate>,
    pending: PendingOps,
    rx: UnboundedReceiver<Message>,
    tx: UnboundedSender<Message>,
    display: UnboundedSender<DisplayCommand>,
}

impl<P, R, L> TripPlanner<P, R, L>
where
    P: PlaceResolver + Send + Sync + 'static,
    R: RouteResolver + Send + Sync + 'static,
    L: LocationProvider,
{
    pub fn new(
        places: P,
        routes: R,
        location: L,
    ) -> (Self, PlannerHandle, UnboundedReceiver<DisplayCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (display, display_rx) = mpsc::unbounded_channel();
        let start = location.current_coordinate();
        let planner = TripPlanner {
            places: Arc::new(places),
            routes: Arc::new(routes),
            location,
            state: TripState {
                active_field: ActiveField::Start,
                entries: Vec::new(),
                start,
                destination: None,
                active_route: None,
                phase: PlannerPhase::Idle,
            },
            previous_center: start,
            pending: PendingOps::default(),
            rx,
            tx: tx.clone(),
            display,
        };
        (planner, PlannerHandle { tx }, display_rx)
    }

    pub fn state(&self) -> &TripState {
        &self.state
    }

    pub async fn run(mut self) {
        self.start_session();
        while self.step().await {}
    }

    /// Processes one message. Public so a caller (or test) can drive
    /// the planner without handing it a whole task.
    pub async fn step(&mut self) -> bool {
        match self.rx.recv().await {
            Some(Message::Input(input)) => {
                self.handle_input(input);
                true
            }
            Some(Message::Done(done)) => {
                self.handle_completion(done);
                true
            }
            None => false,
        }
    }

    /// Centres the display on the device location and fills the start
    /// field with its address.
    pub fn start_session(&mut self) {
        self.location.start_updates();
        if let Some(coordinate) = self.location.current_coordinate() {
            self.state.start = Some(coordinate);
            self.previous_center = Some(coordinate);
            self.send_display(DisplayCommand::SetRegion(coordinate));
            self.refresh_center_address(coordinate);
        } else {
            warn!("No device location available at session start.");
        }
        self.location.stop_updates();
    }

    fn handle_input(&mut self, input: PlannerInput) {
        match input {
            PlannerInput::BeginEditing(field) => self.begin_editing(field),
            PlannerInput::TextChanged(field, text) => self.text_changed(field, text),
            PlannerInput::Submit(field, text) => {
                self.state.entries.clear();
                self.send_display(DisplayCommand::SetSuggestions(Vec::new()));
                self.text_changed(field, text);
            }
            PlannerInput::SelectEntry(index) => self.select_entry(index),
            PlannerInput::MapRecentered(center) => self.map_recentered(center),
            PlannerInput::Reset => self.reset(),
        }
    }

    fn begin_editing(&mut self, field: ActiveField) {
        self.state.active_field = field;
        self.state.phase = match field {
            ActiveField::Start => PlannerPhase::EditingStart,
            ActiveField::Destination => PlannerPhase::EditingDestination,
        };
    }

    fn text_changed(&mut self, field: ActiveField, text: String) {
        self.begin_editing(field);
        if text.trim().is_empty() {
            self.pending.suggest.cancel();
            self.replace_suggestions(Vec::new());
            return;
        }
        debug!("Issuing autocomplete query for the {field:?} field.");
        let generation = self.pending.suggest.supersede();
        let places = Arc::clone(&self.places);
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            let result = places.suggest(&text).await;
            let _ = tx.send(Message::Done(Completion::Suggestions { generation, result }));
        });
        self.pending.suggest.track(task.abort_handle());
    }

    /// The list is replaced wholesale, never merged.
    fn replace_suggestions(&mut self, suggestions: Vec<PlaceSuggestion>) {
        let mut entries = Vec::with_capacity(suggestions.len() + 1);
        if self.state.active_field == ActiveField::Start && !suggestions.is_empty() {
            entries.push(SuggestionEntry::CurrentLocation);
        }
        entries.extend(
            suggestions
                .into_iter()
                .take(SUGGESTION_LIMIT)
                .map(SuggestionEntry::Place),
        );
        self.state.entries = entries;

        let labels = self
            .state
            .entries
            .iter()
            .map(|entry| match entry {
                SuggestionEntry::CurrentLocation => CURRENT_LOCATION_LABEL.to_string(),
                SuggestionEntry::Place(place) => place.label.clone(),
            })
            .collect();
        self.send_display(DisplayCommand::SetSuggestions(labels));
    }

    fn select_entry(&mut self, index: usize) {
        let Some(entry) = self.state.entries.get(index).cloned() else {
            warn!("Selection index {index} is out of range.");
            return;
        };
        self.state.entries.clear();
        self.send_display(DisplayCommand::SetSuggestions(Vec::new()));

        match entry {
            SuggestionEntry::CurrentLocation => {
                match self.location.current_coordinate() {
                    Some(coordinate) => self.refresh_center_address(coordinate),
                    None => warn!("No known device location to fall back on."),
                }
                self.state.phase = PlannerPhase::Idle;
            }
            SuggestionEntry::Place(place) => self.resolve_selection(place),
        }
    }

    fn resolve_selection(&mut self, place: PlaceSuggestion) {
        self.state.phase = PlannerPhase::Resolving;
        let field = self.state.active_field;
        let generation = self.pending.resolve.supersede();
        let places = Arc::clone(&self.places);
        let tx = self.tx.clone();
        let label = place.label;
        let task = tokio::spawn(async move {
            let result = places.resolve_to_coordinate(&label).await;
            let _ = tx.send(Message::Done(Completion::PlaceResolved {
                generation,
                field,
                label,
                result,
            }));
        });
        self.pending.resolve.track(task.abort_handle());
    }

    fn map_recentered(&mut self, center: Coordinate) {
        if self.state.phase == PlannerPhase::RouteComputing {
            trace!("Map recentred while a route is being computed; ignoring.");
            return;
        }
        if let Some(previous) = self.previous_center {
            if previous.distance_meters(center) <= RECENTER_MIN_METERS {
                return;
            }
        }
        self.previous_center = Some(center);
        self.refresh_center_address(center);
    }

    fn refresh_center_address(&mut self, coordinate: Coordinate) {
        let generation = self.pending.reverse.supersede();
        let places = Arc::clone(&self.places);
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            let result = places.resolve_to_address(coordinate).await;
            let _ = tx.send(Message::Done(Completion::CenterAddress {
                generation,
                coordinate,
                result,
            }));
        });
        self.pending.reverse.track(task.abort_handle());
    }

    fn compute_route(&mut self, from: Coordinate, to: Coordinate) {
        self.state.phase = PlannerPhase::RouteComputing;
        debug!(
            "Computing driving route ({:.4}, {:.4}) -> ({:.4}, {:.4}).",
            from.lat, from.lng, to.lat, to.lng
        );
        let generation = self.pending.route.supersede();
        let routes = Arc::clone(&self.routes);
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            let result = routes.compute_route(from, to).await;
            let _ = tx.send(Message::Done(Completion::Route { generation, result }));
        });
        self.pending.route.track(task.abort_handle());
    }

    fn reset(&mut self) {
        self.pending.cancel_all();
        self.state.entries.clear();
        self.state.destination = None;
        self.state.active_route = None;
        self.state.phase = PlannerPhase::Idle;
        self.location.start_updates();
        self.state.start = self.location.current_coordinate();
        self.previous_center = self.state.start;
        self.location.stop_updates();

        self.send_display(DisplayCommand::SetSuggestions(Vec::new()));
        self.send_display(DisplayCommand::SetDestinationFieldText(String::new()));
        self.send_display(DisplayCommand::ClearRoute);
        if let Some(coordinate) = self.state.start {
            self.send_display(DisplayCommand::SetRegion(coordinate));
            self.refresh_center_address(coordinate);
        }
    }

    fn handle_completion(&mut self, done: Completion) {
        match done {
            Completion::Suggestions { generation, result } => {
                if !self.pending.suggest.matches(generation) {
                    trace!("Discarding stale autocomplete response.");
                    return;
                }
                match result {
                    Ok(suggestions) => {
                        self.replace_suggestions(suggestions);
                        self.state.phase = PlannerPhase::SuggestionsShown;
                    }
                    Err(err) => warn!("Autocomplete failed: {err}"),
                }
            }
            Completion::PlaceResolved {
                generation,
                field,
                label,
                result,
            } => {
                if !self.pending.resolve.matches(generation) {
                    trace!("Discarding stale geocoding response.");
                    return;
                }
                match result {
                    Ok(coordinate) => self.place_resolved(field, label, coordinate),
                    Err(err) => {
                        warn!("Could not resolve \"{label}\": {err}");
                        self.state.phase = PlannerPhase::Idle;
                    }
                }
            }
            Completion::CenterAddress {
                generation,
                coordinate,
                result,
            } => {
                if !self.pending.reverse.matches(generation) {
                    trace!("Discarding stale reverse geocoding response.");
                    return;
                }
                match result {
                    Ok(address) => {
                        self.state.start = Some(coordinate);
                        self.send_display(DisplayCommand::SetStartFieldText(address));
                    }
                    Err(err) => warn!("Reverse geocoding failed: {err}"),
                }
            }
            Completion::Route { generation, result } => {
                if !self.pending.route.matches(generation) {
                    trace!("Discarding superseded route result.");
                    return;
                }
                match result {
                    Ok(route) => {
                        self.send_display(DisplayCommand::ShowRoute {
                            polyline: route.polyline.clone(),
                            distance_label: fmt::distance_label(route.distance_meters),
                            price_label: fmt::price_label(route.distance_meters),
                        });
                        self.state.active_route = Some(route);
                    }
                    Err(err) => {
                        // Labels keep their previous values; no retry.
                        warn!("Route computation failed: {err}");
                        self.state.active_route = None;
                    }
                }
                self.state.phase = PlannerPhase::RouteDisplayed;
            }
        }
    }

    fn place_resolved(&mut self, field: ActiveField, label: String, coordinate: Coordinate) {
        match field {
            ActiveField::Start => {
                self.state.start = Some(coordinate);
                self.previous_center = Some(coordinate);
                self.send_display(DisplayCommand::SetStartFieldText(label));
                self.state.phase = PlannerPhase::Idle;
            }
            ActiveField::Destination => {
                self.state.destination = Some(coordinate);
                self.send_display(DisplayCommand::SetDestinationFieldText(label));
                let start = self
                    .state
                    .start
                    .or_else(|| self.location.current_coordinate());
                let Some(start) = start else {
                    warn!("No start coordinate available; cannot compute a route.");
                    self.state.phase = PlannerPhase::Idle;
                    return;
                };
                self.state.start = Some(start);
                self.send_display(DisplayCommand::SetRegion(coordinate));
                self.send_display(DisplayCommand::SetPins {
                    start,
                    destination: coordinate,
                });
                self.compute_route(start, coordinate);
            }
        }
    }

    fn send_display(&self, command: DisplayCommand) {
        if self.display.send(command).is_err() {
            trace!("Display side is gone; dropping command.");
        }
    }
}
