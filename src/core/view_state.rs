use std::collections::HashSet;

use crate::core::ranking::{annotate_distances, rank};
use crate::models::{Coordinates, Place, SortOrder, View};

/// Typed actions accepted by the view-state reducer
#[derive(Debug, Clone, PartialEq)]
pub enum ViewAction {
    SetView(View),
    SetSort(SortOrder),
    ToggleFavorite(String),
    SetSearch(String),
    SetLocation(Option<Coordinates>),
    /// Result of a fetch command, fed back by the I/O adapter
    PlacesLoaded { seq: u64, places: Vec<Place> },
    FetchFailed { seq: u64, reason: String },
}

/// Request for the I/O adapter; never performed by the controller itself
#[derive(Debug, Clone, PartialEq)]
pub enum FetchCommand {
    /// `center` is where to search; `origin` is the user's location, if known
    Nearby { seq: u64, center: Coordinates, origin: Option<Coordinates>, radius_m: u32 },
    Search { seq: u64, query: String, location: Option<Coordinates> },
}

impl FetchCommand {
    pub fn seq(&self) -> u64 {
        match self {
            FetchCommand::Nearby { seq, .. } | FetchCommand::Search { seq, .. } => *seq,
        }
    }
}

/// Fixed inputs for fetch commands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchDefaults {
    /// Used when the user location is unknown
    pub default_center: Coordinates,
    pub radius_m: u32,
}

impl Default for FetchDefaults {
    fn default() -> Self {
        Self {
            default_center: Coordinates::new(19.432608, -99.133209),
            radius_m: 5000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub view: View,
    pub search: String,
    pub sort: SortOrder,
    pub favorites: HashSet<String>,
    pub user_location: Option<Coordinates>,
    /// Last successfully loaded canonical list
    pub places: Vec<Place>,
    pub loading: bool,
    /// Sequence number of the most recently issued fetch
    pub latest_seq: u64,
}

/// Apply one action, returning the new state and any fetch commands
pub fn reduce(mut state: ViewState, action: ViewAction, defaults: &FetchDefaults) -> (ViewState, Vec<FetchCommand>) {
    let mut commands = Vec::new();

    match action {
        ViewAction::SetView(view) => {
            state.view = view;
            if view == View::Nearby && state.search.trim().is_empty() {
                commands.push(nearby_command(&mut state, defaults));
            }
        }
        ViewAction::SetSort(sort) => state.sort = sort,
        ViewAction::ToggleFavorite(id) => {
            if !state.favorites.remove(&id) {
                state.favorites.insert(id);
            }
        }
        ViewAction::SetSearch(text) => {
            if text != state.search {
                state.search = text;
                let query = state.search.trim().to_string();
                if !query.is_empty() {
                    state.latest_seq += 1;
                    state.loading = true;
                    commands.push(FetchCommand::Search {
                        seq: state.latest_seq,
                        query,
                        location: state.user_location,
                    });
                } else if state.view == View::Nearby {
                    commands.push(nearby_command(&mut state, defaults));
                }
            }
        }
        ViewAction::SetLocation(location) => {
            let changed = location != state.user_location;
            state.user_location = location;
            if changed && state.view == View::Nearby && state.search.trim().is_empty() {
                commands.push(nearby_command(&mut state, defaults));
            }
        }
        ViewAction::PlacesLoaded { seq, places } => {
            if seq < state.latest_seq {
                tracing::debug!("Discarding stale response {} (latest {})", seq, state.latest_seq);
            } else {
                tracing::debug!("Loaded {} places for request {}", places.len(), seq);
                state.places = places;
                state.loading = false;
            }
        }
        ViewAction::FetchFailed { seq, reason } => {
            if seq >= state.latest_seq {
                tracing::warn!(
                    "Fetch {} failed, keeping {} last-known places: {}",
                    seq,
                    state.places.len(),
                    reason
                );
                state.loading = false;
            }
        }
    }

    (state, commands)
}

fn nearby_command(state: &mut ViewState, defaults: &FetchDefaults) -> FetchCommand {
    state.latest_seq += 1;
    state.loading = true;
    FetchCommand::Nearby {
        seq: state.latest_seq,
        center: state.user_location.unwrap_or(defaults.default_center),
        origin: state.user_location,
        radius_m: defaults.radius_m,
    }
}

/// Case-insensitive substring match on name or address
pub fn matches_text(place: &Place, needle_lower: &str) -> bool {
    needle_lower.is_empty()
        || place.name.to_lowercase().contains(needle_lower)
        || place.address.to_lowercase().contains(needle_lower)
}

/// Ranked, text-filtered and (for the favorites view) favorite-filtered list
///
/// Distances are always measured from the current user location and are
/// left empty while it is unknown.
pub fn display_list(state: &ViewState) -> Vec<Place> {
    let needle = state.search.trim().to_lowercase();

    let mut places = state.places.clone();
    for place in places.iter_mut() {
        place.distance_km = None;
    }
    if let Some(origin) = state.user_location {
        annotate_distances(&mut places, origin);
    }

    rank(places, state.sort, state.user_location)
        .into_iter()
        .filter(|p| matches_text(p, &needle))
        .filter(|p| state.view != View::Favorites || state.favorites.contains(&p.id))
        .collect()
}

/// Owner of [`ViewState`]; the presentation layer talks to this
#[derive(Debug, Clone, Default)]
pub struct ViewStateController {
    state: ViewState,
    defaults: FetchDefaults,
}

impl ViewStateController {
    pub fn new(defaults: FetchDefaults) -> Self {
        Self {
            state: ViewState::default(),
            defaults,
        }
    }

    pub fn dispatch(&mut self, action: ViewAction) -> Vec<FetchCommand> {
        let state = std::mem::take(&mut self.state);
        let (next, commands) = reduce(state, action, &self.defaults);
        self.state = next;
        commands
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn display_list(&self) -> Vec<Place> {
        display_list(&self.state)
    }

    /// Display records that can be positioned on a map
    pub fn map_markers(&self) -> Vec<Place> {
        self.display_list()
            .into_iter()
            .filter(|p| p.coordinates().is_some())
            .collect()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.state.favorites.contains(id)
    }
}
