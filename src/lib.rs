//! Placefinder - nearby place discovery core
//!
//! Merges results from the place directory and OpenStreetMap, ranks them
//! around the user, and drives the draggable results panel through pure
//! state machines that hosts feed events into.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{distance_km, merge, rank, GestureController, Session, ViewStateController};
pub use models::{Coordinates, Place, PlaceSource, SortOrder, View};
