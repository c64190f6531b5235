// Core algorithm exports
pub mod geo;
pub mod gesture;
pub mod ranking;
pub mod reconcile;
pub mod session;
pub mod view_state;

pub use geo::{bounding_box, distance_km, is_valid_coordinate};
pub use gesture::{
    classify, step, DragMetrics, DragOutcome, GestureController, GestureState, GestureThresholds,
    PanelEffect, PanelEvent, PanelPhase, PanelSnapshot,
};
pub use ranking::{annotate_distances, rank};
pub use reconcile::{ensure_identity, merge, normalize_poi};
pub use session::{Session, SessionEffects};
pub use view_state::{display_list, reduce, FetchCommand, FetchDefaults, ViewAction, ViewState, ViewStateController};
