use crate::core::gesture::{GestureController, GestureThresholds, PanelEffect, PanelEvent, PanelSnapshot};
use crate::core::view_state::{FetchCommand, FetchDefaults, ViewAction, ViewStateController};
use crate::models::{Place, SortOrder, View};

/// Everything a command asks the shell to do
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionEffects {
    pub fetch: Vec<FetchCommand>,
    pub panel: Vec<PanelEffect>,
}

/// Command surface exposed to the presentation layer
///
/// Wires the view-state controller and the panel gesture controller together
/// without letting either one reach into the other.
#[derive(Debug, Clone)]
pub struct Session {
    view: ViewStateController,
    panel: GestureController,
}

impl Session {
    pub fn new(defaults: FetchDefaults, thresholds: GestureThresholds, viewport_height_px: f64) -> Self {
        Self {
            view: ViewStateController::new(defaults),
            panel: GestureController::new(thresholds, viewport_height_px),
        }
    }

    /// Show a view in the results panel
    pub fn open(&mut self, view: View) -> SessionEffects {
        SessionEffects {
            fetch: self.view.dispatch(ViewAction::SetView(view)),
            panel: self.panel.handle(PanelEvent::Open),
        }
    }

    pub fn close(&mut self) -> Vec<PanelEffect> {
        self.panel.handle(PanelEvent::Close)
    }

    pub fn set_sort_order(&mut self, sort: SortOrder) -> Vec<FetchCommand> {
        self.view.dispatch(ViewAction::SetSort(sort))
    }

    pub fn toggle_favorite(&mut self, id: impl Into<String>) -> Vec<FetchCommand> {
        self.view.dispatch(ViewAction::ToggleFavorite(id.into()))
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) -> Vec<FetchCommand> {
        self.view.dispatch(ViewAction::SetSearch(text.into()))
    }

    /// Raw touch and timer events for the panel
    pub fn panel_event(&mut self, event: PanelEvent) -> Vec<PanelEffect> {
        self.panel.handle(event)
    }

    /// Fetch results, location updates and other view actions
    pub fn dispatch(&mut self, action: ViewAction) -> Vec<FetchCommand> {
        self.view.dispatch(action)
    }

    pub fn display_list(&self) -> Vec<Place> {
        self.view.display_list()
    }

    pub fn panel_snapshot(&self) -> PanelSnapshot {
        self.panel.snapshot()
    }

    pub fn view_state(&self) -> &ViewStateController {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gesture::PanelPhase;

    #[test]
    fn test_open_nearby_fetches_and_opens_panel() {
        let mut session = Session::new(FetchDefaults::default(), GestureThresholds::default(), 800.0);

        let effects = session.open(View::Nearby);

        assert_eq!(effects.fetch.len(), 1);
        assert!(effects.panel.is_empty());
        assert_eq!(session.panel_snapshot().phase, PanelPhase::Open);
        assert_eq!(session.panel_snapshot().panel_height_percent, 75.0);
    }

    #[test]
    fn test_close_schedules_settle() {
        let mut session = Session::new(FetchDefaults::default(), GestureThresholds::default(), 800.0);
        session.open(View::Favorites);

        let effects = session.close();

        assert_eq!(effects, vec![PanelEffect::ScheduleSettle { token: 0, delay_ms: 250 }]);
        assert!(session.panel_snapshot().closing);
    }
}
