//! Touch-drag state machine for the draggable results panel.
//!
//! The panel is driven by [`PanelEvent`]s coming from the UI shell. Each event
//! goes through [`step`], a pure function returning the next [`GestureState`]
//! and the [`PanelEffect`]s the shell has to carry out (frame callbacks and the
//! settle timer). [`GestureController`] owns the state and is the only writer.

use serde::{Deserialize, Serialize};

/// Height the panel opens at, and returns to after closing
pub const DEFAULT_HEIGHT_PERCENT: f64 = 75.0;
/// Upper clamp for the panel height
pub const MAX_HEIGHT_PERCENT: f64 = 90.0;
/// Lower clamp for the panel height
pub const MIN_HEIGHT_PERCENT: f64 = 0.0;

/// Fixed snap stops
pub const SNAP_LOW: f64 = 25.0;
pub const SNAP_MID: f64 = 75.0;
pub const SNAP_HIGH: f64 = 90.0;

/// Velocity and distance thresholds for the drag-end decision
///
/// Velocities are in px/ms, distances in px, heights in percent of the
/// viewport. The close rules are evaluated in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureThresholds {
    /// Rule 1: downward faster than this closes
    pub fast_close_velocity: f64,
    /// Rule 2: downward further than this closes
    pub long_close_distance_px: f64,
    /// Rule 3: ending below this height closes
    pub min_open_height_percent: f64,
    /// Rule 4
    pub medium_close_velocity: f64,
    pub medium_close_distance_px: f64,
    /// Rule 5 (flick)
    pub flick_velocity: f64,
    pub flick_distance_px: f64,
    /// Rule 6
    pub slow_close_velocity: f64,
    pub slow_close_distance_px: f64,
    /// Upward gestures faster than this snap to the top stop
    pub snap_up_velocity: f64,
    /// Bucketing bounds for position-based snapping
    pub low_bucket_below_percent: f64,
    pub high_bucket_above_percent: f64,
    /// Durations shorter than this count as zero (velocity 0)
    pub min_duration_ms: f64,
    /// Length of the Closing phase
    pub settle_ms: u64,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            fast_close_velocity: 0.5,
            long_close_distance_px: 100.0,
            min_open_height_percent: 30.0,
            medium_close_velocity: 0.2,
            medium_close_distance_px: 50.0,
            flick_velocity: 0.8,
            flick_distance_px: 80.0,
            slow_close_velocity: 0.15,
            slow_close_distance_px: 150.0,
            snap_up_velocity: 0.3,
            low_bucket_below_percent: 45.0,
            high_bucket_above_percent: 70.0,
            min_duration_ms: 1.0,
            settle_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelPhase {
    Closed,
    Open,
    Dragging,
    Closing,
}

/// Drag bookkeeping captured on drag start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub start_y: f64,
    pub start_height_percent: f64,
    pub start_time_ms: f64,
    pub last_sample_y: f64,
    pub last_sample_time_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    y: f64,
    time_ms: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GestureState {
    pub phase: PanelPhase,
    pub panel_height_percent: f64,
    pub drag: Option<DragSession>,
    /// Move sample waiting for the next animation frame
    pending_sample: Option<Sample>,
    settle_token: Option<u64>,
    next_token: u64,
}

impl Default for GestureState {
    fn default() -> Self {
        Self {
            phase: PanelPhase::Closed,
            panel_height_percent: DEFAULT_HEIGHT_PERCENT,
            drag: None,
            pending_sample: None,
            settle_token: None,
            next_token: 0,
        }
    }
}

impl GestureState {
    pub fn dragging(&self) -> bool {
        self.phase == PanelPhase::Dragging
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEvent {
    Open,
    Close,
    HandleTap,
    DragStart { y: f64, now_ms: f64, on_handle: bool },
    DragMove { y: f64, now_ms: f64 },
    /// The animation frame requested by [`PanelEffect::RequestFrame`] fired
    FrameTick,
    DragEnd { now_ms: f64 },
    SettleElapsed { token: u64 },
}

/// Side effects the shell performs on behalf of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEffect {
    RequestFrame,
    CancelFrame,
    ScheduleSettle { token: u64, delay_ms: u64 },
    CancelSettle { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseRule {
    FastDown,
    LongDown,
    BelowMinHeight,
    MediumDown,
    Flick,
    SlowLongDown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    Close(CloseRule),
    Snap(f64),
}

/// Totals measured at drag end
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragMetrics {
    /// Positive means the finger moved up
    pub distance_px: f64,
    pub duration_ms: f64,
    /// px/ms, zero when the duration is below the epsilon
    pub velocity: f64,
    pub height_percent: f64,
}

impl DragMetrics {
    pub fn measure(
        session: &DragSession,
        now_ms: f64,
        height_percent: f64,
        thresholds: &GestureThresholds,
    ) -> Self {
        let distance_px = session.start_y - session.last_sample_y;
        let duration_ms = now_ms - session.start_time_ms;
        let velocity = if duration_ms < thresholds.min_duration_ms {
            0.0
        } else {
            distance_px.abs() / duration_ms
        };

        Self {
            distance_px,
            duration_ms: duration_ms.max(0.0),
            velocity,
            height_percent,
        }
    }

    pub fn downward(&self) -> bool {
        self.distance_px < 0.0
    }

    pub fn upward(&self) -> bool {
        self.distance_px > 0.0
    }
}

/// Decide between closing and snapping once a drag ends
///
/// Close rules are checked in order and the first match wins. Without a
/// match the panel snaps to one of the fixed stops.
pub fn classify(m: &DragMetrics, t: &GestureThresholds) -> DragOutcome {
    let down = m.downward();
    let dist = m.distance_px.abs();

    if down && m.velocity > t.fast_close_velocity {
        return DragOutcome::Close(CloseRule::FastDown);
    }
    if down && dist > t.long_close_distance_px {
        return DragOutcome::Close(CloseRule::LongDown);
    }
    if m.height_percent < t.min_open_height_percent {
        return DragOutcome::Close(CloseRule::BelowMinHeight);
    }
    if down && m.velocity > t.medium_close_velocity && dist > t.medium_close_distance_px {
        return DragOutcome::Close(CloseRule::MediumDown);
    }
    if m.velocity > t.flick_velocity && dist > t.flick_distance_px && down {
        return DragOutcome::Close(CloseRule::Flick);
    }
    if down && m.velocity > t.slow_close_velocity && dist > t.slow_close_distance_px {
        return DragOutcome::Close(CloseRule::SlowLongDown);
    }

    let stop = if m.upward() && m.velocity > t.snap_up_velocity {
        SNAP_HIGH
    } else if down {
        SNAP_LOW
    } else if m.height_percent < t.low_bucket_below_percent {
        SNAP_LOW
    } else if m.height_percent > t.high_bucket_above_percent {
        SNAP_HIGH
    } else {
        SNAP_MID
    };

    DragOutcome::Snap(stop)
}

/// Static inputs for [`step`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelContext {
    pub thresholds: GestureThresholds,
    pub viewport_height_px: f64,
}

/// Advance the panel state machine by one event
pub fn step(state: &GestureState, event: PanelEvent, ctx: &PanelContext) -> (GestureState, Vec<PanelEffect>) {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match (state.phase, event) {
        (PanelPhase::Closed, PanelEvent::Open) => {
            next.phase = PanelPhase::Open;
            next.panel_height_percent = DEFAULT_HEIGHT_PERCENT;
        }
        (PanelPhase::Closing, PanelEvent::Open) => {
            cancel_settle(&mut next, &mut effects);
            next.phase = PanelPhase::Open;
            next.panel_height_percent = DEFAULT_HEIGHT_PERCENT;
        }

        (PanelPhase::Open, PanelEvent::Close) => begin_close(&mut next, &mut effects, ctx),
        (PanelPhase::Dragging, PanelEvent::Close) => {
            cancel_frame(&mut next, &mut effects);
            next.drag = None;
            begin_close(&mut next, &mut effects, ctx);
        }

        (PanelPhase::Open, PanelEvent::HandleTap) => {
            next.panel_height_percent = if state.panel_height_percent <= SNAP_LOW {
                SNAP_MID
            } else {
                SNAP_LOW
            };
        }

        (PanelPhase::Open | PanelPhase::Closing, PanelEvent::DragStart { y, now_ms, on_handle: true }) => {
            cancel_settle(&mut next, &mut effects);
            cancel_frame(&mut next, &mut effects);
            next.phase = PanelPhase::Dragging;
            next.drag = Some(DragSession {
                start_y: y,
                start_height_percent: state.panel_height_percent,
                start_time_ms: now_ms,
                last_sample_y: y,
                last_sample_time_ms: now_ms,
            });
        }

        (PanelPhase::Dragging, PanelEvent::DragMove { y, now_ms }) => {
            if next.pending_sample.is_some() {
                tracing::trace!("Frame pending, dropping drag sample at y={}", y);
            } else {
                next.pending_sample = Some(Sample { y, time_ms: now_ms });
                effects.push(PanelEffect::RequestFrame);
            }
        }

        (PanelPhase::Dragging, PanelEvent::FrameTick) => apply_pending_sample(&mut next, ctx),

        (PanelPhase::Dragging, PanelEvent::DragEnd { now_ms }) => {
            if next.pending_sample.is_some() {
                effects.push(PanelEffect::CancelFrame);
                apply_pending_sample(&mut next, ctx);
            }
            if let Some(session) = next.drag.take() {
                let metrics = DragMetrics::measure(
                    &session,
                    now_ms,
                    next.panel_height_percent,
                    &ctx.thresholds,
                );
                match classify(&metrics, &ctx.thresholds) {
                    DragOutcome::Close(rule) => {
                        tracing::debug!(
                            "Drag closed panel via {:?} (distance={}px, velocity={:.3}px/ms)",
                            rule,
                            metrics.distance_px,
                            metrics.velocity
                        );
                        begin_close(&mut next, &mut effects, ctx);
                    }
                    DragOutcome::Snap(stop) => {
                        tracing::debug!("Drag snapped panel to {}%", stop);
                        next.phase = PanelPhase::Open;
                        next.panel_height_percent = stop;
                    }
                }
            }
        }

        (PanelPhase::Closing, PanelEvent::SettleElapsed { token }) if state.settle_token == Some(token) => {
            next.phase = PanelPhase::Closed;
            next.settle_token = None;
            next.panel_height_percent = DEFAULT_HEIGHT_PERCENT;
        }

        (phase, PanelEvent::SettleElapsed { token }) => {
            tracing::trace!("Ignoring stale settle token {} in {:?}", token, phase);
        }

        _ => {}
    }

    (next, effects)
}

fn begin_close(next: &mut GestureState, effects: &mut Vec<PanelEffect>, ctx: &PanelContext) {
    let token = next.next_token;
    next.next_token += 1;
    next.phase = PanelPhase::Closing;
    next.settle_token = Some(token);
    effects.push(PanelEffect::ScheduleSettle {
        token,
        delay_ms: ctx.thresholds.settle_ms,
    });
}

fn cancel_settle(next: &mut GestureState, effects: &mut Vec<PanelEffect>) {
    if let Some(token) = next.settle_token.take() {
        effects.push(PanelEffect::CancelSettle { token });
    }
}

fn cancel_frame(next: &mut GestureState, effects: &mut Vec<PanelEffect>) {
    if next.pending_sample.take().is_some() {
        effects.push(PanelEffect::CancelFrame);
    }
}

fn apply_pending_sample(next: &mut GestureState, ctx: &PanelContext) {
    let (Some(sample), Some(session)) = (next.pending_sample.take(), next.drag.as_mut()) else {
        return;
    };

    let viewport = ctx.viewport_height_px.max(1.0);
    let delta_percent = (session.start_y - sample.y) / viewport * 100.0;
    next.panel_height_percent = (session.start_height_percent + delta_percent)
        .clamp(MIN_HEIGHT_PERCENT, MAX_HEIGHT_PERCENT);
    session.last_sample_y = sample.y;
    session.last_sample_time_ms = sample.time_ms;
}

/// What the shell renders
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSnapshot {
    pub panel_height_percent: f64,
    pub dragging: bool,
    pub closing: bool,
    pub phase: PanelPhase,
}

/// Owner of the panel's [`GestureState`]
#[derive(Debug, Clone)]
pub struct GestureController {
    state: GestureState,
    ctx: PanelContext,
}

impl GestureController {
    pub fn new(thresholds: GestureThresholds, viewport_height_px: f64) -> Self {
        Self {
            state: GestureState::default(),
            ctx: PanelContext {
                thresholds,
                viewport_height_px,
            },
        }
    }

    pub fn with_default_thresholds(viewport_height_px: f64) -> Self {
        Self::new(GestureThresholds::default(), viewport_height_px)
    }

    /// Feed one event, returning the effects to perform
    pub fn handle(&mut self, event: PanelEvent) -> Vec<PanelEffect> {
        let (next, effects) = step(&self.state, event, &self.ctx);
        if next.phase != self.state.phase {
            tracing::debug!("Panel {:?} -> {:?} on {:?}", self.state.phase, next.phase, event);
        }
        self.state = next;
        effects
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            panel_height_percent: self.state.panel_height_percent,
            dragging: self.state.dragging(),
            closing: self.state.phase == PanelPhase::Closing,
            phase: self.state.phase,
        }
    }
}
