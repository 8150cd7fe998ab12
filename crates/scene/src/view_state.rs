//! Globe orientation state machine.
//!
//! Owns the current [`ViewRotation`] and everything that changes it:
//! - auto-rotation while a query is loading (and optionally when idle)
//! - eased transitions to a route or a clicked region
//! - pointer drags
//!
//! Transitions are tasks on the controller's own [`Timeline`], so starting a
//! new one, starting a drag, or tearing the controller down cancels the
//! previous task and nothing keeps writing to the rotation afterwards.

use foundation::math::{GeoCoord, ViewRotation, great_circle_midpoint};
use foundation::time::Time;
use runtime::{Easing, Frame, TaskHandle, Timeline, Tween};

/// Pitch limit (degrees). Dragging past a pole is clamped.
const MAX_PITCH_DEG: f64 = 90.0;

/// Controller tuning. Defaults reproduce the stock globe behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewConfig {
    /// Yaw added per nominal 60 Hz frame while auto-rotating (degrees).
    pub auto_rotate_deg_per_tick: f64,
    /// Keep spinning when nothing is loading.
    pub idle_auto_rotate: bool,
    /// Duration of the transition to a route (seconds).
    pub route_transition_s: f64,
    /// Duration of the transition to a clicked region (seconds).
    pub region_transition_s: f64,
    /// Drag factor; degrees per pixel is `drag_sensitivity / scale`.
    pub drag_sensitivity: f64,
    pub easing: Easing,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            auto_rotate_deg_per_tick: 0.5,
            idle_auto_rotate: false,
            route_transition_s: 1.5,
            region_transition_s: 1.0,
            drag_sensitivity: 75.0,
            easing: Easing::CubicInOut,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Idle,
    Loading,
    Transitioning,
    UserDrag,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    handle: TaskHandle,
    from: ViewRotation,
    to: ViewRotation,
}

#[derive(Debug)]
pub struct ViewStateController {
    config: ViewConfig,
    rotation: ViewRotation,
    /// Globe radius in pixels; drag speed depends on it.
    scale: f64,
    loading: bool,
    dragging: bool,
    transition: Option<Transition>,
    timeline: Timeline,
    /// Time of the last frame seen; new transitions start here.
    now: Time,
}

impl ViewStateController {
    pub fn new(config: ViewConfig, scale: f64) -> Self {
        Self {
            config,
            rotation: ViewRotation::default(),
            scale,
            loading: false,
            dragging: false,
            transition: None,
            timeline: Timeline::new(),
            now: Time::default(),
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn rotation(&self) -> ViewRotation {
        self.rotation
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn mode(&self) -> ViewMode {
        if self.dragging {
            ViewMode::UserDrag
        } else if self.transition.is_some() {
            ViewMode::Transitioning
        } else if self.loading {
            ViewMode::Loading
        } else {
            ViewMode::Idle
        }
    }

    /// Turns loading auto-rotation on or off. Turning it on abandons any
    /// transition in flight.
    pub fn set_loading(&mut self, loading: bool) {
        if loading && !self.loading {
            self.cancel_transition();
        }
        self.loading = loading;
    }

    /// Eases toward the route: the great-circle midpoint when both ends are
    /// known, the origin when only it is. Ignored while loading.
    ///
    /// Returns `true` if a transition started.
    pub fn focus_route(&mut self, origin: Option<GeoCoord>, destination: Option<GeoCoord>) -> bool {
        if self.loading {
            return false;
        }
        let target = match (origin, destination) {
            (Some(o), Some(d)) => great_circle_midpoint(o, d),
            (Some(o), None) => o,
            _ => return false,
        };
        self.transition_to(target, self.config.route_transition_s);
        true
    }

    /// Interrupts whatever transition is running and eases toward `target`.
    pub fn focus_point(&mut self, target: GeoCoord) {
        self.transition_to(target, self.config.region_transition_s);
    }

    fn transition_to(&mut self, target: GeoCoord, duration_s: f64) {
        self.cancel_transition();
        let handle = self
            .timeline
            .start(self.now, Tween::once(duration_s, self.config.easing));
        self.transition = Some(Transition {
            handle,
            from: self.rotation,
            to: ViewRotation::centering(target),
        });
        tracing::debug!(lat = target.lat, lng = target.lng, duration_s, "view transition");
    }

    fn cancel_transition(&mut self) {
        if let Some(t) = self.transition.take() {
            self.timeline.cancel(t.handle);
        }
    }

    pub fn begin_drag(&mut self) {
        self.cancel_transition();
        self.dragging = true;
    }

    /// Applies a pointer delta in pixels. Ignored unless a drag is active.
    pub fn drag(&mut self, dx: f64, dy: f64) -> bool {
        if !self.dragging || self.scale <= 0.0 {
            return false;
        }
        let k = self.config.drag_sensitivity / self.scale;
        self.rotation.yaw = wrap_degrees(self.rotation.yaw + dx * k);
        self.rotation.pitch = (self.rotation.pitch - dy * k).clamp(-MAX_PITCH_DEG, MAX_PITCH_DEG);
        dx != 0.0 || dy != 0.0
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Advances to `frame`. Returns `true` if the rotation changed.
    pub fn tick(&mut self, frame: Frame) -> bool {
        self.now = frame.time;
        let before = self.rotation;

        if let Some(t) = self.transition {
            match self.timeline.sample(t.handle, frame.time) {
                Some(sample) => {
                    self.rotation = interpolate(t.from, t.to, sample.eased);
                    if sample.finished {
                        self.transition = None;
                    }
                }
                None => self.transition = None,
            }
        } else if !self.dragging && (self.loading || self.config.idle_auto_rotate) {
            self.rotation.yaw = wrap_degrees(
                self.rotation.yaw + self.config.auto_rotate_deg_per_tick * frame.ticks(),
            );
        }

        self.rotation != before
    }

    /// Cancels every task. The controller stays usable.
    pub fn teardown(&mut self) {
        self.timeline.cancel_all();
        self.transition = None;
        self.dragging = false;
        self.loading = false;
    }
}

/// Maps degrees into `[-180, 180)`.
fn wrap_degrees(deg: f64) -> f64 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

/// Yaw takes the shorter way round; pitch and roll are linear.
fn interpolate(from: ViewRotation, to: ViewRotation, t: f64) -> ViewRotation {
    let dyaw = wrap_degrees(to.yaw - from.yaw);
    ViewRotation::new(
        wrap_degrees(from.yaw + dyaw * t),
        from.pitch + (to.pitch - from.pitch) * t,
        from.roll + (to.roll - from.roll) * t,
    )
}
