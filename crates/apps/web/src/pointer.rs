//! Maps pointer input on the globe SVG back to globe targets.

use scene::globe::HoverTarget;

/// Pixels a press may travel and still count as a click.
pub const CLICK_SLOP_PX: f64 = 3.0;

/// Resolves the `data-role` / `data-index` attributes of the element under
/// the pointer.
pub fn hover_target(role: Option<&str>, index: Option<&str>) -> Option<HoverTarget> {
    match role? {
        "region" => index?.parse().ok().map(HoverTarget::Region),
        "origin" => Some(HoverTarget::Origin),
        "destination" => Some(HoverTarget::Destination),
        _ => None,
    }
}

/// Turns absolute pointer positions into drag deltas.
#[derive(Debug, Default, Clone, Copy)]
pub struct DragTracker {
    last: Option<(f64, f64)>,
    travelled: f64,
}

impl DragTracker {
    pub fn press(&mut self, x: f64, y: f64) {
        self.last = Some((x, y));
        self.travelled = 0.0;
    }

    pub fn is_pressed(&self) -> bool {
        self.last.is_some()
    }

    /// Delta since the previous position, or `None` when not pressed.
    pub fn move_to(&mut self, x: f64, y: f64) -> Option<(f64, f64)> {
        let (lx, ly) = self.last?;
        self.last = Some((x, y));
        let (dx, dy) = (x - lx, y - ly);
        self.travelled += dx.hypot(dy);
        Some((dx, dy))
    }

    /// Ends the press. Returns `true` if it was a click rather than a drag.
    pub fn release(&mut self) -> bool {
        let was_click = self.last.is_some() && self.travelled <= CLICK_SLOP_PX;
        self.last = None;
        was_click
    }
}
