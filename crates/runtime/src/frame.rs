use foundation::time::Time;

/// Frame metadata handed to everything animated by the frame loop.
///
/// Browsers deliver frames at a variable rate, so each frame carries its own
/// delta. Construction stays pure so frame sequences can be replayed in tests.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time since the previous frame (seconds).
    pub dt_s: f64,
    /// Time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    /// Nominal delta of a 60 Hz display.
    pub const NOMINAL_DT_S: f64 = 1.0 / 60.0;

    /// Upper bound on a single delta. Longer gaps (a backgrounded tab) are
    /// treated as one slow frame.
    pub const MAX_DT_S: f64 = 0.25;

    /// Fixed-rate frame `index`.
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    /// The frame starting at `time` with no elapsed delta.
    pub fn first(time: Time) -> Self {
        Self {
            index: 0,
            dt_s: 0.0,
            time,
        }
    }

    pub fn next(self) -> Self {
        self.advance(self.dt_s)
    }

    /// Next frame after `dt_s` seconds; negative or non-finite deltas count as 0.
    pub fn advance(self, dt_s: f64) -> Self {
        let dt_s = if dt_s.is_finite() {
            dt_s.clamp(0.0, Self::MAX_DT_S)
        } else {
            0.0
        };
        Self {
            index: self.index + 1,
            dt_s,
            time: Time(self.time.0 + dt_s),
        }
    }

    /// Advance to an absolute timestamp, as reported by `requestAnimationFrame`.
    pub fn advance_to(self, now: Time) -> Self {
        self.advance(now.since(self.time))
    }

    /// This frame's delta measured in nominal 60 Hz ticks.
    pub fn ticks(&self) -> f64 {
        self.dt_s / Self::NOMINAL_DT_S
    }
}
