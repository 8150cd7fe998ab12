/// Easing curves mapping normalized progress `t ∈ [0, 1]` to eased progress.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    QuadInOut,
    #[default]
    CubicInOut,
    CircleOut,
}

impl Easing {
    /// Input is clamped to `[0, 1]`; NaN maps to 0.
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::CircleOut => (1.0 - (t - 1.0).powi(2)).max(0.0).sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Easing;

    const ALL: [Easing; 4] = [
        Easing::Linear,
        Easing::QuadInOut,
        Easing::CubicInOut,
        Easing::CircleOut,
    ];

    #[test]
    fn endpoints_are_fixed() {
        for e in ALL {
            assert_eq!(e.apply(0.0), 0.0, "{e:?}");
            assert!((e.apply(1.0) - 1.0).abs() < 1e-12, "{e:?}");
        }
    }

    #[test]
    fn in_out_curves_are_symmetric() {
        for e in [Easing::QuadInOut, Easing::CubicInOut] {
            assert!((e.apply(0.5) - 0.5).abs() < 1e-12);
            let a = e.apply(0.2);
            let b = 1.0 - e.apply(0.8);
            assert!((a - b).abs() < 1e-12, "{e:?}");
        }
    }

    #[test]
    fn circle_out_front_loads_progress() {
        assert!(Easing::CircleOut.apply(0.25) > 0.6);
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        assert_eq!(Easing::Linear.apply(-3.0), 0.0);
        assert_eq!(Easing::Linear.apply(7.0), 1.0);
        assert_eq!(Easing::QuadInOut.apply(f64::NAN), 0.0);
    }
}
