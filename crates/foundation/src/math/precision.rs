//! Deterministic number formatting for generated markup.
//!
//! Path strings are compared byte-for-byte in tests and diffed between frames,
//! so every coordinate goes through the same rounding and canonicalization.

use core::fmt::Write;

/// Decimal places kept in path and attribute output.
pub const OUTPUT_DECIMALS: u32 = 3;

/// Canonicalize a floating-point value.
///
/// `-0.0` becomes `0.0`; every NaN becomes the same NaN.
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Round half away from zero to `decimals` places, then canonicalize.
pub fn round_to(v: f64, decimals: u32) -> f64 {
    let f = 10f64.powi(decimals as i32);
    canonical_f64((v * f).round() / f)
}

/// Shortest decimal rendering after rounding to [`OUTPUT_DECIMALS`].
///
/// Non-finite input renders as `0` so a degenerate projection never leaks
/// `NaN` into markup.
pub fn format_number(v: f64) -> String {
    let mut out = String::new();
    push_number(&mut out, v);
    out
}

/// Appends [`format_number`] output to `out` without allocating.
pub fn push_number(out: &mut String, v: f64) {
    let v = if v.is_finite() { round_to(v, OUTPUT_DECIMALS) } else { 0.0 };
    // f64 Display is already the shortest round-trip form.
    let _ = write!(out, "{v}");
}

/// Appends `x,y`.
pub fn push_pair(out: &mut String, x: f64, y: f64) {
    push_number(out, x);
    out.push(',');
    push_number(out, y);
}

#[cfg(test)]
mod tests {
    use super::{canonical_f64, format_number, push_pair, round_to};

    #[test]
    fn canonicalizes_negative_zero() {
        assert_eq!(canonical_f64(-0.0).to_bits(), 0.0f64.to_bits());
        assert!(canonical_f64(f64::NAN).is_nan());
    }

    #[test]
    fn rounding_is_stable() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(-0.0001, 3).to_bits(), 0.0f64.to_bits());
    }

    #[test]
    fn formats_shortest_form() {
        assert_eq!(format_number(12.0), "12");
        assert_eq!(format_number(-3.14159), "-3.142");
        assert_eq!(format_number(-0.0004), "0");
        assert_eq!(format_number(f64::NAN), "0");
    }

    #[test]
    fn pairs_are_comma_separated() {
        let mut s = String::from("M");
        push_pair(&mut s, 1.5, -2.25);
        assert_eq!(s, "M1.5,-2.25");
    }
}
