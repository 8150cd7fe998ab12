//! Spherical geography on the unit sphere.
//!
//! Positions are geographic degrees. The unit-vector convention matches the
//! projection code: `x` points at (0°, 0°), `y` at (90°E, 0°), `z` at the
//! north pole.

use super::Vec3;

/// Geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct GeoCoord {
    pub lat: f64,
    pub lng: f64,
}

impl GeoCoord {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and inside the geographic ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    pub fn to_unit(self) -> Vec3 {
        let lat = self.lat.to_radians();
        let lng = self.lng.to_radians();
        let cos_lat = lat.cos();
        Vec3::new(cos_lat * lng.cos(), cos_lat * lng.sin(), lat.sin())
    }

    /// Inverse of [`GeoCoord::to_unit`]; the input does not need to be normalized.
    pub fn from_unit(v: Vec3) -> Option<Self> {
        let v = v.normalized()?;
        Some(Self::new(
            v.z.clamp(-1.0, 1.0).asin().to_degrees(),
            v.y.atan2(v.x).to_degrees(),
        ))
    }
}

/// Central angle between two unit vectors (radians).
pub fn angle_between(a: Vec3, b: Vec3) -> f64 {
    // atan2 form stays accurate for both tiny and near-antipodal separations.
    a.cross(b).length().atan2(a.dot(b))
}

/// Great-circle distance in radians.
pub fn angular_distance(a: GeoCoord, b: GeoCoord) -> f64 {
    angle_between(a.to_unit(), b.to_unit())
}

/// Spherical linear interpolation between unit vectors.
///
/// Returns `None` when the great circle is undefined (antipodal input).
pub fn slerp(a: Vec3, b: Vec3, t: f64) -> Option<Vec3> {
    let omega = angle_between(a, b);
    if omega < 1e-12 {
        return Some(a);
    }
    let sin_omega = omega.sin();
    if sin_omega.abs() < 1e-9 {
        return None;
    }
    let wa = ((1.0 - t) * omega).sin() / sin_omega;
    let wb = (t * omega).sin() / sin_omega;
    (a.scale(wa) + b.scale(wb)).normalized()
}

/// Point halfway along the great circle from `a` to `b`.
///
/// Antipodal or coincident inputs fall back to `a`.
pub fn great_circle_midpoint(a: GeoCoord, b: GeoCoord) -> GeoCoord {
    slerp(a.to_unit(), b.to_unit(), 0.5)
        .and_then(GeoCoord::from_unit)
        .unwrap_or(a)
}

/// Subdivides the arc `a -> b` so consecutive samples are at most
/// `max_step_rad` apart. The output starts with `a` and ends with `b`.
pub fn densify_arc(a: Vec3, b: Vec3, max_step_rad: f64) -> Vec<Vec3> {
    let omega = angle_between(a, b);
    let steps = if max_step_rad > 0.0 {
        (omega / max_step_rad).ceil() as usize
    } else {
        1
    };
    if steps <= 1 || omega.sin().abs() < 1e-9 {
        return vec![a, b];
    }
    let mut out = Vec::with_capacity(steps + 1);
    out.push(a);
    for i in 1..steps {
        let t = i as f64 / steps as f64;
        if let Some(p) = slerp(a, b, t) {
            out.push(p);
        }
    }
    out.push(b);
    out
}

/// Length-weighted centroid of a set of rings (or lines).
///
/// Each edge contributes its arc midpoint weighted by its arc length. Falls
/// back to the mean of the vertices for degenerate input.
pub fn line_centroid<'a>(lines: impl IntoIterator<Item = &'a [GeoCoord]>) -> Option<GeoCoord> {
    let mut sum = Vec3::default();
    let mut vertex_sum = Vec3::default();
    let mut total = 0.0;
    for line in lines {
        for w in line.windows(2) {
            let a = w[0].to_unit();
            let b = w[1].to_unit();
            vertex_sum = vertex_sum + a;
            let len = angle_between(a, b);
            if len <= 0.0 {
                continue;
            }
            if let Some(mid) = (a + b).normalized() {
                sum = sum + mid.scale(len);
                total += len;
            }
        }
        if let Some(last) = line.last() {
            vertex_sum = vertex_sum + last.to_unit();
        }
    }
    if total > 0.0 {
        if let Some(c) = GeoCoord::from_unit(sum) {
            return Some(c);
        }
    }
    GeoCoord::from_unit(vertex_sum)
}

#[cfg(test)]
mod tests {
    use super::{GeoCoord, angular_distance, densify_arc, great_circle_midpoint, line_centroid};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn unit_vector_round_trip() {
        let c = GeoCoord::new(48.85, 2.35);
        let rt = GeoCoord::from_unit(c.to_unit()).unwrap();
        assert_close(rt.lat, c.lat, 1e-9);
        assert_close(rt.lng, c.lng, 1e-9);
    }

    #[test]
    fn validity_checks_ranges() {
        assert!(GeoCoord::new(0.0, 180.0).is_valid());
        assert!(!GeoCoord::new(91.0, 0.0).is_valid());
        assert!(!GeoCoord::new(0.0, f64::NAN).is_valid());
    }

    #[test]
    fn midpoint_on_equator() {
        let m = great_circle_midpoint(GeoCoord::new(0.0, 0.0), GeoCoord::new(0.0, 90.0));
        assert_close(m.lat, 0.0, 1e-9);
        assert_close(m.lng, 45.0, 1e-9);
    }

    #[test]
    fn midpoint_bends_toward_pole() {
        // New York to Tokyo passes far north of the parallel average.
        let m = great_circle_midpoint(GeoCoord::new(40.6, -73.8), GeoCoord::new(35.5, 139.8));
        assert!(m.lat > 60.0, "midpoint lat {}", m.lat);
    }

    #[test]
    fn antipodal_midpoint_falls_back_to_start() {
        let a = GeoCoord::new(0.0, 0.0);
        let m = great_circle_midpoint(a, GeoCoord::new(0.0, 180.0));
        assert_eq!(m, a);
    }

    #[test]
    fn densify_respects_step() {
        let a = GeoCoord::new(0.0, 0.0).to_unit();
        let b = GeoCoord::new(0.0, 10.0).to_unit();
        let step = 2f64.to_radians();
        let pts = densify_arc(a, b, step);
        assert!(pts.len() >= 6);
        assert_eq!(pts[0], a);
        assert_eq!(pts[pts.len() - 1], b);
        for w in pts.windows(2) {
            assert!(super::angle_between(w[0], w[1]) <= step + 1e-9);
        }
        assert_close(angular_distance(GeoCoord::new(0.0, 0.0), GeoCoord::new(0.0, 10.0)), 10f64.to_radians(), 1e-12);
    }

    #[test]
    fn centroid_of_square_ring() {
        let ring = [
            GeoCoord::new(-1.0, -1.0),
            GeoCoord::new(-1.0, 1.0),
            GeoCoord::new(1.0, 1.0),
            GeoCoord::new(1.0, -1.0),
            GeoCoord::new(-1.0, -1.0),
        ];
        let c = line_centroid([&ring[..]]).unwrap();
        assert_close(c.lat, 0.0, 1e-6);
        assert_close(c.lng, 0.0, 1e-6);
    }
}
