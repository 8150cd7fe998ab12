//! Map projections.
//!
//! Rotation follows the usual web-mapping convention: `yaw` spins the globe
//! about the polar axis, then `pitch` and `roll` tilt it. A rotation of
//! `(-lng, -lat, 0)` brings `(lat, lng)` to the center of the view.

use super::{GeoCoord, Vec2, Vec3};

/// Three-axis view rotation in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ViewRotation {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl ViewRotation {
    pub fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }

    /// Rotation that puts `coord` at the center of an orthographic view.
    pub fn centering(coord: GeoCoord) -> Self {
        Self::new(-coord.lng, -coord.lat, 0.0)
    }

    /// Applies the rotation to a unit vector on the sphere.
    pub fn apply(&self, v: Vec3) -> Vec3 {
        let (sl, cl) = self.yaw.to_radians().sin_cos();
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        let (sg, cg) = self.roll.to_radians().sin_cos();

        let x = v.x * cl - v.y * sl;
        let y = v.x * sl + v.y * cl;
        let z = v.z;

        let k = z * cp + x * sp;
        Vec3::new(x * cp - z * sp, y * cg - k * sg, k * cg + y * sg)
    }

    /// Inverse of [`ViewRotation::apply`].
    pub fn invert(&self, v: Vec3) -> Vec3 {
        let (sl, cl) = self.yaw.to_radians().sin_cos();
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        let (sg, cg) = self.roll.to_radians().sin_cos();

        let y = v.y * cg + v.z * sg;
        let k = v.z * cg - v.y * sg;
        let x = v.x * cp + k * sp;
        let z = k * cp - v.x * sp;

        Vec3::new(x * cl + y * sl, y * cl - x * sl, z)
    }
}

/// Pixel size of the globe viewport.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const MAX_HEIGHT: f64 = 600.0;
    pub const ASPECT: f64 = 0.6;
    pub const SCALE_DIVISOR: f64 = 2.2;

    /// Sizes the viewport from the width of its container.
    pub fn for_container(width: f64) -> Self {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        Self {
            width,
            height: (width * Self::ASPECT).min(Self::MAX_HEIGHT),
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Globe radius in pixels.
    pub fn globe_scale(&self) -> f64 {
        self.height / Self::SCALE_DIVISOR
    }

    pub fn orthographic(&self, rotation: ViewRotation) -> Orthographic {
        Orthographic::new(rotation, self.globe_scale(), self.center())
    }
}

/// Orthographic projection clipped to the visible hemisphere.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Orthographic {
    pub rotation: ViewRotation,
    /// Globe radius in pixels.
    pub scale: f64,
    pub translate: Vec2,
}

impl Orthographic {
    pub fn new(rotation: ViewRotation, scale: f64, translate: Vec2) -> Self {
        Self {
            rotation,
            scale,
            translate,
        }
    }

    /// Position on the sphere in view space. `x` is depth toward the viewer.
    pub fn rotate(&self, coord: GeoCoord) -> Vec3 {
        self.rotation.apply(coord.to_unit())
    }

    /// Screen position of a view-space vector, ignoring visibility.
    pub fn to_screen(&self, v: Vec3) -> Vec2 {
        Vec2::new(
            self.translate.x + self.scale * v.y,
            self.translate.y - self.scale * v.z,
        )
    }

    /// Screen position if the point faces the viewer.
    pub fn project(&self, coord: GeoCoord) -> Option<Vec2> {
        let v = self.rotate(coord);
        (v.x > 0.0).then(|| self.to_screen(v))
    }

    pub fn is_visible(&self, coord: GeoCoord) -> bool {
        self.rotate(coord).x > 0.0
    }

    /// Point on the horizon circle at `angle` radians (counter-clockwise from +x).
    pub fn horizon_point(&self, angle: f64) -> Vec2 {
        let (s, c) = angle.sin_cos();
        self.to_screen(Vec3::new(0.0, c, s))
    }
}

/// Spherical Mercator centered on a geographic point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mercator {
    pub center: GeoCoord,
    pub scale: f64,
    pub translate: Vec2,
}

impl Mercator {
    /// Latitude limit where the projection is cut off.
    pub const MAX_LAT: f64 = 85.051_128_78;

    pub fn new(center: GeoCoord, scale: f64, translate: Vec2) -> Self {
        Self {
            center,
            scale,
            translate,
        }
    }

    fn y(lat_deg: f64) -> f64 {
        let phi = lat_deg.clamp(-Self::MAX_LAT, Self::MAX_LAT).to_radians();
        (core::f64::consts::FRAC_PI_4 + phi / 2.0).tan().ln()
    }

    pub fn project(&self, coord: GeoCoord) -> Vec2 {
        let mut dlng = coord.lng - self.center.lng;
        if dlng > 180.0 {
            dlng -= 360.0;
        } else if dlng < -180.0 {
            dlng += 360.0;
        }
        Vec2::new(
            self.translate.x + self.scale * dlng.to_radians(),
            self.translate.y - self.scale * (Self::y(coord.lat) - Self::y(self.center.lat)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{GeoCoord, Mercator, Orthographic, Vec2, ViewRotation, Viewport};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn ortho(rotation: ViewRotation) -> Orthographic {
        Orthographic::new(rotation, 100.0, Vec2::new(200.0, 150.0))
    }

    #[test]
    fn viewport_sizing() {
        let v = Viewport::for_container(800.0);
        assert_close(v.height, 480.0, 1e-12);
        assert_close(v.globe_scale(), 480.0 / 2.2, 1e-12);
        assert_eq!(v.center(), Vec2::new(400.0, 240.0));

        let wide = Viewport::for_container(2000.0);
        assert_close(wide.height, 600.0, 1e-12);
    }

    #[test]
    fn centered_point_projects_to_translate() {
        let paris = GeoCoord::new(48.85, 2.35);
        let p = ortho(ViewRotation::centering(paris)).project(paris).unwrap();
        assert_close(p.x, 200.0, 1e-9);
        assert_close(p.y, 150.0, 1e-9);
    }

    #[test]
    fn north_is_up_and_east_is_right() {
        let proj = ortho(ViewRotation::default());
        let north = proj.project(GeoCoord::new(30.0, 0.0)).unwrap();
        let east = proj.project(GeoCoord::new(0.0, 30.0)).unwrap();
        assert!(north.y < 150.0);
        assert!(east.x > 200.0);
        assert_close(north.y, 150.0 - 50.0, 1e-9);
        assert_close(east.x, 250.0, 1e-9);
    }

    #[test]
    fn far_side_is_hidden() {
        let proj = ortho(ViewRotation::default());
        assert!(proj.project(GeoCoord::new(0.0, 180.0)).is_none());
        assert!(proj.project(GeoCoord::new(0.0, 95.0)).is_none());
        assert!(proj.is_visible(GeoCoord::new(0.0, 85.0)));
    }

    #[test]
    fn invert_undoes_apply() {
        let r = ViewRotation::new(37.0, -21.0, 12.0);
        let v = GeoCoord::new(10.0, -40.0).to_unit();
        let back = r.invert(r.apply(v));
        let d = back - v;
        assert!(d.length() < 1e-12);
    }

    #[test]
    fn mercator_center_maps_to_translate() {
        let c = GeoCoord::new(35.68, 139.76);
        let m = Mercator::new(c, 150_000.0, Vec2::new(150.0, 100.0));
        let p = m.project(c);
        assert_close(p.x, 150.0, 1e-9);
        assert_close(p.y, 100.0, 1e-9);

        let ne = m.project(GeoCoord::new(35.69, 139.77));
        assert!(ne.x > 150.0 && ne.y < 100.0);
    }
}
