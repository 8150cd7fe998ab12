//! SVG path generation for geographic geometry under an orthographic
//! projection.
//!
//! Lines and polygon edges follow great circles: each edge is resampled in
//! at most [`MAX_EDGE_STEP_DEG`] steps before projection. Clipping happens in
//! view space against the plane of the horizon, so a line that passes behind
//! the globe splits into separate runs and a polygon that crosses the horizon
//! is closed along the horizon circle.

use core::f64::consts::TAU;

use foundation::math::{GeoCoord, Orthographic, Vec2, Vec3, densify_arc, push_pair, push_number};

use crate::components::GeoGeometry;

/// Resampling step for great-circle edges (degrees).
pub const MAX_EDGE_STEP_DEG: f64 = 2.0;

/// Radius used for `Point` geometry unless overridden.
pub const DEFAULT_POINT_RADIUS: f64 = 4.5;

#[derive(Debug, Copy, Clone)]
pub struct GeoPath<'a> {
    projection: &'a Orthographic,
    point_radius: f64,
}

impl<'a> GeoPath<'a> {
    pub fn new(projection: &'a Orthographic) -> Self {
        Self {
            projection,
            point_radius: DEFAULT_POINT_RADIUS,
        }
    }

    pub fn point_radius(mut self, radius: f64) -> Self {
        self.point_radius = radius;
        self
    }

    pub fn projection(&self) -> &Orthographic {
        self.projection
    }

    /// SVG path data for `geometry`. Hidden geometry yields an empty string.
    pub fn path(&self, geometry: &GeoGeometry) -> String {
        let mut out = String::new();
        match geometry {
            GeoGeometry::Sphere => {
                push_circle(&mut out, self.projection.translate, self.projection.scale);
            }
            GeoGeometry::Point(p) => self.push_point(&mut out, *p),
            GeoGeometry::MultiPoint(points) => {
                for p in points {
                    self.push_point(&mut out, *p);
                }
            }
            GeoGeometry::LineString(line) => self.push_line(&mut out, line),
            GeoGeometry::MultiLineString(lines) => {
                for line in lines {
                    self.push_line(&mut out, line);
                }
            }
            GeoGeometry::Polygon(rings) => self.push_polygon(&mut out, rings),
            GeoGeometry::MultiPolygon(polygons) => {
                for rings in polygons {
                    self.push_polygon(&mut out, rings);
                }
            }
        }
        out
    }

    fn push_point(&self, out: &mut String, p: GeoCoord) {
        if let Some(s) = self.projection.project(p) {
            push_circle(out, s, self.point_radius);
        }
    }

    fn push_line(&self, out: &mut String, line: &[GeoCoord]) {
        for run in self.project_line(line) {
            push_run(out, &run, false);
        }
    }

    fn push_polygon(&self, out: &mut String, rings: &[Vec<GeoCoord>]) {
        for ring in rings {
            if let Some(points) = self.project_ring(ring) {
                push_run(out, &points, true);
            }
        }
    }

    /// Visible runs of a great-circle polyline, in screen space.
    pub fn project_line(&self, line: &[GeoCoord]) -> Vec<Vec<Vec2>> {
        let rotated = self.resample(line, false);
        let mut runs = Vec::new();
        let mut current: Vec<Vec2> = Vec::new();

        if let Some(first) = rotated.first() {
            if visible(*first) {
                current.push(self.projection.to_screen(*first));
            }
        }
        for w in rotated.windows(2) {
            let (a, b) = (w[0], w[1]);
            match (visible(a), visible(b)) {
                (true, true) => current.push(self.projection.to_screen(b)),
                (true, false) => {
                    if let Some(i) = horizon_crossing(a, b) {
                        current.push(self.projection.to_screen(i));
                    }
                    if current.len() > 1 {
                        runs.push(std::mem::take(&mut current));
                    }
                    current.clear();
                }
                (false, true) => {
                    current.clear();
                    if let Some(i) = horizon_crossing(a, b) {
                        current.push(self.projection.to_screen(i));
                    }
                    current.push(self.projection.to_screen(b));
                }
                (false, false) => {}
            }
        }
        if current.len() > 1 {
            runs.push(current);
        }
        runs
    }

    /// The visible part of a polygon ring, closed along the horizon where it
    /// was cut. `None` when nothing of the ring faces the viewer.
    pub fn project_ring(&self, ring: &[GeoCoord]) -> Option<Vec<Vec2>> {
        let mut pts = self.resample(ring, true);
        if pts.len() > 1 && (pts[0] - pts[pts.len() - 1]).length() < 1e-12 {
            pts.pop();
        }
        if pts.len() < 3 {
            return None;
        }

        let clipped = clip_ring(&pts);
        if clipped.is_empty() {
            return None;
        }

        let clockwise = ring_is_clockwise(ring);
        let mut out = Vec::with_capacity(clipped.len());
        for (i, item) in clipped.iter().enumerate() {
            let v = item.point();
            out.push(self.projection.to_screen(v));
            if let Clipped::Exit(exit) = item {
                if let Clipped::Entry(entry) = clipped[(i + 1) % clipped.len()] {
                    for a in horizon_arc(*exit, entry, clockwise) {
                        out.push(self.projection.horizon_point(a));
                    }
                }
            }
        }
        Some(out)
    }

    /// Projected polyline used to place the plane icon along the route.
    pub fn polyline(&self, line: &[GeoCoord]) -> Polyline {
        Polyline::new(self.project_line(line))
    }

    fn resample(&self, line: &[GeoCoord], closed: bool) -> Vec<Vec3> {
        let step = MAX_EDGE_STEP_DEG.to_radians();
        let mut out: Vec<Vec3> = Vec::new();
        let push_edge = |a: GeoCoord, b: GeoCoord, out: &mut Vec<Vec3>| {
            let seg = densify_arc(a.to_unit(), b.to_unit(), step);
            let skip = usize::from(!out.is_empty());
            out.extend(seg.into_iter().skip(skip));
        };
        match line {
            [] => {}
            [only] => out.push(only.to_unit()),
            _ => {
                for w in line.windows(2) {
                    push_edge(w[0], w[1], &mut out);
                }
                if closed {
                    if let (Some(first), Some(last)) = (line.first(), line.last()) {
                        if first != last {
                            push_edge(*last, *first, &mut out);
                        }
                    }
                }
            }
        }
        out.into_iter()
            .map(|v| self.projection.rotation.apply(v))
            .collect()
    }
}

fn visible(v: Vec3) -> bool {
    v.x > 0.0
}

/// Where the great circle `a -> b` meets the horizon plane.
fn horizon_crossing(a: Vec3, b: Vec3) -> Option<Vec3> {
    let denom = a.x - b.x;
    if denom.abs() < 1e-15 {
        return None;
    }
    let t = a.x / denom;
    let p = a + (b - a).scale(t);
    let n = Vec3::new(0.0, p.y, p.z).normalized()?;
    Some(n)
}

#[derive(Debug, Copy, Clone)]
enum Clipped {
    Inside(Vec3),
    Exit(Vec3),
    Entry(Vec3),
}

impl Clipped {
    fn point(&self) -> Vec3 {
        match self {
            Clipped::Inside(v) | Clipped::Exit(v) | Clipped::Entry(v) => *v,
        }
    }
}

/// Sutherland-Hodgman against the horizon plane. Every `Exit` is followed,
/// cyclically, by an `Entry`.
fn clip_ring(pts: &[Vec3]) -> Vec<Clipped> {
    let n = pts.len();
    let mut out = Vec::with_capacity(n + 2);
    for i in 0..n {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        match (visible(a), visible(b)) {
            (true, true) => out.push(Clipped::Inside(b)),
            (true, false) => {
                if let Some(x) = horizon_crossing(a, b) {
                    out.push(Clipped::Exit(x));
                }
            }
            (false, true) => {
                if let Some(x) = horizon_crossing(a, b) {
                    out.push(Clipped::Entry(x));
                }
                out.push(Clipped::Inside(b));
            }
            (false, false) => {}
        }
    }
    out
}

/// Ring orientation as seen from outside the sphere, measured around the
/// ring's own center.
fn ring_is_clockwise(ring: &[GeoCoord]) -> bool {
    let units: Vec<Vec3> = ring.iter().map(|c| c.to_unit()).collect();
    let mut sum = Vec3::default();
    for u in &units {
        sum = sum + *u;
    }
    let Some(center) = sum.normalized() else {
        return true;
    };
    let mut signed = 0.0;
    for i in 0..units.len() {
        let a = units[i];
        let b = units[(i + 1) % units.len()];
        signed += center.dot(a.cross(b));
    }
    signed <= 0.0
}

/// Intermediate horizon angles walking from `from` to `to` with the ring's
/// interior kept on the inside of the disc.
fn horizon_arc(from: Vec3, to: Vec3, clockwise: bool) -> Vec<f64> {
    let a0 = from.z.atan2(from.y);
    let a1 = to.z.atan2(to.y);
    let delta = if clockwise {
        -(a0 - a1).rem_euclid(TAU)
    } else {
        (a1 - a0).rem_euclid(TAU)
    };
    let step = MAX_EDGE_STEP_DEG.to_radians();
    let steps = (delta.abs() / step).ceil() as usize;
    (1..steps)
        .map(|k| a0 + delta * k as f64 / steps as f64)
        .collect()
}

fn push_circle(out: &mut String, c: Vec2, r: f64) {
    out.push('M');
    push_pair(out, c.x, c.y);
    out.push_str("m0,");
    push_number(out, r);
    out.push('a');
    push_pair(out, r, r);
    out.push_str(" 0 1,1 0,");
    push_number(out, -2.0 * r);
    out.push('a');
    push_pair(out, r, r);
    out.push_str(" 0 1,1 0,");
    push_number(out, 2.0 * r);
    out.push('Z');
}

fn push_run(out: &mut String, run: &[Vec2], closed: bool) {
    let Some((first, rest)) = run.split_first() else {
        return;
    };
    out.push('M');
    push_pair(out, first.x, first.y);
    for p in rest {
        out.push('L');
        push_pair(out, p.x, p.y);
    }
    if closed {
        out.push('Z');
    }
}

/// A projected polyline made of disjoint runs, measured like an SVG path:
/// jumps between runs add no length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    runs: Vec<Vec<Vec2>>,
    length: f64,
}

impl Polyline {
    pub fn new(runs: Vec<Vec<Vec2>>) -> Self {
        let length = runs.iter().map(|r| run_length(r)).sum();
        Self { runs, length }
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Point `distance` pixels along the polyline, clamped to its ends.
    pub fn point_at_length(&self, distance: f64) -> Option<Vec2> {
        let mut remaining = distance.max(0.0);
        let mut last = None;
        for run in &self.runs {
            for w in run.windows(2) {
                let seg = w[0].distance(w[1]);
                if remaining <= seg && seg > 0.0 {
                    return Some(w[0].lerp(w[1], remaining / seg));
                }
                remaining -= seg;
                last = Some(w[1]);
            }
            if last.is_none() {
                last = run.first().copied();
            }
        }
        last
    }

    /// Position and heading (degrees, screen space) at fraction `t` of the
    /// length. The heading looks one pixel back along the path.
    pub fn pose_at(&self, t: f64) -> Option<(Vec2, f64)> {
        let at = t.clamp(0.0, 1.0) * self.length;
        let p = self.point_at_length(at)?;
        let before = self.point_at_length((at - 1.0).max(0.0))?;
        let heading = (p.y - before.y).atan2(p.x - before.x).to_degrees();
        Some((p, heading))
    }
}

fn run_length(run: &[Vec2]) -> f64 {
    run.windows(2).map(|w| w[0].distance(w[1])).sum()
}
