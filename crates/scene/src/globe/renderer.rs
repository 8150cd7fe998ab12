//! Per-frame globe drawing.
//!
//! Each frame clears the scene graph and redraws every layer bottom to top:
//! glow, ocean, regions, shadow, route and plane, origin marker, destination
//! pulse, destination marker. The pulse and plane animations are tasks on the
//! renderer's timeline and are restarted whenever the markers change.

use foundation::math::{GeoCoord, Orthographic, format_number};
use foundation::time::Time;
use runtime::{Easing, TaskHandle, Timeline, Tween};

use crate::components::{GeoGeometry, RegionSet, RouteSegment};
use crate::graph::{Node, NodeRole, SceneGraph};
use crate::path::GeoPath;
use crate::prefabs::globe::{
    BACKGROUND, DESTINATION_COLOR, FLIGHT_GRADIENT, MARKER_STROKE, ORIGIN_COLOR, PLANE_PATH,
    REGION_FILL, REGION_HOVER_FILL, REGION_HOVER_STROKE, REGION_STROKE, define_globe_paint,
    push_shadow, push_sphere_backdrop,
};

/// Marker radius (pixels).
pub const MARKER_RADIUS: f64 = 3.0;
/// Growth of the destination pulse over one cycle (pixels).
pub const PULSE_GROWTH: f64 = 10.0;
pub const PULSE_CYCLE_S: f64 = 1.5;
pub const PLANE_CYCLE_S: f64 = 2.0;
pub const PLANE_SCALE: f64 = 0.6;

/// What to draw this frame.
#[derive(Debug, Clone, Copy)]
pub struct GlobeFrame<'a> {
    pub projection: &'a Orthographic,
    pub regions: &'a RegionSet,
    pub origin: Option<GeoCoord>,
    pub destination: Option<GeoCoord>,
    pub origin_label: Option<&'a str>,
    pub destination_label: Option<&'a str>,
    pub hovered_region: Option<usize>,
    pub now: Time,
}

#[derive(Debug, Default)]
pub struct GlobeRenderer {
    timeline: Timeline,
    pulse: Option<TaskHandle>,
    plane: Option<TaskHandle>,
}

impl GlobeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restarts the marker animations for new endpoints. The pulse runs
    /// whenever there is a destination, the plane only for a full route.
    pub fn reset_markers(&mut self, origin: Option<GeoCoord>, destination: Option<GeoCoord>, now: Time) {
        self.timeline.cancel_slot(&mut self.pulse);
        self.timeline.cancel_slot(&mut self.plane);
        if destination.is_some() {
            self.pulse = Some(
                self.timeline
                    .start(now, Tween::forever(PULSE_CYCLE_S, Easing::CircleOut)),
            );
        }
        if origin.is_some() && destination.is_some() {
            self.plane = Some(
                self.timeline
                    .start(now, Tween::forever(PLANE_CYCLE_S, Easing::QuadInOut)),
            );
        }
    }

    pub fn active_tasks(&self) -> usize {
        self.timeline.active_count()
    }

    pub fn teardown(&mut self) {
        self.timeline.cancel_all();
        self.pulse = None;
        self.plane = None;
    }

    pub fn render(&mut self, graph: &mut SceneGraph, frame: &GlobeFrame<'_>) {
        graph.clear();
        graph.background = Some(BACKGROUND);
        define_globe_paint(graph);

        let path = GeoPath::new(frame.projection);
        push_sphere_backdrop(graph, &path);

        for (index, region) in frame.regions.iter().enumerate() {
            let d = path.path(&region.geometry);
            if d.is_empty() {
                continue;
            }
            let hovered = frame.hovered_region == Some(index);
            let (fill, stroke) = if hovered {
                (REGION_HOVER_FILL, REGION_HOVER_STROKE)
            } else {
                (REGION_FILL, REGION_STROKE)
            };
            graph.push(
                Node::path(NodeRole::Region, d)
                    .attr("fill", fill)
                    .attr("stroke", stroke)
                    .attr("stroke-width", "0.5")
                    .attr("cursor", "pointer")
                    .attr("data-region", region.name.clone())
                    .attr("data-index", index.to_string()),
            );
        }

        push_shadow(graph, &path);

        if let (Some(origin), Some(destination)) = (frame.origin, frame.destination) {
            self.push_route(graph, &path, RouteSegment::new(origin, destination), frame.now);
        }

        let markers = path.point_radius(MARKER_RADIUS);
        if let Some(origin) = frame.origin {
            let d = markers.path(&GeoGeometry::Point(origin));
            if !d.is_empty() {
                graph.push(marker(
                    NodeRole::OriginMarker,
                    d,
                    ORIGIN_COLOR,
                    frame.origin_label.unwrap_or("Origin"),
                ));
            }
        }
        if let Some(destination) = frame.destination {
            self.push_pulse(graph, frame.projection, destination, frame.now);
            let d = markers.path(&GeoGeometry::Point(destination));
            if !d.is_empty() {
                graph.push(marker(
                    NodeRole::DestinationMarker,
                    d,
                    DESTINATION_COLOR,
                    frame.destination_label.unwrap_or("Destination"),
                ));
            }
        }
    }

    fn push_route(&mut self, graph: &mut SceneGraph, path: &GeoPath<'_>, route: RouteSegment, now: Time) {
        let d = path.path(&route.geometry());
        if d.is_empty() {
            return;
        }
        graph.push(
            Node::path(NodeRole::Route, d)
                .attr("fill", "none")
                .attr("stroke", format!("url(#{FLIGHT_GRADIENT})"))
                .attr("stroke-width", "2")
                .attr("stroke-linecap", "round")
                .attr("style", "filter: drop-shadow(0px 0px 4px rgba(56, 189, 248, 0.4))"),
        );

        let polyline = path.polyline(&[route.origin, route.destination]);
        if polyline.length() <= 0.0 {
            return;
        }
        let Some(handle) = self.plane else {
            return;
        };
        let Some(sample) = self.timeline.sample(handle, now) else {
            return;
        };
        if let Some((p, heading)) = polyline.pose_at(sample.eased) {
            let transform = format!(
                "translate({},{}) rotate({}) scale({})",
                format_number(p.x),
                format_number(p.y),
                format_number(heading + 90.0),
                format_number(PLANE_SCALE),
            );
            graph.push(
                Node::path(NodeRole::Plane, PLANE_PATH)
                    .attr("fill", "#fff")
                    .attr("transform", transform),
            );
        }
    }

    fn push_pulse(&mut self, graph: &mut SceneGraph, projection: &Orthographic, at: GeoCoord, now: Time) {
        let Some(handle) = self.pulse else {
            return;
        };
        let Some(sample) = self.timeline.sample(handle, now) else {
            return;
        };
        let radius = MARKER_RADIUS + PULSE_GROWTH * sample.eased;
        let d = GeoPath::new(projection)
            .point_radius(radius)
            .path(&GeoGeometry::Point(at));
        if d.is_empty() {
            return;
        }
        graph.push(
            Node::path(NodeRole::DestinationPulse, d)
                .attr("fill", "none")
                .attr("stroke", DESTINATION_COLOR)
                .attr("stroke-width", "2")
                .num_attr("stroke-opacity", 1.0 - sample.eased)
                .attr("pointer-events", "none"),
        );
    }
}

fn marker(role: NodeRole, d: String, fill: &str, tooltip: &str) -> Node {
    Node::path(role, d)
        .attr("fill", fill)
        .attr("stroke", MARKER_STROKE)
        .attr("stroke-width", "1.5")
        .attr("cursor", "pointer")
        .attr("data-tooltip", tooltip)
}

#[cfg(test)]
mod tests {
    use super::{GlobeFrame, GlobeRenderer, PULSE_CYCLE_S};
    use crate::components::{GeoGeometry, RegionFeature, RegionSet};
    use crate::graph::{NodeRole, SceneGraph};
    use foundation::math::{GeoCoord, Orthographic, Vec2, ViewRotation};
    use foundation::time::Time;
    use pretty_assertions::assert_eq;

    fn square(lat: f64, lng: f64, half: f64) -> Vec<GeoCoord> {
        vec![
            GeoCoord::new(lat - half, lng - half),
            GeoCoord::new(lat + half, lng - half),
            GeoCoord::new(lat + half, lng + half),
            GeoCoord::new(lat - half, lng + half),
            GeoCoord::new(lat - half, lng - half),
        ]
    }

    fn regions() -> RegionSet {
        RegionSet::new(vec![
            RegionFeature::new(None, "Near", GeoGeometry::Polygon(vec![square(0.0, 0.0, 5.0)])),
            RegionFeature::new(None, "Far", GeoGeometry::Polygon(vec![square(0.0, 180.0, 5.0)])),
        ])
    }

    fn frame<'a>(proj: &'a Orthographic, regions: &'a RegionSet, now: Time) -> GlobeFrame<'a> {
        GlobeFrame {
            projection: proj,
            regions,
            origin: Some(GeoCoord::new(0.0, -20.0)),
            destination: Some(GeoCoord::new(10.0, 30.0)),
            origin_label: Some("JFK - New York"),
            destination_label: None,
            hovered_region: Some(0),
            now,
        }
    }

    #[test]
    fn layers_are_drawn_in_fixed_order() {
        let proj = Orthographic::new(ViewRotation::default(), 100.0, Vec2::new(200.0, 150.0));
        let regions = regions();
        let mut r = GlobeRenderer::new();
        let mut g = SceneGraph::new(400.0, 300.0);
        r.reset_markers(Some(GeoCoord::new(0.0, -20.0)), Some(GeoCoord::new(10.0, 30.0)), Time(0.0));
        r.render(&mut g, &frame(&proj, &regions, Time(0.5)));

        assert_eq!(
            g.role_order(),
            vec![
                NodeRole::Glow,
                NodeRole::Ocean,
                NodeRole::Region,
                NodeRole::Shadow,
                NodeRole::Route,
                NodeRole::Plane,
                NodeRole::OriginMarker,
                NodeRole::DestinationPulse,
                NodeRole::DestinationMarker,
            ]
        );
        // Hidden regions are skipped; the visible one is highlighted.
        let region_nodes: Vec<_> = g.with_role(NodeRole::Region).collect();
        assert_eq!(region_nodes.len(), 1);
        assert_eq!(region_nodes[0].get_attr("data-region"), Some("Near"));
        assert_eq!(region_nodes[0].get_attr("fill"), Some("#64748b"));
    }

    #[test]
    fn marker_tooltips_fall_back_to_role_names() {
        let proj = Orthographic::new(ViewRotation::default(), 100.0, Vec2::new(200.0, 150.0));
        let regions = RegionSet::default();
        let mut r = GlobeRenderer::new();
        let mut g = SceneGraph::new(400.0, 300.0);
        r.render(&mut g, &frame(&proj, &regions, Time(0.0)));
        let origin = g.with_role(NodeRole::OriginMarker).next().unwrap();
        let dest = g.with_role(NodeRole::DestinationMarker).next().unwrap();
        assert_eq!(origin.get_attr("data-tooltip"), Some("JFK - New York"));
        assert_eq!(dest.get_attr("data-tooltip"), Some("Destination"));
        // No tasks were started, so neither plane nor pulse is drawn.
        assert_eq!(g.with_role(NodeRole::Plane).count(), 0);
        assert_eq!(g.with_role(NodeRole::DestinationPulse).count(), 0);
    }

    #[test]
    fn pulse_grows_and_fades_each_cycle() {
        let proj = Orthographic::new(ViewRotation::default(), 100.0, Vec2::new(200.0, 150.0));
        let regions = RegionSet::default();
        let mut r = GlobeRenderer::new();
        let mut g = SceneGraph::new(400.0, 300.0);
        r.reset_markers(None, Some(GeoCoord::new(10.0, 30.0)), Time(0.0));

        r.render(&mut g, &frame(&proj, &regions, Time(0.0)));
        let start = g.with_role(NodeRole::DestinationPulse).next().unwrap().clone();
        assert_eq!(start.get_attr("stroke-opacity"), Some("1"));
        assert!(start.d().unwrap().contains("m0,3a3,3"));

        r.render(&mut g, &frame(&proj, &regions, Time(PULSE_CYCLE_S * 0.999)));
        let late = g.with_role(NodeRole::DestinationPulse).next().unwrap();
        let opacity: f64 = late.get_attr("stroke-opacity").unwrap().parse().unwrap();
        assert!(opacity < 0.1);

        // Next cycle starts small again.
        r.render(&mut g, &frame(&proj, &regions, Time(PULSE_CYCLE_S)));
        let again = g.with_role(NodeRole::DestinationPulse).next().unwrap();
        assert!(again.d().unwrap().contains("m0,3a3,3"));
    }

    #[test]
    fn pulse_radius_never_shrinks_within_a_cycle() {
        let proj = Orthographic::new(ViewRotation::default(), 100.0, Vec2::new(200.0, 150.0));
        let regions = RegionSet::default();
        let mut r = GlobeRenderer::new();
        let mut g = SceneGraph::new(400.0, 300.0);
        r.reset_markers(None, Some(GeoCoord::new(10.0, 30.0)), Time(0.0));

        let mut last = 0.0;
        for step in 0..15 {
            r.render(&mut g, &frame(&proj, &regions, Time(step as f64 * 0.1)));
            let pulse = g.with_role(NodeRole::DestinationPulse).next().unwrap();
            // Circle paths read "M<x>,<y>m0,<r>a...".
            let d = pulse.d().unwrap();
            let tail = &d[d.find("m0,").unwrap() + 3..];
            let radius: f64 = tail[..tail.find('a').unwrap()].parse().unwrap();
            assert!(radius >= last, "radius {radius} < {last} at step {step}");
            last = radius;
        }
        assert!(last > 3.0 && last <= 13.0);
    }

    #[test]
    fn reset_and_teardown_cancel_tasks() {
        let mut r = GlobeRenderer::new();
        let o = Some(GeoCoord::new(0.0, 0.0));
        let d = Some(GeoCoord::new(0.0, 10.0));
        r.reset_markers(o, d, Time(0.0));
        assert_eq!(r.active_tasks(), 2);
        r.reset_markers(o, d, Time(1.0));
        assert_eq!(r.active_tasks(), 2);
        r.reset_markers(None, None, Time(2.0));
        assert_eq!(r.active_tasks(), 0);
        r.reset_markers(o, d, Time(3.0));
        r.teardown();
        assert_eq!(r.active_tasks(), 0);
    }
}
