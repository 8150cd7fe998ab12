//! City radar: a small Mercator view around the destination with pulsing
//! points of interest.

use foundation::math::{GeoCoord, Mercator, Vec2};
use foundation::time::Time;
use runtime::{Easing, TaskHandle, Timeline, Tween};

use crate::graph::{Node, NodeRole, SceneGraph};
use crate::prefabs::radar::{CAPTION_FILL, LABEL_FILL, SPOT_COLOR, push_radar_backdrop};

#[derive(Debug, Clone, PartialEq)]
pub struct RadarConfig {
    pub width: f64,
    pub height: f64,
    /// Mercator scale; city-level zoom.
    pub scale: f64,
    pub ring_radii: Vec<f64>,
    pub pulse_cycle_s: f64,
    pub pulse_from: f64,
    pub pulse_to: f64,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 200.0,
            scale: 150_000.0,
            ring_radii: vec![50.0, 100.0, 150.0],
            pulse_cycle_s: 2.0,
            pulse_from: 3.0,
            pulse_to: 15.0,
        }
    }
}

/// A labelled point of interest. Spots without coordinates are not drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarSpot {
    pub name: String,
    pub coordinates: Option<GeoCoord>,
}

#[derive(Debug)]
struct PlacedSpot {
    name: String,
    at: Vec2,
    pulse: TaskHandle,
}

#[derive(Debug)]
pub struct CityRadar {
    config: RadarConfig,
    city: String,
    spots: Vec<PlacedSpot>,
    timeline: Timeline,
    graph: SceneGraph,
}

impl CityRadar {
    pub fn new(config: RadarConfig) -> Self {
        let graph = SceneGraph::new(config.width, config.height);
        Self {
            config,
            city: String::new(),
            spots: Vec::new(),
            timeline: Timeline::new(),
            graph,
        }
    }

    pub fn config(&self) -> &RadarConfig {
        &self.config
    }

    /// Replaces the data shown. `city` names the caption in the corner.
    /// Previous pulses are cancelled; an empty spot list leaves the radar
    /// blank.
    pub fn set_data(
        &mut self,
        center: GeoCoord,
        city: impl Into<String>,
        spots: impl IntoIterator<Item = RadarSpot>,
        now: Time,
    ) {
        self.clear();
        self.city = city.into();
        let projection = Mercator::new(
            center,
            self.config.scale,
            Vec2::new(self.config.width / 2.0, self.config.height / 2.0),
        );
        for spot in spots {
            let Some(coord) = spot.coordinates else {
                tracing::debug!(spot = %spot.name, "spot has no coordinates");
                continue;
            };
            let pulse = self
                .timeline
                .start(now, Tween::forever(self.config.pulse_cycle_s, Easing::Linear));
            self.spots.push(PlacedSpot {
                name: spot.name,
                at: projection.project(coord),
                pulse,
            });
        }
    }

    pub fn clear(&mut self) {
        self.timeline.cancel_all();
        self.spots.clear();
        self.city.clear();
    }

    pub fn spot_count(&self) -> usize {
        self.spots.len()
    }

    pub fn render(&mut self, now: Time) -> &SceneGraph {
        self.graph.clear();
        if self.spots.is_empty() {
            return &self.graph;
        }
        push_radar_backdrop(&mut self.graph, &self.config.ring_radii);
        for spot in &self.spots {
            let Vec2 { x, y } = spot.at;
            if let Some(sample) = self.timeline.sample(spot.pulse, now) {
                let r = self.config.pulse_from + (self.config.pulse_to - self.config.pulse_from) * sample.eased;
                self.graph.push(
                    Node::circle(NodeRole::SpotPulse, x, y, r)
                        .attr("fill", "none")
                        .attr("stroke", SPOT_COLOR)
                        .attr("stroke-opacity", "0.5"),
                );
            }
            self.graph.push(
                Node::circle(NodeRole::SpotMarker, x, y, 3.0)
                    .attr("fill", SPOT_COLOR)
                    .attr("stroke", "#fff")
                    .attr("stroke-width", "1"),
            );
            self.graph.push(
                Node::text(NodeRole::SpotLabel, x + 8.0, y + 4.0, spot.name.clone())
                    .attr("fill", LABEL_FILL)
                    .attr("font-size", "9px")
                    .attr("font-weight", "bold")
                    .attr("style", "text-shadow: 0px 1px 2px #000"),
            );
        }
        self.graph.push(
            Node::text(
                NodeRole::Caption,
                self.config.width - 8.0,
                self.config.height - 8.0,
                format!("{} Radar View", self.city),
            )
            .attr("fill", CAPTION_FILL)
            .attr("font-size", "9px")
            .attr("text-anchor", "end"),
        );
        &self.graph
    }

    pub fn unmount(&mut self) {
        self.clear();
        self.graph.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{CityRadar, RadarConfig, RadarSpot};
    use crate::graph::{NodeRole, Shape};
    use foundation::math::GeoCoord;
    use foundation::time::Time;

    const TOKYO: GeoCoord = GeoCoord {
        lat: 35.6762,
        lng: 139.6503,
    };

    fn spot(name: &str, coordinates: Option<GeoCoord>) -> RadarSpot {
        RadarSpot {
            name: name.into(),
            coordinates,
        }
    }

    #[test]
    fn config_defaults() {
        let c = RadarConfig::default();
        assert_eq!((c.width, c.height, c.scale), (300.0, 200.0, 150_000.0));
        assert_eq!(c.ring_radii, vec![50.0, 100.0, 150.0]);
        assert_eq!(c.pulse_cycle_s, 2.0);
    }

    #[test]
    fn empty_spot_list_draws_nothing() {
        let mut radar = CityRadar::new(RadarConfig::default());
        radar.set_data(TOKYO, "Tokyo", Vec::new(), Time(0.0));
        assert!(radar.render(Time(0.0)).is_empty());
    }

    #[test]
    fn spots_without_coordinates_are_skipped() {
        let mut radar = CityRadar::new(RadarConfig::default());
        radar.set_data(
            TOKYO,
            "Tokyo",
            vec![
                spot("Shibuya Crossing", Some(GeoCoord::new(35.6595, 139.7005))),
                spot("Somewhere", None),
            ],
            Time(0.0),
        );
        assert_eq!(radar.spot_count(), 1);
        let g = radar.render(Time(1.0));
        assert_eq!(g.with_role(NodeRole::RangeRing).count(), 3);
        assert_eq!(g.with_role(NodeRole::Crosshair).count(), 2);
        assert_eq!(g.with_role(NodeRole::CityCenter).count(), 1);
        assert_eq!(g.with_role(NodeRole::SpotMarker).count(), 1);

        // South-east of the center lands right of and below the middle.
        let marker = g.with_role(NodeRole::SpotMarker).next().unwrap();
        let Shape::Circle { cx, cy, .. } = marker.shape else {
            panic!("marker is a circle");
        };
        assert!(cx > 150.0 && cy > 100.0);

        let label = g.with_role(NodeRole::SpotLabel).next().unwrap();
        assert_eq!(
            label.shape,
            Shape::Text {
                x: cx + 8.0,
                y: cy + 4.0,
                content: "Shibuya Crossing".into()
            }
        );
    }

    #[test]
    fn pulse_grows_linearly_and_repeats() {
        let mut radar = CityRadar::new(RadarConfig::default());
        radar.set_data(TOKYO, "Tokyo", vec![spot("Center", Some(TOKYO))], Time(0.0));
        let radius = |radar: &mut CityRadar, t: f64| {
            let g = radar.render(Time(t));
            match g.with_role(NodeRole::SpotPulse).next().map(|n| &n.shape) {
                Some(Shape::Circle { r, .. }) => *r,
                _ => panic!("missing pulse"),
            }
        };
        assert_eq!(radius(&mut radar, 0.0), 3.0);
        assert_eq!(radius(&mut radar, 1.0), 9.0);
        assert_eq!(radius(&mut radar, 2.0), 3.0);
    }

    #[test]
    fn new_data_and_unmount_cancel_pulses() {
        let mut radar = CityRadar::new(RadarConfig::default());
        radar.set_data(TOKYO, "Tokyo", vec![spot("A", Some(TOKYO))], Time(0.0));
        radar.set_data(TOKYO, "Tokyo", vec![spot("B", Some(TOKYO))], Time(0.5));
        let g = radar.render(Time(0.5));
        assert_eq!(g.with_role(NodeRole::SpotPulse).count(), 1);
        radar.unmount();
        assert!(radar.render(Time(1.0)).is_empty());
    }

    #[test]
    fn caption_names_the_city() {
        let mut radar = CityRadar::new(RadarConfig::default());
        radar.set_data(TOKYO, "Tokyo", vec![spot("Center", Some(TOKYO))], Time(0.0));
        let g = radar.render(Time(0.0));
        let captions: Vec<_> = g.with_role(NodeRole::Caption).collect();
        assert_eq!(captions.len(), 1);
        assert_eq!(
            captions[0].shape,
            Shape::Text {
                x: 292.0,
                y: 192.0,
                content: "Tokyo Radar View".into()
            }
        );
        assert!(g.to_svg().contains("data-role=\"caption\""));

        radar.set_data(TOKYO, "Kyoto", vec![spot("Gion", Some(TOKYO))], Time(1.0));
        let g = radar.render(Time(1.0));
        assert_eq!(g.with_role(NodeRole::Caption).count(), 1);
        assert!(g.to_svg().contains("Kyoto Radar View"));
    }
}
