//! Static backdrop of the city radar: range rings, crosshairs and the city
//! center marker.

use crate::graph::{Node, NodeRole, SceneGraph};

pub const GRID_STROKE: &str = "#334155";
pub const CENTER_FILL: &str = "#38bdf8";
pub const SPOT_COLOR: &str = "#f43f5e";
pub const LABEL_FILL: &str = "#e2e8f0";
pub const CAPTION_FILL: &str = "#64748b";

pub fn push_radar_backdrop(graph: &mut SceneGraph, ring_radii: &[f64]) {
    let (w, h) = (graph.width, graph.height);
    let (cx, cy) = (w / 2.0, h / 2.0);
    for r in ring_radii {
        graph.push(
            Node::circle(NodeRole::RangeRing, cx, cy, *r)
                .attr("fill", "none")
                .attr("stroke", GRID_STROKE)
                .attr("stroke-dasharray", "4 4"),
        );
    }
    graph.push(Node::line(NodeRole::Crosshair, 0.0, cy, w, cy).attr("stroke", GRID_STROKE));
    graph.push(Node::line(NodeRole::Crosshair, cx, 0.0, cx, h).attr("stroke", GRID_STROKE));
    graph.push(
        Node::circle(NodeRole::CityCenter, cx, cy, 4.0)
            .attr("fill", CENTER_FILL)
            .attr("stroke", "#fff")
            .attr("stroke-width", "2"),
    );
}
