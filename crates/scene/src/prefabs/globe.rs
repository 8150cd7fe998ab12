//! Static layers and paint servers of the globe.

use crate::graph::{Def, GradientStop, Node, NodeRole, SceneGraph};
use crate::path::GeoPath;
use crate::components::GeoGeometry;

pub const BACKGROUND: &str = "#0f172a";
pub const GLOW_STROKE: &str = "#38bdf8";
pub const REGION_FILL: &str = "#475569";
pub const REGION_STROKE: &str = "#64748b";
pub const REGION_HOVER_FILL: &str = "#64748b";
pub const REGION_HOVER_STROKE: &str = "#94a3b8";
pub const ORIGIN_COLOR: &str = "#10b981";
pub const DESTINATION_COLOR: &str = "#f43f5e";
pub const MARKER_STROKE: &str = "#fff";

pub const OCEAN_GRADIENT: &str = "oceanGradient";
pub const SHADOW_GRADIENT: &str = "shadowGradient";
pub const FLIGHT_GRADIENT: &str = "flightGradient";
pub const GLOW_FILTER: &str = "glow";

/// Plane icon, nose at the origin of its own frame pointing up.
pub const PLANE_PATH: &str = "M2,0 L10,20 L2,16 L-6,20 L2,0";

/// Paint servers shared by every globe frame. The flight gradient spans the
/// full viewport width.
pub fn define_globe_paint(graph: &mut SceneGraph) {
    graph.define(Def::RadialGradient {
        id: OCEAN_GRADIENT,
        cx: "50%",
        cy: "50%",
        r: "50%",
        stops: vec![
            GradientStop::new("0%", "#1e293b"),
            GradientStop::new("100%", "#020617"),
        ],
    });
    graph.define(Def::LinearGradient {
        id: FLIGHT_GRADIENT,
        x1: 0.0,
        x2: graph.width,
        stops: vec![
            GradientStop::new("0%", ORIGIN_COLOR),
            GradientStop::new("100%", DESTINATION_COLOR),
        ],
    });
    graph.define(Def::GlowFilter {
        id: GLOW_FILTER,
        std_deviation: 2.5,
    });
    graph.define(Def::RadialGradient {
        id: SHADOW_GRADIENT,
        cx: "75%",
        cy: "25%",
        r: "100%",
        stops: vec![
            GradientStop::with_opacity("50%", "transparent", 0.0),
            GradientStop::with_opacity("100%", "#000", 0.6),
        ],
    });
}

/// Glow outline and ocean fill, drawn beneath the regions.
pub fn push_sphere_backdrop(graph: &mut SceneGraph, path: &GeoPath<'_>) {
    let sphere = path.path(&GeoGeometry::Sphere);
    graph.push(
        Node::path(NodeRole::Glow, sphere.clone())
            .attr("fill", "none")
            .attr("stroke", GLOW_STROKE)
            .attr("stroke-width", "1")
            .attr("stroke-opacity", "0.3")
            .attr("filter", format!("url(#{GLOW_FILTER})")),
    );
    graph.push(
        Node::path(NodeRole::Ocean, sphere)
            .attr("fill", format!("url(#{OCEAN_GRADIENT})"))
            .attr("stroke", "none"),
    );
}

/// Terminator-style shading over the regions. Never receives pointer events.
pub fn push_shadow(graph: &mut SceneGraph, path: &GeoPath<'_>) {
    graph.push(
        Node::path(NodeRole::Shadow, path.path(&GeoGeometry::Sphere))
            .attr("fill", format!("url(#{SHADOW_GRADIENT})"))
            .attr("pointer-events", "none"),
    );
}

#[cfg(test)]
mod tests {
    use super::{define_globe_paint, push_shadow, push_sphere_backdrop};
    use crate::graph::{NodeRole, SceneGraph};
    use crate::path::GeoPath;
    use foundation::math::{Vec2, ViewRotation, Orthographic};

    #[test]
    fn backdrop_layers_share_the_sphere_outline() {
        let proj = Orthographic::new(ViewRotation::default(), 50.0, Vec2::new(60.0, 60.0));
        let path = GeoPath::new(&proj);
        let mut g = SceneGraph::new(120.0, 120.0);
        define_globe_paint(&mut g);
        push_sphere_backdrop(&mut g, &path);
        push_shadow(&mut g, &path);

        assert_eq!(g.defs().len(), 4);
        assert_eq!(
            g.role_order(),
            vec![NodeRole::Glow, NodeRole::Ocean, NodeRole::Shadow]
        );
        let ds: Vec<_> = g.nodes().iter().filter_map(|n| n.d()).collect();
        assert!(ds.windows(2).all(|w| w[0] == w[1]));
        assert!(g.to_svg().contains("fill=\"url(#oceanGradient)\""));
    }
}
