//! Retained SVG scene graph.
//!
//! Renderers clear and refill a [`SceneGraph`] every frame; the browser glue
//! serializes it with [`SceneGraph::to_svg`] and swaps it into the page. Nodes
//! carry a [`NodeRole`] so tests and pointer handling can find them without
//! parsing markup.

use foundation::math::{format_number, push_number};

/// What a node represents. Doubles as the `data-role` attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Glow,
    Ocean,
    Region,
    Shadow,
    Route,
    Plane,
    OriginMarker,
    DestinationPulse,
    DestinationMarker,
    RangeRing,
    Crosshair,
    CityCenter,
    SpotPulse,
    SpotMarker,
    SpotLabel,
    Caption,
}

impl NodeRole {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeRole::Glow => "glow",
            NodeRole::Ocean => "ocean",
            NodeRole::Region => "region",
            NodeRole::Shadow => "shadow",
            NodeRole::Route => "route",
            NodeRole::Plane => "plane",
            NodeRole::OriginMarker => "origin",
            NodeRole::DestinationPulse => "destination-pulse",
            NodeRole::DestinationMarker => "destination",
            NodeRole::RangeRing => "range-ring",
            NodeRole::Crosshair => "crosshair",
            NodeRole::CityCenter => "city-center",
            NodeRole::SpotPulse => "spot-pulse",
            NodeRole::SpotMarker => "spot",
            NodeRole::SpotLabel => "spot-label",
            NodeRole::Caption => "caption",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Path { d: String },
    Circle { cx: f64, cy: f64, r: f64 },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    Text { x: f64, y: f64, content: String },
}

impl Shape {
    fn tag(&self) -> &'static str {
        match self {
            Shape::Path { .. } => "path",
            Shape::Circle { .. } => "circle",
            Shape::Line { .. } => "line",
            Shape::Text { .. } => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub role: NodeRole,
    pub shape: Shape,
    pub attrs: Vec<(&'static str, String)>,
}

impl Node {
    pub fn new(role: NodeRole, shape: Shape) -> Self {
        Self {
            role,
            shape,
            attrs: Vec::new(),
        }
    }

    pub fn path(role: NodeRole, d: impl Into<String>) -> Self {
        Self::new(role, Shape::Path { d: d.into() })
    }

    pub fn circle(role: NodeRole, cx: f64, cy: f64, r: f64) -> Self {
        Self::new(role, Shape::Circle { cx, cy, r })
    }

    pub fn line(role: NodeRole, x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(role, Shape::Line { x1, y1, x2, y2 })
    }

    pub fn text(role: NodeRole, x: f64, y: f64, content: impl Into<String>) -> Self {
        Self::new(
            role,
            Shape::Text {
                x,
                y,
                content: content.into(),
            },
        )
    }

    /// Sets an attribute, replacing an earlier value for the same name.
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    pub fn num_attr(self, name: &'static str, value: f64) -> Self {
        self.attr(name, format_number(value))
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Path data, if this node is a path.
    pub fn d(&self) -> Option<&str> {
        match &self.shape {
            Shape::Path { d } => Some(d),
            _ => None,
        }
    }

    fn write_svg(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.shape.tag());
        push_attr(out, "data-role", self.role.as_str());
        match &self.shape {
            Shape::Path { d } => push_attr(out, "d", d),
            Shape::Circle { cx, cy, r } => {
                push_num_attr(out, "cx", *cx);
                push_num_attr(out, "cy", *cy);
                push_num_attr(out, "r", *r);
            }
            Shape::Line { x1, y1, x2, y2 } => {
                push_num_attr(out, "x1", *x1);
                push_num_attr(out, "y1", *y1);
                push_num_attr(out, "x2", *x2);
                push_num_attr(out, "y2", *y2);
            }
            Shape::Text { x, y, .. } => {
                push_num_attr(out, "x", *x);
                push_num_attr(out, "y", *y);
            }
        }
        for (name, value) in &self.attrs {
            push_attr(out, name, value);
        }
        match &self.shape {
            Shape::Text { content, .. } => {
                out.push('>');
                push_escaped(out, content);
                out.push_str("</text>");
            }
            _ => out.push_str("/>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    pub offset: &'static str,
    pub color: &'static str,
    pub opacity: Option<f64>,
}

impl GradientStop {
    pub const fn new(offset: &'static str, color: &'static str) -> Self {
        Self {
            offset,
            color,
            opacity: None,
        }
    }

    pub const fn with_opacity(offset: &'static str, color: &'static str, opacity: f64) -> Self {
        Self {
            offset,
            color,
            opacity: Some(opacity),
        }
    }
}

/// Reusable paint servers and filters referenced by `url(#id)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Def {
    RadialGradient {
        id: &'static str,
        cx: &'static str,
        cy: &'static str,
        r: &'static str,
        stops: Vec<GradientStop>,
    },
    /// Horizontal gradient in user space, spanning `x1..x2` pixels.
    LinearGradient {
        id: &'static str,
        x1: f64,
        x2: f64,
        stops: Vec<GradientStop>,
    },
    GlowFilter {
        id: &'static str,
        std_deviation: f64,
    },
}

impl Def {
    pub fn id(&self) -> &'static str {
        match self {
            Def::RadialGradient { id, .. }
            | Def::LinearGradient { id, .. }
            | Def::GlowFilter { id, .. } => *id,
        }
    }

    fn write_svg(&self, out: &mut String) {
        match self {
            Def::RadialGradient {
                id,
                cx,
                cy,
                r,
                stops,
            } => {
                out.push_str("<radialGradient");
                push_attr(out, "id", id);
                push_attr(out, "cx", cx);
                push_attr(out, "cy", cy);
                push_attr(out, "r", r);
                out.push('>');
                write_stops(out, stops);
                out.push_str("</radialGradient>");
            }
            Def::LinearGradient { id, x1, x2, stops } => {
                out.push_str("<linearGradient");
                push_attr(out, "id", id);
                push_attr(out, "gradientUnits", "userSpaceOnUse");
                push_num_attr(out, "x1", *x1);
                push_attr(out, "y1", "0");
                push_num_attr(out, "x2", *x2);
                push_attr(out, "y2", "0");
                out.push('>');
                write_stops(out, stops);
                out.push_str("</linearGradient>");
            }
            Def::GlowFilter { id, std_deviation } => {
                out.push_str("<filter");
                push_attr(out, "id", id);
                out.push_str("><feGaussianBlur");
                push_num_attr(out, "stdDeviation", *std_deviation);
                push_attr(out, "result", "coloredBlur");
                out.push_str("/><feMerge><feMergeNode in=\"coloredBlur\"/>");
                out.push_str("<feMergeNode in=\"SourceGraphic\"/></feMerge></filter>");
            }
        }
    }
}

fn write_stops(out: &mut String, stops: &[GradientStop]) {
    for stop in stops {
        out.push_str("<stop");
        push_attr(out, "offset", stop.offset);
        push_attr(out, "stop-color", stop.color);
        if let Some(opacity) = stop.opacity {
            push_num_attr(out, "stop-opacity", opacity);
        }
        out.push_str("/>");
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    push_escaped(out, value);
    out.push('"');
}

fn push_num_attr(out: &mut String, name: &str, value: f64) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    push_number(out, value);
    out.push('"');
}

/// Appends `s` with the XML/HTML special characters escaped.
pub fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneGraph {
    pub width: f64,
    pub height: f64,
    pub background: Option<&'static str>,
    defs: Vec<Def>,
    nodes: Vec<Node>,
}

impl SceneGraph {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Drops every node and def. Size and background are kept.
    pub fn clear(&mut self) {
        self.defs.clear();
        self.nodes.clear();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Adds a def unless one with the same id exists.
    pub fn define(&mut self, def: Def) {
        if self.defs.iter().all(|d| d.id() != def.id()) {
            self.defs.push(def);
        }
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn defs(&self) -> &[Def] {
        &self.defs
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn with_role(&self, role: NodeRole) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.role == role)
    }

    /// Order of roles as drawn, with consecutive duplicates collapsed.
    pub fn role_order(&self) -> Vec<NodeRole> {
        let mut out: Vec<NodeRole> = Vec::new();
        for n in &self.nodes {
            if out.last() != Some(&n.role) {
                out.push(n.role);
            }
        }
        out
    }

    pub fn to_svg(&self) -> String {
        let mut out = String::with_capacity(256 + self.nodes.len() * 128);
        out.push_str("<svg xmlns=\"http://www.w3.org/2000/svg\"");
        push_num_attr(&mut out, "width", self.width);
        push_num_attr(&mut out, "height", self.height);
        if let Some(bg) = self.background {
            push_attr(&mut out, "style", &format!("background:{bg}"));
        }
        out.push('>');
        if !self.defs.is_empty() {
            out.push_str("<defs>");
            for d in &self.defs {
                d.write_svg(&mut out);
            }
            out.push_str("</defs>");
        }
        for n in &self.nodes {
            n.write_svg(&mut out);
        }
        out.push_str("</svg>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{Def, GradientStop, Node, NodeRole, SceneGraph};
    use pretty_assertions::assert_eq;

    #[test]
    fn serializes_nodes_in_insertion_order() {
        let mut g = SceneGraph::new(300.0, 200.0);
        g.push(Node::circle(NodeRole::CityCenter, 150.0, 100.0, 4.0).attr("fill", "#38bdf8"));
        g.push(Node::text(NodeRole::SpotLabel, 10.0, 20.5, "Café <Bar>"));
        assert_eq!(
            g.to_svg(),
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"300\" height=\"200\">\
             <circle data-role=\"city-center\" cx=\"150\" cy=\"100\" r=\"4\" fill=\"#38bdf8\"/>\
             <text data-role=\"spot-label\" x=\"10\" y=\"20.5\">Café &lt;Bar&gt;</text></svg>"
        );
    }

    #[test]
    fn attr_replaces_existing_value() {
        let n = Node::path(NodeRole::Region, "M0,0Z")
            .attr("fill", "#475569")
            .attr("fill", "#64748b");
        assert_eq!(n.attrs.len(), 1);
        assert_eq!(n.get_attr("fill"), Some("#64748b"));
    }

    #[test]
    fn attribute_values_are_escaped() {
        let mut g = SceneGraph::new(1.0, 1.0);
        g.push(Node::path(NodeRole::Region, "").attr("data-region", "Bosnia & \"Herz.\""));
        assert!(g.to_svg().contains("data-region=\"Bosnia &amp; &quot;Herz.&quot;\""));
    }

    #[test]
    fn defs_are_deduplicated_and_cleared() {
        let mut g = SceneGraph::new(1.0, 1.0);
        let glow = Def::GlowFilter {
            id: "glow",
            std_deviation: 2.5,
        };
        g.define(glow.clone());
        g.define(glow);
        g.define(Def::RadialGradient {
            id: "ocean",
            cx: "50%",
            cy: "50%",
            r: "50%",
            stops: vec![GradientStop::new("0%", "#1e293b")],
        });
        assert_eq!(g.defs().len(), 2);
        assert!(g.to_svg().contains("<filter id=\"glow\"><feGaussianBlur stdDeviation=\"2.5\""));
        g.clear();
        assert!(g.defs().is_empty() && g.is_empty());
    }

    #[test]
    fn role_order_collapses_runs() {
        let mut g = SceneGraph::new(1.0, 1.0);
        g.push(Node::path(NodeRole::Ocean, ""));
        g.push(Node::path(NodeRole::Region, ""));
        g.push(Node::path(NodeRole::Region, ""));
        g.push(Node::path(NodeRole::Shadow, ""));
        assert_eq!(
            g.role_order(),
            vec![NodeRole::Ocean, NodeRole::Region, NodeRole::Shadow]
        );
    }
}
