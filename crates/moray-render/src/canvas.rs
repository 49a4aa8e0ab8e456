//! Collaborator traits for the rendering primitive, plus the in-memory
//! implementation used by tests and the CLI.

use crate::anchor::control_point;
use crate::curvature::CurveAssignment;
use crate::geometry::Point;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Node circle radius used by the headless serializer.
pub const NODE_RADIUS: f64 = 18.0;

#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("{message}")]
    Serialize { message: String },
}

pub type CanvasResult<T> = std::result::Result<T, CanvasError>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// The rendering primitive the engine drives.
///
/// Element creation/removal, per-element style and class access, viewport
/// query, and full-extent vector serialization. Node drag repositioning is
/// the primitive's own concern; the engine only reads positions back.
pub trait Canvas {
    fn add_node(&mut self, id: &str, label: &str, position: Point);
    fn add_edge(&mut self, id: &str, source: &str, target: &str, curve: CurveAssignment);
    /// Removes every element. Full-rebuild teardown.
    fn remove_all(&mut self);
    /// Removes all edges, keeping nodes and their positions.
    fn remove_all_edges(&mut self);
    fn remove_node(&mut self, id: &str);
    fn has_node(&self, id: &str) -> bool;
    fn node_position(&self, id: &str) -> Option<Point>;
    fn set_node_position(&mut self, id: &str, position: Point);
    fn style(&self, element: &str, property: &str) -> Option<String>;
    fn set_style(&mut self, element: &str, property: &str, value: &str);
    fn remove_style(&mut self, element: &str, property: &str);
    fn add_class(&mut self, element: &str, class: &str);
    fn remove_class(&mut self, element: &str, class: &str);
    fn pan(&self) -> Point;
    fn zoom(&self) -> f64;
    /// Full-extent bounding box of the rendered graph, in canvas space.
    fn bounding_box(&self) -> Option<Bounds>;
    /// Full-extent vector serialization of the graph.
    fn svg(&self) -> CanvasResult<String>;
}

pub type LabelId = u64;

/// The floating-label placement capability: positioned, show/hide-able
/// elements anchored to arbitrary screen coordinates.
pub trait OverlayHost {
    fn create_label(&mut self, text: &str) -> LabelId;
    fn set_label_position(&mut self, id: LabelId, x: f64, y: f64);
    fn set_label_font_size(&mut self, id: LabelId, px: f64);
    fn set_label_visible(&mut self, id: LabelId, visible: bool);
    fn destroy_label(&mut self, id: LabelId);
}

#[derive(Debug, Clone)]
struct HeadlessNode {
    label: String,
    position: Point,
    styles: FxHashMap<String, String>,
    classes: BTreeSet<String>,
}

#[derive(Debug, Clone)]
struct HeadlessEdge {
    source: String,
    target: String,
    curve: CurveAssignment,
    styles: FxHashMap<String, String>,
    classes: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub visible: bool,
}

/// In-memory [`Canvas`] + [`OverlayHost`].
///
/// Serializes nodes as circles and edges as quadratic paths, translated so
/// the graph's bounding box lands at the origin (matching what the engine
/// expects when it injects export labels).
#[derive(Debug, Default)]
pub struct HeadlessCanvas {
    nodes: IndexMap<String, HeadlessNode>,
    edges: IndexMap<String, HeadlessEdge>,
    labels: BTreeMap<LabelId, HeadlessLabel>,
    next_label: LabelId,
    pan: Point,
    zoom_level: f64,
    fail_serialization: bool,
}

impl HeadlessCanvas {
    pub fn new() -> Self {
        Self {
            zoom_level: 1.0,
            ..Self::default()
        }
    }

    pub fn set_viewport(&mut self, pan: Point, zoom: f64) {
        self.pan = pan;
        self.zoom_level = zoom;
    }

    /// Forces [`Canvas::svg`] to fail. Used to exercise export cleanup
    /// paths.
    pub fn set_fail_serialization(&mut self, fail: bool) {
        self.fail_serialization = fail;
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    pub fn classes(&self, element: &str) -> Vec<String> {
        if let Some(n) = self.nodes.get(element) {
            return n.classes.iter().cloned().collect();
        }
        if let Some(e) = self.edges.get(element) {
            return e.classes.iter().cloned().collect();
        }
        Vec::new()
    }

    pub fn overlay_labels(&self) -> &BTreeMap<LabelId, HeadlessLabel> {
        &self.labels
    }

    fn edge_endpoints(&self, edge: &HeadlessEdge) -> Option<(Point, Point)> {
        let s = self.nodes.get(&edge.source)?.position;
        let t = self.nodes.get(&edge.target)?.position;
        Some((s, t))
    }
}

impl Canvas for HeadlessCanvas {
    fn add_node(&mut self, id: &str, label: &str, position: Point) {
        self.nodes.insert(
            id.to_string(),
            HeadlessNode {
                label: label.to_string(),
                position,
                styles: FxHashMap::default(),
                classes: BTreeSet::new(),
            },
        );
    }

    fn add_edge(&mut self, id: &str, source: &str, target: &str, curve: CurveAssignment) {
        self.edges.insert(
            id.to_string(),
            HeadlessEdge {
                source: source.to_string(),
                target: target.to_string(),
                curve,
                styles: FxHashMap::default(),
                classes: BTreeSet::new(),
            },
        );
    }

    fn remove_all(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    fn remove_all_edges(&mut self) {
        self.edges.clear();
    }

    fn remove_node(&mut self, id: &str) {
        self.nodes.shift_remove(id);
    }

    fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    fn node_position(&self, id: &str) -> Option<Point> {
        self.nodes.get(id).map(|n| n.position)
    }

    fn set_node_position(&mut self, id: &str, position: Point) {
        if let Some(n) = self.nodes.get_mut(id) {
            n.position = position;
        }
    }

    fn style(&self, element: &str, property: &str) -> Option<String> {
        if let Some(n) = self.nodes.get(element) {
            return n.styles.get(property).cloned();
        }
        self.edges
            .get(element)
            .and_then(|e| e.styles.get(property).cloned())
    }

    fn set_style(&mut self, element: &str, property: &str, value: &str) {
        if let Some(n) = self.nodes.get_mut(element) {
            n.styles.insert(property.to_string(), value.to_string());
        } else if let Some(e) = self.edges.get_mut(element) {
            e.styles.insert(property.to_string(), value.to_string());
        }
    }

    fn remove_style(&mut self, element: &str, property: &str) {
        if let Some(n) = self.nodes.get_mut(element) {
            n.styles.remove(property);
        } else if let Some(e) = self.edges.get_mut(element) {
            e.styles.remove(property);
        }
    }

    fn add_class(&mut self, element: &str, class: &str) {
        if let Some(n) = self.nodes.get_mut(element) {
            n.classes.insert(class.to_string());
        } else if let Some(e) = self.edges.get_mut(element) {
            e.classes.insert(class.to_string());
        }
    }

    fn remove_class(&mut self, element: &str, class: &str) {
        if let Some(n) = self.nodes.get_mut(element) {
            n.classes.remove(class);
        } else if let Some(e) = self.edges.get_mut(element) {
            e.classes.remove(class);
        }
    }

    fn pan(&self) -> Point {
        self.pan
    }

    fn zoom(&self) -> f64 {
        self.zoom_level
    }

    fn bounding_box(&self) -> Option<Bounds> {
        let node_extents = self.nodes.values().flat_map(|n| {
            [
                (n.position.x - NODE_RADIUS, n.position.y - NODE_RADIUS),
                (n.position.x + NODE_RADIUS, n.position.y + NODE_RADIUS),
            ]
        });
        let control_points = self.edges.values().filter_map(|e| {
            let (s, t) = self.edge_endpoints(e)?;
            let c = control_point(s, t, e.curve);
            Some((c.x, c.y))
        });
        Bounds::from_points(node_extents.chain(control_points))
    }

    fn svg(&self) -> CanvasResult<String> {
        if self.fail_serialization {
            return Err(CanvasError::Serialize {
                message: "serialization disabled".to_string(),
            });
        }

        let bounds = self.bounding_box().unwrap_or(Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 100.0,
            max_y: 100.0,
        });
        let w = bounds.width().max(1.0);
        let h = bounds.height().max(1.0);

        let mut out = String::new();
        let _ = writeln!(
            &mut out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = fmt(w),
            h = fmt(h),
        );

        out.push_str(r#"<g class="edges">"#);
        for (id, edge) in &self.edges {
            let Some((s, t)) = self.edge_endpoints(edge) else {
                continue;
            };
            let ctrl = control_point(s, t, edge.curve);
            let stroke = edge
                .styles
                .get("line-color")
                .map(String::as_str)
                .unwrap_or("#999999");
            let stroke_width = edge
                .styles
                .get("width")
                .map(String::as_str)
                .unwrap_or("1.5");
            let _ = write!(
                &mut out,
                r#"<path id="{id}" class="{class}" d="M {x0} {y0} Q {cx} {cy} {x1} {y1}" fill="none" stroke="{stroke}" stroke-width="{sw}"/>"#,
                id = escape_xml(id),
                class = escape_xml(&edge.classes.iter().cloned().collect::<Vec<_>>().join(" ")),
                x0 = fmt(s.x - bounds.min_x),
                y0 = fmt(s.y - bounds.min_y),
                cx = fmt(ctrl.x - bounds.min_x),
                cy = fmt(ctrl.y - bounds.min_y),
                x1 = fmt(t.x - bounds.min_x),
                y1 = fmt(t.y - bounds.min_y),
                stroke = escape_xml(stroke),
                sw = escape_xml(stroke_width),
            );
        }
        out.push_str("</g>\n");

        out.push_str(r#"<g class="nodes">"#);
        for (id, node) in &self.nodes {
            let cx = node.position.x - bounds.min_x;
            let cy = node.position.y - bounds.min_y;
            let fill = node
                .styles
                .get("background-color")
                .map(String::as_str)
                .unwrap_or("#ffffff");
            let border = node
                .styles
                .get("border-color")
                .map(String::as_str)
                .unwrap_or("#666666");
            let border_width = node
                .styles
                .get("border-width")
                .map(String::as_str)
                .unwrap_or("1");
            let _ = write!(
                &mut out,
                r#"<circle id="{id}" class="{class}" cx="{cx}" cy="{cy}" r="{r}" fill="{fill}" stroke="{stroke}" stroke-width="{sw}"/>"#,
                id = escape_xml(id),
                class = escape_xml(&node.classes.iter().cloned().collect::<Vec<_>>().join(" ")),
                cx = fmt(cx),
                cy = fmt(cy),
                r = fmt(NODE_RADIUS),
                fill = escape_xml(fill),
                stroke = escape_xml(border),
                sw = escape_xml(border_width),
            );
            let label = node
                .styles
                .get("label")
                .map(String::as_str)
                .unwrap_or(node.label.as_str());
            if !label.is_empty() {
                let color = node
                    .styles
                    .get("color")
                    .map(String::as_str)
                    .unwrap_or("#333333");
                let _ = write!(
                    &mut out,
                    r#"<text x="{x}" y="{y}" text-anchor="middle" font-size="11" fill="{fill}">{text}</text>"#,
                    x = fmt(cx),
                    y = fmt(cy + NODE_RADIUS + 14.0),
                    fill = escape_xml(color),
                    text = escape_xml(label),
                );
            }
        }
        out.push_str("</g>\n");

        out.push_str("</svg>\n");
        Ok(out)
    }
}

impl OverlayHost for HeadlessCanvas {
    fn create_label(&mut self, text: &str) -> LabelId {
        let id = self.next_label;
        self.next_label += 1;
        self.labels.insert(
            id,
            HeadlessLabel {
                text: text.to_string(),
                x: 0.0,
                y: 0.0,
                font_size: 10.0,
                visible: true,
            },
        );
        id
    }

    fn set_label_position(&mut self, id: LabelId, x: f64, y: f64) {
        if let Some(l) = self.labels.get_mut(&id) {
            l.x = x;
            l.y = y;
        }
    }

    fn set_label_font_size(&mut self, id: LabelId, px: f64) {
        if let Some(l) = self.labels.get_mut(&id) {
            l.font_size = px;
        }
    }

    fn set_label_visible(&mut self, id: LabelId, visible: bool) {
        if let Some(l) = self.labels.get_mut(&id) {
            l.visible = visible;
        }
    }

    fn destroy_label(&mut self, id: LabelId) {
        self.labels.remove(&id);
    }
}

/// Stringifies a coordinate for SVG attributes: round-trippable, no `-0`,
/// no tiny float noise from our own calculations.
pub(crate) fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    let s = v.to_string();
    if s == "-0" { "0".to_string() } else { s }
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
