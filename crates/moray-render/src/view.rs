//! The interactive topology view.
//!
//! Single-threaded and event-driven: every entry point runs synchronously
//! inside the triggering event and recomputes from current values. The only
//! state carried across events is the curve-assignment cache (jitter
//! avoidance) and the floating-label handles.

use crate::canvas::{Canvas, OverlayHost};
use crate::curvature::{self, CurveAssignment, NodeMeta};
use crate::export;
use crate::overlay::{self, OverlayManager};
use crate::selection::{Selection, SelectionTracker};
use crate::text::{DeterministicTextMeasurer, TextMeasurer};
use crate::tier;
use crate::{Error, Result};
use moray_core::Theme;
use moray_core::command::{Command, ExportOptions, LabelMode, Request};
use moray_core::model::{EdgeKey, GraphNode, ResolvedEdge, TopologySnapshot};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// One edge as currently rendered: resolved identity plus its position in
/// the pair group and curve assignment.
#[derive(Debug, Clone)]
pub struct RenderedEdge {
    pub resolved: ResolvedEdge,
    pub pair_index: usize,
    pub assignment: CurveAssignment,
}

/// The graph view engine, generic over the rendering surface.
pub struct TopologyView<S: Canvas + OverlayHost> {
    surface: S,
    namespace: Option<String>,
    nodes: Vec<GraphNode>,
    edges: Vec<RenderedEdge>,
    curve_cache: FxHashMap<EdgeKey, CurveAssignment>,
    overlay: OverlayManager,
    selection: SelectionTracker,
    theme: Theme,
    measurer: Box<dyn TextMeasurer>,
    requests: Vec<Request>,
}

impl<S: Canvas + OverlayHost> TopologyView<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            namespace: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            curve_cache: FxHashMap::default(),
            overlay: OverlayManager::new(),
            selection: SelectionTracker::new(),
            theme: Theme::default(),
            measurer: Box::new(DeterministicTextMeasurer::default()),
            requests: Vec::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn selection(&self) -> &Selection {
        self.selection.current()
    }

    pub fn edges(&self) -> &[RenderedEdge] {
        &self.edges
    }

    pub fn label_mode(&self) -> LabelMode {
        self.overlay.mode()
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_text_measurer(&mut self, measurer: Box<dyn TextMeasurer>) {
        self.measurer = measurer;
    }

    /// Renders a snapshot. Idempotent: the same snapshot for the same
    /// namespace yields identical positions and curve assignments.
    ///
    /// A namespace change is a full rebuild: floating labels are torn down,
    /// the curve cache and selection are dropped, and tier layout runs for
    /// every node. A same-namespace update rebuilds all edges and overlays
    /// but leaves existing node positions alone, so dragged nodes stay put
    /// and cached curve assignments keep live geometry from jittering.
    pub fn render(&mut self, namespace: &str, snapshot: &TopologySnapshot) {
        let full = self.namespace.as_deref() != Some(namespace);
        self.overlay.destroy_all(&mut self.surface);
        if full {
            self.selection.clear(&mut self.surface);
            self.surface.remove_all();
            self.curve_cache.clear();
            self.namespace = Some(namespace.to_string());
        } else {
            self.surface.remove_all_edges();
            // Nodes that left the snapshot go too; survivors keep their
            // (possibly dragged) positions.
            let incoming: std::collections::BTreeSet<&str> =
                snapshot.nodes.iter().map(|n| n.id.as_str()).collect();
            let stale: Vec<String> = self
                .nodes
                .iter()
                .filter(|n| !incoming.contains(n.id.as_str()))
                .map(|n| n.id.clone())
                .collect();
            for id in stale {
                self.surface.remove_node(&id);
            }
        }

        // Curvature sees positions as they are when an edge is first
        // assigned: nodes not on the surface yet count as origin. Captured
        // before tier layout places anything.
        let meta: FxHashMap<String, NodeMeta> = snapshot
            .nodes
            .iter()
            .map(|n| {
                (
                    n.id.clone(),
                    NodeMeta {
                        tier: n.tier,
                        position: self.surface.node_position(&n.id).unwrap_or_default(),
                    },
                )
            })
            .collect();

        let positions: FxHashMap<String, crate::geometry::Point> =
            tier::assign_positions(&snapshot.nodes).into_iter().collect();
        for node in &snapshot.nodes {
            if !self.surface.has_node(&node.id) {
                let Some(position) = positions.get(&node.id) else {
                    continue;
                };
                let label = if node.label.is_empty() {
                    node.id.as_str()
                } else {
                    node.label.as_str()
                };
                self.surface.add_node(&node.id, label, *position);
            }
        }
        self.nodes = snapshot.nodes.clone();

        let (resolved, skipped) = snapshot.resolve_edges();
        if skipped > 0 {
            warn!(skipped, "dropped edges without resolvable endpoints");
        }

        let distributed = curvature::distribute(&resolved, &meta, &mut self.curve_cache);

        self.edges = resolved
            .into_iter()
            .zip(distributed)
            .map(|(resolved, d)| RenderedEdge {
                resolved,
                pair_index: d.pair_index,
                assignment: d.assignment,
            })
            .collect();
        for edge in &self.edges {
            self.surface.add_edge(
                &edge.resolved.key.element_id(),
                &edge.resolved.key.source,
                &edge.resolved.key.target,
                edge.assignment,
            );
        }

        self.reapply_selection();

        overlay::recolor(&mut self.surface, &self.edges, &self.theme);
        self.overlay.rebuild(&mut self.surface, &self.edges);
        self.overlay.sync_positions(&mut self.surface);
        self.sync_node_fonts();
        self.overlay
            .apply_visibility(&mut self.surface, self.selection.current());

        debug!(
            namespace,
            full,
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "rendered topology snapshot"
        );
    }

    /// Recreated edge elements come back with empty class sets, so a
    /// surviving selection is highlighted again from scratch. A selection
    /// whose element left the snapshot goes back to idle.
    fn reapply_selection(&mut self) {
        match self.selection.current().clone() {
            Selection::Idle => {}
            Selection::Node(id) => {
                if self.nodes.iter().any(|n| n.id == id) {
                    let touching = self.touching_edges(&id);
                    self.selection.select_node(&mut self.surface, &id, &touching);
                } else {
                    self.selection.clear(&mut self.surface);
                }
            }
            Selection::Edge(key) => {
                if self.edges.iter().any(|e| e.resolved.key == key) {
                    self.selection.select_edge(&mut self.surface, &key);
                } else {
                    self.selection.clear(&mut self.surface);
                }
            }
        }
    }

    fn touching_edges(&self, id: &str) -> Vec<EdgeKey> {
        self.edges
            .iter()
            .filter(|e| e.resolved.key.source == id || e.resolved.key.target == id)
            .map(|e| e.resolved.key.clone())
            .collect()
    }

    fn sync_node_fonts(&mut self) {
        let ids: Vec<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.overlay.sync_node_fonts(&mut self.surface, ids);
    }

    /// Pointer-down on a node.
    pub fn tap_node(&mut self, id: &str) {
        let Some(node) = self.nodes.iter().find(|n| n.id == id) else {
            return;
        };
        let touching = self.touching_edges(id);
        let payload = node.raw.clone();
        self.selection.select_node(&mut self.surface, id, &touching);
        self.requests.push(Request::OpenResource(payload));
        self.overlay
            .apply_visibility(&mut self.surface, self.selection.current());
    }

    /// Pointer-down on an edge.
    pub fn tap_edge(&mut self, key: &EdgeKey) {
        let Some(edge) = self.edges.iter().find(|e| &e.resolved.key == key) else {
            return;
        };
        let payload = edge.resolved.detail_payload();
        self.selection.select_edge(&mut self.surface, key);
        self.requests.push(Request::OpenResource(payload));
        self.overlay
            .apply_visibility(&mut self.surface, self.selection.current());
    }

    /// Pointer-down on the empty canvas background.
    pub fn tap_background(&mut self) {
        self.selection.clear(&mut self.surface);
        self.overlay
            .apply_visibility(&mut self.surface, self.selection.current());
    }

    /// Double-click on a node: remote-shell request. Does not change the
    /// selection.
    pub fn double_click_node(&mut self, id: &str) {
        if let Some(node) = self.nodes.iter().find(|n| n.id == id) {
            self.requests.push(Request::SshTopoNode(node.raw.clone()));
        }
    }

    /// Pan, zoom or resize: reposition every floating label from current
    /// values.
    pub fn viewport_changed(&mut self) {
        self.overlay.sync_positions(&mut self.surface);
        self.sync_node_fonts();
    }

    /// A node was dragged; labels on its edges follow.
    pub fn node_moved(&mut self, _id: &str) {
        self.overlay.sync_positions(&mut self.surface);
    }

    pub fn set_label_mode(&mut self, mode: LabelMode) {
        self.overlay
            .set_mode(&mut self.surface, mode, self.selection.current());
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        overlay::recolor(&mut self.surface, &self.edges, &self.theme);
    }

    /// Produces a self-contained SVG of the current view. The live view is
    /// visually unaffected, also when serialization fails.
    pub fn export_svg(&mut self, options: &ExportOptions) -> Result<String> {
        let node_ids: Vec<String> = self.nodes.iter().map(|n| n.id.clone()).collect();
        export::export_svg(
            &mut self.surface,
            &self.edges,
            &node_ids,
            &self.theme,
            self.measurer.as_ref(),
            options,
        )
    }

    /// Handles one inbound panel command.
    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Render {
                namespace,
                snapshot,
            } => self.render(&namespace, &snapshot),
            Command::SetLabelMode(mode) => self.set_label_mode(mode),
            Command::SetTheme(theme) => self.set_theme(theme),
            Command::ExportSvg(options) => match self.export_svg(&options) {
                Ok(svg) => self.requests.push(Request::SvgExported(svg)),
                Err(Error::Canvas(err)) => {
                    self.requests.push(Request::ExportFailed(err.to_string()))
                }
            },
        }
    }

    /// Drains queued outbound requests for the hosting panel.
    pub fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.requests)
    }
}
