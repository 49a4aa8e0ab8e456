//! Viewport-synchronized floating labels.
//!
//! One floating label per named interface endpoint, owned in an arena keyed
//! by edge identity. Geometry is recomputed from current values on every
//! viewport event; only curve assignments and the label handles themselves
//! survive across events.

use crate::anchor::{self, AnchorParams, LABEL_ARC_RATIO};
use crate::canvas::{Canvas, LabelId, OverlayHost};
use crate::curvature::CurveAssignment;
use crate::selection::Selection;
use crate::view::RenderedEdge;
use indexmap::IndexMap;
use moray_core::Theme;
use moray_core::command::LabelMode;
use moray_core::model::EdgeKey;

pub const EDGE_LABEL_BASE_FONT: f64 = 10.0;
pub const EDGE_LABEL_FONT_RANGE: (f64, f64) = (6.0, 20.0);
pub const NODE_LABEL_BASE_FONT: f64 = 12.0;
pub const NODE_LABEL_FONT_RANGE: (f64, f64) = (6.0, 24.0);

#[derive(Debug)]
struct EndpointLabel {
    id: LabelId,
    from_source: bool,
}

#[derive(Debug)]
struct OverlayEntry {
    assignment: CurveAssignment,
    labels: Vec<EndpointLabel>,
}

/// Arena of floating labels plus the active visibility mode.
#[derive(Debug, Default)]
pub struct OverlayManager {
    entries: IndexMap<EdgeKey, OverlayEntry>,
    mode: LabelMode,
}

impl OverlayManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> LabelMode {
        self.mode
    }

    pub fn label_count(&self) -> usize {
        self.entries.values().map(|e| e.labels.len()).sum()
    }

    /// Tears down every floating label. Must run before any full rebuild so
    /// no handle leaks across snapshots.
    pub fn destroy_all(&mut self, host: &mut impl OverlayHost) {
        for (_, entry) in self.entries.drain(..) {
            for label in entry.labels {
                host.destroy_label(label.id);
            }
        }
    }

    /// Recreates labels for every edge with at least one named interface.
    pub fn rebuild<S: Canvas + OverlayHost>(&mut self, surface: &mut S, edges: &[RenderedEdge]) {
        self.destroy_all(surface);
        for edge in edges {
            let mut labels = Vec::new();
            if let Some(text) = &edge.resolved.source_label {
                labels.push(EndpointLabel {
                    id: surface.create_label(text),
                    from_source: true,
                });
            }
            if let Some(text) = &edge.resolved.target_label {
                labels.push(EndpointLabel {
                    id: surface.create_label(text),
                    from_source: false,
                });
            }
            if !labels.is_empty() {
                self.entries.insert(
                    edge.resolved.key.clone(),
                    OverlayEntry {
                        assignment: edge.assignment,
                        labels,
                    },
                );
            }
        }
    }

    /// Repositions every label over its current anchor and rescales fonts.
    ///
    /// Anchors are computed fresh from live endpoint positions and the
    /// current pan/zoom; nothing here is cached across viewport changes.
    pub fn sync_positions<S: Canvas + OverlayHost>(&mut self, surface: &mut S) {
        let pan = surface.pan();
        let zoom = surface.zoom();
        let (min_font, max_font) = EDGE_LABEL_FONT_RANGE;
        let font = (EDGE_LABEL_BASE_FONT * zoom).clamp(min_font, max_font);

        for (key, entry) in &self.entries {
            let (Some(source), Some(target)) = (
                surface.node_position(&key.source),
                surface.node_position(&key.target),
            ) else {
                continue;
            };
            for label in &entry.labels {
                let (near, far) = if label.from_source {
                    (source, target)
                } else {
                    (target, source)
                };
                let anchor_point = anchor::label_anchor(
                    source,
                    target,
                    entry.assignment,
                    AnchorParams {
                        ratio: LABEL_ARC_RATIO,
                        offset: 0.0,
                        shift: anchor::shift_for(near, far),
                        from_source: label.from_source,
                    },
                );
                surface.set_label_position(
                    label.id,
                    anchor_point.x * zoom + pan.x,
                    anchor_point.y * zoom + pan.y,
                );
                surface.set_label_font_size(label.id, font);
            }
        }
    }

    /// Scales node label fonts with the zoom level.
    pub fn sync_node_fonts<'a, S: Canvas>(
        &self,
        surface: &mut S,
        node_ids: impl IntoIterator<Item = &'a str>,
    ) {
        let zoom = surface.zoom();
        let (min_font, max_font) = NODE_LABEL_FONT_RANGE;
        let font = (NODE_LABEL_BASE_FONT * zoom).clamp(min_font, max_font);
        let value = crate::canvas::fmt(font);
        for id in node_ids {
            surface.set_style(id, "font-size", &value);
        }
    }

    /// Applies the current mode to every label without touching geometry.
    pub fn apply_visibility(&mut self, host: &mut impl OverlayHost, selection: &Selection) {
        for (key, entry) in &self.entries {
            let visible = match self.mode {
                LabelMode::Hide => false,
                LabelMode::Show => true,
                LabelMode::Select => match selection {
                    Selection::Idle => false,
                    Selection::Node(id) => key.source == *id || key.target == *id,
                    Selection::Edge(selected) => selected == key,
                },
            };
            for label in &entry.labels {
                host.set_label_visible(label.id, visible);
            }
        }
    }

    pub fn set_mode(
        &mut self,
        host: &mut impl OverlayHost,
        mode: LabelMode,
        selection: &Selection,
    ) {
        self.mode = mode;
        self.apply_visibility(host, selection);
    }
}

/// Recolors every edge from its link state. Runs when edges are (re)added
/// and when the theme changes.
pub fn recolor(canvas: &mut impl Canvas, edges: &[RenderedEdge], theme: &Theme) {
    for edge in edges {
        let color = match edge.resolved.effective_state() {
            Some("up") | Some("active") => &theme.link_up_color,
            Some(_) => &theme.link_down_color,
            None => &theme.link_neutral_color,
        };
        canvas.set_style(&edge.resolved.key.element_id(), "line-color", color);
    }
}
