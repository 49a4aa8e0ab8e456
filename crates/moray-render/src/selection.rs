//! Selection and highlight state.

use crate::canvas::Canvas;
use moray_core::model::EdgeKey;

/// Class applied to the selected element and its immediate neighbors.
pub const HIGHLIGHT_CLASS: &str = "highlighted";

/// At most one element is selected at a time; selecting a new one clears
/// the previous selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Idle,
    Node(String),
    Edge(EdgeKey),
}

/// Owns the highlight-class set so every transition can unwind exactly what
/// it applied.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    current: Selection,
    highlighted: Vec<String>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Selection {
        &self.current
    }

    fn clear_classes(&mut self, canvas: &mut impl Canvas) {
        for element in self.highlighted.drain(..) {
            canvas.remove_class(&element, HIGHLIGHT_CLASS);
        }
    }

    fn highlight(&mut self, canvas: &mut impl Canvas, element: String) {
        canvas.add_class(&element, HIGHLIGHT_CLASS);
        self.highlighted.push(element);
    }

    /// Node tap: highlight the node and every edge touching it.
    pub fn select_node(&mut self, canvas: &mut impl Canvas, id: &str, touching: &[EdgeKey]) {
        self.clear_classes(canvas);
        self.highlight(canvas, id.to_string());
        for key in touching {
            self.highlight(canvas, key.element_id());
        }
        self.current = Selection::Node(id.to_string());
    }

    /// Edge tap: highlight the edge and its two endpoint nodes.
    pub fn select_edge(&mut self, canvas: &mut impl Canvas, key: &EdgeKey) {
        self.clear_classes(canvas);
        self.highlight(canvas, key.element_id());
        self.highlight(canvas, key.source.clone());
        self.highlight(canvas, key.target.clone());
        self.current = Selection::Edge(key.clone());
    }

    /// Background tap or full rebuild: back to idle.
    pub fn clear(&mut self, canvas: &mut impl Canvas) {
        self.clear_classes(canvas);
        self.current = Selection::Idle;
    }
}
