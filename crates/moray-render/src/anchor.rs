//! Canvas-space anchor points for floating edge labels.

use crate::curvature::CurveAssignment;
use crate::geometry::{self, Point};

/// Fraction of the curve's true arc length between an endpoint and its
/// label.
pub const LABEL_ARC_RATIO: f64 = 0.2;

/// Magnitude of the longitudinal parameter shift that keeps the two
/// endpoint labels of a near-vertical edge from colliding.
pub const LABEL_SHIFT: f64 = 0.1;

/// How an anchor is measured along the edge.
#[derive(Debug, Clone, Copy)]
pub struct AnchorParams {
    /// Arc-length ratio from the chosen endpoint.
    pub ratio: f64,
    /// Perpendicular offset along the local normal at the anchor.
    pub offset: f64,
    /// Longitudinal shift added to the resolved parameter, in canonical
    /// source-to-target parameter space.
    pub shift: f64,
    /// Whether arc length is measured from the source endpoint.
    pub from_source: bool,
}

/// Reconstructs the Bézier control point from an assignment and the live
/// endpoints: the weight-point on the chord, displaced `distance` along the
/// chord normal.
pub fn control_point(source: Point, target: Point, assignment: CurveAssignment) -> Point {
    let base = Point::new(
        source.x + (target.x - source.x) * assignment.weight,
        source.y + (target.y - source.y) * assignment.weight,
    );
    let len = source.distance(target);
    if len == 0.0 {
        return base;
    }
    let nx = -(target.y - source.y) / len;
    let ny = (target.x - source.x) / len;
    Point::new(
        base.x + nx * assignment.distance,
        base.y + ny * assignment.distance,
    )
}

/// Computes the canvas-space anchor for one edge endpoint's label.
///
/// Measuring from the target is an endpoint swap plus `1 - t`, so both
/// labels sit the same arc-length ratio away from their own endpoint. The
/// shifted parameter is clamped into `[0, 1]` before evaluation; `offset`
/// is applied along the derivative normal at the resolved parameter, not
/// the chord normal.
pub fn label_anchor(
    source: Point,
    target: Point,
    assignment: CurveAssignment,
    params: AnchorParams,
) -> Point {
    let ctrl = control_point(source, target, assignment);

    let t = if params.from_source {
        geometry::t_at_arc_ratio(source, ctrl, target, params.ratio)
    } else {
        1.0 - geometry::t_at_arc_ratio(target, ctrl, source, params.ratio)
    };
    let t = (t + params.shift).clamp(0.0, 1.0);

    let point = geometry::bezier_point(source, ctrl, target, t);
    if params.offset == 0.0 {
        return point;
    }

    let tangent = geometry::bezier_tangent(source, ctrl, target, t);
    let len = (tangent.x * tangent.x + tangent.y * tangent.y).sqrt();
    if len == 0.0 {
        return point;
    }
    Point::new(
        point.x - tangent.y / len * params.offset,
        point.y + tangent.x / len * params.offset,
    )
}

/// Shift sign for an endpoint's label, chosen from the vertical direction
/// of travel so the two labels of a near-vertical edge move apart instead
/// of meeting in the middle.
pub fn shift_for(near: Point, far: Point) -> f64 {
    if far.y >= near.y { -LABEL_SHIFT } else { LABEL_SHIFT }
}
