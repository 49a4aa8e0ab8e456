//! Quadratic Bézier evaluation and arc-length helpers.
//!
//! The curve parameter `t` is not proportional to distance travelled along a
//! bent curve, so label anchoring works in true arc length: a polyline
//! approximation of the length plus a bisection from ratio back to `t`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Sample count for the polyline arc-length approximation. Fixed
/// precision/performance trade-off.
pub const ARC_SAMPLES: usize = 16;

/// Bisection depth for [`t_at_arc_ratio`]. Arc length is monotonic in `t`
/// for a non-self-intersecting quadratic, so 10 halvings give ~1e-3
/// parameter resolution.
const ARC_RATIO_ITERATIONS: usize = 10;

/// Evaluates the quadratic Bézier `(p0, p1, p2)` at `t`.
pub fn bezier_point(p0: Point, p1: Point, p2: Point, t: f64) -> Point {
    let u = 1.0 - t;
    Point {
        x: u * u * p0.x + 2.0 * u * t * p1.x + t * t * p2.x,
        y: u * u * p0.y + 2.0 * u * t * p1.y + t * t * p2.y,
    }
}

/// First derivative of the quadratic Bézier at `t`.
pub fn bezier_tangent(p0: Point, p1: Point, p2: Point, t: f64) -> Point {
    let u = 1.0 - t;
    Point {
        x: 2.0 * u * (p1.x - p0.x) + 2.0 * t * (p2.x - p1.x),
        y: 2.0 * u * (p1.y - p0.y) + 2.0 * t * (p2.y - p1.y),
    }
}

/// Approximates the arc length from parameter 0 to `t` by summing segment
/// lengths between `steps` evenly spaced samples.
///
/// Always an under-estimate; converges as `steps` grows.
pub fn approx_arc_length(p0: Point, p1: Point, p2: Point, t: f64, steps: usize) -> f64 {
    if steps == 0 || t <= 0.0 {
        return 0.0;
    }
    let mut length = 0.0;
    let mut prev = p0;
    for i in 1..=steps {
        let sample_t = t * (i as f64) / (steps as f64);
        let p = bezier_point(p0, p1, p2, sample_t);
        length += prev.distance(p);
        prev = p;
    }
    length
}

/// Finds `t` such that the arc length from 0 to `t` is `ratio` of the whole
/// curve's length.
///
/// `ratio <= 0` returns 0 exactly and `ratio >= 1` returns 1 exactly, with
/// no search. A degenerate (zero-length) curve reports 0.
pub fn t_at_arc_ratio(p0: Point, p1: Point, p2: Point, ratio: f64) -> f64 {
    if ratio <= 0.0 {
        return 0.0;
    }
    if ratio >= 1.0 {
        return 1.0;
    }

    let total = approx_arc_length(p0, p1, p2, 1.0, ARC_SAMPLES);
    if total <= 0.0 {
        return 0.0;
    }
    let target = ratio * total;

    let mut lo = 0.0;
    let mut hi = 1.0;
    for _ in 0..ARC_RATIO_ITERATIONS {
        let mid = (lo + hi) / 2.0;
        if approx_arc_length(p0, p1, p2, mid, ARC_SAMPLES) < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) / 2.0
}
