//! Per-edge control-point assignment that fans parallel links apart.

use crate::geometry::Point;
use indexmap::IndexMap;
use moray_core::model::{EdgeKey, ResolvedEdge};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Control-point distance applied when the endpoints share a tier or sit
/// close together horizontally.
pub const BASE_CURVE_DISTANCE: f64 = 30.0;

/// Signed perpendicular offset (`distance`) and position along the chord
/// (`weight`) of an edge's Bézier control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveAssignment {
    pub distance: f64,
    pub weight: f64,
}

impl Default for CurveAssignment {
    fn default() -> Self {
        Self {
            distance: 0.0,
            weight: 0.5,
        }
    }
}

/// Tier and current position of a node, as needed for base-unit selection.
#[derive(Debug, Clone, Copy)]
pub struct NodeMeta {
    pub tier: i64,
    pub position: Point,
}

/// One distributed edge: its identity, position within its pair group, and
/// curve assignment.
#[derive(Debug, Clone)]
pub struct DistributedEdge {
    pub key: EdgeKey,
    pub pair_index: usize,
    pub assignment: CurveAssignment,
}

fn base_unit(source: NodeMeta, target: NodeMeta) -> f64 {
    if source.tier == target.tier {
        return BASE_CURVE_DISTANCE;
    }
    let dx = (target.position.x - source.position.x).abs();
    if dx > 200.0 {
        50.0
    } else if dx > 100.0 {
        40.0
    } else if dx > 50.0 {
        35.0
    } else {
        BASE_CURVE_DISTANCE
    }
}

/// Assigns a [`CurveAssignment`] to every edge of one snapshot.
///
/// Edges are grouped by their direction-sensitive pair key in encounter
/// order; within a group, signs alternate and magnitudes grow as
/// `ceil((index + 1) / 2)` base units, so a group of N edges carries the
/// distance multiset `{1, 1, 2, 2, 3, ...} x base`. Cross-tier edges flip
/// sign with the horizontal direction of travel so curves bow away from the
/// direct line regardless of left/right orientation.
///
/// `cache` carries assignments across incremental updates: a key already
/// present keeps its assignment verbatim so live geometry does not jitter.
/// The pair index is always recomputed from the current snapshot.
pub fn distribute(
    edges: &[ResolvedEdge],
    nodes: &FxHashMap<String, NodeMeta>,
    cache: &mut FxHashMap<EdgeKey, CurveAssignment>,
) -> Vec<DistributedEdge> {
    let mut group_sizes: IndexMap<String, usize> = IndexMap::new();
    let mut out = Vec::with_capacity(edges.len());

    for edge in edges {
        let counter = group_sizes.entry(edge.key.pair_key()).or_insert(0);
        let pair_index = *counter;
        *counter += 1;

        let assignment = match cache.get(&edge.key) {
            Some(existing) => *existing,
            None => {
                let fresh = assign(edge, pair_index, nodes);
                cache.insert(edge.key.clone(), fresh);
                fresh
            }
        };

        out.push(DistributedEdge {
            key: edge.key.clone(),
            pair_index,
            assignment,
        });
    }

    out
}

fn assign(
    edge: &ResolvedEdge,
    pair_index: usize,
    nodes: &FxHashMap<String, NodeMeta>,
) -> CurveAssignment {
    let (Some(source), Some(target)) = (nodes.get(&edge.key.source), nodes.get(&edge.key.target))
    else {
        return CurveAssignment::default();
    };

    let base = base_unit(*source, *target);
    let magnitude = ((pair_index / 2) + 1) as f64 * base;
    let mut sign = if pair_index % 2 == 0 { 1.0 } else { -1.0 };
    if source.tier != target.tier && target.position.x < source.position.x {
        sign = -sign;
    }

    CurveAssignment {
        distance: sign * magnitude,
        weight: 0.5,
    }
}
