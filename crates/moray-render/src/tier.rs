//! Initial node placement from tier membership.

use crate::geometry::Point;
use moray_core::model::GraphNode;

pub const HORIZONTAL_SPACING: f64 = 240.0;
pub const VERTICAL_SPACING: f64 = 260.0;

/// Assigns `(x, y)` to every node from its tier and sibling order.
///
/// Distinct tiers are sorted ascending and become rows spaced
/// [`VERTICAL_SPACING`] apart; within a row, nodes keep their snapshot order
/// and the row is centered around x = 0. Deterministic: the same node list
/// always yields the same positions.
pub fn assign_positions(nodes: &[GraphNode]) -> Vec<(String, Point)> {
    let mut tiers: Vec<i64> = nodes.iter().map(|n| n.tier).collect();
    tiers.sort_unstable();
    tiers.dedup();

    let mut out = Vec::with_capacity(nodes.len());
    for (row, tier) in tiers.iter().enumerate() {
        let members: Vec<&GraphNode> = nodes.iter().filter(|n| n.tier == *tier).collect();
        let count = members.len();
        let y = row as f64 * VERTICAL_SPACING;
        for (idx, node) in members.iter().enumerate() {
            let x = idx as f64 * HORIZONTAL_SPACING
                - (count.saturating_sub(1)) as f64 * HORIZONTAL_SPACING / 2.0;
            out.push((node.id.clone(), Point::new(x, y)));
        }
    }
    out
}
