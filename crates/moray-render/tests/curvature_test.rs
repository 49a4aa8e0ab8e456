use moray_core::model::TopologySnapshot;
use moray_render::curvature::{BASE_CURVE_DISTANCE, NodeMeta, distribute};
use moray_render::geometry::Point;
use rustc_hash::FxHashMap;
use serde_json::json;

fn snapshot(doc: serde_json::Value) -> TopologySnapshot {
    serde_json::from_value(doc).expect("snapshot parses")
}

fn meta(entries: &[(&str, i64, f64, f64)]) -> FxHashMap<String, NodeMeta> {
    entries
        .iter()
        .map(|(id, tier, x, y)| {
            (
                id.to_string(),
                NodeMeta {
                    tier: *tier,
                    position: Point::new(*x, *y),
                },
            )
        })
        .collect()
}

fn parallel_edges(n: usize) -> TopologySnapshot {
    let edges: Vec<_> = (0..n)
        .map(|_| json!({"source": "a", "target": "b"}))
        .collect();
    snapshot(json!({
        "nodes": [{"id": "a", "tier": 0}, {"id": "b", "tier": 0}],
        "edges": edges
    }))
}

#[test]
fn group_distances_alternate_and_grow() {
    for n in 1..=6 {
        let snap = parallel_edges(n);
        let (resolved, _) = snap.resolve_edges();
        let nodes = meta(&[("a", 0, 0.0, 0.0), ("b", 0, 240.0, 0.0)]);
        let mut cache = FxHashMap::default();
        let out = distribute(&resolved, &nodes, &mut cache);

        let mut magnitudes: Vec<f64> = out.iter().map(|e| e.assignment.distance.abs()).collect();
        magnitudes.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let expected: Vec<f64> = (0..n)
            .map(|i| ((i / 2) + 1) as f64 * BASE_CURVE_DISTANCE)
            .collect();
        assert_eq!(magnitudes, expected, "magnitude multiset for n = {n}");

        for (i, edge) in out.iter().enumerate() {
            assert_eq!(edge.pair_index, i);
            let expected_sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            assert_eq!(
                edge.assignment.distance.signum(),
                expected_sign,
                "sign alternates within the group (index {i})"
            );
            assert_eq!(edge.assignment.weight, 0.5);
        }
    }
}

#[test]
fn base_unit_grows_with_cross_tier_horizontal_distance() {
    let cases = [
        (30.0, 30.0),
        (75.0, 35.0),
        (150.0, 40.0),
        (300.0, 50.0),
    ];
    for (dx, expected) in cases {
        let snap = parallel_edges(1);
        let (resolved, _) = snap.resolve_edges();
        let nodes = meta(&[("a", 0, 0.0, 0.0), ("b", 1, dx, 260.0)]);
        let mut cache = FxHashMap::default();
        let out = distribute(&resolved, &nodes, &mut cache);
        assert_eq!(
            out[0].assignment.distance, expected,
            "dx {dx} selects base {expected}"
        );
    }
}

#[test]
fn same_tier_edges_keep_default_base_regardless_of_distance() {
    let snap = parallel_edges(1);
    let (resolved, _) = snap.resolve_edges();
    let nodes = meta(&[("a", 1, 0.0, 0.0), ("b", 1, 500.0, 0.0)]);
    let mut cache = FxHashMap::default();
    let out = distribute(&resolved, &nodes, &mut cache);
    assert_eq!(out[0].assignment.distance, BASE_CURVE_DISTANCE);
}

#[test]
fn cross_tier_sign_flips_with_horizontal_direction() {
    let snap = parallel_edges(2);
    let (resolved, _) = snap.resolve_edges();

    // Target to the right: even index bows positive.
    let rightward = meta(&[("a", 0, -120.0, 0.0), ("b", 1, 120.0, 260.0)]);
    let mut cache = FxHashMap::default();
    let out = distribute(&resolved, &rightward, &mut cache);
    assert!(out[0].assignment.distance > 0.0);
    assert!(out[1].assignment.distance < 0.0);

    // Target to the left: the whole group flips.
    let leftward = meta(&[("a", 0, 120.0, 0.0), ("b", 1, -120.0, 260.0)]);
    let mut cache = FxHashMap::default();
    let out = distribute(&resolved, &leftward, &mut cache);
    assert!(out[0].assignment.distance < 0.0);
    assert!(out[1].assignment.distance > 0.0);
}

#[test]
fn cached_assignments_survive_reordering() {
    let snap = parallel_edges(2);
    let (resolved, _) = snap.resolve_edges();
    let nodes = meta(&[("a", 0, 0.0, 0.0), ("b", 0, 240.0, 0.0)]);
    let mut cache = FxHashMap::default();
    let first = distribute(&resolved, &nodes, &mut cache);

    // A third parallel edge appears; the two existing edges keep their
    // assignments verbatim.
    let snap = parallel_edges(3);
    let (resolved, _) = snap.resolve_edges();
    let second = distribute(&resolved, &nodes, &mut cache);

    assert_eq!(second[0].assignment, first[0].assignment);
    assert_eq!(second[1].assignment, first[1].assignment);
    assert_eq!(second[2].assignment.distance.abs(), 2.0 * BASE_CURVE_DISTANCE);
}

#[test]
fn distribute_is_deterministic_for_identical_input() {
    let snap = parallel_edges(4);
    let (resolved, _) = snap.resolve_edges();
    let nodes = meta(&[("a", 0, 0.0, 0.0), ("b", 0, 240.0, 0.0)]);

    let mut cache = FxHashMap::default();
    let first = distribute(&resolved, &nodes, &mut cache);
    let second = distribute(&resolved, &nodes, &mut cache);
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.assignment, b.assignment);
        assert_eq!(a.pair_index, b.pair_index);
    }
}
