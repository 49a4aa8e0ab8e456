use moray_core::command::{Command, LabelMode, Request};
use moray_core::model::{EdgeKey, TopologySnapshot};
use moray_core::Theme;
use moray_render::anchor::{self, AnchorParams, LABEL_ARC_RATIO};
use moray_render::geometry::Point;
use moray_render::selection::Selection;
use moray_render::{Canvas, HeadlessCanvas, TopologyView};
use serde_json::json;

fn snapshot(doc: serde_json::Value) -> TopologySnapshot {
    serde_json::from_value(doc).expect("snapshot parses")
}

fn fabric() -> TopologySnapshot {
    snapshot(json!({
        "nodes": [
            {"id": "a", "tier": 0},
            {"id": "b", "tier": 0},
            {"id": "c", "tier": 1}
        ],
        "edges": [
            {"source": "a", "target": "c"},
            {"source": "b", "target": "c"},
            {"source": "a", "target": "c"}
        ]
    }))
}

fn key(source: &str, target: &str, ordinal: usize) -> EdgeKey {
    EdgeKey {
        source: source.to_string(),
        target: target.to_string(),
        source_interface: None,
        target_interface: None,
        ordinal,
    }
}

fn view_with(snapshot: &TopologySnapshot) -> TopologyView<HeadlessCanvas> {
    let mut view = TopologyView::new(HeadlessCanvas::new());
    view.render("default", snapshot);
    view
}

#[test]
fn tiered_fabric_layout_and_curvature() {
    let view = view_with(&fabric());

    let pos = |id: &str| view.surface().node_position(id).unwrap();
    assert_eq!((pos("a").x, pos("a").y), (-120.0, 0.0));
    assert_eq!((pos("b").x, pos("b").y), (120.0, 0.0));
    assert_eq!((pos("c").x, pos("c").y), (0.0, 260.0));

    let distance = |k: &EdgeKey| {
        view.edges()
            .iter()
            .find(|e| &e.resolved.key == k)
            .unwrap()
            .assignment
            .distance
    };
    assert_eq!(distance(&key("a", "c", 0)), 30.0);
    assert_eq!(distance(&key("a", "c", 1)), -30.0);
    assert_eq!(distance(&key("b", "c", 0)), 30.0);
}

#[test]
fn render_is_idempotent_for_the_same_snapshot() {
    let snap = fabric();
    let mut view = view_with(&snap);

    let positions_before: Vec<_> = ["a", "b", "c"]
        .iter()
        .map(|id| view.surface().node_position(id).unwrap())
        .collect();
    let assignments_before: Vec<_> = view.edges().iter().map(|e| e.assignment).collect();

    view.render("default", &snap);

    let positions_after: Vec<_> = ["a", "b", "c"]
        .iter()
        .map(|id| view.surface().node_position(id).unwrap())
        .collect();
    let assignments_after: Vec<_> = view.edges().iter().map(|e| e.assignment).collect();

    assert_eq!(positions_before, positions_after);
    assert_eq!(assignments_before, assignments_after);
}

#[test]
fn same_namespace_update_preserves_dragged_positions() {
    let snap = fabric();
    let mut view = view_with(&snap);

    view.surface_mut()
        .set_node_position("a", Point::new(500.0, -40.0));
    view.render("default", &snap);
    let p = view.surface().node_position("a").unwrap();
    assert_eq!((p.x, p.y), (500.0, -40.0), "drag survives incremental render");

    view.render("other", &snap);
    let p = view.surface().node_position("a").unwrap();
    assert_eq!((p.x, p.y), (-120.0, 0.0), "namespace switch re-runs layout");
}

#[test]
fn malformed_edges_are_skipped_silently() {
    let view = view_with(&snapshot(json!({
        "nodes": [{"id": "a"}, {"id": "b"}],
        "edges": [
            {"source": "a", "target": "b"},
            {"source": "a"},
            {"source": "a", "target": "ghost"}
        ]
    })));
    assert_eq!(view.edges().len(), 1);
    assert_eq!(view.surface().edge_count(), 1);
}

#[test]
fn selection_is_mutually_exclusive() {
    let mut view = view_with(&fabric());
    assert_eq!(view.selection(), &Selection::Idle);

    view.tap_node("a");
    assert_eq!(view.selection(), &Selection::Node("a".to_string()));
    assert!(view.surface().classes("a").contains(&"highlighted".to_string()));
    // Both a->c edges touch the node.
    assert!(
        view.surface()
            .classes(&key("a", "c", 0).element_id())
            .contains(&"highlighted".to_string())
    );
    assert!(
        view.surface()
            .classes(&key("a", "c", 1).element_id())
            .contains(&"highlighted".to_string())
    );
    assert!(view.surface().classes("b").is_empty());

    let edge = key("b", "c", 0);
    view.tap_edge(&edge);
    assert_eq!(view.selection(), &Selection::Edge(edge.clone()));
    assert!(view.surface().classes("a").is_empty(), "previous highlight cleared");
    assert!(view.surface().classes("b").contains(&"highlighted".to_string()));
    assert!(view.surface().classes("c").contains(&"highlighted".to_string()));
    assert!(
        view.surface()
            .classes(&edge.element_id())
            .contains(&"highlighted".to_string())
    );

    view.tap_background();
    assert_eq!(view.selection(), &Selection::Idle);
    for element in ["a", "b", "c"] {
        assert!(view.surface().classes(element).is_empty());
    }
}

#[test]
fn selection_survives_same_namespace_rerender() {
    let snap = fabric();
    let mut view = view_with(&snap);

    let edge = key("a", "c", 0);
    view.tap_edge(&edge);
    view.render("default", &snap);

    // Edge elements are recreated by the update; the selected one must be
    // highlighted again, not silently dropped while the tracker still
    // reports it selected.
    assert_eq!(view.selection(), &Selection::Edge(edge.clone()));
    assert!(
        view.surface()
            .classes(&edge.element_id())
            .contains(&"highlighted".to_string()),
        "recreated edge keeps its highlight"
    );
    assert!(view.surface().classes("a").contains(&"highlighted".to_string()));
    assert!(view.surface().classes("c").contains(&"highlighted".to_string()));

    // The selected edge leaves the next snapshot: back to idle with nothing
    // highlighted.
    view.render(
        "default",
        &snapshot(json!({
            "nodes": [
                {"id": "a", "tier": 0},
                {"id": "b", "tier": 0},
                {"id": "c", "tier": 1}
            ],
            "edges": [{"source": "b", "target": "c"}]
        })),
    );
    assert_eq!(view.selection(), &Selection::Idle);
    for element in ["a", "b", "c"] {
        assert!(view.surface().classes(element).is_empty());
    }

    // A selected node survives too, with its touching edges re-highlighted.
    view.tap_node("a");
    view.render("default", &snap);
    assert_eq!(view.selection(), &Selection::Node("a".to_string()));
    assert!(
        view.surface()
            .classes(&key("a", "c", 0).element_id())
            .contains(&"highlighted".to_string()),
        "touching edges are re-highlighted"
    );
    view.take_requests();
}

#[test]
fn taps_emit_outward_requests() {
    let mut view = view_with(&snapshot(json!({
        "nodes": [
            {"id": "a", "raw": {"address": "10.0.0.1"}},
            {"id": "b"}
        ],
        "edges": [
            {"source": "a", "target": "b", "state": "up", "raw": {"speed": "10G"}}
        ]
    })));

    view.tap_node("a");
    view.double_click_node("a");
    view.tap_edge(&key("a", "b", 0));
    let requests = view.take_requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0], Request::OpenResource(json!({"address": "10.0.0.1"})));
    assert_eq!(requests[1], Request::SshTopoNode(json!({"address": "10.0.0.1"})));
    let Request::OpenResource(detail) = &requests[2] else {
        panic!("expected edge detail");
    };
    assert_eq!(detail["speed"], "10G");
    assert_eq!(detail["state"], "up");

    assert!(view.take_requests().is_empty(), "requests drain once");
}

fn labelled() -> TopologySnapshot {
    snapshot(json!({
        "nodes": [{"id": "a", "tier": 0}, {"id": "b", "tier": 1}],
        "edges": [
            {
                "source": "a",
                "target": "b",
                "sourceInterface": "GigabitEthernet0/1",
                "targetInterface": "Ethernet12"
            },
            {"source": "a", "target": "b"}
        ]
    }))
}

#[test]
fn label_mode_drives_visibility() {
    let mut view = view_with(&labelled());
    assert_eq!(view.label_mode(), LabelMode::Select);
    assert_eq!(view.surface().overlay_labels().len(), 2, "one per named endpoint");

    let visible = |view: &TopologyView<HeadlessCanvas>| {
        view.surface()
            .overlay_labels()
            .values()
            .filter(|l| l.visible)
            .count()
    };

    // Select mode, nothing selected: hidden.
    assert_eq!(visible(&view), 0);

    // Selecting the owning edge shows its labels.
    let owning = EdgeKey {
        source: "a".to_string(),
        target: "b".to_string(),
        source_interface: Some("GigabitEthernet0/1".to_string()),
        target_interface: Some("Ethernet12".to_string()),
        ordinal: 0,
    };
    view.tap_edge(&owning);
    assert_eq!(visible(&view), 2);

    // Selecting a touching node also shows them.
    view.tap_node("a");
    assert_eq!(visible(&view), 2);

    view.tap_background();
    assert_eq!(visible(&view), 0);

    view.set_label_mode(LabelMode::Show);
    assert_eq!(visible(&view), 2, "show mode ignores selection");

    view.set_label_mode(LabelMode::Hide);
    view.tap_edge(&owning);
    assert_eq!(visible(&view), 0, "hide mode ignores selection");
}

#[test]
fn labels_shorten_interface_names() {
    let view = view_with(&labelled());
    let texts: Vec<&str> = view
        .surface()
        .overlay_labels()
        .values()
        .map(|l| l.text.as_str())
        .collect();
    assert!(texts.contains(&"GE0/1"));
    assert!(texts.contains(&"Eth12"));
}

#[test]
fn labels_track_the_viewport() {
    let mut view = view_with(&labelled());
    view.surface_mut()
        .set_viewport(Point::new(13.0, -7.0), 2.0);
    view.viewport_changed();

    let source = view.surface().node_position("a").unwrap();
    let target = view.surface().node_position("b").unwrap();
    let edge = view
        .edges()
        .iter()
        .find(|e| e.resolved.source_label.is_some())
        .unwrap()
        .clone();

    let expected = anchor::label_anchor(
        source,
        target,
        edge.assignment,
        AnchorParams {
            ratio: LABEL_ARC_RATIO,
            offset: 0.0,
            shift: anchor::shift_for(source, target),
            from_source: true,
        },
    );
    let label = view
        .surface()
        .overlay_labels()
        .values()
        .find(|l| l.text == "GE0/1")
        .unwrap();
    assert!((label.x - (expected.x * 2.0 + 13.0)).abs() < 1e-9);
    assert!((label.y - (expected.y * 2.0 - 7.0)).abs() < 1e-9);
}

#[test]
fn fonts_scale_with_zoom_within_clamps() {
    let mut view = view_with(&labelled());

    view.surface_mut().set_viewport(Point::default(), 3.0);
    view.viewport_changed();
    for label in view.surface().overlay_labels().values() {
        assert_eq!(label.font_size, 20.0, "edge label font caps at 20");
    }
    assert_eq!(view.surface().style("a", "font-size").as_deref(), Some("24"));

    view.surface_mut().set_viewport(Point::default(), 0.3);
    view.viewport_changed();
    for label in view.surface().overlay_labels().values() {
        assert_eq!(label.font_size, 6.0, "edge label font floors at 6");
    }
    assert_eq!(view.surface().style("a", "font-size").as_deref(), Some("6"));
}

#[test]
fn full_rebuild_tears_down_floating_labels() {
    let mut view = view_with(&labelled());
    assert_eq!(view.surface().overlay_labels().len(), 2);

    view.tap_node("a");
    view.render(
        "other",
        &snapshot(json!({
            "nodes": [{"id": "x"}],
            "edges": []
        })),
    );
    assert_eq!(view.surface().overlay_labels().len(), 0, "no leaked handles");
    assert_eq!(view.selection(), &Selection::Idle, "selection dies with the namespace");
    assert_eq!(view.surface().node_count(), 1);
}

#[test]
fn edges_are_recolored_by_state_and_theme() {
    let mut view = view_with(&snapshot(json!({
        "nodes": [{"id": "a"}, {"id": "b"}],
        "edges": [
            {"source": "a", "target": "b", "state": "up"},
            {"source": "a", "target": "b", "state": "down"},
            {"source": "a", "target": "b"}
        ]
    })));

    let light = Theme::light();
    let color = |view: &TopologyView<HeadlessCanvas>, ordinal: usize| {
        view.surface()
            .style(&key("a", "b", ordinal).element_id(), "line-color")
            .unwrap()
    };
    assert_eq!(color(&view, 0), light.link_up_color);
    assert_eq!(color(&view, 1), light.link_down_color);
    assert_eq!(color(&view, 2), light.link_neutral_color);

    view.set_theme(Theme::dark());
    let dark = Theme::dark();
    assert_eq!(color(&view, 0), dark.link_up_color);
    assert_eq!(color(&view, 1), dark.link_down_color);
    assert_eq!(color(&view, 2), dark.link_neutral_color);
}

#[test]
fn commands_dispatch_exhaustively() {
    let mut view = TopologyView::new(HeadlessCanvas::new());
    view.handle(Command::Render {
        namespace: "default".to_string(),
        snapshot: labelled(),
    });
    assert_eq!(view.surface().node_count(), 2);

    view.handle(Command::SetLabelMode(LabelMode::Show));
    assert_eq!(view.label_mode(), LabelMode::Show);

    view.handle(Command::SetTheme(Theme::dark()));
    assert_eq!(view.theme(), &Theme::dark());
}
