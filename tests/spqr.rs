// SPQR view: initial all-collapsed drawing, explicit tree expansion with
// recursive re-collapse, and implicit-mode inlining with per-bicomponent
// singlenode dedup.

use tangle::algorithms::scheduler::DrawTask;
use tangle::layout::{
    BicomponentRow, EdgeRow, MemoryLayout, MetanodeEdgeRow, MetanodeRow, NodeRow,
    SpqrComponentRow,
};
use tangle::model::{BoundingBox, ClusterKind};
use tangle::{Session, SpqrMode, ViewConfig, ViewMode};

fn singlenode(id: &str, x: f64, y: f64, metanode: Option<&str>, bicomp: Option<&str>) -> NodeRow {
    NodeRow {
        id: id.to_owned(),
        label: None,
        component_rank: 1,
        x,
        y,
        i_x: None,
        i_y: None,
        w: 0.5,
        h: 0.5,
        forward: true,
        length: None,
        depth: None,
        gc_content: None,
        is_repeat: None,
        parent_cluster_id: None,
        parent_metanode_id: metanode.map(str::to_owned),
        parent_bicomponent_id: bicomp.map(str::to_owned),
    }
}

fn singleedge(source: &str, target: &str, metanode: Option<&str>, virt: bool) -> EdgeRow {
    EdgeRow {
        source_id: source.to_owned(),
        target_id: target.to_owned(),
        component_rank: 1,
        control_point_string: String::new(),
        control_point_count: 0,
        multiplicity: None,
        thickness: 0.5,
        is_outlier: 0,
        orientation: None,
        mean: None,
        stdev: None,
        parent_cluster_id: None,
        parent_metanode_id: metanode.map(str::to_owned),
        is_virtual: virt,
    }
}

fn metanode(
    id: &str,
    kind: ClusterKind,
    descendants: u64,
    corners: (f64, f64, f64, f64),
) -> MetanodeRow {
    MetanodeRow {
        metanode_id: id.to_owned(),
        scc_rank: 1,
        kind,
        parent_bicomponent_id_num: 1,
        descendant_metanode_count: descendants,
        node_count: 2,
        left: corners.0,
        bottom: corners.1,
        right: corners.2,
        top: corners.3,
        i_left: corners.0,
        i_bottom: corners.1,
        i_right: corners.2,
        i_top: corners.3,
    }
}

// One bicomponent whose SPQR tree is S1 -> {P1, S2}. The skeletons share
// contigs: b sits in both S1 and P1, c in both P1 and S2.
fn spqr_layout() -> MemoryLayout {
    let mut layout = MemoryLayout::new();
    layout.spqr_components.push(SpqrComponentRow {
        size_rank: 1,
        bbox: BoundingBox {
            width: 100.0,
            height: 100.0,
        },
        i_bbox: BoundingBox {
            width: 80.0,
            height: 80.0,
        },
        compressed_node_count: 3,
        compressed_edge_count: 2,
        ex_uncompressed_node_count: 7,
        ex_uncompressed_edge_count: 4,
        im_uncompressed_node_count: 5,
        im_uncompressed_edge_count: 3,
        bicomponent_count: 1,
    });
    layout.bicomponents.push(BicomponentRow {
        id_num: 1,
        scc_rank: 1,
        root_metanode_id: "S1".to_owned(),
        node_count: 4,
        left: 10.0,
        bottom: 10.0,
        right: 90.0,
        top: 90.0,
        i_left: 5.0,
        i_bottom: 5.0,
        i_right: 75.0,
        i_top: 75.0,
    });
    layout
        .metanodes
        .push(metanode("S1", ClusterKind::SeriesMetanode, 2, (20.0, 20.0, 80.0, 80.0)));
    layout
        .metanodes
        .push(metanode("P1", ClusterKind::ParallelMetanode, 0, (25.0, 25.0, 45.0, 45.0)));
    layout
        .metanodes
        .push(metanode("S2", ClusterKind::SeriesMetanode, 0, (55.0, 25.0, 75.0, 45.0)));
    layout.metanode_edges.push(MetanodeEdgeRow {
        source_metanode_id: "S1".to_owned(),
        target_metanode_id: "P1".to_owned(),
        control_point_string: "50 50 40 40".to_owned(),
        control_point_count: 2,
    });
    layout.metanode_edges.push(MetanodeEdgeRow {
        source_metanode_id: "S1".to_owned(),
        target_metanode_id: "S2".to_owned(),
        control_point_string: "50 50 60 40".to_owned(),
        control_point_count: 2,
    });
    for row in [
        singlenode("a", 30.0, 60.0, Some("S1"), Some("I1")),
        singlenode("b", 50.0, 60.0, Some("S1"), Some("I1")),
        singlenode("b", 30.0, 35.0, Some("P1"), Some("I1")),
        singlenode("c", 40.0, 35.0, Some("P1"), Some("I1")),
        singlenode("c", 60.0, 35.0, Some("S2"), Some("I1")),
        singlenode("d", 70.0, 35.0, Some("S2"), Some("I1")),
    ] {
        layout.singlenodes.push(row);
    }
    // A free contig outside the bicomponent, linked to it at the top level.
    layout.singlenodes.push(singlenode("f", 5.0, 90.0, None, None));
    layout.singleedges.push(singleedge("a", "b", Some("S1"), false));
    // Synthetic skeleton edge alongside the real one.
    layout.singleedges.push(singleedge("a", "b", Some("S1"), true));
    layout.singleedges.push(singleedge("f", "I1", None, false));
    layout.singleedges.push(singleedge("b", "c", Some("P1"), false));
    layout.singleedges.push(singleedge("c", "d", Some("S2"), true));
    layout
}

fn spqr_config(mode: SpqrMode) -> ViewConfig {
    ViewConfig {
        mode: ViewMode::Spqr,
        spqr_mode: mode,
        ..ViewConfig::default()
    }
}

fn draw(layout: &MemoryLayout, mode: SpqrMode) -> Session {
    let mut session = Session::new(ViewConfig::default());
    DrawTask::new(&mut session, layout, 1, spqr_config(mode))
        .unwrap()
        .run_to_completion()
        .unwrap();
    session
}

fn has_edge(session: &Session, source: &str, target: &str) -> bool {
    session
        .graph()
        .edges_iter()
        .any(|(_, e)| e.source == source && e.target == target)
}

#[test]
fn initial_spqr_draw_shows_collapsed_roots() {
    let layout = spqr_layout();
    let session = draw(&layout, SpqrMode::Explicit);
    let g = session.graph();

    let bicomp = g.cluster_by_id("I1").expect("bicomponent");
    assert_eq!(bicomp.kind, ClusterKind::Bicomponent);
    let root = g.cluster_by_id("S1").expect("root metanode");
    assert!(root.collapsed);
    assert_eq!(root.parent.as_deref(), Some("I1"));
    // Descendant metanodes are not drawn until the root is opened.
    assert!(g.cluster_by_id("P1").is_none());
    assert!(g.cluster_by_id("S2").is_none());

    // Skeleton nodes of the root render under suffixed ids and are
    // recorded on the metanode for later re-collapsing.
    assert!(g.node_by_id("a_S1").is_some());
    assert!(g.node_by_id("b_S1").is_some());
    assert_eq!(root.singlenode_ids, vec!["a_S1", "b_S1"]);
    assert!(has_edge(&session, "a_S1", "b_S1"));
    assert!(has_edge(&session, "f", "I1"));
}

#[test]
fn explicit_uncollapse_renders_the_next_tree_level() {
    let layout = spqr_layout();
    let mut session = draw(&layout, SpqrMode::Explicit);
    session.uncollapse_metanode(&layout, "S1").unwrap();

    let g = session.graph();
    assert!(!g.cluster_by_id("S1").unwrap().collapsed);
    // Both descendants exist as real compound nodes under the bicomponent.
    for id in ["P1", "S2"] {
        let mn = g.cluster_by_id(id).expect("descendant metanode");
        assert_eq!(mn.parent.as_deref(), Some("I1"));
    }
    // Tree edges from the opened metanode to its descendants.
    assert!(has_edge(&session, "S1", "P1"));
    assert!(has_edge(&session, "S1", "S2"));
    // Skeleton contents of the descendants, without dedup: the shared
    // contigs render once per metanode.
    for id in ["b_P1", "c_P1", "c_S2", "d_S2"] {
        assert!(g.node_by_id(id).is_some(), "{id} should be rendered");
    }
    assert!(has_edge(&session, "b_P1", "c_P1"));
    // The virtual skeleton edge renders in explicit mode.
    let virt = g
        .edges_iter()
        .find(|(_, e)| e.source == "c_S2" && e.target == "d_S2")
        .expect("virtual edge");
    assert!(virt.1.is_virtual);
    // The subtree is cached for re-collapsing.
    assert_eq!(
        g.cluster_by_id("S1").unwrap().descendants.as_deref(),
        Some(&["P1".to_owned(), "S2".to_owned()][..])
    );
}

#[test]
fn explicit_collapse_removes_the_rendered_subtree() {
    let layout = spqr_layout();
    let mut session = draw(&layout, SpqrMode::Explicit);
    let nodes_before = session.graph().node_count();
    let edges_before = session.graph().edge_count();

    session.uncollapse_metanode(&layout, "S1").unwrap();
    session.collapse_metanode("S1").unwrap();

    let g = session.graph();
    assert!(g.cluster_by_id("S1").unwrap().collapsed);
    assert!(g.cluster_by_id("P1").is_none());
    assert!(g.cluster_by_id("S2").is_none());
    for id in ["b_P1", "c_P1", "c_S2", "d_S2"] {
        assert!(g.node_by_id(id).is_none(), "{id} should be removed");
    }
    // Removing skeleton nodes takes their incident edges with them; the
    // graph is back to its initial population.
    assert_eq!(g.node_count(), nodes_before);
    assert_eq!(g.edge_count(), edges_before);
    assert!(has_edge(&session, "a_S1", "b_S1"));
}

#[test]
fn implicit_draw_uses_the_implicit_bounding_box() {
    let layout = spqr_layout();
    let session = draw(&layout, SpqrMode::Implicit);
    assert_eq!(
        session.bounding_box(),
        BoundingBox {
            width: 80.0,
            height: 80.0
        }
    );
}

#[test]
fn implicit_draw_records_virtual_edges_on_their_metanode() {
    let layout = spqr_layout();
    let session = draw(&layout, SpqrMode::Implicit);
    let g = session.graph();
    // The root metanode is visible, so its virtual skeleton edge renders
    // and is remembered for deletion at expansion time.
    assert_eq!(g.cluster_by_id("S1").unwrap().virtual_edge_ids.len(), 1);
    let skeleton_edges = g
        .edges_iter()
        .filter(|(_, e)| e.source == "a_S1" && e.target == "b_S1")
        .count();
    assert_eq!(skeleton_edges, 2);
}

#[test]
fn implicit_uncollapse_inlines_and_dedups_singlenodes() {
    let layout = spqr_layout();
    let mut session = draw(&layout, SpqrMode::Implicit);
    session.uncollapse_metanode(&layout, "S1").unwrap();

    let g = session.graph();
    // The opened metanode dissolves instead of staying as a compound node.
    assert!(g.cluster_by_id("S1").is_none());
    // Leaf descendants are never materialized in implicit mode.
    assert!(g.cluster_by_id("P1").is_none());
    assert!(g.cluster_by_id("S2").is_none());

    // b was already visible in this bicomponent (as b_S1), so P1's copy
    // is not drawn again; c renders once (under P1) and S2 reuses it.
    assert!(g.node_by_id("b_P1").is_none());
    assert!(g.node_by_id("c_P1").is_some());
    assert!(g.node_by_id("c_S2").is_none());
    assert!(g.node_by_id("d_S2").is_some());
    // The skeleton edge remaps onto the first-seen renders.
    assert!(has_edge(&session, "b_S1", "c_P1"));

    // The virtual edge's parent metanode is not visible, so the edge is
    // dropped entirely; the root's own virtual edge was deleted along
    // with the root.
    assert!(!has_edge(&session, "c_S2", "d_S2"));
    assert!(session.graph().edges_iter().all(|(_, e)| !e.is_virtual));
    let skeleton_edges = g
        .edges_iter()
        .filter(|(_, e)| e.source == "a_S1" && e.target == "b_S1")
        .count();
    assert_eq!(skeleton_edges, 1);
}
