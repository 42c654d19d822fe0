use serde::Serialize;
use serde_json::Value;

use crate::model::{ClusterKind, CurveDescriptor, NodeShape, Outlier};
use crate::ElementGraph;

// Serializes the live element graph for export or host-side inspection.
// Collapse bookkeeping (edge maps, interior lists, SPQR caches) stays
// internal; only what a render engine needs to redraw the view goes out.
pub fn to_json_impl(g: &ElementGraph) -> Value {
    #[derive(Serialize)]
    struct NodeSer<'a> {
        id: &'a str,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        shape: NodeShape,
        parent: Option<&'a str>,
        hidden: bool,
    }
    #[derive(Serialize)]
    struct EdgeSer<'a> {
        id: u32,
        source: &'a str,
        target: &'a str,
        curve: &'a CurveDescriptor,
        thickness: f64,
        outlier: Option<Outlier>,
        hidden: bool,
        culled: bool,
    }
    #[derive(Serialize)]
    struct ClusterSer<'a> {
        id: &'a str,
        kind: ClusterKind,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        parent: Option<&'a str>,
        collapsed: bool,
    }

    let nodes: Vec<NodeSer> = g
        .nodes_iter()
        .map(|(_, n)| NodeSer {
            id: &n.id,
            x: n.pos.x,
            y: n.pos.y,
            w: n.width,
            h: n.height,
            shape: n.shape,
            parent: n.parent.as_deref(),
            hidden: n.hidden,
        })
        .collect();
    let edges: Vec<EdgeSer> = g
        .edges_iter()
        .map(|(ix, e)| EdgeSer {
            id: ix,
            source: &e.source,
            target: &e.target,
            curve: e.effective_curve(),
            thickness: e.thickness,
            outlier: e.outlier,
            hidden: e.hidden,
            culled: e.culled,
        })
        .collect();
    let clusters: Vec<ClusterSer> = g
        .clusters_iter()
        .map(|(_, c)| {
            let (w, h) = if c.collapsed {
                (c.collapsed_width, c.collapsed_height)
            } else {
                (c.width, c.height)
            };
            ClusterSer {
                id: &c.id,
                kind: c.kind,
                x: c.pos.x,
                y: c.pos.y,
                w,
                h,
                parent: c.parent.as_deref(),
                collapsed: c.collapsed,
            }
        })
        .collect();

    serde_json::json!({
        "version": 1,
        "nodes": nodes,
        "edges": edges,
        "clusters": clusters,
    })
}
