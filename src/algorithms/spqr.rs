// SPQR-tree expansion. Each biconnected component roots one tree of
// series/parallel/rigid metanodes; opening a metanode pulls its immediate
// descendants (and their skeleton contents) out of the layout source.
// Explicit mode materializes descendants as nested compound nodes;
// implicit mode inlines their skeleton elements and dissolves the opened
// metanode entirely.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::layout::LayoutSource;
use crate::model::Point;
use crate::session::{Session, SpqrMode};

pub(crate) fn uncollapse_metanode_impl<S: LayoutSource + ?Sized>(
    session: &mut Session,
    source: &S,
    metanode_id: &str,
) -> Result<()> {
    let explicit = session.config.spqr_mode == SpqrMode::Explicit;
    let (collapsed, mn_pos) = {
        let mn = session
            .graph
            .cluster_by_id(metanode_id)
            .ok_or_else(|| Error::UnknownElement {
                id: metanode_id.to_owned(),
            })?;
        (mn.collapsed, mn.pos)
    };
    if explicit && !collapsed {
        return Ok(());
    }

    let outgoing = source.metanode_edges_from(metanode_id)?;
    let descendant_ids: Vec<String> = outgoing
        .iter()
        .map(|e| e.target_metanode_id.clone())
        .collect();
    // Cache the discovered subtree for later re-collapsing.
    if let Some(mn) = session.graph.cluster_by_id_mut(metanode_id) {
        if mn.descendants.is_none() {
            mn.descendants = Some(descendant_ids.clone());
        }
    }
    let descendant_rows = source.metanodes_by_id(&descendant_ids)?;
    let singlenodes = source.singlenodes_of(&descendant_ids)?;
    let singleedges = source.singleedges_of(&descendant_ids)?;
    debug!(
        metanode = metanode_id,
        descendants = descendant_rows.len(),
        singlenodes = singlenodes.len(),
        "expanding metanode"
    );

    session.graph.begin_batch();
    // Descendant centers seed the endpoint positions for the tree edges
    // below this metanode.
    let mut positions: HashMap<String, Point> = HashMap::new();
    positions.insert(metanode_id.to_owned(), mn_pos);
    for row in &descendant_rows {
        // Implicit mode only materializes descendants that branch further;
        // leaves inline straight into the view.
        if explicit || row.descendant_metanode_count > 0 {
            let (id, pos) = session.render_metanode(row)?;
            positions.insert(id, pos);
        }
    }
    if explicit {
        for row in &outgoing {
            session.render_metanode_edge(row, &positions)?;
        }
    }

    // Skeleton nodes. In implicit mode a singlenode already visible in
    // this biconnected component is not drawn again; skeleton edges remap
    // onto the first-seen render instead.
    let mut remap: HashMap<String, String> = HashMap::new();
    for row in &singlenodes {
        if !explicit {
            if let Some(bid) = &row.parent_bicomponent_id {
                let visible = session.bicomp_visible.get(bid);
                let seen = visible.and_then(|ids| {
                    ids.iter()
                        .find(|v| v.split('_').next() == Some(row.id.as_str()))
                        .cloned()
                });
                if let Some(visible_id) = seen {
                    remap.insert(row.id.clone(), visible_id);
                    continue;
                }
            }
        }
        let display_id = match &row.parent_metanode_id {
            Some(mn) => format!("{}_{}", row.id, mn),
            None => row.id.clone(),
        };
        session.render_node(row, &display_id)?;
    }
    for row in &singleedges {
        session.render_edge(row, &remap)?;
    }

    if explicit {
        if let Some(mn) = session.graph.cluster_by_id_mut(metanode_id) {
            mn.collapsed = false;
        }
    } else {
        // Inlining replaces nesting: the opened metanode and its recorded
        // virtual skeleton edges disappear from the view.
        let virtual_edges = session
            .graph
            .cluster_by_id(metanode_id)
            .map(|mn| mn.virtual_edge_ids.clone())
            .unwrap_or_default();
        for eix in virtual_edges {
            session.graph.remove_edge(eix);
        }
        session.graph.remove_cluster(metanode_id);
    }
    session.graph.end_batch();
    Ok(())
}

// Recursively removes the rendered subtree below a metanode: descendants
// with open subtrees of their own collapse first, then each descendant's
// skeleton nodes (incident edges go with them) and the descendant itself.
// Only meaningful in explicit mode; implicit mode never keeps descendant
// compound nodes to collapse.
pub(crate) fn collapse_metanode_impl(session: &mut Session, metanode_id: &str) -> Result<()> {
    let descendant_ids = session
        .graph
        .cluster_by_id(metanode_id)
        .ok_or_else(|| Error::UnknownElement {
            id: metanode_id.to_owned(),
        })?
        .descendants
        .clone()
        .unwrap_or_default();

    session.graph.begin_batch();
    for did in &descendant_ids {
        let Some(d) = session.graph.cluster_by_id(did) else {
            continue;
        };
        let needs_recursion = d.descendant_count > 0 && !d.collapsed;
        if needs_recursion {
            collapse_metanode_impl(session, did)?;
        }
        let skeleton: Vec<String> = session
            .graph
            .cluster_by_id(did)
            .map(|d| d.singlenode_ids.clone())
            .unwrap_or_default();
        for nid in &skeleton {
            session.graph.remove_node(nid);
            session.node_pos.remove(nid);
        }
        session.graph.remove_cluster(did);
    }
    if let Some(mn) = session.graph.cluster_by_id_mut(metanode_id) {
        mn.collapsed = true;
    }
    session.graph.end_batch();
    debug!(metanode = metanode_id, removed = descendant_ids.len(), "metanode collapsed");
    Ok(())
}
