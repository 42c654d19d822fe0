// Collapse/expand of structural-pattern clusters. A collapsed cluster
// hides its interior and adopts its boundary edges; uncollapsing reverses
// both, restoring the canonical endpoints recorded before any rewiring.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{Error, Result};
use crate::session::{CollapseOutcome, Session};

// Builds each uncollapsed cluster's edge maps and interior-element lists.
// Deferred until after a component is fully rendered: the maps are
// computed from the live graph's edges, so every interior edge has to
// exist first.
pub(crate) fn init_clusters_impl(session: &mut Session) {
    let cluster_ids: Vec<String> = session.uncollapsed.iter().cloned().collect();
    for cid in cluster_ids {
        let children = session.graph.children_of(&cid);
        let child_ids: HashSet<String> = children
            .iter()
            .filter_map(|&ix| session.graph.node(ix).map(|n| n.id.clone()))
            .collect();
        let mut incoming = std::collections::HashMap::new();
        let mut outgoing = std::collections::HashMap::new();
        let mut interior_edges = Vec::new();
        for (eix, e) in session.graph.edges_iter() {
            let source_in = child_ids.contains(&e.source);
            let target_in = child_ids.contains(&e.target);
            match (source_in, target_in) {
                // Both endpoints inside (cyclic edges included): interior,
                // never rewired.
                (true, true) => interior_edges.push(eix),
                (false, true) => {
                    incoming.insert(eix, (e.source.clone(), e.target.clone()));
                }
                (true, false) => {
                    outgoing.insert(eix, (e.source.clone(), e.target.clone()));
                }
                (false, false) => {}
            }
        }
        let count = children.len() as u64;
        if let Some(c) = session.graph.cluster_by_id_mut(&cid) {
            c.interior_nodes = children;
            c.interior_edges = interior_edges;
            c.incoming = incoming;
            c.outgoing = outgoing;
            c.interior_node_count = Some(count);
        }
    }
    session.clusters_ready = true;
}

pub(crate) fn toggle_impl(session: &mut Session, cluster_id: &str) -> Result<CollapseOutcome> {
    let collapsed = session
        .graph
        .cluster_by_id(cluster_id)
        .ok_or_else(|| Error::UnknownElement {
            id: cluster_id.to_owned(),
        })?
        .collapsed;
    session.graph.begin_batch();
    let outcome = if collapsed {
        uncollapse_impl(session, cluster_id)
    } else {
        collapse_impl(session, cluster_id)
    };
    session.graph.end_batch();
    outcome
}

pub(crate) fn collapse_impl(session: &mut Session, cluster_id: &str) -> Result<CollapseOutcome> {
    if !session.clusters_ready {
        init_clusters_impl(session);
    }
    let cix = session
        .graph
        .cluster_ix(cluster_id)
        .ok_or_else(|| Error::UnknownElement {
            id: cluster_id.to_owned(),
        })?;
    let (already, interior_nodes, interior_edges, in_edges, out_edges) = {
        let c = session
            .graph
            .cluster(cix)
            .ok_or_else(|| Error::UnknownElement {
                id: cluster_id.to_owned(),
            })?;
        (
            c.collapsed,
            c.interior_nodes.clone(),
            c.interior_edges.clone(),
            c.incoming.keys().copied().collect::<Vec<_>>(),
            c.outgoing.keys().copied().collect::<Vec<_>>(),
        )
    };
    if already {
        return Ok(CollapseOutcome::Collapsed);
    }
    // An in-progress manual path must not have elements rewired out from
    // under it.
    if session.finishing
        && interior_nodes
            .iter()
            .any(|&ix| session.graph.node(ix).is_some_and(|n| n.tentative))
    {
        return Ok(CollapseOutcome::Blocked);
    }

    for eix in in_edges {
        if let Some(e) = session.graph.edge_mut(eix) {
            if e.culled {
                continue;
            }
            e.straightened = true;
            e.target = cluster_id.to_owned();
        }
    }
    for eix in out_edges {
        if let Some(e) = session.graph.edge_mut(eix) {
            if e.culled {
                continue;
            }
            e.straightened = true;
            e.source = cluster_id.to_owned();
        }
    }
    for &nix in &interior_nodes {
        if let Some(n) = session.graph.node_mut(nix) {
            n.hidden = true;
        }
    }
    for &eix in &interior_edges {
        if let Some(e) = session.graph.edge_mut(eix) {
            e.hidden = true;
        }
    }
    if let Some(c) = session.graph.cluster_mut(cix) {
        c.collapsed = true;
    }
    session.collapsed.insert(cluster_id.to_owned());
    session.uncollapsed.remove(cluster_id);
    debug!(cluster = cluster_id, interior = interior_nodes.len(), "cluster collapsed");
    Ok(CollapseOutcome::Collapsed)
}

pub(crate) fn uncollapse_impl(session: &mut Session, cluster_id: &str) -> Result<CollapseOutcome> {
    let cix = session
        .graph
        .cluster_ix(cluster_id)
        .ok_or_else(|| Error::UnknownElement {
            id: cluster_id.to_owned(),
        })?;
    let (already, interior_nodes, interior_edges, in_map, out_map) = {
        let c = session
            .graph
            .cluster(cix)
            .ok_or_else(|| Error::UnknownElement {
                id: cluster_id.to_owned(),
            })?;
        (
            !c.collapsed,
            c.interior_nodes.clone(),
            c.interior_edges.clone(),
            c.incoming.clone(),
            c.outgoing.clone(),
        )
    };
    if already {
        return Ok(CollapseOutcome::Uncollapsed);
    }
    if session.finishing
        && interior_nodes
            .iter()
            .any(|&ix| session.graph.node(ix).is_some_and(|n| n.tentative))
    {
        return Ok(CollapseOutcome::Blocked);
    }

    for &nix in &interior_nodes {
        if let Some(n) = session.graph.node_mut(nix) {
            n.hidden = false;
        }
    }
    for &eix in &interior_edges {
        if let Some(e) = session.graph.edge_mut(eix) {
            e.hidden = false;
        }
    }
    // Restore canonical endpoints. Edges removed by the weight filter are
    // left alone; they keep their filtered-out state. The curved form only
    // comes back when the edge has real control data and its far endpoint
    // is not itself sitting collapsed.
    for (eix, (_, canonical_target)) in &in_map {
        let Some(e) = session.graph.edge(*eix) else {
            continue;
        };
        if e.culled {
            continue;
        }
        let restore_curve =
            e.curve.is_parameterized() && !e.reduced && !session.graph.is_cluster(&e.source);
        if let Some(e) = session.graph.edge_mut(*eix) {
            e.target = canonical_target.clone();
            if restore_curve {
                e.straightened = false;
            }
        }
    }
    for (eix, (canonical_source, _)) in &out_map {
        let Some(e) = session.graph.edge(*eix) else {
            continue;
        };
        if e.culled {
            continue;
        }
        let restore_curve =
            e.curve.is_parameterized() && !e.reduced && !session.graph.is_cluster(&e.target);
        if let Some(e) = session.graph.edge_mut(*eix) {
            e.source = canonical_source.clone();
            if restore_curve {
                e.straightened = false;
            }
        }
    }
    if let Some(c) = session.graph.cluster_mut(cix) {
        c.collapsed = false;
    }
    session.collapsed.remove(cluster_id);
    session.uncollapsed.insert(cluster_id.to_owned());
    debug!(cluster = cluster_id, "cluster uncollapsed");
    Ok(CollapseOutcome::Uncollapsed)
}

pub(crate) fn collapse_all_impl(session: &mut Session) -> Result<()> {
    let ids: Vec<String> = session.uncollapsed.iter().cloned().collect();
    session.graph.begin_batch();
    for id in ids {
        if let Err(err) = collapse_impl(session, &id) {
            session.graph.end_batch();
            return Err(err);
        }
    }
    session.graph.end_batch();
    Ok(())
}

pub(crate) fn uncollapse_all_impl(session: &mut Session) -> Result<()> {
    let ids: Vec<String> = session.collapsed.iter().cloned().collect();
    session.graph.begin_batch();
    for id in ids {
        if let Err(err) = uncollapse_impl(session, &id) {
            session.graph.end_batch();
            return Err(err);
        }
    }
    session.graph.end_batch();
    Ok(())
}

// Applies a new edge-weight threshold. Previously culled edges that fit
// the new bound come back first, reconciled against whatever collapsing
// happened while they were filtered out: an endpoint whose node is hidden
// inside a collapsed cluster reattaches to that cluster (straightened);
// an endpoint left pointing at a cluster that has since reopened snaps
// back to its canonical node from the cluster's edge map.
pub(crate) fn set_cull_threshold_impl(session: &mut Session, threshold: Option<f64>) {
    if session.cull_threshold == threshold {
        return;
    }
    session.graph.begin_batch();
    let culled_ids: Vec<u32> = session
        .graph
        .edges_iter()
        .filter(|(_, e)| e.culled)
        .map(|(ix, _)| ix)
        .collect();
    for eix in culled_ids {
        let Some(e) = session.graph.edge(eix) else {
            continue;
        };
        let still_out = match threshold {
            Some(t) => e.multiplicity.is_some_and(|m| m < t),
            None => false,
        };
        if still_out {
            continue;
        }
        let source_fix = restored_endpoint(session, eix, &e.source, EndpointSide::Source);
        let target_fix = restored_endpoint(session, eix, &e.target, EndpointSide::Target);
        if let Some(e) = session.graph.edge_mut(eix) {
            e.culled = false;
            if let Some((id, straighten)) = source_fix {
                e.source = id;
                if straighten {
                    e.straightened = true;
                }
            }
            if let Some((id, straighten)) = target_fix {
                e.target = id;
                if straighten {
                    e.straightened = true;
                }
            }
        }
        let unstraighten = session.graph.edge(eix).is_some_and(|e| {
            e.straightened
                && e.curve.is_parameterized()
                && !e.reduced
                && !session.graph.is_cluster(&e.source)
                && !session.graph.is_cluster(&e.target)
        });
        if unstraighten {
            if let Some(e) = session.graph.edge_mut(eix) {
                e.straightened = false;
            }
        }
    }
    if let Some(t) = threshold {
        let to_cull: Vec<u32> = session
            .graph
            .edges_iter()
            .filter(|(_, e)| {
                !e.culled && !e.hidden && e.multiplicity.is_some_and(|m| m < t)
            })
            .map(|(ix, _)| ix)
            .collect();
        for eix in &to_cull {
            if let Some(e) = session.graph.edge_mut(*eix) {
                e.culled = true;
            }
        }
        debug!(threshold = t, culled = to_cull.len(), "edge weight filter applied");
    }
    session.cull_threshold = threshold;
    session.graph.end_batch();
}

enum EndpointSide {
    Source,
    Target,
}

// Where a restored edge endpoint should attach, and whether the move
// invalidates the curve data. None leaves the endpoint as recorded.
fn restored_endpoint(
    session: &Session,
    eix: u32,
    current: &str,
    side: EndpointSide,
) -> Option<(String, bool)> {
    if let Some(c) = session.graph.cluster_by_id(current) {
        // Still collapsed: staying attached to the compound node is right.
        if c.collapsed {
            return None;
        }
        // The cluster reopened while this edge was filtered out; its edge
        // map still knows the canonical endpoint.
        let canonical = match side {
            EndpointSide::Source => c.outgoing.get(&eix).map(|(s, _)| s.clone()),
            EndpointSide::Target => c.incoming.get(&eix).map(|(_, t)| t.clone()),
        };
        return canonical.map(|id| (id, false));
    }
    let node = session.graph.node_by_id(current)?;
    if !node.hidden {
        return None;
    }
    let parent = node.parent.clone()?;
    session
        .graph
        .cluster_by_id(&parent)
        .filter(|c| c.collapsed)
        .map(|c| (c.id.clone(), true))
}

// Switches every edge in the component to (or back from) plain straight
// rendering. Applies equally to edges already straightened by collapsing:
// lifting the reduction leaves those straightened until their cluster
// reopens.
pub(crate) fn set_edge_reduction_impl(session: &mut Session, reduced: bool) {
    session.graph.begin_batch();
    let ids: Vec<u32> = session.graph.edges_iter().map(|(ix, _)| ix).collect();
    for eix in ids {
        if let Some(e) = session.graph.edge_mut(eix) {
            e.reduced = reduced;
        }
    }
    session.graph.end_batch();
}
