pub mod error;
pub mod layout;
pub mod model;
pub mod geometry {
    pub mod curve;
    pub mod tolerance;
    pub mod transform;
}
pub mod algorithms {
    pub mod collapse;
    pub mod scheduler;
    pub mod spqr;
}
mod json;
mod render;
mod session;

pub use error::{Error, Result};
pub use geometry::curve::{distance, parameterize_curve, point_to_line_distance};
pub use geometry::transform::transform_point;
pub use model::{BoundingBox, CurveDescriptor, Point, Rotation};
pub use session::{CollapseOutcome, Colorization, Session, SpqrMode, ViewConfig, ViewMode};

use std::collections::HashMap;

use model::{ClusterElement, EdgeElement, NodeElement};

// The live element graph handed to the render engine: arenas of nodes,
// edges and compound clusters, addressed by slot index, with string-id
// lookup maps on top. Nodes and clusters share one id namespace as far as
// edge endpoints are concerned; edges are addressed only by index (two
// edges may legally join the same endpoint pair).
#[derive(Debug)]
pub struct ElementGraph {
    pub(crate) nodes: Vec<Option<NodeElement>>,
    pub(crate) edges: Vec<Option<EdgeElement>>,
    pub(crate) clusters: Vec<Option<ClusterElement>>,
    pub(crate) node_index: HashMap<String, u32>,
    pub(crate) cluster_index: HashMap<String, u32>,
    geom_ver: u64,
    batch_depth: u32,
    batch_dirty: bool,
}

impl Default for ElementGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementGraph {
    pub fn new() -> Self {
        ElementGraph {
            nodes: Vec::new(),
            edges: Vec::new(),
            clusters: Vec::new(),
            node_index: HashMap::new(),
            cluster_index: HashMap::new(),
            geom_ver: 1,
            batch_depth: 0,
            batch_dirty: false,
        }
    }

    pub fn geom_version(&self) -> u64 {
        self.geom_ver
    }

    fn bump(&mut self) {
        if self.batch_depth == 0 {
            self.geom_ver += 1;
        } else {
            self.batch_dirty = true;
        }
    }

    // Batches group structural edits so version-keyed re-indexing in
    // consumers runs once per group instead of once per edit. They do not
    // provide atomicity; everything here is single threaded.
    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    pub fn end_batch(&mut self) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 && self.batch_dirty {
            self.geom_ver += 1;
            self.batch_dirty = false;
        }
    }

    // Nodes

    pub fn add_node(&mut self, node: NodeElement) -> u32 {
        let ix = self.nodes.len() as u32;
        self.node_index.insert(node.id.clone(), ix);
        self.nodes.push(Some(node));
        self.bump();
        ix
    }

    pub fn node(&self, ix: u32) -> Option<&NodeElement> {
        self.nodes.get(ix as usize).and_then(|n| n.as_ref())
    }

    pub fn node_mut(&mut self, ix: u32) -> Option<&mut NodeElement> {
        self.nodes.get_mut(ix as usize).and_then(|n| n.as_mut())
    }

    pub fn node_ix(&self, id: &str) -> Option<u32> {
        self.node_index.get(id).copied()
    }

    pub fn node_by_id(&self, id: &str) -> Option<&NodeElement> {
        self.node_ix(id).and_then(|ix| self.node(ix))
    }

    pub fn node_by_id_mut(&mut self, id: &str) -> Option<&mut NodeElement> {
        self.node_ix(id).and_then(|ix| self.node_mut(ix))
    }

    // Removes a node and every edge incident on it, mirroring how a render
    // engine drops an element together with its connections. Returns the
    // removed edge indices.
    pub fn remove_node(&mut self, id: &str) -> Vec<u32> {
        let Some(ix) = self.node_index.remove(id) else {
            return Vec::new();
        };
        let incident: Vec<u32> = self
            .edges
            .iter()
            .enumerate()
            .filter_map(|(eix, slot)| {
                slot.as_ref()
                    .filter(|e| e.source == id || e.target == id)
                    .map(|_| eix as u32)
            })
            .collect();
        for &eix in &incident {
            self.edges[eix as usize] = None;
        }
        self.nodes[ix as usize] = None;
        self.bump();
        incident
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn nodes_iter(&self) -> impl Iterator<Item = (u32, &NodeElement)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(ix, n)| n.as_ref().map(|n| (ix as u32, n)))
    }

    // Edges

    pub fn add_edge(&mut self, edge: EdgeElement) -> u32 {
        let ix = self.edges.len() as u32;
        self.edges.push(Some(edge));
        self.bump();
        ix
    }

    pub fn edge(&self, ix: u32) -> Option<&EdgeElement> {
        self.edges.get(ix as usize).and_then(|e| e.as_ref())
    }

    pub fn edge_mut(&mut self, ix: u32) -> Option<&mut EdgeElement> {
        self.edges.get_mut(ix as usize).and_then(|e| e.as_mut())
    }

    pub fn remove_edge(&mut self, ix: u32) -> bool {
        match self.edges.get_mut(ix as usize) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                self.bump();
                true
            }
            _ => false,
        }
    }

    pub fn move_edge_source(&mut self, ix: u32, new_source: &str) -> bool {
        if let Some(e) = self.edge_mut(ix) {
            e.source = new_source.to_owned();
            self.bump();
            true
        } else {
            false
        }
    }

    pub fn move_edge_target(&mut self, ix: u32, new_target: &str) -> bool {
        if let Some(e) = self.edge_mut(ix) {
            e.target = new_target.to_owned();
            self.bump();
            true
        } else {
            false
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_some()).count()
    }

    pub fn edges_iter(&self) -> impl Iterator<Item = (u32, &EdgeElement)> {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(ix, e)| e.as_ref().map(|e| (ix as u32, e)))
    }

    // Clusters

    pub fn add_cluster(&mut self, cluster: ClusterElement) -> u32 {
        let ix = self.clusters.len() as u32;
        self.cluster_index.insert(cluster.id.clone(), ix);
        self.clusters.push(Some(cluster));
        self.bump();
        ix
    }

    pub fn cluster(&self, ix: u32) -> Option<&ClusterElement> {
        self.clusters.get(ix as usize).and_then(|c| c.as_ref())
    }

    pub fn cluster_mut(&mut self, ix: u32) -> Option<&mut ClusterElement> {
        self.clusters.get_mut(ix as usize).and_then(|c| c.as_mut())
    }

    pub fn cluster_ix(&self, id: &str) -> Option<u32> {
        self.cluster_index.get(id).copied()
    }

    pub fn cluster_by_id(&self, id: &str) -> Option<&ClusterElement> {
        self.cluster_ix(id).and_then(|ix| self.cluster(ix))
    }

    pub fn cluster_by_id_mut(&mut self, id: &str) -> Option<&mut ClusterElement> {
        self.cluster_ix(id).and_then(|ix| self.cluster_mut(ix))
    }

    pub fn is_cluster(&self, id: &str) -> bool {
        self.cluster_index.contains_key(id)
    }

    // Removes a compound cluster and every edge incident on it. Returns
    // the removed edge indices; an unknown id removes nothing.
    pub fn remove_cluster(&mut self, id: &str) -> Vec<u32> {
        let Some(ix) = self.cluster_index.remove(id) else {
            return Vec::new();
        };
        let incident: Vec<u32> = self
            .edges
            .iter()
            .enumerate()
            .filter_map(|(eix, slot)| {
                slot.as_ref()
                    .filter(|e| e.source == id || e.target == id)
                    .map(|_| eix as u32)
            })
            .collect();
        for &eix in &incident {
            self.edges[eix as usize] = None;
        }
        self.clusters[ix as usize] = None;
        self.bump();
        incident
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.iter().filter(|c| c.is_some()).count()
    }

    pub fn clusters_iter(&self) -> impl Iterator<Item = (u32, &ClusterElement)> {
        self.clusters
            .iter()
            .enumerate()
            .filter_map(|(ix, c)| c.as_ref().map(|c| (ix as u32, c)))
    }

    // Endpoint ids may name either a node or a cluster.
    pub fn element_exists(&self, id: &str) -> bool {
        self.node_index.contains_key(id) || self.cluster_index.contains_key(id)
    }

    // Direct child nodes of a compound cluster.
    pub fn children_of(&self, cluster_id: &str) -> Vec<u32> {
        self.nodes_iter()
            .filter(|(_, n)| n.parent.as_deref() == Some(cluster_id))
            .map(|(ix, _)| ix)
            .collect()
    }

    // Snapshot of the element graph for export or inspection.
    pub fn to_json_value(&self) -> serde_json::Value {
        json::to_json_impl(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CurveDescriptor, NodeShape, Point};

    fn bare_node(id: &str) -> NodeElement {
        NodeElement {
            id: id.to_owned(),
            label: None,
            pos: Point::new(0.0, 0.0),
            width: 10.0,
            height: 10.0,
            shape: NodeShape::LeftDir,
            parent: None,
            length: None,
            depth: None,
            gc_content: None,
            is_repeat: None,
            gc_color: None,
            repeat_color: None,
            hidden: false,
            tentative: false,
        }
    }

    fn bare_edge(source: &str, target: &str) -> EdgeElement {
        EdgeElement {
            source: source.to_owned(),
            target: target.to_owned(),
            display_source: None,
            display_target: None,
            curve: CurveDescriptor::Straight,
            straightened: false,
            reduced: false,
            thickness: 3.0,
            outlier: None,
            oriented: true,
            is_virtual: false,
            multiplicity: None,
            orientation: None,
            mean: None,
            stdev: None,
            hidden: false,
            culled: false,
        }
    }

    #[test]
    fn removing_a_node_removes_incident_edges() {
        let mut g = ElementGraph::new();
        g.add_node(bare_node("a"));
        g.add_node(bare_node("b"));
        g.add_node(bare_node("c"));
        g.add_edge(bare_edge("a", "b"));
        g.add_edge(bare_edge("b", "c"));
        g.add_edge(bare_edge("c", "a"));
        let removed = g.remove_node("b");
        assert_eq!(removed.len(), 2);
        assert_eq!(g.edge_count(), 1);
        assert!(g.node_by_id("b").is_none());
    }

    #[test]
    fn batching_defers_version_bumps() {
        let mut g = ElementGraph::new();
        let before = g.geom_version();
        g.begin_batch();
        g.add_node(bare_node("a"));
        g.add_node(bare_node("b"));
        g.add_edge(bare_edge("a", "b"));
        assert_eq!(g.geom_version(), before);
        g.end_batch();
        assert_eq!(g.geom_version(), before + 1);
    }

    #[test]
    fn parallel_edges_keep_distinct_identities() {
        let mut g = ElementGraph::new();
        g.add_node(bare_node("a"));
        g.add_node(bare_node("b"));
        let e1 = g.add_edge(bare_edge("a", "b"));
        let e2 = g.add_edge(bare_edge("a", "b"));
        assert_ne!(e1, e2);
        g.remove_edge(e1);
        assert!(g.edge(e2).is_some());
    }
}
