// Boundary to the precomputed layout database. The real persistence layer
// lives outside this crate; everything here is the row shapes the drawing
// pipeline consumes, a cursor-style query trait over them, and an
// in-memory implementation used by tests and tooling.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{BoundingBox, ClusterKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsmFiletype {
    LastGraph,
    Gfa,
    Gml,
    Fastg,
}

// Assembly-wide summary, one row per database.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SummaryRow {
    pub filetype: AsmFiletype,
    pub node_count: u64,
    pub edge_count: u64,
    pub component_count: u64,
    pub total_length: u64,
    pub n50: u64,
    pub has_gc_content: bool,
    pub has_repeat_info: bool,
}

// One connected component of the regular view, keyed by 1-based size rank.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComponentRow {
    pub size_rank: u32,
    pub bbox: BoundingBox,
    pub node_count: u64,
    pub edge_count: u64,
}

// One connected component of the SPQR view. Compressed counts describe the
// initial (all-trees-collapsed) drawing; uncompressed counts the fully
// expanded one. The implicit sub-mode has its own layout extent.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpqrComponentRow {
    pub size_rank: u32,
    pub bbox: BoundingBox,
    pub i_bbox: BoundingBox,
    pub compressed_node_count: u64,
    pub compressed_edge_count: u64,
    pub ex_uncompressed_node_count: u64,
    pub ex_uncompressed_edge_count: u64,
    pub im_uncompressed_node_count: u64,
    pub im_uncompressed_edge_count: u64,
    pub bicomponent_count: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeRow {
    pub id: String,
    pub label: Option<String>,
    pub component_rank: u32,
    // Layout position; the implicit SPQR sub-mode reads the i_* pair.
    pub x: f64,
    pub y: f64,
    pub i_x: Option<f64>,
    pub i_y: Option<f64>,
    // Dimensions in layout-tool inches.
    pub w: f64,
    pub h: f64,
    pub forward: bool,
    pub length: Option<i64>,
    pub depth: Option<f64>,
    pub gc_content: Option<f64>,
    pub is_repeat: Option<bool>,
    pub parent_cluster_id: Option<String>,
    pub parent_metanode_id: Option<String>,
    pub parent_bicomponent_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EdgeRow {
    pub source_id: String,
    pub target_id: String,
    pub component_rank: u32,
    // Whitespace-separated decimals, two per control point.
    pub control_point_string: String,
    pub control_point_count: usize,
    pub multiplicity: Option<f64>,
    // Relative thickness in [0, 1], scaled into px by the renderer.
    pub thickness: f64,
    // -1 low outlier, 0 normal, 1 high outlier.
    pub is_outlier: i8,
    pub orientation: Option<String>,
    pub mean: Option<f64>,
    pub stdev: Option<f64>,
    pub parent_cluster_id: Option<String>,
    pub parent_metanode_id: Option<String>,
    pub is_virtual: bool,
}

// A structural-pattern cluster in the regular view. Corner coordinates are
// in layout units; `w`/`h` are the collapsed dimensions in inches (absent
// in old databases).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClusterRow {
    pub id: String,
    pub kind: ClusterKind,
    pub component_rank: u32,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
    pub w: Option<f64>,
    pub h: Option<f64>,
    pub length: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BicomponentRow {
    pub id_num: u64,
    pub scc_rank: u32,
    pub root_metanode_id: String,
    pub node_count: u64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
    pub i_left: f64,
    pub i_bottom: f64,
    pub i_right: f64,
    pub i_top: f64,
}

impl BicomponentRow {
    // Bicomponent ids share the cluster namespace under an "I" prefix.
    pub fn cluster_id(&self) -> String {
        format!("I{}", self.id_num)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetanodeRow {
    pub metanode_id: String,
    pub scc_rank: u32,
    // Series, parallel or rigid.
    pub kind: ClusterKind,
    pub parent_bicomponent_id_num: u64,
    pub descendant_metanode_count: u64,
    pub node_count: u64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
    pub i_left: f64,
    pub i_bottom: f64,
    pub i_right: f64,
    pub i_top: f64,
}

// An edge between two metanodes in one SPQR tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetanodeEdgeRow {
    pub source_metanode_id: String,
    pub target_metanode_id: String,
    pub control_point_string: String,
    pub control_point_count: usize,
}

// Read-only, cursor-style access to the layout database. Queries are
// stepped synchronously and cheaply per row; the draw scheduler is what
// breaks the resulting work into chunks.
pub trait LayoutSource {
    fn summary(&self) -> Result<SummaryRow>;
    fn component(&self, rank: u32) -> Result<ComponentRow>;
    fn spqr_component(&self, rank: u32) -> Result<SpqrComponentRow>;
    fn clusters(&self, rank: u32) -> Result<Vec<ClusterRow>>;
    fn nodes(&self, rank: u32) -> Result<Vec<NodeRow>>;
    fn edges(&self, rank: u32) -> Result<Vec<EdgeRow>>;
    fn bicomponents(&self, rank: u32) -> Result<Vec<BicomponentRow>>;
    // Root metanodes of the component's SPQR trees.
    fn metanodes(&self, rank: u32, root_ids: &[String]) -> Result<Vec<MetanodeRow>>;
    // Singlenodes/singleedges at the top level of the component: parent
    // metanode either absent or one of the given roots.
    fn top_singlenodes(&self, rank: u32, root_ids: &[String]) -> Result<Vec<NodeRow>>;
    fn top_singleedges(&self, rank: u32, root_ids: &[String]) -> Result<Vec<EdgeRow>>;
    // SPQR tree expansion queries, used lazily by metanode uncollapsing.
    fn metanode_edges_from(&self, metanode_id: &str) -> Result<Vec<MetanodeEdgeRow>>;
    fn metanodes_by_id(&self, ids: &[String]) -> Result<Vec<MetanodeRow>>;
    fn singlenodes_of(&self, metanode_ids: &[String]) -> Result<Vec<NodeRow>>;
    fn singleedges_of(&self, metanode_ids: &[String]) -> Result<Vec<EdgeRow>>;
}

// In-memory layout source. Rows are pushed in by whatever built it; the
// query methods filter the same way the persisted database would.
#[derive(Clone, Debug, Default)]
pub struct MemoryLayout {
    pub summary: Option<SummaryRow>,
    pub components: Vec<ComponentRow>,
    pub spqr_components: Vec<SpqrComponentRow>,
    pub clusters: Vec<ClusterRow>,
    pub nodes: Vec<NodeRow>,
    pub edges: Vec<EdgeRow>,
    pub bicomponents: Vec<BicomponentRow>,
    pub metanodes: Vec<MetanodeRow>,
    pub metanode_edges: Vec<MetanodeEdgeRow>,
    pub singlenodes: Vec<NodeRow>,
    pub singleedges: Vec<EdgeRow>,
}

impl MemoryLayout {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LayoutSource for MemoryLayout {
    fn summary(&self) -> Result<SummaryRow> {
        self.summary
            .clone()
            .ok_or_else(|| Error::Layout("no summary row loaded".into()))
    }

    fn component(&self, rank: u32) -> Result<ComponentRow> {
        self.components
            .iter()
            .find(|c| c.size_rank == rank)
            .cloned()
            .ok_or(Error::MissingComponent { rank })
    }

    fn spqr_component(&self, rank: u32) -> Result<SpqrComponentRow> {
        self.spqr_components
            .iter()
            .find(|c| c.size_rank == rank)
            .cloned()
            .ok_or(Error::MissingComponent { rank })
    }

    fn clusters(&self, rank: u32) -> Result<Vec<ClusterRow>> {
        Ok(self
            .clusters
            .iter()
            .filter(|c| c.component_rank == rank)
            .cloned()
            .collect())
    }

    fn nodes(&self, rank: u32) -> Result<Vec<NodeRow>> {
        Ok(self
            .nodes
            .iter()
            .filter(|n| n.component_rank == rank)
            .cloned()
            .collect())
    }

    fn edges(&self, rank: u32) -> Result<Vec<EdgeRow>> {
        Ok(self
            .edges
            .iter()
            .filter(|e| e.component_rank == rank)
            .cloned()
            .collect())
    }

    fn bicomponents(&self, rank: u32) -> Result<Vec<BicomponentRow>> {
        Ok(self
            .bicomponents
            .iter()
            .filter(|b| b.scc_rank == rank)
            .cloned()
            .collect())
    }

    fn metanodes(&self, rank: u32, root_ids: &[String]) -> Result<Vec<MetanodeRow>> {
        Ok(self
            .metanodes
            .iter()
            .filter(|m| m.scc_rank == rank && root_ids.contains(&m.metanode_id))
            .cloned()
            .collect())
    }

    fn top_singlenodes(&self, rank: u32, root_ids: &[String]) -> Result<Vec<NodeRow>> {
        Ok(self
            .singlenodes
            .iter()
            .filter(|n| {
                n.component_rank == rank
                    && n.parent_metanode_id
                        .as_ref()
                        .map_or(true, |p| root_ids.contains(p))
            })
            .cloned()
            .collect())
    }

    fn top_singleedges(&self, rank: u32, root_ids: &[String]) -> Result<Vec<EdgeRow>> {
        Ok(self
            .singleedges
            .iter()
            .filter(|e| {
                e.component_rank == rank
                    && e.parent_metanode_id
                        .as_ref()
                        .map_or(true, |p| root_ids.contains(p))
            })
            .cloned()
            .collect())
    }

    fn metanode_edges_from(&self, metanode_id: &str) -> Result<Vec<MetanodeEdgeRow>> {
        Ok(self
            .metanode_edges
            .iter()
            .filter(|e| e.source_metanode_id == metanode_id)
            .cloned()
            .collect())
    }

    fn metanodes_by_id(&self, ids: &[String]) -> Result<Vec<MetanodeRow>> {
        Ok(self
            .metanodes
            .iter()
            .filter(|m| ids.contains(&m.metanode_id))
            .cloned()
            .collect())
    }

    fn singlenodes_of(&self, metanode_ids: &[String]) -> Result<Vec<NodeRow>> {
        Ok(self
            .singlenodes
            .iter()
            .filter(|n| {
                n.parent_metanode_id
                    .as_ref()
                    .is_some_and(|p| metanode_ids.contains(p))
            })
            .cloned()
            .collect())
    }

    fn singleedges_of(&self, metanode_ids: &[String]) -> Result<Vec<EdgeRow>> {
        Ok(self
            .singleedges
            .iter()
            .filter(|e| {
                e.parent_metanode_id
                    .as_ref()
                    .is_some_and(|p| metanode_ids.contains(p))
            })
            .cloned()
            .collect())
    }
}
