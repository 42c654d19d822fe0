use std::collections::{BTreeSet, HashMap};

use crate::algorithms::{collapse, spqr};
use crate::error::Result;
use crate::layout::LayoutSource;
use crate::model::{BoundingBox, Color, Point, Rotation};
use crate::ElementGraph;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    Regular,
    Spqr,
}

// How SPQR trees are expanded: "explicit" nests descendant metanodes as
// real compound nodes; "implicit" inlines their skeleton elements into the
// current view and never materializes the descendants themselves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpqrMode {
    Explicit,
    Implicit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Colorization {
    Plain,
    GcContent,
    Repeat,
}

// Result of a collapse/uncollapse request. `Blocked` reports the guarded
// no-op taken when finishing mode holds a tentative node inside the
// cluster; nothing changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollapseOutcome {
    Collapsed,
    Uncollapsed,
    Blocked,
}

// Per-draw view configuration. Replaced wholesale on every redraw; nothing
// in here is mutated piecemeal mid-component.
#[derive(Clone, Debug)]
pub struct ViewConfig {
    pub mode: ViewMode,
    pub spqr_mode: SpqrMode,
    pub rotation: Rotation,
    pub prev_rotation: Rotation,
    pub colorization: Colorization,
    // Gradient extremes for GC/repeat colorization.
    pub low_color: Color,
    pub high_color: Color,
    pub default_node_color: Color,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            mode: ViewMode::Regular,
            spqr_mode: SpqrMode::Explicit,
            // The render orientation is rotated a quarter turn from the
            // layout tool's native orientation by convention.
            rotation: Rotation::R90,
            prev_rotation: Rotation::R0,
            colorization: Colorization::Plain,
            low_color: Color::new(0x00, 0x22, 0xff),
            high_color: Color::new(0xff, 0x22, 0x00),
            default_node_color: Color::new(0x88, 0x88, 0x88),
        }
    }
}

impl ViewConfig {
    // Signed delta applied by the coordinate transform; recomputed once
    // per redraw, never per point.
    pub fn rotation_delta(&self) -> i32 {
        self.prev_rotation.degrees() - self.rotation.degrees()
    }

    // The configuration for redrawing the view turned to `rotation`:
    // the current rotation becomes the previous one.
    pub fn rotated_to(&self, rotation: Rotation) -> ViewConfig {
        ViewConfig {
            prev_rotation: self.rotation,
            rotation,
            ..self.clone()
        }
    }
}

// All state for the one component currently drawn: the element graph, the
// indexes derived while rendering it, and the interactive collapse/
// finishing state. A new draw replaces the whole thing unconditionally.
#[derive(Debug)]
pub struct Session {
    pub(crate) graph: ElementGraph,
    pub(crate) config: ViewConfig,
    pub(crate) bbox: BoundingBox,
    pub(crate) has_repeat_info: bool,
    // node id -> render position; edge geometry resolves endpoints here.
    pub(crate) node_pos: HashMap<String, Point>,
    // element id (or node label) -> parent cluster id, for search and
    // scaffold highlighting collaborators.
    pub(crate) ele_parent: HashMap<String, String>,
    // Multiplicities seen while drawing, for the edge-weight histogram.
    pub(crate) edge_weights: Vec<f64>,
    // Accession keys (ids or labels) of the component's contigs.
    pub(crate) component_keys: Vec<String>,
    // Disjoint complements over structural-pattern clusters.
    pub(crate) collapsed: BTreeSet<String>,
    pub(crate) uncollapsed: BTreeSet<String>,
    // Implicit SPQR mode: bicomponent id -> singlenode ids already
    // visible inside it (dedup registry for tree expansion).
    pub(crate) bicomp_visible: HashMap<String, Vec<String>>,
    pub(crate) finishing: bool,
    pub(crate) clusters_ready: bool,
    pub(crate) cull_threshold: Option<f64>,
}

impl Session {
    pub fn new(config: ViewConfig) -> Self {
        Session {
            graph: ElementGraph::new(),
            config,
            bbox: BoundingBox {
                width: 0.0,
                height: 0.0,
            },
            has_repeat_info: false,
            node_pos: HashMap::new(),
            ele_parent: HashMap::new(),
            edge_weights: Vec::new(),
            component_keys: Vec::new(),
            collapsed: BTreeSet::new(),
            uncollapsed: BTreeSet::new(),
            bicomp_visible: HashMap::new(),
            finishing: false,
            clusters_ready: false,
            cull_threshold: None,
        }
    }

    // Drops every trace of the previous component and installs the new
    // view configuration. There is no partial-state reuse across draws.
    pub(crate) fn reset_for_draw(
        &mut self,
        config: ViewConfig,
        bbox: BoundingBox,
        has_repeat_info: bool,
    ) {
        *self = Session::new(config);
        self.bbox = bbox;
        self.has_repeat_info = has_repeat_info;
    }

    pub fn graph(&self) -> &ElementGraph {
        &self.graph
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    pub fn edge_weights(&self) -> &[f64] {
        &self.edge_weights
    }

    pub fn component_keys(&self) -> &[String] {
        &self.component_keys
    }

    pub fn parent_of(&self, ele_id: &str) -> Option<&str> {
        self.ele_parent.get(ele_id).map(String::as_str)
    }

    pub fn node_position(&self, node_id: &str) -> Option<Point> {
        self.node_pos.get(node_id).copied()
    }

    // Switching colorization is a styling change, not a redraw; both
    // gradient colors were computed when the node rendered.
    pub fn set_colorization(&mut self, colorization: Colorization) {
        self.config.colorization = colorization;
    }

    // The fill a node should take under the active colorization mode, or
    // None for the default style.
    pub fn node_fill_color(&self, node_id: &str) -> Option<Color> {
        let node = self.graph.node_by_id(node_id)?;
        match self.config.colorization {
            Colorization::Plain => None,
            Colorization::GcContent => node.gc_color,
            Colorization::Repeat => node.repeat_color,
        }
    }

    pub fn collapsed_clusters(&self) -> impl Iterator<Item = &str> {
        self.collapsed.iter().map(String::as_str)
    }

    pub fn uncollapsed_clusters(&self) -> impl Iterator<Item = &str> {
        self.uncollapsed.iter().map(String::as_str)
    }

    // Finishing mode: manual path construction. Tentative nodes are the
    // highlighted candidates; clusters holding one refuse to collapse.

    pub fn start_finishing(&mut self) {
        self.finishing = true;
    }

    pub fn end_finishing(&mut self) {
        self.finishing = false;
        self.clear_tentative();
    }

    pub fn finishing_active(&self) -> bool {
        self.finishing
    }

    pub fn mark_tentative(&mut self, node_ids: &[&str]) {
        for id in node_ids {
            if let Some(n) = self.graph.node_by_id_mut(id) {
                n.tentative = true;
            }
        }
    }

    pub fn clear_tentative(&mut self) {
        for slot in self.graph.nodes.iter_mut().flatten() {
            slot.tentative = false;
        }
    }

    // Cluster collapse/expand (structural patterns, regular view).

    pub fn toggle_cluster(&mut self, cluster_id: &str) -> Result<CollapseOutcome> {
        collapse::toggle_impl(self, cluster_id)
    }

    pub fn collapse_cluster(&mut self, cluster_id: &str) -> Result<CollapseOutcome> {
        collapse::collapse_impl(self, cluster_id)
    }

    pub fn uncollapse_cluster(&mut self, cluster_id: &str) -> Result<CollapseOutcome> {
        collapse::uncollapse_impl(self, cluster_id)
    }

    pub fn collapse_all(&mut self) -> Result<()> {
        collapse::collapse_all_impl(self)
    }

    pub fn uncollapse_all(&mut self) -> Result<()> {
        collapse::uncollapse_all_impl(self)
    }

    // Edge-weight culling. `None` clears the filter. Changing the
    // threshold first restores every previously culled edge that fits the
    // new bound, then culls below it.
    pub fn set_cull_threshold(&mut self, threshold: Option<f64>) {
        collapse::set_cull_threshold_impl(self, threshold)
    }

    pub fn cull_threshold(&self) -> Option<f64> {
        self.cull_threshold
    }

    // Session-wide cheap-rendering switch: every edge drops to a straight
    // line, or returns to its recorded curve where one is still valid.
    pub fn set_edge_reduction(&mut self, reduced: bool) {
        collapse::set_edge_reduction_impl(self, reduced)
    }

    // SPQR metanode expansion; queries the layout source lazily for the
    // subtree being opened.
    pub fn uncollapse_metanode<S: LayoutSource + ?Sized>(
        &mut self,
        source: &S,
        metanode_id: &str,
    ) -> Result<()> {
        spqr::uncollapse_metanode_impl(self, source, metanode_id)
    }

    pub fn collapse_metanode(&mut self, metanode_id: &str) -> Result<()> {
        spqr::collapse_metanode_impl(self, metanode_id)
    }
}
