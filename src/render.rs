// Row records -> render elements. Node positions go through the
// coordinate transform and get indexed for edge geometry; edge control
// points run the curve parameterizer; clusters are centered between their
// transformed corners. The scheduler guarantees ordering: clusters first,
// then nodes, then edges.

use std::collections::HashMap;

use tracing::trace;

use crate::error::{Error, Result};
use crate::geometry::curve::parameterize_curve;
use crate::geometry::tolerance::{
    EDGE_THICKNESS_RANGE, INCHES_TO_PIXELS, MAX_EDGE_THICKNESS, MIN_EDGE_THICKNESS,
};
use crate::geometry::transform::transform_point;
use crate::layout::{BicomponentRow, ClusterRow, EdgeRow, MetanodeEdgeRow, MetanodeRow, NodeRow};
use crate::model::{
    ClusterElement, Color, CurveDescriptor, EdgeElement, NodeElement, NodeShape, Outlier, Point,
};
use crate::session::{Session, SpqrMode, ViewMode};

impl Session {
    // Parses a control-point string ("x1 y1 x2 y2 ...") into transformed
    // render-space points. An odd coordinate count means the database is
    // corrupt.
    fn parse_control_points(&self, raw: &str, source: &str, target: &str) -> Result<Vec<Point>> {
        let coords: Vec<&str> = raw.split_whitespace().collect();
        if coords.len() % 2 != 0 {
            return Err(Error::OddControlPointCount {
                source_id: source.to_owned(),
                target_id: target.to_owned(),
            });
        }
        let delta = self.config.rotation_delta();
        let mut points = Vec::with_capacity(coords.len() / 2);
        for pair in coords.chunks_exact(2) {
            let bad = || Error::BadControlPoint {
                source_id: source.to_owned(),
                target_id: target.to_owned(),
            };
            let x: f64 = pair[0].parse().map_err(|_| bad())?;
            let y: f64 = pair[1].parse().map_err(|_| bad())?;
            points.push(transform_point(x, y, self.bbox, delta));
        }
        Ok(points)
    }

    // Renders one contig node under `display_id` (SPQR skeleton nodes are
    // suffixed by their parent metanode to stay unique) and returns its
    // render position.
    pub fn render_node(&mut self, row: &NodeRow, display_id: &str) -> Result<Point> {
        let implicit_spqr =
            self.config.mode == ViewMode::Spqr && self.config.spqr_mode == SpqrMode::Implicit;
        let (nx, ny) = if implicit_spqr {
            (row.i_x.unwrap_or(row.x), row.i_y.unwrap_or(row.y))
        } else {
            (row.x, row.y)
        };
        let pos = transform_point(nx, ny, self.bbox, self.config.rotation_delta());

        let shape = if self.config.mode == ViewMode::Spqr {
            NodeShape::SingleNode
        } else {
            NodeShape::for_rotation(self.config.rotation, row.forward)
        };

        // Accession key for scaffold detection: labels where the input
        // assembly carries them, ids otherwise.
        let key = row.label.clone().unwrap_or_else(|| row.id.clone());
        self.component_keys.push(key);

        let gc_color = row
            .gc_content
            .map(|gc| self.config.low_color.lerp(self.config.high_color, gc));
        let repeat_color = self.repeat_color_for(row);

        let mut parent = None;
        match self.config.mode {
            ViewMode::Regular => {
                if let Some(pid) = &row.parent_cluster_id {
                    parent = Some(pid.clone());
                    self.ele_parent
                        .insert(display_id.to_owned(), pid.clone());
                    if let Some(label) = &row.label {
                        self.ele_parent.insert(label.clone(), pid.clone());
                    }
                }
            }
            ViewMode::Spqr => {
                // Metanodes never become literal compound parents; their
                // skeleton contents are tracked on the metanode entity
                // (explicit) or in the bicomponent's visibility registry
                // (implicit) instead.
                if self.config.spqr_mode == SpqrMode::Implicit {
                    if let Some(bid) = &row.parent_bicomponent_id {
                        self.bicomp_visible
                            .entry(bid.clone())
                            .or_default()
                            .push(display_id.to_owned());
                    }
                }
                if let Some(mn_id) = &row.parent_metanode_id {
                    if self.config.spqr_mode == SpqrMode::Explicit {
                        if let Some(mn) = self.graph.cluster_by_id_mut(mn_id) {
                            mn.singlenode_ids.push(display_id.to_owned());
                        }
                    }
                    self.ele_parent
                        .insert(display_id.to_owned(), mn_id.clone());
                }
            }
        }

        let node = NodeElement {
            id: display_id.to_owned(),
            label: row.label.clone(),
            pos,
            // The layout tool's node extents are sideways relative to the
            // render orientation, so width and height swap on the way in.
            width: INCHES_TO_PIXELS * row.h,
            height: INCHES_TO_PIXELS * row.w,
            shape,
            parent,
            length: row.length,
            depth: row.depth,
            gc_content: row.gc_content,
            is_repeat: row.is_repeat,
            gc_color,
            repeat_color,
            hidden: false,
            tentative: false,
        };
        self.graph.add_node(node);
        self.node_pos.insert(display_id.to_owned(), pos);
        Ok(pos)
    }

    fn repeat_color_for(&self, row: &NodeRow) -> Option<Color> {
        if !self.has_repeat_info {
            return None;
        }
        Some(match row.is_repeat {
            Some(true) => self.config.high_color,
            Some(false) => self.config.low_color,
            // Repeat data exists for other nodes but not this one.
            None => self.config.default_node_color,
        })
    }

    // Two unlabeled anchor nodes pinning the transformed corners of the
    // layout extent, so viewport fitting sees the whole component.
    pub fn render_bounding_box_anchors(&mut self) {
        let delta = self.config.rotation_delta();
        let bl = transform_point(0.0, 0.0, self.bbox, delta);
        let tr = transform_point(self.bbox.width, self.bbox.height, self.bbox, delta);
        for (id, pos) in [("bottom_left", bl), ("top_right", tr)] {
            self.graph.add_node(NodeElement {
                id: id.to_owned(),
                label: None,
                pos,
                width: 0.0,
                height: 0.0,
                shape: NodeShape::SingleNode,
                parent: None,
                length: None,
                depth: None,
                gc_content: None,
                is_repeat: None,
                gc_color: None,
                repeat_color: None,
                hidden: false,
                tentative: false,
            });
        }
    }

    pub fn remove_bounding_box_anchors(&mut self) {
        self.graph.remove_node("bottom_left");
        self.graph.remove_node("top_right");
    }

    fn cluster_geometry(&self, left: f64, bottom: f64, right: f64, top: f64) -> (Point, f64, f64) {
        let delta = self.config.rotation_delta();
        let bl = transform_point(left, bottom, self.bbox, delta);
        let tr = transform_point(right, top, self.bbox, delta);
        let pos = Point::new((bl.x + tr.x) / 2.0, (bl.y + tr.y) / 2.0);
        (pos, (tr.x - bl.x).abs(), (tr.y - bl.y).abs())
    }

    // Collapsed dimensions come from the layout tool's collapsed pass, in
    // inches, sideways like node extents. Old databases lack them.
    fn collapsed_dims(w: Option<f64>, h: Option<f64>) -> (f64, f64) {
        match (w, h) {
            (Some(w), Some(h)) => (INCHES_TO_PIXELS * h, INCHES_TO_PIXELS * w),
            _ => (2.0 * INCHES_TO_PIXELS, 2.0 * INCHES_TO_PIXELS),
        }
    }

    // Renders a structural-pattern cluster; returns its id and center.
    pub fn render_cluster(&mut self, row: &ClusterRow) -> Result<(String, Point)> {
        let (pos, w, h) = self.cluster_geometry(row.left, row.bottom, row.right, row.top);
        let (cw, ch) = Self::collapsed_dims(row.w, row.h);
        self.component_keys.push(row.id.clone());
        self.graph.add_cluster(ClusterElement {
            id: row.id.clone(),
            kind: row.kind,
            pos,
            width: w,
            height: h,
            collapsed_width: cw,
            collapsed_height: ch,
            parent: None,
            collapsed: false,
            interior_node_count: None,
            descendant_count: 0,
            length: row.length,
            incoming: HashMap::new(),
            outgoing: HashMap::new(),
            interior_nodes: Vec::new(),
            interior_edges: Vec::new(),
            descendants: None,
            singlenode_ids: Vec::new(),
            virtual_edge_ids: Vec::new(),
        });
        self.uncollapsed.insert(row.id.clone());
        Ok((row.id.clone(), pos))
    }

    pub fn render_bicomponent(&mut self, row: &BicomponentRow) -> Result<(String, Point)> {
        let implicit = self.config.spqr_mode == SpqrMode::Implicit;
        let (l, b, r, t) = if implicit {
            (row.i_left, row.i_bottom, row.i_right, row.i_top)
        } else {
            (row.left, row.bottom, row.right, row.top)
        };
        let (pos, w, h) = self.cluster_geometry(l, b, r, t);
        let id = row.cluster_id();
        self.graph.add_cluster(ClusterElement {
            id: id.clone(),
            kind: crate::model::ClusterKind::Bicomponent,
            pos,
            width: w,
            height: h,
            collapsed_width: w,
            collapsed_height: h,
            parent: None,
            collapsed: false,
            // Implicit-mode bicomponents have no fixed interior count;
            // their contents grow as trees are expanded.
            interior_node_count: (!implicit).then_some(row.node_count),
            descendant_count: 0,
            length: None,
            incoming: HashMap::new(),
            outgoing: HashMap::new(),
            interior_nodes: Vec::new(),
            interior_edges: Vec::new(),
            descendants: None,
            singlenode_ids: Vec::new(),
            virtual_edge_ids: Vec::new(),
        });
        if implicit {
            self.bicomp_visible.entry(id.clone()).or_default();
        }
        Ok((id, pos))
    }

    // Metanodes start collapsed: a freshly drawn SPQR component shows each
    // tree as its root only.
    pub fn render_metanode(&mut self, row: &MetanodeRow) -> Result<(String, Point)> {
        let explicit = self.config.spqr_mode == SpqrMode::Explicit;
        let (l, b, r, t) = if explicit {
            (row.left, row.bottom, row.right, row.top)
        } else {
            (row.i_left, row.i_bottom, row.i_right, row.i_top)
        };
        let (pos, w, h) = self.cluster_geometry(l, b, r, t);
        let parent = explicit.then(|| format!("I{}", row.parent_bicomponent_id_num));
        self.graph.add_cluster(ClusterElement {
            id: row.metanode_id.clone(),
            kind: row.kind,
            pos,
            width: w,
            height: h,
            collapsed_width: w,
            collapsed_height: h,
            parent,
            collapsed: true,
            interior_node_count: Some(row.node_count),
            descendant_count: row.descendant_metanode_count,
            length: None,
            incoming: HashMap::new(),
            outgoing: HashMap::new(),
            interior_nodes: Vec::new(),
            interior_edges: Vec::new(),
            descendants: None,
            singlenode_ids: Vec::new(),
            virtual_edge_ids: Vec::new(),
        });
        Ok((row.metanode_id.clone(), pos))
    }

    // Renders an assembly edge. In the SPQR view edges draw as plain
    // straight curves (skeleton geometry is simple enough that control
    // data buys nothing); in the regular view the control points run the
    // full parameterization. Returns the new edge id, or None when the
    // edge is skipped (implicit-mode virtual edge whose parent metanode is
    // not visible).
    pub fn render_edge(
        &mut self,
        row: &EdgeRow,
        id_remap: &HashMap<String, String>,
    ) -> Result<Option<u32>> {
        if self.config.mode == ViewMode::Spqr {
            return self.render_single_edge(row, id_remap);
        }

        let source = row.source_id.clone();
        let target = row.target_id.clone();
        if let Some(m) = row.multiplicity {
            self.edge_weights.push(m);
        }
        if let Some(pc) = &row.parent_cluster_id {
            self.ele_parent
                .insert(format!("{}->{}", source, target), pc.clone());
        }
        let thickness = MIN_EDGE_THICKNESS + row.thickness * EDGE_THICKNESS_RANGE;
        let outlier = match row.is_outlier {
            1 => Some(Outlier::High),
            -1 => Some(Outlier::Low),
            _ => None,
        };

        // Self loop: the chord is a point, so the control-point math is
        // undefined. Draw the basic curve and move on.
        let curve = if source == target {
            CurveDescriptor::Straight
        } else {
            let src_pos = *self
                .node_pos
                .get(&source)
                .ok_or_else(|| Error::MissingEndpoint { id: source.clone() })?;
            let tgt_pos = *self
                .node_pos
                .get(&target)
                .ok_or_else(|| Error::MissingEndpoint { id: target.clone() })?;
            let points = self.parse_control_points(&row.control_point_string, &source, &target)?;
            parameterize_curve(&points, src_pos, tgt_pos)
        };
        trace!(source = %source, target = %target, parameterized = curve.is_parameterized(), "edge rendered");

        let ix = self.graph.add_edge(EdgeElement {
            source,
            target,
            display_source: None,
            display_target: None,
            curve,
            straightened: false,
            reduced: false,
            thickness,
            outlier,
            oriented: true,
            is_virtual: false,
            multiplicity: row.multiplicity,
            orientation: row.orientation.clone(),
            mean: row.mean,
            stdev: row.stdev,
            hidden: false,
            culled: false,
        });
        Ok(Some(ix))
    }

    fn render_single_edge(
        &mut self,
        row: &EdgeRow,
        id_remap: &HashMap<String, String>,
    ) -> Result<Option<u32>> {
        let mut source = row.source_id.clone();
        let mut target = row.target_id.clone();
        let mut is_virtual = false;
        if let Some(mn_id) = &row.parent_metanode_id {
            // Skeleton edges address skeleton nodes, which render under
            // suffixed ids unless the implicit dedup already has them
            // visible elsewhere.
            source = id_remap
                .get(&source)
                .cloned()
                .unwrap_or_else(|| format!("{}_{}", source, mn_id));
            target = id_remap
                .get(&target)
                .cloned()
                .unwrap_or_else(|| format!("{}_{}", target, mn_id));
            // Virtual edges only occur inside metanode skeletons.
            is_virtual = row.is_virtual;
        }

        let mut record_on: Option<u32> = None;
        if self.config.spqr_mode == SpqrMode::Implicit && is_virtual {
            let parent = row.parent_metanode_id.as_deref().unwrap_or("");
            match self.graph.cluster_ix(parent) {
                // The parent metanode was inlined away; its virtual edges
                // go with it.
                None => return Ok(None),
                Some(ix) => record_on = Some(ix),
            }
        }

        let ix = self.graph.add_edge(EdgeElement {
            source,
            target,
            display_source: Some(row.source_id.clone()),
            display_target: Some(row.target_id.clone()),
            curve: CurveDescriptor::Straight,
            straightened: false,
            reduced: false,
            thickness: MAX_EDGE_THICKNESS,
            outlier: None,
            oriented: false,
            is_virtual,
            multiplicity: None,
            orientation: None,
            mean: None,
            stdev: None,
            hidden: false,
            culled: false,
        });
        if let Some(cix) = record_on {
            if let Some(c) = self.graph.cluster_mut(cix) {
                c.virtual_edge_ids.push(ix);
            }
        }
        Ok(Some(ix))
    }

    // Edges between metanodes of one SPQR tree. Endpoint positions come
    // from the caller (the centers of just-rendered descendant metanodes),
    // not from the contig position index.
    pub fn render_metanode_edge(
        &mut self,
        row: &MetanodeEdgeRow,
        positions: &HashMap<String, Point>,
    ) -> Result<u32> {
        let source = row.source_metanode_id.clone();
        let target = row.target_metanode_id.clone();
        let src_pos = *positions
            .get(&source)
            .ok_or_else(|| Error::MissingEndpoint { id: source.clone() })?;
        let tgt_pos = *positions
            .get(&target)
            .ok_or_else(|| Error::MissingEndpoint { id: target.clone() })?;
        let curve = if source == target || src_pos == tgt_pos {
            CurveDescriptor::Straight
        } else {
            let points = self.parse_control_points(&row.control_point_string, &source, &target)?;
            parameterize_curve(&points, src_pos, tgt_pos)
        };
        let thickness = MIN_EDGE_THICKNESS + 0.5 * EDGE_THICKNESS_RANGE;
        Ok(self.graph.add_edge(EdgeElement {
            source,
            target,
            display_source: None,
            display_target: None,
            curve,
            straightened: false,
            reduced: false,
            thickness,
            outlier: None,
            oriented: true,
            is_virtual: false,
            multiplicity: None,
            orientation: None,
            mean: None,
            stdev: None,
            hidden: false,
            culled: false,
        }))
    }
}
