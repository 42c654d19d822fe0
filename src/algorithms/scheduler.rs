// Chunked, cooperatively-yielding component drawing. Drawing tens of
// thousands of elements in one shot would starve the host's event loop,
// so the traversal advances in chunks sized at a fixed fraction of the
// component's estimated work (nodes count 1 unit, edges 0.5) and reports
// progress at each boundary. The task is finite and not restartable; a
// fresh draw builds a fresh task over a freshly reset session.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, trace};

use crate::algorithms::collapse;
use crate::error::Result;
use crate::geometry::tolerance::CHUNK_FREQ_FRACTION;
use crate::layout::{
    BicomponentRow, ClusterRow, EdgeRow, LayoutSource, MetanodeRow, NodeRow,
};
use crate::session::{Session, SpqrMode, ViewConfig, ViewMode};

#[derive(Clone, Debug, PartialEq)]
pub enum DrawStatus {
    Progress { percent: f64 },
    Finished(DrawSummary),
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawSummary {
    pub nodes_drawn: u64,
    pub edges_drawn: u64,
    pub clusters_drawn: u64,
    // Whether the component has anything to collapse; hosts use this to
    // enable the collapse controls.
    pub has_clusters: bool,
}

#[derive(Debug)]
enum Stage {
    Clusters,
    Nodes,
    Edges,
    Done,
}

#[derive(Debug)]
pub struct DrawTask<'a> {
    session: &'a mut Session,
    stage: Stage,
    patterns: VecDeque<ClusterRow>,
    bicomponents: VecDeque<BicomponentRow>,
    metanodes: VecDeque<MetanodeRow>,
    nodes: VecDeque<NodeRow>,
    edges: VecDeque<EdgeRow>,
    // Work bookkeeping in half units so edge steps stay integral.
    work_half: u64,
    total_half: u64,
    chunk_half: u64,
    nodes_drawn: u64,
    edges_drawn: u64,
    clusters_drawn: u64,
    has_clusters: bool,
    summary: Option<DrawSummary>,
}

impl<'a> DrawTask<'a> {
    // Resets the session for the component at `rank` and stages its rows.
    // The previous component's render state is destroyed unconditionally;
    // there is no partial reuse and no mid-draw cancellation beyond
    // dropping the task.
    pub fn new<S: LayoutSource + ?Sized>(
        session: &'a mut Session,
        source: &S,
        rank: u32,
        config: ViewConfig,
    ) -> Result<Self> {
        let has_repeat_info = source
            .summary()
            .map(|s| s.has_repeat_info)
            .unwrap_or(false);
        let spqr = config.mode == ViewMode::Spqr;
        let implicit = spqr && config.spqr_mode == SpqrMode::Implicit;

        let bbox;
        let node_count;
        let edge_count;
        let mut patterns = VecDeque::new();
        let mut bicomponents = VecDeque::new();
        let mut metanodes = VecDeque::new();
        let nodes;
        let edges;
        if spqr {
            let comp = source.spqr_component(rank)?;
            bbox = if implicit { comp.i_bbox } else { comp.bbox };
            // Compressed counts describe the initial all-collapsed drawing,
            // which is exactly the work this task performs.
            node_count = comp.compressed_node_count;
            edge_count = comp.compressed_edge_count;
            bicomponents = source.bicomponents(rank)?.into();
            let root_ids: Vec<String> = bicomponents
                .iter()
                .map(|b| b.root_metanode_id.clone())
                .collect();
            metanodes = source.metanodes(rank, &root_ids)?.into();
            nodes = VecDeque::from(source.top_singlenodes(rank, &root_ids)?);
            edges = VecDeque::from(source.top_singleedges(rank, &root_ids)?);
        } else {
            let comp = source.component(rank)?;
            bbox = comp.bbox;
            node_count = comp.node_count;
            edge_count = comp.edge_count;
            patterns = source.clusters(rank)?.into();
            nodes = VecDeque::from(source.nodes(rank)?);
            edges = VecDeque::from(source.edges(rank)?);
        }

        session.reset_for_draw(config, bbox, has_repeat_info);

        let total_half = 2 * node_count + edge_count;
        let chunk = ((CHUNK_FREQ_FRACTION * (node_count as f64 + 0.5 * edge_count as f64))
            .floor() as u64)
            .max(1);
        let has_clusters = if spqr {
            !bicomponents.is_empty()
        } else {
            !patterns.is_empty()
        };
        debug!(
            rank,
            node_count,
            edge_count,
            chunk_every = chunk,
            "draw task staged"
        );
        Ok(DrawTask {
            session,
            stage: Stage::Clusters,
            patterns,
            bicomponents,
            metanodes,
            nodes,
            edges,
            work_half: 0,
            total_half: total_half.max(1),
            chunk_half: 2 * chunk,
            nodes_drawn: 0,
            edges_drawn: 0,
            clusters_drawn: 0,
            has_clusters,
            summary: None,
        })
    }

    fn percent(&self) -> f64 {
        (self.work_half as f64 / self.total_half as f64 * 100.0).min(100.0)
    }

    fn at_chunk_boundary(&self) -> bool {
        self.work_half % self.chunk_half == 0
    }

    // Advances until the next chunk boundary (or the end) and reports.
    // Hosts yield to their event loop between calls.
    pub fn step(&mut self) -> Result<DrawStatus> {
        if let Some(summary) = &self.summary {
            return Ok(DrawStatus::Finished(summary.clone()));
        }
        self.session.graph.begin_batch();
        let status = self.advance();
        self.session.graph.end_batch();
        status
    }

    fn advance(&mut self) -> Result<DrawStatus> {
        loop {
            match self.stage {
                Stage::Clusters => {
                    // Compound nodes must exist before anything that nests
                    // under or attaches to them. They carry no work units.
                    while let Some(row) = self.patterns.pop_front() {
                        self.session.render_cluster(&row)?;
                        self.clusters_drawn += 1;
                    }
                    while let Some(row) = self.bicomponents.pop_front() {
                        self.session.render_bicomponent(&row)?;
                        self.clusters_drawn += 1;
                    }
                    while let Some(row) = self.metanodes.pop_front() {
                        self.session.render_metanode(&row)?;
                        self.clusters_drawn += 1;
                    }
                    self.session.render_bounding_box_anchors();
                    self.stage = Stage::Nodes;
                }
                Stage::Nodes => match self.nodes.pop_front() {
                    Some(row) => {
                        let display_id = match (&self.session.config.mode, &row.parent_metanode_id)
                        {
                            (ViewMode::Spqr, Some(mn)) => format!("{}_{}", row.id, mn),
                            _ => row.id.clone(),
                        };
                        self.session.render_node(&row, &display_id)?;
                        self.nodes_drawn += 1;
                        self.work_half += 2;
                        if self.at_chunk_boundary() {
                            trace!(percent = self.percent(), "draw chunk boundary");
                            return Ok(DrawStatus::Progress {
                                percent: self.percent(),
                            });
                        }
                    }
                    None => self.stage = Stage::Edges,
                },
                Stage::Edges => match self.edges.pop_front() {
                    Some(row) => {
                        self.session.render_edge(&row, &HashMap::new())?;
                        self.edges_drawn += 1;
                        self.work_half += 1;
                        if self.at_chunk_boundary() {
                            trace!(percent = self.percent(), "draw chunk boundary");
                            return Ok(DrawStatus::Progress {
                                percent: self.percent(),
                            });
                        }
                    }
                    None => {
                        // Everything is rendered; the cluster edge maps can
                        // finally be computed from the live graph.
                        collapse::init_clusters_impl(self.session);
                        self.stage = Stage::Done;
                        let summary = DrawSummary {
                            nodes_drawn: self.nodes_drawn,
                            edges_drawn: self.edges_drawn,
                            clusters_drawn: self.clusters_drawn,
                            has_clusters: self.has_clusters,
                        };
                        debug!(
                            nodes = summary.nodes_drawn,
                            edges = summary.edges_drawn,
                            clusters = summary.clusters_drawn,
                            "draw finished"
                        );
                        self.summary = Some(summary.clone());
                        return Ok(DrawStatus::Finished(summary));
                    }
                },
                Stage::Done => {
                    return Ok(DrawStatus::Finished(DrawSummary {
                        nodes_drawn: self.nodes_drawn,
                        edges_drawn: self.edges_drawn,
                        clusters_drawn: self.clusters_drawn,
                        has_clusters: self.has_clusters,
                    }));
                }
            }
        }
    }

    // Drives the task to the end in one call, forwarding each progress
    // report to `on_progress`.
    pub fn run<F: FnMut(f64)>(mut self, mut on_progress: F) -> Result<DrawSummary> {
        loop {
            match self.step()? {
                DrawStatus::Progress { percent } => on_progress(percent),
                DrawStatus::Finished(summary) => return Ok(summary),
            }
        }
    }

    // Convenience for hosts that do not care about progress.
    pub fn run_to_completion(self) -> Result<DrawSummary> {
        self.run(|_| {})
    }
}
