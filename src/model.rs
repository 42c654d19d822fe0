use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

// Extent of one connected component's layout, in layout units. The layout
// tool puts the origin at the bottom-left corner; render space puts it at
// the top-left, so `height` is needed for every y conversion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    // Per-channel linear interpolation from `self` (t = 0) to `other`
    // (t = 1). Channels round to the nearest integer value.
    pub fn lerp(&self, other: Color, t: f64) -> Color {
        let ch = |a: u8, b: u8| -> u8 {
            let v = t * (b as f64 - a as f64) + a as f64;
            v.round().clamp(0.0, 255.0) as u8
        };
        Color {
            r: ch(self.r, other.r),
            g: ch(self.g, other.g),
            b: ch(self.b, other.b),
        }
    }
}

// How an edge's geometry is described to the render engine. `Parameterized`
// carries, per control point, a signed perpendicular distance from the
// source->target chord and a normalized position along it (0 = at source,
// 1 = at target, outside [0, 1] = before/past the endpoints).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CurveDescriptor {
    Straight,
    Parameterized { dists: Vec<f64>, weights: Vec<f64> },
}

impl CurveDescriptor {
    pub fn is_parameterized(&self) -> bool {
        matches!(self, CurveDescriptor::Parameterized { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeShape {
    UpDir,
    DownDir,
    LeftDir,
    RightDir,
    // SPQR views draw contigs without orientation.
    SingleNode,
}

impl NodeShape {
    // Orientation class for a contig node: the layout's native direction is
    // rotated with the whole view, so the class depends on both the current
    // rotation and whether the contig reads forward.
    pub fn for_rotation(rotation: Rotation, forward: bool) -> NodeShape {
        match rotation {
            Rotation::R0 => {
                if forward {
                    NodeShape::UpDir
                } else {
                    NodeShape::DownDir
                }
            }
            Rotation::R90 => {
                if forward {
                    NodeShape::LeftDir
                } else {
                    NodeShape::RightDir
                }
            }
            Rotation::R180 => {
                if forward {
                    NodeShape::DownDir
                } else {
                    NodeShape::UpDir
                }
            }
            Rotation::R270 => {
                if forward {
                    NodeShape::RightDir
                } else {
                    NodeShape::LeftDir
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusterKind {
    Chain,
    CyclicChain,
    Bubble,
    FrayedRope,
    MiscPattern,
    Bicomponent,
    SeriesMetanode,
    ParallelMetanode,
    RigidMetanode,
}

impl ClusterKind {
    pub fn is_metanode(self) -> bool {
        matches!(
            self,
            ClusterKind::SeriesMetanode
                | ClusterKind::ParallelMetanode
                | ClusterKind::RigidMetanode
        )
    }

    // Bicomponents and metanodes belong to the SPQR view; everything else
    // is a structural pattern in the regular view.
    pub fn is_spqr(self) -> bool {
        self == ClusterKind::Bicomponent || self.is_metanode()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outlier {
    High,
    Low,
}

// A contig node as held by the element graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeElement {
    pub id: String,
    pub label: Option<String>,
    pub pos: Point,
    // Render-space dimensions, px.
    pub width: f64,
    pub height: f64,
    pub shape: NodeShape,
    // Compound-node nesting; SPQR metanodes never become literal parents.
    pub parent: Option<String>,
    pub length: Option<i64>,
    pub depth: Option<f64>,
    pub gc_content: Option<f64>,
    pub is_repeat: Option<bool>,
    pub gc_color: Option<Color>,
    pub repeat_color: Option<Color>,
    pub hidden: bool,
    // Candidate next step during manual path finishing.
    pub tentative: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EdgeElement {
    pub source: String,
    pub target: String,
    // SPQR singleedges keep their un-suffixed endpoint ids for display.
    pub display_source: Option<String>,
    pub display_target: Option<String>,
    // Canonical geometry computed at render time. Survives endpoint
    // rewiring so uncollapsing can restore the curved form.
    pub curve: CurveDescriptor,
    // Endpoint rewiring invalidated the control data; draw as straight.
    pub straightened: bool,
    // Session-wide reduce-to-straight-lines toggle hit this edge.
    pub reduced: bool,
    pub thickness: f64,
    pub outlier: Option<Outlier>,
    pub oriented: bool,
    pub is_virtual: bool,
    pub multiplicity: Option<f64>,
    pub orientation: Option<String>,
    pub mean: Option<f64>,
    pub stdev: Option<f64>,
    pub hidden: bool,
    // Removed by the edge-weight filter; skipped by endpoint restoration.
    pub culled: bool,
}

static STRAIGHT: CurveDescriptor = CurveDescriptor::Straight;

impl EdgeElement {
    // The descriptor the render engine should actually draw with.
    pub fn effective_curve(&self) -> &CurveDescriptor {
        if self.straightened || self.reduced {
            &STRAIGHT
        } else {
            &self.curve
        }
    }
}

// Canonical (source, target) endpoint pair recorded before any rewiring.
pub type EndpointPair = (String, String);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClusterElement {
    pub id: String,
    pub kind: ClusterKind,
    pub pos: Point,
    pub width: f64,
    pub height: f64,
    // Dimensions to use while collapsed (from the layout tool's collapsed
    // rendering pass), px.
    pub collapsed_width: f64,
    pub collapsed_height: f64,
    pub parent: Option<String>,
    pub collapsed: bool,
    pub interior_node_count: Option<u64>,
    pub descendant_count: u64,
    pub length: Option<i64>,
    // Collapse bookkeeping, built once per draw after all elements exist.
    // Keys are edge arena ids; an edge appears in at most one of the two
    // maps, and only if exactly one endpoint is inside the cluster.
    pub incoming: HashMap<u32, EndpointPair>,
    pub outgoing: HashMap<u32, EndpointPair>,
    pub interior_nodes: Vec<u32>,
    pub interior_edges: Vec<u32>,
    // SPQR bookkeeping. `descendants` is discovered on first uncollapse
    // and cached; `singlenode_ids` holds skeleton nodes rendered under
    // this metanode (explicit mode); `virtual_edge_ids` holds synthetic
    // skeleton edges inlined for this metanode (implicit mode).
    pub descendants: Option<Vec<String>>,
    pub singlenode_ids: Vec<String>,
    pub virtual_edge_ids: Vec<u32>,
}
