use thiserror::Error;

// Fatal conditions surfaced by the rendering pipeline. All of these
// indicate a corrupt layout database or a scheduler ordering bug rather
// than anything recoverable; callers log and abort the draw.
#[derive(Debug, Error)]
pub enum Error {
    // The control-point string must hold two coordinates per point.
    #[error("control point string for edge {source_id} -> {target_id} has an odd coordinate count")]
    OddControlPointCount { source_id: String, target_id: String },

    #[error("control point string for edge {source_id} -> {target_id} holds a non-numeric token")]
    BadControlPoint { source_id: String, target_id: String },

    #[error("edge endpoint {id} is not present in the position index")]
    MissingEndpoint { id: String },

    #[error("no component with size rank {rank}")]
    MissingComponent { rank: u32 },

    #[error("unknown element id {id}")]
    UnknownElement { id: String },

    #[error("layout source error: {0}")]
    Layout(String),
}

pub type Result<T> = std::result::Result<T, Error>;
