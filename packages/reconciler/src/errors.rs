//! Error types for the reconciler
//!
//! None of these reach producers calling `queue_patch` or `flush`. They are
//! logged and counted in `RenderStats`.

use crate::live::NodeId;
use crate::patch::PatchKind;
use crate::renderer::MountId;
use thiserror::Error;

/// A patch is missing a field its kind requires
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("{kind:?} patch is missing required field `{field}`")]
    MissingField { kind: PatchKind, field: &'static str },

    #[error("Unrecognized patch kind")]
    UnknownKind,
}

/// Failure while mutating the live tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("Node {0} is not reachable from a root")]
    DanglingTarget(NodeId),

    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {0} is a root and cannot be detached")]
    RootNode(NodeId),

    #[error("Moving {node} under {parent} would create a cycle")]
    CycleDetected { node: NodeId, parent: NodeId },

    #[error("Node {0} has no parent")]
    Detached(NodeId),
}

impl ApplyError {
    /// Dangling references are expected replays, not failures
    pub fn is_dangling(&self) -> bool {
        matches!(self, ApplyError::DanglingTarget(_))
    }
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Failed to encode batch: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Worker optimization failed: {0}")]
    Remote(String),

    #[error("Worker thread disconnected")]
    Disconnected,

    #[error("Worker did not answer within {0:?}")]
    Timeout(std::time::Duration),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failure of a synchronous renderer entry point (`mount`, `render`)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("No mount with id {0}")]
    UnknownMount(MountId),

    #[error("Renderer has been destroyed")]
    Destroyed,

    #[error(transparent)]
    Apply(#[from] ApplyError),
}

/// Failure talking to a [`RenderLoop`](crate::runtime::RenderLoop)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Render loop has stopped")]
    Closed,

    #[error(transparent)]
    Render(#[from] RenderError),
}
