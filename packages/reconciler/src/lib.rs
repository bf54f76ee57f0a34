//! # Arbor Reconciler
//!
//! Incremental reconciliation of a live UI tree.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────┐   ┌───────────────────────┐
//! │ differ: VNode × VNode │   │ observer: external    │
//! │         → patches     │   │ mutations → patches   │
//! └───────────────────────┘   └───────────────────────┘
//!             ↓                           ↓
//! ┌─────────────────────────────────────────────────────┐
//! │ renderer: patch queue + scheduler                   │
//! │  - frame-aligned or timer drains                    │
//! │  - at most max_batch_size patches per drain         │
//! └─────────────────────────────────────────────────────┘
//!                           ↓
//! ┌─────────────────────────────────────────────────────┐
//! │ optimizer: merge per target, sort by kind priority  │
//! │  (optionally on the worker thread)                  │
//! └─────────────────────────────────────────────────────┘
//!                           ↓
//! ┌─────────────────────────────────────────────────────┐
//! │ applier: fail-soft writes to the live tree          │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use arbor_reconciler::{Renderer, RendererConfig, VNode};
//!
//! let mut renderer = Renderer::new(RendererConfig::default())?;
//! let body = renderer.tree_mut().create_root("body");
//!
//! let mount = renderer.mount(body, VNode::new("p").with_text("hello"))?;
//! renderer.render(mount, VNode::new("p").with_text("world"))?;
//!
//! // Normally the host calls `on_frame`; flush drains right away
//! renderer.flush();
//! println!("{:?}", renderer.stats());
//! ```

pub mod applier;
pub mod config;
pub mod differ;
pub mod errors;
pub mod live;
pub mod observer;
pub mod optimizer;
pub mod patch;
pub mod renderer;
pub mod runtime;
pub mod scheduler;
pub mod stats;
pub mod vnode;
pub mod worker;

#[cfg(test)]
mod tests_pipeline;

pub use applier::{apply_patches, ApplyReport};
pub use config::RendererConfig;
pub use differ::{diff, diff_props, Anchor, Differ};
pub use errors::{ApplyError, ConfigError, PatchError, RenderError, RuntimeError, WorkerError};
pub use live::{LiveTree, MutationRecord, NodeData, NodeId};
pub use observer::Observer;
pub use optimizer::{merge_patches, optimize_patches};
pub use patch::{AttrKind, AttrMap, AttrUpdate, NewNode, Op, Patch, PatchKind};
pub use renderer::{MountId, Renderer};
pub use runtime::{RenderLoop, RendererHandle};
pub use stats::RenderStats;
pub use vnode::{PropValue, Props, VChild, VNode};
