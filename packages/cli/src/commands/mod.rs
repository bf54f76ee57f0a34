pub mod diff;
pub mod reconcile;

pub use diff::{diff, DiffArgs};
pub use reconcile::{reconcile, ReconcileArgs};

use anyhow::{Context, Result};
use arbor_reconciler::VNode;
use std::fs;
use std::path::Path;

/// Read a VNode document (`{ "type": ..., "props": ..., "children": [...] }`)
pub fn read_vnode(path: &Path) -> Result<VNode> {
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&source)
        .with_context(|| format!("{} is not a valid VNode document", path.display()))
}
