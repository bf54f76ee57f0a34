//! # Patch Optimizer
//!
//! Collapses redundant work in a batch before it is applied:
//!
//! - patches are grouped by `target`; untargeted patches pass through
//! - `attributes` patches in a group merge into one, last write wins per key
//! - only the last `text` patch in a group survives
//! - structural patches (insert, update, remove, move) are never merged
//!
//! The result is stable-sorted by [`PatchKind::priority`].
//!
//! Optimization is a pure function of the batch. The worker offloader runs
//! the same code on a serialized copy and must produce identical output.

use crate::live::NodeId;
use crate::patch::{AttrMap, Patch, PatchKind};
use std::collections::HashMap;

enum Entry {
    Single(Patch),
    Group(NodeId),
}

pub fn optimize_patches(batch: Vec<Patch>) -> Vec<Patch> {
    let mut entries: Vec<Entry> = Vec::with_capacity(batch.len());
    let mut groups: HashMap<NodeId, Vec<Patch>> = HashMap::new();

    for patch in batch {
        match patch.target {
            Some(target) => {
                let group = groups.entry(target).or_default();
                if group.is_empty() {
                    entries.push(Entry::Group(target));
                }
                group.push(patch);
            }
            None => entries.push(Entry::Single(patch)),
        }
    }

    let mut optimized: Vec<Patch> = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Entry::Single(patch) => optimized.push(patch),
            Entry::Group(target) => {
                let group = groups.remove(&target).unwrap_or_default();
                if group.len() > 1 {
                    optimized.extend(merge_patches(group));
                } else {
                    optimized.extend(group);
                }
            }
        }
    }

    optimized.sort_by_key(|patch| patch.kind.priority());
    optimized
}

/// Merge the patches of one target.
///
/// The merged attributes patch takes the slot of the first attributes patch
/// and the surviving text patch keeps its own slot.
pub fn merge_patches(group: Vec<Patch>) -> Vec<Patch> {
    let last_text = group.iter().rposition(is_mergeable_text);

    let mut merged: Vec<Patch> = Vec::with_capacity(group.len());
    let mut attributes_slot: Option<usize> = None;
    let mut attributes = AttrMap::new();

    for (i, patch) in group.into_iter().enumerate() {
        match patch.kind {
            PatchKind::Attributes if patch.attributes.is_some() => {
                if attributes_slot.is_none() {
                    attributes_slot = Some(merged.len());
                    merged.push(patch.clone());
                }
                attributes.extend(patch.attributes.unwrap_or_default());
            }
            PatchKind::Text if is_mergeable_text(&patch) => {
                if Some(i) == last_text {
                    merged.push(patch);
                }
            }
            _ => merged.push(patch),
        }
    }

    if let Some(slot) = attributes_slot {
        merged[slot].attributes = Some(attributes);
    }
    merged
}

fn is_mergeable_text(patch: &Patch) -> bool {
    patch.kind == PatchKind::Text && patch.new_value.is_some()
}
