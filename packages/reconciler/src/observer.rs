//! # Observer Feedback
//!
//! Turns mutations made to the live tree by anything other than the
//! applier into patches for the shared queue.
//!
//! Each patch describes the state the tree is already in, so applying it is
//! a replay:
//!
//! - an attribute record becomes an attributes patch carrying the current
//!   value (`None` when the attribute is gone)
//! - a character data record becomes a text patch with the current text
//! - an added child still under its recorded parent becomes an indexed
//!   insert at its current position
//! - a removed child that is no longer reachable becomes a remove patch,
//!   which the applier skips as dangling
//!
//! Records whose target has since been freed produce nothing.

use crate::live::{LiveTree, MutationRecord, NodeId};
use crate::patch::Patch;
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Default)]
pub struct Observer {
    roots: BTreeSet<NodeId>,
}

impl Observer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching the subtree under `node`
    pub fn observe(&mut self, tree: &mut LiveTree, node: NodeId) -> bool {
        if !tree.observe(node) {
            return false;
        }
        debug!(%node, "Observing subtree");
        self.roots.insert(node)
    }

    pub fn unobserve(&mut self, tree: &mut LiveTree, node: NodeId) -> bool {
        tree.unobserve(node);
        self.roots.remove(&node)
    }

    pub fn is_observing(&self, node: NodeId) -> bool {
        self.roots.contains(&node)
    }

    /// Stop watching everything and drop unread records
    pub fn disconnect(&mut self, tree: &mut LiveTree) {
        self.roots.clear();
        tree.unobserve_all();
    }

    /// Take pending records from the tree and translate them
    pub fn collect(&mut self, tree: &mut LiveTree) -> Vec<Patch> {
        if !tree.has_records() {
            return Vec::new();
        }
        self.roots.retain(|root| tree.contains(*root));

        let records = tree.take_records();
        let patches: Vec<Patch> = records
            .iter()
            .flat_map(|record| translate(tree, record))
            .collect();
        debug!(records = records.len(), patches = patches.len(), "Translated mutation records");
        patches
    }
}

pub fn translate(tree: &LiveTree, record: &MutationRecord) -> Vec<Patch> {
    match record {
        MutationRecord::Attributes { target, name } => {
            if tree.element(*target).is_none() {
                return Vec::new();
            }
            vec![Patch::set_attribute(
                *target,
                name,
                tree.read_attr(*target, name),
            )]
        }
        MutationRecord::CharacterData { target } => tree
            .text(*target)
            .map(|text| Patch::text(*target, text))
            .into_iter()
            .collect(),
        MutationRecord::ChildList {
            target,
            added,
            removed,
        } => {
            let mut patches = Vec::new();
            for node in removed {
                if !tree.is_reachable(*node) {
                    patches.push(Patch::remove(*node));
                }
            }
            for node in added {
                if tree.parent(*node) != Some(*target) {
                    continue;
                }
                if let Some(index) = tree.index_of(*node) {
                    patches.push(Patch::insert_at(*target, index, *node));
                }
            }
            patches
        }
    }
}
