//! # Patch Applier
//!
//! Executes an optimized batch against the live tree.
//!
//! Every patch is applied on its own: a malformed patch or one that fails
//! against the tree is logged and dropped, and the rest of the batch still
//! runs. Nothing is retried.
//!
//! Inserts without an index are deferred and appended per parent in one
//! grouped operation once every other patch has run.
//!
//! All writes happen with mutation recording suppressed, so an observed
//! subtree never feeds the engine's own work back into the queue.

use crate::errors::ApplyError;
use crate::live::{LiveTree, NodeId};
use crate::patch::{AttrMap, NewNode, Op, Patch};
use tracing::{debug, warn};

/// Outcome counters for one applied batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub applied: usize,
    /// Malformed patches and patches whose references dangle
    pub skipped: usize,
    pub failed: usize,
    /// Discrete tree operations performed
    pub mutations: usize,
}

pub fn apply_patches(tree: &mut LiveTree, patches: &[Patch]) -> ApplyReport {
    tree.with_records_suppressed(|tree| {
        let mut applier = Applier {
            tree,
            report: ApplyReport::default(),
            deferred: Vec::new(),
        };
        for patch in patches {
            applier.apply(patch);
        }
        applier.flush_deferred();
        applier.report
    })
}

struct Applier<'t, 'p> {
    tree: &'t mut LiveTree,
    report: ApplyReport,
    deferred: Vec<(NodeId, Vec<&'p Patch>)>,
}

impl<'t, 'p> Applier<'t, 'p> {
    fn apply(&mut self, patch: &'p Patch) {
        let op = match patch.op() {
            Ok(op) => op,
            Err(err) => {
                debug!(error = %err, ?patch, "Skipping malformed patch");
                self.report.skipped += 1;
                return;
            }
        };

        if let Op::Insert {
            parent,
            index: None,
            ..
        } = op
        {
            self.defer(parent, patch);
            return;
        }

        match self.apply_op(op) {
            Ok(()) => {
                self.report.applied += 1;
                self.report.mutations += 1;
            }
            Err(err) => self.fail(patch, err),
        }
    }

    fn apply_op(&mut self, op: Op<'_>) -> Result<(), ApplyError> {
        match op {
            Op::Insert {
                parent,
                index,
                node,
            } => {
                self.ensure_parent(parent)?;
                let child = self.resolve(node)?;
                self.tree
                    .insert_child(parent, index.unwrap_or(usize::MAX), child)?;
            }
            Op::Update { target, node } => {
                self.ensure_reachable(target)?;
                if self.tree.is_root(target) {
                    return Err(ApplyError::RootNode(target));
                }
                let replacement = self.resolve(node)?;
                self.tree.replace(target, replacement)?;
            }
            Op::Remove { target } => {
                self.ensure_reachable(target)?;
                self.tree.remove(target)?;
            }
            Op::Move {
                target,
                parent,
                index,
            } => {
                self.ensure_reachable(target)?;
                self.ensure_parent(parent)?;
                let position = self.tree.place_child(parent, index, target)?;
                if position != index {
                    debug!(%target, %parent, requested = index, position, "Clamped move index");
                }
            }
            Op::Attributes { target, attributes } => {
                self.ensure_reachable(target)?;
                self.write_attributes(target, attributes)?;
            }
            Op::Text { target, value } => {
                self.ensure_reachable(target)?;
                self.tree.set_text(target, value)?;
            }
        }
        Ok(())
    }

    /// Removals go first so `class` then `className` style pairs settle
    /// on the value being set.
    fn write_attributes(&mut self, target: NodeId, attributes: &AttrMap) -> Result<(), ApplyError> {
        if self.tree.element(target).is_none() {
            return Err(ApplyError::NotAnElement(target));
        }

        let removals = attributes.iter().filter(|(_, update)| update.value.is_none());
        let sets = attributes.iter().filter(|(_, update)| update.value.is_some());
        for (name, update) in removals.chain(sets) {
            self.tree
                .write_attr(target, name, update.kind, update.value.as_ref())?;
        }
        Ok(())
    }

    fn defer(&mut self, parent: NodeId, patch: &'p Patch) {
        match self.deferred.iter_mut().find(|(p, _)| *p == parent) {
            Some((_, group)) => group.push(patch),
            None => self.deferred.push((parent, vec![patch])),
        }
    }

    fn flush_deferred(&mut self) {
        for (parent, patches) in std::mem::take(&mut self.deferred) {
            if let Err(err) = self.ensure_parent(parent) {
                for patch in patches {
                    self.fail(patch, err.clone());
                }
                continue;
            }

            let mut children: Vec<NodeId> = Vec::with_capacity(patches.len());
            let mut accepted = 0;
            for patch in patches {
                let Some(node) = patch.new_node.as_ref() else {
                    continue;
                };
                let resolved = self
                    .resolve(node)
                    .and_then(|child| self.tree.check_adopt(parent, child).map(|_| child));
                match resolved {
                    Ok(child) => {
                        if !children.contains(&child) {
                            children.push(child);
                        }
                        accepted += 1;
                    }
                    Err(err) => self.fail(patch, err),
                }
            }

            if children.is_empty() {
                continue;
            }
            match self.tree.append_children(parent, &children) {
                Ok(()) => {
                    self.report.applied += accepted;
                    self.report.mutations += 1;
                }
                Err(err) => {
                    warn!(%parent, error = %err, count = accepted, "Failed to append deferred inserts");
                    self.report.failed += accepted;
                }
            }
        }
    }

    fn resolve(&mut self, node: &NewNode) -> Result<NodeId, ApplyError> {
        match node {
            NewNode::Live(id) if self.tree.contains(*id) => Ok(*id),
            NewNode::Live(id) => Err(ApplyError::DanglingTarget(*id)),
            NewNode::Virtual(child) => Ok(self.tree.materialize(child)),
        }
    }

    fn ensure_reachable(&self, id: NodeId) -> Result<(), ApplyError> {
        if self.tree.is_reachable(id) {
            Ok(())
        } else {
            Err(ApplyError::DanglingTarget(id))
        }
    }

    fn ensure_parent(&self, parent: NodeId) -> Result<(), ApplyError> {
        self.ensure_reachable(parent)?;
        match self.tree.element(parent) {
            Some(_) => Ok(()),
            None => Err(ApplyError::NotAnElement(parent)),
        }
    }

    fn fail(&mut self, patch: &Patch, err: ApplyError) {
        if err.is_dangling() {
            debug!(?patch, error = %err, "Skipping patch with dangling reference");
            self.report.skipped += 1;
        } else {
            warn!(?patch, error = %err, "Failed to apply patch");
            self.report.failed += 1;
        }
    }
}
