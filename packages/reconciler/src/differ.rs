//! # VNode Differ
//!
//! Computes the patches that move a live subtree materialized from `old`
//! to the shape described by `new`.
//!
//! The differ only reads the live tree, to attach `NodeId`s to the patches
//! it emits. Children are compared by index; there is no key based
//! reconciliation, so reordering a list produces a cascade of `text` and
//! `update` patches rather than `move` patches. Producers rely on that
//! cascade for their own state tracking.

use crate::live::{style_declarations, LiveTree, NodeId};
use crate::patch::{AttrKind, AttrMap, AttrUpdate, NewNode, Patch, PatchKind};
use crate::vnode::{PropValue, Props, VChild, VNode};

/// Where a diffed node lives (or would be inserted)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Anchor {
    pub parent: Option<NodeId>,
    pub node: Option<NodeId>,
}

impl Anchor {
    /// Anchor on an existing node, picking up its parent
    pub fn at(tree: &LiveTree, node: NodeId) -> Self {
        Self {
            parent: tree.parent(node),
            node: Some(node),
        }
    }

    /// Anchor on an empty slot under `parent`
    pub fn under(parent: NodeId) -> Self {
        Self {
            parent: Some(parent),
            node: None,
        }
    }
}

pub struct Differ<'t> {
    tree: &'t LiveTree,
}

impl<'t> Differ<'t> {
    pub fn new(tree: &'t LiveTree) -> Self {
        Self { tree }
    }

    /// Diff two optional virtual nodes at `anchor`
    pub fn diff(&self, anchor: Anchor, old: Option<&VNode>, new: Option<&VNode>) -> Vec<Patch> {
        let mut patches = Vec::new();

        match (old, new) {
            (None, Some(node)) => {
                patches.push(insert(anchor.parent, NewNode::from(node.clone())));
            }
            (Some(_), None) => {
                patches.push(targeted(PatchKind::Remove, anchor.node));
            }
            (Some(old_node), Some(new_node)) => {
                self.diff_nodes(anchor.node, old_node, new_node, &mut patches);
            }
            (None, None) => {}
        }

        patches
    }

    /// Index positional child comparison under a live `parent`
    pub fn diff_children(&self, parent: NodeId, old: &[VChild], new: &[VChild]) -> Vec<Patch> {
        let mut patches = Vec::new();
        self.diff_child_list(Some(parent), old, new, &mut patches);
        patches
    }

    fn diff_nodes(&self, node: Option<NodeId>, old: &VNode, new: &VNode, patches: &mut Vec<Patch>) {
        if old.tag != new.tag {
            // Different structural kind - replace wholesale
            patches.push(Patch {
                new_node: Some(NewNode::from(new.clone())),
                ..targeted(PatchKind::Update, node)
            });
            return;
        }

        let attributes = diff_props(&old.props, &new.props);
        if !attributes.is_empty() {
            patches.push(Patch {
                attributes: Some(attributes),
                ..targeted(PatchKind::Attributes, node)
            });
        }

        self.diff_child_list(node, &old.children, &new.children, patches);
    }

    fn diff_child_list(
        &self,
        parent: Option<NodeId>,
        old: &[VChild],
        new: &[VChild],
        patches: &mut Vec<Patch>,
    ) {
        let max_children = old.len().max(new.len());
        for i in 0..max_children {
            let node = parent.and_then(|p| self.tree.child_at(p, i));

            match (old.get(i), new.get(i)) {
                (None, Some(child)) => {
                    patches.push(insert(parent, NewNode::Virtual(child.clone())));
                }
                (Some(_), None) => {
                    patches.push(targeted(PatchKind::Remove, node));
                }
                (Some(VChild::Text(old_text)), Some(VChild::Text(new_text))) => {
                    if old_text != new_text {
                        patches.push(Patch {
                            new_value: Some(new_text.clone()),
                            ..targeted(PatchKind::Text, node)
                        });
                    }
                }
                (Some(VChild::Node(old_node)), Some(VChild::Node(new_node))) => {
                    self.diff_nodes(node, old_node, new_node, patches);
                }
                (Some(_), Some(child)) => {
                    // Text became an element or the other way round
                    patches.push(Patch {
                        new_node: Some(NewNode::Virtual(child.clone())),
                        ..targeted(PatchKind::Update, node)
                    });
                }
                (None, None) => {}
            }
        }
    }
}

/// Diff a mounted node against its next description
pub fn diff(tree: &LiveTree, node: NodeId, old: &VNode, new: &VNode) -> Vec<Patch> {
    Differ::new(tree).diff(Anchor::at(tree, node), Some(old), Some(new))
}

/// Stage changed and dropped props. Dropped keys map to a removal.
pub fn diff_props(old: &Props, new: &Props) -> AttrMap {
    let mut staged = AttrMap::new();

    for (name, value) in new {
        let previous = old.get(name);
        if previous != Some(value) {
            staged.insert(
                name.clone(),
                AttrUpdate::new(name, Some(stage_value(name, previous, value))),
            );
        }
    }

    for name in old.keys() {
        if !new.contains_key(name) {
            staged.insert(name.clone(), AttrUpdate::remove(name));
        }
    }

    // `class` and `className` share one class set: once either is touched,
    // every class key still present is written again, in key order.
    if staged.values().any(|update| update.kind == AttrKind::Class) {
        for (name, value) in new {
            if AttrKind::of(name) == AttrKind::Class {
                staged
                    .entry(name.clone())
                    .or_insert_with(|| AttrUpdate::new(name, Some(value.clone())));
            }
        }
    }

    staged
}

/// Style values merge on apply, so properties dropped since `old` are
/// staged as empty strings to clear them.
fn stage_value(name: &str, old: Option<&PropValue>, new: &PropValue) -> PropValue {
    if AttrKind::of(name) != AttrKind::Style {
        return new.clone();
    }

    let mut delta = style_declarations(new);
    if let Some(old) = old {
        for property in style_declarations(old).into_keys() {
            delta.entry(property).or_default();
        }
    }
    PropValue::Map(delta)
}

fn targeted(kind: PatchKind, target: Option<NodeId>) -> Patch {
    Patch {
        target,
        ..Patch::empty(kind)
    }
}

fn insert(parent: Option<NodeId>, node: NewNode) -> Patch {
    Patch {
        parent,
        new_node: Some(node),
        ..Patch::empty(PatchKind::Insert)
    }
}
