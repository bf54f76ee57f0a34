//! # Live Tree
//!
//! The mutable render tree the applier writes to.
//!
//! Nodes live in an arena and are addressed by `NodeId`. Freed slots are
//! reused under a new generation, so a stale id held by a patch stays
//! dangling instead of aliasing a newer node. A node is reachable when its parent chain ends at a root
//! created with [`LiveTree::create_root`].
//!
//! Mutations inside observed subtrees are recorded as [`MutationRecord`]s,
//! except while recording is suppressed (the applier runs suppressed so the
//! engine never observes its own writes).

use crate::errors::ApplyError;
use crate::patch::AttrKind;
use crate::vnode::{PropValue, VChild, VNode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Opaque handle to a live node: slot index in the low 32 bits, slot
/// generation in the high 32 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    fn new(index: usize, generation: u32) -> Self {
        NodeId(u64::from(generation) << 32 | index as u64)
    }

    pub fn index(self) -> usize {
        (self.0 & u64::from(u32::MAX)) as usize
    }

    pub fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.generation() {
            0 => write!(f, "#{}", self.index()),
            generation => write!(f, "#{}v{}", self.index(), generation),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementData {
    pub tag: String,
    /// Ordered, deduplicated class names
    pub classes: Vec<String>,
    pub style: BTreeMap<String, String>,
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Default)]
struct Entry {
    generation: u32,
    slot: Option<Slot>,
}

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    root: bool,
}

/// A change observed inside a watched subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord {
    Attributes {
        target: NodeId,
        name: String,
    },
    ChildList {
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    CharacterData {
        target: NodeId,
    },
}

impl MutationRecord {
    pub fn target(&self) -> NodeId {
        match self {
            MutationRecord::Attributes { target, .. }
            | MutationRecord::ChildList { target, .. }
            | MutationRecord::CharacterData { target } => *target,
        }
    }
}

#[derive(Debug, Default)]
pub struct LiveTree {
    entries: Vec<Entry>,
    free: Vec<usize>,
    observed: BTreeSet<NodeId>,
    records: Vec<MutationRecord>,
    quiet: usize,
}

impl LiveTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, data: NodeData, root: bool) -> NodeId {
        let slot = Slot {
            data,
            parent: None,
            children: Vec::new(),
            root,
        };
        match self.free.pop() {
            Some(index) => {
                let entry = &mut self.entries[index];
                entry.slot = Some(slot);
                NodeId::new(index, entry.generation)
            }
            None => {
                self.entries.push(Entry {
                    generation: 0,
                    slot: Some(slot),
                });
                NodeId::new(self.entries.len() - 1, 0)
            }
        }
    }

    fn entry(&self, id: NodeId) -> Option<&Entry> {
        self.entries
            .get(id.index())
            .filter(|entry| entry.generation == id.generation())
    }

    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.entry(id)?.slot.as_ref()
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot> {
        self.entries
            .get_mut(id.index())
            .filter(|entry| entry.generation == id.generation())?
            .slot
            .as_mut()
    }

    /// Create a root element; everything attached below it is reachable
    pub fn create_root(&mut self, tag: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Element(element(tag)), true)
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Element(element(tag)), false)
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(content.into()), false)
    }

    /// Build a detached subtree from a virtual child
    pub fn materialize(&mut self, child: &VChild) -> NodeId {
        match child {
            VChild::Text(text) => self.create_text(text.clone()),
            VChild::Node(node) => self.materialize_node(node),
        }
    }

    pub fn materialize_node(&mut self, node: &VNode) -> NodeId {
        let mut data = element(node.tag.clone());
        for (name, value) in &node.props {
            write_attr_data(&mut data, name, AttrKind::of(name), Some(value));
        }

        let id = self.alloc(NodeData::Element(data), false);
        let children: Vec<NodeId> = node.children.iter().map(|c| self.materialize(c)).collect();
        for child in &children {
            if let Some(slot) = self.slot_mut(*child) {
                slot.parent = Some(id);
            }
        }
        if let Some(slot) = self.slot_mut(id) {
            slot.children = children;
        }
        id
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.slot(id).map(|slot| &slot.data)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.get(id)? {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.get(id)? {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map(|slot| slot.children.as_slice()).unwrap_or(&[])
    }

    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children(parent).get(index).copied()
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.slot(id).map(|slot| slot.root).unwrap_or(false)
    }

    /// True when the node's parent chain ends at a root
    pub fn is_reachable(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            let Some(slot) = self.slot(current) else {
                return false;
            };
            if slot.root {
                return true;
            }
            match slot.parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// True when `ancestor` is `node` or one of its ancestors
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Number of nodes alive in the arena
    pub fn len(&self) -> usize {
        self.entries.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check that `child` may be placed under `parent`
    pub fn check_adopt(&self, parent: NodeId, child: NodeId) -> Result<(), ApplyError> {
        match self.get(parent) {
            None => return Err(ApplyError::DanglingTarget(parent)),
            Some(NodeData::Text(_)) => return Err(ApplyError::NotAnElement(parent)),
            Some(NodeData::Element(_)) => {}
        }
        if !self.contains(child) {
            return Err(ApplyError::DanglingTarget(child));
        }
        if self.is_root(child) {
            return Err(ApplyError::RootNode(child));
        }
        if self.is_ancestor(child, parent) {
            return Err(ApplyError::CycleDetected {
                node: child,
                parent,
            });
        }
        Ok(())
    }

    /// Insert `child` before the node currently at `index` under `parent`.
    ///
    /// An attached child is moved. An index past the end appends. Returns
    /// the final position.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<usize, ApplyError> {
        self.check_adopt(parent, child)?;
        let before = self.child_at(parent, index).filter(|c| *c != child);

        let previous = self.unlink(child);
        let position = match before {
            Some(sibling) => self
                .children(parent)
                .iter()
                .position(|c| *c == sibling)
                .unwrap_or(self.children(parent).len()),
            None if matches!(previous, Some((p, at)) if p == parent && at == index) => index,
            None => self.children(parent).len(),
        };

        self.link(parent, position, child);
        self.record_move(previous, parent, child);
        Ok(position)
    }

    /// Put `child` at final position `index` under `parent`, clamped to the
    /// child count after the child has been detached.
    pub fn place_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<usize, ApplyError> {
        self.check_adopt(parent, child)?;
        let previous = self.unlink(child);
        let position = index.min(self.children(parent).len());

        self.link(parent, position, child);
        self.record_move(previous, parent, child);
        Ok(position)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), ApplyError> {
        self.place_child(parent, usize::MAX, child).map(|_| ())
    }

    /// Append several children in one operation with a single record
    pub fn append_children(
        &mut self,
        parent: NodeId,
        children: &[NodeId],
    ) -> Result<(), ApplyError> {
        for child in children {
            self.check_adopt(parent, *child)?;
        }

        for child in children {
            if let Some((old_parent, _)) = self.unlink(*child) {
                self.record(MutationRecord::ChildList {
                    target: old_parent,
                    added: Vec::new(),
                    removed: vec![*child],
                });
            }
            let end = self.children(parent).len();
            self.link(parent, end, *child);
        }

        if !children.is_empty() {
            self.record(MutationRecord::ChildList {
                target: parent,
                added: children.to_vec(),
                removed: Vec::new(),
            });
        }
        Ok(())
    }

    /// Detach a node from its parent, keeping it alive
    pub fn detach(&mut self, id: NodeId) -> Result<(), ApplyError> {
        if !self.contains(id) {
            return Err(ApplyError::DanglingTarget(id));
        }
        if self.is_root(id) {
            return Err(ApplyError::RootNode(id));
        }
        if let Some((parent, _)) = self.unlink(id) {
            self.record(MutationRecord::ChildList {
                target: parent,
                added: Vec::new(),
                removed: vec![id],
            });
        }
        Ok(())
    }

    /// Detach a node and free its whole subtree
    pub fn remove(&mut self, id: NodeId) -> Result<(), ApplyError> {
        self.detach(id)?;
        self.free_subtree(id);
        Ok(())
    }

    /// Put `new` where `old` is and free `old`
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<(), ApplyError> {
        if old == new {
            return Ok(());
        }
        if !self.contains(old) {
            return Err(ApplyError::DanglingTarget(old));
        }
        if self.is_root(old) {
            return Err(ApplyError::RootNode(old));
        }
        let parent = self.parent(old).ok_or(ApplyError::Detached(old))?;
        self.check_adopt(parent, new)?;

        let previous = self.unlink(new);
        if let Some((old_parent, _)) = previous.filter(|(p, _)| *p != parent) {
            self.record(MutationRecord::ChildList {
                target: old_parent,
                added: Vec::new(),
                removed: vec![new],
            });
        }

        let Some(index) = self.index_of(old) else {
            return Err(ApplyError::Detached(old));
        };
        if let Some(slot) = self.slot_mut(parent) {
            slot.children[index] = new;
        }
        if let Some(slot) = self.slot_mut(new) {
            slot.parent = Some(parent);
        }
        if let Some(slot) = self.slot_mut(old) {
            slot.parent = None;
        }

        self.record(MutationRecord::ChildList {
            target: parent,
            added: vec![new],
            removed: vec![old],
        });
        self.free_subtree(old);
        Ok(())
    }

    /// Replace a text node's content, or an element's children with one text node
    pub fn set_text(&mut self, id: NodeId, content: &str) -> Result<(), ApplyError> {
        let is_text = match self.get(id) {
            None => return Err(ApplyError::DanglingTarget(id)),
            Some(data) => matches!(data, NodeData::Text(_)),
        };

        if is_text {
            if let Some(NodeData::Text(text)) = self.slot_mut(id).map(|slot| &mut slot.data) {
                if text != content {
                    *text = content.to_string();
                }
            }
            self.record(MutationRecord::CharacterData { target: id });
            return Ok(());
        }

        let old_children = self
            .slot_mut(id)
            .map(|slot| std::mem::take(&mut slot.children))
            .unwrap_or_default();
        for child in &old_children {
            self.free_subtree(*child);
        }
        let text = self.create_text(content);
        self.link(id, 0, text);
        self.record(MutationRecord::ChildList {
            target: id,
            added: vec![text],
            removed: old_children,
        });
        Ok(())
    }

    /// Write one attribute using its resolved kind; `None` removes it
    pub fn write_attr(
        &mut self,
        id: NodeId,
        name: &str,
        kind: AttrKind,
        value: Option<&PropValue>,
    ) -> Result<(), ApplyError> {
        match self.slot_mut(id).map(|slot| &mut slot.data) {
            None => return Err(ApplyError::DanglingTarget(id)),
            Some(NodeData::Text(_)) => return Err(ApplyError::NotAnElement(id)),
            Some(NodeData::Element(el)) => write_attr_data(el, name, kind, value),
        }

        self.record(MutationRecord::Attributes {
            target: id,
            name: name.to_string(),
        });
        Ok(())
    }

    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<PropValue>,
    ) -> Result<(), ApplyError> {
        self.write_attr(id, name, AttrKind::of(name), Some(&value.into()))
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<(), ApplyError> {
        self.write_attr(id, name, AttrKind::of(name), None)
    }

    /// Current value of an attribute in prop form
    pub fn read_attr(&self, id: NodeId, name: &str) -> Option<PropValue> {
        let el = self.element(id)?;
        match AttrKind::of(name) {
            AttrKind::Class => {
                (!el.classes.is_empty()).then(|| PropValue::Text(el.classes.join(" ")))
            }
            AttrKind::Style => (!el.style.is_empty()).then(|| PropValue::Map(el.style.clone())),
            AttrKind::Generic => el.attributes.get(name).cloned().map(PropValue::Text),
        }
    }

    /// Snapshot a subtree as a virtual child in normalized form
    pub fn to_vchild(&self, id: NodeId) -> Option<VChild> {
        let slot = self.slot(id)?;
        match &slot.data {
            NodeData::Text(text) => Some(VChild::Text(text.clone())),
            NodeData::Element(el) => {
                let mut node = VNode::new(el.tag.clone());
                if !el.classes.is_empty() {
                    node.props
                        .insert("class".to_string(), PropValue::Text(el.classes.join(" ")));
                }
                if !el.style.is_empty() {
                    node.props
                        .insert("style".to_string(), PropValue::Map(el.style.clone()));
                }
                for (name, value) in &el.attributes {
                    node.props
                        .insert(name.clone(), PropValue::Text(value.clone()));
                }
                node.children = slot
                    .children
                    .iter()
                    .filter_map(|child| self.to_vchild(*child))
                    .collect();
                Some(VChild::Node(node))
            }
        }
    }

    /// Start recording mutations below `id`
    pub fn observe(&mut self, id: NodeId) -> bool {
        self.contains(id) && self.observed.insert(id)
    }

    pub fn unobserve(&mut self, id: NodeId) -> bool {
        self.observed.remove(&id)
    }

    pub fn unobserve_all(&mut self) {
        self.observed.clear();
        self.records.clear();
    }

    pub fn is_observed(&self, id: NodeId) -> bool {
        self.observed.contains(&id)
    }

    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn has_records(&self) -> bool {
        !self.records.is_empty()
    }

    /// Run `f` without recording any mutation it makes
    pub fn with_records_suppressed<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.quiet += 1;
        let result = f(self);
        self.quiet -= 1;
        result
    }

    fn record(&mut self, record: MutationRecord) {
        if self.quiet > 0 || self.observed.is_empty() {
            return;
        }
        let target = record.target();
        let mut current = Some(target);
        while let Some(id) = current {
            if self.observed.contains(&id) {
                self.records.push(record);
                return;
            }
            current = self.parent(id);
        }
    }

    fn record_move(&mut self, previous: Option<(NodeId, usize)>, parent: NodeId, child: NodeId) {
        if let Some((old_parent, _)) = previous {
            self.record(MutationRecord::ChildList {
                target: old_parent,
                added: Vec::new(),
                removed: vec![child],
            });
        }
        self.record(MutationRecord::ChildList {
            target: parent,
            added: vec![child],
            removed: Vec::new(),
        });
    }

    /// Remove `child` from its parent's list; returns where it was
    fn unlink(&mut self, child: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.slot_mut(child)?.parent.take()?;
        let slot = self.slot_mut(parent)?;
        let index = slot.children.iter().position(|c| *c == child)?;
        slot.children.remove(index);
        Some((parent, index))
    }

    fn link(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if let Some(slot) = self.slot_mut(parent) {
            let index = index.min(slot.children.len());
            slot.children.insert(index, child);
        }
        if let Some(slot) = self.slot_mut(child) {
            slot.parent = Some(parent);
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(entry) = self
                .entries
                .get_mut(current.index())
                .filter(|entry| entry.generation == current.generation())
            else {
                continue;
            };
            if let Some(slot) = entry.slot.take() {
                entry.generation = entry.generation.wrapping_add(1);
                self.free.push(current.index());
                stack.extend(slot.children);
            }
            self.observed.remove(&current);
        }
    }
}

fn element(tag: impl Into<String>) -> ElementData {
    ElementData {
        tag: tag.into(),
        ..ElementData::default()
    }
}

fn write_attr_data(el: &mut ElementData, name: &str, kind: AttrKind, value: Option<&PropValue>) {
    match (kind, value) {
        (AttrKind::Class, None) => el.classes.clear(),
        (AttrKind::Class, Some(value)) => el.classes = class_list(value),
        (AttrKind::Style, None) => el.style.clear(),
        (AttrKind::Style, Some(value)) => {
            for (property, value) in style_declarations(value) {
                if value.is_empty() {
                    el.style.remove(&property);
                } else {
                    el.style.insert(property, value);
                }
            }
        }
        (AttrKind::Generic, None) => {
            el.attributes.remove(name);
        }
        (AttrKind::Generic, Some(value)) => {
            el.attributes.insert(name.to_string(), value.to_attr_string());
        }
    }
}

/// Class names from `"a b"` or `{"a": "true", "b": "false"}`
fn class_list(value: &PropValue) -> Vec<String> {
    let names: Vec<&str> = match value {
        PropValue::Text(text) => text.split_whitespace().collect(),
        PropValue::Map(map) => map
            .iter()
            .filter(|(_, on)| !on.is_empty() && on.as_str() != "false")
            .map(|(name, _)| name.as_str())
            .collect(),
    };

    let mut classes: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !classes.iter().any(|c| c == name) {
            classes.push(name.to_string());
        }
    }
    classes
}

/// Style declarations from a map or a `"prop: value; ..."` string.
/// An empty value means "remove this property".
pub fn style_declarations(value: &PropValue) -> BTreeMap<String, String> {
    match value {
        PropValue::Map(map) => map.clone(),
        PropValue::Text(text) => text
            .split(';')
            .filter_map(|declaration| {
                let (property, value) = declaration.split_once(':')?;
                let property = property.trim();
                (!property.is_empty()).then(|| (property.to_string(), value.trim().to_string()))
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_list() -> (LiveTree, NodeId, Vec<NodeId>) {
        let mut tree = LiveTree::new();
        let root = tree.create_root("ul");
        let items: Vec<NodeId> = ["a", "b", "c"]
            .iter()
            .map(|label| {
                let li = tree.create_element("li");
                tree.set_attribute(li, "id", *label).unwrap();
                tree.append_child(root, li).unwrap();
                li
            })
            .collect();
        (tree, root, items)
    }

    fn ids(tree: &LiveTree, parent: NodeId) -> Vec<String> {
        tree.children(parent)
            .iter()
            .map(|c| tree.element(*c).unwrap().attributes["id"].clone())
            .collect()
    }

    #[test]
    fn test_materialize_and_snapshot() {
        let vnode = VNode::new("div")
            .with_prop("class", "a  b a")
            .with_style("color", "red")
            .with_prop("title", "t")
            .with_text("hi");

        let mut tree = LiveTree::new();
        let id = tree.materialize_node(&vnode);

        let el = tree.element(id).unwrap();
        assert_eq!(el.classes, vec!["a", "b"]);
        assert_eq!(el.style.get("color").map(String::as_str), Some("red"));
        assert_eq!(tree.text(tree.children(id)[0]), Some("hi"));

        let snapshot = tree.to_vchild(id).unwrap();
        let node = snapshot.as_node().unwrap();
        assert_eq!(node.props.get("class"), Some(&PropValue::from("a b")));
        assert_eq!(node.children, vec![VChild::text("hi")]);
    }

    #[test]
    fn test_reachability() {
        let (mut tree, root, items) = tree_with_list();
        let loose = tree.create_element("div");

        assert!(tree.is_reachable(root));
        assert!(tree.is_reachable(items[1]));
        assert!(!tree.is_reachable(loose));

        tree.remove(items[1]).unwrap();
        assert!(!tree.contains(items[1]));
        assert!(!tree.is_reachable(items[1]));
    }

    #[test]
    fn test_insert_child_uses_sibling_at_index() {
        let (mut tree, root, items) = tree_with_list();

        // a before c: [b, a, c]
        tree.insert_child(root, 2, items[0]).unwrap();
        assert_eq!(ids(&tree, root), vec!["b", "a", "c"]);

        // inserting at its own position is a no-op
        tree.insert_child(root, 1, items[0]).unwrap();
        assert_eq!(ids(&tree, root), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_place_child_clamps_index() {
        let (mut tree, root, items) = tree_with_list();

        let position = tree.place_child(root, 42, items[0]).unwrap();
        assert_eq!(position, 2);
        assert_eq!(ids(&tree, root), vec!["b", "c", "a"]);

        tree.place_child(root, 0, items[0]).unwrap();
        assert_eq!(ids(&tree, root), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_cycles_and_roots_are_rejected() {
        let (mut tree, root, items) = tree_with_list();
        let inner = tree.create_element("span");
        tree.append_child(items[0], inner).unwrap();

        assert_eq!(
            tree.append_child(inner, items[0]),
            Err(ApplyError::CycleDetected {
                node: items[0],
                parent: inner
            })
        );
        assert_eq!(tree.remove(root), Err(ApplyError::RootNode(root)));

        let label = tree.create_text("label");
        tree.append_child(inner, label).unwrap();
        assert_eq!(
            tree.append_child(label, items[1]),
            Err(ApplyError::NotAnElement(label))
        );
    }

    #[test]
    fn test_replace_frees_old_subtree() {
        let (mut tree, root, items) = tree_with_list();
        let replacement = tree.create_text("x");

        tree.replace(items[1], replacement).unwrap();

        assert_eq!(tree.children(root)[1], replacement);
        assert!(!tree.contains(items[1]));
        assert_eq!(tree.parent(replacement), Some(root));
    }

    #[test]
    fn test_set_text_on_element_replaces_children() {
        let (mut tree, root, items) = tree_with_list();

        tree.set_text(root, "empty").unwrap();

        assert_eq!(tree.children(root).len(), 1);
        assert_eq!(tree.text(tree.children(root)[0]), Some("empty"));
        assert!(items.iter().all(|item| !tree.contains(*item)));
    }

    #[test]
    fn test_style_merge_and_removal() {
        let mut tree = LiveTree::new();
        let id = tree.create_element("div");

        tree.set_attribute(id, "style", "color: red; margin: 0").unwrap();
        let mut delta = BTreeMap::new();
        delta.insert("margin".to_string(), String::new());
        delta.insert("padding".to_string(), "4px".to_string());
        tree.set_attribute(id, "style", PropValue::Map(delta)).unwrap();

        let style = &tree.element(id).unwrap().style;
        assert_eq!(style.get("color").map(String::as_str), Some("red"));
        assert_eq!(style.get("padding").map(String::as_str), Some("4px"));
        assert!(!style.contains_key("margin"));

        tree.remove_attribute(id, "style").unwrap();
        assert!(tree.element(id).unwrap().style.is_empty());
    }

    #[test]
    fn test_class_object_form() {
        let mut tree = LiveTree::new();
        let id = tree.create_element("div");
        let mut flags = BTreeMap::new();
        flags.insert("active".to_string(), "true".to_string());
        flags.insert("hidden".to_string(), "false".to_string());

        tree.set_attribute(id, "className", PropValue::Map(flags)).unwrap();
        assert_eq!(tree.element(id).unwrap().classes, vec!["active"]);
    }

    #[test]
    fn test_records_only_inside_observed_subtree() {
        let (mut tree, root, items) = tree_with_list();
        let loose = tree.create_element("div");

        tree.observe(root);
        tree.set_attribute(items[0], "title", "x").unwrap();
        tree.set_attribute(loose, "title", "x").unwrap();
        tree.with_records_suppressed(|tree| tree.set_attribute(items[1], "title", "y"))
            .unwrap();

        let records = tree.take_records();
        assert_eq!(
            records,
            vec![MutationRecord::Attributes {
                target: items[0],
                name: "title".to_string()
            }]
        );
        assert!(!tree.has_records());
    }

    #[test]
    fn test_append_children_records_once() {
        let mut tree = LiveTree::new();
        let root = tree.create_root("div");
        let a = tree.create_text("a");
        let b = tree.create_text("b");
        tree.observe(root);

        tree.append_children(root, &[a, b]).unwrap();

        assert_eq!(
            tree.take_records(),
            vec![MutationRecord::ChildList {
                target: root,
                added: vec![a, b],
                removed: vec![]
            }]
        );
    }

    #[test]
    fn test_freed_slots_are_reused_under_new_generation() {
        let (mut tree, root, items) = tree_with_list();
        let stale = items[1];
        tree.remove(stale).unwrap();
        assert_eq!(tree.len(), 3);

        let fresh = tree.create_element("li");

        assert_eq!(fresh.index(), stale.index());
        assert_ne!(fresh, stale);
        assert_eq!(fresh.generation(), 1);
        assert!(!tree.contains(stale));
        assert_eq!(tree.remove(stale), Err(ApplyError::DanglingTarget(stale)));
        assert_eq!(tree.append_child(root, stale), Err(ApplyError::DanglingTarget(stale)));
        assert_eq!(tree.len(), 4);
        assert_eq!(fresh.to_string(), format!("#{}v1", stale.index()));
    }
}
