//! # Patches
//!
//! One patch describes one mutation of the live tree. Every field except
//! `kind` is optional; which ones are required depends on the kind:
//!
//! | kind         | required                          |
//! |--------------|-----------------------------------|
//! | `insert`     | `parent`, `new_node`              |
//! | `update`     | `target`, `new_node`              |
//! | `remove`     | `target`                          |
//! | `move`       | `target`, `parent`, `index`       |
//! | `attributes` | `target`, `attributes`            |
//! | `text`       | `target`, `new_value`             |
//!
//! A patch missing a required field is skipped by the applier, never fatal.
//!
//! Patches serialize to the JSON shape producers already speak:
//!
//! ```json
//! { "type": "attributes", "target": 4, "attributes": { "class": { "kind": "class", "value": "a" } } }
//! ```

use crate::errors::PatchError;
use crate::live::NodeId;
use crate::vnode::{PropValue, VChild};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchKind {
    Insert,
    Update,
    Remove,
    Move,
    Attributes,
    Text,
    #[serde(other)]
    Unknown,
}

impl PatchKind {
    /// Application priority. Removals clear subtrees first, insertions go
    /// last so index based operations see a stable shape.
    pub fn priority(self) -> u8 {
        match self {
            PatchKind::Remove => 0,
            PatchKind::Update | PatchKind::Attributes | PatchKind::Text => 1,
            PatchKind::Move => 2,
            PatchKind::Insert => 3,
            PatchKind::Unknown => 4,
        }
    }
}

/// How an attribute key is written to an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrKind {
    /// Replaces the whole class set
    Class,
    /// Merges into the style map
    Style,
    /// Plain attribute set/remove
    Generic,
}

impl AttrKind {
    pub fn of(name: &str) -> Self {
        match name {
            "class" | "className" => AttrKind::Class,
            "style" => AttrKind::Style,
            _ => AttrKind::Generic,
        }
    }
}

/// New value for one attribute key; `None` removes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrUpdate {
    pub kind: AttrKind,
    pub value: Option<PropValue>,
}

impl AttrUpdate {
    /// Build an update, resolving the attribute kind from its name
    pub fn new(name: &str, value: Option<PropValue>) -> Self {
        Self {
            kind: AttrKind::of(name),
            value,
        }
    }

    pub fn set(name: &str, value: impl Into<PropValue>) -> Self {
        Self::new(name, Some(value.into()))
    }

    pub fn remove(name: &str) -> Self {
        Self::new(name, None)
    }
}

pub type AttrMap = BTreeMap<String, AttrUpdate>;

/// Node carried by insert and update patches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "node", rename_all = "lowercase")]
pub enum NewNode {
    /// A node that already exists in the live tree (attached or not)
    Live(NodeId),
    /// A descriptor materialized by the applier when the patch runs
    Virtual(VChild),
}

impl From<NodeId> for NewNode {
    fn from(id: NodeId) -> Self {
        NewNode::Live(id)
    }
}

impl From<VChild> for NewNode {
    fn from(child: VChild) -> Self {
        NewNode::Virtual(child)
    }
}

impl From<crate::vnode::VNode> for NewNode {
    fn from(node: crate::vnode::VNode) -> Self {
        NewNode::Virtual(VChild::Node(node))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    #[serde(rename = "type")]
    pub kind: PatchKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<NodeId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_node: Option<NewNode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AttrMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
}

/// A patch whose required fields are all present
#[derive(Debug, Clone, Copy)]
pub enum Op<'a> {
    Insert {
        parent: NodeId,
        index: Option<usize>,
        node: &'a NewNode,
    },
    Update {
        target: NodeId,
        node: &'a NewNode,
    },
    Remove {
        target: NodeId,
    },
    Move {
        target: NodeId,
        parent: NodeId,
        index: usize,
    },
    Attributes {
        target: NodeId,
        attributes: &'a AttrMap,
    },
    Text {
        target: NodeId,
        value: &'a str,
    },
}

impl Patch {
    /// Empty patch of the given kind
    pub fn empty(kind: PatchKind) -> Self {
        Self {
            kind,
            target: None,
            parent: None,
            index: None,
            new_node: None,
            attributes: None,
            new_value: None,
        }
    }

    /// Insert deferred to a grouped append under `parent`
    pub fn insert(parent: NodeId, node: impl Into<NewNode>) -> Self {
        Self {
            parent: Some(parent),
            new_node: Some(node.into()),
            ..Self::empty(PatchKind::Insert)
        }
    }

    /// Insert before the child currently at `index`
    pub fn insert_at(parent: NodeId, index: usize, node: impl Into<NewNode>) -> Self {
        Self {
            index: Some(index),
            ..Self::insert(parent, node)
        }
    }

    pub fn update(target: NodeId, node: impl Into<NewNode>) -> Self {
        Self {
            target: Some(target),
            new_node: Some(node.into()),
            ..Self::empty(PatchKind::Update)
        }
    }

    pub fn remove(target: NodeId) -> Self {
        Self {
            target: Some(target),
            ..Self::empty(PatchKind::Remove)
        }
    }

    pub fn move_to(target: NodeId, parent: NodeId, index: usize) -> Self {
        Self {
            target: Some(target),
            parent: Some(parent),
            index: Some(index),
            ..Self::empty(PatchKind::Move)
        }
    }

    pub fn attributes(target: NodeId, attributes: AttrMap) -> Self {
        Self {
            target: Some(target),
            attributes: Some(attributes),
            ..Self::empty(PatchKind::Attributes)
        }
    }

    /// Single-key attributes patch
    pub fn set_attribute(target: NodeId, name: &str, value: Option<PropValue>) -> Self {
        let mut attributes = AttrMap::new();
        attributes.insert(name.to_string(), AttrUpdate::new(name, value));
        Self::attributes(target, attributes)
    }

    pub fn text(target: NodeId, value: impl Into<String>) -> Self {
        Self {
            target: Some(target),
            new_value: Some(value.into()),
            ..Self::empty(PatchKind::Text)
        }
    }

    /// Check required fields and borrow them as a typed operation
    pub fn op(&self) -> Result<Op<'_>, PatchError> {
        let kind = self.kind;
        let missing = |field| PatchError::MissingField { kind, field };

        let op = match kind {
            PatchKind::Insert => Op::Insert {
                parent: self.parent.ok_or_else(|| missing("parent"))?,
                index: self.index,
                node: self.new_node.as_ref().ok_or_else(|| missing("newNode"))?,
            },
            PatchKind::Update => Op::Update {
                target: self.target.ok_or_else(|| missing("target"))?,
                node: self.new_node.as_ref().ok_or_else(|| missing("newNode"))?,
            },
            PatchKind::Remove => Op::Remove {
                target: self.target.ok_or_else(|| missing("target"))?,
            },
            PatchKind::Move => Op::Move {
                target: self.target.ok_or_else(|| missing("target"))?,
                parent: self.parent.ok_or_else(|| missing("parent"))?,
                index: self.index.ok_or_else(|| missing("index"))?,
            },
            PatchKind::Attributes => Op::Attributes {
                target: self.target.ok_or_else(|| missing("target"))?,
                attributes: self.attributes.as_ref().ok_or_else(|| missing("attributes"))?,
            },
            PatchKind::Text => Op::Text {
                target: self.target.ok_or_else(|| missing("target"))?,
                value: self.new_value.as_deref().ok_or_else(|| missing("newValue"))?,
            },
            PatchKind::Unknown => return Err(PatchError::UnknownKind),
        };

        Ok(op)
    }

    pub fn validate(&self) -> Result<(), PatchError> {
        self.op().map(|_| ())
    }
}
