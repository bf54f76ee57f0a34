//! Virtual node descriptors used as diff input.
//!
//! A `VNode` describes the desired shape of one element. It owns nothing in
//! the live tree and is thrown away once the differ has produced patches.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Element props, ordered so that diff output is deterministic
pub type Props = BTreeMap<String, PropValue>;

/// A single prop value
///
/// Text covers ordinary attributes and class strings. Map covers style
/// objects (`{"color": "red"}`) and class objects (`{"active": "true"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Text(String),
    Map(BTreeMap<String, String>),
}

impl PropValue {
    /// Flatten to the string form written into a generic attribute
    pub fn to_attr_string(&self) -> String {
        match self {
            PropValue::Text(text) => text.clone(),
            PropValue::Map(map) => map
                .iter()
                .map(|(key, value)| format!("{}: {}", key, value))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Text(value)
    }
}

impl From<BTreeMap<String, String>> for PropValue {
    fn from(value: BTreeMap<String, String>) -> Self {
        PropValue::Map(value)
    }
}

/// Virtual element node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VNode {
    #[serde(rename = "type")]
    pub tag: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub props: Props,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<VChild>,
}

/// Child slot of a virtual node: either plain text or another element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VChild {
    Text(String),
    Node(VNode),
}

impl VNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            props: Props::new(),
            children: Vec::new(),
        }
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Add one style property, creating the style map if needed
    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        let entry = self
            .props
            .entry("style".to_string())
            .or_insert_with(|| PropValue::Map(BTreeMap::new()));

        if let PropValue::Text(_) = entry {
            *entry = PropValue::Map(BTreeMap::new());
        }
        if let PropValue::Map(styles) = entry {
            styles.insert(property.into(), value.into());
        }
        self
    }

    pub fn with_child(mut self, child: impl Into<VChild>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(self, content: impl Into<String>) -> Self {
        self.with_child(VChild::Text(content.into()))
    }

    pub fn with_children<I, C>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<VChild>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }
}

impl VChild {
    pub fn text(content: impl Into<String>) -> Self {
        VChild::Text(content.into())
    }

    pub fn is_text(&self) -> bool {
        matches!(self, VChild::Text(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            VChild::Text(text) => Some(text),
            VChild::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&VNode> {
        match self {
            VChild::Node(node) => Some(node),
            VChild::Text(_) => None,
        }
    }
}

impl From<VNode> for VChild {
    fn from(node: VNode) -> Self {
        VChild::Node(node)
    }
}

impl From<&str> for VChild {
    fn from(text: &str) -> Self {
        VChild::Text(text.to_string())
    }
}

impl From<String> for VChild {
    fn from(text: String) -> Self {
        VChild::Text(text)
    }
}
