//! # Claim Path Tree
//!
//! Validating parse of the raw `paths` mapping into explicit branch and leaf
//! nodes. A node holding a `value` is a leaf; a node without one is a branch
//! whose non-metadata keys are child claims.

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Error;

/// Reserved key holding the selective-disclosure flag of the enclosing node.
/// It is never a claim name.
pub const SD_FLAG: &str = "_sd";

const VALUE: &str = "value";
const DISPLAY: &str = "display";

/// A single node of the claim path tree.
#[derive(Clone, Debug, PartialEq)]
pub enum ClaimNode {
    /// An intermediate node grouping further claims.
    Branch {
        /// Child claims, in input order.
        children: ClaimTree,

        /// Whether the whole branch is selectively disclosable.
        sd: bool,
    },

    /// A claim value.
    Leaf {
        /// The claim value as it will be signed.
        value: Value,

        /// Human-readable claim name. Leaves without one are signed but not
        /// listed in display metadata.
        display: Option<String>,

        /// Whether the claim is selectively disclosable.
        sd: bool,
    },
}

impl ClaimNode {
    /// Returns `true` when the node is flagged `_sd: true`.
    #[must_use]
    pub const fn is_selectively_disclosable(&self) -> bool {
        match self {
            Self::Branch { sd, .. } | Self::Leaf { sd, .. } => *sd,
        }
    }
}

/// Claim segments mapped to their nodes, preserving input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClaimTree(IndexMap<String, ClaimNode>);

impl ClaimTree {
    /// Parse a raw `paths` mapping.
    ///
    /// A `_sd` key at the root is metadata and is skipped.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] naming the first node that is neither a valid
    /// branch nor a valid leaf.
    pub fn from_value(value: &Value) -> Result<Self, Error> {
        let Value::Object(map) = value else {
            return Err(Error::NotAnObject { path: render(&[]) });
        };
        parse_children(map, &[])
    }

    /// Look up a direct child by claim name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ClaimNode> {
        self.0.get(name)
    }

    /// Iterate over direct children in input order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, ClaimNode> {
        self.0.iter()
    }

    /// Claim names of the direct children, in input order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, ClaimNode> {
        self.0.keys()
    }

    /// Number of direct children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the tree has no claims.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a ClaimTree {
    type IntoIter = indexmap::map::Iter<'a, String, ClaimNode>;
    type Item = (&'a String, &'a ClaimNode);

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, ClaimNode)> for ClaimTree {
    fn from_iter<I: IntoIterator<Item = (String, ClaimNode)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl TryFrom<&Value> for ClaimTree {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl<'de> Deserialize<'de> for ClaimTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(de::Error::custom)
    }
}

fn parse_children(map: &Map<String, Value>, path: &[&str]) -> Result<ClaimTree, Error> {
    let mut children = IndexMap::with_capacity(map.len());

    for (name, node) in map {
        if name == SD_FLAG {
            continue;
        }
        let mut node_path = path.to_vec();
        node_path.push(name);
        children.insert(name.clone(), parse_node(node, &node_path)?);
    }

    Ok(ClaimTree(children))
}

fn parse_node(node: &Value, path: &[&str]) -> Result<ClaimNode, Error> {
    let Value::Object(fields) = node else {
        return Err(Error::NotAnObject { path: render(path) });
    };

    let sd = match fields.get(SD_FLAG) {
        None => false,
        Some(Value::Bool(sd)) => *sd,
        Some(_) => return Err(Error::InvalidFlag { path: render(path) }),
    };
    let display = match fields.get(DISPLAY) {
        None => None,
        Some(Value::String(display)) => Some(display.clone()),
        Some(_) => return Err(Error::InvalidDisplay { path: render(path) }),
    };

    let Some(value) = fields.get(VALUE) else {
        if display.is_some() {
            return Err(Error::DisplayWithoutValue { path: render(path) });
        }
        let children = parse_children(fields, path)?;
        return Ok(ClaimNode::Branch { children, sd });
    };

    for (key, field) in fields {
        if matches!(key.as_str(), VALUE | DISPLAY | SD_FLAG) {
            continue;
        }
        if field.is_object() {
            return Err(Error::AmbiguousNode {
                path: render(path),
                key: key.clone(),
            });
        }
        debug!(path = %render(path), key = %key, "ignoring leaf attribute");
    }

    Ok(ClaimNode::Leaf {
        value: value.clone(),
        display,
        sd,
    })
}

fn render(path: &[&str]) -> String {
    if path.is_empty() {
        return String::from("$");
    }
    path.join(".")
}
