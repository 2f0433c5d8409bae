//! # Claim Display Metadata
//!
//! Flat list of displayable claims, as published in a credential
//! configuration's `claims` parameter.

use serde::{Deserialize, Serialize};

use crate::tree::{ClaimNode, ClaimTree};

/// Locale used for every generated display entry.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Describes a single displayable claim.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ClaimsDescription {
    /// Claims path pointer from the credential root to the claim.
    ///
    /// For example, `["address", "street_address"]` points to the
    /// `street_address` claim within the `address` claim.
    pub path: Vec<String>,

    /// Display properties of the claim for specified languages.
    pub display: Vec<ClaimDisplay>,
}

/// Language-specific display name of a claim.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ClaimDisplay {
    /// A BCP47 [RFC5646] language tag.
    ///
    /// [RFC5646]: (https://www.rfc-editor.org/rfc/rfc5646)
    pub locale: String,

    /// Display name for the claim.
    pub name: String,
}

impl ClaimDisplay {
    /// Display name in the [`DEFAULT_LOCALE`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            locale: String::from(DEFAULT_LOCALE),
            name: name.into(),
        }
    }
}

/// Append a [`ClaimsDescription`] to `out` for every leaf of `tree` that has
/// a `display` name, in tree order.
///
/// `prefix` holds the claim segments leading to `tree` and is empty for the
/// root. Branches and leaves without `display` produce no entry, though a
/// branch's descendants are still visited.
pub fn build_display_claims(tree: &ClaimTree, prefix: &[String], out: &mut Vec<ClaimsDescription>) {
    for (name, node) in tree {
        let mut path = prefix.to_vec();
        path.push(name.clone());

        match node {
            ClaimNode::Branch { children, .. } => build_display_claims(children, &path, out),
            ClaimNode::Leaf {
                display: Some(display),
                ..
            } => out.push(ClaimsDescription {
                path,
                display: vec![ClaimDisplay::new(display.clone())],
            }),
            ClaimNode::Leaf { display: None, .. } => {}
        }
    }
}

/// Collect the display descriptors of a whole tree.
#[must_use]
pub fn display_claims(tree: &ClaimTree) -> Vec<ClaimsDescription> {
    let mut out = Vec::new();
    build_display_claims(tree, &[], &mut out);
    out
}
