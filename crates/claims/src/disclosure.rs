//! # Selective Disclosure Claims
//!
//! The signing-side view of a claim tree: claim values keyed by name, each
//! either plain or marked as selectively disclosable. An SD-JWT issuer turns
//! marked entries into disclosures, plain ones into ordinary JWT claims.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::tree::{ClaimNode, ClaimTree};

/// The content of a claim: a nested claims object or a value.
#[derive(Clone, Debug, PartialEq)]
pub enum Claim {
    /// Nested claims, derived from a branch node.
    Object(DisclosureClaims),

    /// A claim value, derived from a leaf node.
    Value(Value),
}

impl Claim {
    /// The claim as plain JSON, with all disclosure markers removed.
    #[must_use]
    pub fn to_plain_value(&self) -> Value {
        match self {
            Self::Object(claims) => claims.to_plain_value(),
            Self::Value(value) => value.clone(),
        }
    }
}

/// A claim tagged with its disclosure treatment.
#[derive(Clone, Debug, PartialEq)]
pub enum ClaimValue {
    /// Always visible to the verifier.
    Plain(Claim),

    /// May be withheld by the holder at presentation time.
    SelectivelyDisclosable(Claim),
}

impl ClaimValue {
    /// Tag `claim` according to its `_sd` flag.
    #[must_use]
    pub const fn new(claim: Claim, sd: bool) -> Self {
        if sd {
            Self::SelectivelyDisclosable(claim)
        } else {
            Self::Plain(claim)
        }
    }

    /// Returns `true` for [`ClaimValue::SelectivelyDisclosable`].
    #[must_use]
    pub const fn is_selectively_disclosable(&self) -> bool {
        matches!(self, Self::SelectivelyDisclosable(_))
    }

    /// The wrapped claim, regardless of its tag.
    #[must_use]
    pub const fn claim(&self) -> &Claim {
        match self {
            Self::Plain(claim) | Self::SelectivelyDisclosable(claim) => claim,
        }
    }
}

/// Claim names mapped to tagged claim values, preserving input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisclosureClaims(IndexMap<String, ClaimValue>);

impl DisclosureClaims {
    /// Look up a claim by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ClaimValue> {
        self.0.get(name)
    }

    /// Iterate over claims in input order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, ClaimValue> {
        self.0.iter()
    }

    /// Claim names, in input order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, ClaimValue> {
        self.0.keys()
    }

    /// Number of claims at this level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when there are no claims at this level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The claims as a plain JSON object, with all disclosure markers removed.
    #[must_use]
    pub fn to_plain_value(&self) -> Value {
        let map: Map<String, Value> =
            self.iter().map(|(name, value)| (name.clone(), value.claim().to_plain_value())).collect();
        Value::Object(map)
    }
}

impl<'a> IntoIterator for &'a DisclosureClaims {
    type IntoIter = indexmap::map::Iter<'a, String, ClaimValue>;
    type Item = (&'a String, &'a ClaimValue);

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, ClaimValue)> for DisclosureClaims {
    fn from_iter<I: IntoIterator<Item = (String, ClaimValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Derive the claims to be signed from a claim tree.
///
/// Branches become nested [`Claim::Object`]s, leaves contribute their
/// `value`. Every node flagged `_sd: true` is wrapped as
/// [`ClaimValue::SelectivelyDisclosable`]; nodes without the flag, branches
/// included, are inserted as [`ClaimValue::Plain`].
#[must_use]
pub fn build_disclosure_claims(tree: &ClaimTree) -> DisclosureClaims {
    tree.iter()
        .map(|(name, node)| {
            let value = match node {
                ClaimNode::Branch { children, sd } => {
                    ClaimValue::new(Claim::Object(build_disclosure_claims(children)), *sd)
                }
                ClaimNode::Leaf { value, sd, .. } => ClaimValue::new(Claim::Value(value.clone()), *sd),
            };
            (name.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: &Value) -> ClaimTree {
        ClaimTree::from_value(value).expect("should parse")
    }

    #[test]
    fn flagged_leaf() {
        let claims = build_disclosure_claims(&parse(&json!({
            "given_name": {"value": "ERIKA", "display": "Given Name", "_sd": true}
        })));

        assert_eq!(
            claims.get("given_name"),
            Some(&ClaimValue::SelectivelyDisclosable(Claim::Value(json!("ERIKA"))))
        );
    }

    #[test]
    fn plain_branch_with_flagged_leaf() {
        let claims = build_disclosure_claims(&parse(&json!({
            "address": {
                "_sd": false,
                "street": {"value": "Main St", "display": "Street", "_sd": true}
            }
        })));

        let expected: DisclosureClaims = [(
            String::from("street"),
            ClaimValue::SelectivelyDisclosable(Claim::Value(json!("Main St"))),
        )]
        .into_iter()
        .collect();
        assert_eq!(claims.get("address"), Some(&ClaimValue::Plain(Claim::Object(expected))));
    }

    #[test]
    fn branch_without_flag_is_plain() {
        let claims = build_disclosure_claims(&parse(&json!({
            "address": {"locality": {"value": "Berlin", "_sd": true}},
            "place_of_birth": {"_sd": true, "country": {"value": "DE"}}
        })));

        assert!(!claims.get("address").is_some_and(ClaimValue::is_selectively_disclosable));
        assert!(claims.get("place_of_birth").is_some_and(ClaimValue::is_selectively_disclosable));

        let Some(Claim::Object(birth)) = claims.get("place_of_birth").map(ClaimValue::claim) else {
            panic!("place_of_birth should be an object");
        };
        assert_eq!(birth.get("country"), Some(&ClaimValue::Plain(Claim::Value(json!("DE")))));
    }

    #[test]
    fn hidden_leaf_is_signed() {
        let claims = build_disclosure_claims(&parse(&json!({
            "document_number": {"value": "T22000129", "_sd": true}
        })));
        assert!(claims.get("document_number").is_some());
    }

    #[test]
    fn key_set_matches_tree() {
        let tree = parse(&json!({
            "_sd": false,
            "given_name": {"value": "ERIKA", "_sd": true},
            "family_name": {"value": "MUSTERMANN", "_sd": false},
            "address": {"_sd": true, "street": {"value": "Main St"}},
            "age_over_18": {"value": true}
        }));
        let claims = build_disclosure_claims(&tree);

        assert_eq!(claims.keys().collect::<Vec<_>>(), tree.keys().collect::<Vec<_>>());
        assert!(claims.get("_sd").is_none());
    }

    #[test]
    fn idempotent() {
        let tree = parse(&json!({
            "given_name": {"value": "ERIKA", "_sd": true},
            "address": {"_sd": true, "street": {"value": "Main St", "_sd": true}}
        }));
        assert_eq!(build_disclosure_claims(&tree), build_disclosure_claims(&tree));
    }

    #[test]
    fn plain_value() {
        let claims = build_disclosure_claims(&parse(&json!({
            "given_name": {"value": "ERIKA", "_sd": true},
            "address": {"_sd": true, "street": {"value": "Main St", "_sd": true}}
        })));

        assert_eq!(
            claims.to_plain_value(),
            json!({"given_name": "ERIKA", "address": {"street": "Main St"}})
        );
    }
}
