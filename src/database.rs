//! # Credential Database
//!
//! The input and output of a run: credential ids mapped to records. Records
//! are kept as raw JSON so fields the generator does not know about survive
//! unchanged and in order. Only the fields needed to issue a credential are
//! parsed, per format.

use anyhow::{anyhow, bail, Context};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use testdata_claims::{ClaimNode, ClaimTree};
use testdata_iso_mdl::Dataset;

/// Format identifier of ISO mDL credentials.
pub const MSO_MDOC: &str = "mso_mdoc";

/// Format identifier of SD-JWT VC credentials.
pub const DC_SD_JWT: &str = "dc+sd-jwt";

/// A single credential record.
pub type Record = Map<String, Value>;

/// Credential id → record, in input order.
pub type Database = IndexMap<String, Record>;

/// The `format` of a record.
///
/// # Errors
///
/// Returns an error if the record has no string `format`.
pub fn format(record: &Record) -> anyhow::Result<&str> {
    record.get("format").and_then(Value::as_str).ok_or_else(|| anyhow!("record has no `format`"))
}

/// Parse the named field of a record.
///
/// # Errors
///
/// Returns an error if the field is missing or has the wrong shape.
pub fn field<T: DeserializeOwned>(record: &Record, name: &str) -> anyhow::Result<T> {
    let value = record.get(name).ok_or_else(|| anyhow!("record has no `{name}`"))?;
    T::deserialize(value).with_context(|| format!("invalid `{name}`"))
}

/// The `credential` field of an `mso_mdoc` record.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MdocCredential {
    /// Document type, e.g. `org.iso.18013.5.1.mDL`.
    pub doc_type: String,

    /// Name spaces as a claim tree: every name space a branch, every data
    /// element a leaf.
    pub name_spaces: ClaimTree,
}

impl MdocCredential {
    /// The data element values to sign, by name space.
    ///
    /// # Errors
    ///
    /// Returns an error if a name space is not an object of data elements or
    /// a data element has no `value`.
    pub fn dataset(&self) -> anyhow::Result<Dataset> {
        let mut dataset = Dataset::new();

        for (name_space, node) in &self.name_spaces {
            let ClaimNode::Branch { children, .. } = node else {
                bail!("name space `{name_space}` holds a value instead of data elements");
            };

            let elements = dataset.entry(name_space.clone()).or_default();
            for (identifier, element) in children {
                let ClaimNode::Leaf { value, .. } = element else {
                    bail!("data element `{name_space}/{identifier}` has no value");
                };
                elements.insert(identifier.clone(), value.clone());
            }
        }

        Ok(dataset)
    }
}
