//! # MSO MDOC
//!
//! The issuer-signed part of an mdoc: the data elements (claims) of each
//! name space, each wrapped in an `IssuerSignedItem` with a random salt, and
//! the issuer's signature over their digests.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use testdata_infosec::cose::{Bytes, Tag24};

use crate::mso::{self, DigestId, NameSpace};

/// Returned data elements for each namespace, in issuance order.
pub type IssuerNameSpaces = IndexMap<NameSpace, Vec<IssuerSignedItemBytes>>;

/// Data elements (claims) returned by the Issuer. Each data element is
/// hashed and signed by the Issuer in the MSO.
///
/// See 8.3.2.1.2.2 Device retrieval mdoc response.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssuerSigned {
    /// Returned data elements for each namespace (`IssuerNameSpaces` element)
    pub name_spaces: IssuerNameSpaces,

    /// The mobile security object (MSO) for issuer data authentication.
    /// `COSE_Sign1` with a payload of `MobileSecurityObjectBytes`
    pub issuer_auth: mso::IssuerAuth,
}

/// `IssuerSignedItemBytes` represents the tagged `IssuerSignedItem` after
/// CBOR serialization:  `#6.24(bstr .cbor IssuerSignedItem)`
pub type IssuerSignedItemBytes = Tag24<IssuerSignedItem>;

/// Issuer-signed data element
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssuerSignedItem {
    /// Id of the digest as added to the MSO `value_digests` parameter.
    #[serde(rename = "digestID")]
    pub digest_id: DigestId,

    /// Random value for issuer data authentication (min. 16 bytes).
    pub random: Bytes,

    /// Data element identifier. For example, "`family_name`"
    pub element_identifier: String,

    /// Data element value. For example, "`Smith`"
    pub element_value: ciborium::Value,
}

#[cfg(test)]
mod tests {
    use ciborium::Value;
    use testdata_infosec::cose::cbor;

    use super::*;

    #[test]
    fn item_field_names() {
        let item = IssuerSignedItem {
            digest_id: 3,
            random: Bytes(vec![0; 16]),
            element_identifier: String::from("family_name"),
            element_value: Value::Text(String::from("Mustermann")),
        };
        let value: Value = cbor::from_slice(&cbor::to_vec(&item).expect("should serialize"))
            .expect("should decode");

        let Value::Map(entries) = value else {
            panic!("should be a map");
        };
        let keys: Vec<_> = entries.iter().filter_map(|(k, _)| k.as_text()).collect();
        assert_eq!(keys, ["digestID", "random", "elementIdentifier", "elementValue"]);
        assert_eq!(entries[1].1, Value::Bytes(vec![0; 16]));
    }
}
