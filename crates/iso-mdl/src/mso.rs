//! # Mobile Security Object (MSO)
//!
//! The MSO is used to provide Issuer data authentication for the associated
//! `mdoc`. It contains a signed digest (e.g. SHA-256) of each data element in
//! the `mdoc`.
//!
//! See 9.1.2.4 Signing method and structure for MSO.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use ciborium::tag::Required;
use coset::CoseSign1;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use testdata_infosec::cose::{Bytes, CborValue, CoseKey};

/// `COSE_Sign1` with a payload of `MobileSecurityObjectBytes`:
/// `#6.24(bstr .cbor MobileSecurityObject)`. Encoded untagged.
pub type IssuerAuth = CborValue<CoseSign1>;

/// Digests of every data element, by name space.
pub type ValueDigests = BTreeMap<NameSpace, DigestIds>;

/// Name space of a group of data elements.
pub type NameSpace = String;

/// Data element digests keyed by their digest ID.
pub type DigestIds = BTreeMap<DigestId, Bytes>;

/// `DigestID` is an unsigned integer used to match the hashes in the MSO to
/// the data elements in the mdoc response.
///
/// The Digest ID must be unique within a namespace. The value must be smaller
/// than 2^31.
pub type DigestId = u32;

/// An mdoc digital signature is generated over the mobile security object (MSO).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MobileSecurityObject {
    /// Version of the `MobileSecurityObject`. Must be 1.0.
    pub version: Version,

    /// Message digest algorithm used.
    pub digest_algorithm: DigestAlgorithm,

    /// An ordered set of value digests for each data element in each name space.
    pub value_digests: ValueDigests,

    /// Device key information
    pub device_key_info: DeviceKeyInfo,

    /// The document type of the document being signed.
    pub doc_type: String,

    /// Validity information for the MSO
    pub validity_info: ValidityInfo,
}

/// Version of the MSO structure.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum Version {
    /// Version 1.0
    #[default]
    #[serde(rename = "1.0")]
    V1_0,
}

/// Digest algorithm used by the MSO.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum DigestAlgorithm {
    /// SHA-256
    #[default]
    #[serde(rename = "SHA-256")]
    Sha256,
}

/// Used to hold the mdoc authentication public key. Encoded as an untagged
/// `COSE_Key` element as specified in [RFC 9052] and [RFC 9053].
///
/// [RFC 9052]: https://www.rfc-editor.org/rfc/rfc9052.html
/// [RFC 9053]: https://www.rfc-editor.org/rfc/rfc9053.html
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceKeyInfo {
    /// Device key
    pub device_key: CoseKey,
}

/// Contains information related to the validity of the MSO and its signature.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidityInfo {
    /// Time the MSO was signed
    pub signed: TDate,

    /// The timestamp before which the MSO is not yet valid. Should be equal
    /// or later than the `signed` element
    pub valid_from: TDate,

    /// The timestamp after which the MSO is no longer valid.
    ///
    /// The value must be later than the `valid_from` element.
    pub valid_until: TDate,

    /// The time at which the issuing authority expects to re-sign the MSO
    /// (and potentially update data elements).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_update: Option<TDate>,
}

/// `tdate`: an RFC 3339 date-time without fraction of seconds, tagged 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TDate(pub DateTime<Utc>);

impl Serialize for TDate {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        Required::<String, 0>(self.0.to_rfc3339_opts(SecondsFormat::Secs, true)).serialize(s)
    }
}

impl<'de> Deserialize<'de> for TDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Required(date) = Required::<String, 0>::deserialize(deserializer)?;
        let date = DateTime::parse_from_rfc3339(&date).map_err(de::Error::custom)?;
        Ok(Self(date.with_timezone(&Utc)))
    }
}
