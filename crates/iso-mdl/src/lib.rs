//! # ISO mDL Credentials
//!
//! Issues `mso_mdoc` credentials as defined by ISO/IEC 18013-5: every data
//! element is salted, wrapped as a tagged `IssuerSignedItem` and digested
//! into a Mobile Security Object, which is signed by the document signer as
//! an untagged `COSE_Sign1` carrying the signer's certificate chain.
//!
//! The output is the CBOR-encoded `IssuerSigned` structure.

pub mod mdoc;
pub mod mso;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Duration, Utc};
use ciborium::Value;
use coset::{CoseSign1Builder, HeaderBuilder};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::Rng;
use sha2::{Digest, Sha256};
use testdata_infosec::cose::{cbor, Bytes, CborValue, CoseKey, Tag24};
use testdata_infosec::{Randomness, Signer};
use tracing::{debug, instrument, trace};

use crate::mdoc::{IssuerNameSpaces, IssuerSigned, IssuerSignedItem};
use crate::mso::{
    DeviceKeyInfo, DigestAlgorithm, MobileSecurityObject, TDate, ValidityInfo, ValueDigests,
    Version,
};

/// COSE header label for an X.509 certificate chain (RFC 9360).
pub const X5CHAIN: i64 = 33;

/// Credential data to be issued: name space → data element identifier →
/// data element value.
pub type Dataset = IndexMap<String, IndexMap<String, serde_json::Value>>;

/// Issues signed `mso_mdoc` credentials.
#[derive(Debug)]
pub struct MdocIssuer<S: Signer> {
    signer: S,
    rng: StdRng,
    validity: Duration,
}

impl<S: Signer> MdocIssuer<S> {
    /// Create an issuer signing with `signer`. Credentials are valid for
    /// `validity` from the time they are signed.
    pub fn new(signer: S, randomness: Randomness, validity: Duration) -> Self {
        Self {
            signer,
            rng: randomness.rng(),
            validity,
        }
    }

    /// Issue a credential of `doc_type` holding `dataset`, bound to
    /// `device_key`, returning the CBOR-encoded `IssuerSigned` structure.
    ///
    /// Digest IDs are assigned sequentially from 0 within each name space.
    ///
    /// # Errors
    ///
    /// Returns an error if a data element cannot be encoded as CBOR or the
    /// signer fails.
    #[instrument(level = "debug", skip(self, dataset, device_key))]
    pub fn issue(
        &mut self, doc_type: &str, dataset: &Dataset, device_key: &CoseKey, signed_at: DateTime<Utc>,
    ) -> anyhow::Result<Vec<u8>> {
        let mut name_spaces = IssuerNameSpaces::new();
        let mut value_digests = ValueDigests::new();

        for (name_space, elements) in dataset {
            let mut items = Vec::with_capacity(elements.len());
            let digests = value_digests.entry(name_space.clone()).or_default();

            for (digest_id, (identifier, value)) in (0..).zip(elements) {
                let element_value = Value::serialized(value)
                    .with_context(|| format!("issue encoding {name_space}/{identifier}"))?;
                let item = Tag24(IssuerSignedItem {
                    digest_id,
                    random: Bytes(self.rng.gen::<[u8; 16]>().to_vec()),
                    element_identifier: identifier.clone(),
                    element_value,
                });

                // digest of the tagged `IssuerSignedItemBytes`
                let digest = Sha256::digest(item.to_vec()?).to_vec();
                digests.insert(digest_id, Bytes(digest));
                items.push(item);
            }

            trace!(name_space = %name_space, elements = items.len(), "added name space");
            name_spaces.insert(name_space.clone(), items);
        }

        let valid_until = signed_at
            .checked_add_signed(self.validity)
            .ok_or_else(|| anyhow!("validity period is out of range"))?;

        let mso = MobileSecurityObject {
            version: Version::V1_0,
            digest_algorithm: DigestAlgorithm::Sha256,
            value_digests,
            device_key_info: DeviceKeyInfo {
                device_key: device_key.clone(),
            },
            doc_type: doc_type.to_string(),
            validity_info: ValidityInfo {
                signed: TDate(signed_at),
                valid_from: TDate(signed_at),
                valid_until: TDate(valid_until),
                expected_update: None,
            },
        };

        // sign `MobileSecurityObjectBytes`
        let protected = HeaderBuilder::new().algorithm(self.signer.algorithm().into()).build();
        let mut unprotected = HeaderBuilder::new();
        if let Some(x5chain) = x5chain_value(self.signer.x5chain()) {
            unprotected = unprotected.value(X5CHAIN, x5chain);
        }
        let cose_sign_1 = CoseSign1Builder::new()
            .protected(protected)
            .unprotected(unprotected.build())
            .payload(Tag24(mso).to_vec()?)
            .try_create_signature(&[], |tbs| self.signer.try_sign(tbs))?
            .build();

        let issuer_signed = IssuerSigned {
            name_spaces,
            issuer_auth: CborValue(cose_sign_1),
        };
        let bytes = cbor::to_vec(&issuer_signed)?;
        debug!(size = bytes.len(), "issued mdoc");

        Ok(bytes)
    }
}

// A single certificate is encoded as a bstr, a chain as an array of bstrs.
fn x5chain_value(x5chain: &[Vec<u8>]) -> Option<Value> {
    match x5chain {
        [] => None,
        [cert] => Some(Value::Bytes(cert.clone())),
        certs => Some(Value::Array(certs.iter().cloned().map(Value::Bytes).collect())),
    }
}
