//! # SD-JWT Credentials
//!
//! Issues `dc+sd-jwt` credentials: an issuer-signed JWT in which every
//! selectively disclosable claim is replaced by the digest of a salted
//! disclosure, followed by the disclosures themselves.
//!
//! ```text
//! <issuer-signed JWT>~<disclosure 1>~...~<disclosure N>~
//! ```
//!
//! Claims come from a [`DisclosureClaims`] mapping, in which nested objects
//! may themselves be disclosable and contain disclosable claims.

mod disclosure;
mod jwt;

use std::fmt::{self, Display};

use anyhow::bail;
use base64ct::{Base64, Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use serde_json::{json, Map, Value};
use testdata_claims::{Claim, DisclosureClaims};
use testdata_infosec::{PublicKeyJwk, Randomness, Signer};
use tracing::{debug, instrument};

pub use crate::disclosure::Disclosure;
pub use crate::jwt::{Header, Jwt};

/// JWT `typ` of an SD-JWT credential.
pub const SD_JWT_TYPE: &str = "dc+sd-jwt";

/// Hash algorithm used for disclosure digests, as named in `_sd_alg`.
pub const SD_ALG: &str = "sha-256";

/// Claim holding the digests of an object's disclosures.
pub const SD_DIGESTS: &str = "_sd";

/// Array element placeholder; never a valid claim name.
const ELLIPSIS: &str = "...";

// Payload claims set by the issuer itself.
const RESERVED_CLAIMS: [&str; 5] = ["iss", "iat", "vct", "cnf", "_sd_alg"];

/// An issued SD-JWT: the issuer-signed JWT and its disclosures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SdJwt {
    /// The compact issuer-signed JWT.
    pub issuer_jwt: String,

    /// Disclosures for every selectively disclosable claim, nested claims
    /// first.
    pub disclosures: Vec<Disclosure>,
}

/// Compact serialization: `<jwt>~<disclosure>~...~`.
impl Display for SdJwt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~", self.issuer_jwt)?;
        for disclosure in &self.disclosures {
            write!(f, "{disclosure}~")?;
        }
        Ok(())
    }
}

/// Issues signed SD-JWT credentials.
#[derive(Debug)]
pub struct SdJwtIssuer<S: Signer> {
    signer: S,
    issuer: String,
    rng: StdRng,
}

impl<S: Signer> SdJwtIssuer<S> {
    /// Create an issuer signing with `signer` and identified by `issuer` in
    /// the `iss` claim.
    pub fn new(signer: S, issuer: impl Into<String>, randomness: Randomness) -> Self {
        Self {
            signer,
            issuer: issuer.into(),
            rng: randomness.rng(),
        }
    }

    /// Issue a credential of type `vct` holding `claims`, bound to the
    /// `holder` key.
    ///
    /// # Errors
    ///
    /// Returns an error if a claim name is reserved (`_sd`, `...`, or one of
    /// the issuer-set claims `iss`, `iat`, `vct`, `cnf`, `_sd_alg`), or if
    /// signing fails.
    #[instrument(level = "debug", skip(self, claims, holder))]
    pub fn issue(
        &mut self, claims: &DisclosureClaims, vct: &str, holder: &PublicKeyJwk,
        issued_at: DateTime<Utc>,
    ) -> anyhow::Result<SdJwt> {
        if let Some(name) = claims.keys().find(|name| RESERVED_CLAIMS.contains(&name.as_str())) {
            bail!("claim `{name}` is set by the issuer");
        }

        let mut disclosures = Vec::new();
        let encoded = self.encode_object(claims, &mut disclosures)?;

        let mut payload = Map::new();
        payload.insert(String::from("iss"), json!(self.issuer));
        payload.insert(String::from("iat"), json!(issued_at.timestamp()));
        payload.insert(String::from("vct"), json!(vct));
        payload.extend(encoded);
        payload.insert(String::from("_sd_alg"), json!(SD_ALG));
        payload.insert(String::from("cnf"), json!({"jwk": holder}));

        let x5c = self.signer.x5chain().iter().map(|cert| Base64::encode_string(cert)).collect::<Vec<_>>();
        let jwt = Jwt {
            header: Header {
                alg: self.signer.algorithm(),
                typ: String::from(SD_JWT_TYPE),
                x5c: (!x5c.is_empty()).then_some(x5c),
            },
            claims: Value::Object(payload),
        };
        let issuer_jwt = jwt.sign(&self.signer)?;
        debug!(disclosures = disclosures.len(), "issued sd-jwt");

        Ok(SdJwt {
            issuer_jwt,
            disclosures,
        })
    }

    // Plain claims are copied, disclosable claims are replaced by the digest
    // of a new disclosure. Nested objects are encoded before being disclosed.
    fn encode_object(
        &mut self, claims: &DisclosureClaims, disclosures: &mut Vec<Disclosure>,
    ) -> anyhow::Result<Map<String, Value>> {
        let mut object = Map::new();
        let mut digests = Vec::new();

        for (name, claim_value) in claims {
            if name == SD_DIGESTS || name == ELLIPSIS {
                bail!("claim name `{name}` is reserved");
            }

            let value = match claim_value.claim() {
                Claim::Object(nested) => Value::Object(self.encode_object(nested, disclosures)?),
                Claim::Value(value) => value.clone(),
            };

            if claim_value.is_selectively_disclosable() {
                let salt = Base64UrlUnpadded::encode_string(&self.rng.gen::<[u8; 16]>());
                let disclosure = Disclosure::new(salt, name.as_str(), value)?;
                digests.push(disclosure.digest());
                disclosures.push(disclosure);
            } else {
                object.insert(name.clone(), value);
            }
        }

        if !digests.is_empty() {
            digests.sort();
            object.insert(String::from(SD_DIGESTS), json!(digests));
        }

        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use p256::ecdsa::signature::Verifier;
    use p256::ecdsa::Signature;
    use rstest::rstest;
    use testdata_claims::{build_disclosure_claims, ClaimTree, ClaimValue};
    use testdata_infosec::{DeviceKey, IssuerKey};
    use test_utils::{ISSUER_CERT, ISSUER_KEY};

    use super::*;

    const ISSUER: &str = "https://example.com/issuer";

    fn claims() -> DisclosureClaims {
        let tree = ClaimTree::from_value(&json!({
            "_sd": false,
            "given_name": {"value": "Erika", "display": "Given Name", "_sd": true},
            "family_name": {"value": "Mustermann", "_sd": false},
            "address": {
                "_sd": true,
                "street_address": {"value": "Heidestraße 17", "_sd": true},
                "country": {"value": "DE"}
            },
            "nationalities": {
                "first": {"value": "DE", "_sd": true}
            }
        }))
        .expect("should parse");
        build_disclosure_claims(&tree)
    }

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).single().expect("valid date")
    }

    fn issue(claims: &DisclosureClaims, seed: u64) -> anyhow::Result<(IssuerKey, PublicKeyJwk, SdJwt)> {
        test_utils::init_tracer();
        let key = IssuerKey::from_pem(ISSUER_CERT, ISSUER_KEY)?;
        let holder = DeviceKey::generate(&mut Randomness::Deterministic(seed).rng())?.public_jwk();

        let mut issuer = SdJwtIssuer::new(key.clone(), ISSUER, Randomness::Deterministic(seed));
        let sd_jwt = issuer.issue(claims, "urn:eudi:pid:1", &holder, issued_at())?;
        Ok((key, holder, sd_jwt))
    }

    fn payload(sd_jwt: &SdJwt) -> Value {
        let jwt: Jwt<Value> = sd_jwt.issuer_jwt.parse().expect("should decode");
        jwt.claims
    }

    fn find<'a>(sd_jwt: &'a SdJwt, name: &str) -> &'a Disclosure {
        sd_jwt.disclosures.iter().find(|d| d.name() == name).expect("disclosure should exist")
    }

    fn digests(object: &Value) -> Vec<&str> {
        object[SD_DIGESTS].as_array().map_or_else(Vec::new, |a| a.iter().filter_map(Value::as_str).collect())
    }

    #[test]
    fn payload_claims() {
        let (_, holder, sd_jwt) = issue(&claims(), 1).expect("should issue");
        let payload = payload(&sd_jwt);

        assert_eq!(payload["iss"], ISSUER);
        assert_eq!(payload["iat"], issued_at().timestamp());
        assert_eq!(payload["vct"], "urn:eudi:pid:1");
        assert_eq!(payload["_sd_alg"], "sha-256");
        assert_eq!(payload["cnf"]["jwk"], serde_json::to_value(&holder).expect("should serialize"));

        // plain claims are visible, disclosable ones are not
        assert_eq!(payload["family_name"], "Mustermann");
        assert!(payload.get("given_name").is_none());
        assert!(payload.get("address").is_none());
        assert!(payload["nationalities"].get("first").is_none());
    }

    #[test]
    fn every_disclosure_is_digested() {
        let (_, _, sd_jwt) = issue(&claims(), 2).expect("should issue");
        let payload = payload(&sd_jwt);

        // given_name, address, address.street_address, nationalities.first
        assert_eq!(sd_jwt.disclosures.len(), 4);

        let top = digests(&payload);
        assert_eq!(top.len(), 2);
        assert!(top.contains(&find(&sd_jwt, "given_name").digest().as_str()));
        assert!(top.contains(&find(&sd_jwt, "address").digest().as_str()));
        assert!(top.windows(2).all(|w| w[0] <= w[1]));

        let address = find(&sd_jwt, "address").value();
        assert_eq!(address["country"], "DE");
        assert_eq!(digests(address), [find(&sd_jwt, "street_address").digest()]);

        assert_eq!(digests(&payload["nationalities"]), [find(&sd_jwt, "first").digest()]);
        assert_eq!(find(&sd_jwt, "given_name").value(), "Erika");
    }

    #[test]
    fn signature_verifies() {
        let (key, _, sd_jwt) = issue(&claims(), 3).expect("should issue");

        let (msg, sig) = sd_jwt.issuer_jwt.rsplit_once('.').expect("should have signature");
        let sig = Base64UrlUnpadded::decode_vec(sig).expect("should decode");
        let signature = Signature::from_slice(&sig).expect("should parse");
        key.verifying_key().verify(msg.as_bytes(), &signature).expect("should verify");
    }

    #[test]
    fn header() {
        let (key, _, sd_jwt) = issue(&claims(), 4).expect("should issue");
        let jwt: Jwt<Value> = sd_jwt.issuer_jwt.parse().expect("should decode");

        assert_eq!(jwt.header.typ, "dc+sd-jwt");
        assert_eq!(jwt.header.alg, key.algorithm());
        assert_eq!(jwt.header.x5c, Some(vec![Base64::encode_string(&key.x5chain()[0])]));
    }

    #[test]
    fn compact_serialization() {
        let (_, _, sd_jwt) = issue(&claims(), 5).expect("should issue");
        let compact = sd_jwt.to_string();

        assert!(compact.starts_with(&sd_jwt.issuer_jwt));
        assert!(compact.ends_with('~'));

        let parts: Vec<&str> = compact.split('~').collect();
        assert_eq!(parts.len(), sd_jwt.disclosures.len() + 2);
        for (part, disclosure) in parts[1..].iter().zip(&sd_jwt.disclosures) {
            assert_eq!(*part, disclosure.encoded());
        }
    }

    #[test]
    fn seeded_output_repeats() {
        let (_, _, first) = issue(&claims(), 6).expect("should issue");
        let (_, _, second) = issue(&claims(), 6).expect("should issue");
        assert_eq!(first, second);

        let (_, _, other) = issue(&claims(), 7).expect("should issue");
        assert_ne!(first.disclosures, other.disclosures);
    }

    #[test]
    fn no_disclosures() {
        let tree = ClaimTree::from_value(&json!({"given_name": {"value": "Erika"}})).expect("should parse");
        let (_, _, sd_jwt) = issue(&build_disclosure_claims(&tree), 8).expect("should issue");

        assert!(sd_jwt.disclosures.is_empty());
        assert!(payload(&sd_jwt).get(SD_DIGESTS).is_none());
        assert_eq!(sd_jwt.to_string(), format!("{}~", sd_jwt.issuer_jwt));
    }

    #[rstest]
    #[case::issuer("iss")]
    #[case::issued_at("iat")]
    #[case::credential_type("vct")]
    #[case::confirmation("cnf")]
    #[case::hash_algorithm("_sd_alg")]
    #[case::digests("_sd")]
    #[case::ellipsis("...")]
    fn reserved_names(#[case] name: &str) {
        let claims: DisclosureClaims =
            [(String::from(name), ClaimValue::Plain(Claim::Value(json!("value"))))].into_iter().collect();
        assert!(issue(&claims, 9).is_err());
    }

    #[test]
    fn reserved_nested_name() {
        let nested: DisclosureClaims =
            [(String::from("_sd"), ClaimValue::SelectivelyDisclosable(Claim::Value(json!("x"))))]
                .into_iter()
                .collect();
        let claims: DisclosureClaims =
            [(String::from("address"), ClaimValue::Plain(Claim::Object(nested)))].into_iter().collect();

        let err = issue(&claims, 10).expect_err("should fail");
        assert!(err.to_string().contains("reserved"));
    }
}
