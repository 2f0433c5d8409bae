//! # JSON Web Token (JWT)
//!
//! Compact JWS serialization of the issuer-signed part of an SD-JWT.

use std::str::FromStr;

use anyhow::{anyhow, bail};
use base64ct::{Base64UrlUnpadded, Encoding};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use testdata_infosec::{Algorithm, Signer};

/// Represents a JWT as used for credential issuance.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Jwt<T> {
    /// The JWT header.
    pub header: Header,

    /// The JWT claims.
    pub claims: T,
}

/// Represents the JWT header.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Header {
    /// Digital signature algorithm identifier as per IANA "JSON Web Signature
    /// and Encryption Algorithms" registry.
    pub alg: Algorithm,

    /// Media type of the complete JWT, e.g. `dc+sd-jwt`.
    pub typ: String,

    /// Certificate chain corresponding to the key used to sign the JWT, each
    /// entry a standard base64 DER certificate, leaf first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x5c: Option<Vec<String>>,
}

impl<T: Serialize> Jwt<T> {
    /// The JWS signing input: `base64url(header).base64url(claims)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the header or claims cannot be serialized.
    pub fn signing_input(&self) -> anyhow::Result<String> {
        let header = Base64UrlUnpadded::encode_string(&serde_json::to_vec(&self.header)?);
        let claims = Base64UrlUnpadded::encode_string(&serde_json::to_vec(&self.claims)?);
        Ok(format!("{header}.{claims}"))
    }

    /// Sign the JWT, returning its compact serialization.
    ///
    /// # Errors
    ///
    /// Returns an error if the JWT cannot be serialized or the signer fails.
    pub fn sign(&self, signer: &impl Signer) -> anyhow::Result<String> {
        let msg = self.signing_input()?;
        let sig = signer.try_sign(msg.as_bytes())?;
        let sig_enc = Base64UrlUnpadded::encode_string(&sig);

        Ok(format!("{msg}.{sig_enc}"))
    }
}

/// Decode a compact JWT without verifying its signature.
impl<T: DeserializeOwned> FromStr for Jwt<T> {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            bail!("invalid JWT format");
        }

        let decode = |part: &str| {
            Base64UrlUnpadded::decode_vec(part).map_err(|e| anyhow!("invalid JWT encoding: {e}"))
        };

        Ok(Self {
            header: serde_json::from_slice(&decode(parts[0])?)?,
            claims: serde_json::from_slice(&decode(parts[1])?)?,
        })
    }
}
