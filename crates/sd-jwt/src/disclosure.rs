//! # Disclosures
//!
//! A disclosure reveals one selectively disclosable claim: the base64url
//! encoding of the JSON array `[salt, claim name, claim value]`. The issuer
//! signs only its digest.

use std::fmt::{self, Display};

use base64ct::{Base64UrlUnpadded, Encoding};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// A single selectively disclosable claim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Disclosure {
    salt: String,
    name: String,
    value: Value,
    encoded: String,
}

impl Disclosure {
    /// Create a disclosure for the named claim.
    ///
    /// # Errors
    ///
    /// Returns an error if the claim cannot be serialized.
    pub fn new(salt: impl Into<String>, name: impl Into<String>, value: Value) -> anyhow::Result<Self> {
        let salt = salt.into();
        let name = name.into();
        let array = serde_json::to_vec(&(&salt, &name, &value))?;

        Ok(Self {
            encoded: Base64UrlUnpadded::encode_string(&array),
            salt,
            name,
            value,
        })
    }

    /// The claim name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The disclosed claim value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// The salt.
    #[must_use]
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// The base64url-encoded disclosure, as appended to the SD-JWT.
    #[must_use]
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// base64url SHA-256 digest of the encoded disclosure, as listed in the
    /// enclosing object's `_sd` array.
    #[must_use]
    pub fn digest(&self) -> String {
        Base64UrlUnpadded::encode_string(&Sha256::digest(self.encoded.as_bytes()))
    }
}

impl Display for Disclosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}
