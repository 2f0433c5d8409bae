//! # Information Security for Credential Test Data
//!
//! Key material and encoding helpers shared by the mdoc and SD-JWT issuers:
//!
//! - [`IssuerKey`]: the document signer's certificate chain and private key,
//!   loaded from PEM and exposed through the [`Signer`] trait;
//! - [`DeviceKey`]: a freshly generated holder key pair, bound into each
//!   credential;
//! - [`Randomness`]: the source of salts, random element values and device
//!   keys, which may be seeded for reproducible output;
//! - [`cose`] and [`jose`]: CBOR/COSE and JSON key representations.

pub mod cose;
pub mod jose;
mod keys;

use serde::{Deserialize, Serialize};

pub use crate::jose::PublicKeyJwk;
pub use crate::keys::{DeviceKey, IssuerKey, Randomness};

/// Signer is used by the credential issuers to sign credentials on behalf of
/// the document signer.
pub trait Signer {
    /// Sign the message, returning the raw signature bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be signed.
    fn try_sign(&self, msg: &[u8]) -> anyhow::Result<Vec<u8>>;

    /// Algorithm returns the algorithm used by the signer.
    fn algorithm(&self) -> Algorithm;

    /// The signer's certificate chain, DER encoded, leaf first.
    fn x5chain(&self) -> &[Vec<u8>];
}

/// Algorithm is used to specify the signing algorithm used by the signer.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum Algorithm {
    /// ECDSA using the P-256 curve and SHA-256.
    #[default]
    ES256,
}

impl Algorithm {
    /// The JWS `alg` header value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ES256 => "ES256",
        }
    }
}

impl From<Algorithm> for coset::iana::Algorithm {
    fn from(alg: Algorithm) -> Self {
        match alg {
            Algorithm::ES256 => Self::ES256,
        }
    }
}

/// Cryptographic key type.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
pub enum KeyType {
    /// Elliptic curve key pair
    #[default]
    #[serde(rename = "EC")]
    Ec,
}

/// Cryptographic curve type.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
pub enum Curve {
    /// NIST P-256 curve
    #[default]
    #[serde(rename = "P-256")]
    P256,
}
