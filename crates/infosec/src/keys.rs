//! # Key Material
//!
//! The document signer key used to sign every credential, the per-credential
//! device (holder) key, and the randomness both are derived from.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context};
use base64ct::{Base64Url, Base64UrlUnpadded, Encoding};
use p256::ecdsa::signature::Signer as _;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use p256::SecretKey;
use rand::rngs::StdRng;
use rand::{CryptoRng, RngCore, SeedableRng};
use tracing::{debug, instrument};
use x509_cert::der::Encode;
use x509_cert::Certificate;

use crate::cose::CoseKey;
use crate::jose::PublicKeyJwk;
use crate::{Algorithm, Curve, KeyType, Signer};

/// Source of randomness for salts, element randoms and device keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Randomness {
    /// Seeded from the operating system.
    #[default]
    Secure,

    /// Seeded from a fixed value so that output can be reproduced. Never use
    /// for credentials leaving a test environment.
    Deterministic(u64),
}

impl Randomness {
    /// Create a new random number generator from this source.
    #[must_use]
    pub fn rng(&self) -> StdRng {
        match self {
            Self::Secure => StdRng::from_entropy(),
            Self::Deterministic(seed) => StdRng::seed_from_u64(*seed),
        }
    }

    /// A source for one of several independent consumers. Deterministic
    /// seeds are mixed with `stream` so consumers never share a sequence.
    #[must_use]
    pub const fn stream(self, stream: u64) -> Self {
        match self {
            Self::Secure => Self::Secure,
            Self::Deterministic(seed) => {
                Self::Deterministic(seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
            }
        }
    }
}

impl From<Option<u64>> for Randomness {
    fn from(seed: Option<u64>) -> Self {
        seed.map_or(Self::Secure, Self::Deterministic)
    }
}

/// The document signer: a P-256 private key and its certificate chain.
#[derive(Clone, Debug)]
pub struct IssuerKey {
    signing_key: SigningKey,
    x5chain: Vec<Vec<u8>>,
}

impl IssuerKey {
    /// Create an issuer key from a PEM certificate chain (leaf first) and a
    /// PEM private key, either PKCS#8 (`PRIVATE KEY`) or SEC1
    /// (`EC PRIVATE KEY`).
    ///
    /// # Errors
    ///
    /// Returns an error if either input cannot be parsed, the chain is empty,
    /// or the private key does not belong to the leaf certificate.
    pub fn from_pem(cert_chain: &str, private_key: &str) -> anyhow::Result<Self> {
        let certs = Certificate::load_pem_chain(cert_chain.as_bytes())
            .map_err(|e| anyhow!("invalid certificate chain: {e}"))?;
        let Some(leaf) = certs.first() else {
            bail!("certificate chain is empty");
        };

        let secret = SecretKey::from_pkcs8_pem(private_key)
            .or_else(|_| SecretKey::from_sec1_pem(private_key))
            .map_err(|e| anyhow!("invalid private key: {e}"))?;

        let public = secret.public_key().to_encoded_point(false);
        let spki = &leaf.tbs_certificate.subject_public_key_info.subject_public_key;
        if spki.raw_bytes() != public.as_bytes() {
            bail!("private key does not match the leaf certificate");
        }

        let x5chain = certs
            .iter()
            .map(|cert| cert.to_der().map_err(|e| anyhow!("issue encoding certificate: {e}")))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self {
            signing_key: SigningKey::from(secret),
            x5chain,
        })
    }

    /// Read the certificate chain and private key from PEM files.
    ///
    /// # Errors
    ///
    /// Returns an error naming the file that cannot be read or parsed.
    #[instrument(level = "debug")]
    pub fn load(cert_path: &Path, key_path: &Path) -> anyhow::Result<Self> {
        let cert_chain = fs::read_to_string(cert_path)
            .with_context(|| format!("issue reading certificate {}", cert_path.display()))?;
        let private_key = fs::read_to_string(key_path)
            .with_context(|| format!("issue reading private key {}", key_path.display()))?;

        let key = Self::from_pem(&cert_chain, &private_key).with_context(|| {
            format!("issue loading {} and {}", cert_path.display(), key_path.display())
        })?;
        debug!(certificates = key.x5chain.len(), "loaded issuer key");

        Ok(key)
    }

    /// The key used to verify this issuer's signatures.
    #[must_use]
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }
}

impl Signer for IssuerKey {
    fn try_sign(&self, msg: &[u8]) -> anyhow::Result<Vec<u8>> {
        let signature: Signature =
            self.signing_key.try_sign(msg).map_err(|e| anyhow!("issue signing: {e}"))?;
        Ok(signature.to_bytes().to_vec())
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::ES256
    }

    fn x5chain(&self) -> &[Vec<u8>] {
        &self.x5chain
    }
}

/// A holder key pair generated for a single credential.
#[derive(Clone, Debug)]
pub struct DeviceKey {
    secret: SecretKey,
    x: Vec<u8>,
    y: Vec<u8>,
}

impl DeviceKey {
    /// Generate a new P-256 key pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the public key cannot be expressed as affine
    /// coordinates.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> anyhow::Result<Self> {
        let secret = SecretKey::random(rng);
        let point = secret.public_key().to_encoded_point(false);
        let (Some(x), Some(y)) = (point.x(), point.y()) else {
            bail!("device public key is the identity point");
        };

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            secret,
        })
    }

    /// The private key as PKCS#8 DER, base64url encoded with padding.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be encoded.
    pub fn to_pkcs8_base64url(&self) -> anyhow::Result<String> {
        let der = self.secret.to_pkcs8_der().map_err(|e| anyhow!("issue encoding device key: {e}"))?;
        Ok(Base64Url::encode_string(der.as_bytes()))
    }

    /// The public key as a JWK.
    #[must_use]
    pub fn public_jwk(&self) -> PublicKeyJwk {
        PublicKeyJwk {
            kty: KeyType::Ec,
            crv: Curve::P256,
            x: Base64UrlUnpadded::encode_string(&self.x),
            y: Base64UrlUnpadded::encode_string(&self.y),
        }
    }

    /// The public key as a `COSE_Key`.
    #[must_use]
    pub fn cose_key(&self) -> CoseKey {
        CoseKey::Ec2 {
            crv: Curve::P256,
            x: self.x.clone(),
            y: self.y.clone(),
        }
    }
}
