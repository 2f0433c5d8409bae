//! # JOSE
//!
//! JSON Object Signing and Encryption (JOSE) key representations.

mod jwk;

pub use jwk::PublicKeyJwk;
