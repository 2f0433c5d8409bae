//! # COSE
//!
//! This module provides types for working with CBOR Object Signing and
//! Encryption (COSE) structures.

pub mod cbor;
mod key;

pub use cbor::{Bytes, CborValue, Tag24};
#[allow(clippy::module_name_repetitions)]
pub use key::CoseKey;
