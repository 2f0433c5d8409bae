//! # CBOR
//!
//! This module provides CBOR helper functions and types.

use std::io::Cursor;
use std::ops::Deref;

use anyhow::anyhow;
use ciborium::Value;
use coset::{AsCborValue, CoseError};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};

/// Serialize a value to a CBOR byte vector.
///
/// # Errors
///
/// Returns an error if the value cannot be represented as CBOR.
pub fn to_vec<T>(value: &T) -> anyhow::Result<Vec<u8>>
where
    T: Serialize,
{
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf)?;
    Ok(buf)
}

/// Deserialize a value from a CBOR byte slice.
///
/// # Errors
///
/// Returns an error if the bytes are not valid CBOR or do not match `T`.
pub fn from_slice<T>(slice: &[u8]) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    ciborium::from_reader(Cursor::new(&slice)).map_err(|e| {
        anyhow!(CoseError::DecodeFailed(ciborium::de::Error::Semantic(None, e.to_string())))
    })
}

/// Wrap types that require tagging with tag 24 (encoded CBOR data item).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag24<T>(pub T);

impl<T> Deref for Tag24<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Serialize> Tag24<T> {
    /// Serialize the wrapper, tag included, to a CBOR byte vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the inner value cannot be represented as CBOR.
    pub fn to_vec(&self) -> anyhow::Result<Vec<u8>> {
        to_vec(self)
    }
}

impl<T: DeserializeOwned> TryFrom<Value> for Tag24<T> {
    type Error = anyhow::Error;

    fn try_from(v: Value) -> anyhow::Result<Self> {
        match v {
            Value::Tag(24, value) => match *value {
                Value::Bytes(bytes) => Ok(Self(from_slice(&bytes)?)),
                other => Err(anyhow!("invalid tag: {other:?}")),
            },
            other => Err(anyhow!("not a tag24: {other:?}")),
        }
    }
}

impl<T: Serialize> Serialize for Tag24<T> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let bytes = to_vec(&self.0).map_err(ser::Error::custom)?;
        Value::Tag(24, Box::new(Value::Bytes(bytes))).serialize(s)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Tag24<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        value.try_into().map_err(de::Error::custom)
    }
}

/// A byte string, encoded as a CBOR `bstr` rather than an array of integers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bytes(pub Vec<u8>);

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Serialize for Bytes {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Bytes(bytes) => Ok(Self(bytes)),
            other => Err(de::Error::custom(format!("expected a byte string: {other:?}"))),
        }
    }
}

/// Adapter for `coset` types that implement `AsCborValue` but not
/// `Serialize`/`Deserialize`.
#[derive(Debug, Clone, PartialEq)]
pub struct CborValue<T>(pub T);

impl<T> Deref for CborValue<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Clone + AsCborValue> Serialize for CborValue<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.clone().to_cbor_value().map_err(ser::Error::custom)?.serialize(serializer)
    }
}

impl<'de, T: AsCborValue> Deserialize<'de> for CborValue<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::from_cbor_value(Value::deserialize(deserializer)?).map_err(de::Error::custom).map(Self)
    }
}
