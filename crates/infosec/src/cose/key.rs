//! # COSE Key
//!
//! Support for `COSE_Key` as defined in [RFC9052], restricted to the EC2
//! P-256 device keys carried in a mobile security object.
//!
//! [RFC9052]: https://www.rfc-editor.org/rfc/rfc9052.html#name-key-objects

use std::collections::BTreeMap;

use anyhow::anyhow;
use ciborium::value::Integer;
use ciborium::Value;
use serde::{Deserialize, Serialize};

use crate::Curve;

// COSE key labels and values (RFC 9053).
const KTY: i64 = 1;
const CRV: i64 = -1;
const X: i64 = -2;
const Y: i64 = -3;
const KTY_EC2: i64 = 2;
const CRV_P256: i64 = 1;

/// Implements [`COSE_Key`] as defined in [RFC9052].
///
/// [RFC9052]: https://www.rfc-editor.org/rfc/rfc9052.html#name-key-objects
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Value", into = "Value")]
#[allow(clippy::module_name_repetitions)]
pub enum CoseKey {
    /// Elliptic Curve Key Pair
    Ec2 {
        /// Curve
        crv: Curve,

        /// Public key X
        x: Vec<u8>,

        /// Public key Y
        y: Vec<u8>,
    },
}

/// Serialize `COSE_Key` to CBOR.
impl From<CoseKey> for Value {
    fn from(key: CoseKey) -> Self {
        match key {
            // kty: 1, EC2: 2, crv: -1, x: -2, y: -3
            CoseKey::Ec2 { crv, x, y } => Self::Map(vec![
                (Self::Integer(KTY.into()), Self::Integer(KTY_EC2.into())),
                (Self::Integer(CRV.into()), crv.into()),
                (Self::Integer(X.into()), Self::Bytes(x)),
                (Self::Integer(Y.into()), Self::Bytes(y)),
            ]),
        }
    }
}

/// Deserialize `COSE_Key` from CBOR.
impl TryFrom<Value> for CoseKey {
    type Error = anyhow::Error;

    fn try_from(v: Value) -> anyhow::Result<Self> {
        let map = match v {
            Value::Map(map) => map,
            other => return Err(anyhow!("Value is not a map: {other:?}")),
        };
        let mut map = map
            .into_iter()
            .map(|(k, v)| {
                let k = k.as_integer().ok_or_else(|| anyhow!("non-integer label: {k:?}"))?;
                Ok((k, v))
            })
            .collect::<anyhow::Result<BTreeMap<Integer, Value>>>()?;

        match (
            map.remove(&Integer::from(KTY)),
            map.remove(&Integer::from(CRV)),
            map.remove(&Integer::from(X)),
            map.remove(&Integer::from(Y)),
        ) {
            (
                Some(Value::Integer(kty)),
                Some(Value::Integer(crv_id)),
                Some(Value::Bytes(x)),
                Some(Value::Bytes(y)),
            ) if kty == Integer::from(KTY_EC2) => {
                let crv = i128::from(crv_id).try_into()?;
                Ok(Self::Ec2 { crv, x, y })
            }
            _ => Err(anyhow!("issue deserializing CoseKey")),
        }
    }
}

impl From<Curve> for Value {
    fn from(crv: Curve) -> Self {
        match crv {
            Curve::P256 => Self::Integer(CRV_P256.into()),
        }
    }
}

impl TryFrom<i128> for Curve {
    type Error = anyhow::Error;

    fn try_from(crv_id: i128) -> anyhow::Result<Self> {
        match crv_id {
            1 => Ok(Self::P256),
            _ => Err(anyhow!("unsupported curve: {crv_id}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cose::cbor;

    #[test]
    fn ec2_labels() {
        let key = CoseKey::Ec2 {
            crv: Curve::P256,
            x: vec![1; 32],
            y: vec![2; 32],
        };
        let value = Value::from(key.clone());

        let Value::Map(entries) = &value else {
            panic!("should be a map");
        };
        assert_eq!(entries[0], (Value::Integer(1.into()), Value::Integer(2.into())));
        assert_eq!(entries[1], (Value::Integer((-1).into()), Value::Integer(1.into())));

        let bytes = cbor::to_vec(&key).expect("should serialize");
        let decoded: CoseKey = cbor::from_slice(&bytes).expect("should deserialize");
        assert_eq!(decoded, key);
    }

    #[test]
    fn unsupported_curve() {
        let value = Value::Map(vec![
            (Value::Integer(1.into()), Value::Integer(2.into())),
            (Value::Integer((-1).into()), Value::Integer(2.into())),
            (Value::Integer((-2).into()), Value::Bytes(vec![1; 48])),
            (Value::Integer((-3).into()), Value::Bytes(vec![2; 48])),
        ]);
        assert!(CoseKey::try_from(value).is_err());
    }
}
