//! Runtime field values read from tracked entries.
//!
//! Entries expose richer values than a document can store natively. Every
//! [`FieldValue`] converts to a [`Scalar`] when written into a document, and
//! decodes back from a scalar given the field's declared [`ScalarKind`].

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TypeError, TypeResult};
use crate::value::{Scalar, Value};

/// Declared kind of a scalar field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Bool,
    I64,
    U64,
    F64,
    Text,
    Uuid,
    Timestamp,
    Bytes,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::Bool => "bool",
            ScalarKind::I64 => "i64",
            ScalarKind::U64 => "u64",
            ScalarKind::F64 => "f64",
            ScalarKind::Text => "text",
            ScalarKind::Uuid => "uuid",
            ScalarKind::Timestamp => "timestamp",
            ScalarKind::Bytes => "bytes",
        };
        f.write_str(name)
    }
}

/// Current value of one scalar field on an entry.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Bytes(Vec<u8>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// The kind of this value, or `None` for null.
    pub fn kind(&self) -> Option<ScalarKind> {
        Some(match self {
            FieldValue::Null => return None,
            FieldValue::Bool(_) => ScalarKind::Bool,
            FieldValue::I64(_) => ScalarKind::I64,
            FieldValue::U64(_) => ScalarKind::U64,
            FieldValue::F64(_) => ScalarKind::F64,
            FieldValue::Text(_) => ScalarKind::Text,
            FieldValue::Uuid(_) => ScalarKind::Uuid,
            FieldValue::Timestamp(_) => ScalarKind::Timestamp,
            FieldValue::Bytes(_) => ScalarKind::Bytes,
        })
    }

    /// Convert to the document's native scalar, `None` for null.
    ///
    /// Fails for `u64` values above `i64::MAX` and for non-finite floats.
    pub fn to_scalar(&self) -> TypeResult<Option<Scalar>> {
        let scalar = match self {
            FieldValue::Null => return Ok(None),
            FieldValue::Bool(b) => Scalar::Bool(*b),
            FieldValue::I64(i) => Scalar::Int(*i),
            FieldValue::U64(u) => Scalar::Int(i64::try_from(*u).map_err(|_| {
                TypeError::UnrepresentableValue(format!("{u} exceeds the signed 64-bit range"))
            })?),
            FieldValue::F64(x) => {
                if !x.is_finite() {
                    return Err(TypeError::UnrepresentableValue(format!(
                        "non-finite float {x}"
                    )));
                }
                Scalar::Float(*x)
            }
            FieldValue::Text(s) => Scalar::Text(s.clone()),
            FieldValue::Uuid(u) => Scalar::Text(u.hyphenated().to_string()),
            FieldValue::Timestamp(t) => {
                Scalar::Text(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            FieldValue::Bytes(b) => Scalar::Text(hex::encode(b)),
        };
        Ok(Some(scalar))
    }

    /// Convert to a document value: explicit null or a scalar.
    pub fn to_value(&self) -> TypeResult<Value> {
        Ok(match self.to_scalar()? {
            Some(scalar) => Value::Scalar(scalar),
            None => Value::Null,
        })
    }

    /// Decode a stored scalar as a value of the declared `kind`.
    pub fn from_scalar(scalar: &Scalar, kind: ScalarKind) -> TypeResult<Self> {
        let mismatch = || TypeError::KindMismatch {
            expected: kind,
            found: scalar.type_name(),
        };
        match (kind, scalar) {
            (ScalarKind::Bool, Scalar::Bool(b)) => Ok(FieldValue::Bool(*b)),
            (ScalarKind::I64, Scalar::Int(i)) => Ok(FieldValue::I64(*i)),
            (ScalarKind::U64, Scalar::Int(i)) => u64::try_from(*i)
                .map(FieldValue::U64)
                .map_err(|_| TypeError::UnrepresentableValue(format!("{i} is negative"))),
            (ScalarKind::F64, Scalar::Float(x)) => Ok(FieldValue::F64(*x)),
            (ScalarKind::F64, Scalar::Int(i)) => Ok(FieldValue::F64(*i as f64)),
            (ScalarKind::Text, Scalar::Text(s)) => Ok(FieldValue::Text(s.clone())),
            (ScalarKind::Uuid, Scalar::Text(s)) => Uuid::parse_str(s)
                .map(FieldValue::Uuid)
                .map_err(|e| invalid_text(kind, s, e)),
            (ScalarKind::Timestamp, Scalar::Text(s)) => DateTime::parse_from_rfc3339(s)
                .map(|t| FieldValue::Timestamp(t.with_timezone(&Utc)))
                .map_err(|e| invalid_text(kind, s, e)),
            (ScalarKind::Bytes, Scalar::Text(s)) => hex::decode(s)
                .map(FieldValue::Bytes)
                .map_err(|e| invalid_text(kind, s, e)),
            _ => Err(mismatch()),
        }
    }

    /// Render as a document key.
    ///
    /// Text is used verbatim; integers and uuids are formatted. Returns
    /// `None` for null and for kinds that cannot identify a document.
    pub fn to_key_string(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::I64(i) => Some(i.to_string()),
            FieldValue::U64(u) => Some(u.to_string()),
            FieldValue::Uuid(u) => Some(u.hyphenated().to_string()),
            _ => None,
        }
    }
}

fn invalid_text(kind: ScalarKind, text: &str, err: impl fmt::Display) -> TypeError {
    TypeError::InvalidText {
        kind,
        text: text.to_string(),
        reason: err.to_string(),
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::I64(i64::from(i))
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::I64(i)
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::U64(u)
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::F64(x)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Uuid> for FieldValue {
    fn from(u: Uuid) -> Self {
        FieldValue::Uuid(u)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(t: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(t)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(b: Vec<u8>) -> Self {
        FieldValue::Bytes(b)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn null_converts_to_explicit_null() {
        assert_eq!(FieldValue::Null.to_scalar().unwrap(), None);
        assert_eq!(FieldValue::Null.to_value().unwrap(), Value::Null);
    }

    #[test]
    fn large_u64_is_unrepresentable() {
        let err = FieldValue::U64(u64::MAX).to_scalar().unwrap_err();
        assert!(matches!(err, TypeError::UnrepresentableValue(_)));
        assert_eq!(
            FieldValue::U64(42).to_scalar().unwrap(),
            Some(Scalar::Int(42))
        );
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        assert!(FieldValue::F64(f64::NAN).to_scalar().is_err());
        assert!(FieldValue::F64(f64::INFINITY).to_scalar().is_err());
        assert_eq!(
            FieldValue::F64(9.5).to_scalar().unwrap(),
            Some(Scalar::Float(9.5))
        );
    }

    #[test]
    fn uuid_and_timestamp_render_as_text() {
        let id = Uuid::from_u128(0x1234);
        assert_eq!(
            FieldValue::Uuid(id).to_scalar().unwrap(),
            Some(Scalar::Text("00000000-0000-0000-0000-000000001234".into()))
        );

        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(
            FieldValue::Timestamp(at).to_scalar().unwrap(),
            Some(Scalar::Text("2024-05-01T12:30:00Z".into()))
        );
    }

    #[test]
    fn bytes_render_as_hex() {
        assert_eq!(
            FieldValue::Bytes(vec![0xde, 0xad]).to_scalar().unwrap(),
            Some(Scalar::Text("dead".into()))
        );
    }

    #[test]
    fn decode_by_declared_kind() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let stored = FieldValue::Timestamp(at).to_scalar().unwrap().unwrap();
        assert_eq!(
            FieldValue::from_scalar(&stored, ScalarKind::Timestamp).unwrap(),
            FieldValue::Timestamp(at)
        );
        assert_eq!(
            FieldValue::from_scalar(&Scalar::Int(3), ScalarKind::F64).unwrap(),
            FieldValue::F64(3.0)
        );
    }

    #[test]
    fn decode_kind_mismatch() {
        let err = FieldValue::from_scalar(&Scalar::Text("x".into()), ScalarKind::I64).unwrap_err();
        assert_eq!(
            err,
            TypeError::KindMismatch {
                expected: ScalarKind::I64,
                found: "text"
            }
        );
    }

    #[test]
    fn decode_invalid_uuid_text() {
        let err =
            FieldValue::from_scalar(&Scalar::Text("nope".into()), ScalarKind::Uuid).unwrap_err();
        assert!(matches!(err, TypeError::InvalidText { kind: ScalarKind::Uuid, .. }));
    }

    #[test]
    fn key_strings() {
        assert_eq!(FieldValue::from("1").to_key_string().as_deref(), Some("1"));
        assert_eq!(FieldValue::I64(7).to_key_string().as_deref(), Some("7"));
        assert_eq!(FieldValue::Null.to_key_string(), None);
        assert_eq!(FieldValue::Bool(true).to_key_string(), None);
    }

    #[test]
    fn option_conversion() {
        assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some("a")), FieldValue::Text("a".into()));
    }
}
