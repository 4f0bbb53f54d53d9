//! JSON persisted form of documents.
//!
//! Explicit nulls become JSON `null`; absent fields are simply not written.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Number, Value as Json};

use crate::document::Document;
use crate::error::{TypeError, TypeResult};
use crate::value::{Scalar, Value};

impl Document {
    /// Render as a JSON object.
    pub fn to_json(&self) -> TypeResult<Json> {
        let mut map = Map::with_capacity(self.len());
        for (name, value) in self.iter() {
            map.insert(name.to_string(), value.to_json()?);
        }
        Ok(Json::Object(map))
    }

    /// Parse a JSON object into a document.
    pub fn from_json(json: &Json) -> TypeResult<Self> {
        match json {
            Json::Object(map) => map
                .iter()
                .map(|(name, value)| Ok::<_, TypeError>((name.clone(), Value::from_json(value)?)))
                .collect(),
            other => Err(TypeError::InvalidJson(format!(
                "expected an object at the document root, found {}",
                json_type_name(other)
            ))),
        }
    }

    /// Parse a document from JSON text.
    pub fn from_json_str(text: &str) -> TypeResult<Self> {
        let json: Json =
            serde_json::from_str(text).map_err(|e| TypeError::InvalidJson(e.to_string()))?;
        Self::from_json(&json)
    }
}

impl Value {
    pub fn to_json(&self) -> TypeResult<Json> {
        Ok(match self {
            Value::Null => Json::Null,
            Value::Scalar(Scalar::Bool(b)) => Json::Bool(*b),
            Value::Scalar(Scalar::Int(i)) => Json::Number((*i).into()),
            Value::Scalar(Scalar::Float(x)) => Json::Number(Number::from_f64(*x).ok_or_else(
                || TypeError::UnrepresentableValue(format!("non-finite float {x}")),
            )?),
            Value::Scalar(Scalar::Text(s)) => Json::String(s.clone()),
            Value::Object(doc) => doc.to_json()?,
            Value::Array(items) => Json::Array(
                items
                    .iter()
                    .map(Value::to_json)
                    .collect::<TypeResult<Vec<_>>>()?,
            ),
        })
    }

    pub fn from_json(json: &Json) -> TypeResult<Self> {
        Ok(match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Scalar(Scalar::Bool(*b)),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Scalar(Scalar::Int(i))
                } else if n.is_u64() {
                    return Err(TypeError::UnrepresentableValue(format!(
                        "{n} exceeds the signed 64-bit range"
                    )));
                } else {
                    let x = n.as_f64().ok_or_else(|| {
                        TypeError::UnrepresentableValue(format!("number {n}"))
                    })?;
                    Value::Scalar(Scalar::Float(x))
                }
            }
            Json::String(s) => Value::Scalar(Scalar::Text(s.clone())),
            Json::Array(items) => Value::Array(
                items
                    .iter()
                    .map(Value::from_json)
                    .collect::<TypeResult<Vec<_>>>()?,
            ),
            Json::Object(_) => Value::Object(Document::from_json(json)?),
        })
    }
}

fn json_type_name(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            Value::Scalar(Scalar::Int(i)) => serializer.serialize_i64(*i),
            Value::Scalar(Scalar::Float(x)) => {
                if !x.is_finite() {
                    return Err(S::Error::custom(format!("non-finite float {x}")));
                }
                serializer.serialize_f64(*x)
            }
            Value::Scalar(Scalar::Text(s)) => serializer.serialize_str(s),
            Value::Object(doc) => doc.serialize(serializer),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = Json::deserialize(deserializer)?;
        Document::from_json(&json).map_err(serde::de::Error::custom)
    }
}
