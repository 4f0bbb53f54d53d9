//! Document value types.
//!
//! A document field holds a [`Value`]: an explicit null, a [`Scalar`], a
//! nested [`Document`], or an ordered array. A field that is not stored at all
//! is *absent*, which is a different state from holding `Value::Null`.
//! [`Slot`] names all five states in one enum so callers can match on them.

use std::fmt;

use crate::document::Document;

/// Native scalar representation stored in documents.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    /// Always finite; non-finite floats are rejected on conversion.
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Returns the kind name as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "bool",
            Scalar::Int(_) => "int",
            Scalar::Float(_) => "float",
            Scalar::Text(_) => "text",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A value stored under a document field.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Explicit null. Distinct from an absent field.
    Null,
    Scalar(Scalar),
    /// Nested document (embedded one-to-one dependent).
    Object(Document),
    /// Ordered sequence (embedded one-to-many dependents).
    Array(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Document> {
        match self {
            Value::Object(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Document> {
        match self {
            Value::Object(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the type name as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Scalar(s) => s.type_name(),
            Value::Object(_) => "object",
            Value::Array(_) => "array",
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Value::Scalar(scalar)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Object(doc)
    }
}

impl From<Vec<Document>> for Value {
    fn from(docs: Vec<Document>) -> Self {
        Value::Array(docs.into_iter().map(Value::Object).collect())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Scalar(Scalar::Int(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Scalar(Scalar::Float(x))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(Scalar::Text(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(Scalar::Text(s))
    }
}

/// Borrowed view of one document field, including the absent state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Slot<'a> {
    /// The field is not stored in the document.
    Absent,
    /// The field is stored as an explicit null.
    Null,
    Scalar(&'a Scalar),
    Object(&'a Document),
    Array(&'a [Value]),
}

impl<'a> Slot<'a> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Slot::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Slot::Null)
    }
}

impl<'a> From<Option<&'a Value>> for Slot<'a> {
    fn from(value: Option<&'a Value>) -> Self {
        match value {
            None => Slot::Absent,
            Some(Value::Null) => Slot::Null,
            Some(Value::Scalar(s)) => Slot::Scalar(s),
            Some(Value::Object(doc)) => Slot::Object(doc),
            Some(Value::Array(items)) => Slot::Array(items),
        }
    }
}
