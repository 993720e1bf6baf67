//! Backend-neutral column values and conversions.
//!
//! [`Value`] is what flows between the compiler, the transport, and the
//! materializer. Literals in criteria and join expressions are `Value`s that get
//! coerced to the mapped column's [`ColumnType`] before being bound.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared database type of a mapped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[serde(alias = "int", alias = "bigint", alias = "long")]
    Integer,
    #[serde(alias = "double", alias = "float", alias = "decimal")]
    Real,
    #[serde(alias = "string", alias = "varchar")]
    Text,
    #[serde(alias = "bool")]
    Boolean,
    #[serde(alias = "binary", alias = "bytes")]
    Blob,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Real => "real",
            ColumnType::Text => "text",
            ColumnType::Boolean => "boolean",
            ColumnType::Blob => "blob",
        };
        f.write_str(name)
    }
}

/// A single column value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Boolean(bool),
    Blob(Vec<u8>),
}

/// Failure converting a [`Value`] to another type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("expected {expected}, found {found}")]
    Mismatch { expected: &'static str, found: String },

    #[error("cannot parse '{text}' as {expected}")]
    Parse { text: String, expected: &'static str },

    #[error("value {value} is out of range for {target}")]
    OutOfRange { value: String, target: &'static str },

    #[error("unexpected null for non-optional {target}")]
    UnexpectedNull { target: &'static str },
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
            Value::Blob(_) => "blob",
        }
    }

    fn mismatch(&self, expected: &'static str) -> ValueError {
        ValueError::Mismatch {
            expected,
            found: format!("{} {}", self.kind(), self),
        }
    }

    /// Convert this value to the representation expected by a column of type `target`.
    ///
    /// Nulls stay null. Text is parsed when the target is numeric or boolean.
    pub fn coerce(self, target: ColumnType) -> Result<Value, ValueError> {
        match (target, self) {
            (_, Value::Null) => Ok(Value::Null),

            (ColumnType::Integer, v @ Value::Integer(_)) => Ok(v),
            (ColumnType::Integer, Value::Real(f)) if f.fract() == 0.0 => {
                // i64::MAX as f64 rounds up to 2^63, which does not fit.
                if f >= i64::MIN as f64 && f < i64::MAX as f64 {
                    Ok(Value::Integer(f as i64))
                } else {
                    Err(ValueError::OutOfRange {
                        value: f.to_string(),
                        target: "integer",
                    })
                }
            }
            (ColumnType::Integer, Value::Boolean(b)) => Ok(Value::Integer(i64::from(b))),
            (ColumnType::Integer, Value::Text(s)) => {
                s.trim().parse().map(Value::Integer).map_err(|_| ValueError::Parse {
                    text: s,
                    expected: "integer",
                })
            }

            (ColumnType::Real, v @ Value::Real(_)) => Ok(v),
            (ColumnType::Real, Value::Integer(i)) => Ok(Value::Real(i as f64)),
            (ColumnType::Real, Value::Text(s)) => {
                s.trim().parse().map(Value::Real).map_err(|_| ValueError::Parse {
                    text: s,
                    expected: "real",
                })
            }

            (ColumnType::Text, v @ Value::Text(_)) => Ok(v),
            (ColumnType::Text, v @ (Value::Integer(_) | Value::Real(_) | Value::Boolean(_))) => {
                Ok(Value::Text(v.to_string()))
            }

            (ColumnType::Boolean, v @ Value::Boolean(_)) => Ok(v),
            (ColumnType::Boolean, Value::Integer(0)) => Ok(Value::Boolean(false)),
            (ColumnType::Boolean, Value::Integer(1)) => Ok(Value::Boolean(true)),
            (ColumnType::Boolean, Value::Text(s)) => match s.trim().to_lowercase().as_str() {
                "true" | "1" => Ok(Value::Boolean(true)),
                "false" | "0" => Ok(Value::Boolean(false)),
                _ => Err(ValueError::Parse {
                    text: s,
                    expected: "boolean",
                }),
            },

            (ColumnType::Blob, v @ Value::Blob(_)) => Ok(v),
            (ColumnType::Blob, Value::Text(s)) => Ok(Value::Blob(s.into_bytes())),

            (target, other) => Err(other.mismatch(match target {
                ColumnType::Integer => "integer",
                ColumnType::Real => "real",
                ColumnType::Text => "text",
                ColumnType::Boolean => "boolean",
                ColumnType::Blob => "blob",
            })),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Blob(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    i64 => Integer,
    i32 => Integer,
    u32 => Integer,
    f64 => Real,
    bool => Boolean,
    String => Text,
    Vec<u8> => Blob,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

// =============================================================================
// Reading values into fields
// =============================================================================

/// Conversion from a column [`Value`] into a record field type.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(value)
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value.coerce(ColumnType::Integer)? {
            Value::Integer(i) => Ok(i),
            Value::Null => Err(ValueError::UnexpectedNull { target: "i64" }),
            other => Err(other.mismatch("integer")),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|_| ValueError::OutOfRange {
            value: wide.to_string(),
            target: "i32",
        })
    }
}

impl FromValue for u32 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        let wide = i64::from_value(value)?;
        u32::try_from(wide).map_err(|_| ValueError::OutOfRange {
            value: wide.to_string(),
            target: "u32",
        })
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value.coerce(ColumnType::Real)? {
            Value::Real(r) => Ok(r),
            Value::Null => Err(ValueError::UnexpectedNull { target: "f64" }),
            other => Err(other.mismatch("real")),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value.coerce(ColumnType::Boolean)? {
            Value::Boolean(b) => Ok(b),
            Value::Null => Err(ValueError::UnexpectedNull { target: "bool" }),
            other => Err(other.mismatch("boolean")),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value.coerce(ColumnType::Text)? {
            Value::Text(s) => Ok(s),
            Value::Null => Err(ValueError::UnexpectedNull { target: "String" }),
            other => Err(other.mismatch("text")),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value.coerce(ColumnType::Blob)? {
            Value::Blob(b) => Ok(b),
            Value::Null => Err(ValueError::UnexpectedNull { target: "Vec<u8>" }),
            other => Err(other.mismatch("blob")),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}
