//! Scalar value model for tidemark records.
//!
//! Every record field holds a [`Scalar`]: a dynamically-typed variant over
//! the five storable types. The model is deliberately small - records are
//! flat, schema-less mappings with O(10) fields.
//!
//! ## Type rules
//!
//! - Float equality follows IEEE-754: `NaN != NaN`, `-0.0 == 0.0`
//! - Comparisons across numeric tags promote to `f64`
//! - Strings that parse as numbers coerce to numbers at the codec boundary,
//!   never here; `Scalar` itself performs no implicit coercion

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// One entry's record: field name to scalar value.
///
/// Decoded field order is not preserved across write/read; the map's sorted
/// iteration order is an implementation detail callers must not rely on.
pub type Record = BTreeMap<String, Scalar>;

/// Dynamically-typed scalar stored in a record field.
#[derive(Debug, Clone)]
pub enum Scalar {
    /// Null value (absent fields decode as null for filter purposes)
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point (IEEE-754)
    Float(f64),
    /// UTF-8 string
    Str(String),
}

// IEEE-754 float semantics: NaN != NaN, -0.0 == 0.0. Different tags are
// never equal here; cross-tag coercion belongs to the filter layer.
impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::Float(a), Scalar::Float(b)) => a == b,
            (Scalar::Str(a), Scalar::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Scalar {
    /// Get the type name as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Null => "Null",
            Scalar::Bool(_) => "Bool",
            Scalar::Int(_) => "Int",
            Scalar::Float(_) => "Float",
            Scalar::Str(_) => "Str",
        }
    }

    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Numeric view of the scalar. `Int` and `Float` promote to `f64`;
    /// every other tag is `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as &str if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    /// True for floats with a fractional part. Drives the `'f'`/`'n'` flag
    /// byte in the stored key: only non-integer floats need the post-decode
    /// string coercion on the default output path.
    pub fn is_fractional_float(&self) -> bool {
        match self {
            Scalar::Float(f) => f.fract() != 0.0,
            _ => false,
        }
    }

    /// Build a numeric scalar from an `f64`, collapsing integral values
    /// back to `Int` so whole results stay integers on every output path.
    pub fn number(x: f64) -> Scalar {
        if x.fract() == 0.0 && x.abs() < 9.0e15 {
            Scalar::Int(x as i64)
        } else {
            Scalar::Float(x)
        }
    }

    /// Parse a string as a number: integers first, then floats.
    /// Returns `None` for anything that is not a finite decimal number.
    pub fn parse_number(s: &str) -> Option<Scalar> {
        if let Ok(i) = s.parse::<i64>() {
            return Some(Scalar::Int(i));
        }
        match s.parse::<f64>() {
            Ok(f) if f.is_finite() => Some(Scalar::Float(f)),
            _ => None,
        }
    }

    /// Interpret a command argument as a scalar. Numeric-looking strings
    /// become numbers so the stored flag byte is truthful, `null` becomes
    /// an explicit null (dropped at encode time), `true`/`false` become
    /// booleans, and everything else stays a string.
    pub fn from_arg(s: &str) -> Scalar {
        if let Some(n) = Scalar::parse_number(s) {
            return n;
        }
        match s {
            "null" => Scalar::Null,
            "true" => Scalar::Bool(true),
            "false" => Scalar::Bool(false),
            _ => Scalar::Str(s.to_string()),
        }
    }
}

/// Canonical display form: the stringification used by set membership,
/// `distinct` aggregation, and the hash storage target.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Str(s) => write!(f, "{}", s),
        }
    }
}

// Scalars serialize as their plain JSON counterparts (no enum tagging):
// this is what FORMAT json / FORMAT msgpack emit.
impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::Float(f) => serializer.serialize_f64(*f),
            Scalar::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&Scalar> for serde_json::Value {
    fn from(s: &Scalar) -> Self {
        match s {
            Scalar::Null => serde_json::Value::Null,
            Scalar::Bool(b) => serde_json::Value::Bool(*b),
            Scalar::Int(i) => serde_json::Value::Number((*i).into()),
            Scalar::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Scalar::Str(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl From<serde_json::Value> for Scalar {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Scalar::Null,
            serde_json::Value::Bool(b) => Scalar::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Scalar::Int(i)
                } else {
                    Scalar::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Scalar::Str(s),
            // Records are flat; nested shapes have no scalar form
            other => Scalar::Str(other.to_string()),
        }
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Scalar::Float(f)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

/// Field names are identifiers: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_field_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
