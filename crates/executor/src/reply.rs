//! Reply tree and output formatting.
//!
//! Every verb first builds its result as a `serde_json::Value` - the
//! logical shape shared by all three output formats - and then renders it:
//!
//! - default: the native ordered-sequence reply. Objects flatten to
//!   `[name, value, …]` pairs, booleans become the strings
//!   `true`/`false`, and non-integer numbers are stringified so the
//!   host's wire format cannot truncate them;
//! - `FORMAT json`: one JSON string, numbers native;
//! - `FORMAT msgpack`: the same logical shape as one msgpack blob.

use tidemark_core::{Error, Record, Result};
use tidemark_engine::{AggValue, BucketRow, Format};

/// Native ordered-sequence reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Missing data (absent point lookup).
    Nil,
    /// Integer reply.
    Int(i64),
    /// String reply.
    Str(String),
    /// Binary reply (`FORMAT msgpack`).
    Bytes(Vec<u8>),
    /// Sequence reply.
    Array(Vec<Reply>),
}

impl Reply {
    /// Integer view, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Reply::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// String view, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Reply::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Sequence view, if this is an `Array`.
    pub fn as_array(&self) -> Option<&[Reply]> {
        match self {
            Reply::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// Convert the logical shape to the native reply tree.
fn native(value: &serde_json::Value) -> Reply {
    match value {
        serde_json::Value::Null => Reply::Nil,
        serde_json::Value::Bool(b) => Reply::Str(b.to_string()),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Reply::Int(i)
            } else {
                let f = n.as_f64().unwrap_or(0.0);
                if f.fract() == 0.0 && f.abs() < 9.0e15 {
                    Reply::Int(f as i64)
                } else {
                    // Full-precision decimal text survives hosts that
                    // truncate floats on the wire.
                    Reply::Str(format!("{f}"))
                }
            }
        }
        serde_json::Value::String(s) => Reply::Str(s.clone()),
        serde_json::Value::Array(items) => Reply::Array(items.iter().map(native).collect()),
        serde_json::Value::Object(map) => {
            let mut flat = Vec::with_capacity(map.len() * 2);
            for (name, item) in map {
                flat.push(Reply::Str(name.clone()));
                flat.push(native(item));
            }
            Reply::Array(flat)
        }
    }
}

/// Render the logical shape in the requested output format.
pub fn render(value: serde_json::Value, format: Format) -> Result<Reply> {
    match format {
        Format::Native => Ok(native(&value)),
        Format::Json => serde_json::to_string(&value)
            .map(Reply::Str)
            .map_err(|e| Error::Serialization {
                reason: e.to_string(),
            }),
        Format::Msgpack => rmp_serde::to_vec(&value)
            .map(Reply::Bytes)
            .map_err(|e| Error::Serialization {
                reason: e.to_string(),
            }),
    }
}

/// A record as a JSON object.
pub fn record_value(record: &Record) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = record
        .iter()
        .map(|(name, scalar)| (name.clone(), serde_json::Value::from(scalar)))
        .collect();
    serde_json::Value::Object(map)
}

fn agg_value(value: &AggValue) -> serde_json::Value {
    match value {
        AggValue::Scalar(s) => serde_json::Value::from(s),
        AggValue::List(items) => {
            serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
        }
        AggValue::Map(pairs) => {
            let map: serde_json::Map<String, serde_json::Value> = pairs
                .iter()
                .map(|(name, s)| (name.clone(), serde_json::Value::from(s)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// One entry as `[ts, {record}]`.
pub fn entry_value(ts: i64, record: &Record) -> serde_json::Value {
    serde_json::Value::Array(vec![ts.into(), record_value(record)])
}

/// One aggregated bucket as `[ts, {field: {kind: value}}]`.
pub fn bucket_value(row: &BucketRow) -> serde_json::Value {
    let mut fields = serde_json::Map::new();
    for (field, kinds) in &row.fields {
        let mut by_kind = serde_json::Map::new();
        for (kind, value) in kinds {
            by_kind.insert(kind.to_string(), agg_value(value));
        }
        fields.insert(field.clone(), serde_json::Value::Object(by_kind));
    }
    serde_json::Value::Array(vec![row.ts.into(), serde_json::Value::Object(fields)])
}
