//! Entry codec: `(timestamp, record)` ⇄ ordered byte-string key.
//!
//! The stored layout is byte-exact and shared with existing deployments:
//!
//! ```text
//! <decimal-ts> 0x7C <flag:1> <msgpack kv array>
//! ```
//!
//! - the timestamp renders as decimal text so prefix-shaped bounds
//!   (`[T|`, `(T+1|`) select exactly one timestamp's entries;
//! - the flag byte is `'f'` when the packed record holds at least one
//!   non-integer float, `'n'` otherwise, and is recomputed on every
//!   mutation (it caches "does the default output path need float
//!   stringification for this record");
//! - the record packs as one msgpack array of alternating field names and
//!   scalar values. Field order inside the pack carries no meaning.
//!
//! Null-valued fields are dropped at encode time; absence and null are
//! equivalent on the read side. Strings that parse as numbers decode as
//! numbers so a record written as `amount "2500"` reads back as an
//! integer.

use tidemark_core::{Error, Record, Result, Scalar};

/// Timestamp/payload separator (`|`).
pub const SEPARATOR: u8 = 0x7C;
/// Flag byte: the record holds at least one non-integer float.
pub const FLAG_FLOAT: u8 = b'f';
/// Flag byte: no float coercion needed on the default output path.
pub const FLAG_PLAIN: u8 = b'n';

/// One decoded entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Entry timestamp.
    pub ts: i64,
    /// Flag byte as stored (`b'f'` or `b'n'`).
    pub flag: u8,
    /// Decoded record.
    pub record: Record,
}

fn scalar_to_pack(value: &Scalar) -> rmpv::Value {
    match value {
        Scalar::Null => rmpv::Value::Nil,
        Scalar::Bool(b) => rmpv::Value::Boolean(*b),
        Scalar::Int(i) => rmpv::Value::from(*i),
        Scalar::Float(f) => rmpv::Value::F64(*f),
        Scalar::Str(s) => rmpv::Value::from(s.as_str()),
    }
}

fn scalar_from_pack(value: rmpv::Value) -> Result<Scalar> {
    match value {
        rmpv::Value::Nil => Ok(Scalar::Null),
        rmpv::Value::Boolean(b) => Ok(Scalar::Bool(b)),
        rmpv::Value::Integer(i) => i
            .as_i64()
            .map(Scalar::Int)
            .ok_or_else(|| Error::corrupt("integer out of range in record pack")),
        rmpv::Value::F32(f) => Ok(Scalar::Float(f as f64)),
        rmpv::Value::F64(f) => Ok(Scalar::Float(f)),
        rmpv::Value::String(s) => {
            let s = s
                .into_str()
                .ok_or_else(|| Error::corrupt("non-utf8 string in record pack"))?;
            // Read-side numeric coercion: values stored as numeric-looking
            // strings come back as numbers.
            Ok(Scalar::parse_number(&s).unwrap_or(Scalar::Str(s)))
        }
        other => Err(Error::corrupt(format!(
            "unsupported pack type {:?}",
            other
        ))),
    }
}

/// Encode a timestamp and record into the stored key form.
pub fn encode(ts: i64, record: &Record) -> Result<Vec<u8>> {
    let mut key = ts.to_string().into_bytes();
    key.push(SEPARATOR);

    let flag = if record.values().any(Scalar::is_fractional_float) {
        FLAG_FLOAT
    } else {
        FLAG_PLAIN
    };
    key.push(flag);

    let mut items = Vec::with_capacity(record.len() * 2);
    for (name, value) in record {
        if value.is_null() {
            continue;
        }
        items.push(rmpv::Value::from(name.as_str()));
        items.push(scalar_to_pack(value));
    }
    rmpv::encode::write_value(&mut key, &rmpv::Value::Array(items))
        .map_err(|e| Error::Serialization {
            reason: e.to_string(),
        })?;
    Ok(key)
}

/// Parse just the timestamp prefix of a stored key.
pub fn decode_timestamp(bytes: &[u8]) -> Result<i64> {
    let sep = bytes
        .iter()
        .position(|&b| b == SEPARATOR)
        .ok_or_else(|| Error::corrupt("missing separator in stored key"))?;
    let ts_text = std::str::from_utf8(&bytes[..sep])
        .map_err(|_| Error::corrupt("non-utf8 timestamp in stored key"))?;
    ts_text
        .parse::<i64>()
        .map_err(|_| Error::corrupt(format!("non-numeric timestamp {ts_text:?}")))
}

/// Decode a stored key back into an [`Entry`].
pub fn decode(bytes: &[u8]) -> Result<Entry> {
    let sep = bytes
        .iter()
        .position(|&b| b == SEPARATOR)
        .ok_or_else(|| Error::corrupt("missing separator in stored key"))?;
    let ts = decode_timestamp(bytes)?;

    let rest = &bytes[sep + 1..];
    let (&flag, pack) = rest
        .split_first()
        .ok_or_else(|| Error::corrupt("missing flag byte in stored key"))?;
    if flag != FLAG_FLOAT && flag != FLAG_PLAIN {
        return Err(Error::corrupt(format!("unknown flag byte {}", flag as char)));
    }

    let mut reader = pack;
    let value = rmpv::decode::read_value(&mut reader)
        .map_err(|e| Error::corrupt(format!("truncated record pack: {e}")))?;
    let items = match value {
        rmpv::Value::Array(items) => items,
        _ => return Err(Error::corrupt("record pack is not an array")),
    };
    if items.len() % 2 != 0 {
        return Err(Error::corrupt("record pack has a dangling field name"));
    }

    let mut record = Record::new();
    let mut it = items.into_iter();
    while let (Some(name), Some(value)) = (it.next(), it.next()) {
        let name = match name {
            rmpv::Value::String(s) => s
                .into_str()
                .ok_or_else(|| Error::corrupt("non-utf8 field name in record pack"))?,
            _ => return Err(Error::corrupt("field name in record pack is not a string")),
        };
        record.insert(name, scalar_from_pack(value)?);
    }

    Ok(Entry { ts, flag, record })
}
