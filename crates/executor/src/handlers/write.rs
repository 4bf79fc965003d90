//! Write-path handlers: `add`, `del`, `set`, `incrBy`.

use tidemark_core::{Error, Record, Result, Scalar};
use tidemark_storage::SeriesStore;

use crate::handlers::{fetch_point, point_member, upsert};
use crate::reply::{render, Reply};
use tidemark_engine::Format;

/// `add key ts field value [field value …]` - insert an entry,
/// overwriting any entry already at that timestamp.
pub fn add<S: SeriesStore>(
    store: &mut S,
    key: &str,
    ts: i64,
    fields: &[(String, Scalar)],
) -> Result<Reply> {
    let record: Record = fields.iter().cloned().collect();
    upsert(store, key, ts, &record)?;
    Ok(Reply::Int(ts))
}

/// `del key ts [ts …]` - remove entries by timestamp.
pub fn del<S: SeriesStore>(store: &mut S, key: &str, timestamps: &[i64]) -> Result<Reply> {
    let mut removed = 0;
    for &ts in timestamps {
        if let Some(member) = point_member(store, key, ts)? {
            removed += store.remove(key, &[member]) as i64;
        }
    }
    Ok(Reply::Int(removed))
}

/// `set key ts field value [field value …]` - merge fields into the
/// entry at `ts`, creating it if absent. A null value drops the field.
pub fn set<S: SeriesStore>(
    store: &mut S,
    key: &str,
    ts: i64,
    fields: &[(String, Scalar)],
) -> Result<Reply> {
    let mut record = match fetch_point(store, key, ts)? {
        Some(raw) => raw.entry.record,
        None => Record::new(),
    };
    for (name, value) in fields {
        record.insert(name.clone(), value.clone());
    }
    upsert(store, key, ts, &record)?;
    Ok(Reply::Str("OK".to_string()))
}

/// `incrBy key ts field delta [field delta …]` - add deltas to numeric
/// fields, creating missing fields at zero. Returns the new values in
/// argument order; non-integer results are stringified on the native
/// output path.
pub fn incr_by<S: SeriesStore>(
    store: &mut S,
    key: &str,
    ts: i64,
    deltas: &[(String, f64)],
) -> Result<Reply> {
    let mut record = match fetch_point(store, key, ts)? {
        Some(raw) => raw.entry.record,
        None => Record::new(),
    };

    let mut updated = Vec::with_capacity(deltas.len());
    for (field, delta) in deltas {
        let current = match record.get(field) {
            None | Some(Scalar::Null) => 0.0,
            Some(value) => value.as_number().ok_or_else(|| Error::NotANumber {
                verb: "incrBy".to_string(),
                field: field.clone(),
            })?,
        };
        let next = Scalar::number(current + delta);
        record.insert(field.clone(), next.clone());
        updated.push(serde_json::Value::from(&next));
    }
    upsert(store, key, ts, &record)?;
    render(serde_json::Value::Array(updated), Format::Native)
}
