//! Per-verb handlers, split by topic, plus the shared point-lookup and
//! upsert primitives they are built from.

pub mod copy;
pub mod read;
pub mod scan;
pub mod write;

use tidemark_core::{Error, Record, Result};
use tidemark_engine::{codec, point_range};
use tidemark_storage::{Limit, SeriesStore};

/// A decoded entry still holding its raw stored member, so destructive
/// verbs can delete exactly what they consumed.
#[derive(Debug, Clone)]
pub(crate) struct RawEntry {
    pub member: Vec<u8>,
    pub entry: codec::Entry,
}

// Point lookups scan [T| .. (T+1| with a store-side limit of 2: one match
// is the entry, two is a broken invariant.
const POINT_LIMIT: Limit = Limit { offset: 0, count: 2 };

/// Fetch the raw member for one timestamp without decoding it.
pub(crate) fn point_member<S: SeriesStore>(
    store: &S,
    key: &str,
    ts: i64,
) -> Result<Option<Vec<u8>>> {
    let mut members = store.scan(key, &point_range(ts), Some(POINT_LIMIT));
    match members.len() {
        0 => Ok(None),
        1 => Ok(Some(members.remove(0))),
        _ => Err(Error::DuplicateTimestamp { ts }),
    }
}

/// Fetch and decode the entry for one timestamp.
pub(crate) fn fetch_point<S: SeriesStore>(
    store: &S,
    key: &str,
    ts: i64,
) -> Result<Option<RawEntry>> {
    match point_member(store, key, ts)? {
        None => Ok(None),
        Some(member) => {
            let entry = codec::decode(&member)?;
            Ok(Some(RawEntry { member, entry }))
        }
    }
}

/// Write an entry, removing any previous entry at the same timestamp
/// first so the one-key-per-timestamp invariant holds.
pub(crate) fn upsert<S: SeriesStore>(
    store: &mut S,
    key: &str,
    ts: i64,
    record: &Record,
) -> Result<()> {
    let encoded = codec::encode(ts, record)?;
    store.remove_range(key, &point_range(ts));
    store.insert(key, &encoded);
    Ok(())
}
