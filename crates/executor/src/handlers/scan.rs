//! Range-family handlers: `range`, `revrange`, `poprange`, `remrange`,
//! and the shared scan pipeline they (and `count`/`copy`) run on.

use tidemark_core::{Record, Result};
use tidemark_engine::{aggregate, codec, translate_pair, ClockFn, Options};
use tidemark_storage::SeriesStore;

use crate::handlers::RawEntry;
use crate::reply::{bucket_value, entry_value, render, Reply};

/// FETCH → DECODE → FILTER with `LIMIT` in the right place: pushed down
/// to the store when no filter runs, applied to the match sequence when
/// one does.
pub(crate) fn collect_entries<S: SeriesStore>(
    store: &S,
    key: &str,
    from: &str,
    to: &str,
    options: &Options,
    rev: bool,
    clock: ClockFn,
) -> Result<Vec<RawEntry>> {
    let range = translate_pair(from, to, clock)?;
    let store_limit = if options.filter.is_none() {
        options.limit
    } else {
        None
    };
    let members = if rev {
        store.scan_rev(key, &range, store_limit)
    } else {
        store.scan(key, &range, store_limit)
    };

    let mut entries = Vec::with_capacity(members.len());
    for member in members {
        let entry = codec::decode(&member)?;
        if let Some(filter) = &options.filter {
            if !filter.matches(&entry.record) {
                continue;
            }
        }
        entries.push(RawEntry { member, entry });
    }
    if options.filter.is_some() {
        if let Some(limit) = options.limit {
            entries = limit.apply(entries);
        }
    }
    Ok(entries)
}

/// Projected `(ts, record)` view of the collected entries.
fn projected(entries: &[RawEntry], options: &Options) -> Vec<(i64, Record)> {
    entries
        .iter()
        .map(|raw| {
            let record = match &options.projection {
                Some(p) => p.apply(&raw.entry.record),
                None => raw.entry.record.clone(),
            };
            (raw.entry.ts, record)
        })
        .collect()
}

/// PROJECT → (AGGREGATE) → logical output shape.
pub(crate) fn materialize(
    entries: &[RawEntry],
    options: &Options,
    rev: bool,
) -> serde_json::Value {
    let rows = projected(entries, options);
    match &options.aggregation {
        Some(spec) => {
            let mut buckets = aggregate::aggregate(rows.iter().map(|(ts, r)| (*ts, r)), spec);
            if rev {
                buckets.reverse();
            }
            serde_json::Value::Array(buckets.iter().map(bucket_value).collect())
        }
        None => serde_json::Value::Array(
            rows.iter()
                .map(|(ts, record)| entry_value(*ts, record))
                .collect(),
        ),
    }
}

/// `range` / `revrange` - scan, decode, filter, project, optionally
/// aggregate, format.
pub fn range<S: SeriesStore>(
    store: &S,
    key: &str,
    from: &str,
    to: &str,
    options: &Options,
    rev: bool,
    clock: ClockFn,
) -> Result<Reply> {
    let entries = collect_entries(store, key, from, to, options, rev, clock)?;
    render(materialize(&entries, options, rev), options.format)
}

/// `poprange` - `range` whose consumed raw keys are removed after the
/// result is materialized.
pub fn pop_range<S: SeriesStore>(
    store: &mut S,
    key: &str,
    from: &str,
    to: &str,
    options: &Options,
    clock: ClockFn,
) -> Result<Reply> {
    let entries = collect_entries(store, key, from, to, options, false, clock)?;
    let reply = render(materialize(&entries, options, false), options.format)?;
    let members: Vec<Vec<u8>> = entries.into_iter().map(|raw| raw.member).collect();
    store.remove(key, &members);
    Ok(reply)
}

/// `remrange key from to [FILTER …] [LIMIT …]` - remove entries in the
/// bound pair. Without filter or limit this is a single store-side
/// range removal; otherwise deletion targets exactly the keys that
/// passed the filter.
pub fn rem_range<S: SeriesStore>(
    store: &mut S,
    key: &str,
    from: &str,
    to: &str,
    options: &Options,
    clock: ClockFn,
) -> Result<Reply> {
    if options.filter.is_none() && options.limit.is_none() {
        let range = translate_pair(from, to, clock)?;
        return Ok(Reply::Int(store.remove_range(key, &range) as i64));
    }
    let entries = collect_entries(store, key, from, to, options, false, clock)?;
    let members: Vec<Vec<u8>> = entries.into_iter().map(|raw| raw.member).collect();
    Ok(Reply::Int(store.remove(key, &members) as i64))
}
