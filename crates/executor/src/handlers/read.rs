//! Read-path handlers: `get`, `pop`, `size`, `exists`, `span`, `times`,
//! `count`.

use tidemark_core::Result;
use tidemark_engine::{codec, translate_pair, ClockFn, Options};
use tidemark_storage::{LexRange, Limit, SeriesStore};

use crate::handlers::{fetch_point, scan};
use crate::reply::{record_value, render, Reply};

/// `get key ts [LABELS …|REDACT …] [FORMAT …]` - point lookup. Missing
/// entries reply nil in every format.
pub fn get<S: SeriesStore>(store: &S, key: &str, ts: i64, options: &Options) -> Result<Reply> {
    let Some(raw) = fetch_point(store, key, ts)? else {
        return Ok(Reply::Nil);
    };
    let record = match &options.projection {
        Some(p) => p.apply(&raw.entry.record),
        None => raw.entry.record,
    };
    render(record_value(&record), options.format)
}

/// `pop key ts …` - `get` plus removal of the consumed entry. The reply
/// is materialized before anything is deleted.
pub fn pop<S: SeriesStore>(
    store: &mut S,
    key: &str,
    ts: i64,
    options: &Options,
) -> Result<Reply> {
    let Some(raw) = fetch_point(store, key, ts)? else {
        return Ok(Reply::Nil);
    };
    let record = match &options.projection {
        Some(p) => p.apply(&raw.entry.record),
        None => raw.entry.record.clone(),
    };
    let reply = render(record_value(&record), options.format)?;
    store.remove(key, &[raw.member]);
    Ok(reply)
}

/// `size key` - series cardinality.
pub fn size<S: SeriesStore>(store: &S, key: &str) -> Result<Reply> {
    Ok(Reply::Int(store.card(key) as i64))
}

/// `exists key ts` - 1 if an entry exists at `ts`, else 0.
pub fn exists<S: SeriesStore>(store: &S, key: &str, ts: i64) -> Result<Reply> {
    let present = crate::handlers::point_member(store, key, ts)?.is_some();
    Ok(Reply::Int(present as i64))
}

/// `span key` - `[min_ts, max_ts]`, or an empty array for an empty
/// series.
pub fn span<S: SeriesStore>(store: &S, key: &str) -> Result<Reply> {
    let one = Some(Limit { offset: 0, count: 1 });
    let first = store.scan(key, &LexRange::all(), one);
    let Some(first) = first.first() else {
        return Ok(Reply::Array(Vec::new()));
    };
    let last = store.scan_rev(key, &LexRange::all(), one);
    let min = codec::decode_timestamp(first)?;
    let max = codec::decode_timestamp(&last[0])?;
    Ok(Reply::Array(vec![Reply::Int(min), Reply::Int(max)]))
}

/// `times key [from to]` - every timestamp in the bound pair.
pub fn times<S: SeriesStore>(
    store: &S,
    key: &str,
    from: &str,
    to: &str,
    clock: ClockFn,
) -> Result<Reply> {
    let range = translate_pair(from, to, clock)?;
    let members = store.scan(key, &range, None);
    let mut timestamps = Vec::with_capacity(members.len());
    for member in &members {
        timestamps.push(Reply::Int(codec::decode_timestamp(member)?));
    }
    Ok(Reply::Array(timestamps))
}

/// `count key from to [FILTER …]` - entry count in the bound pair.
/// Without a filter this degenerates to a single store-side count.
pub fn count<S: SeriesStore>(
    store: &S,
    key: &str,
    from: &str,
    to: &str,
    options: &Options,
    clock: ClockFn,
) -> Result<Reply> {
    if options.filter.is_none() && options.limit.is_none() {
        let range = translate_pair(from, to, clock)?;
        return Ok(Reply::Int(store.count(key, &range) as i64));
    }
    let entries = scan::collect_entries(store, key, from, to, options, false, clock)?;
    Ok(Reply::Int(entries.len() as i64))
}
