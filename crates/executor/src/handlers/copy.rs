//! `copy` - materialize a (possibly filtered, projected, aggregated)
//! view of one series into a destination key.

use tidemark_core::Result;
use tidemark_engine::{aggregate, translate_pair, ClockFn, Options, StorageKind};
use tidemark_storage::SeriesStore;

use crate::handlers::{scan, upsert};
use crate::reply::{record_value, Reply};

/// `copy source dest from to [options]`.
///
/// With no filter, no aggregation, no projection and a timeseries
/// destination, the raw encoded keys bulk-insert without decoding.
/// Otherwise each surviving entry (or each aggregation bucket, with its
/// flattened `field_kind[_subfield]` record) is written through the
/// normal encode path - or as `decimal-ts → JSON record` pairs when the
/// destination is a hash.
pub fn copy<S: SeriesStore>(
    store: &mut S,
    source: &str,
    dest: &str,
    from: &str,
    to: &str,
    options: &Options,
    clock: ClockFn,
) -> Result<Reply> {
    let raw_fast_path = options.filter.is_none()
        && options.aggregation.is_none()
        && options.projection.is_none()
        && options.storage == StorageKind::Timeseries;
    if raw_fast_path {
        let range = translate_pair(from, to, clock)?;
        let members = store.scan(source, &range, options.limit);
        for member in &members {
            store.insert(dest, member);
        }
        return Ok(Reply::Int(members.len() as i64));
    }

    let entries = scan::collect_entries(&*store, source, from, to, options, false, clock)?;

    if let Some(spec) = &options.aggregation {
        let projected: Vec<_> = entries
            .iter()
            .map(|raw| {
                let record = match &options.projection {
                    Some(p) => p.apply(&raw.entry.record),
                    None => raw.entry.record.clone(),
                };
                (raw.entry.ts, record)
            })
            .collect();
        let buckets = aggregate::aggregate(projected.iter().map(|(ts, r)| (*ts, r)), spec);
        for row in &buckets {
            let record = aggregate::flatten_bucket(row);
            match options.storage {
                StorageKind::Hash => {
                    store.map_put(dest, &row.ts.to_string(), &record_value(&record).to_string());
                }
                StorageKind::Timeseries => upsert(store, dest, row.ts, &record)?,
            }
        }
        return Ok(Reply::Int(buckets.len() as i64));
    }

    let mut written = 0;
    for raw in &entries {
        let record = match &options.projection {
            Some(p) => p.apply(&raw.entry.record),
            None => raw.entry.record.clone(),
        };
        match options.storage {
            StorageKind::Hash => {
                store.map_put(
                    dest,
                    &raw.entry.ts.to_string(),
                    &record_value(&record).to_string(),
                );
            }
            StorageKind::Timeseries => upsert(store, dest, raw.entry.ts, &record)?,
        }
        written += 1;
    }
    Ok(Reply::Int(written))
}
