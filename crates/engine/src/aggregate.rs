//! Tumbling-window aggregation.
//!
//! Entries stream into buckets aligned at `ts - (ts mod bucket)`; each
//! `(field, kind)` column keeps one [`Accumulator`]. Buckets materialize
//! lazily - a window with no points is never emitted - and finalize in
//! ascending timestamp order.
//!
//! `stats` (and its `std`/`mean` members) run Welford's online algorithm:
//! numerically stable, single pass, no value list retained. Everything
//! else streams with O(1) or O(distinct) state per bucket.

use std::collections::{BTreeMap, BTreeSet};

use tidemark_core::{Record, Scalar};

/// The thirteen aggregation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum AggKind {
    Count,
    Rate,
    Sum,
    Avg,
    Min,
    Max,
    First,
    Last,
    Range,
    Stats,
    Distinct,
    CountDistinct,
    Data,
}

impl AggKind {
    /// Parse a kind name (case-insensitive).
    pub fn parse(s: &str) -> Option<AggKind> {
        Some(match s.to_ascii_lowercase().as_str() {
            "count" => AggKind::Count,
            "rate" => AggKind::Rate,
            "sum" => AggKind::Sum,
            "avg" => AggKind::Avg,
            "min" => AggKind::Min,
            "max" => AggKind::Max,
            "first" => AggKind::First,
            "last" => AggKind::Last,
            "range" => AggKind::Range,
            "stats" => AggKind::Stats,
            "distinct" => AggKind::Distinct,
            "count_distinct" => AggKind::CountDistinct,
            "data" => AggKind::Data,
            _ => return None,
        })
    }

    /// Canonical lower-case name used in output shapes.
    pub fn name(&self) -> &'static str {
        match self {
            AggKind::Count => "count",
            AggKind::Rate => "rate",
            AggKind::Sum => "sum",
            AggKind::Avg => "avg",
            AggKind::Min => "min",
            AggKind::Max => "max",
            AggKind::First => "first",
            AggKind::Last => "last",
            AggKind::Range => "range",
            AggKind::Stats => "stats",
            AggKind::Distinct => "distinct",
            AggKind::CountDistinct => "count_distinct",
            AggKind::Data => "data",
        }
    }
}

/// One `(field, kind)` aggregation column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggColumn {
    /// Aggregated field name.
    pub field: String,
    /// Reduction applied to it.
    pub kind: AggKind,
}

/// A parsed `AGGREGATION` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggSpec {
    /// Tumbling-window width in timestamp units.
    pub bucket: i64,
    /// Columns in declaration order; multiple kinds per field allowed.
    pub columns: Vec<AggColumn>,
}

/// A finalized aggregation value.
#[derive(Debug, Clone, PartialEq)]
pub enum AggValue {
    /// Plain scalar (`count`, `sum`, `min`, …).
    Scalar(Scalar),
    /// Ordered list (`distinct`, `data`).
    List(Vec<Scalar>),
    /// Keyed sub-values in emission order (`stats`, `count_distinct`).
    Map(Vec<(String, Scalar)>),
}

/// Welford's online mean/variance accumulator.
#[derive(Debug, Clone, Default)]
pub struct Welford {
    count: u64,
    mean: f64,
    m2: f64,
}

impl Welford {
    /// Fold one observation in.
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    /// Observation count.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Running mean (0 with no observations).
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample variance `M2 / (count - 1)`, 0 below two observations.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Sample standard deviation.
    pub fn std(&self) -> f64 {
        self.variance().sqrt()
    }
}

// Whole-number results (integer sums, exact means) collapse back to Int.
fn num_scalar(x: f64) -> Scalar {
    Scalar::number(x)
}

#[derive(Debug, Clone)]
enum AccState {
    Count(u64),
    Sum(f64),
    Avg { sum: f64, count: u64 },
    Extreme { want_max: bool, best: Option<Scalar> },
    First(Option<Scalar>),
    Last(Option<Scalar>),
    Spread { min: Option<f64>, max: Option<f64> },
    Stats { w: Welford, sum: f64, min: Option<f64>, max: Option<f64> },
    Distinct(BTreeSet<String>),
    CountDistinct(BTreeMap<String, i64>),
    Data(Vec<Scalar>),
}

/// Streaming accumulator for one `(field, kind)` column in one bucket.
#[derive(Debug, Clone)]
pub struct Accumulator {
    state: AccState,
}

fn prefer(best: &Option<Scalar>, candidate: &Scalar, want_max: bool) -> bool {
    let Some(current) = best else {
        return true;
    };
    let ord = match (current.as_number(), candidate.as_number()) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal),
        _ => current.to_string().cmp(&candidate.to_string()),
    };
    if want_max {
        ord == std::cmp::Ordering::Less
    } else {
        ord == std::cmp::Ordering::Greater
    }
}

impl Accumulator {
    /// Fresh accumulator for a kind.
    pub fn new(kind: AggKind) -> Accumulator {
        let state = match kind {
            AggKind::Count | AggKind::Rate => AccState::Count(0),
            AggKind::Sum => AccState::Sum(0.0),
            AggKind::Avg => AccState::Avg { sum: 0.0, count: 0 },
            AggKind::Min => AccState::Extreme { want_max: false, best: None },
            AggKind::Max => AccState::Extreme { want_max: true, best: None },
            AggKind::First => AccState::First(None),
            AggKind::Last => AccState::Last(None),
            AggKind::Range => AccState::Spread { min: None, max: None },
            AggKind::Stats => AccState::Stats {
                w: Welford::default(),
                sum: 0.0,
                min: None,
                max: None,
            },
            AggKind::Distinct => AccState::Distinct(BTreeSet::new()),
            AggKind::CountDistinct => AccState::CountDistinct(BTreeMap::new()),
            AggKind::Data => AccState::Data(Vec::new()),
        };
        Accumulator { state }
    }

    /// Fold one data point in. `value` is the field's scalar for this
    /// entry; an absent field arrives as null.
    pub fn update(&mut self, value: &Scalar) {
        match &mut self.state {
            // count/rate count rows, not field values
            AccState::Count(n) => *n += 1,
            AccState::Sum(sum) => *sum += value.as_number().unwrap_or(0.0),
            AccState::Avg { sum, count } => {
                if let Some(x) = value.as_number() {
                    *sum += x;
                    *count += 1;
                }
            }
            AccState::Extreme { want_max, best } => {
                if !value.is_null() && prefer(best, value, *want_max) {
                    *best = Some(value.clone());
                }
            }
            // first non-null wins
            AccState::First(slot) => {
                if slot.is_none() && !value.is_null() {
                    *slot = Some(value.clone());
                }
            }
            // last wins, nulls included
            AccState::Last(slot) => *slot = Some(value.clone()),
            AccState::Spread { min, max } => {
                if let Some(x) = value.as_number() {
                    *min = Some(min.map_or(x, |m| m.min(x)));
                    *max = Some(max.map_or(x, |m| m.max(x)));
                }
            }
            AccState::Stats { w, sum, min, max } => {
                if let Some(x) = value.as_number() {
                    w.push(x);
                    *sum += x;
                    *min = Some(min.map_or(x, |m| m.min(x)));
                    *max = Some(max.map_or(x, |m| m.max(x)));
                }
            }
            AccState::Distinct(set) => {
                if !value.is_null() {
                    set.insert(value.to_string());
                }
            }
            AccState::CountDistinct(map) => {
                if !value.is_null() {
                    *map.entry(value.to_string()).or_insert(0) += 1;
                }
            }
            AccState::Data(items) => {
                if !value.is_null() {
                    items.push(value.clone());
                }
            }
        }
    }

    /// Finalize into the output value. `bucket` is the window width
    /// (`rate` divides by it).
    pub fn finalize(self, kind: AggKind, bucket: i64) -> AggValue {
        match self.state {
            AccState::Count(n) => match kind {
                AggKind::Rate => AggValue::Scalar(num_scalar(n as f64 / bucket as f64)),
                _ => AggValue::Scalar(Scalar::Int(n as i64)),
            },
            AccState::Sum(sum) => AggValue::Scalar(num_scalar(sum)),
            AccState::Avg { sum, count } => {
                if count == 0 {
                    AggValue::Scalar(Scalar::Null)
                } else {
                    AggValue::Scalar(num_scalar(sum / count as f64))
                }
            }
            AccState::Extreme { best, .. } => {
                AggValue::Scalar(best.unwrap_or(Scalar::Null))
            }
            AccState::First(slot) | AccState::Last(slot) => {
                AggValue::Scalar(slot.unwrap_or(Scalar::Null))
            }
            AccState::Spread { min, max } => match (min, max) {
                (Some(lo), Some(hi)) => AggValue::Scalar(num_scalar(hi - lo)),
                _ => AggValue::Scalar(Scalar::Null),
            },
            AccState::Stats { w, sum, min, max } => {
                let n = w.count();
                let numeric = |v: Option<f64>| v.map(num_scalar).unwrap_or(Scalar::Null);
                AggValue::Map(vec![
                    ("count".to_string(), Scalar::Int(n as i64)),
                    ("sum".to_string(), num_scalar(sum)),
                    ("min".to_string(), numeric(min)),
                    ("max".to_string(), numeric(max)),
                    (
                        "mean".to_string(),
                        if n == 0 { Scalar::Null } else { num_scalar(w.mean()) },
                    ),
                    (
                        "std".to_string(),
                        if n == 0 { Scalar::Null } else { Scalar::Float(w.std()) },
                    ),
                ])
            }
            AccState::Distinct(set) => {
                AggValue::List(set.into_iter().map(Scalar::Str).collect())
            }
            AccState::CountDistinct(map) => AggValue::Map(
                map.into_iter().map(|(k, n)| (k, Scalar::Int(n))).collect(),
            ),
            AccState::Data(items) => AggValue::List(items),
        }
    }
}

/// One finalized bucket: fields in column-declaration order, each with its
/// `(kind, value)` results.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketRow {
    /// Bucket start timestamp (`ts - ts mod bucket`).
    pub ts: i64,
    /// `field → [(kind name, value)]`, first-appearance field order.
    pub fields: Vec<(String, Vec<(&'static str, AggValue)>)>,
}

/// Run the aggregation over an in-order entry stream.
///
/// Buckets come back ascending regardless of input order; callers doing a
/// reverse scan reverse the rows afterwards.
pub fn aggregate<'a, I>(entries: I, spec: &AggSpec) -> Vec<BucketRow>
where
    I: IntoIterator<Item = (i64, &'a Record)>,
{
    let mut buckets: BTreeMap<i64, Vec<Accumulator>> = BTreeMap::new();

    for (ts, record) in entries {
        let start = ts - ts.rem_euclid(spec.bucket);
        let accs = buckets.entry(start).or_insert_with(|| {
            spec.columns
                .iter()
                .map(|c| Accumulator::new(c.kind))
                .collect()
        });
        for (column, acc) in spec.columns.iter().zip(accs.iter_mut()) {
            let value = record.get(&column.field).unwrap_or(&Scalar::Null);
            acc.update(value);
        }
    }

    buckets
        .into_iter()
        .map(|(ts, accs)| {
            let mut fields: Vec<(String, Vec<(&'static str, AggValue)>)> = Vec::new();
            for (column, acc) in spec.columns.iter().zip(accs.into_iter()) {
                let value = acc.finalize(column.kind, spec.bucket);
                match fields.iter_mut().find(|(name, _)| *name == column.field) {
                    Some((_, kinds)) => kinds.push((column.kind.name(), value)),
                    None => fields.push((
                        column.field.clone(),
                        vec![(column.kind.name(), value)],
                    )),
                }
            }
            BucketRow { ts, fields }
        })
        .collect()
}

/// Flatten one bucket into a record for `copy` destinations:
/// `field_kind` for scalars, `field_kind_sub` for map-shaped results,
/// JSON text for list-shaped results.
pub fn flatten_bucket(row: &BucketRow) -> Record {
    let mut record = Record::new();
    for (field, kinds) in &row.fields {
        for (kind, value) in kinds {
            let base = format!("{field}_{kind}");
            match value {
                AggValue::Scalar(s) => {
                    record.insert(base, s.clone());
                }
                AggValue::Map(pairs) => {
                    for (sub, s) in pairs {
                        record.insert(format!("{base}_{sub}"), s.clone());
                    }
                }
                AggValue::List(items) => {
                    let json: Vec<serde_json::Value> =
                        items.iter().map(serde_json::Value::from).collect();
                    record.insert(base, Scalar::Str(serde_json::Value::Array(json).to_string()));
                }
            }
        }
    }
    record
}
