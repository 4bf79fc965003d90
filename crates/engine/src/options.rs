//! Query-option compiler.
//!
//! Tokenizes the trailing arguments of a verb into an [`Options`] struct:
//! pagination, aggregation spec, compiled filter, projection, output
//! format, and copy storage target. Keywords are case-insensitive, each
//! option may appear at most once, `LABELS` and `REDACT` are mutually
//! exclusive, and unknown keywords are fatal.
//!
//! `AGGREGATION` carries two surface syntaxes, told apart by peeking at
//! the first token after the keyword:
//! - functional: `AGGREGATION <bucket> kind(field) [kind(field) …]`
//! - legacy: `AGGREGATION <kind> <bucket>` with the implicit field
//!   `value`

use tidemark_core::{is_valid_field_name, Error, Record, Result};
use tidemark_storage::Limit;

use crate::aggregate::{AggColumn, AggKind, AggSpec};
use crate::filter::Filter;

/// Output format of a query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Native ordered-sequence reply; non-integer numbers stringified.
    #[default]
    Native,
    /// One JSON string.
    Json,
    /// The JSON logical shape encoded as msgpack.
    Msgpack,
}

/// Destination layout for `copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    /// Ordered set in the same layout as the source.
    #[default]
    Timeseries,
    /// Unordered mapping of decimal timestamp → JSON-encoded record.
    Hash,
}

/// Record projection applied before aggregation or output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Include-only field list.
    Labels(Vec<String>),
    /// Exclude field list.
    Redact(Vec<String>),
}

impl Projection {
    /// Apply the projection to one decoded record.
    pub fn apply(&self, record: &Record) -> Record {
        match self {
            Projection::Labels(keep) => record
                .iter()
                .filter(|(name, _)| keep.iter().any(|k| k == *name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            Projection::Redact(drop) => record
                .iter()
                .filter(|(name, _)| !drop.iter().any(|k| k == *name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        }
    }
}

/// Parsed query options.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// `LIMIT offset count` pagination over the post-filter sequence.
    pub limit: Option<Limit>,
    /// Tumbling-window aggregation spec.
    pub aggregation: Option<AggSpec>,
    /// Compiled filter predicate.
    pub filter: Option<Filter>,
    /// `LABELS` / `REDACT` projection.
    pub projection: Option<Projection>,
    /// Output format (defaults to the native reply).
    pub format: Format,
    /// Copy destination layout (defaults to timeseries).
    pub storage: StorageKind,
}

const KEYWORDS: &[&str] = &[
    "limit",
    "aggregation",
    "filter",
    "labels",
    "redact",
    "format",
    "storage",
];

fn is_keyword(token: &str) -> bool {
    KEYWORDS.iter().any(|k| token.eq_ignore_ascii_case(k))
}

/// Collect tokens until the next recognized option keyword.
fn take_list<'a>(tokens: &'a [String], pos: &mut usize) -> Vec<&'a String> {
    let mut list = Vec::new();
    while *pos < tokens.len() && !is_keyword(&tokens[*pos]) {
        list.push(&tokens[*pos]);
        *pos += 1;
    }
    list
}

fn parse_aggregation(tokens: &[String], pos: &mut usize) -> Result<AggSpec> {
    let first = tokens
        .get(*pos)
        .ok_or_else(|| Error::bad_argument("AGGREGATION", "missing bucket width"))?;

    if let Ok(bucket) = first.parse::<i64>() {
        // Functional form: bucket first, then kind(field) pairs.
        *pos += 1;
        if bucket <= 0 {
            return Err(Error::bad_argument(
                "AGGREGATION",
                "bucket width must be a positive number",
            ));
        }
        let mut columns = Vec::new();
        while *pos < tokens.len() && !is_keyword(&tokens[*pos]) {
            columns.push(parse_column(&tokens[*pos])?);
            *pos += 1;
        }
        if columns.is_empty() {
            return Err(Error::bad_argument(
                "AGGREGATION",
                "at least one kind(field) is required",
            ));
        }
        Ok(AggSpec { bucket, columns })
    } else {
        // Legacy form: kind then bucket, implicit field `value`.
        let kind = AggKind::parse(first).ok_or_else(|| {
            Error::bad_argument("AGGREGATION", format!("unknown aggregation kind {first}"))
        })?;
        *pos += 1;
        let bucket_tok = tokens
            .get(*pos)
            .ok_or_else(|| Error::bad_argument("AGGREGATION", "missing bucket width"))?;
        let bucket = bucket_tok.parse::<i64>().map_err(|_| {
            Error::bad_argument("AGGREGATION", "bucket width must be a number")
        })?;
        *pos += 1;
        if bucket <= 0 {
            return Err(Error::bad_argument(
                "AGGREGATION",
                "bucket width must be a positive number",
            ));
        }
        Ok(AggSpec {
            bucket,
            columns: vec![AggColumn {
                field: "value".to_string(),
                kind,
            }],
        })
    }
}

/// Parse one `kind(field)` token.
fn parse_column(token: &str) -> Result<AggColumn> {
    let open = token.find('(');
    let parsed = open.and_then(|open| {
        if !token.ends_with(')') {
            return None;
        }
        let kind = AggKind::parse(&token[..open])?;
        let field = &token[open + 1..token.len() - 1];
        if !is_valid_field_name(field) {
            return None;
        }
        Some(AggColumn {
            field: field.to_string(),
            kind,
        })
    });
    parsed.ok_or_else(|| {
        Error::bad_argument("AGGREGATION", format!("unknown aggregation kind {token}"))
    })
}

impl Options {
    /// Parse the trailing tokens of a verb into options.
    pub fn parse(tokens: &[String]) -> Result<Options> {
        let mut options = Options::default();
        let mut seen_format = false;
        let mut seen_storage = false;
        let mut pos = 0;

        while pos < tokens.len() {
            let keyword = tokens[pos].to_ascii_lowercase();
            pos += 1;
            match keyword.as_str() {
                "limit" => {
                    if options.limit.is_some() {
                        return Err(Error::bad_argument(
                            "LIMIT",
                            "option may only be specified once",
                        ));
                    }
                    let offset = tokens
                        .get(pos)
                        .and_then(|t| t.parse::<usize>().ok())
                        .ok_or_else(|| {
                            Error::bad_argument("LIMIT", "offset value must be a number")
                        })?;
                    pos += 1;
                    let count = tokens
                        .get(pos)
                        .and_then(|t| t.parse::<i64>().ok())
                        .ok_or_else(|| {
                            Error::bad_argument("LIMIT", "count value must be a number")
                        })?;
                    pos += 1;
                    options.limit = Some(Limit { offset, count });
                }
                "aggregation" => {
                    if options.aggregation.is_some() {
                        return Err(Error::bad_argument(
                            "AGGREGATION",
                            "option may only be specified once",
                        ));
                    }
                    options.aggregation = Some(parse_aggregation(tokens, &mut pos)?);
                }
                "filter" => {
                    if options.filter.is_some() {
                        return Err(Error::bad_argument(
                            "FILTER",
                            "option may only be specified once",
                        ));
                    }
                    let exprs: Vec<String> =
                        take_list(tokens, &mut pos).into_iter().cloned().collect();
                    options.filter = Some(Filter::parse(&exprs)?);
                }
                "labels" | "redact" => {
                    if options.projection.is_some() {
                        let reason = match &options.projection {
                            Some(Projection::Labels(_)) if keyword == "redact" => {
                                "LABELS and REDACT are mutually exclusive"
                            }
                            Some(Projection::Redact(_)) if keyword == "labels" => {
                                "LABELS and REDACT are mutually exclusive"
                            }
                            _ => "option may only be specified once",
                        };
                        return Err(Error::bad_argument(keyword.to_ascii_uppercase(), reason));
                    }
                    let names: Vec<String> =
                        take_list(tokens, &mut pos).into_iter().cloned().collect();
                    for name in &names {
                        if !is_valid_field_name(name) {
                            return Err(Error::bad_argument(
                                keyword.to_ascii_uppercase(),
                                format!("invalid field name {name}"),
                            ));
                        }
                    }
                    options.projection = Some(if keyword == "labels" {
                        Projection::Labels(names)
                    } else {
                        Projection::Redact(names)
                    });
                }
                "format" => {
                    if seen_format {
                        return Err(Error::bad_argument(
                            "FORMAT",
                            "option may only be specified once",
                        ));
                    }
                    seen_format = true;
                    let value = tokens
                        .get(pos)
                        .ok_or_else(|| Error::bad_argument("FORMAT", "missing format value"))?;
                    pos += 1;
                    options.format = if value.eq_ignore_ascii_case("json") {
                        Format::Json
                    } else if value.eq_ignore_ascii_case("msgpack") {
                        Format::Msgpack
                    } else {
                        return Err(Error::bad_argument(
                            "FORMAT",
                            format!("unknown format {value}"),
                        ));
                    };
                }
                "storage" => {
                    if seen_storage {
                        return Err(Error::bad_argument(
                            "STORAGE",
                            "option may only be specified once",
                        ));
                    }
                    seen_storage = true;
                    let value = tokens
                        .get(pos)
                        .ok_or_else(|| Error::bad_argument("STORAGE", "missing storage value"))?;
                    pos += 1;
                    options.storage = if value.eq_ignore_ascii_case("timeseries") {
                        StorageKind::Timeseries
                    } else if value.eq_ignore_ascii_case("hash") {
                        StorageKind::Hash
                    } else {
                        return Err(Error::bad_argument(
                            "STORAGE",
                            format!("unknown storage {value}"),
                        ));
                    };
                }
                other => {
                    return Err(Error::bad_argument(
                        "OPTIONS",
                        format!("unknown keyword {other}"),
                    ));
                }
            }
        }
        Ok(options)
    }
}
