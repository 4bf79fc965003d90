//! The typed instruction set.
//!
//! Every verb is one [`Command`] variant with fully parsed fields.
//! [`Command::parse`] implements the string surface `(series_key, verb,
//! *args)` - and the `copy` shape `(source_key, dest_key, "copy",
//! *args)` - so hosts can hand the raw argument vector straight in. Verb
//! names are case-insensitive; everything after the positional arguments
//! goes through the option compiler.

use tidemark_core::{is_valid_field_name, Error, Result, Scalar};
use tidemark_engine::Options;

/// One fully parsed verb invocation.
#[derive(Debug, Clone)]
pub enum Command {
    /// Insert an entry (overwrites any entry at the same timestamp).
    /// Returns: `Reply::Int` (the timestamp)
    Add {
        /// Series key.
        key: String,
        /// Entry timestamp.
        ts: i64,
        /// Field/value pairs in argument order.
        fields: Vec<(String, Scalar)>,
    },

    /// Delete entries by timestamp.
    /// Returns: `Reply::Int` (count removed)
    Del {
        /// Series key.
        key: String,
        /// Timestamps to remove.
        timestamps: Vec<i64>,
    },

    /// Merge fields into the entry at a timestamp (upsert).
    /// Returns: `Reply::Str("OK")`
    Set {
        /// Series key.
        key: String,
        /// Entry timestamp.
        ts: i64,
        /// Field/value pairs to merge.
        fields: Vec<(String, Scalar)>,
    },

    /// Increment numeric fields at a timestamp.
    /// Returns: `Reply::Array` of the new values, in argument order
    IncrBy {
        /// Series key.
        key: String,
        /// Entry timestamp.
        ts: i64,
        /// Field/delta pairs.
        deltas: Vec<(String, f64)>,
    },

    /// Point lookup.
    /// Returns: the record, or `Reply::Nil` when absent
    Get {
        /// Series key.
        key: String,
        /// Entry timestamp.
        ts: i64,
        /// `LABELS`/`REDACT`/`FORMAT`.
        options: Options,
    },

    /// Point lookup that removes the entry after materializing it.
    /// Returns: same as `Get`
    Pop {
        /// Series key.
        key: String,
        /// Entry timestamp.
        ts: i64,
        /// `LABELS`/`REDACT`/`FORMAT`.
        options: Options,
    },

    /// Entry count of the whole series.
    /// Returns: `Reply::Int`
    Size {
        /// Series key.
        key: String,
    },

    /// Existence test for one timestamp.
    /// Returns: `Reply::Int` (0 or 1)
    Exists {
        /// Series key.
        key: String,
        /// Probed timestamp.
        ts: i64,
    },

    /// Smallest and largest timestamps.
    /// Returns: `Reply::Array([min, max])`, empty for an empty series
    Span {
        /// Series key.
        key: String,
    },

    /// All timestamps in a bound pair.
    /// Returns: `Reply::Array` of integers
    Times {
        /// Series key.
        key: String,
        /// Lower bound token.
        from: String,
        /// Upper bound token.
        to: String,
    },

    /// Count entries in a bound pair, optionally filtered.
    /// Returns: `Reply::Int`
    Count {
        /// Series key.
        key: String,
        /// Lower bound token.
        from: String,
        /// Upper bound token.
        to: String,
        /// `FILTER`/`LIMIT`.
        options: Options,
    },

    /// Range scan.
    /// Returns: `Reply::Array` of entries or aggregated buckets
    Range {
        /// Series key.
        key: String,
        /// Lower bound token.
        from: String,
        /// Upper bound token.
        to: String,
        /// Full option set.
        options: Options,
    },

    /// Reverse range scan (same multiset as `Range`, reversed order).
    RevRange {
        /// Series key.
        key: String,
        /// Lower bound token.
        from: String,
        /// Upper bound token.
        to: String,
        /// Full option set.
        options: Options,
    },

    /// Range scan that removes the consumed entries after materializing.
    PopRange {
        /// Series key.
        key: String,
        /// Lower bound token.
        from: String,
        /// Upper bound token.
        to: String,
        /// Full option set.
        options: Options,
    },

    /// Remove entries in a bound pair, optionally filtered.
    /// Returns: `Reply::Int` (count removed)
    RemRange {
        /// Series key.
        key: String,
        /// Lower bound token.
        from: String,
        /// Upper bound token.
        to: String,
        /// `FILTER`/`LIMIT`.
        options: Options,
    },

    /// Copy (and optionally transform) entries into a destination key.
    /// Returns: `Reply::Int` (count written)
    Copy {
        /// Source series key.
        source: String,
        /// Destination key.
        dest: String,
        /// Lower bound token.
        from: String,
        /// Upper bound token.
        to: String,
        /// Full option set including `STORAGE`.
        options: Options,
    },
}

fn parse_ts(verb: &str, token: &str) -> Result<i64> {
    token
        .parse::<i64>()
        .map_err(|_| Error::bad_argument(verb, "timestamp must be a number"))
}

/// Parse trailing `field value` pairs, validating field names.
fn parse_field_pairs(verb: &str, args: &[&str]) -> Result<Vec<(String, Scalar)>> {
    if args.is_empty() || args.len() % 2 != 0 {
        return Err(Error::WrongArity {
            verb: verb.to_string(),
        });
    }
    let mut fields = Vec::with_capacity(args.len() / 2);
    for pair in args.chunks(2) {
        if !is_valid_field_name(pair[0]) {
            return Err(Error::bad_argument(
                verb,
                format!("invalid field name {}", pair[0]),
            ));
        }
        fields.push((pair[0].to_string(), Scalar::from_arg(pair[1])));
    }
    Ok(fields)
}

fn parse_delta_pairs(verb: &str, args: &[&str]) -> Result<Vec<(String, f64)>> {
    if args.is_empty() || args.len() % 2 != 0 {
        return Err(Error::WrongArity {
            verb: verb.to_string(),
        });
    }
    let mut deltas = Vec::with_capacity(args.len() / 2);
    for pair in args.chunks(2) {
        if !is_valid_field_name(pair[0]) {
            return Err(Error::bad_argument(
                verb,
                format!("invalid field name {}", pair[0]),
            ));
        }
        let delta = pair[1]
            .parse::<f64>()
            .map_err(|_| Error::bad_argument(verb, "increment value must be a number"))?;
        deltas.push((pair[0].to_string(), delta));
    }
    Ok(deltas)
}

fn options_from(args: &[&str]) -> Result<Options> {
    let tokens: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    Options::parse(&tokens)
}

fn arg<'a>(argv: &[&'a str], index: usize, verb: &str) -> Result<&'a str> {
    argv.get(index).copied().ok_or_else(|| Error::WrongArity {
        verb: verb.to_string(),
    })
}

fn expect_end(argv: &[&str], index: usize, verb: &str) -> Result<()> {
    if argv.len() > index {
        return Err(Error::WrongArity {
            verb: verb.to_string(),
        });
    }
    Ok(())
}

impl Command {
    /// Parse one raw argument vector.
    ///
    /// All verbs arrive as `(series_key, verb, *args)`; `copy` arrives as
    /// `(source_key, dest_key, "copy", from, to, *args)`.
    pub fn parse(argv: &[&str]) -> Result<Command> {
        if argv.len() >= 3 && argv[2].eq_ignore_ascii_case("copy") {
            let from = arg(argv, 3, "copy")?;
            let to = arg(argv, 4, "copy")?;
            return Ok(Command::Copy {
                source: argv[0].to_string(),
                dest: argv[1].to_string(),
                from: from.to_string(),
                to: to.to_string(),
                options: options_from(&argv[5..])?,
            });
        }

        if argv.len() < 2 {
            return Err(Error::WrongArity {
                verb: "Timeseries".to_string(),
            });
        }
        let key = argv[0].to_string();
        let verb = argv[1];
        let rest = &argv[2..];

        match verb.to_ascii_lowercase().as_str() {
            "add" => {
                let ts = parse_ts("add", arg(rest, 0, "add")?)?;
                Ok(Command::Add {
                    key,
                    ts,
                    fields: parse_field_pairs("add", &rest[1..])?,
                })
            }
            "del" => {
                if rest.is_empty() {
                    return Err(Error::WrongArity {
                        verb: "del".to_string(),
                    });
                }
                let timestamps = rest
                    .iter()
                    .map(|t| parse_ts("del", t))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Command::Del { key, timestamps })
            }
            "set" => {
                let ts = parse_ts("set", arg(rest, 0, "set")?)?;
                Ok(Command::Set {
                    key,
                    ts,
                    fields: parse_field_pairs("set", &rest[1..])?,
                })
            }
            "incrby" => {
                let ts = parse_ts("incrBy", arg(rest, 0, "incrBy")?)?;
                Ok(Command::IncrBy {
                    key,
                    ts,
                    deltas: parse_delta_pairs("incrBy", &rest[1..])?,
                })
            }
            "get" => {
                let ts = parse_ts("get", arg(rest, 0, "get")?)?;
                Ok(Command::Get {
                    key,
                    ts,
                    options: options_from(&rest[1..])?,
                })
            }
            "pop" => {
                let ts = parse_ts("pop", arg(rest, 0, "pop")?)?;
                Ok(Command::Pop {
                    key,
                    ts,
                    options: options_from(&rest[1..])?,
                })
            }
            "size" => {
                expect_end(rest, 0, "size")?;
                Ok(Command::Size { key })
            }
            "exists" => {
                let ts = parse_ts("exists", arg(rest, 0, "exists")?)?;
                expect_end(rest, 1, "exists")?;
                Ok(Command::Exists { key, ts })
            }
            "span" => {
                expect_end(rest, 0, "span")?;
                Ok(Command::Span { key })
            }
            "times" => {
                let from = rest.first().copied().unwrap_or("-");
                let to = rest.get(1).copied().unwrap_or("+");
                expect_end(rest, 2, "times")?;
                Ok(Command::Times {
                    key,
                    from: from.to_string(),
                    to: to.to_string(),
                })
            }
            "count" => Ok(Command::Count {
                key,
                from: arg(rest, 0, "count")?.to_string(),
                to: arg(rest, 1, "count")?.to_string(),
                options: options_from(&rest[2..])?,
            }),
            "range" => Ok(Command::Range {
                key,
                from: arg(rest, 0, "range")?.to_string(),
                to: arg(rest, 1, "range")?.to_string(),
                options: options_from(&rest[2..])?,
            }),
            "revrange" => Ok(Command::RevRange {
                key,
                from: arg(rest, 0, "revrange")?.to_string(),
                to: arg(rest, 1, "revrange")?.to_string(),
                options: options_from(&rest[2..])?,
            }),
            "poprange" => Ok(Command::PopRange {
                key,
                from: arg(rest, 0, "poprange")?.to_string(),
                to: arg(rest, 1, "poprange")?.to_string(),
                options: options_from(&rest[2..])?,
            }),
            "remrange" => Ok(Command::RemRange {
                key,
                from: arg(rest, 0, "remrange")?.to_string(),
                to: arg(rest, 1, "remrange")?.to_string(),
                options: options_from(&rest[2..])?,
            }),
            _ => Err(Error::UnknownCommand {
                verb: verb.to_string(),
            }),
        }
    }

    /// Canonical verb name (for logging and diagnostics).
    pub fn name(&self) -> &'static str {
        match self {
            Command::Add { .. } => "add",
            Command::Del { .. } => "del",
            Command::Set { .. } => "set",
            Command::IncrBy { .. } => "incrBy",
            Command::Get { .. } => "get",
            Command::Pop { .. } => "pop",
            Command::Size { .. } => "size",
            Command::Exists { .. } => "exists",
            Command::Span { .. } => "span",
            Command::Times { .. } => "times",
            Command::Count { .. } => "count",
            Command::Range { .. } => "range",
            Command::RevRange { .. } => "revrange",
            Command::PopRange { .. } => "poprange",
            Command::RemRange { .. } => "remrange",
            Command::Copy { .. } => "copy",
        }
    }
}
