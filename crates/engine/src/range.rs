//! Range translation: user bound tokens → lexicographic key bounds.
//!
//! Callers describe timestamp intervals with the tokens `-`, `+`, `*`,
//! `[X`, `(X`, or a decimal integer. Numeric bounds translate into the
//! prefix forms `[T|` (lower) and `(T'+1|` (upper): the `+1` fudge makes
//! the numeric upper endpoint inclusive despite the exclusive `(` bracket,
//! because every key of timestamp `T'` sorts after `T'|` and before
//! `T'+1|`. The fudge is `+1` for an ascending pair and `-1` when the
//! caller supplied a reversed pair; a reversed pair yields a degenerate
//! lex range (the store scans it verbatim, inverted bounds match nothing).
//!
//! Lexicographic key order agrees with numeric timestamp order only at
//! equal decimal width; the prefix bound shape is what keeps single-
//! timestamp selections exact across widths.

use std::time::{SystemTime, UNIX_EPOCH};

use tidemark_core::{Error, Result};
use tidemark_storage::{LexBound, LexRange};

use crate::codec::SEPARATOR;

/// Clock used to resolve the `*` bound token, injectable for tests.
pub type ClockFn = fn() -> i64;

/// Default clock: current wall-clock second.
pub fn wall_clock_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

enum BoundToken {
    Open,
    Numeric(i64),
    Verbatim(LexBound),
}

fn resolve(token: &str, clock: ClockFn) -> Result<BoundToken> {
    match token {
        "-" | "+" => Ok(BoundToken::Open),
        "*" => Ok(BoundToken::Numeric(clock())),
        _ if token.starts_with('[') || token.starts_with('(') => {
            Ok(BoundToken::Verbatim(LexBound::parse(token)?))
        }
        _ => token
            .parse::<i64>()
            .map(BoundToken::Numeric)
            .map_err(|_| Error::bad_argument("Timeseries", format!("invalid range bound {token}"))),
    }
}

fn prefix(ts: i64) -> Vec<u8> {
    let mut bytes = ts.to_string().into_bytes();
    bytes.push(SEPARATOR);
    bytes
}

/// Translate a `(from, to)` bound pair into the lex range handed to the
/// ordered store. Caller-authored `[X` / `(X` bounds pass through
/// verbatim; `*` resolves through `clock`.
pub fn translate_pair(from: &str, to: &str, clock: ClockFn) -> Result<LexRange> {
    let a = resolve(from, clock)?;
    let b = resolve(to, clock)?;

    let ascending = match (&a, &b) {
        (BoundToken::Numeric(x), BoundToken::Numeric(y)) => x <= y,
        _ => true,
    };
    let fudge = if ascending { 1 } else { -1 };

    let min = match a {
        BoundToken::Open => LexBound::Unbounded,
        BoundToken::Numeric(t) => LexBound::Included(prefix(t)),
        BoundToken::Verbatim(bound) => bound,
    };
    let max = match b {
        BoundToken::Open => LexBound::Unbounded,
        BoundToken::Numeric(t) => LexBound::Excluded(prefix(t + fudge)),
        BoundToken::Verbatim(bound) => bound,
    };
    Ok(LexRange::new(min, max))
}

/// The range selecting exactly one timestamp's entries: `[T|` / `(T+1|`.
///
/// Point lookups scan this with a store-side limit of 2; more than one
/// match is a fatal invariant violation surfaced by the executor.
pub fn point_range(ts: i64) -> LexRange {
    LexRange::new(
        LexBound::Included(prefix(ts)),
        LexBound::Excluded(prefix(ts + 1)),
    )
}
