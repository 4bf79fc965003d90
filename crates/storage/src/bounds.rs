//! Lexicographic bounds over raw ordered-set members.
//!
//! Bounds arrive from callers as the textual tokens `-`, `+`, `[X`, `(X`
//! and are parsed once into [`LexBound`]. The byte payload is compared with
//! plain `Ord` on byte slices, which is exactly the host store's member
//! ordering.

use tidemark_core::{Error, Result};

/// One endpoint of a lexicographic range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexBound {
    /// `-` as a min, `+` as a max: no constraint on this side.
    Unbounded,
    /// `[X`: members equal to `X` are inside the range.
    Included(Vec<u8>),
    /// `(X`: members equal to `X` are outside the range.
    Excluded(Vec<u8>),
}

impl LexBound {
    /// Parse a caller-authored bound token. `-` and `+` are accepted on
    /// either side; the engine's range translator is responsible for
    /// handing them to the correct endpoint.
    pub fn parse(token: &str) -> Result<LexBound> {
        match token {
            "-" | "+" => Ok(LexBound::Unbounded),
            _ => {
                if let Some(rest) = token.strip_prefix('[') {
                    Ok(LexBound::Included(rest.as_bytes().to_vec()))
                } else if let Some(rest) = token.strip_prefix('(') {
                    Ok(LexBound::Excluded(rest.as_bytes().to_vec()))
                } else {
                    Err(Error::bad_argument(
                        "Timeseries",
                        format!("invalid range bound {token}"),
                    ))
                }
            }
        }
    }

    /// Inclusive `[X` bound over raw bytes.
    pub fn included(bytes: impl Into<Vec<u8>>) -> LexBound {
        LexBound::Included(bytes.into())
    }

    /// Exclusive `(X` bound over raw bytes.
    pub fn excluded(bytes: impl Into<Vec<u8>>) -> LexBound {
        LexBound::Excluded(bytes.into())
    }
}

/// A pair of lex bounds describing one ordered-set scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexRange {
    /// Lower endpoint.
    pub min: LexBound,
    /// Upper endpoint.
    pub max: LexBound,
}

impl LexRange {
    /// Build a range from two parsed bounds.
    pub fn new(min: LexBound, max: LexBound) -> Self {
        LexRange { min, max }
    }

    /// The unconstrained range (`-` .. `+`).
    pub fn all() -> Self {
        LexRange {
            min: LexBound::Unbounded,
            max: LexBound::Unbounded,
        }
    }

    /// Membership test against raw member bytes.
    pub fn contains(&self, member: &[u8]) -> bool {
        let above_min = match &self.min {
            LexBound::Unbounded => true,
            LexBound::Included(b) => member >= b.as_slice(),
            LexBound::Excluded(b) => member > b.as_slice(),
        };
        if !above_min {
            return false;
        }
        match &self.max {
            LexBound::Unbounded => true,
            LexBound::Included(b) => member <= b.as_slice(),
            LexBound::Excluded(b) => member < b.as_slice(),
        }
    }

    /// True when the bounds can never match any member (min past max).
    /// Inverted ranges scan empty rather than panicking in the store.
    pub fn is_empty_range(&self) -> bool {
        let (lo, lo_excl) = match &self.min {
            LexBound::Unbounded => return false,
            LexBound::Included(b) => (b, false),
            LexBound::Excluded(b) => (b, true),
        };
        let (hi, hi_excl) = match &self.max {
            LexBound::Unbounded => return false,
            LexBound::Included(b) => (b, false),
            LexBound::Excluded(b) => (b, true),
        };
        match lo.cmp(hi) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Equal => lo_excl || hi_excl,
            std::cmp::Ordering::Less => false,
        }
    }
}
