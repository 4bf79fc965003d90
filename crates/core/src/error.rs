//! Error types for the tidemark engine.
//!
//! Every fatal condition surfaces as one [`Error`] rendering to a single
//! human-readable diagnostic prefixed by the verb or sub-component that
//! raised it. We use `thiserror` for the `Display`/`Error` impls.
//!
//! ## Taxonomy
//!
//! | Category | Variants | Aborts the verb? |
//! |----------|----------|------------------|
//! | Argument | `UnknownCommand`, `WrongArity`, `BadArgument` | yes |
//! | Filter parse | `FilterParse` | yes |
//! | Type | `NotANumber` | yes |
//! | Invariant | `DuplicateTimestamp`, `CorruptEntry` | yes (bug) |
//! | System | `Serialization` | yes |
//!
//! Missing data (a point lookup that finds nothing) is not an error, and
//! per-entry coercion failures inside a filter degrade the predicate to
//! `false` instead of constructing an `Error`.

use thiserror::Error;

/// Convenience alias used across all tidemark crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the engine.
///
/// Destructive verbs construct their result before deleting anything, so
/// any of these errors leaves the store unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Verb name did not resolve against the command table.
    #[error("Timeseries: unknown command {verb}")]
    UnknownCommand {
        /// The unrecognized verb, as supplied.
        verb: String,
    },

    /// Too few or malformed positional arguments for a verb.
    #[error("{verb}: wrong number of arguments")]
    WrongArity {
        /// Normalized verb name.
        verb: String,
    },

    /// Argument-level failure inside a verb or option parser.
    ///
    /// `context` is the option or verb keyword (`LIMIT`, `AGGREGATION`,
    /// `FORMAT`, …) so the rendered diagnostic reads
    /// `"LIMIT: offset value must be a number"`.
    #[error("{context}: {reason}")]
    BadArgument {
        /// Option keyword or verb that rejected the argument.
        context: String,
        /// Description of the failure.
        reason: String,
    },

    /// A filter expression matched no operator or membership form.
    #[error("FILTER: unable to parse expression : {expression}")]
    FilterParse {
        /// The offending expression token.
        expression: String,
    },

    /// A numeric operation hit a non-numeric stored value.
    #[error("{verb}: field {field} is not a number")]
    NotANumber {
        /// Verb that required a number.
        verb: String,
        /// Field holding the non-numeric value.
        field: String,
    },

    /// More than one stored entry carries the same timestamp prefix.
    /// This is a fatal invariant violation, not a user error.
    #[error("Timeseries: duplicate entries for timestamp {ts}")]
    DuplicateTimestamp {
        /// The violating timestamp.
        ts: i64,
    },

    /// A stored key failed to decode: missing separator, non-numeric
    /// timestamp, or truncated record pack.
    #[error("Timeseries: corrupt entry: {reason}")]
    CorruptEntry {
        /// What failed during decode.
        reason: String,
    },

    /// Output serialization failed (JSON or msgpack encode).
    #[error("Timeseries: serialization error: {reason}")]
    Serialization {
        /// Encoder error details.
        reason: String,
    },
}

impl Error {
    /// Shorthand for [`Error::BadArgument`].
    pub fn bad_argument(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::BadArgument {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::CorruptEntry`].
    pub fn corrupt(reason: impl Into<String>) -> Self {
        Error::CorruptEntry {
            reason: reason.into(),
        }
    }
}
