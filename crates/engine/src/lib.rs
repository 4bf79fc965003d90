//! Query pipeline components for tidemark.
//!
//! This crate implements the four layers that sit between the ordered
//! store and the executor:
//! - codec: bijective `(timestamp, record)` ⇄ ordered-key encoding
//! - range: user bound tokens ⇄ lexicographic key bounds
//! - filter: the comparison/membership mini-language
//! - options: the query-option compiler (`LIMIT`, `AGGREGATION`, …)
//! - aggregate: tumbling-window aggregation across thirteen kinds
//!
//! Everything here is pure: no store access, no I/O. The executor crate
//! wires these into per-verb pipelines.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregate;
pub mod codec;
pub mod filter;
pub mod options;
pub mod range;

pub use aggregate::{AggColumn, AggKind, AggSpec, AggValue, BucketRow, Welford};
pub use codec::{decode, decode_timestamp, encode, Entry, FLAG_FLOAT, FLAG_PLAIN, SEPARATOR};
pub use filter::Filter;
pub use options::{Format, Options, Projection, StorageKind};
pub use range::{point_range, translate_pair, wall_clock_seconds, ClockFn};
