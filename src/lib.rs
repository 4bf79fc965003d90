//! # Tidemark
//!
//! An embedded univariate time-series engine layered on an ordered
//! key-value store.
//!
//! Each series is one ordered container keyed by a string name; each
//! entry binds a unique integer timestamp to a small schema-less record.
//! The engine exposes a fixed verb set (insert, upsert, increment,
//! delete, point lookup, range scans, destructive ranges, counting,
//! span, copy-with-transform) plus a query sub-language with filtering,
//! projection, tumbling-window aggregation, result formatting, and
//! pagination.
//!
//! # Quick Start
//!
//! ```
//! use tidemark::{Executor, MemoryStore, Reply};
//!
//! fn main() -> tidemark::Result<()> {
//!     let mut ts = Executor::new(MemoryStore::new());
//!
//!     ts.dispatch(&["orders", "add", "1564632000000",
//!                   "item_id", "cat-987H1", "amount", "2500"])?;
//!
//!     let record = ts.dispatch(&["orders", "get", "1564632000000",
//!                                "LABELS", "item_id", "amount"])?;
//!     assert!(matches!(record, Reply::Array(_)));
//!
//!     let avg = ts.dispatch(&["orders", "range", "-", "+",
//!                             "AGGREGATION", "3600000", "avg(amount)"])?;
//!     assert!(matches!(avg, Reply::Array(_)));
//!     Ok(())
//! }
//! ```
//!
//! # Verb Surface
//!
//! | Verb | Effect | Returns |
//! |------|--------|---------|
//! | `add` | insert entry (upsert) | timestamp |
//! | `del` | remove by timestamp | count removed |
//! | `set` | merge fields | `OK` |
//! | `incrBy` | increment numeric fields | new values |
//! | `get` / `pop` | point lookup (pop deletes) | record |
//! | `size` / `exists` / `span` / `times` | series introspection | - |
//! | `count` | filtered range count | integer |
//! | `range` / `revrange` / `poprange` | range scans | entry list |
//! | `remrange` | destructive range | count removed |
//! | `copy` | copy with transform | count written |
//!
//! # Architecture
//!
//! The [`Executor`] is the single entry point; hosts hand it an ordered
//! store implementing [`SeriesStore`] and raw argument vectors. Internal
//! crates (core, storage, engine) stay behind this surface.

// Re-export the public API from tidemark-executor
pub use tidemark_executor::*;
