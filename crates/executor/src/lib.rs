//! Verb dispatch and execution for tidemark.
//!
//! The [`Executor`] is the single entry point to the engine: it owns the
//! host store, parses the string command surface into the typed
//! [`Command`] instruction set, and drives each verb through the linear
//! pipeline PARSE → FETCH → DECODE → FILTER → PROJECT → (AGGREGATE) →
//! (FORMAT) → (DELETE) → RETURN. Results come back as a [`Reply`] tree in
//! the native ordered-sequence shape, or as one JSON string / msgpack
//! blob under `FORMAT json` / `FORMAT msgpack`.
//!
//! The executor is stateless beyond the store handle and the injected
//! clock; the host serializes invocations per series and provides
//! atomicity, so a fatal error always leaves the store unchanged
//! (destructive verbs delete only after materializing their result).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
mod handlers;
pub mod reply;

mod executor;

pub use command::Command;
pub use executor::Executor;
pub use reply::Reply;

// Re-export the supporting surface so embedders need only this crate.
pub use tidemark_core::{Error, Record, Result, Scalar};
pub use tidemark_engine::{AggKind, Format, Options, Projection, StorageKind};
pub use tidemark_storage::{LexBound, LexRange, Limit, MemoryStore, SeriesStore};
