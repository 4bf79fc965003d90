//! The Executor - single entry point to the engine.
//!
//! A stateless dispatcher over the host store: parses the string command
//! surface, routes typed commands to the verb handlers, and logs the
//! dispatch path. One invocation is strictly linear; the host provides
//! atomicity and cross-invocation serialization.

use std::time::Instant;

use tracing::{debug, warn};

use tidemark_core::{Error, Result};
use tidemark_engine::{wall_clock_seconds, ClockFn};
use tidemark_storage::SeriesStore;

use crate::command::Command;
use crate::handlers;
use crate::reply::Reply;

/// Verb dispatcher over a host-supplied ordered store.
///
/// The executor owns the store handle and an injectable clock (used only
/// to resolve the `*` bound token); it keeps no other state.
///
/// # Example
///
/// ```
/// use tidemark_executor::{Executor, MemoryStore, Reply};
///
/// let mut ex = Executor::new(MemoryStore::new());
/// ex.dispatch(&["sensor", "add", "1000", "value", "20"]).unwrap();
/// let size = ex.dispatch(&["sensor", "size"]).unwrap();
/// assert_eq!(size, Reply::Int(1));
/// ```
pub struct Executor<S: SeriesStore> {
    store: S,
    clock: ClockFn,
}

impl<S: SeriesStore> Executor<S> {
    /// Create an executor with the default wall clock.
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: wall_clock_seconds,
        }
    }

    /// Create an executor with a pinned clock (tests, replay).
    pub fn with_clock(store: S, clock: ClockFn) -> Self {
        Self { store, clock }
    }

    /// Shared view of the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the executor, returning the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Parse and execute one raw argument vector.
    pub fn dispatch<T: AsRef<str>>(&mut self, argv: &[T]) -> Result<Reply> {
        let argv: Vec<&str> = argv.iter().map(AsRef::as_ref).collect();
        let command = Command::parse(&argv)?;
        self.execute(command)
    }

    /// Execute one typed command.
    pub fn execute(&mut self, command: Command) -> Result<Reply> {
        let verb = command.name();
        let start = Instant::now();

        let result = match command {
            Command::Add { key, ts, fields } => {
                handlers::write::add(&mut self.store, &key, ts, &fields)
            }
            Command::Del { key, timestamps } => {
                handlers::write::del(&mut self.store, &key, &timestamps)
            }
            Command::Set { key, ts, fields } => {
                handlers::write::set(&mut self.store, &key, ts, &fields)
            }
            Command::IncrBy { key, ts, deltas } => {
                handlers::write::incr_by(&mut self.store, &key, ts, &deltas)
            }
            Command::Get { key, ts, options } => {
                handlers::read::get(&self.store, &key, ts, &options)
            }
            Command::Pop { key, ts, options } => {
                handlers::read::pop(&mut self.store, &key, ts, &options)
            }
            Command::Size { key } => handlers::read::size(&self.store, &key),
            Command::Exists { key, ts } => handlers::read::exists(&self.store, &key, ts),
            Command::Span { key } => handlers::read::span(&self.store, &key),
            Command::Times { key, from, to } => {
                handlers::read::times(&self.store, &key, &from, &to, self.clock)
            }
            Command::Count {
                key,
                from,
                to,
                options,
            } => handlers::read::count(&self.store, &key, &from, &to, &options, self.clock),
            Command::Range {
                key,
                from,
                to,
                options,
            } => handlers::scan::range(&self.store, &key, &from, &to, &options, false, self.clock),
            Command::RevRange {
                key,
                from,
                to,
                options,
            } => handlers::scan::range(&self.store, &key, &from, &to, &options, true, self.clock),
            Command::PopRange {
                key,
                from,
                to,
                options,
            } => handlers::scan::pop_range(&mut self.store, &key, &from, &to, &options, self.clock),
            Command::RemRange {
                key,
                from,
                to,
                options,
            } => handlers::scan::rem_range(&mut self.store, &key, &from, &to, &options, self.clock),
            Command::Copy {
                source,
                dest,
                from,
                to,
                options,
            } => handlers::copy::copy(
                &mut self.store,
                &source,
                &dest,
                &from,
                &to,
                &options,
                self.clock,
            ),
        };

        match &result {
            Ok(_) => debug!(
                target: "tidemark::command",
                command = verb,
                elapsed_us = start.elapsed().as_micros() as u64,
                "verb complete"
            ),
            Err(e @ (Error::DuplicateTimestamp { .. } | Error::CorruptEntry { .. })) => warn!(
                target: "tidemark::command",
                command = verb,
                error = %e,
                "invariant violation"
            ),
            Err(e) => debug!(
                target: "tidemark::command",
                command = verb,
                error = %e,
                "verb failed"
            ),
        }
        result
    }
}
