//! Core types for the tidemark time-series engine.
//!
//! This crate defines the foundational types used throughout the system:
//! - Scalar: dynamic value variant stored in record fields
//! - Record: one entry's mapping of field names to scalars
//! - Error: unified error hierarchy with verb-prefixed diagnostics
//!
//! Nothing here touches the ordered store; higher crates compose these
//! types into the query pipeline.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod value;

pub use error::{Error, Result};
pub use value::{is_valid_field_name, Record, Scalar};
