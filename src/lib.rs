//! gh-facts crate
//!
//! Normalizes source-control hosting payloads (command-line tool JSON, REST responses
//! and GraphQL responses) into canonical value objects, and flattens those objects into
//! a single ordered `KEY=value` record with a well-defined exit code.
//!
//! # Module Organization
//!
//! - [`keys`]: The closed registry of permitted serialization keys
//! - [`facts`]: Canonical value objects and their derived computations
//! - [`adapters`]: Per-source construction of value objects from raw payloads
//! - [`aggregator`]: Accumulation of key/value pairs and terminal error tracking
//! - [`commands`]: Command-line front-end relaying the aggregator's output

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub mod adapters;
pub mod aggregator;
pub mod facts;
pub mod keys;

#[doc(hidden)]
pub mod commands;

pub use commands::{Host, run};
