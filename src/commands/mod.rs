//! Command-line front-end for gh-facts
//!
//! The front-end is deliberately thin: it reads payloads, hands them to the
//! [`adapters`](crate::adapters), feeds the results into a
//! [`ResultAggregator`](crate::aggregator::ResultAggregator) and relays the aggregator's
//! text and exit code.
//!
//! # Commands
//!
//! - **normalize**: Normalize one payload file (or standard input) of a given entity and
//!   source shape. A JSON array is normalized element by element, with indexed keys.
//! - **collect**: Normalize every payload listed in a TOML run manifest into one record.
//! - **keys**: List the key registry, optionally restricted to one entity.
//!
//! Every normalizing run starts with the `STATUS`, `VALID` and `GENERATED_AT` generic
//! keys. Failures while reading or normalizing a payload end up in the record's error
//! block, never on stderr; stderr is reserved for logging and for problems with the
//! command line or manifest itself.

mod collect;
mod common;
mod host;
mod keys;
mod manifest;
mod normalize;
mod run;

pub use collect::{CollectArgs, collect_payloads};
pub use common::LogLevel;
pub use host::Host;
pub use keys::{KeysArgs, list_keys};
pub use manifest::{DEFAULT_MANIFEST, Manifest, PayloadEntry};
pub use normalize::{NormalizeArgs, normalize_payload};
pub use run::run;
