//! Accumulation of facts across one orchestration run
//!
//! A run normalizes one or more payloads and reports all of their facts, or as many as
//! were gathered before something failed, as a single flat record. The
//! [`ResultAggregator`] is the only stateful object in the pipeline: it is created by
//! the caller, passed explicitly to whatever produces facts, and finally rendered.
//!
//! # Output Protocol
//!
//! ```text
//! KEY=value
//! KEY=value
//! STOP PROCESSING
//! ERROR_TYPE=<kind>
//! ERROR_MESSAGE=<message>
//! RECOVERY_SUGGESTION_1=<first suggestion>
//! ERROR_CONTEXT_<NAME>=<value>
//! ```
//!
//! Everything from the `STOP PROCESSING` marker on appears only when a terminal error
//! was recorded. Facts gathered before (and after) the error are always rendered.

mod aggregator_state;
mod error_kind;
mod invalid_key_error;
mod result_aggregator;
mod terminal_error;

pub use aggregator_state::AggregatorState;
pub use error_kind::ErrorKind;
pub use invalid_key_error::InvalidKeyError;
pub use result_aggregator::{ResultAggregator, STOP_MARKER};
pub use terminal_error::TerminalError;

const LOG_TARGET: &str = "aggregator";
