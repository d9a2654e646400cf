//! Processing shared by the `normalize` and `collect` commands.

use super::Host;
use crate::adapters::{SourceContext, SourceKind, normalize};
use crate::aggregator::{ErrorKind, ResultAggregator, TerminalError};
use crate::facts::EntityKind;
use crate::keys::{FactKey, GenericKey};
use camino::Utf8Path;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde_json::Value;
use std::fs;
use std::io::{Read, Write};

const LOG_TARGET: &str = "  commands";

/// Path that selects standard input instead of a file
pub const STDIN_PATH: &str = "-";

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Route diagnostics to stderr at the requested level.
///
/// Stdout carries the fact record, so nothing is initialised at [`LogLevel::None`].
pub fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    // a second initialisation (e.g. several runs in one test process) is harmless
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

/// Read a payload from `path`, or from standard input when `path` is [`STDIN_PATH`].
pub fn read_payload(path: &Utf8Path) -> Result<String, TerminalError> {
    let outcome = if path.as_str() == STDIN_PATH {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).map(|_| text)
    } else {
        fs::read_to_string(path)
    };

    outcome.map_err(|e| {
        TerminalError::new(ErrorKind::FetchFailed, format!("could not read payload '{path}': {e}"))
            .with_suggestion("Check that the payload file exists and is readable")
            .with_context("path", path.as_str())
    })
}

/// Parse the text of a payload as JSON.
pub fn parse_payload(text: &str, path: &Utf8Path) -> Result<Value, TerminalError> {
    serde_json::from_str(text).map_err(|e| {
        TerminalError::new(ErrorKind::InvalidPayload, format!("payload '{path}' is not valid JSON: {e}")).with_context("path", path.as_str())
    })
}

/// Normalize `payload` into `aggregator` and return how many entities were normalized.
///
/// A JSON array is normalized element by element, each element's keys carrying a
/// 1-based index suffix. Every element is attempted; the first failure becomes the
/// terminal error of the run.
pub fn normalize_into(
    aggregator: &mut ResultAggregator,
    entity: EntityKind,
    source: SourceKind,
    payload: &Value,
    context: &SourceContext,
    now: DateTime<Utc>,
) -> usize {
    normalize_with_suffix(aggregator, entity, source, payload, context, now, None)
}

/// Like [`normalize_into`], for one of several payloads of the same entity in a run.
///
/// Every key carries the payload's 1-based `occurrence` suffix so payloads of the same
/// entity cannot overwrite each other. Array elements add their index after it, as in
/// `ISSUE_NUMBER_2_1`.
pub fn normalize_occurrence_into(
    aggregator: &mut ResultAggregator,
    entity: EntityKind,
    source: SourceKind,
    payload: &Value,
    context: &SourceContext,
    now: DateTime<Utc>,
    occurrence: usize,
) -> usize {
    normalize_with_suffix(aggregator, entity, source, payload, context, now, Some(occurrence))
}

fn normalize_with_suffix(
    aggregator: &mut ResultAggregator,
    entity: EntityKind,
    source: SourceKind,
    payload: &Value,
    context: &SourceContext,
    now: DateTime<Utc>,
    occurrence: Option<usize>,
) -> usize {
    let prefix = occurrence.map(|n| format!("_{n}")).unwrap_or_default();

    let Value::Array(elements) = payload else {
        let outcome = normalize(entity, source, payload, context, now);
        let Some(occurrence) = occurrence else {
            return usize::from(aggregator.record(outcome));
        };

        return match outcome {
            Ok(pairs) => {
                let suffixed = pairs.iter().map(|(key, value)| (format!("{key}{prefix}"), value));
                usize::from(aggregator.add_pairs_bulk(suffixed).is_ok())
            }
            Err(e) => {
                let _ = aggregator.set_error(TerminalError::from(e).with_context("occurrence", occurrence.to_string()));
                0
            }
        };
    };

    log::info!(target: LOG_TARGET, "Normalizing {} {entity} payloads from {source} source", elements.len());

    let mut normalized = 0;
    for (index, element) in elements.iter().enumerate() {
        let position = index + 1;
        match normalize(entity, source, element, context, now) {
            Ok(pairs) => {
                let suffixed = pairs.iter().map(|(key, value)| (format!("{key}{prefix}_{position}"), value));
                if aggregator.add_pairs_bulk(suffixed).is_ok() {
                    normalized += 1;
                }
            }
            Err(e) => {
                let mut error = TerminalError::from(e).with_context("index", position.to_string());
                if let Some(occurrence) = occurrence {
                    error = error.with_context("occurrence", occurrence.to_string());
                }
                let _ = aggregator.set_error(error);
            }
        }
    }

    normalized
}

/// Seed the leading generic keys of a run.
///
/// `STATUS` and `VALID` are written optimistically here and settled by [`finish`], which
/// overwrites them in place so they stay at the top of the record.
pub fn begin(aggregator: &mut ResultAggregator, now: DateTime<Utc>) {
    let _ = aggregator.add_pair(GenericKey::Status.name(), "success");
    let _ = aggregator.add_pair(GenericKey::Valid.name(), true);
    let _ = aggregator.add_pair(GenericKey::GeneratedAt.name(), now);
}

/// Settle the outcome keys, write the record and report the exit code to the host.
pub fn finish<H: Host>(host: &mut H, aggregator: &mut ResultAggregator) {
    if aggregator.error().is_some() {
        let _ = aggregator.add_pair(GenericKey::Status.name(), "error");
        let _ = aggregator.add_pair(GenericKey::Valid.name(), false);
    }

    log::debug!(target: LOG_TARGET, "Run finished in state '{}' with {} pairs", aggregator.state(), aggregator.len());

    let _ = writeln!(host.output(), "{}", aggregator.serialize());
    host.exit(aggregator.exit_code());
}
