use super::{AggregatorState, ErrorKind, InvalidKeyError, LOG_TARGET, TerminalError};
use crate::facts::{FactPairs, FactValue};
use crate::keys::{FactKey, GenericKey, is_valid_key};
use indexmap::IndexMap;

/// Marker line that separates the facts from the error block.
pub const STOP_MARKER: &str = "STOP PROCESSING";

/// Accumulates the key/value pairs of one orchestration run and its terminal error.
///
/// Keys keep the position of their first insertion; a later value for the same key
/// overwrites in place. At most one error is kept: the first one recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultAggregator {
    pairs: IndexMap<String, String>,
    error: Option<TerminalError>,
}

impl ResultAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite one pair.
    ///
    /// A key outside the naming discipline is rejected, and the rejection is also
    /// recorded as an `INVALID_KEY` terminal error.
    pub fn add_pair(&mut self, key: &str, value: impl FactValue) -> Result<(), InvalidKeyError> {
        if !is_valid_key(key) {
            let rejection = InvalidKeyError::new(key);
            let _ = self.set_error(TerminalError::new(ErrorKind::InvalidKey, rejection.to_string()).with_context("key", key));
            return Err(rejection);
        }

        let _ = self.pairs.insert(key.to_string(), value.render());
        Ok(())
    }

    /// Insert every pair of a serialized value object, in order.
    pub fn add_pairs(&mut self, pairs: &FactPairs) -> Result<(), InvalidKeyError> {
        self.add_pairs_bulk(pairs.iter())
    }

    /// Apply [`add_pair`](Self::add_pair) to every entry, in iteration order.
    ///
    /// Every valid entry is inserted even when an earlier one was rejected; the first
    /// rejection is returned.
    pub fn add_pairs_bulk<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Result<(), InvalidKeyError>
    where
        K: AsRef<str>,
        V: FactValue,
    {
        let mut first_rejection = None;
        for (key, value) in pairs {
            if let Err(rejection) = self.add_pair(key.as_ref(), value) {
                let _ = first_rejection.get_or_insert(rejection);
            }
        }

        first_rejection.map_or(Ok(()), Err)
    }

    /// Record the terminal error of the run.
    ///
    /// Returns `false`, leaving the recorded error untouched, if one was already set.
    pub fn set_error(&mut self, error: TerminalError) -> bool {
        if let Some(existing) = &self.error {
            log::debug!(target: LOG_TARGET, "Ignoring error '{error}' because '{existing}' was recorded first");
            return false;
        }

        log::warn!(target: LOG_TARGET, "Recording terminal error: {error}");
        self.error = Some(error);
        true
    }

    /// Record the outcome of one normalization: the pairs of a success, or the error of
    /// a failure. Returns whether the outcome was a success.
    pub fn record<E: Into<TerminalError>>(&mut self, outcome: Result<FactPairs, E>) -> bool {
        match outcome {
            Ok(pairs) => self.add_pairs(&pairs).is_ok(),
            Err(e) => {
                let _ = self.set_error(e.into());
                false
            }
        }
    }

    /// Fold `other` into this aggregator.
    ///
    /// Pairs are unioned, `other` overwriting on collision. This aggregator's error is
    /// kept if it has one; otherwise `other`'s error is adopted.
    pub fn merge(&mut self, other: Self) {
        for (key, value) in other.pairs {
            let _ = self.pairs.insert(key, value);
        }

        if let Some(error) = other.error {
            let _ = self.set_error(error);
        }
    }

    #[must_use]
    pub fn state(&self) -> AggregatorState {
        if self.error.is_some() {
            AggregatorState::Failed
        } else if self.pairs.is_empty() {
            AggregatorState::Clean
        } else {
            AggregatorState::Accumulating
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).map(String::as_str)
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    #[must_use]
    pub const fn error(&self) -> Option<&TerminalError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `0` when no error was recorded, `1` otherwise.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.error.is_some() { 1 } else { 0 }
    }

    /// Render the pairs as `KEY=value` lines in insertion order, followed by the
    /// stop-signal block when an error was recorded. There is no trailing newline.
    #[must_use]
    pub fn serialize(&self) -> String {
        // the error block owns its keys; pairs added under them would print twice
        let mut lines: Vec<String> = self
            .pairs
            .iter()
            .filter(|(key, _)| self.error.is_none() || !is_error_block_key(key))
            .map(|(key, value)| line(key, value))
            .collect();

        if let Some(error) = &self.error {
            lines.push(STOP_MARKER.to_string());
            lines.push(line(GenericKey::ErrorType.name(), &error.kind().to_string()));
            lines.push(line(GenericKey::ErrorMessage.name(), error.message()));

            for (index, suggestion) in error.suggestions().iter().enumerate() {
                let key = format!("{}_{}", GenericKey::RecoverySuggestion.name(), index + 1);
                lines.push(line(&key, suggestion));
            }

            for (name, value) in error.context() {
                let key = format!("{}_{name}", GenericKey::ErrorContext.name());
                lines.push(line(&key, value));
            }
        }

        lines.join("\n")
    }
}

fn is_error_block_key(key: &str) -> bool {
    key == GenericKey::ErrorType.name()
        || key == GenericKey::ErrorMessage.name()
        || [GenericKey::RecoverySuggestion, GenericKey::ErrorContext]
            .iter()
            .any(|prefix| key.strip_prefix(prefix.name()).is_some_and(|rest| rest.starts_with('_')))
}

fn line(key: &str, value: &str) -> String {
    format!("{key}={}", escape(value))
}

/// Keep every value on one line.
fn escape(value: &str) -> String {
    value.replace("\r\n", "\\n").replace(['\r', '\n'], "\\n")
}
