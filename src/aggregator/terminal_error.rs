use super::ErrorKind;
use crate::adapters::NormalizeError;
use indexmap::IndexMap;

/// The error that ends an orchestration run.
///
/// Carries everything the stop-signal block renders: the kind, a message, ordered
/// recovery suggestions and named context fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TerminalError {
    kind: ErrorKind,
    message: String,
    suggestions: Vec<String>,
    context: IndexMap<String, String>,
}

impl TerminalError {
    /// Create an error of `kind`, seeded with the kind's default recovery suggestions.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestions: kind.default_suggestions().iter().map(|s| (*s).to_string()).collect(),
            context: IndexMap::new(),
        }
    }

    /// Append a recovery suggestion after the existing ones.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Attach a context field, rendered as `ERROR_CONTEXT_<NAME>`.
    ///
    /// The name is upper-cased and every character outside `A-Z0-9` becomes `_`.
    #[must_use]
    pub fn with_context(mut self, name: &str, value: impl Into<String>) -> Self {
        let _ = self.context.insert(context_name(name), value.into());
        self
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn context(&self) -> impl Iterator<Item = (&str, &str)> {
        self.context.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

fn context_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

impl From<NormalizeError> for TerminalError {
    fn from(err: NormalizeError) -> Self {
        let kind = match &err {
            NormalizeError::InvalidShape { .. } => ErrorKind::InvalidPayload,
            NormalizeError::MissingFields { .. } => ErrorKind::MissingRequiredFields,
            NormalizeError::InvalidField { .. } => ErrorKind::InvalidFieldValue,
            NormalizeError::Upstream { .. } => ErrorKind::UpstreamError,
        };

        let error = Self::new(kind, err.to_string())
            .with_context("entity", err.entity().to_string())
            .with_context("source", err.format().to_string());

        match err {
            NormalizeError::MissingFields { fields, .. } => error.with_context("fields", fields.join(",")),
            NormalizeError::InvalidField { field, .. } => error.with_context("field", field),
            NormalizeError::InvalidShape { .. } | NormalizeError::Upstream { .. } => error,
        }
    }
}
