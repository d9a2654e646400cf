use super::SourceKind;
use crate::facts::EntityKind;

/// Failure to build a value object from a raw payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    /// The payload is not an object of the expected shape.
    #[error("invalid {entity} payload from {format} source: response is null, undefined, or not an object")]
    InvalidShape { entity: EntityKind, format: SourceKind },

    /// One or more required fields are absent or null.
    #[error("invalid {entity} payload from {format} source: missing required fields: {}", fields.join(", "))]
    MissingFields {
        entity: EntityKind,
        format: SourceKind,
        fields: Vec<String>,
    },

    /// A field is present but its value cannot be interpreted.
    #[error("invalid {entity} payload from {format} source: field '{field}' {reason}")]
    InvalidField {
        entity: EntityKind,
        format: SourceKind,
        field: String,
        reason: String,
    },

    /// The source reported its own failure instead of data.
    #[error("{format} source returned an error instead of {entity} data: {message}")]
    Upstream {
        entity: EntityKind,
        format: SourceKind,
        message: String,
    },
}

impl NormalizeError {
    #[must_use]
    pub const fn entity(&self) -> EntityKind {
        match self {
            Self::InvalidShape { entity, .. }
            | Self::MissingFields { entity, .. }
            | Self::InvalidField { entity, .. }
            | Self::Upstream { entity, .. } => *entity,
        }
    }

    #[must_use]
    pub const fn format(&self) -> SourceKind {
        match self {
            Self::InvalidShape { format, .. }
            | Self::MissingFields { format, .. }
            | Self::InvalidField { format, .. }
            | Self::Upstream { format, .. } => *format,
        }
    }
}
