use strum::{Display, EnumIter, EnumString};

/// Classification of a terminal error, rendered as `ERROR_TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// A payload was null, not an object, or otherwise of the wrong shape
    InvalidPayload,

    /// A payload lacked one or more required identity fields
    MissingRequiredFields,

    /// A payload field was present but could not be interpreted
    InvalidFieldValue,

    /// The source reported its own failure instead of data
    UpstreamError,

    /// A caller tried to record a key outside the naming discipline
    InvalidKey,

    /// A payload could not be obtained
    FetchFailed,

    /// A step between fetching and normalizing failed
    TransformFailed,
}

impl ErrorKind {
    /// Recovery suggestions attached to every error of this kind, in the order they
    /// should be tried.
    #[must_use]
    pub const fn default_suggestions(self) -> &'static [&'static str] {
        match self {
            Self::InvalidPayload => &[
                "Verify that the command produced JSON output rather than an error message",
                "Check that the payload was fetched with the source format that was declared",
            ],
            Self::MissingRequiredFields => &[
                "Request the missing fields explicitly (for example with --json or a wider GraphQL selection)",
                "Check that the payload describes the declared entity",
            ],
            Self::InvalidFieldValue => &["Check that the field holds a value of the documented type (timestamps must be RFC 3339)"],
            Self::UpstreamError => &[
                "Check that the requested entity exists and is visible with the current credentials",
                "Retry the request after checking rate limits",
            ],
            Self::InvalidKey => &["Use upper-snake-case keys only (A-Z, 0-9 and underscores, starting with a letter)"],
            Self::FetchFailed => &[
                "Check network connectivity and authentication",
                "Retry the request after checking rate limits",
            ],
            Self::TransformFailed => &["Inspect the intermediate output of the failing step"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_display_is_screaming_snake_case() {
        assert_eq!(ErrorKind::MissingRequiredFields.to_string(), "MISSING_REQUIRED_FIELDS");
        assert_eq!(ErrorKind::InvalidKey.to_string(), "INVALID_KEY");
    }

    #[test]
    fn test_from_str() {
        assert_eq!(ErrorKind::from_str("FETCH_FAILED").unwrap(), ErrorKind::FetchFailed);
        assert!(ErrorKind::from_str("fetch").is_err());
    }

    #[test]
    fn test_every_kind_has_suggestions() {
        for kind in ErrorKind::iter() {
            assert!(!kind.default_suggestions().is_empty(), "{kind} has no recovery suggestions");
        }
    }
}
