//! Owner kind type.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The kind of account owning a repository or project.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
pub enum OwnerKind {
    Organization,
    #[default]
    User,
}

impl OwnerKind {
    /// Collapse the source spellings of an owner type (`Organization`, `ORGANIZATION`,
    /// `org`, `User`, `Bot`, ...) into one tag.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "organization" | "organisation" | "org" => Some(Self::Organization),
            "user" | "bot" | "mannequin" => Some(Self::User),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_organization_spellings() {
        assert_eq!(OwnerKind::normalize("Organization"), Some(OwnerKind::Organization));
        assert_eq!(OwnerKind::normalize("ORGANIZATION"), Some(OwnerKind::Organization));
        assert_eq!(OwnerKind::normalize("org"), Some(OwnerKind::Organization));
    }

    #[test]
    fn test_normalize_user_spellings() {
        assert_eq!(OwnerKind::normalize("User"), Some(OwnerKind::User));
        assert_eq!(OwnerKind::normalize("USER"), Some(OwnerKind::User));
        assert_eq!(OwnerKind::normalize("Bot"), Some(OwnerKind::User));
    }

    #[test]
    fn test_normalize_unknown() {
        assert_eq!(OwnerKind::normalize("Enterprise"), None);
        assert_eq!(OwnerKind::normalize(""), None);
    }

    #[test]
    fn test_default_is_user() {
        assert_eq!(OwnerKind::default(), OwnerKind::User);
    }

    #[test]
    fn test_display() {
        assert_eq!(OwnerKind::Organization.to_string(), "Organization");
        assert_eq!(OwnerKind::User.to_string(), "User");
    }

    #[test]
    fn test_serialize_roundtrip() {
        let json = serde_json::to_string(&OwnerKind::Organization).unwrap();
        assert_eq!(json, r#""Organization""#);
        let kind: OwnerKind = serde_json::from_str(&json).unwrap();
        assert_eq!(kind, OwnerKind::Organization);
    }
}
