use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Who can see a repository or project.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    /// Collapse `PUBLIC`, `public`, `private`, `internal`, ... into one tag.
    ///
    /// Internal visibility is restricted to members, so it is treated as private.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "public" => Some(Self::Public),
            "private" | "internal" => Some(Self::Private),
            _ => None,
        }
    }

    #[must_use]
    pub const fn from_private_flag(private: bool) -> Self {
        if private { Self::Private } else { Self::Public }
    }
}
