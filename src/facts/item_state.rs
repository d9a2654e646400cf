use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Open/closed state of an issue-like item.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ItemState {
    #[default]
    Open,
    Closed,
}

impl ItemState {
    /// Collapse the state evidence found in a payload into one tag.
    ///
    /// An explicit state string wins. Without one, a `closed` flag or the presence of
    /// a close timestamp means closed.
    #[must_use]
    pub fn normalize(state: Option<&str>, closed_flag: Option<bool>, closed_at_present: bool) -> Self {
        if let Some(state) = state {
            match state.trim().to_ascii_lowercase().as_str() {
                "open" | "opened" | "reopened" => return Self::Open,
                "closed" | "merged" | "done" | "completed" => return Self::Closed,
                _ => {}
            }
        }

        match closed_flag {
            Some(true) => Self::Closed,
            Some(false) => Self::Open,
            None if closed_at_present => Self::Closed,
            None => Self::Open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_string_synonyms() {
        assert_eq!(ItemState::normalize(Some("closed"), None, false), ItemState::Closed);
        assert_eq!(ItemState::normalize(Some("CLOSED"), None, false), ItemState::Closed);
        assert_eq!(ItemState::normalize(Some("OPEN"), None, false), ItemState::Open);
        assert_eq!(ItemState::normalize(Some("MERGED"), None, false), ItemState::Closed);
    }

    #[test]
    fn test_closed_flag_without_state() {
        assert_eq!(ItemState::normalize(None, Some(true), false), ItemState::Closed);
        assert_eq!(ItemState::normalize(None, Some(false), true), ItemState::Open);
    }

    #[test]
    fn test_closed_at_fallback() {
        assert_eq!(ItemState::normalize(None, None, true), ItemState::Closed);
        assert_eq!(ItemState::normalize(None, None, false), ItemState::Open);
    }

    #[test]
    fn test_unknown_state_string_uses_other_evidence() {
        assert_eq!(ItemState::normalize(Some("weird"), Some(true), false), ItemState::Closed);
    }

    #[test]
    fn test_display() {
        assert_eq!(ItemState::Open.to_string(), "open");
        assert_eq!(ItemState::Closed.to_string(), "closed");
    }
}
