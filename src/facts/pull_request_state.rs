use super::ItemState;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Lifecycle state of a pull request.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PullRequestState {
    #[default]
    Open,
    Closed,
    Merged,
}

impl PullRequestState {
    /// Collapse the state evidence found in a payload into one tag.
    ///
    /// Any evidence of a merge (a `merged` flag, a merge timestamp, or a `MERGED`
    /// state) wins over the open/closed state.
    #[must_use]
    pub fn normalize(state: Option<&str>, merged_flag: Option<bool>, merged_at_present: bool, closed_at_present: bool) -> Self {
        let state_says_merged = state.is_some_and(|s| s.trim().eq_ignore_ascii_case("merged"));
        if state_says_merged || merged_flag == Some(true) || merged_at_present {
            return Self::Merged;
        }

        match ItemState::normalize(state, None, closed_at_present) {
            ItemState::Open => Self::Open,
            ItemState::Closed => Self::Closed,
        }
    }

    /// The open/closed view of this state; merged pull requests are closed.
    #[must_use]
    pub const fn item_state(self) -> ItemState {
        match self {
            Self::Open => ItemState::Open,
            Self::Closed | Self::Merged => ItemState::Closed,
        }
    }
}
