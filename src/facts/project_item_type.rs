use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The kind of content a project item wraps.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProjectItemType {
    #[default]
    Issue,
    PullRequest,
    DraftIssue,
    Redacted,
}

impl ProjectItemType {
    /// Collapse `ISSUE`, `PullRequest`, `pull_request`, `DRAFT_ISSUE`, `DraftIssue`, ...
    /// into one tag.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        let folded: String = raw.chars().filter(|c| *c != '_' && *c != '-' && !c.is_whitespace()).collect();
        match folded.to_ascii_lowercase().as_str() {
            "issue" => Some(Self::Issue),
            "pullrequest" | "pr" => Some(Self::PullRequest),
            "draftissue" | "draft" => Some(Self::DraftIssue),
            "redacted" | "redacteditem" => Some(Self::Redacted),
            _ => None,
        }
    }
}
