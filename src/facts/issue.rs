use super::time_math::{age_in_days, days_since};
use super::{FactPairs, ItemState, ToFactPairs};
use crate::keys::fact_keys;
use chrono::{DateTime, Utc};

/// Window used by [`Issue::has_recent_activity`] when no other is requested.
pub const RECENT_ACTIVITY_DAYS: u64 = 7;

/// Days without an update after which an open issue is considered stale.
pub const STALE_AFTER_DAYS: u64 = 30;

fact_keys! {
    /// Keys emitted by [`Issue`].
    pub enum IssueKey in "ISSUE" {
        Id => "ISSUE_ID", "Node or database identifier of the issue, empty when unknown";
        Number => "ISSUE_NUMBER", "Issue number within its repository";
        Title => "ISSUE_TITLE", "Issue title";
        Body => "ISSUE_BODY", "Issue body text";
        State => "ISSUE_STATE", "Issue state: open or closed";
        StateReason => "ISSUE_STATE_REASON", "Reason for the current state, empty when unknown";
        Author => "ISSUE_AUTHOR", "Login of the issue author";
        Assignees => "ISSUE_ASSIGNEES", "Comma-separated assignee logins";
        Labels => "ISSUE_LABELS", "Comma-separated label names";
        Milestone => "ISSUE_MILESTONE", "Milestone title, empty when none";
        CommentsCount => "ISSUE_COMMENTS_COUNT", "Number of comments";
        IsLocked => "ISSUE_IS_LOCKED", "Whether the conversation is locked";
        Url => "ISSUE_URL", "Web URL of the issue";
        Repository => "ISSUE_REPOSITORY", "owner/name of the repository holding the issue";
        CreatedAt => "ISSUE_CREATED_AT", "Creation timestamp";
        UpdatedAt => "ISSUE_UPDATED_AT", "Last update timestamp";
        ClosedAt => "ISSUE_CLOSED_AT", "Close timestamp, empty while open";
        AgeDays => "ISSUE_AGE_DAYS", "Days since the issue was opened";
        DaysSinceUpdate => "ISSUE_DAYS_SINCE_UPDATE", "Days since the last update";
        DaysToClose => "ISSUE_DAYS_TO_CLOSE", "Days from opening to closing, empty while open";
        HasRecentActivity => "ISSUE_HAS_RECENT_ACTIVITY", "Updated within the last 7 days";
        IsStale => "ISSUE_IS_STALE", "Open and not updated for more than 30 days";
    }
}

/// An issue of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub(crate) id: String,
    pub(crate) number: u64,
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) state: ItemState,
    pub(crate) state_reason: Option<String>,
    pub(crate) author: String,
    pub(crate) assignees: Vec<String>,
    pub(crate) labels: Vec<String>,
    pub(crate) milestone: Option<String>,
    pub(crate) comments_count: u64,
    pub(crate) is_locked: bool,
    pub(crate) url: String,
    pub(crate) repository: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) closed_at: Option<DateTime<Utc>>,
}

impl Issue {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn number(&self) -> u64 {
        self.number
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub const fn state(&self) -> ItemState {
        self.state
    }

    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    #[must_use]
    pub fn assignees(&self) -> &[String] {
        &self.assignees
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn milestone(&self) -> Option<&str> {
        self.milestone.as_deref()
    }

    #[must_use]
    pub const fn comments_count(&self) -> u64 {
        self.comments_count
    }

    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub const fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == ItemState::Open
    }

    #[must_use]
    pub fn age_in_days(&self, now: DateTime<Utc>) -> u64 {
        age_in_days(now, self.created_at)
    }

    #[must_use]
    pub fn days_since_update(&self, now: DateTime<Utc>) -> u64 {
        days_since(now, self.updated_at)
    }

    /// Days from opening to closing, when the issue has been closed.
    #[must_use]
    pub fn days_to_close(&self) -> Option<u64> {
        self.closed_at.map(|closed_at| days_since(closed_at, self.created_at))
    }

    #[must_use]
    pub fn has_recent_activity(&self, now: DateTime<Utc>, days: u64) -> bool {
        self.days_since_update(now) <= days
    }

    /// Open, and not updated for more than `days` days.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>, days: u64) -> bool {
        self.is_open() && self.days_since_update(now) > days
    }
}

impl ToFactPairs for Issue {
    fn to_fact_pairs(&self, now: DateTime<Utc>) -> FactPairs {
        let mut pairs = FactPairs::new();

        pairs.push(IssueKey::Id, &self.id);
        pairs.push(IssueKey::Number, self.number);
        pairs.push(IssueKey::Title, &self.title);
        pairs.push(IssueKey::Body, &self.body);
        pairs.push(IssueKey::State, self.state);
        pairs.push(IssueKey::StateReason, &self.state_reason);
        pairs.push(IssueKey::Author, &self.author);
        pairs.push(IssueKey::Assignees, &self.assignees);
        pairs.push(IssueKey::Labels, &self.labels);
        pairs.push(IssueKey::Milestone, &self.milestone);
        pairs.push(IssueKey::CommentsCount, self.comments_count);
        pairs.push(IssueKey::IsLocked, self.is_locked);
        pairs.push(IssueKey::Url, &self.url);
        pairs.push(IssueKey::Repository, &self.repository);
        pairs.push(IssueKey::CreatedAt, self.created_at);
        pairs.push(IssueKey::UpdatedAt, self.updated_at);
        pairs.push(IssueKey::ClosedAt, self.closed_at);

        pairs.push(IssueKey::AgeDays, self.age_in_days(now));
        pairs.push(IssueKey::DaysSinceUpdate, self.days_since_update(now));
        pairs.push(IssueKey::DaysToClose, self.days_to_close());
        pairs.push(IssueKey::HasRecentActivity, self.has_recent_activity(now, RECENT_ACTIVITY_DAYS));
        pairs.push(IssueKey::IsStale, self.is_stale(now, STALE_AFTER_DAYS));

        pairs
    }
}
