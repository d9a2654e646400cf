use super::time_math::{age_in_days, days_since};
use super::{FactPairs, PullRequestState, ToFactPairs};
use crate::keys::fact_keys;
use chrono::{DateTime, Utc};

/// Window used by [`PullRequest::has_recent_activity`] when no other is requested.
pub const RECENT_ACTIVITY_DAYS: u64 = 7;

/// Days without an update after which an open pull request is considered stale.
pub const STALE_AFTER_DAYS: u64 = 30;

/// Changed-line count at or above which a pull request is considered large.
pub const LARGE_CHANGE_THRESHOLD: u64 = 500;

fact_keys! {
    /// Keys emitted by [`PullRequest`].
    pub enum PullRequestKey in "PULL_REQUEST" {
        Id => "PULL_REQUEST_ID", "Node or database identifier of the pull request, empty when unknown";
        Number => "PULL_REQUEST_NUMBER", "Pull request number within its repository";
        Title => "PULL_REQUEST_TITLE", "Pull request title";
        Body => "PULL_REQUEST_BODY", "Pull request description";
        State => "PULL_REQUEST_STATE", "Pull request state: open, closed or merged";
        IsDraft => "PULL_REQUEST_IS_DRAFT", "Whether the pull request is a draft";
        Author => "PULL_REQUEST_AUTHOR", "Login of the pull request author";
        Assignees => "PULL_REQUEST_ASSIGNEES", "Comma-separated assignee logins";
        Labels => "PULL_REQUEST_LABELS", "Comma-separated label names";
        Reviewers => "PULL_REQUEST_REVIEWERS", "Comma-separated requested reviewer logins";
        Milestone => "PULL_REQUEST_MILESTONE", "Milestone title, empty when none";
        HeadRef => "PULL_REQUEST_HEAD_REF", "Name of the source branch";
        BaseRef => "PULL_REQUEST_BASE_REF", "Name of the target branch";
        Additions => "PULL_REQUEST_ADDITIONS", "Lines added";
        Deletions => "PULL_REQUEST_DELETIONS", "Lines deleted";
        ChangedFiles => "PULL_REQUEST_CHANGED_FILES", "Number of files changed";
        CommitsCount => "PULL_REQUEST_COMMITS_COUNT", "Number of commits";
        CommentsCount => "PULL_REQUEST_COMMENTS_COUNT", "Number of comments";
        Url => "PULL_REQUEST_URL", "Web URL of the pull request";
        Repository => "PULL_REQUEST_REPOSITORY", "owner/name of the target repository";
        CreatedAt => "PULL_REQUEST_CREATED_AT", "Creation timestamp";
        UpdatedAt => "PULL_REQUEST_UPDATED_AT", "Last update timestamp";
        ClosedAt => "PULL_REQUEST_CLOSED_AT", "Close timestamp, empty while open";
        MergedAt => "PULL_REQUEST_MERGED_AT", "Merge timestamp, empty unless merged";
        MergedBy => "PULL_REQUEST_MERGED_BY", "Login of the merging user, empty unless merged";
        NetChanges => "PULL_REQUEST_NET_CHANGES", "Additions minus deletions";
        TotalChanges => "PULL_REQUEST_TOTAL_CHANGES", "Additions plus deletions";
        AgeDays => "PULL_REQUEST_AGE_DAYS", "Days since the pull request was opened";
        DaysSinceUpdate => "PULL_REQUEST_DAYS_SINCE_UPDATE", "Days since the last update";
        DaysToMerge => "PULL_REQUEST_DAYS_TO_MERGE", "Days from opening to merging, empty unless merged";
        IsLarge => "PULL_REQUEST_IS_LARGE", "At least 500 changed lines";
        HasRecentActivity => "PULL_REQUEST_HAS_RECENT_ACTIVITY", "Updated within the last 7 days";
        IsStale => "PULL_REQUEST_IS_STALE", "Open and not updated for more than 30 days";
    }
}

/// A pull request of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub(crate) id: String,
    pub(crate) number: u64,
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) state: PullRequestState,
    pub(crate) is_draft: bool,
    pub(crate) author: String,
    pub(crate) assignees: Vec<String>,
    pub(crate) labels: Vec<String>,
    pub(crate) reviewers: Vec<String>,
    pub(crate) milestone: Option<String>,
    pub(crate) head_ref: String,
    pub(crate) base_ref: String,
    pub(crate) additions: u64,
    pub(crate) deletions: u64,
    pub(crate) changed_files: u64,
    pub(crate) commits_count: u64,
    pub(crate) comments_count: u64,
    pub(crate) url: String,
    pub(crate) repository: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) closed_at: Option<DateTime<Utc>>,
    pub(crate) merged_at: Option<DateTime<Utc>>,
    pub(crate) merged_by: Option<String>,
}

impl PullRequest {
    #[must_use]
    pub const fn number(&self) -> u64 {
        self.number
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub const fn state(&self) -> PullRequestState {
        self.state
    }

    #[must_use]
    pub const fn is_draft(&self) -> bool {
        self.is_draft
    }

    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    #[must_use]
    pub fn reviewers(&self) -> &[String] {
        &self.reviewers
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn head_ref(&self) -> &str {
        &self.head_ref
    }

    #[must_use]
    pub fn base_ref(&self) -> &str {
        &self.base_ref
    }

    #[must_use]
    pub const fn additions(&self) -> u64 {
        self.additions
    }

    #[must_use]
    pub const fn deletions(&self) -> u64 {
        self.deletions
    }

    #[must_use]
    pub const fn changed_files(&self) -> u64 {
        self.changed_files
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
    pub const fn merged_at(&self) -> Option<DateTime<Utc>> {
        self.merged_at
    }

    #[must_use]
    pub fn merged_by(&self) -> Option<&str> {
        self.merged_by.as_deref()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == PullRequestState::Open
    }

    #[must_use]
    pub fn is_merged(&self) -> bool {
        self.state == PullRequestState::Merged
    }

    /// Additions minus deletions; negative when the change shrinks the code.
    #[must_use]
    #[expect(clippy::cast_possible_wrap, reason = "line counts are far below i64::MAX")]
    pub const fn net_changes(&self) -> i64 {
        self.additions as i64 - self.deletions as i64
    }

    #[must_use]
    pub const fn total_changes(&self) -> u64 {
        self.additions.saturating_add(self.deletions)
    }

    #[must_use]
    pub const fn is_large(&self, threshold: u64) -> bool {
        self.total_changes() >= threshold
    }

    #[must_use]
    pub fn age_in_days(&self, now: DateTime<Utc>) -> u64 {
        age_in_days(now, self.created_at)
    }

    #[must_use]
    pub fn days_since_update(&self, now: DateTime<Utc>) -> u64 {
        days_since(now, self.updated_at)
    }

    #[must_use]
    pub fn days_to_merge(&self) -> Option<u64> {
        self.merged_at.map(|merged_at| days_since(merged_at, self.created_at))
    }

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

impl ToFactPairs for PullRequest {
    fn to_fact_pairs(&self, now: DateTime<Utc>) -> FactPairs {
        let mut pairs = FactPairs::new();

        pairs.push(PullRequestKey::Id, &self.id);
        pairs.push(PullRequestKey::Number, self.number);
        pairs.push(PullRequestKey::Title, &self.title);
        pairs.push(PullRequestKey::Body, &self.body);
        pairs.push(PullRequestKey::State, self.state);
        pairs.push(PullRequestKey::IsDraft, self.is_draft);
        pairs.push(PullRequestKey::Author, &self.author);
        pairs.push(PullRequestKey::Assignees, &self.assignees);
        pairs.push(PullRequestKey::Labels, &self.labels);
        pairs.push(PullRequestKey::Reviewers, &self.reviewers);
        pairs.push(PullRequestKey::Milestone, &self.milestone);
        pairs.push(PullRequestKey::HeadRef, &self.head_ref);
        pairs.push(PullRequestKey::BaseRef, &self.base_ref);
        pairs.push(PullRequestKey::Additions, self.additions);
        pairs.push(PullRequestKey::Deletions, self.deletions);
        pairs.push(PullRequestKey::ChangedFiles, self.changed_files);
        pairs.push(PullRequestKey::CommitsCount, self.commits_count);
        pairs.push(PullRequestKey::CommentsCount, self.comments_count);
        pairs.push(PullRequestKey::Url, &self.url);
        pairs.push(PullRequestKey::Repository, &self.repository);
        pairs.push(PullRequestKey::CreatedAt, self.created_at);
        pairs.push(PullRequestKey::UpdatedAt, self.updated_at);
        pairs.push(PullRequestKey::ClosedAt, self.closed_at);
        pairs.push(PullRequestKey::MergedAt, self.merged_at);
        pairs.push(PullRequestKey::MergedBy, &self.merged_by);

        pairs.push(PullRequestKey::NetChanges, self.net_changes());
        pairs.push(PullRequestKey::TotalChanges, self.total_changes());
        pairs.push(PullRequestKey::AgeDays, self.age_in_days(now));
        pairs.push(PullRequestKey::DaysSinceUpdate, self.days_since_update(now));
        pairs.push(PullRequestKey::DaysToMerge, self.days_to_merge());
        pairs.push(PullRequestKey::IsLarge, self.is_large(LARGE_CHANGE_THRESHOLD));
        pairs.push(PullRequestKey::HasRecentActivity, self.has_recent_activity(now, RECENT_ACTIVITY_DAYS));
        pairs.push(PullRequestKey::IsStale, self.is_stale(now, STALE_AFTER_DAYS));

        pairs
    }
}
