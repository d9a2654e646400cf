use super::time_math::{age_in_days, days_since, ratio};
use super::{FactPairs, OwnerKind, ToFactPairs, Visibility};
use crate::keys::fact_keys;
use chrono::{DateTime, Utc};

/// Days without an update after which a repository is considered stale.
pub const STALE_AFTER_DAYS: u64 = 30;

/// Window used by [`Repository::has_recent_activity`] when no other is requested.
pub const RECENT_ACTIVITY_DAYS: u64 = 30;

/// Window within which a push or update counts as active maintenance.
pub const MAINTENANCE_WINDOW_DAYS: u64 = 90;

const ENGAGEMENT_MIN_STARS: u64 = 100;
const ENGAGEMENT_MIN_FORKS: u64 = 20;
const ENGAGEMENT_MIN_WATCHERS: u64 = 10;

fact_keys! {
    /// Keys emitted by [`Repository`].
    pub enum RepositoryKey in "REPOSITORY" {
        Id => "REPOSITORY_ID", "Identifier of the repository on the hosting site";
        Name => "REPOSITORY_NAME", "Short name of the repository";
        FullName => "REPOSITORY_FULL_NAME", "owner/name of the repository, unknown/unknown when undeterminable";
        Owner => "REPOSITORY_OWNER", "Login of the repository owner";
        OwnerType => "REPOSITORY_OWNER_TYPE", "Owner account kind: Organization or User";
        Description => "REPOSITORY_DESCRIPTION", "Free-form description of the repository";
        Homepage => "REPOSITORY_HOMEPAGE", "Homepage URL declared by the repository";
        DefaultBranch => "REPOSITORY_DEFAULT_BRANCH", "Name of the default branch";
        Language => "REPOSITORY_LANGUAGE", "Primary language, empty when unknown";
        Topics => "REPOSITORY_TOPICS", "Comma-separated repository topics";
        Visibility => "REPOSITORY_VISIBILITY", "Repository visibility: public or private";
        IsFork => "REPOSITORY_IS_FORK", "Whether the repository is a fork";
        IsArchived => "REPOSITORY_IS_ARCHIVED", "Whether the repository is archived";
        StargazersCount => "REPOSITORY_STARGAZERS_COUNT", "Number of stars";
        ForksCount => "REPOSITORY_FORKS_COUNT", "Number of forks";
        WatchersCount => "REPOSITORY_WATCHERS_COUNT", "Number of watchers";
        OpenIssuesCount => "REPOSITORY_OPEN_ISSUES_COUNT", "Number of open issues";
        SizeKb => "REPOSITORY_SIZE_KB", "Repository size in kilobytes";
        License => "REPOSITORY_LICENSE", "SPDX identifier or name of the license, empty when unknown";
        CreatedAt => "REPOSITORY_CREATED_AT", "Creation timestamp";
        UpdatedAt => "REPOSITORY_UPDATED_AT", "Last update timestamp";
        PushedAt => "REPOSITORY_PUSHED_AT", "Last push timestamp, empty when unknown";
        Url => "REPOSITORY_URL", "Web URL of the repository";
        AgeDays => "REPOSITORY_AGE_DAYS", "Days since the repository was created";
        DaysSinceUpdate => "REPOSITORY_DAYS_SINCE_UPDATE", "Days since the last update";
        DaysSincePush => "REPOSITORY_DAYS_SINCE_PUSH", "Days since the last push, empty when unknown";
        HasRecentActivity => "REPOSITORY_HAS_RECENT_ACTIVITY", "Updated within the last 30 days";
        IsStale => "REPOSITORY_IS_STALE", "Not updated for more than 30 days";
        HasSignificantEngagement => "REPOSITORY_HAS_SIGNIFICANT_ENGAGEMENT", "Star, fork or watcher count above the engagement thresholds";
        IsActivelyMaintained => "REPOSITORY_IS_ACTIVELY_MAINTAINED", "Not archived and pushed or updated within the last 90 days";
        ForkToStarRatio => "REPOSITORY_FORK_TO_STAR_RATIO", "Forks per star, two decimals";
    }
}

/// A repository on the hosting site.
#[derive(Debug, Clone, PartialEq)]
pub struct Repository {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) full_name: String,
    pub(crate) owner: String,
    pub(crate) owner_type: OwnerKind,
    pub(crate) description: String,
    pub(crate) homepage: String,
    pub(crate) default_branch: String,
    pub(crate) language: Option<String>,
    pub(crate) topics: Vec<String>,
    pub(crate) visibility: Visibility,
    pub(crate) is_fork: bool,
    pub(crate) is_archived: bool,
    pub(crate) stargazers_count: u64,
    pub(crate) forks_count: u64,
    pub(crate) watchers_count: u64,
    pub(crate) open_issues_count: u64,
    pub(crate) size_kb: u64,
    pub(crate) license: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) pushed_at: Option<DateTime<Utc>>,
    pub(crate) url: String,
}

impl Repository {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub const fn owner_type(&self) -> OwnerKind {
        self.owner_type
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    #[must_use]
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[must_use]
    pub const fn is_fork(&self) -> bool {
        self.is_fork
    }

    #[must_use]
    pub const fn is_archived(&self) -> bool {
        self.is_archived
    }

    #[must_use]
    pub const fn stargazers_count(&self) -> u64 {
        self.stargazers_count
    }

    #[must_use]
    pub const fn forks_count(&self) -> u64 {
        self.forks_count
    }

    #[must_use]
    pub const fn watchers_count(&self) -> u64 {
        self.watchers_count
    }

    #[must_use]
    pub const fn open_issues_count(&self) -> u64 {
        self.open_issues_count
    }

    #[must_use]
    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
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
    pub const fn pushed_at(&self) -> Option<DateTime<Utc>> {
        self.pushed_at
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
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
    pub fn days_since_push(&self, now: DateTime<Utc>) -> Option<u64> {
        self.pushed_at.map(|pushed_at| days_since(now, pushed_at))
    }

    /// Whether the repository was updated within the last `days` days.
    #[must_use]
    pub fn has_recent_activity(&self, now: DateTime<Utc>, days: u64) -> bool {
        self.days_since_update(now) <= days
    }

    /// Whether the repository has gone more than `days` days without an update.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>, days: u64) -> bool {
        self.days_since_update(now) > days
    }

    #[must_use]
    pub const fn has_significant_engagement(&self) -> bool {
        self.stargazers_count >= ENGAGEMENT_MIN_STARS
            || self.forks_count >= ENGAGEMENT_MIN_FORKS
            || self.watchers_count >= ENGAGEMENT_MIN_WATCHERS
    }

    /// Not archived, and the most recent push or update falls within the maintenance window.
    #[must_use]
    pub fn is_actively_maintained(&self, now: DateTime<Utc>) -> bool {
        if self.is_archived {
            return false;
        }

        let last_touch = self.pushed_at.map_or(self.updated_at, |pushed_at| pushed_at.max(self.updated_at));
        days_since(now, last_touch) <= MAINTENANCE_WINDOW_DAYS
    }

    #[must_use]
    pub fn fork_to_star_ratio(&self) -> f64 {
        ratio(self.forks_count, self.stargazers_count)
    }
}

impl ToFactPairs for Repository {
    fn to_fact_pairs(&self, now: DateTime<Utc>) -> FactPairs {
        let mut pairs = FactPairs::new();

        pairs.push(RepositoryKey::Id, &self.id);
        pairs.push(RepositoryKey::Name, &self.name);
        pairs.push(RepositoryKey::FullName, &self.full_name);
        pairs.push(RepositoryKey::Owner, &self.owner);
        pairs.push(RepositoryKey::OwnerType, self.owner_type);
        pairs.push(RepositoryKey::Description, &self.description);
        pairs.push(RepositoryKey::Homepage, &self.homepage);
        pairs.push(RepositoryKey::DefaultBranch, &self.default_branch);
        pairs.push(RepositoryKey::Language, &self.language);
        pairs.push(RepositoryKey::Topics, &self.topics);
        pairs.push(RepositoryKey::Visibility, self.visibility);
        pairs.push(RepositoryKey::IsFork, self.is_fork);
        pairs.push(RepositoryKey::IsArchived, self.is_archived);
        pairs.push(RepositoryKey::StargazersCount, self.stargazers_count);
        pairs.push(RepositoryKey::ForksCount, self.forks_count);
        pairs.push(RepositoryKey::WatchersCount, self.watchers_count);
        pairs.push(RepositoryKey::OpenIssuesCount, self.open_issues_count);
        pairs.push(RepositoryKey::SizeKb, self.size_kb);
        pairs.push(RepositoryKey::License, &self.license);
        pairs.push(RepositoryKey::CreatedAt, self.created_at);
        pairs.push(RepositoryKey::UpdatedAt, self.updated_at);
        pairs.push(RepositoryKey::PushedAt, self.pushed_at);
        pairs.push(RepositoryKey::Url, &self.url);

        pairs.push(RepositoryKey::AgeDays, self.age_in_days(now));
        pairs.push(RepositoryKey::DaysSinceUpdate, self.days_since_update(now));
        pairs.push(RepositoryKey::DaysSincePush, self.days_since_push(now));
        pairs.push(RepositoryKey::HasRecentActivity, self.has_recent_activity(now, RECENT_ACTIVITY_DAYS));
        pairs.push(RepositoryKey::IsStale, self.is_stale(now, STALE_AFTER_DAYS));
        pairs.push(RepositoryKey::HasSignificantEngagement, self.has_significant_engagement());
        pairs.push(RepositoryKey::IsActivelyMaintained, self.is_actively_maintained(now));
        pairs.push(RepositoryKey::ForkToStarRatio, self.fork_to_star_ratio());

        pairs
    }
}
