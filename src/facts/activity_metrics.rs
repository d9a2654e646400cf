use super::time_math::{days_since, gini, percentage, ratio};
use super::{FactPairs, ToFactPairs};
use crate::keys::fact_keys;
use chrono::{DateTime, Utc};

/// Period length used when neither the payload nor the caller supplies one.
pub const DEFAULT_PERIOD_DAYS: u32 = 30;

/// Window used by [`ActivityMetrics::has_recent_activity`] when no other is requested.
pub const RECENT_ACTIVITY_DAYS: u64 = 30;

fact_keys! {
    /// Keys emitted by [`ActivityMetrics`].
    pub enum ActivityMetricsKey in "ACTIVITY" {
        Repository => "ACTIVITY_REPOSITORY", "owner/name of the measured repository";
        PeriodDays => "ACTIVITY_PERIOD_DAYS", "Length of the measured period in days";
        Commits => "ACTIVITY_COMMITS", "Commits made during the period";
        IssuesOpened => "ACTIVITY_ISSUES_OPENED", "Issues opened during the period";
        IssuesClosed => "ACTIVITY_ISSUES_CLOSED", "Issues closed during the period";
        PrsOpened => "ACTIVITY_PRS_OPENED", "Pull requests opened during the period";
        PrsMerged => "ACTIVITY_PRS_MERGED", "Pull requests merged during the period";
        PrsClosed => "ACTIVITY_PRS_CLOSED", "Pull requests closed without merging during the period";
        Contributors => "ACTIVITY_CONTRIBUTORS", "Distinct commit authors during the period";
        LastActivityAt => "ACTIVITY_LAST_ACTIVITY_AT", "Most recent observed activity, empty when unknown";
        CommitsPerDay => "ACTIVITY_COMMITS_PER_DAY", "Average commits per day, two decimals";
        IssuesPerDay => "ACTIVITY_ISSUES_PER_DAY", "Average issues opened per day, two decimals";
        PrsPerDay => "ACTIVITY_PRS_PER_DAY", "Average pull requests opened per day, two decimals";
        IssueCloseRatio => "ACTIVITY_ISSUE_CLOSE_RATIO", "Closed issues as a whole percentage of opened issues";
        PrMergeRatio => "ACTIVITY_PR_MERGE_RATIO", "Merged pull requests as a whole percentage of opened pull requests";
        CommitToIssueRatio => "ACTIVITY_COMMIT_TO_ISSUE_RATIO", "Commits per opened issue, two decimals";
        ActivityDensity => "ACTIVITY_DENSITY", "Commits, issues and pull requests per day, two decimals";
        ContributorEngagementRatio => "ACTIVITY_CONTRIBUTOR_ENGAGEMENT_RATIO", "Commits per contributor, two decimals";
        ContributionGini => "ACTIVITY_CONTRIBUTION_GINI", "Gini coefficient of commits across contributors, two decimals";
        HasRecentActivity => "ACTIVITY_HAS_RECENT_ACTIVITY", "Activity observed within the last 30 days";
        IsActivelyMaintained => "ACTIVITY_IS_ACTIVELY_MAINTAINED", "Recent activity with at least one commit and one contributor";
    }
}

/// Activity statistics of one repository over a period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityMetrics {
    pub(crate) repository: String,
    pub(crate) period_days: u32,
    pub(crate) commits: u64,
    pub(crate) issues_opened: u64,
    pub(crate) issues_closed: u64,
    pub(crate) prs_opened: u64,
    pub(crate) prs_merged: u64,
    pub(crate) prs_closed: u64,
    pub(crate) contributors: u64,
    pub(crate) contributor_commits: Vec<u64>,
    pub(crate) last_activity_at: Option<DateTime<Utc>>,
}

impl ActivityMetrics {
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    #[must_use]
    pub const fn period_days(&self) -> u32 {
        self.period_days
    }

    #[must_use]
    pub const fn commits(&self) -> u64 {
        self.commits
    }

    #[must_use]
    pub const fn issues_opened(&self) -> u64 {
        self.issues_opened
    }

    #[must_use]
    pub const fn issues_closed(&self) -> u64 {
        self.issues_closed
    }

    #[must_use]
    pub const fn prs_opened(&self) -> u64 {
        self.prs_opened
    }

    #[must_use]
    pub const fn prs_merged(&self) -> u64 {
        self.prs_merged
    }

    #[must_use]
    pub const fn prs_closed(&self) -> u64 {
        self.prs_closed
    }

    #[must_use]
    pub const fn contributors(&self) -> u64 {
        self.contributors
    }

    /// Commit counts of each contributor, when the source listed them.
    #[must_use]
    pub fn contributor_commits(&self) -> &[u64] {
        &self.contributor_commits
    }

    #[must_use]
    pub const fn last_activity_at(&self) -> Option<DateTime<Utc>> {
        self.last_activity_at
    }

    #[must_use]
    pub fn commits_per_day(&self) -> f64 {
        ratio(self.commits, u64::from(self.period_days))
    }

    #[must_use]
    pub fn issues_per_day(&self) -> f64 {
        ratio(self.issues_opened, u64::from(self.period_days))
    }

    #[must_use]
    pub fn prs_per_day(&self) -> f64 {
        ratio(self.prs_opened, u64::from(self.period_days))
    }

    #[must_use]
    pub fn issue_close_ratio(&self) -> f64 {
        percentage(self.issues_closed, self.issues_opened)
    }

    #[must_use]
    pub fn pr_merge_ratio(&self) -> f64 {
        percentage(self.prs_merged, self.prs_opened)
    }

    #[must_use]
    pub fn commit_to_issue_ratio(&self) -> f64 {
        ratio(self.commits, self.issues_opened)
    }

    /// Combined commits, opened issues and opened pull requests per day.
    #[must_use]
    pub fn activity_density(&self) -> f64 {
        let events = self.commits.saturating_add(self.issues_opened).saturating_add(self.prs_opened);
        ratio(events, u64::from(self.period_days))
    }

    #[must_use]
    pub fn contributor_engagement_ratio(&self) -> f64 {
        ratio(self.commits, self.contributors)
    }

    #[must_use]
    pub fn contribution_gini(&self) -> f64 {
        gini(&self.contributor_commits)
    }

    /// Whether the last observed activity falls within the last `days` days.
    #[must_use]
    pub fn has_recent_activity(&self, now: DateTime<Utc>, days: u64) -> bool {
        self.last_activity_at.is_some_and(|at| days_since(now, at) <= days)
    }

    #[must_use]
    pub fn is_actively_maintained(&self, now: DateTime<Utc>) -> bool {
        self.has_recent_activity(now, RECENT_ACTIVITY_DAYS) && self.commits > 0 && self.contributors > 0
    }
}

impl ToFactPairs for ActivityMetrics {
    fn to_fact_pairs(&self, now: DateTime<Utc>) -> FactPairs {
        let mut pairs = FactPairs::new();

        pairs.push(ActivityMetricsKey::Repository, &self.repository);
        pairs.push(ActivityMetricsKey::PeriodDays, self.period_days);
        pairs.push(ActivityMetricsKey::Commits, self.commits);
        pairs.push(ActivityMetricsKey::IssuesOpened, self.issues_opened);
        pairs.push(ActivityMetricsKey::IssuesClosed, self.issues_closed);
        pairs.push(ActivityMetricsKey::PrsOpened, self.prs_opened);
        pairs.push(ActivityMetricsKey::PrsMerged, self.prs_merged);
        pairs.push(ActivityMetricsKey::PrsClosed, self.prs_closed);
        pairs.push(ActivityMetricsKey::Contributors, self.contributors);
        pairs.push(ActivityMetricsKey::LastActivityAt, self.last_activity_at);

        pairs.push(ActivityMetricsKey::CommitsPerDay, self.commits_per_day());
        pairs.push(ActivityMetricsKey::IssuesPerDay, self.issues_per_day());
        pairs.push(ActivityMetricsKey::PrsPerDay, self.prs_per_day());
        pairs.push(ActivityMetricsKey::IssueCloseRatio, self.issue_close_ratio());
        pairs.push(ActivityMetricsKey::PrMergeRatio, self.pr_merge_ratio());
        pairs.push(ActivityMetricsKey::CommitToIssueRatio, self.commit_to_issue_ratio());
        pairs.push(ActivityMetricsKey::ActivityDensity, self.activity_density());
        pairs.push(ActivityMetricsKey::ContributorEngagementRatio, self.contributor_engagement_ratio());
        pairs.push(ActivityMetricsKey::ContributionGini, self.contribution_gini());
        pairs.push(ActivityMetricsKey::HasRecentActivity, self.has_recent_activity(now, RECENT_ACTIVITY_DAYS));
        pairs.push(ActivityMetricsKey::IsActivelyMaintained, self.is_actively_maintained(now));

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::FactKey;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn sample() -> ActivityMetrics {
        ActivityMetrics {
            repository: "o/r".to_string(),
            period_days: 30,
            commits: 60,
            issues_opened: 12,
            issues_closed: 9,
            prs_opened: 10,
            prs_merged: 7,
            prs_closed: 1,
            contributors: 4,
            contributor_commits: vec![30, 15, 10, 5],
            last_activity_at: Some(at(2024, 6, 1)),
        }
    }

    #[test]
    fn test_per_day_averages() {
        let metrics = sample();
        assert!((metrics.commits_per_day() - 2.0).abs() < f64::EPSILON);
        assert!((metrics.issues_per_day() - 0.4).abs() < f64::EPSILON);
        assert!((metrics.prs_per_day() - 0.33).abs() < f64::EPSILON);
        assert!((metrics.activity_density() - 2.73).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ratios() {
        let metrics = sample();
        assert!((metrics.issue_close_ratio() - 75.0).abs() < f64::EPSILON);
        assert!((metrics.pr_merge_ratio() - 70.0).abs() < f64::EPSILON);
        assert!((metrics.commit_to_issue_ratio() - 5.0).abs() < f64::EPSILON);
        assert!((metrics.contributor_engagement_ratio() - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_contribution_gini() {
        // 2 * (5 + 20 + 45 + 120) / (4 * 60) - 5 / 4 = 0.3333
        assert!((sample().contribution_gini() - 0.33).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_period_and_zero_commits() {
        let metrics = ActivityMetrics {
            repository: "o/r".to_string(),
            period_days: 0,
            commits: 0,
            issues_opened: 0,
            issues_closed: 0,
            prs_opened: 0,
            prs_merged: 0,
            prs_closed: 0,
            contributors: 0,
            contributor_commits: Vec::new(),
            last_activity_at: None,
        };

        let pairs = metrics.to_fact_pairs(at(2024, 6, 1));
        assert_eq!(pairs.get("ACTIVITY_COMMITS_PER_DAY"), Some("0"));
        assert_eq!(pairs.get("ACTIVITY_ISSUES_PER_DAY"), Some("0"));
        assert_eq!(pairs.get("ACTIVITY_PRS_PER_DAY"), Some("0"));
        assert_eq!(pairs.get("ACTIVITY_DENSITY"), Some("0"));
        assert_eq!(pairs.get("ACTIVITY_ISSUE_CLOSE_RATIO"), Some("0"));
        assert_eq!(pairs.get("ACTIVITY_CONTRIBUTION_GINI"), Some("0"));
        assert_eq!(pairs.get("ACTIVITY_IS_ACTIVELY_MAINTAINED"), Some("false"));
    }

    #[test]
    fn test_actively_maintained() {
        let mut metrics = sample();
        assert!(metrics.is_actively_maintained(at(2024, 6, 15)));
        assert!(!metrics.is_actively_maintained(at(2024, 9, 1)));

        metrics.contributors = 0;
        assert!(!metrics.is_actively_maintained(at(2024, 6, 15)));
    }

    #[test]
    fn test_fact_pairs_emit_every_key_in_order() {
        let pairs = sample().to_fact_pairs(at(2024, 6, 2));
        let keys: Vec<_> = pairs.keys().collect();
        let declared: Vec<_> = ActivityMetricsKey::all().iter().map(|key| key.name()).collect();
        assert_eq!(keys, declared);
        assert_eq!(pairs.get("ACTIVITY_PR_MERGE_RATIO"), Some("70"));
    }
}
