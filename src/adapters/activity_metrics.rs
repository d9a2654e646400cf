use super::fields::{Fields, unwrap_graphql};
use super::{FromSource, NormalizeError, SourceContext, SourceKind};
use crate::facts::{ActivityMetrics, DEFAULT_PERIOD_DAYS, EntityKind};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

const GRAPHQL_NODE_PATHS: &[&str] = &["repository", "node"];

const REPOSITORY_PATHS: &[&str] = &["repository.nameWithOwner", "repository.full_name", "nameWithOwner", "full_name", "repository"];
const LAST_ACTIVITY_PATHS: &[&str] = &["last_activity_at", "lastActivityAt", "pushed_at", "pushedAt"];
const ITEM_ACTIVITY_PATHS: &[&str] = &[
    "commit.author.date",
    "commit.committer.date",
    "authoredDate",
    "committedDate",
    "merged_at",
    "mergedAt",
    "pull_request.merged_at",
    "closed_at",
    "closedAt",
    "updated_at",
    "updatedAt",
    "created_at",
    "createdAt",
];

const COMMIT_LIST_PATHS: &[&str] = &["commits", "defaultBranchRef.target.history"];
const ISSUE_LIST_PATHS: &[&str] = &["issues"];
const PULL_REQUEST_LIST_PATHS: &[&str] = &["pull_requests", "pullRequests", "prs"];
const CONTRIBUTOR_LIST_PATHS: &[&str] = &["contributors"];

impl FromSource for ActivityMetrics {
    const KIND: EntityKind = EntityKind::ActivityMetrics;

    fn from_tool_output(payload: &Value, context: &SourceContext) -> Result<Self, NormalizeError> {
        build(&Fields::object(payload, Self::KIND, SourceKind::ToolOutput)?, context)
    }

    fn from_rest_response(payload: &Value, context: &SourceContext) -> Result<Self, NormalizeError> {
        build(&Fields::object(payload, Self::KIND, SourceKind::Rest)?, context)
    }

    fn from_graphql_response(payload: &Value, context: &SourceContext) -> Result<Self, NormalizeError> {
        build(&unwrap_graphql(payload, GRAPHQL_NODE_PATHS, Self::KIND)?, context)
    }
}

/// The raw activity lists a payload may carry in place of (or next to) precomputed counts.
struct Lists<'a> {
    commits: Vec<&'a Value>,
    issues: Vec<&'a Value>,
    pull_requests: Vec<&'a Value>,
    contributors: Vec<&'a Value>,
}

impl<'a> Lists<'a> {
    /// The REST issues endpoint also lists pull requests, marked by a `pull_request` member.
    fn collect(fields: &Fields<'a>) -> Self {
        let (pull_requests_in_issues, issues): (Vec<&Value>, Vec<&Value>) = fields
            .items(ISSUE_LIST_PATHS)
            .into_iter()
            .partition(|item| item.get("pull_request").is_some_and(|marker| !marker.is_null()));

        let mut pull_requests = fields.items(PULL_REQUEST_LIST_PATHS);
        pull_requests.extend(pull_requests_in_issues);

        Self {
            commits: fields.items(COMMIT_LIST_PATHS),
            issues,
            pull_requests,
            contributors: fields.items(CONTRIBUTOR_LIST_PATHS),
        }
    }
}

fn build(fields: &Fields<'_>, context: &SourceContext) -> Result<ActivityMetrics, NormalizeError> {
    let repository = fields
        .opt_string(REPOSITORY_PATHS)
        .or_else(|| context.repository().map(str::to_string))
        .ok_or_else(|| fields.missing(vec!["repository".to_string()]))?;

    let period_days = match fields.u64(&["period_days", "periodDays"]) {
        Some(days) => u32::try_from(days).map_err(|_| fields.invalid("period_days", "is out of range"))?,
        None => context.period_days().unwrap_or(DEFAULT_PERIOD_DAYS),
    };

    let lists = Lists::collect(fields);
    let contributor_commits = contributor_commits(&lists);

    Ok(ActivityMetrics {
        repository,
        period_days,
        commits: fields
            .u64(&["commits_count", "commitsCount", "commit_count", "commits.totalCount", "defaultBranchRef.target.history.totalCount", "commits"])
            .unwrap_or(lists.commits.len() as u64),
        issues_opened: fields
            .u64(&["issues_opened", "issuesOpened", "issues.totalCount"])
            .unwrap_or(lists.issues.len() as u64),
        issues_closed: fields
            .u64(&["issues_closed", "issuesClosed", "closedIssues.totalCount"])
            .unwrap_or_else(|| count_where(&lists.issues, is_closed)),
        prs_opened: fields
            .u64(&["prs_opened", "prsOpened", "pullRequests.totalCount", "pull_requests.totalCount"])
            .unwrap_or(lists.pull_requests.len() as u64),
        prs_merged: fields
            .u64(&["prs_merged", "prsMerged", "mergedPullRequests.totalCount"])
            .unwrap_or_else(|| count_where(&lists.pull_requests, is_merged)),
        prs_closed: fields
            .u64(&["prs_closed", "prsClosed", "closedPullRequests.totalCount"])
            .unwrap_or_else(|| count_where(&lists.pull_requests, |item| is_closed(item) && !is_merged(item))),
        contributors: fields
            .u64(&["contributors_count", "contributorsCount", "contributors.totalCount", "contributors"])
            .unwrap_or_else(|| listed_or_grouped(lists.contributors.len(), contributor_commits.len())),
        last_activity_at: last_activity_at(fields, &lists)?,
        contributor_commits,
    })
}

/// A contributor list counts its entries even when they carry no per-person totals.
const fn listed_or_grouped(listed: usize, grouped: usize) -> u64 {
    if listed > 0 { listed as u64 } else { grouped as u64 }
}

fn count_where(items: &[&Value], predicate: impl Fn(&Value) -> bool) -> u64 {
    items.iter().filter(|item| predicate(item)).count() as u64
}

fn member<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(item, |current, segment| current.get(segment))
        .filter(|value| !value.is_null())
}

fn is_merged(item: &Value) -> bool {
    member(item, "merged").and_then(Value::as_bool) == Some(true)
        || ["merged_at", "mergedAt", "pull_request.merged_at"].iter().any(|path| member(item, path).is_some())
        || member(item, "state").and_then(Value::as_str).is_some_and(|state| state.eq_ignore_ascii_case("merged"))
}

fn is_closed(item: &Value) -> bool {
    member(item, "closed").and_then(Value::as_bool) == Some(true)
        || ["closed_at", "closedAt"].iter().any(|path| member(item, path).is_some())
        || member(item, "state")
            .and_then(Value::as_str)
            .is_some_and(|state| state.eq_ignore_ascii_case("closed") || state.eq_ignore_ascii_case("merged"))
}

/// Per-contributor commit counts: from a contributor list carrying `contributions`, or by
/// grouping a commit list on its authors.
fn contributor_commits(lists: &Lists<'_>) -> Vec<u64> {
    let listed: Vec<u64> = lists
        .contributors
        .iter()
        .filter_map(|contributor| ["contributions", "commits", "total"].iter().find_map(|key| contributor.get(*key)?.as_u64()))
        .collect();

    if !listed.is_empty() {
        return listed;
    }

    let mut by_author: BTreeMap<String, u64> = BTreeMap::new();
    for author in lists.commits.iter().filter_map(|commit| commit_author(commit)) {
        *by_author.entry(author).or_insert(0) += 1;
    }

    by_author.into_values().collect()
}

fn commit_author(commit: &Value) -> Option<String> {
    [
        "author.login",
        "author.user.login",
        "commit.author.email",
        "author.email",
        "commit.author.name",
        "author.name",
    ]
    .iter()
    .find_map(|path| member(commit, path)?.as_str().filter(|author| !author.is_empty()))
    .or_else(|| member(commit, "authors")?.as_array()?.first()?.get("login")?.as_str())
    .map(str::to_string)
}

/// An explicit last-activity timestamp, or the latest timestamp found on any listed item.
fn last_activity_at(fields: &Fields<'_>, lists: &Lists<'_>) -> Result<Option<DateTime<Utc>>, NormalizeError> {
    if let Some(at) = fields.timestamp(LAST_ACTIVITY_PATHS)? {
        return Ok(Some(at));
    }

    let mut latest = None;
    for item in lists.commits.iter().chain(&lists.issues).chain(&lists.pull_requests) {
        let Ok(item) = Fields::object(item, fields.entity(), fields.format()) else {
            continue;
        };

        if let Some(at) = item.timestamp(ITEM_ACTIVITY_PATHS)? {
            latest = latest.max(Some(at));
        }
    }

    Ok(latest)
}
