use super::fields::{Fields, Shape, string_list, unwrap_graphql};
use super::issue::{relationships, temporal};
use super::{FromSource, NormalizeError, SourceContext, SourceKind};
use crate::facts::{EntityKind, PullRequest, PullRequestState};
use serde_json::Value;

const TOOL_REQUIRED: &[(&str, Shape)] = &[
    ("number", Shape::Integer),
    ("title", Shape::Text),
    ("createdAt|created_at", Shape::Timestamp),
];
const REST_REQUIRED: &[(&str, Shape)] = &[
    ("number", Shape::Integer),
    ("title", Shape::Text),
    ("created_at", Shape::Timestamp),
];
const GRAPHQL_REQUIRED: &[(&str, Shape)] = &[
    ("number", Shape::Integer),
    ("title", Shape::Text),
    ("createdAt", Shape::Timestamp),
];
const GRAPHQL_NODE_PATHS: &[&str] = &["repository.pullRequest", "node", "pullRequest"];

impl FromSource for PullRequest {
    const KIND: EntityKind = EntityKind::PullRequest;

    fn from_tool_output(payload: &Value, context: &SourceContext) -> Result<Self, NormalizeError> {
        let fields = Fields::object(payload, Self::KIND, SourceKind::ToolOutput)?;
        fields.require(TOOL_REQUIRED)?;
        build(&fields, context)
    }

    fn from_rest_response(payload: &Value, context: &SourceContext) -> Result<Self, NormalizeError> {
        let fields = Fields::object(payload, Self::KIND, SourceKind::Rest)?;
        fields.require(REST_REQUIRED)?;
        build(&fields, context)
    }

    fn from_graphql_response(payload: &Value, context: &SourceContext) -> Result<Self, NormalizeError> {
        let fields = unwrap_graphql(payload, GRAPHQL_NODE_PATHS, Self::KIND)?;
        fields.require(GRAPHQL_REQUIRED)?;
        build(&fields, context)
    }
}

fn build(fields: &Fields<'_>, context: &SourceContext) -> Result<PullRequest, NormalizeError> {
    let relationships = relationships(fields, context);
    let temporal = temporal(fields)?;
    let merged_at = fields.timestamp(&["merged_at", "mergedAt"])?;

    let state = PullRequestState::normalize(
        fields.str(&["state"]),
        fields.bool(&["merged"]),
        merged_at.is_some(),
        temporal.closed_at.is_some(),
    );

    Ok(PullRequest {
        id: fields.id(&["node_id", "id"]).unwrap_or_default(),
        number: fields.u64(&["number"]).unwrap_or(0),
        title: fields.string(&["title"]),
        body: fields.string(&["body"]),
        state,
        is_draft: fields.bool(&["draft", "isDraft"]).unwrap_or(false),
        author: relationships.author,
        assignees: relationships.assignees,
        labels: relationships.labels,
        reviewers: reviewers(fields),
        milestone: relationships.milestone,
        head_ref: fields.string(&["head.ref", "headRefName"]),
        base_ref: fields.string(&["base.ref", "baseRefName"]),
        additions: fields.u64(&["additions"]).unwrap_or(0),
        deletions: fields.u64(&["deletions"]).unwrap_or(0),
        changed_files: fields.u64(&["changed_files", "changedFiles"]).unwrap_or(0),
        commits_count: fields.count(&["commits"]).unwrap_or(0),
        comments_count: fields.count(&["comments"]).unwrap_or(0),
        url: fields.string(&["html_url", "url"]),
        repository: relationships.repository,
        created_at: temporal.created_at,
        updated_at: temporal.updated_at,
        closed_at: temporal.closed_at,
        merged_at,
        merged_by: fields.opt_string(&["merged_by.login", "mergedBy.login"]),
    })
}

/// Requested reviewers: REST lists users directly, the tool and GraphQL wrap each request
/// in a `requestedReviewer` node, and team reviewers carry a `name`/`slug` instead of a login.
fn reviewers(fields: &Fields<'_>) -> Vec<String> {
    let requests: Vec<&Value> = fields
        .items(&["requested_reviewers", "reviewRequests"])
        .into_iter()
        .map(|request| request.get("requestedReviewer").unwrap_or(request))
        .collect();
    string_list(&requests, &["login", "slug", "name"])
}
