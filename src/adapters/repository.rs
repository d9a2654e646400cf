use super::fields::{Fields, Shape, resolve_full_name, string_list, unwrap_graphql};
use super::{FromSource, NormalizeError, SourceContext, SourceKind};
use crate::facts::{EntityKind, OwnerKind, Repository, Visibility};
use chrono::{DateTime, Utc};
use serde_json::Value;

const TOOL_REQUIRED: &[(&str, Shape)] = &[
    ("id", Shape::Id),
    ("name", Shape::Text),
    ("owner.login|owner", Shape::Text),
    ("createdAt|created_at", Shape::Timestamp),
];
const REST_REQUIRED: &[(&str, Shape)] = &[
    ("id", Shape::Id),
    ("name", Shape::Text),
    ("owner.login", Shape::Text),
    ("created_at", Shape::Timestamp),
];
const GRAPHQL_REQUIRED: &[(&str, Shape)] = &[
    ("id", Shape::Id),
    ("name", Shape::Text),
    ("owner.login", Shape::Text),
    ("createdAt", Shape::Timestamp),
];
const GRAPHQL_NODE_PATHS: &[&str] = &["repository", "node"];

impl FromSource for Repository {
    const KIND: EntityKind = EntityKind::Repository;

    fn from_tool_output(payload: &Value, _context: &SourceContext) -> Result<Self, NormalizeError> {
        let fields = Fields::object(payload, Self::KIND, SourceKind::ToolOutput)?;
        fields.require(TOOL_REQUIRED)?;
        build(&fields)
    }

    fn from_rest_response(payload: &Value, _context: &SourceContext) -> Result<Self, NormalizeError> {
        let fields = Fields::object(payload, Self::KIND, SourceKind::Rest)?;
        fields.require(REST_REQUIRED)?;
        build(&fields)
    }

    fn from_graphql_response(payload: &Value, _context: &SourceContext) -> Result<Self, NormalizeError> {
        let fields = unwrap_graphql(payload, GRAPHQL_NODE_PATHS, Self::KIND)?;
        fields.require(GRAPHQL_REQUIRED)?;
        build(&fields)
    }
}

struct Identity {
    id: String,
    name: String,
    full_name: String,
    owner: String,
    owner_type: OwnerKind,
    visibility: Visibility,
    url: String,
}

struct Temporal {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    pushed_at: Option<DateTime<Utc>>,
}

fn build(fields: &Fields<'_>) -> Result<Repository, NormalizeError> {
    let identity = identity(fields);
    let temporal = temporal(fields)?;

    Ok(Repository {
        id: identity.id,
        name: identity.name,
        full_name: identity.full_name,
        owner: identity.owner,
        owner_type: identity.owner_type,
        description: fields.string(&["description"]),
        homepage: fields.string(&["homepage", "homepageUrl"]),
        default_branch: fields.string(&["default_branch", "defaultBranchRef.name", "defaultBranch"]),
        language: fields.opt_string(&["language", "primaryLanguage.name", "primaryLanguage"]),
        topics: topics(fields),
        visibility: identity.visibility,
        is_fork: fields.bool(&["fork", "isFork"]).unwrap_or(false),
        is_archived: fields.bool(&["archived", "isArchived"]).unwrap_or(false),
        stargazers_count: fields.count(&["stargazers_count", "stargazerCount", "stargazers"]).unwrap_or(0),
        forks_count: fields.count(&["forks_count", "forkCount", "forks"]).unwrap_or(0),
        watchers_count: fields.count(&["subscribers_count", "watchers", "watchers_count"]).unwrap_or(0),
        open_issues_count: fields.count(&["open_issues_count", "openIssues", "issues"]).unwrap_or(0),
        size_kb: fields.u64(&["size", "diskUsage"]).unwrap_or(0),
        license: fields.opt_string(&[
            "license.spdx_id",
            "licenseInfo.spdxId",
            "license.name",
            "licenseInfo.name",
            "licenseInfo.key",
        ]),
        created_at: temporal.created_at,
        updated_at: temporal.updated_at,
        pushed_at: temporal.pushed_at,
        url: identity.url,
    })
}

fn identity(fields: &Fields<'_>) -> Identity {
    Identity {
        id: fields.id(&["id", "databaseId"]).unwrap_or_default(),
        name: fields.string(&["name"]),
        full_name: resolve_full_name(fields, &["full_name", "nameWithOwner"], &["url", "html_url"]),
        owner: fields.string(&["owner.login", "owner"]),
        owner_type: owner_type(fields),
        visibility: visibility(fields),
        url: fields.string(&["html_url", "url"]),
    }
}

fn owner_type(fields: &Fields<'_>) -> OwnerKind {
    if let Some(kind) = fields.str(&["owner.type", "owner.__typename", "ownerType"]).and_then(OwnerKind::normalize) {
        return kind;
    }

    match fields.bool(&["isInOrganization"]) {
        Some(true) => OwnerKind::Organization,
        _ => OwnerKind::default(),
    }
}

fn visibility(fields: &Fields<'_>) -> Visibility {
    fields
        .str(&["visibility"])
        .and_then(Visibility::normalize)
        .or_else(|| fields.bool(&["private", "isPrivate"]).map(Visibility::from_private_flag))
        .unwrap_or_default()
}

/// Topics arrive as plain strings (REST), `{ name }` objects (tool), or
/// `{ topic: { name } }` nodes (GraphQL).
fn topics(fields: &Fields<'_>) -> Vec<String> {
    let unwrapped: Vec<&Value> = fields
        .items(&["topics", "repositoryTopics"])
        .into_iter()
        .map(|item| item.get("topic").unwrap_or(item))
        .collect();
    string_list(&unwrapped, &["name"])
}

fn temporal(fields: &Fields<'_>) -> Result<Temporal, NormalizeError> {
    let created_at = fields.required_timestamp(&["created_at", "createdAt"])?;
    let updated_at = fields.timestamp(&["updated_at", "updatedAt"])?.unwrap_or(created_at);
    let pushed_at = fields.timestamp(&["pushed_at", "pushedAt"])?;

    Ok(Temporal {
        created_at,
        updated_at,
        pushed_at,
    })
}
