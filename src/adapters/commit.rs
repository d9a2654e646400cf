use super::fields::{Fields, Shape, unwrap_graphql};
use super::issue::repository;
use super::{FromSource, NormalizeError, SourceContext, SourceKind};
use crate::facts::{Commit, EntityKind};
use chrono::{DateTime, Utc};
use serde_json::Value;

const TOOL_REQUIRED: &[(&str, Shape)] = &[("oid|sha", Shape::Text), ("authoredDate|committedDate", Shape::Timestamp)];
const REST_REQUIRED: &[(&str, Shape)] = &[
    ("sha", Shape::Text),
    ("commit.author.date|commit.committer.date", Shape::Timestamp),
];
const GRAPHQL_REQUIRED: &[(&str, Shape)] = &[
    ("oid", Shape::Text),
    ("authoredDate|author.date|committedDate", Shape::Timestamp),
];
const GRAPHQL_NODE_PATHS: &[&str] = &["repository.object", "repository.ref.target", "node", "commit"];

const AUTHORED_AT_PATHS: &[&str] = &["commit.author.date", "authoredDate", "author.date", "committedDate", "commit.committer.date"];
const COMMITTED_AT_PATHS: &[&str] = &["commit.committer.date", "committedDate", "committer.date"];

impl FromSource for Commit {
    const KIND: EntityKind = EntityKind::Commit;

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

struct Authorship {
    author_name: String,
    author_email: String,
    author_login: Option<String>,
    committer_name: String,
}

fn build(fields: &Fields<'_>, context: &SourceContext) -> Result<Commit, NormalizeError> {
    let authorship = authorship(fields);
    let (authored_at, committed_at) = temporal(fields)?;

    Ok(Commit {
        sha: fields.string(&["sha", "oid"]),
        message: message(fields),
        author_name: authorship.author_name,
        author_email: authorship.author_email,
        author_login: authorship.author_login,
        committer_name: authorship.committer_name,
        authored_at,
        committed_at,
        additions: fields.u64(&["stats.additions", "additions"]).unwrap_or(0),
        deletions: fields.u64(&["stats.deletions", "deletions"]).unwrap_or(0),
        changed_files: fields.count(&["files", "changedFilesIfAvailable", "changedFiles"]).unwrap_or(0),
        parents_count: fields.count(&["parents"]).unwrap_or(0),
        is_verified: fields.bool(&["commit.verification.verified", "signature.isValid", "verified"]).unwrap_or(false),
        url: fields.string(&["html_url", "url"]),
        repository: repository(fields, context),
    })
}

/// The tool splits the message into headline and body; the APIs carry it whole.
fn message(fields: &Fields<'_>) -> String {
    if let Some(message) = fields.opt_string(&["commit.message", "message"]) {
        return message;
    }

    let headline = fields.string(&["messageHeadline"]);
    match fields.opt_string(&["messageBody"]) {
        Some(body) => format!("{headline}\n\n{body}"),
        None => headline,
    }
}

/// Author identity: REST nests the git identity under `commit` and the account at the top
/// level, GraphQL links the account as `author.user`, and the tool lists `authors`.
fn authorship(fields: &Fields<'_>) -> Authorship {
    let first_author = fields
        .items(&["authors"])
        .first()
        .and_then(|author| Fields::object(author, fields.entity(), fields.format()).ok());

    let from_first_author = |paths: &[&str]| first_author.as_ref().and_then(|author| author.opt_string(paths));

    let author_name = fields
        .opt_string(&["commit.author.name", "author.name"])
        .or_else(|| from_first_author(&["name"]))
        .unwrap_or_default();

    Authorship {
        author_email: fields
            .opt_string(&["commit.author.email", "author.email"])
            .or_else(|| from_first_author(&["email"]))
            .unwrap_or_default(),
        author_login: fields
            .opt_string(&["author.login", "author.user.login"])
            .or_else(|| from_first_author(&["login"])),
        committer_name: fields
            .opt_string(&["commit.committer.name", "committer.name"])
            .unwrap_or_else(|| author_name.clone()),
        author_name,
    }
}

fn temporal(fields: &Fields<'_>) -> Result<(DateTime<Utc>, DateTime<Utc>), NormalizeError> {
    let authored_at = fields.required_timestamp(AUTHORED_AT_PATHS)?;
    let committed_at = fields.timestamp(COMMITTED_AT_PATHS)?.unwrap_or(authored_at);
    Ok((authored_at, committed_at))
}
