use super::fields::{Fields, Shape, full_name_from_url, unwrap_graphql};
use super::{FromSource, NormalizeError, SourceContext, SourceKind};
use crate::facts::{EntityKind, Issue, ItemState};
use chrono::{DateTime, Utc};
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
const GRAPHQL_NODE_PATHS: &[&str] = &["repository.issue", "node", "issue"];

impl FromSource for Issue {
    const KIND: EntityKind = EntityKind::Issue;

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

/// People, labels and containers attached to an issue or pull request.
pub(super) struct Relationships {
    pub author: String,
    pub assignees: Vec<String>,
    pub labels: Vec<String>,
    pub milestone: Option<String>,
    pub repository: String,
}

/// Timestamps of an issue or pull request.
pub(super) struct Temporal {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

fn build(fields: &Fields<'_>, context: &SourceContext) -> Result<Issue, NormalizeError> {
    let relationships = relationships(fields, context);
    let temporal = temporal(fields)?;

    let state = ItemState::normalize(
        fields.str(&["state"]),
        fields.bool(&["closed"]),
        temporal.closed_at.is_some(),
    );

    Ok(Issue {
        id: fields.id(&["node_id", "id"]).unwrap_or_default(),
        number: fields.u64(&["number"]).unwrap_or(0),
        title: fields.string(&["title"]),
        body: fields.string(&["body"]),
        state,
        state_reason: fields.opt_string(&["state_reason", "stateReason"]).map(|reason| reason.to_ascii_lowercase()),
        author: relationships.author,
        assignees: relationships.assignees,
        labels: relationships.labels,
        milestone: relationships.milestone,
        comments_count: fields.count(&["comments"]).unwrap_or(0),
        is_locked: fields.bool(&["locked"]).unwrap_or(false),
        url: fields.string(&["html_url", "url"]),
        repository: relationships.repository,
        created_at: temporal.created_at,
        updated_at: temporal.updated_at,
        closed_at: temporal.closed_at,
    })
}

pub(super) fn relationships(fields: &Fields<'_>, context: &SourceContext) -> Relationships {
    Relationships {
        author: fields.string(&["user.login", "author.login", "author"]),
        assignees: fields.strings(&["assignees"], &["login"]),
        labels: fields.strings(&["labels"], &["name"]),
        milestone: fields.opt_string(&["milestone.title", "milestone"]),
        repository: repository(fields, context),
    }
}

/// The containing repository: the payload's own repository reference, then its API URLs,
/// then the caller's context. Empty when none identify it.
pub(super) fn repository(fields: &Fields<'_>, context: &SourceContext) -> String {
    if let Some(repository) = fields.opt_string(&["repository.nameWithOwner", "repository.full_name", "base.repo.full_name"]) {
        return repository;
    }

    ["repository_url", "url"]
        .iter()
        .filter_map(|path| fields.str(&[*path]))
        .find_map(full_name_from_url)
        .or_else(|| context.repository().map(str::to_string))
        .unwrap_or_default()
}

pub(super) fn temporal(fields: &Fields<'_>) -> Result<Temporal, NormalizeError> {
    let created_at = fields.required_timestamp(&["created_at", "createdAt"])?;
    let updated_at = fields.timestamp(&["updated_at", "updatedAt"])?.unwrap_or(created_at);
    let closed_at = fields.timestamp(&["closed_at", "closedAt"])?;

    Ok(Temporal {
        created_at,
        updated_at,
        closed_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::ToFactPairs;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_graphql_closed_flag_without_state() {
        let payload = json!({
            "number": 5,
            "title": "Broken link",
            "closed": true,
            "createdAt": "2024-03-01T00:00:00Z",
        });

        let issue = Issue::from_graphql_response(&payload, &SourceContext::new()).unwrap();
        assert_eq!(issue.state(), ItemState::Closed);

        let pairs = issue.to_fact_pairs(now());
        assert_eq!(pairs.get("ISSUE_STATE"), Some("closed"));
    }

    #[test]
    fn test_graphql_envelope_with_connections() {
        let payload = json!({
            "data": {
                "repository": {
                    "issue": {
                        "id": "I_1",
                        "number": 9,
                        "title": "Crash",
                        "state": "OPEN",
                        "author": {"login": "alice"},
                        "assignees": {"nodes": [{"login": "bob"}]},
                        "labels": {"edges": [{"node": {"name": "bug"}}]},
                        "milestone": {"title": "v1"},
                        "comments": {"totalCount": 4},
                        "repository": {"nameWithOwner": "o/r"},
                        "createdAt": "2024-03-01T00:00:00Z",
                        "updatedAt": "2024-03-02T00:00:00Z",
                    }
                }
            }
        });

        let issue = Issue::from_graphql_response(&payload, &SourceContext::new()).unwrap();
        assert_eq!(issue.id(), "I_1");
        assert_eq!(issue.author(), "alice");
        assert_eq!(issue.assignees(), ["bob"]);
        assert_eq!(issue.labels(), ["bug"]);
        assert_eq!(issue.milestone(), Some("v1"));
        assert_eq!(issue.comments_count(), 4);
        assert_eq!(issue.repository(), "o/r");
        assert!(issue.is_open());
    }

    #[test]
    fn test_rest_payload() {
        let payload = json!({
            "id": 1001,
            "node_id": "I_kw",
            "number": 3,
            "title": "Docs",
            "body": "Line one\nLine two",
            "state": "closed",
            "state_reason": "completed",
            "user": {"login": "carol"},
            "assignees": [],
            "labels": [{"name": "docs"}, "good first issue"],
            "milestone": null,
            "comments": 2,
            "locked": true,
            "html_url": "https://github.com/o/r/issues/3",
            "repository_url": "https://api.github.com/repos/o/r",
            "created_at": "2024-03-01T00:00:00Z",
            "updated_at": "2024-03-05T00:00:00Z",
            "closed_at": "2024-03-05T00:00:00Z",
        });

        let issue = Issue::from_rest_response(&payload, &SourceContext::new()).unwrap();
        assert_eq!(issue.id(), "I_kw");
        assert_eq!(issue.state(), ItemState::Closed);
        assert_eq!(issue.author(), "carol");
        assert_eq!(issue.labels(), ["docs", "good first issue"]);
        assert_eq!(issue.milestone(), None);
        assert_eq!(issue.repository(), "o/r");
        assert_eq!(issue.days_to_close(), Some(4));

        let pairs = issue.to_fact_pairs(now());
        assert_eq!(pairs.get("ISSUE_STATE_REASON"), Some("completed"));
        assert_eq!(pairs.get("ISSUE_IS_LOCKED"), Some("true"));
        assert_eq!(pairs.get("ISSUE_MILESTONE"), Some(""));
        assert_eq!(pairs.get("ISSUE_ASSIGNEES"), Some(""));
    }

    #[test]
    fn test_tool_output_uses_context_repository() {
        let payload = json!({
            "number": 12,
            "title": "Slow build",
            "state": "OPEN",
            "author": {"login": "dave"},
            "labels": [{"name": "perf"}],
            "comments": [{"body": "+1"}, {"body": "same"}],
            "createdAt": "2024-03-01T00:00:00Z",
            "url": "https://github.com/o/r/issues/12",
        });

        let context = SourceContext::new().with_repository("o/r");
        let issue = Issue::from_tool_output(&payload, &context).unwrap();
        assert_eq!(issue.repository(), "o/r");
        assert_eq!(issue.comments_count(), 2);
        assert_eq!(issue.id(), "");

        let without_context = Issue::from_tool_output(&payload, &SourceContext::new()).unwrap();
        assert_eq!(without_context.repository(), "");
    }

    #[test]
    fn test_state_synonyms_collapse() {
        for (spelling, expected) in [("closed", ItemState::Closed), ("CLOSED", ItemState::Closed), ("open", ItemState::Open)] {
            let payload = json!({"number": 1, "title": "t", "state": spelling, "created_at": "2024-03-01T00:00:00Z"});
            let issue = Issue::from_rest_response(&payload, &SourceContext::new()).unwrap();
            assert_eq!(issue.state(), expected);
        }
    }

    #[test]
    fn test_missing_fields() {
        let payload = json!({"body": "no identity"});
        let err = Issue::from_rest_response(&payload, &SourceContext::new()).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingFields { fields, .. } if fields == vec!["number", "title", "created_at"]));
    }

    #[test]
    fn test_wrong_type_number_and_title_are_rejected() {
        let payload = json!({"number": "abc", "title": "t", "created_at": "2024-03-01T00:00:00Z"});
        let err = Issue::from_rest_response(&payload, &SourceContext::new()).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidField { field, .. } if field == "number"));

        let payload = json!({"number": 3, "title": ["x"], "createdAt": "2024-03-01T00:00:00Z"});
        let err = Issue::from_tool_output(&payload, &SourceContext::new()).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidField { field, .. } if field == "title"));
    }
}
