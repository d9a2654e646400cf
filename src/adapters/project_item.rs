use super::fields::{Fields, Shape, full_name_from_url, unwrap_graphql};
use super::{FromSource, NormalizeError, SourceContext, SourceKind};
use crate::facts::{EntityKind, FieldValue, ProjectItem, ProjectItemType, PullRequestState};
use serde_json::Value;

const TOOL_REQUIRED: &[(&str, Shape)] = &[("id", Shape::Id)];
const REST_REQUIRED: &[(&str, Shape)] = &[("id", Shape::Id)];
const GRAPHQL_REQUIRED: &[(&str, Shape)] = &[("id", Shape::Id)];
const GRAPHQL_NODE_PATHS: &[&str] = &["node", "projectV2Item", "item"];

/// Top-level members of a tool item that are not custom field values.
const TOOL_RESERVED_MEMBERS: &[&str] = &[
    "id",
    "title",
    "content",
    "type",
    "assignees",
    "labels",
    "repository",
    "milestone",
    "reviewers",
    "linked pull requests",
    "parent issue",
    "sub-issues progress",
    "isArchived",
    "createdAt",
    "updatedAt",
];

const STATUS_FIELD: &str = "Status";

impl FromSource for ProjectItem {
    const KIND: EntityKind = EntityKind::ProjectItem;

    fn from_tool_output(payload: &Value, context: &SourceContext) -> Result<Self, NormalizeError> {
        let fields = Fields::object(payload, Self::KIND, SourceKind::ToolOutput)?;
        fields.require(TOOL_REQUIRED)?;
        build(&fields, context, tool_field_values(&fields))
    }

    fn from_rest_response(payload: &Value, context: &SourceContext) -> Result<Self, NormalizeError> {
        let fields = Fields::object(payload, Self::KIND, SourceKind::Rest)?;
        fields.require(REST_REQUIRED)?;
        let values = fields.items(&["fields"]).into_iter().filter_map(rest_field_value).collect();
        build(&fields, context, values)
    }

    fn from_graphql_response(payload: &Value, context: &SourceContext) -> Result<Self, NormalizeError> {
        let fields = unwrap_graphql(payload, GRAPHQL_NODE_PATHS, Self::KIND)?;
        fields.require(GRAPHQL_REQUIRED)?;
        let values = fields.items(&["fieldValues"]).into_iter().filter_map(graphql_field_value).collect();
        build(&fields, context, values)
    }
}

fn build(fields: &Fields<'_>, context: &SourceContext, field_values: Vec<(String, FieldValue)>) -> Result<ProjectItem, NormalizeError> {
    let content = fields.nested(&["content"]);
    let item_type = item_type(fields, content.as_ref());

    let status = field_values
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(STATUS_FIELD))
        .map(|(_, value)| value.to_string())
        .filter(|status| !status.is_empty());

    let (content_number, content_state, content_url, repository) = match &content {
        Some(content) if item_type != ProjectItemType::DraftIssue => (
            content.u64(&["number"]),
            content_state(content)?,
            content.string(&["html_url", "url"]),
            repository(fields, content, context),
        ),
        _ => (None, None, String::new(), None),
    };

    let from_content_or_item = |paths: &[&str], item_keys: &[&str]| {
        let listed = content.as_ref().map(|content| content.strings(paths, item_keys)).unwrap_or_default();
        if listed.is_empty() { fields.strings(paths, item_keys) } else { listed }
    };

    Ok(ProjectItem {
        id: fields.id(&["node_id", "id"]).unwrap_or_default(),
        item_type,
        title: content
            .as_ref()
            .and_then(|content| content.opt_string(&["title"]))
            .unwrap_or_else(|| fields.string(&["title"])),
        content_number,
        content_state,
        content_url,
        repository,
        status,
        field_values,
        assignees: from_content_or_item(&["assignees"], &["login"]),
        labels: from_content_or_item(&["labels"], &["name"]),
        is_archived: fields.bool(&["isArchived", "archived"]).unwrap_or(false) || fields.lookup("archived_at").is_some(),
        created_at: fields.timestamp(&["created_at", "createdAt"])?,
        updated_at: fields.timestamp(&["updated_at", "updatedAt"])?,
    })
}

/// The item kind: an explicit type tag, then the content's own type name. Items whose
/// content is hidden from the viewer carry no content at all.
fn item_type(fields: &Fields<'_>, content: Option<&Fields<'_>>) -> ProjectItemType {
    let from_tags = fields
        .str(&["type", "content_type"])
        .and_then(ProjectItemType::normalize)
        .or_else(|| content?.str(&["__typename", "type"]).and_then(ProjectItemType::normalize));

    match (from_tags, content) {
        (Some(item_type), _) => item_type,
        (None, Some(content)) if content.lookup("number").is_some() => ProjectItemType::Issue,
        (None, Some(_)) => ProjectItemType::DraftIssue,
        (None, None) => ProjectItemType::Redacted,
    }
}

/// State of the wrapped issue or pull request, when the payload carries any evidence of it.
fn content_state(content: &Fields<'_>) -> Result<Option<PullRequestState>, NormalizeError> {
    let state = content.str(&["state"]);
    let merged_flag = content.bool(&["merged"]);
    let closed_flag = content.bool(&["closed"]);
    let merged_at = content.timestamp(&["merged_at", "mergedAt", "pull_request.merged_at"])?;
    let closed_at = content.timestamp(&["closed_at", "closedAt"])?;

    if state.is_none() && merged_flag.is_none() && closed_flag.is_none() && merged_at.is_none() && closed_at.is_none() {
        return Ok(None);
    }

    Ok(Some(PullRequestState::normalize(
        state,
        merged_flag,
        merged_at.is_some(),
        closed_at.is_some() || closed_flag == Some(true),
    )))
}

/// The repository holding the content, given as a `nameWithOwner`, a `full_name`, a plain
/// `owner/name` string, or a repository URL.
fn repository(fields: &Fields<'_>, content: &Fields<'_>, context: &SourceContext) -> Option<String> {
    content
        .opt_string(&["repository.nameWithOwner", "repository.full_name"])
        .or_else(|| {
            content
                .str(&["repository", "repository_url"])
                .or_else(|| fields.str(&["repository"]))
                .and_then(repository_name)
        })
        .or_else(|| context.repository().map(str::to_string))
}

fn repository_name(raw: &str) -> Option<String> {
    if let Some(full_name) = full_name_from_url(raw) {
        return Some(full_name);
    }

    let path = raw.split_once("://").map_or(raw, |(_, rest)| rest.split_once('/').map_or("", |(_, path)| path));
    let mut segments = path.trim_matches('/').split('/').filter(|segment| !segment.is_empty());
    match (segments.next(), segments.next()) {
        (Some(owner), Some(name)) => Some(format!("{owner}/{name}")),
        _ => None,
    }
}

/// The tool flattens every custom field into a top-level member named after the field.
fn tool_field_values(fields: &Fields<'_>) -> Vec<(String, FieldValue)> {
    fields
        .members()
        .filter(|(name, _)| !TOOL_RESERVED_MEMBERS.contains(name))
        .filter_map(|(name, value)| {
            let value = match value {
                Value::String(text) if name.eq_ignore_ascii_case(STATUS_FIELD) => FieldValue::SingleSelect(text.clone()),
                Value::String(text) => FieldValue::Text(text.clone()),
                Value::Number(number) => FieldValue::Number(number.as_f64()?),
                Value::Object(map) => FieldValue::Iteration(map.get("title")?.as_str()?.to_string()),
                _ => return None,
            };
            Some((name.to_string(), value))
        })
        .collect()
}

/// A REST field entry: `{ "name": ..., "data_type": ..., "value": ... }`.
fn rest_field_value(entry: &Value) -> Option<(String, FieldValue)> {
    let name = entry.get("name")?.as_str()?.to_string();
    let value = entry.get("value").filter(|value| !value.is_null())?;
    let data_type = entry.get("data_type").and_then(Value::as_str).unwrap_or_default();

    let text = || match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => ["name", "title", "raw"]
            .iter()
            .find_map(|key| map.get(*key)?.as_str())
            .map(str::to_string),
        _ => None,
    };

    let value = match data_type {
        "number" => FieldValue::Number(value.as_f64()?),
        "date" => FieldValue::Date(text()?),
        "single_select" => FieldValue::SingleSelect(text()?),
        "iteration" => FieldValue::Iteration(text()?),
        _ => match value {
            Value::Number(number) => FieldValue::Number(number.as_f64()?),
            _ => FieldValue::Text(text()?),
        },
    };

    Some((name, value))
}

/// A GraphQL `fieldValues` node. Nodes for built-in fields (repository, labels, ...) carry
/// none of the value members and are skipped.
fn graphql_field_value(node: &Value) -> Option<(String, FieldValue)> {
    let name = node.get("field")?.get("name")?.as_str()?.to_string();
    let typename = node.get("__typename").and_then(Value::as_str).unwrap_or_default();
    let text = |key: &str| node.get(key).and_then(Value::as_str).map(str::to_string);

    let value = match typename {
        "ProjectV2ItemFieldSingleSelectValue" => FieldValue::SingleSelect(text("name")?),
        "ProjectV2ItemFieldTextValue" => FieldValue::Text(text("text")?),
        "ProjectV2ItemFieldNumberValue" => FieldValue::Number(node.get("number")?.as_f64()?),
        "ProjectV2ItemFieldDateValue" => FieldValue::Date(text("date")?),
        "ProjectV2ItemFieldIterationValue" => FieldValue::Iteration(text("title")?),
        _ => {
            if let Some(number) = node.get("number").and_then(Value::as_f64) {
                FieldValue::Number(number)
            } else if let Some(date) = text("date") {
                FieldValue::Date(date)
            } else if let Some(value) = text("text") {
                FieldValue::Text(value)
            } else {
                FieldValue::SingleSelect(text("name")?)
            }
        }
    };

    Some((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::ToFactPairs;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_graphql_item_with_field_values() {
        let payload = json!({
            "data": {
                "node": {
                    "id": "PVTI_1",
                    "type": "PULL_REQUEST",
                    "isArchived": false,
                    "createdAt": "2024-04-01T00:00:00Z",
                    "content": {
                        "__typename": "PullRequest",
                        "number": 12,
                        "title": "Speed up parser",
                        "state": "MERGED",
                        "url": "https://github.com/o/r/pull/12",
                        "repository": {"nameWithOwner": "o/r"},
                        "assignees": {"nodes": [{"login": "alice"}]},
                        "labels": {"nodes": [{"name": "perf"}]},
                    },
                    "fieldValues": {"nodes": [
                        {"__typename": "ProjectV2ItemFieldRepositoryValue", "repository": {"name": "r"}},
                        {"__typename": "ProjectV2ItemFieldSingleSelectValue", "name": "In Review", "field": {"name": "Status"}},
                        {"__typename": "ProjectV2ItemFieldNumberValue", "number": 3.0, "field": {"name": "Estimate"}},
                        {"__typename": "ProjectV2ItemFieldIterationValue", "title": "Sprint 4", "field": {"name": "Iteration"}},
                    ]},
                }
            }
        });

        let item = ProjectItem::from_graphql_response(&payload, &SourceContext::new()).unwrap();
        assert_eq!(item.item_type(), ProjectItemType::PullRequest);
        assert_eq!(item.title(), "Speed up parser");
        assert_eq!(item.content_number(), Some(12));
        assert_eq!(item.content_state(), Some(PullRequestState::Merged));
        assert_eq!(item.repository(), Some("o/r"));
        assert_eq!(item.status(), Some("In Review"));
        assert_eq!(item.assignees(), ["alice"]);
        assert_eq!(item.field_value("estimate"), Some(&FieldValue::Number(3.0)));
        assert!(item.is_done());

        let pairs = item.to_fact_pairs(Utc.with_ymd_and_hms(2024, 4, 2, 0, 0, 0).unwrap());
        assert_eq!(pairs.get("PROJECT_ITEM_FIELD_VALUES"), Some("Status=In Review;Estimate=3;Iteration=Sprint 4"));
        assert_eq!(pairs.get("PROJECT_ITEM_CONTENT_STATE"), Some("merged"));
    }

    #[test]
    fn test_tool_item_custom_fields() {
        let payload = json!({
            "id": "PVTI_2",
            "title": "Write docs",
            "status": "Todo",
            "priority": "High",
            "estimate": 2,
            "assignees": ["bob"],
            "labels": ["docs"],
            "repository": "https://github.com/o/r",
            "content": {"type": "Issue", "number": 4, "title": "Write docs", "repository": "o/r", "url": "https://github.com/o/r/issues/4"},
        });

        let item = ProjectItem::from_tool_output(&payload, &SourceContext::new()).unwrap();
        assert_eq!(item.item_type(), ProjectItemType::Issue);
        assert_eq!(item.status(), Some("Todo"));
        assert_eq!(item.repository(), Some("o/r"));
        assert_eq!(item.content_state(), None);
        assert_eq!(item.assignees(), ["bob"]);
        assert_eq!(item.labels(), ["docs"]);
        assert_eq!(item.field_value("Priority"), Some(&FieldValue::Text("High".to_string())));
        assert_eq!(item.field_value("estimate"), Some(&FieldValue::Number(2.0)));
        assert!(!item.is_done());
    }

    #[test]
    fn test_tool_draft_issue() {
        let payload = json!({
            "id": "PVTI_3",
            "title": "Idea",
            "status": "Done",
            "content": {"type": "DraftIssue", "title": "Idea", "body": ""},
        });

        let item = ProjectItem::from_tool_output(&payload, &SourceContext::new().with_repository("o/r")).unwrap();
        assert_eq!(item.item_type(), ProjectItemType::DraftIssue);
        assert_eq!(item.content_number(), None);
        assert_eq!(item.repository(), None);
        assert!(item.is_done());
    }

    #[test]
    fn test_rest_item() {
        let payload = json!({
            "id": 9,
            "node_id": "PVTI_rest",
            "content_type": "Issue",
            "content": {
                "number": 7,
                "title": "Bug",
                "state": "closed",
                "html_url": "https://github.com/o/r/issues/7",
                "repository_url": "https://api.github.com/repos/o/r",
            },
            "fields": [
                {"name": "Status", "data_type": "single_select", "value": {"name": "Done"}},
                {"name": "Due", "data_type": "date", "value": "2024-05-01"},
                {"name": "Notes", "data_type": "text", "value": null},
            ],
            "archived_at": "2024-05-02T00:00:00Z",
            "created_at": "2024-04-01T00:00:00Z",
        });

        let item = ProjectItem::from_rest_response(&payload, &SourceContext::new()).unwrap();
        assert_eq!(item.id(), "PVTI_rest");
        assert_eq!(item.content_state(), Some(PullRequestState::Closed));
        assert_eq!(item.repository(), Some("o/r"));
        assert_eq!(item.status(), Some("Done"));
        assert_eq!(item.field_values().len(), 2);
        assert!(item.is_archived());
    }

    #[test]
    fn test_redacted_item() {
        let payload = json!({"id": "PVTI_4", "content": null});
        let item = ProjectItem::from_graphql_response(&payload, &SourceContext::new()).unwrap();
        assert_eq!(item.item_type(), ProjectItemType::Redacted);
        assert_eq!(item.title(), "");
        assert_eq!(item.status(), None);
    }

    #[test]
    fn test_repository_name_forms() {
        assert_eq!(repository_name("o/r"), Some("o/r".to_string()));
        assert_eq!(repository_name("https://github.com/o/r"), Some("o/r".to_string()));
        assert_eq!(repository_name("https://api.github.com/repos/o/r"), Some("o/r".to_string()));
        assert_eq!(repository_name("r"), None);
    }

    #[test]
    fn test_wrong_type_id_is_rejected() {
        let payload = json!({"id": {"value": "PVTI_1"}});
        let err = ProjectItem::from_tool_output(&payload, &SourceContext::new()).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidField { field, .. } if field == "id"));
    }
}
