use super::fields::{Fields, Shape, unwrap_graphql};
use super::{FromSource, NormalizeError, SourceContext, SourceKind, project};
use crate::facts::{EntityKind, Project, ProjectItem, ProjectSummary};
use serde_json::Value;

/// The tool and REST shapes pair the project with its item listing; GraphQL nests the
/// item connection inside the project node.
const REQUIRED: &[(&str, Shape)] = &[("project", Shape::Object)];

impl FromSource for ProjectSummary {
    const KIND: EntityKind = EntityKind::ProjectSummary;

    fn from_tool_output(payload: &Value, context: &SourceContext) -> Result<Self, NormalizeError> {
        let fields = Fields::object(payload, Self::KIND, SourceKind::ToolOutput)?;
        fields.require(REQUIRED)?;
        let project = Project::from_tool_output(fields.lookup("project").unwrap_or(&Value::Null), context)?;
        let items = build_items(&fields.items(&["items"]), |item| ProjectItem::from_tool_output(item, context))?;
        Ok(ProjectSummary::from_parts(&project, &items))
    }

    fn from_rest_response(payload: &Value, context: &SourceContext) -> Result<Self, NormalizeError> {
        let fields = Fields::object(payload, Self::KIND, SourceKind::Rest)?;
        fields.require(REQUIRED)?;
        let project = Project::from_rest_response(fields.lookup("project").unwrap_or(&Value::Null), context)?;
        let items = build_items(&fields.items(&["items"]), |item| ProjectItem::from_rest_response(item, context))?;
        Ok(ProjectSummary::from_parts(&project, &items))
    }

    fn from_graphql_response(payload: &Value, context: &SourceContext) -> Result<Self, NormalizeError> {
        let node = unwrap_graphql(payload, project::GRAPHQL_NODE_PATHS, Self::KIND)?;
        let project = Project::from_graphql_response(payload, context)?;
        let items = build_items(&node.items(&["items"]), |item| ProjectItem::from_graphql_response(item, context))?;
        Ok(ProjectSummary::from_parts(&project, &items))
    }
}

fn build_items(
    raw: &[&Value],
    build: impl Fn(&Value) -> Result<ProjectItem, NormalizeError>,
) -> Result<Vec<ProjectItem>, NormalizeError> {
    raw.iter().map(|item| build(item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{ProjectItemType, ToFactPairs};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_tool_project_with_item_listing() {
        let payload = json!({
            "project": {
                "id": "PVT_1",
                "number": 1,
                "title": "Roadmap",
                "owner": {"login": "acme", "type": "Organization"},
                "items": {"totalCount": 3},
            },
            "items": {
                "items": [
                    {"id": "PVTI_1", "status": "Done", "assignees": ["alice"], "content": {"type": "Issue", "number": 1, "repository": "acme/web"}},
                    {"id": "PVTI_2", "status": "Todo", "assignees": ["alice"], "content": {"type": "PullRequest", "number": 2, "repository": "acme/api"}},
                    {"id": "PVTI_3", "content": {"type": "DraftIssue", "title": "Idea"}},
                ],
                "totalCount": 3,
            },
        });

        let summary = ProjectSummary::from_tool_output(&payload, &SourceContext::new()).unwrap();
        assert_eq!(summary.total_items(), 3);
        assert_eq!(summary.declared_items(), 3);
        assert_eq!(summary.done_items(), 1);
        assert_eq!(summary.items_of_type(ProjectItemType::DraftIssue), 1);

        let pairs = summary.to_fact_pairs(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
        assert_eq!(pairs.get("PROJECT_SUMMARY_STATUS_BREAKDOWN"), Some("Done:1,No Status:1,Todo:1"));
        assert_eq!(pairs.get("PROJECT_SUMMARY_REPOSITORIES"), Some("acme/api,acme/web"));
        assert_eq!(pairs.get("PROJECT_SUMMARY_COMPLETION_RATIO"), Some("33"));
    }

    #[test]
    fn test_graphql_nested_items() {
        let payload = json!({
            "data": {
                "user": {
                    "login": "alice",
                    "projectV2": {
                        "id": "PVT_2",
                        "number": 4,
                        "title": "Personal",
                        "items": {"totalCount": 2, "nodes": [
                            {"id": "PVTI_a", "type": "ISSUE", "content": {"number": 1, "state": "CLOSED"}},
                            {"id": "PVTI_b", "type": "REDACTED", "content": null},
                        ]},
                    }
                }
            }
        });

        let summary = ProjectSummary::from_graphql_response(&payload, &SourceContext::new()).unwrap();
        assert_eq!(summary.project_id(), "PVT_2");
        assert_eq!(summary.total_items(), 2);
        assert_eq!(summary.done_items(), 1);
        assert_eq!(summary.items_of_type(ProjectItemType::Redacted), 1);

        let pairs = summary.to_fact_pairs(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
        assert_eq!(pairs.get("PROJECT_SUMMARY_OWNER"), Some("alice"));
    }

    #[test]
    fn test_invalid_item_fails_the_summary() {
        let payload = json!({
            "project": {"id": "PVT_1", "number": 1, "title": "Roadmap"},
            "items": [{"title": "no id"}],
        });

        let err = ProjectSummary::from_rest_response(&payload, &SourceContext::new()).unwrap_err();
        assert_eq!(err.entity(), EntityKind::ProjectItem);
    }

    #[test]
    fn test_missing_project() {
        let err = ProjectSummary::from_tool_output(&json!({"items": []}), &SourceContext::new()).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingFields { fields, .. } if fields == vec!["project"]));
    }

    #[test]
    fn test_project_must_be_an_object() {
        let payload = json!({"project": "Board", "items": []});
        let err = ProjectSummary::from_tool_output(&payload, &SourceContext::new()).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidField { field, .. } if field == "project"));
    }
}
