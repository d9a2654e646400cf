use super::fields::{Fields, Shape, unwrap_graphql};
use super::{FromSource, NormalizeError, SourceContext, SourceKind};
use crate::facts::{EntityKind, ItemState, OwnerKind, Project, Visibility};
use serde_json::Value;

const TOOL_REQUIRED: &[(&str, Shape)] = &[("id", Shape::Id), ("number", Shape::Integer), ("title", Shape::Text)];
const REST_REQUIRED: &[(&str, Shape)] = &[("id", Shape::Id), ("number", Shape::Integer), ("title|name", Shape::Text)];
const GRAPHQL_REQUIRED: &[(&str, Shape)] = &[("id", Shape::Id), ("number", Shape::Integer), ("title", Shape::Text)];
pub(super) const GRAPHQL_NODE_PATHS: &[&str] = &["organization.projectV2", "user.projectV2", "viewer.projectV2", "node", "projectV2"];

impl FromSource for Project {
    const KIND: EntityKind = EntityKind::Project;

    fn from_tool_output(payload: &Value, _context: &SourceContext) -> Result<Self, NormalizeError> {
        let fields = Fields::object(payload, Self::KIND, SourceKind::ToolOutput)?;
        fields.require(TOOL_REQUIRED)?;
        build(&fields, None)
    }

    fn from_rest_response(payload: &Value, _context: &SourceContext) -> Result<Self, NormalizeError> {
        let fields = Fields::object(payload, Self::KIND, SourceKind::Rest)?;
        fields.require(REST_REQUIRED)?;
        build(&fields, None)
    }

    fn from_graphql_response(payload: &Value, _context: &SourceContext) -> Result<Self, NormalizeError> {
        let fields = unwrap_graphql(payload, GRAPHQL_NODE_PATHS, Self::KIND)?;
        fields.require(GRAPHQL_REQUIRED)?;
        build(&fields, Some(payload))
    }
}

fn build(fields: &Fields<'_>, envelope: Option<&Value>) -> Result<Project, NormalizeError> {
    let created_at = fields.timestamp(&["created_at", "createdAt"])?;
    let updated_at = fields.timestamp(&["updated_at", "updatedAt"])?;
    let closed_at = fields.timestamp(&["closed_at", "closedAt"])?;

    let state = ItemState::normalize(fields.str(&["state"]), fields.bool(&["closed"]), closed_at.is_some());
    let envelope_owner = envelope.and_then(envelope_owner);

    Ok(Project {
        id: fields.id(&["node_id", "id"]).unwrap_or_default(),
        number: fields.u64(&["number"]).unwrap_or(0),
        title: fields.string(&["title", "name"]),
        owner: fields
            .opt_string(&["owner.login", "owner"])
            .or_else(|| envelope_owner.as_ref().map(|(login, _)| login.clone()))
            .unwrap_or_default(),
        owner_type: fields
            .str(&["owner.type", "owner.__typename"])
            .and_then(OwnerKind::normalize)
            .or_else(|| envelope_owner.as_ref().map(|(_, kind)| *kind))
            .unwrap_or_default(),
        description: fields.string(&["shortDescription", "short_description", "description", "body"]),
        state,
        visibility: visibility(fields),
        items_count: fields.count(&["items", "items_count", "itemsCount"]).unwrap_or(0),
        fields_count: fields.count(&["fields", "fields_count", "fieldsCount"]).unwrap_or(0),
        url: fields.string(&["html_url", "url"]),
        created_at,
        updated_at,
        closed_at,
    })
}

/// Projects expose a `public` flag rather than a private one.
fn visibility(fields: &Fields<'_>) -> Visibility {
    fields
        .str(&["visibility"])
        .and_then(Visibility::normalize)
        .or_else(|| fields.bool(&["public"]).map(|public| Visibility::from_private_flag(!public)))
        .unwrap_or_default()
}

/// A GraphQL project query nests the project under its owner, which identifies the owner
/// even when the project node itself does not select it.
fn envelope_owner(envelope: &Value) -> Option<(String, OwnerKind)> {
    let data = envelope.get("data").unwrap_or(envelope);
    [("organization", OwnerKind::Organization), ("user", OwnerKind::User)]
        .into_iter()
        .find_map(|(field, kind)| {
            let owner = data.get(field).filter(|owner| !owner.is_null())?;
            let login = owner.get("login").and_then(Value::as_str).unwrap_or_default();
            Some((login.to_string(), kind))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::ToFactPairs;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_tool_output() {
        let payload = json!({
            "id": "PVT_kw",
            "number": 3,
            "title": "Roadmap",
            "shortDescription": "Quarterly plan",
            "public": false,
            "closed": false,
            "url": "https://github.com/orgs/acme/projects/3",
            "items": {"totalCount": 12},
            "fields": {"totalCount": 9},
            "owner": {"login": "acme", "type": "Organization"},
        });

        let project = Project::from_tool_output(&payload, &SourceContext::new()).unwrap();
        assert_eq!(project.owner(), "acme");
        assert_eq!(project.owner_type(), OwnerKind::Organization);
        assert_eq!(project.visibility(), Visibility::Private);
        assert_eq!(project.state(), ItemState::Open);
        assert_eq!(project.items_count(), 12);
        assert_eq!(project.fields_count(), 9);

        let pairs = project.to_fact_pairs(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap());
        assert_eq!(pairs.get("PROJECT_DESCRIPTION"), Some("Quarterly plan"));
        assert_eq!(pairs.get("PROJECT_CREATED_AT"), Some(""));
        assert_eq!(pairs.get("PROJECT_HAS_RECENT_ACTIVITY"), Some("false"));
    }

    #[test]
    fn test_graphql_owner_from_envelope() {
        let payload = json!({
            "data": {
                "organization": {
                    "login": "acme",
                    "projectV2": {
                        "id": "PVT_1",
                        "number": 1,
                        "title": "Board",
                        "closed": true,
                        "closedAt": "2024-03-01T00:00:00Z",
                        "public": true,
                        "items": {"totalCount": 4},
                        "createdAt": "2024-01-01T00:00:00Z",
                        "updatedAt": "2024-03-01T00:00:00Z",
                    }
                }
            }
        });

        let project = Project::from_graphql_response(&payload, &SourceContext::new()).unwrap();
        assert_eq!(project.owner(), "acme");
        assert_eq!(project.owner_type(), OwnerKind::Organization);
        assert!(project.is_closed());
        assert_eq!(project.visibility(), Visibility::Public);
        assert_eq!(project.age_in_days(Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap()), Some(10));
    }

    #[test]
    fn test_rest_payload() {
        let payload = json!({
            "id": 77,
            "node_id": "PVT_rest",
            "number": 2,
            "title": "Triage",
            "owner": {"login": "alice", "type": "User"},
            "state": "open",
            "created_at": "2024-01-01T00:00:00Z",
        });

        let project = Project::from_rest_response(&payload, &SourceContext::new()).unwrap();
        assert_eq!(project.id(), "PVT_rest");
        assert_eq!(project.owner_type(), OwnerKind::User);
        assert_eq!(project.updated_at(), None);
    }

    #[test]
    fn test_missing_fields() {
        let err = Project::from_tool_output(&json!({"title": "x"}), &SourceContext::new()).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingFields { fields, .. } if fields == vec!["id", "number"]));
    }

    #[test]
    fn test_wrong_type_identity_is_rejected() {
        let payload = json!({"id": "", "number": 1, "title": "Board"});
        let err = Project::from_tool_output(&payload, &SourceContext::new()).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidField { field, .. } if field == "id"));

        let payload = json!({"id": 9, "number": "first", "name": "Board"});
        let err = Project::from_rest_response(&payload, &SourceContext::new()).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidField { field, .. } if field == "number"));
    }
}
