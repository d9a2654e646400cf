use super::{FactPairs, FactValue, ProjectItemType, PullRequestState, ToFactPairs};
use crate::keys::fact_keys;
use chrono::{DateTime, Utc};
use core::fmt;

/// Status names that mean an item's work is finished, compared case-insensitively.
const DONE_STATUSES: &[&str] = &["done", "closed", "complete", "completed", "shipped"];

fact_keys! {
    /// Keys emitted by [`ProjectItem`].
    pub enum ProjectItemKey in "PROJECT_ITEM" {
        Id => "PROJECT_ITEM_ID", "Node identifier of the project item";
        Type => "PROJECT_ITEM_TYPE", "Content kind: issue, pull_request, draft_issue or redacted";
        Title => "PROJECT_ITEM_TITLE", "Title of the wrapped content";
        ContentNumber => "PROJECT_ITEM_CONTENT_NUMBER", "Issue or pull request number, empty for drafts";
        ContentState => "PROJECT_ITEM_CONTENT_STATE", "State of the wrapped content: open, closed or merged, empty when unknown";
        ContentUrl => "PROJECT_ITEM_CONTENT_URL", "Web URL of the wrapped content";
        Repository => "PROJECT_ITEM_REPOSITORY", "owner/name of the repository holding the content, empty for drafts";
        Status => "PROJECT_ITEM_STATUS", "Value of the Status field, empty when unset";
        FieldValues => "PROJECT_ITEM_FIELD_VALUES", "Semicolon-separated name=value custom field values";
        Assignees => "PROJECT_ITEM_ASSIGNEES", "Comma-separated assignee logins";
        Labels => "PROJECT_ITEM_LABELS", "Comma-separated label names";
        IsArchived => "PROJECT_ITEM_IS_ARCHIVED", "Whether the item is archived";
        CreatedAt => "PROJECT_ITEM_CREATED_AT", "Creation timestamp, empty when unknown";
        UpdatedAt => "PROJECT_ITEM_UPDATED_AT", "Last update timestamp, empty when unknown";
        IsDone => "PROJECT_ITEM_IS_DONE", "Status or content state indicates finished work";
    }
}

/// The value of one custom field of a project item.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(String),
    SingleSelect(String),
    Iteration(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) | Self::Date(value) | Self::SingleSelect(value) | Self::Iteration(value) => f.write_str(value),
            Self::Number(value) => write!(f, "{value}"),
        }
    }
}

/// One item of a project board.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectItem {
    pub(crate) id: String,
    pub(crate) item_type: ProjectItemType,
    pub(crate) title: String,
    pub(crate) content_number: Option<u64>,
    pub(crate) content_state: Option<PullRequestState>,
    pub(crate) content_url: String,
    pub(crate) repository: Option<String>,
    pub(crate) status: Option<String>,
    pub(crate) field_values: Vec<(String, FieldValue)>,
    pub(crate) assignees: Vec<String>,
    pub(crate) labels: Vec<String>,
    pub(crate) is_archived: bool,
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) updated_at: Option<DateTime<Utc>>,
}

impl ProjectItem {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn item_type(&self) -> ProjectItemType {
        self.item_type
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub const fn content_number(&self) -> Option<u64> {
        self.content_number
    }

    #[must_use]
    pub const fn content_state(&self) -> Option<PullRequestState> {
        self.content_state
    }

    #[must_use]
    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Custom field values, in the order the source listed them.
    #[must_use]
    pub fn field_values(&self) -> &[(String, FieldValue)] {
        &self.field_values
    }

    /// Look up a custom field value by field name, case-insensitively.
    #[must_use]
    pub fn field_value(&self, name: &str) -> Option<&FieldValue> {
        self.field_values
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn assignees(&self) -> &[String] {
        &self.assignees
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub const fn is_archived(&self) -> bool {
        self.is_archived
    }

    #[must_use]
    pub const fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Whether the item's status names a finished state, or its content has been closed
    /// or merged.
    #[must_use]
    pub fn is_done(&self) -> bool {
        let status_done = self
            .status
            .as_deref()
            .is_some_and(|status| DONE_STATUSES.iter().any(|done| status.trim().eq_ignore_ascii_case(done)));

        let content_done = matches!(self.content_state, Some(PullRequestState::Closed | PullRequestState::Merged));

        status_done || content_done
    }

    fn render_field_values(&self) -> String {
        self.field_values
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl FactValue for FieldValue {
    fn render(&self) -> String {
        self.to_string()
    }
}

impl ToFactPairs for ProjectItem {
    fn to_fact_pairs(&self, _now: DateTime<Utc>) -> FactPairs {
        let mut pairs = FactPairs::new();

        pairs.push(ProjectItemKey::Id, &self.id);
        pairs.push(ProjectItemKey::Type, self.item_type);
        pairs.push(ProjectItemKey::Title, &self.title);
        pairs.push(ProjectItemKey::ContentNumber, self.content_number);
        pairs.push(ProjectItemKey::ContentState, self.content_state);
        pairs.push(ProjectItemKey::ContentUrl, &self.content_url);
        pairs.push(ProjectItemKey::Repository, &self.repository);
        pairs.push(ProjectItemKey::Status, &self.status);
        pairs.push(ProjectItemKey::FieldValues, self.render_field_values());
        pairs.push(ProjectItemKey::Assignees, &self.assignees);
        pairs.push(ProjectItemKey::Labels, &self.labels);
        pairs.push(ProjectItemKey::IsArchived, self.is_archived);
        pairs.push(ProjectItemKey::CreatedAt, self.created_at);
        pairs.push(ProjectItemKey::UpdatedAt, self.updated_at);
        pairs.push(ProjectItemKey::IsDone, self.is_done());

        pairs
    }
}
