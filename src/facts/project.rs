use super::time_math::{age_in_days, days_since};
use super::{FactPairs, ItemState, OwnerKind, ToFactPairs, Visibility};
use crate::keys::fact_keys;
use chrono::{DateTime, Utc};

/// Window used by [`Project::has_recent_activity`] when no other is requested.
pub const RECENT_ACTIVITY_DAYS: u64 = 30;

fact_keys! {
    /// Keys emitted by [`Project`].
    pub enum ProjectKey in "PROJECT" {
        Id => "PROJECT_ID", "Node identifier of the project";
        Number => "PROJECT_NUMBER", "Project number within its owner";
        Title => "PROJECT_TITLE", "Project title";
        Owner => "PROJECT_OWNER", "Login of the project owner";
        OwnerType => "PROJECT_OWNER_TYPE", "Owner account kind: Organization or User";
        Description => "PROJECT_DESCRIPTION", "Short description of the project";
        State => "PROJECT_STATE", "Project state: open or closed";
        Visibility => "PROJECT_VISIBILITY", "Project visibility: public or private";
        ItemsCount => "PROJECT_ITEMS_COUNT", "Number of items on the project";
        FieldsCount => "PROJECT_FIELDS_COUNT", "Number of fields defined on the project";
        Url => "PROJECT_URL", "Web URL of the project";
        CreatedAt => "PROJECT_CREATED_AT", "Creation timestamp, empty when unknown";
        UpdatedAt => "PROJECT_UPDATED_AT", "Last update timestamp, empty when unknown";
        ClosedAt => "PROJECT_CLOSED_AT", "Close timestamp, empty while open or unknown";
        AgeDays => "PROJECT_AGE_DAYS", "Days since the project was created, empty when unknown";
        DaysSinceUpdate => "PROJECT_DAYS_SINCE_UPDATE", "Days since the last update, empty when unknown";
        HasRecentActivity => "PROJECT_HAS_RECENT_ACTIVITY", "Updated within the last 30 days";
    }
}

/// A project board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub(crate) id: String,
    pub(crate) number: u64,
    pub(crate) title: String,
    pub(crate) owner: String,
    pub(crate) owner_type: OwnerKind,
    pub(crate) description: String,
    pub(crate) state: ItemState,
    pub(crate) visibility: Visibility,
    pub(crate) items_count: u64,
    pub(crate) fields_count: u64,
    pub(crate) url: String,
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) updated_at: Option<DateTime<Utc>>,
    pub(crate) closed_at: Option<DateTime<Utc>>,
}

impl Project {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn number(&self) -> u64 {
        self.number
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub const fn owner_type(&self) -> OwnerKind {
        self.owner_type
    }

    #[must_use]
    pub const fn state(&self) -> ItemState {
        self.state
    }

    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[must_use]
    pub const fn items_count(&self) -> u64 {
        self.items_count
    }

    #[must_use]
    pub const fn fields_count(&self) -> u64 {
        self.fields_count
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub const fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == ItemState::Closed
    }

    #[must_use]
    pub fn age_in_days(&self, now: DateTime<Utc>) -> Option<u64> {
        self.created_at.map(|created_at| age_in_days(now, created_at))
    }

    #[must_use]
    pub fn days_since_update(&self, now: DateTime<Utc>) -> Option<u64> {
        self.updated_at.map(|updated_at| days_since(now, updated_at))
    }

    /// Whether the project was updated within the last `days` days. Unknown update
    /// times never count as recent.
    #[must_use]
    pub fn has_recent_activity(&self, now: DateTime<Utc>, days: u64) -> bool {
        self.days_since_update(now).is_some_and(|elapsed| elapsed <= days)
    }
}

impl ToFactPairs for Project {
    fn to_fact_pairs(&self, now: DateTime<Utc>) -> FactPairs {
        let mut pairs = FactPairs::new();

        pairs.push(ProjectKey::Id, &self.id);
        pairs.push(ProjectKey::Number, self.number);
        pairs.push(ProjectKey::Title, &self.title);
        pairs.push(ProjectKey::Owner, &self.owner);
        pairs.push(ProjectKey::OwnerType, self.owner_type);
        pairs.push(ProjectKey::Description, &self.description);
        pairs.push(ProjectKey::State, self.state);
        pairs.push(ProjectKey::Visibility, self.visibility);
        pairs.push(ProjectKey::ItemsCount, self.items_count);
        pairs.push(ProjectKey::FieldsCount, self.fields_count);
        pairs.push(ProjectKey::Url, &self.url);
        pairs.push(ProjectKey::CreatedAt, self.created_at);
        pairs.push(ProjectKey::UpdatedAt, self.updated_at);
        pairs.push(ProjectKey::ClosedAt, self.closed_at);

        pairs.push(ProjectKey::AgeDays, self.age_in_days(now));
        pairs.push(ProjectKey::DaysSinceUpdate, self.days_since_update(now));
        pairs.push(ProjectKey::HasRecentActivity, self.has_recent_activity(now, RECENT_ACTIVITY_DAYS));

        pairs
    }
}
