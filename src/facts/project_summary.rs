use super::time_math::{gini, percentage, ratio};
use super::{FactPairs, ItemState, Project, ProjectItem, ProjectItemType, ToFactPairs};
use crate::keys::fact_keys;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Status bucket for items without a status value.
pub const NO_STATUS: &str = "No Status";

fact_keys! {
    /// Keys emitted by [`ProjectSummary`].
    pub enum ProjectSummaryKey in "PROJECT_SUMMARY" {
        ProjectId => "PROJECT_SUMMARY_PROJECT_ID", "Node identifier of the summarized project";
        ProjectNumber => "PROJECT_SUMMARY_PROJECT_NUMBER", "Number of the summarized project";
        ProjectTitle => "PROJECT_SUMMARY_PROJECT_TITLE", "Title of the summarized project";
        Owner => "PROJECT_SUMMARY_OWNER", "Login of the project owner";
        State => "PROJECT_SUMMARY_STATE", "Project state: open or closed";
        DeclaredItems => "PROJECT_SUMMARY_DECLARED_ITEMS", "Item count declared by the project";
        TotalItems => "PROJECT_SUMMARY_TOTAL_ITEMS", "Items actually summarized";
        IssueItems => "PROJECT_SUMMARY_ISSUE_ITEMS", "Items wrapping issues";
        PullRequestItems => "PROJECT_SUMMARY_PULL_REQUEST_ITEMS", "Items wrapping pull requests";
        DraftItems => "PROJECT_SUMMARY_DRAFT_ITEMS", "Draft issue items";
        RedactedItems => "PROJECT_SUMMARY_REDACTED_ITEMS", "Items whose content is not visible";
        DoneItems => "PROJECT_SUMMARY_DONE_ITEMS", "Items whose work is finished";
        OpenItems => "PROJECT_SUMMARY_OPEN_ITEMS", "Items whose work is not finished";
        ArchivedItems => "PROJECT_SUMMARY_ARCHIVED_ITEMS", "Archived items";
        StatusBreakdown => "PROJECT_SUMMARY_STATUS_BREAKDOWN", "Comma-separated status:count pairs sorted by status";
        Repositories => "PROJECT_SUMMARY_REPOSITORIES", "Comma-separated distinct repositories of the items";
        RepositoryCount => "PROJECT_SUMMARY_REPOSITORY_COUNT", "Number of distinct repositories of the items";
        Assignees => "PROJECT_SUMMARY_ASSIGNEES", "Comma-separated distinct assignees of the items";
        AssigneeCount => "PROJECT_SUMMARY_ASSIGNEE_COUNT", "Number of distinct assignees of the items";
        LastUpdatedAt => "PROJECT_SUMMARY_LAST_UPDATED_AT", "Most recent update of the project or its items, empty when unknown";
        CompletionRatio => "PROJECT_SUMMARY_COMPLETION_RATIO", "Done items as a whole percentage of summarized items";
        ItemsPerRepository => "PROJECT_SUMMARY_ITEMS_PER_REPOSITORY", "Items per distinct repository, two decimals";
        AssigneeWorkloadGini => "PROJECT_SUMMARY_ASSIGNEE_WORKLOAD_GINI", "Gini coefficient of open items across assignees, two decimals";
    }
}

/// A project board together with statistics over its items.
///
/// Holds copies of scalar facts extracted from the project and its items, never the
/// records themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub(crate) project_id: String,
    pub(crate) project_number: u64,
    pub(crate) project_title: String,
    pub(crate) owner: String,
    pub(crate) state: ItemState,
    pub(crate) declared_items: u64,
    pub(crate) total_items: u64,
    pub(crate) items_by_type: BTreeMap<ProjectItemType, u64>,
    pub(crate) done_items: u64,
    pub(crate) archived_items: u64,
    pub(crate) status_counts: BTreeMap<String, u64>,
    pub(crate) repositories: BTreeSet<String>,
    pub(crate) open_items_by_assignee: BTreeMap<String, u64>,
    pub(crate) last_updated_at: Option<DateTime<Utc>>,
}

impl ProjectSummary {
    /// Summarize a project and the items fetched for it.
    #[must_use]
    pub fn from_parts(project: &Project, items: &[ProjectItem]) -> Self {
        let mut items_by_type = BTreeMap::new();
        let mut status_counts = BTreeMap::new();
        let mut repositories = BTreeSet::new();
        let mut open_items_by_assignee = BTreeMap::new();
        let mut done_items = 0;
        let mut archived_items = 0;
        let mut last_updated_at = project.updated_at();

        for item in items {
            *items_by_type.entry(item.item_type()).or_insert(0) += 1;

            let status = item.status().map_or_else(|| NO_STATUS.to_string(), str::to_string);
            *status_counts.entry(status).or_insert(0) += 1;

            if let Some(repository) = item.repository() {
                let _ = repositories.insert(repository.to_string());
            }

            let done = item.is_done();
            if done {
                done_items += 1;
            }

            for assignee in item.assignees() {
                let open = open_items_by_assignee.entry(assignee.clone()).or_insert(0);
                if !done {
                    *open += 1;
                }
            }

            if item.is_archived() {
                archived_items += 1;
            }

            last_updated_at = last_updated_at.max(item.updated_at());
        }

        Self {
            project_id: project.id().to_string(),
            project_number: project.number(),
            project_title: project.title().to_string(),
            owner: project.owner().to_string(),
            state: project.state(),
            declared_items: project.items_count(),
            total_items: items.len() as u64,
            items_by_type,
            done_items,
            archived_items,
            status_counts,
            repositories,
            open_items_by_assignee,
            last_updated_at,
        }
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    #[must_use]
    pub fn project_title(&self) -> &str {
        &self.project_title
    }

    #[must_use]
    pub const fn total_items(&self) -> u64 {
        self.total_items
    }

    #[must_use]
    pub const fn declared_items(&self) -> u64 {
        self.declared_items
    }

    #[must_use]
    pub fn items_of_type(&self, item_type: ProjectItemType) -> u64 {
        self.items_by_type.get(&item_type).copied().unwrap_or(0)
    }

    #[must_use]
    pub const fn done_items(&self) -> u64 {
        self.done_items
    }

    #[must_use]
    pub const fn open_items(&self) -> u64 {
        self.total_items.saturating_sub(self.done_items)
    }

    #[must_use]
    pub const fn archived_items(&self) -> u64 {
        self.archived_items
    }

    /// Item counts per status value, sorted by status.
    #[must_use]
    pub const fn status_counts(&self) -> &BTreeMap<String, u64> {
        &self.status_counts
    }

    #[must_use]
    pub const fn repositories(&self) -> &BTreeSet<String> {
        &self.repositories
    }

    #[must_use]
    pub fn assignees(&self) -> impl Iterator<Item = &str> {
        self.open_items_by_assignee.keys().map(String::as_str)
    }

    #[must_use]
    pub const fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        self.last_updated_at
    }

    #[must_use]
    pub fn completion_ratio(&self) -> f64 {
        percentage(self.done_items, self.total_items)
    }

    #[must_use]
    pub fn items_per_repository(&self) -> f64 {
        ratio(self.total_items, self.repositories.len() as u64)
    }

    /// How unevenly open work is spread across assignees.
    #[must_use]
    pub fn assignee_workload_gini(&self) -> f64 {
        let workloads: Vec<u64> = self.open_items_by_assignee.values().copied().collect();
        gini(&workloads)
    }

    fn render_status_breakdown(&self) -> String {
        self.status_counts
            .iter()
            .map(|(status, count)| format!("{status}:{count}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl ToFactPairs for ProjectSummary {
    fn to_fact_pairs(&self, _now: DateTime<Utc>) -> FactPairs {
        let mut pairs = FactPairs::new();

        pairs.push(ProjectSummaryKey::ProjectId, &self.project_id);
        pairs.push(ProjectSummaryKey::ProjectNumber, self.project_number);
        pairs.push(ProjectSummaryKey::ProjectTitle, &self.project_title);
        pairs.push(ProjectSummaryKey::Owner, &self.owner);
        pairs.push(ProjectSummaryKey::State, self.state);
        pairs.push(ProjectSummaryKey::DeclaredItems, self.declared_items);
        pairs.push(ProjectSummaryKey::TotalItems, self.total_items);
        pairs.push(ProjectSummaryKey::IssueItems, self.items_of_type(ProjectItemType::Issue));
        pairs.push(ProjectSummaryKey::PullRequestItems, self.items_of_type(ProjectItemType::PullRequest));
        pairs.push(ProjectSummaryKey::DraftItems, self.items_of_type(ProjectItemType::DraftIssue));
        pairs.push(ProjectSummaryKey::RedactedItems, self.items_of_type(ProjectItemType::Redacted));
        pairs.push(ProjectSummaryKey::DoneItems, self.done_items);
        pairs.push(ProjectSummaryKey::OpenItems, self.open_items());
        pairs.push(ProjectSummaryKey::ArchivedItems, self.archived_items);
        pairs.push(ProjectSummaryKey::StatusBreakdown, self.render_status_breakdown());
        pairs.push(ProjectSummaryKey::Repositories, self.repositories.iter().cloned().collect::<Vec<_>>());
        pairs.push(ProjectSummaryKey::RepositoryCount, self.repositories.len() as u64);
        pairs.push(ProjectSummaryKey::Assignees, self.assignees().map(str::to_string).collect::<Vec<_>>());
        pairs.push(ProjectSummaryKey::AssigneeCount, self.open_items_by_assignee.len() as u64);
        pairs.push(ProjectSummaryKey::LastUpdatedAt, self.last_updated_at);

        pairs.push(ProjectSummaryKey::CompletionRatio, self.completion_ratio());
        pairs.push(ProjectSummaryKey::ItemsPerRepository, self.items_per_repository());
        pairs.push(ProjectSummaryKey::AssigneeWorkloadGini, self.assignee_workload_gini());

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{OwnerKind, PullRequestState, Visibility};
    use crate::keys::FactKey;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn project() -> Project {
        Project {
            id: "PVT_1".to_string(),
            number: 1,
            title: "Roadmap".to_string(),
            owner: "acme".to_string(),
            owner_type: OwnerKind::Organization,
            description: String::new(),
            state: ItemState::Open,
            visibility: Visibility::Public,
            items_count: 5,
            fields_count: 4,
            url: String::new(),
            created_at: None,
            updated_at: Some(at(2024, 3, 1)),
            closed_at: None,
        }
    }

    fn item(id: &str, item_type: ProjectItemType, status: Option<&str>, repository: Option<&str>, assignees: &[&str]) -> ProjectItem {
        ProjectItem {
            id: id.to_string(),
            item_type,
            title: id.to_string(),
            content_number: None,
            content_state: None,
            content_url: String::new(),
            repository: repository.map(str::to_string),
            status: status.map(str::to_string),
            field_values: Vec::new(),
            assignees: assignees.iter().map(|a| (*a).to_string()).collect(),
            labels: Vec::new(),
            is_archived: false,
            created_at: None,
            updated_at: None,
        }
    }

    fn items() -> Vec<ProjectItem> {
        let mut merged = item("c", ProjectItemType::PullRequest, Some("In Review"), Some("acme/api"), &["bob"]);
        merged.content_state = Some(PullRequestState::Merged);
        merged.updated_at = Some(at(2024, 4, 1));

        vec![
            item("a", ProjectItemType::Issue, Some("Todo"), Some("acme/web"), &["alice"]),
            item("b", ProjectItemType::Issue, Some("Done"), Some("acme/web"), &["alice", "bob"]),
            merged,
            item("d", ProjectItemType::DraftIssue, None, None, &["alice"]),
        ]
    }

    #[test]
    fn test_counts() {
        let summary = ProjectSummary::from_parts(&project(), &items());
        assert_eq!(summary.total_items(), 4);
        assert_eq!(summary.declared_items(), 5);
        assert_eq!(summary.items_of_type(ProjectItemType::Issue), 2);
        assert_eq!(summary.items_of_type(ProjectItemType::PullRequest), 1);
        assert_eq!(summary.items_of_type(ProjectItemType::DraftIssue), 1);
        assert_eq!(summary.items_of_type(ProjectItemType::Redacted), 0);
        assert_eq!(summary.done_items(), 2);
        assert_eq!(summary.open_items(), 2);
    }

    #[test]
    fn test_status_breakdown_and_distinct_sets() {
        let summary = ProjectSummary::from_parts(&project(), &items());
        let pairs = summary.to_fact_pairs(at(2024, 5, 1));
        assert_eq!(
            pairs.get("PROJECT_SUMMARY_STATUS_BREAKDOWN"),
            Some("Done:1,In Review:1,No Status:1,Todo:1")
        );
        assert_eq!(pairs.get("PROJECT_SUMMARY_REPOSITORIES"), Some("acme/api,acme/web"));
        assert_eq!(pairs.get("PROJECT_SUMMARY_ASSIGNEES"), Some("alice,bob"));
        assert_eq!(pairs.get("PROJECT_SUMMARY_LAST_UPDATED_AT"), Some("2024-04-01T00:00:00Z"));
    }

    #[test]
    fn test_derived_ratios() {
        let summary = ProjectSummary::from_parts(&project(), &items());
        assert!((summary.completion_ratio() - 50.0).abs() < f64::EPSILON);
        assert!((summary.items_per_repository() - 2.0).abs() < f64::EPSILON);
        // alice holds both open items, bob none
        assert!((summary.assignee_workload_gini() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_project() {
        let summary = ProjectSummary::from_parts(&project(), &[]);
        assert_eq!(summary.total_items(), 0);
        assert!(summary.completion_ratio().abs() < f64::EPSILON);
        assert!(summary.items_per_repository().abs() < f64::EPSILON);
        assert!(summary.assignee_workload_gini().abs() < f64::EPSILON);

        let pairs = summary.to_fact_pairs(at(2024, 5, 1));
        assert_eq!(pairs.get("PROJECT_SUMMARY_STATUS_BREAKDOWN"), Some(""));
    }

    #[test]
    fn test_fact_pairs_emit_every_key_in_order() {
        let pairs = ProjectSummary::from_parts(&project(), &items()).to_fact_pairs(at(2024, 5, 1));
        let keys: Vec<_> = pairs.keys().collect();
        let declared: Vec<_> = ProjectSummaryKey::all().iter().map(|key| key.name()).collect();
        assert_eq!(keys, declared);
    }
}
