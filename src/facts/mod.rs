//! Canonical value objects describing a source-control hosting site
//!
//! Every entity the pipeline understands (repository, issue, pull request, commit,
//! project, project item, activity metrics and project summary) has one immutable
//! record type here. Records are independent of the wire shape they were read from;
//! the [`adapters`](crate::adapters) module is responsible for building them.
//!
//! # Implementation Model
//!
//! Each record:
//! - Holds only validated, normalized fields (identity fields are always present)
//! - Exposes pure derived computations (ages, staleness, ratios) taking the reference
//!   instant as an explicit argument, so results are reproducible
//! - Implements [`ToFactPairs`], emitting exactly its declared key set on every call
//!
//! Enumerated fields use the small closed tag types in this module ([`ItemState`],
//! [`OwnerKind`], [`Visibility`], ...), each of which knows how to collapse the
//! various source spellings into one tag.
//!
//! Arithmetic shared by every record lives in [`time_math`].

mod activity_metrics;
mod commit;
mod entity_kind;
mod fact_pairs;
mod issue;
mod item_state;
mod owner_kind;
mod project;
mod project_item;
mod project_item_type;
mod project_summary;
mod pull_request;
mod pull_request_state;
mod repository;
pub mod time_math;
mod visibility;

pub use activity_metrics::{ActivityMetrics, ActivityMetricsKey, DEFAULT_PERIOD_DAYS};
pub use commit::{Commit, CommitKey};
pub use entity_kind::EntityKind;
pub use fact_pairs::{FactPairs, FactValue, ToFactPairs};
pub use issue::{Issue, IssueKey};
pub use item_state::ItemState;
pub use owner_kind::OwnerKind;
pub use project::{Project, ProjectKey};
pub use project_item::{FieldValue, ProjectItem, ProjectItemKey};
pub use project_item_type::ProjectItemType;
pub use project_summary::{ProjectSummary, ProjectSummaryKey};
pub use pull_request::{PullRequest, PullRequestKey};
pub use pull_request_state::PullRequestState;
pub use repository::{Repository, RepositoryKey};
pub use visibility::Visibility;
