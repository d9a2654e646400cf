use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The closed set of entities the pipeline can normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[value(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EntityKind {
    /// A repository
    Repository,

    /// An issue
    Issue,

    /// A pull request
    PullRequest,

    /// A commit
    Commit,

    /// A project board
    Project,

    /// One item of a project board
    ProjectItem,

    /// Activity statistics of a repository over a period
    ActivityMetrics,

    /// A project board together with its items
    ProjectSummary,
}
