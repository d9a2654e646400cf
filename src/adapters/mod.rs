//! Construction of value objects from raw hosting payloads
//!
//! A payload arrives in one of three wire shapes ([`SourceKind`]): the command-line
//! tool's JSON, a REST response, or a GraphQL response. Every value object in
//! [`facts`](crate::facts) implements [`FromSource`] with one constructor per shape.
//!
//! # Implementation Model
//!
//! Each constructor follows the same steps:
//!
//! 1. **Shape validation**: the payload must be a JSON object ([`NormalizeError::InvalidShape`]).
//! 2. **Required-field validation**: every missing identity field is reported at once
//!    ([`NormalizeError::MissingFields`]).
//! 3. **Extraction**, grouped into small identity, relationship and temporal steps, each
//!    resolving every field through an ordered chain of alternative source spellings.
//! 4. **Synonym normalization** into the closed tag types.
//! 5. **Construction** of the immutable record.
//!
//! Missing optional fields never fail; they take their documented default. The low-level
//! lookups shared by every adapter live in [`Fields`].
//!
//! [`normalize`] ties the pieces together for callers that select the entity at runtime.

mod activity_metrics;
mod commit;
mod fields;
mod issue;
mod normalize_error;
mod project;
mod project_item;
mod project_summary;
mod pull_request;
mod repository;
mod source_context;
mod source_kind;

pub use fields::{Fields, Shape, UNKNOWN_FULL_NAME, collection, full_name_from_url};
pub use normalize_error::NormalizeError;
pub use source_context::SourceContext;
pub use source_kind::SourceKind;

use crate::facts::{
    ActivityMetrics, Commit, EntityKind, FactPairs, Issue, Project, ProjectItem, ProjectSummary, PullRequest, Repository, ToFactPairs,
};
use chrono::{DateTime, Utc};
use serde_json::Value;

const LOG_TARGET: &str = "  adapters";

/// Construction of a value object from any of the three source shapes.
pub trait FromSource: Sized {
    /// The entity this type represents.
    const KIND: EntityKind;

    /// Build from the command-line tool's JSON output.
    fn from_tool_output(payload: &Value, context: &SourceContext) -> Result<Self, NormalizeError>;

    /// Build from a REST API response.
    fn from_rest_response(payload: &Value, context: &SourceContext) -> Result<Self, NormalizeError>;

    /// Build from a GraphQL API response, with or without its `data` envelope.
    fn from_graphql_response(payload: &Value, context: &SourceContext) -> Result<Self, NormalizeError>;

    /// Build from a payload of the given shape.
    fn from_source(format: SourceKind, payload: &Value, context: &SourceContext) -> Result<Self, NormalizeError> {
        let result = match format {
            SourceKind::ToolOutput => Self::from_tool_output(payload, context),
            SourceKind::Rest => Self::from_rest_response(payload, context),
            SourceKind::GraphQl => Self::from_graphql_response(payload, context),
        };

        match &result {
            Ok(_) => log::debug!(target: LOG_TARGET, "Normalized {} payload from {format} source", Self::KIND),
            Err(e) => log::debug!(target: LOG_TARGET, "Could not normalize {} payload from {format} source: {e}", Self::KIND),
        }

        result
    }
}

/// Build the value object of kind `entity` from `payload` and serialize it.
///
/// `now` is the reference instant for derived time computations.
pub fn normalize(
    entity: EntityKind,
    format: SourceKind,
    payload: &Value,
    context: &SourceContext,
    now: DateTime<Utc>,
) -> Result<FactPairs, NormalizeError> {
    fn build<T: FromSource + ToFactPairs>(
        format: SourceKind,
        payload: &Value,
        context: &SourceContext,
        now: DateTime<Utc>,
    ) -> Result<FactPairs, NormalizeError> {
        T::from_source(format, payload, context).map(|value| value.to_fact_pairs(now))
    }

    match entity {
        EntityKind::Repository => build::<Repository>(format, payload, context, now),
        EntityKind::Issue => build::<Issue>(format, payload, context, now),
        EntityKind::PullRequest => build::<PullRequest>(format, payload, context, now),
        EntityKind::Commit => build::<Commit>(format, payload, context, now),
        EntityKind::Project => build::<Project>(format, payload, context, now),
        EntityKind::ProjectItem => build::<ProjectItem>(format, payload, context, now),
        EntityKind::ActivityMetrics => build::<ActivityMetrics>(format, payload, context, now),
        EntityKind::ProjectSummary => build::<ProjectSummary>(format, payload, context, now),
    }
}
