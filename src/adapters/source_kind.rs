use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The wire shape a raw payload was produced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, Display, EnumString, EnumIter)]
pub enum SourceKind {
    /// JSON printed by the hosting site's command-line tool (flat, camelCase)
    #[value(name = "tool")]
    #[serde(rename = "tool")]
    #[strum(serialize = "tool")]
    ToolOutput,

    /// A REST API response (nested, `snake_case`)
    #[value(name = "rest")]
    #[serde(rename = "rest")]
    #[strum(serialize = "rest")]
    Rest,

    /// A GraphQL API response (`nodes`/`totalCount` idioms, optional `data` envelope)
    #[value(name = "graphql")]
    #[serde(rename = "graphql")]
    #[strum(serialize = "graphql")]
    GraphQl,
}
