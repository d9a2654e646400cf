//! The closed registry of serialization keys
//!
//! Every key that can appear in the flat `KEY=value` output is declared here or
//! next to the value object that emits it. Keys are upper-snake-case identifiers,
//! unique across the whole registry.
//!
//! # Implementation Model
//!
//! Each value object owns a key enum produced by the [`fact_keys!`] macro. The enum
//! is a closed set: a value object can only push keys of its own enum into its
//! [`FactPairs`](crate::facts::FactPairs), so a stray literal key cannot be written
//! by mistake. A handful of cross-cutting keys (status, error fields, counts) live in
//! [`GenericKey`].
//!
//! The [`ResultAggregator`](crate::aggregator::ResultAggregator) also accepts keys as
//! plain strings; those are checked at runtime with [`is_valid_key`].

mod generic_key;

pub use generic_key::GenericKey;

use crate::facts::{
    ActivityMetricsKey, CommitKey, IssueKey, ProjectItemKey, ProjectKey, ProjectSummaryKey, PullRequestKey, RepositoryKey,
};
use regex::Regex;
use std::sync::LazyLock;

static KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").expect("key pattern should be a valid regular expression"));

/// A member of one namespace of the key registry.
pub trait FactKey: Copy + Eq + 'static {
    /// Prefix shared by every key of the namespace, without the trailing underscore.
    /// Empty for the generic namespace.
    const NAMESPACE: &'static str;

    /// Every key of the namespace, in serialization order.
    fn all() -> &'static [Self];

    /// The upper-snake-case key name.
    fn name(self) -> &'static str;

    /// Human-readable explanation of the value stored under this key.
    fn description(self) -> &'static str;
}

/// Declares a closed key enum and its [`FactKey`] implementation.
macro_rules! fact_keys {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident in $namespace:literal {
            $( $variant:ident => $key:literal, $description:literal; )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $variant, )+
        }

        impl $crate::keys::FactKey for $name {
            const NAMESPACE: &'static str = $namespace;

            fn all() -> &'static [Self] {
                &[$( Self::$variant, )+]
            }

            fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $key, )+
                }
            }

            fn description(self) -> &'static str {
                match self {
                    $( Self::$variant => $description, )+
                }
            }
        }
    };
}

pub(crate) use fact_keys;

/// One row of the key registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInfo {
    pub namespace: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// Returns `true` if `key` follows the key naming discipline: an uppercase ASCII letter
/// followed by uppercase letters, digits or underscores.
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    KEY_PATTERN.is_match(key)
}

fn namespace_infos<K: FactKey>() -> impl Iterator<Item = KeyInfo> {
    K::all().iter().map(|&key| KeyInfo {
        namespace: K::NAMESPACE,
        name: key.name(),
        description: key.description(),
    })
}

/// Iterate the full key registry, generic keys first.
pub fn registry() -> impl Iterator<Item = KeyInfo> {
    namespace_infos::<GenericKey>()
        .chain(namespace_infos::<RepositoryKey>())
        .chain(namespace_infos::<IssueKey>())
        .chain(namespace_infos::<PullRequestKey>())
        .chain(namespace_infos::<CommitKey>())
        .chain(namespace_infos::<ProjectKey>())
        .chain(namespace_infos::<ProjectItemKey>())
        .chain(namespace_infos::<ActivityMetricsKey>())
        .chain(namespace_infos::<ProjectSummaryKey>())
}
