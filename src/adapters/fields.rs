//! Field extraction helpers shared by every adapter.
//!
//! Payload fields are addressed by dotted paths (`owner.login`), and most lookups take a
//! list of alternative paths tried in order, which is how the per-source spellings of one
//! field (`created_at`, `createdAt`) are resolved. JSON `null` is treated as absent
//! everywhere.

use super::{LOG_TARGET, NormalizeError, SourceKind};
use crate::facts::EntityKind;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Full name reported when neither the payload nor its URLs identify the repository.
pub const UNKNOWN_FULL_NAME: &str = "unknown/unknown";

static REPOS_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/repos/([^/\s]+)/([^/\s?#]+)").expect("repository URL pattern should be a valid regular expression")
});

/// The JSON shape a required field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A string, possibly empty
    Text,

    /// A non-empty string or a number
    Id,

    /// A non-negative integer, or a string holding one
    Integer,

    /// An RFC 3339 timestamp or a plain `YYYY-MM-DD` date
    Timestamp,

    /// A JSON object
    Object,
}

impl Shape {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Text => value.is_string(),
            Self::Id => value.is_number() || value.as_str().is_some_and(|s| !s.is_empty()),
            Self::Integer => as_u64(value).is_some(),
            Self::Timestamp => parse_timestamp(value).is_some(),
            Self::Object => value.is_object(),
        }
    }

    const fn expectation(self) -> &'static str {
        match self {
            Self::Text => "is not a string",
            Self::Id => "is not a non-empty string or number",
            Self::Integer => "is not a non-negative integer",
            Self::Timestamp => "is not a valid timestamp",
            Self::Object => "is not an object",
        }
    }
}

/// A JSON object being read on behalf of one entity and source.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
    entity: EntityKind,
    format: SourceKind,
}

impl<'a> Fields<'a> {
    /// Wrap `value`, failing with a shape error unless it is a JSON object.
    pub fn object(value: &'a Value, entity: EntityKind, format: SourceKind) -> Result<Self, NormalizeError> {
        match value {
            Value::Object(map) => Ok(Self { map, entity, format }),
            _ => Err(NormalizeError::InvalidShape { entity, format }),
        }
    }

    #[must_use]
    pub const fn entity(&self) -> EntityKind {
        self.entity
    }

    #[must_use]
    pub const fn format(&self) -> SourceKind {
        self.format
    }

    /// Resolve a dotted path; `null` counts as absent.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&'a Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.map.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }

        (!current.is_null()).then_some(current)
    }

    /// The first of `paths` that resolves.
    #[must_use]
    pub fn first(&self, paths: &[&str]) -> Option<&'a Value> {
        paths.iter().find_map(|path| self.lookup(path))
    }

    /// The object at the first of `paths` that resolves to one.
    #[must_use]
    pub fn nested(&self, paths: &[&str]) -> Option<Self> {
        paths.iter().find_map(|path| match self.lookup(path)? {
            Value::Object(map) => Some(Self {
                map,
                entity: self.entity,
                format: self.format,
            }),
            _ => None,
        })
    }

    /// Check that every required field is present and has the expected shape.
    ///
    /// Each spec is a `|`-separated list of alternative paths; the first alternative names
    /// the field in the error, and the first alternative that resolves is the one checked.
    /// All missing fields are reported together; otherwise the first field of the wrong
    /// shape is reported.
    pub fn require(&self, specs: &[(&str, Shape)]) -> Result<(), NormalizeError> {
        let mut missing = Vec::new();
        let mut invalid = None;

        for &(spec, shape) in specs {
            match spec.split('|').find_map(|path| Some((path, self.lookup(path)?))) {
                None => missing.push(spec.split('|').next().unwrap_or(spec).to_string()),
                Some((path, value)) if !shape.accepts(value) => {
                    let _ = invalid.get_or_insert_with(|| self.invalid(path, shape.expectation()));
                }
                Some(_) => {}
            }
        }

        if !missing.is_empty() {
            return Err(self.missing(missing));
        }

        invalid.map_or(Ok(()), Err)
    }

    #[must_use]
    pub fn str(&self, paths: &[&str]) -> Option<&'a str> {
        paths.iter().find_map(|path| self.lookup(path)?.as_str())
    }

    /// The first string among `paths`, or the empty string.
    #[must_use]
    pub fn string(&self, paths: &[&str]) -> String {
        self.str(paths).unwrap_or_default().to_string()
    }

    /// The first non-empty string among `paths`.
    #[must_use]
    pub fn opt_string(&self, paths: &[&str]) -> Option<String> {
        paths
            .iter()
            .find_map(|path| self.lookup(path)?.as_str().filter(|s| !s.is_empty()))
            .map(str::to_string)
    }

    /// An identifier given either as a string or as a number.
    #[must_use]
    pub fn id(&self, paths: &[&str]) -> Option<String> {
        paths.iter().find_map(|path| match self.lookup(path)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    /// A non-negative integer given as a number or a numeric string.
    #[must_use]
    pub fn u64(&self, paths: &[&str]) -> Option<u64> {
        paths.iter().find_map(|path| as_u64(self.lookup(path)?))
    }

    /// A count given as a number, a `{ "totalCount": n }` wrapper, or a list whose length
    /// is the count.
    #[must_use]
    pub fn count(&self, paths: &[&str]) -> Option<u64> {
        paths.iter().find_map(|path| {
            let value = self.lookup(path)?;
            match value {
                Value::Array(items) => Some(items.len() as u64),
                Value::Object(map) => map.get("totalCount").and_then(as_u64).or_else(|| {
                    let items = collection(value);
                    (!items.is_empty()).then_some(items.len() as u64)
                }),
                _ => as_u64(value),
            }
        })
    }

    #[must_use]
    pub fn bool(&self, paths: &[&str]) -> Option<bool> {
        paths.iter().find_map(|path| self.lookup(path)?.as_bool())
    }

    /// The first timestamp among `paths`; present but unparsable values are an error.
    pub fn timestamp(&self, paths: &[&str]) -> Result<Option<DateTime<Utc>>, NormalizeError> {
        for path in paths {
            if let Some(value) = self.lookup(path) {
                return parse_timestamp(value)
                    .map(Some)
                    .ok_or_else(|| self.invalid(path, "is not a valid timestamp"));
            }
        }

        Ok(None)
    }

    pub fn required_timestamp(&self, paths: &[&str]) -> Result<DateTime<Utc>, NormalizeError> {
        self.timestamp(paths)?
            .ok_or_else(|| self.missing(vec![paths.first().copied().unwrap_or_default().to_string()]))
    }

    /// The elements of the first list among `paths` (see [`collection`]).
    #[must_use]
    pub fn items(&self, paths: &[&str]) -> Vec<&'a Value> {
        paths
            .iter()
            .filter_map(|path| self.lookup(path))
            .map(collection)
            .find(|items| !items.is_empty())
            .unwrap_or_default()
    }

    /// The first list among `paths`, flattened to strings (see [`string_list`]).
    #[must_use]
    pub fn strings(&self, paths: &[&str], item_keys: &[&str]) -> Vec<String> {
        string_list(&self.items(paths), item_keys)
    }

    #[must_use]
    pub fn invalid(&self, field: &str, reason: &str) -> NormalizeError {
        NormalizeError::InvalidField {
            entity: self.entity,
            format: self.format,
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub const fn missing(&self, fields: Vec<String>) -> NormalizeError {
        NormalizeError::MissingFields {
            entity: self.entity,
            format: self.format,
            fields,
        }
    }

    /// Iterate the raw members of the object.
    pub fn members(&self) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.map.iter().map(|(key, value)| (key.as_str(), value))
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let text = value.as_str()?.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// The elements of a list given as a plain array, a `{ "nodes": [...] }` wrapper, an
/// `{ "edges": [{ "node": ... }] }` wrapper, or an `{ "items": [...] }` wrapper.
#[must_use]
pub fn collection(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().filter(|item| !item.is_null()).collect(),
        Value::Object(map) => {
            if let Some(Value::Array(nodes)) = map.get("nodes") {
                nodes.iter().filter(|node| !node.is_null()).collect()
            } else if let Some(Value::Array(edges)) = map.get("edges") {
                edges.iter().filter_map(|edge| edge.get("node")).filter(|node| !node.is_null()).collect()
            } else if let Some(Value::Array(items)) = map.get("items") {
                items.iter().filter(|item| !item.is_null()).collect()
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    }
}

/// Flatten list elements to strings: strings are taken as-is, objects contribute the first
/// string member named in `item_keys`. Empty strings are dropped.
#[must_use]
pub fn string_list(items: &[&Value], item_keys: &[&str]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.as_str()),
            Value::Object(map) => item_keys.iter().find_map(|key| map.get(*key)?.as_str()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extract `owner/name` from an API URL containing `/repos/{owner}/{name}`.
#[must_use]
pub fn full_name_from_url(url: &str) -> Option<String> {
    let captures = REPOS_URL_PATTERN.captures(url)?;
    Some(format!("{}/{}", captures.get(1)?.as_str(), captures.get(2)?.as_str()))
}

/// Resolve a repository full name through the usual fallback chain: an explicit full
/// name, then any URL carrying `/repos/{owner}/{name}`.
///
/// Returns [`UNKNOWN_FULL_NAME`] when nothing identifies the repository.
#[must_use]
pub fn resolve_full_name(fields: &Fields<'_>, full_name_paths: &[&str], url_paths: &[&str]) -> String {
    if let Some(full_name) = fields.opt_string(full_name_paths) {
        return full_name;
    }

    if let Some(full_name) = url_paths.iter().filter_map(|path| fields.str(&[*path])).find_map(full_name_from_url) {
        return full_name;
    }

    log::warn!(
        target: LOG_TARGET,
        "Could not determine the repository of a {} payload from {} source, reporting '{UNKNOWN_FULL_NAME}'",
        fields.entity(),
        fields.format()
    );
    UNKNOWN_FULL_NAME.to_string()
}

/// Unwrap a GraphQL response down to the entity's node.
///
/// Accepts the bare node or a `{ "data": ... }` envelope, then descends into the first of
/// `node_paths` that resolves to an object. A non-empty `errors` list without usable
/// data is reported as an upstream failure.
pub fn unwrap_graphql<'a>(value: &'a Value, node_paths: &[&str], entity: EntityKind) -> Result<Fields<'a>, NormalizeError> {
    let format = SourceKind::GraphQl;
    let envelope = Fields::object(value, entity, format)?;

    let data = envelope.lookup("data");
    let first_error = envelope
        .items(&["errors"])
        .first()
        .map(|error| error.get("message").and_then(Value::as_str).unwrap_or("unknown error").to_string());

    if let Some(message) = first_error {
        if data.is_none_or(|data| data.as_object().is_none_or(|map| map.values().all(Value::is_null))) {
            return Err(NormalizeError::Upstream { entity, format, message });
        }

        log::warn!(target: LOG_TARGET, "GraphQL response for {entity} carries partial errors: {message}");
    }

    let root = match data {
        Some(data) => Fields::object(data, entity, format)?,
        None => envelope,
    };

    Ok(root.nested(node_paths).unwrap_or(root))
}
