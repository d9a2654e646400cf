use super::time_math::format_timestamp;
use crate::keys::FactKey;
use chrono::{DateTime, Utc};

/// The ordered key/value pairs emitted by one value object.
///
/// Keys can only be pushed through a [`FactKey`] enum, so every key is a member of the
/// registry. Values are rendered to their canonical text form on insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactPairs {
    pairs: Vec<(&'static str, String)>,
}

impl FactPairs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<K: FactKey>(&mut self, key: K, value: impl FactValue) {
        self.pairs.push((key.name(), value.render()));
    }

    /// Look up the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(name, _)| *name == key).map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.pairs.iter().map(|(key, value)| (*key, value.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        self.pairs.iter().map(|(key, _)| *key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl IntoIterator for FactPairs {
    type Item = (&'static str, String);
    type IntoIter = std::vec::IntoIter<(&'static str, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

/// Serialization of a value object into its declared key set.
pub trait ToFactPairs {
    /// Emit every declared key of the object, in a fixed order.
    ///
    /// `now` is the reference instant for derived time computations.
    fn to_fact_pairs(&self, now: DateTime<Utc>) -> FactPairs;
}

/// A field value with a canonical single-line text rendering.
///
/// Absent optional values render as the empty string.
pub trait FactValue {
    fn render(&self) -> String;
}

impl<T: FactValue + ?Sized> FactValue for &T {
    fn render(&self) -> String {
        (**self).render()
    }
}

impl<T: FactValue> FactValue for Option<T> {
    fn render(&self) -> String {
        self.as_ref().map(FactValue::render).unwrap_or_default()
    }
}

impl FactValue for str {
    fn render(&self) -> String {
        self.to_string()
    }
}

impl FactValue for String {
    fn render(&self) -> String {
        self.clone()
    }
}

impl FactValue for [String] {
    fn render(&self) -> String {
        self.join(",")
    }
}

impl FactValue for Vec<String> {
    fn render(&self) -> String {
        self.as_slice().render()
    }
}

impl FactValue for DateTime<Utc> {
    fn render(&self) -> String {
        format_timestamp(*self)
    }
}

macro_rules! display_fact_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FactValue for $ty {
                fn render(&self) -> String {
                    self.to_string()
                }
            }
        )+
    };
}

display_fact_value!(
    u64,
    u32,
    usize,
    i64,
    bool,
    f64,
    super::ItemState,
    super::OwnerKind,
    super::Visibility,
    super::PullRequestState,
    super::ProjectItemType,
    super::EntityKind,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::GenericKey;
    use chrono::TimeZone;

    #[test]
    fn test_push_and_get() {
        let mut pairs = FactPairs::new();
        pairs.push(GenericKey::Id, "42");
        pairs.push(GenericKey::Count, 3_u64);

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs.get("ID"), Some("42"));
        assert_eq!(pairs.get("COUNT"), Some("3"));
        assert_eq!(pairs.get("NAME"), None);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut pairs = FactPairs::new();
        pairs.push(GenericKey::Name, "n");
        pairs.push(GenericKey::Id, "i");
        pairs.push(GenericKey::Valid, true);

        let keys: Vec<_> = pairs.keys().collect();
        assert_eq!(keys, vec!["NAME", "ID", "VALID"]);
    }

    #[test]
    fn test_render_absent_is_empty() {
        let value: Option<String> = None;
        assert_eq!(value.render(), "");

        let count: Option<u64> = None;
        assert_eq!(count.render(), "");
    }

    #[test]
    fn test_render_list_joined_with_commas() {
        let labels = vec!["bug".to_string(), "help wanted".to_string()];
        assert_eq!(labels.render(), "bug,help wanted");
        assert_eq!(Vec::<String>::new().render(), "");
    }

    #[test]
    fn test_render_floats() {
        assert_eq!(33.0_f64.render(), "33");
        assert_eq!(0.67_f64.render(), "0.67");
        assert_eq!(0.0_f64.render(), "0");
    }

    #[test]
    fn test_render_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(ts.render(), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_render_bool() {
        assert_eq!(true.render(), "true");
        assert_eq!(false.render(), "false");
    }
}
