//! Attribute mappings and their inline `(% ... %)` form.
//!
//! Block and inline events carry a [`Parameters`] mapping. Keys are unique and
//! keep the order in which they were inserted, so that a document parsed from
//! XWiki syntax renders its parameters back in the order they were written.

use std::fmt::Write;

/// Ordered attribute mapping attached to an event.
///
/// Inserting an existing key replaces its value in place. Equality compares
/// the mappings as sets of pairs, so two parameter sets holding the same
/// entries in a different order are equal.
#[derive(Clone, Debug, Default)]
pub struct Parameters {
    entries: Vec<(String, String)>,
}

impl Parameters {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value for `key`.
    ///
    /// Returns the previous value if the key was present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        if let Some((_, existing)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(existing, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up the value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl PartialEq for Parameters {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for Parameters {}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut parameters = Self::new();
        for (key, value) in iter {
            parameters.insert(key, value);
        }
        parameters
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Parameters {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Parameters;

    impl Serialize for Parameters {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (key, value) in self.iter() {
                map.serialize_entry(key, value)?;
            }
            map.end()
        }
    }

    struct ParametersVisitor;

    impl<'de> Visitor<'de> for ParametersVisitor {
        type Value = Parameters;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of string parameters")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut parameters = Parameters::new();
            while let Some((key, value)) = access.next_entry::<String, String>()? {
                parameters.insert(key, value);
            }
            Ok(parameters)
        }
    }

    impl<'de> Deserialize<'de> for Parameters {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_map(ParametersVisitor)
        }
    }
}

/// Format `parameters` as `(% key="value" ... %)`.
///
/// Empty parameters format to an empty string so callers never emit a stray
/// separator. `trailing_newline` appends `\n` after the closing `%)`.
pub fn format_parameters(parameters: &Parameters, trailing_newline: bool) -> String {
    if parameters.is_empty() {
        return String::new();
    }

    let mut out = String::from("(%");
    for (key, value) in parameters.iter() {
        write!(out, r#" {key}="{value}""#).unwrap();
    }
    out.push_str(" %)");
    if trailing_newline {
        out.push('\n');
    }
    out
}

/// Format `parameters` as space separated `key="value"` pairs.
///
/// Shared by macro invocations and link parameters, which carry no `(% %)`
/// wrapper.
pub(crate) fn format_pairs(parameters: &Parameters) -> String {
    let mut out = String::new();
    for (index, (key, value)) in parameters.iter().enumerate() {
        if index > 0 {
            out.push(' ');
        }
        write!(out, r#"{key}="{value}""#).unwrap();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut params = Parameters::new();
        params.insert("a", "1");
        params.insert("b", "2");
        assert_eq!(params.insert("a", "3"), Some("1".to_owned()));

        let entries: Vec<_> = params.iter().collect();
        assert_eq!(entries, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_equality_ignores_order() {
        let left = Parameters::from([("a", "1"), ("b", "2")]);
        let right = Parameters::from([("b", "2"), ("a", "1")]);
        assert_eq!(left, right);

        let different = Parameters::from([("a", "1"), ("b", "3")]);
        assert_ne!(left, different);

        let shorter = Parameters::from([("a", "1")]);
        assert_ne!(left, shorter);
    }

    #[test]
    fn test_remove() {
        let mut params = Parameters::from([("a", "1"), ("refresh", "1")]);
        assert_eq!(params.remove("refresh"), Some("1".to_owned()));
        assert_eq!(params.remove("missing"), None);
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_format_empty_is_noop() {
        assert_eq!(format_parameters(&Parameters::new(), true), "");
        assert_eq!(format_parameters(&Parameters::new(), false), "");
    }

    #[test]
    fn test_format_single() {
        let params = Parameters::from([("class", "note")]);
        assert_eq!(format_parameters(&params, false), r#"(% class="note" %)"#);
        assert_eq!(format_parameters(&params, true), "(% class=\"note\" %)\n");
    }

    #[test]
    fn test_format_keeps_insertion_order() {
        let params = Parameters::from([("style", "color:red"), ("class", "x")]);
        assert_eq!(
            format_parameters(&params, false),
            r#"(% style="color:red" class="x" %)"#
        );
    }

    #[test]
    fn test_format_pairs() {
        assert_eq!(format_pairs(&Parameters::new()), "");
        let params = Parameters::from([("a", "1"), ("b", "two")]);
        assert_eq!(format_pairs(&params), r#"a="1" b="two""#);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_preserves_document_order() {
        let params: Parameters = serde_json::from_str(r#"{"z": "1", "a": "2"}"#).unwrap();
        let keys: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a"]);

        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"z":"1","a":"2"}"#);
    }
}
