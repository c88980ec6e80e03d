//! Resize/format directives attached to a single CDN image request.

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::domain::errors::ParamError;

/// Bytes `encodeURIComponent` leaves alone: alphanumerics and `-_.!~*'()`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes one query component the way browsers'
/// `encodeURIComponent` does.
fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, URI_COMPONENT).to_string()
}

/// Scalar value of a CDN parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer value (`w`, `h`, `q`, ...).
    Int(i64),
    /// String or enum-like value (`fit`, `crop`, `auto`, ...).
    Text(String),
}

impl ParamValue {
    /// Returns the integer value, if this is one.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// Returns the string value, if this is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Int(_) => None,
            Self::Text(s) => Some(s),
        }
    }

    /// Parses a raw CLI value: integers stay integers, anything else is text.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        raw.trim()
            .parse::<i64>()
            .map_or_else(|_| Self::Text(raw.to_string()), Self::Int)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Named collection of CDN directives.
///
/// Keys are kept sorted, so two sets with the same entries serialize the
/// same way regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet(BTreeMap<String, ParamValue>);

impl ParameterSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the set has no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a new set with `overrides` laid over `self`.
    /// Keys present in `overrides` win; every other key of `self` is kept.
    #[must_use]
    pub fn overlay(&self, overrides: &Self) -> Self {
        let mut merged = self.0.clone();
        for (key, value) in &overrides.0 {
            merged.insert(key.clone(), value.clone());
        }
        Self(merged)
    }

    /// Order-independent serialization used for cache keys. Keys and
    /// values are both encoded, so `&` and `=` inside them cannot shift
    /// pair boundaries.
    #[must_use]
    pub fn canonical_key(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    encode_component(k),
                    encode_component(&v.to_string())
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Query string in key order. Keys are written as-is; each value is
    /// percent-encoded on its own.
    #[must_use]
    pub fn to_query(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{k}={}", encode_component(&v.to_string())))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Parses a JSON object such as a `data-imgix-params` attribute.
    ///
    /// # Errors
    /// Returns [`ParamError::InvalidOverrideFormat`] if the input is not a
    /// JSON object of scalar values.
    pub fn from_json(raw: &str) -> Result<Self, ParamError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| ParamError::invalid(e.to_string()))?;

        let serde_json::Value::Object(map) = value else {
            return Err(ParamError::invalid("expected a JSON object"));
        };

        let mut params = Self::new();
        for (key, value) in map {
            let value = match value {
                serde_json::Value::Number(n) => n
                    .as_i64()
                    .map_or_else(|| ParamValue::Text(n.to_string()), ParamValue::Int),
                serde_json::Value::String(s) => ParamValue::Text(s),
                serde_json::Value::Bool(b) => ParamValue::Text(b.to_string()),
                other => {
                    return Err(ParamError::invalid(format!(
                        "unsupported value for '{key}': {other}"
                    )));
                }
            };
            params.0.insert(key, value);
        }

        Ok(params)
    }

    /// Parses a single `key=value` pair.
    ///
    /// # Errors
    /// Returns [`ParamError::InvalidOverrideFormat`] if there is no `=` or
    /// the key is empty.
    pub fn parse_pair(raw: &str) -> Result<(String, ParamValue), ParamError> {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| ParamError::invalid(format!("expected key=value, got '{raw}'")))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ParamError::invalid(format!("empty key in '{raw}'")));
        }
        Ok((key.to_string(), ParamValue::parse(value)))
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_override_wins() {
        let catalog = ParameterSet::new().with("w", 800).with("q", 80).with("fit", "crop");
        let overrides = ParameterSet::new().with("w", 1920);

        let merged = catalog.overlay(&overrides);

        assert_eq!(merged.get("w"), Some(&ParamValue::Int(1920)));
        assert_eq!(merged.get("q"), Some(&ParamValue::Int(80)));
        assert_eq!(merged.get("fit"), Some(&ParamValue::from("crop")));
        // catalog entry untouched
        assert_eq!(catalog.get("w"), Some(&ParamValue::Int(800)));
    }

    #[test]
    fn test_canonical_key_is_order_independent() {
        let a = ParameterSet::new().with("w", 800).with("q", 75);
        let b = ParameterSet::new().with("q", 75).with("w", 800);

        assert_eq!(a.canonical_key(), b.canonical_key());
        assert_eq!(a.canonical_key(), "q=75&w=800");
    }

    #[test]
    fn test_canonical_key_separates_reserved_characters() {
        let packed = ParameterSet::new().with("txt", "1&w=2");
        let split = ParameterSet::new().with("txt", 1).with("w", 2);

        assert_ne!(packed.canonical_key(), split.canonical_key());
        assert_eq!(packed.canonical_key(), "txt=1%26w%3D2");
    }

    #[test]
    fn test_to_query_encodes_values_only() {
        let params = ParameterSet::new()
            .with("txt", "Hello World")
            .with("mark", "a~b!(c)*'d")
            .with("auto", "format,compress");

        assert_eq!(
            params.to_query(),
            "auto=format%2Ccompress&mark=a~b!(c)*'d&txt=Hello%20World"
        );
    }

    #[test]
    fn test_from_json_scalars() {
        let params =
            ParameterSet::from_json(r#"{"w": 640, "fit": "max", "dpr": 1.5, "trim": true}"#)
                .unwrap();

        assert_eq!(params.get("w"), Some(&ParamValue::Int(640)));
        assert_eq!(params.get("fit"), Some(&ParamValue::from("max")));
        assert_eq!(params.get("dpr"), Some(&ParamValue::from("1.5")));
        assert_eq!(params.get("trim"), Some(&ParamValue::from("true")));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(ParameterSet::from_json("{w: 640").is_err());
        assert!(ParameterSet::from_json("[1, 2]").is_err());
        assert!(ParameterSet::from_json(r#"{"w": [1]}"#).is_err());
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            ParameterSet::parse_pair("w=400").unwrap(),
            ("w".to_string(), ParamValue::Int(400))
        );
        assert_eq!(
            ParameterSet::parse_pair("crop=faces,entropy").unwrap(),
            ("crop".to_string(), ParamValue::from("faces,entropy"))
        );
        assert!(ParameterSet::parse_pair("novalue").is_err());
        assert!(ParameterSet::parse_pair("=1").is_err());
    }

    #[test]
    fn test_toml_roundtrip_keeps_types() {
        let params: ParameterSet = toml::from_str("auto = \"format,compress\"\nq = 75\n").unwrap();
        assert_eq!(params.get("q"), Some(&ParamValue::Int(75)));
        assert_eq!(params.get("auto"), Some(&ParamValue::from("format,compress")));
    }
}
