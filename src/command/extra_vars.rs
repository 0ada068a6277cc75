use std::collections::{BTreeMap, HashMap};

use crate::error::{AnsibleError, ErrorCode, Result};

/// Extra variables for `--extra-vars`
///
/// A mapping renders as space-separated `key=value` pairs. A raw string is either a JSON
/// object, passed through untouched, or a `key=value` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtraVars {
    Map(Vec<(String, String)>),
    Raw(String),
}

impl ExtraVars {
    /// Render the option value, `None` when there is nothing to send
    pub fn render(&self) -> Result<Option<String>> {
        match self {
            ExtraVars::Map(pairs) => {
                if pairs.is_empty() {
                    return Ok(None);
                }
                let vars = pairs
                    .iter()
                    .map(|(key, value)| format!("{}={}", key, value))
                    .collect::<Vec<_>>()
                    .join(" ");
                Ok(Some(vars))
            }
            ExtraVars::Raw(raw) => {
                let raw = raw.trim();

                if raw.is_empty() {
                    return Ok(None);
                }

                if is_json_object(raw) || raw.contains('=') {
                    return Ok(Some(raw.to_string()));
                }

                Err(AnsibleError::validation_with_code(
                    ErrorCode::VALIDATION_INVALID_INPUT,
                    "The extra vars raw string should be in the \"key=value\" form.",
                    Some("extra_vars".to_string()),
                ))
            }
        }
    }
}

/// True when `value` parses as JSON and the document is an object
pub fn is_json_object(value: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(value).is_ok_and(|parsed| parsed.is_object())
}

impl From<&str> for ExtraVars {
    fn from(value: &str) -> Self {
        ExtraVars::Raw(value.to_string())
    }
}

impl From<String> for ExtraVars {
    fn from(value: String) -> Self {
        ExtraVars::Raw(value)
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for ExtraVars {
    fn from(pairs: Vec<(K, V)>) -> Self {
        ExtraVars::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for ExtraVars {
    fn from(pairs: [(K, V); N]) -> Self {
        ExtraVars::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> From<BTreeMap<K, V>> for ExtraVars {
    fn from(map: BTreeMap<K, V>) -> Self {
        ExtraVars::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Pairs are sorted by key since a `HashMap` has no stable order
impl<K: Into<String>, V: Into<String>> From<HashMap<K, V>> for ExtraVars {
    fn from(map: HashMap<K, V>) -> Self {
        let mut pairs: Vec<(String, String)> =
            map.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        pairs.sort();
        ExtraVars::Map(pairs)
    }
}

/// String values are used as-is; any other JSON value is rendered as JSON text
impl From<serde_json::Map<String, serde_json::Value>> for ExtraVars {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        ExtraVars::Map(
            map.into_iter()
                .map(|(k, v)| match v {
                    serde_json::Value::String(s) => (k, s),
                    other => (k, other.to_string()),
                })
                .collect(),
        )
    }
}
