//! Request parameter maps for `*.get`, `*.create` and friends.

use serde::Serialize;
use serde_json::{Map, Value};

/// A JSON object passed as the `params` member of an API call.
///
/// Zabbix expects `params` to be an object for most methods; the
/// [`params!`](crate::params!) macro is the usual way to build one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inserts a key, replacing any previous value under the same name.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Sets `output: "extend"` unless the caller already chose an output mode.
    #[must_use]
    pub(crate) fn with_output_extend(mut self) -> Self {
        self.0
            .entry("output")
            .or_insert_with(|| Value::String("extend".to_string()));
        self
    }

    pub(crate) fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Builds a [`Params`] object with `serde_json::json!` syntax.
///
/// ```
/// use zabbix_api::params;
///
/// let p = params! {
///     "hostids": "10050",
///     "limit": 5,
/// };
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::new()
    };
    ($($body:tt)+) => {
        match $crate::_serde_json::json!({ $($body)+ }) {
            $crate::_serde_json::Value::Object(map) => $crate::Params::from(map),
            _ => ::std::unreachable!(),
        }
    };
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::Params;
    use serde_json::{Value, json};

    #[test]
    fn macro_builds_an_object() {
        let p = params! {
            "hostids": ["10050", "10051"],
            "limit": 5,
        };
        let encoded = serde_json::to_value(&p).unwrap();
        assert_eq!(encoded, json!({"hostids": ["10050", "10051"], "limit": 5}));
    }

    #[test]
    fn empty_macro_is_empty_object() {
        let p = params! {};
        assert!(p.is_empty());
        assert_eq!(serde_json::to_value(&p).unwrap(), json!({}));
    }

    #[test]
    fn output_extend_fills_only_when_missing() {
        let p = Params::new().with_output_extend();
        assert_eq!(
            serde_json::to_value(&p).unwrap(),
            json!({"output": "extend"})
        );

        let mut chosen = Params::new();
        chosen.insert("output", json!(["name"]));
        let chosen = chosen.with_output_extend();
        assert_eq!(
            serde_json::to_value(&chosen).unwrap(),
            json!({"output": ["name"]})
        );
    }

    #[test]
    fn insert_replaces_existing_key() {
        let mut p = Params::new();
        p.insert("limit", 1);
        p.insert("limit", 2);
        assert_eq!(serde_json::to_value(&p).unwrap(), json!({"limit": 2}));
        assert_eq!(
            serde_json::to_value(Params::new()).unwrap(),
            Value::Object(serde_json::Map::new())
        );
    }
}
