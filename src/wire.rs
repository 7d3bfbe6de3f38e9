//! Adapters for Zabbix wire quirks.
//!
//! The API encodes most numbers as JSON strings ("0", "10050"), and
//! renders empty maps as `[]`. Decoding stays tolerant of both forms;
//! encoding always produces the stringly form the server expects.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};
use serde_with::{DeserializeAs, SerializeAs};

/// An integer carried as a JSON string on the wire.
pub(crate) struct Stringly;

impl SerializeAs<i32> for Stringly {
    fn serialize_as<S>(value: &i32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }
}

impl<'de> DeserializeAs<'de, i32> for Stringly {
    fn deserialize_as<D>(deserializer: D) -> Result<i32, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Int(n) => i32::try_from(n).map_err(D::Error::custom),
            Raw::Str(s) => s.trim().parse().map_err(D::Error::custom),
        }
    }
}

/// Decodes a string map, accepting the `[]` the server emits when empty.
pub(crate) fn object_or_empty_list<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Map(BTreeMap<String, String>),
        List(Vec<serde_json::Value>),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Map(map) => Ok(map),
        Raw::List(list) if list.is_empty() => Ok(BTreeMap::new()),
        Raw::List(_) => Err(D::Error::custom("expected an object or an empty array")),
    }
}
