use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Result;
use crate::error::Error;
use crate::params::Params;

const BODY_PREVIEW_LIMIT: usize = 256;

/// The `params` member of an outgoing request.
///
/// Zabbix accepts an object for most methods and an array for bulk
/// methods such as `*.create`; anything else is rejected locally before
/// a request is sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestParams {
    Object(Map<String, Value>),
    Array(Vec<Value>),
}

impl RequestParams {
    /// Encodes any serializable value as request parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidField`] when the value encodes to a scalar
    /// and [`Error::Json`] when encoding itself fails.
    pub fn from_serialize<T>(value: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_value(value) {
            Ok(Value::Object(map)) => Ok(Self::Object(map)),
            Ok(Value::Array(items)) => Ok(Self::Array(items)),
            Ok(other) => Err(Error::InvalidField {
                field: "params",
                message: format!("expected an object or an array, got {}", value_kind(&other)),
            }),
            Err(err) => Err(Error::Json {
                message: format!("error encoding params: {err}"),
            }),
        }
    }
}

impl From<Params> for RequestParams {
    fn from(params: Params) -> Self {
        Self::Object(params.into_map())
    }
}

impl From<Map<String, Value>> for RequestParams {
    fn from(map: Map<String, Value>) -> Self {
        Self::Object(map)
    }
}

impl From<Vec<Value>> for RequestParams {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

#[derive(Serialize)]
pub(super) struct RpcRequest<'a> {
    pub(crate) jsonrpc: &'static str,
    pub(crate) method: &'a str,
    pub(crate) params: &'a RequestParams,
    pub(crate) id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) auth: Option<&'a str>,
}

/// A decoded response envelope. Well-formed servers set exactly one of
/// `result` and `error`; both stay observable here.
#[derive(Debug, Deserialize)]
pub struct RpcEnvelope {
    pub jsonrpc: String,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
    #[serde(default)]
    pub id: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<String>,
}

pub(super) fn body_preview(body: &[u8]) -> String {
    if body.is_empty() {
        return "<empty>".to_string();
    }
    let end = body.len().min(BODY_PREVIEW_LIMIT);
    let mut preview = String::from_utf8_lossy(&body[..end]).to_string();
    if body.len() > BODY_PREVIEW_LIMIT {
        preview.push_str("...");
    }
    preview.replace('\n', "\\n")
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::{RequestParams, RpcRequest, body_preview};
    use crate::error::Error;
    use crate::params;

    #[test]
    fn request_round_trips_through_bytes() {
        let params = RequestParams::from(params! { "limit": 1 });
        let request = RpcRequest {
            jsonrpc: "2.0",
            method: "host.get",
            params: &params,
            id: 7,
            auth: Some("deadbeef"),
        };
        let bytes = serde_json::to_vec(&request).unwrap();
        let decoded: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            decoded,
            json!({
                "jsonrpc": "2.0",
                "method": "host.get",
                "params": {"limit": 1},
                "id": 7,
                "auth": "deadbeef",
            })
        );
    }

    #[test]
    fn request_omits_absent_auth() {
        let params = RequestParams::from(params! {});
        let request = RpcRequest {
            jsonrpc: "2.0",
            method: "apiinfo.version",
            params: &params,
            id: 1,
            auth: None,
        };
        let encoded = serde_json::to_value(&request).unwrap();
        assert!(encoded.get("auth").is_none());
    }

    #[test]
    fn from_serialize_accepts_slices_and_maps() {
        let array = RequestParams::from_serialize(&["10050", "10051"]).unwrap();
        assert_eq!(
            serde_json::to_value(&array).unwrap(),
            json!(["10050", "10051"])
        );

        #[derive(serde::Serialize)]
        struct Filter<'a> {
            host: &'a str,
        }
        let object = RequestParams::from_serialize(&Filter { host: "web-01" }).unwrap();
        assert_eq!(serde_json::to_value(&object).unwrap(), json!({"host": "web-01"}));
    }

    #[test]
    fn from_serialize_rejects_scalars() {
        let err = RequestParams::from_serialize("just a string").unwrap_err();
        match err {
            Error::InvalidField { field, message } => {
                assert_eq!(field, "params");
                assert!(message.contains("a string"), "message: {message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn body_preview_truncates_and_escapes() {
        assert_eq!(body_preview(b""), "<empty>");
        assert_eq!(body_preview(b"line\nbreak"), "line\\nbreak");

        let long = vec![b'x'; 300];
        let preview = body_preview(&long);
        assert_eq!(preview.len(), 256 + 3);
        assert!(preview.ends_with("..."));
    }
}
