use serde::Serialize;
use serde_json::{Map, Value};

/// Body posted to the service's `/mcp` dispatch endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RequestEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    pub id: String,
    pub method: String,
    pub params: Map<String, Value>,
}

impl RequestEnvelope {
    pub fn new(id: impl Into<String>, method: impl Into<String>) -> Self {
        RequestEnvelope {
            jsonrpc: None,
            id: id.into(),
            method: method.into(),
            params: Map::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_jsonrpc(mut self, version: Option<&str>) -> Self {
        self.jsonrpc = version.map(str::to_string);
        self
    }
}

/// Lenient view of a dispatch response, used for logging only.
///
/// Fields are read through `Value::get` so that a member of an unexpected
/// type never hides the others. The printed output always comes from the
/// raw `Value`, never from this struct.
#[derive(Debug, Default)]
pub struct ResponseView {
    pub id: Option<Value>,
    pub result: Option<Value>,
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Result,
    Error,
    Unrecognized,
}

impl ResponseView {
    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| value.get(key).cloned();
        ResponseView {
            id: field("id"),
            result: field("result"),
            error: field("error").filter(|e| !e.is_null()),
        }
    }

    /// A non-null `error` of any shape wins over `result`.
    pub fn outcome(&self) -> Outcome {
        match (&self.error, &self.result) {
            (Some(_), _) => Outcome::Error,
            (None, Some(_)) => Outcome::Result,
            (None, None) => Outcome::Unrecognized,
        }
    }

    pub fn error_code(&self) -> Option<i64> {
        self.error.as_ref()?.get("code")?.as_i64()
    }

    /// `error.message`, or the error itself when it is a bare string.
    pub fn error_message(&self) -> Option<&str> {
        match self.error.as_ref()? {
            Value::String(s) => Some(s.as_str()),
            other => other.get("message")?.as_str(),
        }
    }

    /// Whether the echoed id matches `request_id`. A string id and a numeric id
    /// with the same text are treated as equal. `None` when the response has no id.
    pub fn echoes(&self, request_id: &str) -> Option<bool> {
        match self.id.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s == request_id),
            other => Some(other.to_string() == request_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_wire_shape() {
        let req = RequestEnvelope::new("1", "add").param("a", 5).param("b", 3.5);
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(
            body,
            json!({"id": "1", "method": "add", "params": {"a": 5, "b": 3.5}})
        );
        // jsonrpc is not emitted unless configured
        assert!(body.get("jsonrpc").is_none());
    }

    #[test]
    fn test_envelope_empty_params_is_object() {
        let body = serde_json::to_value(RequestEnvelope::new("2", "getSystemInfo")).unwrap();
        assert_eq!(body["params"], json!({}));
    }

    #[test]
    fn test_envelope_with_jsonrpc() {
        let req = RequestEnvelope::new("4", "unknownMethod").with_jsonrpc(Some("2.0"));
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["jsonrpc"], "2.0");
    }

    #[test]
    fn test_outcome_classification() {
        let ok = ResponseView::from_value(&json!({"id": "1", "result": {"result": 8.5}}));
        assert_eq!(ok.outcome(), Outcome::Result);

        let err = ResponseView::from_value(&json!({
            "jsonrpc": "2.0",
            "id": "4",
            "result": null,
            "error": {"code": 500, "message": "unknown method: unknownMethod", "data": null}
        }));
        assert_eq!(err.outcome(), Outcome::Error);
        assert_eq!(err.error_code(), Some(500));
        assert_eq!(err.error_message(), Some("unknown method: unknownMethod"));

        // Non-object bodies still produce a view
        let odd = ResponseView::from_value(&json!([1, 2, 3]));
        assert_eq!(odd.outcome(), Outcome::Unrecognized);
    }

    #[test]
    fn test_fields_of_unexpected_type_do_not_hide_the_rest() {
        let bare = ResponseView::from_value(&json!({"id": "x", "error": "Method not found"}));
        assert_eq!(bare.outcome(), Outcome::Error);
        assert_eq!(bare.error_message(), Some("Method not found"));
        assert_eq!(bare.error_code(), None);
        assert_eq!(bare.echoes("1"), Some(false));

        let odd_code = ResponseView::from_value(&json!({
            "jsonrpc": 2,
            "id": "1",
            "error": {"code": "E_UNKNOWN", "message": "nope"}
        }));
        assert_eq!(odd_code.outcome(), Outcome::Error);
        assert_eq!(odd_code.error_code(), None);
        assert_eq!(odd_code.error_message(), Some("nope"));
        assert_eq!(odd_code.echoes("1"), Some(true));

        // A null error next to a result is a success
        let ok = ResponseView::from_value(&json!({"id": "2", "result": {"os": "linux"}, "error": null}));
        assert_eq!(ok.outcome(), Outcome::Result);
    }

    #[test]
    fn test_id_echo() {
        let view = ResponseView::from_value(&json!({"id": "3", "result": {}}));
        assert_eq!(view.echoes("3"), Some(true));
        assert_eq!(view.echoes("4"), Some(false));

        let numeric = ResponseView::from_value(&json!({"id": 3, "result": {}}));
        assert_eq!(numeric.echoes("3"), Some(true));

        let missing = ResponseView::from_value(&json!({"result": {}}));
        assert_eq!(missing.echoes("3"), None);
    }
}
