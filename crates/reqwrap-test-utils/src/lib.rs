//! Test utilities for reqwrap crates.

use serde_json::{json, Map, Value};
use wiremock::ResponseTemplate;

/// Backend envelope `{data, msg, type}`.
pub fn envelope(data: Value, msg: &str, code: i64) -> Value {
    json!({ "data": data, "msg": msg, "type": code })
}

/// HTTP 200 response carrying `body` as JSON.
pub fn json_response(body: &Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// JSON object as a payload map.
///
/// Panics when `value` is not an object.
pub fn payload(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// A local URL nothing is listening on.
pub fn unused_local_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind a free port");
    let port = listener
        .local_addr()
        .expect("Failed to read local address")
        .port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// Assert that a Result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a Result is Err and return the error.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_envelope_shape() {
        let body = envelope(json!({"id": 1}), "ok", 200);
        assert_eq!(body["data"]["id"], 1);
        assert_eq!(body["msg"], "ok");
        assert_eq!(body["type"], 200);
    }

    #[test]
    fn test_payload_from_object() {
        let map = payload(json!({"a": 1}));
        assert_eq!(map.get("a"), Some(&json!(1)));
    }

    #[test]
    #[should_panic(expected = "expected a JSON object")]
    fn test_payload_rejects_array() {
        payload(json!([1]));
    }

    #[test]
    fn test_unused_local_url_refuses_connections() {
        let url = unused_local_url();
        let addr = url.trim_start_matches("http://");
        assert!(std::net::TcpStream::connect(addr).is_err());
    }

    #[test]
    fn test_assert_macros() {
        let ok: Result<u8, String> = Ok(3);
        assert_eq!(assert_ok!(ok), 3);

        let err: Result<u8, String> = Err("boom".to_string());
        assert_eq!(assert_err!(err), "boom");
    }

    proptest! {
        #[test]
        fn test_envelope_keeps_code(code in any::<i64>(), msg in "\\PC{0,16}") {
            let body = envelope(Value::Null, &msg, code);
            prop_assert_eq!(body["type"].as_i64(), Some(code));
            prop_assert_eq!(body["msg"].as_str(), Some(msg.as_str()));
        }
    }
}
