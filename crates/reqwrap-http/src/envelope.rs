//! Response envelope and business-status classification.

use crate::error::RequestError;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Envelope `type` that marks business success.
pub const SUCCESS_TYPE: i64 = 200;

/// Body returned by the backend on every JSON endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T> {
    /// Payload, `null` when the backend omits it.
    pub data: T,
    /// Backend message, empty when missing or `null`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub msg: String,
    /// Business status code, unrelated to the HTTP status.
    #[serde(rename = "type")]
    pub code: i64,
}

/// Successful result of a call.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    /// Parsed envelope with a success `type`.
    Envelope(ResponseEnvelope<T>),
    /// Raw body, returned when the call asked for a blob.
    Blob(Bytes),
}

impl<T> Reply<T> {
    /// The envelope, `None` for a blob.
    pub fn into_envelope(self) -> Option<ResponseEnvelope<T>> {
        match self {
            Self::Envelope(envelope) => Some(envelope),
            Self::Blob(_) => None,
        }
    }

    /// The raw body, `None` for an envelope.
    pub fn into_blob(self) -> Option<Bytes> {
        match self {
            Self::Blob(bytes) => Some(bytes),
            Self::Envelope(_) => None,
        }
    }

    /// Whether this is a raw body.
    pub fn is_blob(&self) -> bool {
        matches!(self, Self::Blob(_))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Envelope `type` as an integer.
///
/// Integral floats such as `200.0` compare equal to their integer value.
pub fn type_code(body: &Value) -> Option<i64> {
    let code = body.get("type")?;
    code.as_i64().or_else(|| {
        code.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Classify a parsed 2xx body by its `type` field.
///
/// Anything other than [`SUCCESS_TYPE`], including a missing `type`, is a
/// business error carrying the body untouched. A success body without
/// `data` decodes as if `data` were `null`.
pub fn classify<T: DeserializeOwned>(
    status: u16,
    mut body: Value,
) -> Result<ResponseEnvelope<T>, RequestError> {
    if type_code(&body) != Some(SUCCESS_TYPE) {
        return Err(RequestError::business(body));
    }

    let raw = body.to_string();
    if let Value::Object(map) = &mut body {
        map.entry("data").or_insert(Value::Null);
        map.insert("type".to_string(), Value::from(SUCCESS_TYPE));
    }

    serde_json::from_value(body).map_err(|source| RequestError::Decode {
        status,
        body: raw,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: u64,
    }

    #[test]
    fn test_success_envelope() {
        let body = json!({"data": {"id": 1}, "msg": "ok", "type": 200});
        let envelope: ResponseEnvelope<Value> = classify(200, body.clone()).unwrap();

        assert_eq!(envelope.code, SUCCESS_TYPE);
        assert_eq!(envelope.msg, "ok");
        assert_eq!(serde_json::to_value(&envelope).unwrap(), body);
    }

    #[test]
    fn test_success_envelope_typed() {
        let body = json!({"data": {"id": 7}, "msg": "ok", "type": 200});
        let envelope: ResponseEnvelope<User> = classify(200, body).unwrap();
        assert_eq!(envelope.data, User { id: 7 });
    }

    #[test]
    fn test_unauthorized_type_is_business_error() {
        let body = json!({"data": null, "msg": "fail", "type": 401});
        let err = classify::<Value>(200, body.clone()).unwrap_err();

        assert_eq!(err.kind(), Some(ErrorKind::Business));
        assert_eq!(err.envelope(), Some(&body));
    }

    #[test]
    fn test_missing_type_is_business_error() {
        let body = json!({"data": [1, 2]});
        let err = classify::<Value>(200, body).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Business));
    }

    #[test]
    fn test_success_with_wrong_data_shape_is_decode_error() {
        let body = json!({"data": "not a user", "msg": "ok", "type": 200});
        let err = classify::<User>(201, body).unwrap_err();
        assert!(matches!(err, RequestError::Decode { status: 201, .. }));
        assert!(!err.is_classified());
    }

    #[test]
    fn test_success_without_data_is_null() {
        let body = json!({"msg": "ok", "type": 200});
        let envelope: ResponseEnvelope<Value> = classify(200, body).unwrap();
        assert_eq!(envelope.data, Value::Null);
        assert_eq!(envelope.msg, "ok");

        let envelope: ResponseEnvelope<Option<User>> =
            classify(200, json!({"type": 200})).unwrap();
        assert_eq!(envelope.data, None);
    }

    #[test]
    fn test_null_msg_is_empty() {
        let body = json!({"data": 1, "msg": null, "type": 200});
        let envelope: ResponseEnvelope<Value> = classify(200, body).unwrap();
        assert_eq!(envelope.msg, "");
        assert_eq!(envelope.data, json!(1));
    }

    #[test]
    fn test_integral_float_type() {
        assert_eq!(type_code(&json!({"type": 200.0})), Some(200));
        assert_eq!(type_code(&json!({"type": 401.0})), Some(401));
        assert_eq!(type_code(&json!({"type": 200.5})), None);
        assert_eq!(type_code(&json!({"type": "200"})), None);

        let envelope: ResponseEnvelope<Value> =
            classify(200, json!({"data": 1, "msg": "ok", "type": 200.0})).unwrap();
        assert_eq!(envelope.code, SUCCESS_TYPE);

        let err = classify::<Value>(200, json!({"msg": "denied", "type": 403.0})).unwrap_err();
        assert_eq!(err.http_status_or_business_code(), 403);
    }

    #[test]
    fn test_reply_accessors() {
        let blob: Reply<Value> = Reply::Blob(Bytes::from_static(b"%PDF"));
        assert!(blob.is_blob());
        assert_eq!(blob.clone().into_blob(), Some(Bytes::from_static(b"%PDF")));
        assert!(blob.into_envelope().is_none());
    }
}
