//! Request body construction.

use crate::descriptor::{BodyKind, CallDescriptor};
use crate::error::RequestError;
use reqwest::multipart::Form;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Content types sent with encoded bodies.
pub mod content_types {
    /// JSON body.
    pub const JSON: &str = "application/json; charset=UTF-8";
    /// Form-urlencoded body.
    pub const FORM: &str = "application/x-www-form-urlencoded; charset=UTF-8";
}

/// Body ready to be attached to a request.
#[derive(Debug)]
pub enum PreparedBody {
    /// No body and no content type.
    Empty,
    /// Encoded text body with its content type.
    Text {
        content_type: &'static str,
        body: String,
    },
    /// Multipart body; the transport sets the boundary header.
    Multipart(Form),
}

/// Build the body for `descriptor`.
///
/// A multipart factory takes precedence over the body kind.
pub fn build_body(descriptor: &CallDescriptor) -> Result<PreparedBody, RequestError> {
    if let Some(form) = descriptor.form_data() {
        return Ok(PreparedBody::Multipart(form));
    }

    Ok(match descriptor.body_kind {
        BodyKind::Json => PreparedBody::Text {
            content_type: content_types::JSON,
            body: encode_json(&descriptor.data)?,
        },
        BodyKind::Form => PreparedBody::Text {
            content_type: content_types::FORM,
            body: encode_form(&descriptor.data),
        },
        BodyKind::None => PreparedBody::Empty,
    })
}

/// Compact JSON text of the payload.
pub fn encode_json(data: &Map<String, Value>) -> Result<String, RequestError> {
    serde_json::to_string(data).map_err(RequestError::Encode)
}

/// `key=value` pairs joined with `&`, skipping null values.
///
/// Keys and values are percent-encoded with [`encode_component`]. Values
/// are stringified by [`form_value`].
pub fn encode_form(data: &Map<String, Value>) -> String {
    data.iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            format!(
                "{}={}",
                encode_component(key),
                encode_component(&form_value(value))
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn encode_component(input: &str) -> String {
    urlencoding::encode(input)
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%2A", "*")
}

/// Text form of a payload value.
///
/// Strings are used verbatim. Array elements are stringified and joined
/// with `,`, with nulls as empty strings. Objects use their compact JSON
/// text, anything else its JSON literal.
pub fn form_value(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Null => Cow::Borrowed(""),
        Value::Array(items) => Cow::Owned(
            items
                .iter()
                .map(|item| form_value(item).into_owned())
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Cow::Owned(other.to_string()),
    }
}
