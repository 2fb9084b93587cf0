//! Call descriptors and call options.

use crate::error::RequestError;
use reqwest::multipart::Form;
use reqwest::Method;
use reqwrap_common_config::Server;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Builds a fresh multipart body for every attempt.
pub type FormDataFactory = Arc<dyn Fn() -> Form + Send + Sync>;

/// How the payload data is encoded into the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    /// No body.
    #[default]
    None,
    /// JSON object body.
    Json,
    /// `application/x-www-form-urlencoded` body.
    Form,
}

/// Description of one API call.
#[derive(Clone)]
pub struct CallDescriptor {
    /// Server-relative path, appended verbatim to the base URL.
    pub path: String,
    /// HTTP method.
    pub method: Method,
    /// How `data` is encoded.
    pub body_kind: BodyKind,
    /// Payload fields, in insertion order.
    pub data: Map<String, Value>,
    form_data: Option<FormDataFactory>,
}

impl CallDescriptor {
    /// Call with no body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            body_kind: BodyKind::None,
            data: Map::new(),
            form_data: None,
        }
    }

    /// `GET` call.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST` call.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Send `data` as a JSON body.
    pub fn json(self, data: Map<String, Value>) -> Self {
        self.body(BodyKind::Json, data)
    }

    /// Send `data` as a form-urlencoded body.
    pub fn form(self, data: Map<String, Value>) -> Self {
        self.body(BodyKind::Form, data)
    }

    /// Set the body kind and payload data.
    pub fn body(mut self, kind: BodyKind, data: Map<String, Value>) -> Self {
        self.body_kind = kind;
        self.data = data;
        self
    }

    /// Use any serializable value as payload data.
    ///
    /// The value must serialize to a JSON object; `null` means no fields.
    pub fn payload<T: Serialize>(mut self, kind: BodyKind, value: &T) -> Result<Self, RequestError> {
        let data = match serde_json::to_value(value).map_err(RequestError::Encode)? {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(RequestError::Encode(serde::ser::Error::custom(format!(
                    "payload must serialize to a JSON object, got {}",
                    json_type_name(&other)
                ))))
            }
        };
        self.body_kind = kind;
        self.data = data;
        Ok(self)
    }

    /// Send a multipart body built by `factory` instead of encoding `data`.
    pub fn multipart<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Form + Send + Sync + 'static,
    {
        self.form_data = Some(Arc::new(factory));
        self
    }

    /// Whether the call uploads a multipart body.
    pub fn has_file_data(&self) -> bool {
        self.form_data.is_some()
    }

    /// Build the multipart body, if any.
    pub fn form_data(&self) -> Option<Form> {
        self.form_data.as_ref().map(|factory| factory())
    }
}

impl fmt::Debug for CallDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallDescriptor")
            .field("path", &self.path)
            .field("method", &self.method)
            .field("body_kind", &self.body_kind)
            .field("data", &self.data)
            .field("has_file_data", &self.has_file_data())
            .finish()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Per-call options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CallOptions {
    /// Attach the stored token to the call.
    pub need_login: bool,
    /// Target server, the configured default when `None`.
    pub server: Option<Server>,
    /// Return the raw body instead of a parsed envelope.
    pub return_blob: bool,
    /// Re-issue the call after classified failures.
    pub auto_retry: bool,
    /// Retries allowed after the first attempt.
    pub auto_retry_limit: Option<u32>,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            need_login: true,
            server: None,
            return_blob: false,
            auto_retry: false,
            auto_retry_limit: None,
        }
    }
}

impl CallOptions {
    /// Default options: login required, no retry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Target a specific server.
    pub fn server(mut self, server: Server) -> Self {
        self.server = Some(server);
        self
    }

    /// Whether to attach the bearer token.
    pub fn need_login(mut self, need_login: bool) -> Self {
        self.need_login = need_login;
        self
    }

    /// Return the raw body instead of an envelope.
    pub fn return_blob(mut self, return_blob: bool) -> Self {
        self.return_blob = return_blob;
        self
    }

    /// Enable auto retry with the given limit, or the executor default.
    pub fn auto_retry(mut self, limit: Option<u32>) -> Self {
        self.auto_retry = true;
        self.auto_retry_limit = limit;
        self
    }
}
