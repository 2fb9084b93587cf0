//! JSON/HTTP request executor for generated API clients.
//!
//! A generated endpoint function describes its call with a
//! [`CallDescriptor`] and hands it to an [`Executor`] together with
//! [`CallOptions`]. The executor resolves the base URL, encodes the body,
//! sends the request and classifies the outcome:
//!
//! - no response at all: [`ErrorKind::Network`]
//! - HTTP status outside `[200, 300)`: [`ErrorKind::Status`]
//! - 2xx with an envelope `type` other than `200`: [`ErrorKind::Business`]
//!
//! With `auto_retry` the whole call is repeated after a classified failure,
//! up to a bounded number of attempts.
//!
//! ```no_run
//! use reqwrap_http::{CallDescriptor, CallOptions, Executor};
//! use serde_json::{json, Value};
//!
//! # async fn demo() -> Result<(), reqwrap_http::RequestError> {
//! let executor = Executor::from_env()?;
//! let call = CallDescriptor::post("/user/login").form(
//!     json!({"username": "ada", "password": "secret"})
//!         .as_object()
//!         .cloned()
//!         .unwrap_or_default(),
//! );
//! let envelope = executor
//!     .request::<Value>(&call, &CallOptions::default().need_login(false))
//!     .await?;
//! println!("{}", envelope.msg);
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod client;
pub mod descriptor;
pub mod envelope;
pub mod error;
pub mod retry;

pub use body::{build_body, encode_component, encode_form, encode_json, form_value, PreparedBody};
pub use client::{build_client, Executor};
pub use descriptor::{BodyKind, CallDescriptor, CallOptions, FormDataFactory};
pub use envelope::{classify, type_code, Reply, ResponseEnvelope, SUCCESS_TYPE};
pub use error::{ErrorKind, RequestError};
pub use retry::{RetryDecision, RetryPolicy, DEFAULT_RETRY_LIMIT};

pub use reqwest::Method;
pub use reqwrap_common_config::{Endpoints, Server, TokenStore};
