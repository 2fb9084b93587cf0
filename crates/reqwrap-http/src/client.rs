//! The request executor.

use crate::body::{self, PreparedBody};
use crate::descriptor::{CallDescriptor, CallOptions};
use crate::envelope::{self, Reply, ResponseEnvelope};
use crate::error::RequestError;
use crate::retry::{RetryDecision, RetryPolicy, DEFAULT_RETRY_LIMIT};
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder, Response, Url};
use reqwrap_common_config::{
    ClientConfig, ConfigLoader, Endpoints, EnvTokenStore, Environment, FileTokenStore, HttpSettings,
    TokenStore,
};
use reqwrap_common_log::spans;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Build a configured HTTP client.
///
/// No cookie store is enabled, so no credentials other than the bearer
/// token ever leave the process.
pub fn build_client(settings: &HttpSettings) -> Result<Client, RequestError> {
    ClientBuilder::new()
        .connect_timeout(settings.connect_timeout())
        .timeout(settings.request_timeout())
        .user_agent(&settings.user_agent)
        .build()
        .map_err(RequestError::ClientBuild)
}

/// Executes API calls and classifies their outcome.
///
/// Cheap to clone; clones share the HTTP client and the token store.
#[derive(Debug, Clone)]
pub struct Executor {
    client: Client,
    endpoints: Arc<Endpoints>,
    tokens: Arc<dyn TokenStore>,
    default_retry_limit: u32,
}

impl Executor {
    /// Create an executor from configuration.
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, RequestError> {
        let client = build_client(&config.http)?;
        Ok(Self {
            client,
            endpoints: Arc::new(config.endpoints.clone()),
            tokens,
            default_retry_limit: config.retry.default_limit,
        })
    }

    /// Create an executor around an existing client.
    pub fn with_client(client: Client, endpoints: Endpoints, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            client,
            endpoints: Arc::new(endpoints),
            tokens,
            default_retry_limit: DEFAULT_RETRY_LIMIT,
        }
    }

    /// Create an executor from `.env` files, `reqwrap.yaml` and the
    /// environment.
    ///
    /// The token is read from `REQWRAP_TOKEN_FILE` when set, otherwise from
    /// `REQWRAP_TOKEN`.
    pub fn from_env() -> Result<Self, RequestError> {
        Environment::init()?;
        let config = ConfigLoader::default().discover()?;
        let tokens: Arc<dyn TokenStore> = match FileTokenStore::from_env() {
            Some(store) => Arc::new(store),
            None => Arc::new(EnvTokenStore),
        };
        Self::new(&config, tokens)
    }

    /// Override the retry limit used when a call sets none.
    pub fn default_retry_limit(mut self, limit: u32) -> Self {
        self.default_retry_limit = limit;
        self
    }

    /// Base URLs this executor resolves against.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Final URL of a call: base URL of the selected server plus the path.
    pub fn url_for(&self, descriptor: &CallDescriptor, options: &CallOptions) -> String {
        format!("{}{}", self.endpoints.resolve(options.server), descriptor.path)
    }

    /// Execute a call.
    ///
    /// Returns [`Reply::Blob`] when `options.return_blob` is set, otherwise
    /// the parsed envelope.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        descriptor: &CallDescriptor,
        options: &CallOptions,
    ) -> Result<Reply<T>, RequestError> {
        if options.return_blob {
            self.run(descriptor, options, read_blob).await.map(Reply::Blob)
        } else {
            self.run(descriptor, options, read_envelope::<T>)
                .await
                .map(Reply::Envelope)
        }
    }

    /// Execute a JSON call, ignoring `return_blob`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        descriptor: &CallDescriptor,
        options: &CallOptions,
    ) -> Result<ResponseEnvelope<T>, RequestError> {
        self.run(descriptor, options, read_envelope::<T>).await
    }

    /// Execute a call and return the raw body, whatever `return_blob` says.
    pub async fn blob(
        &self,
        descriptor: &CallDescriptor,
        options: &CallOptions,
    ) -> Result<Bytes, RequestError> {
        self.run(descriptor, options, read_blob).await
    }

    /// Attempt loop shared by all entry points.
    async fn run<R, F, Fut>(
        &self,
        descriptor: &CallDescriptor,
        options: &CallOptions,
        read: F,
    ) -> Result<R, RequestError>
    where
        F: Fn(Response) -> Fut,
        Fut: Future<Output = Result<R, RequestError>>,
    {
        let policy = RetryPolicy::from_options(options, self.default_retry_limit);
        let url = self.url_for(descriptor, options);
        let server = options.server.unwrap_or(self.endpoints.default_server);
        let span = spans::call_span(descriptor.method.as_str(), &url, server.as_str());

        let attempts = async {
            let mut attempt: u32 = 1;
            loop {
                spans::record_attempt(&span, attempt);

                let result = match self.send(descriptor, options, &url).await {
                    Ok(response) => read(response).await,
                    Err(e) => Err(e),
                };

                let err = match result {
                    Ok(value) => {
                        spans::record_outcome(&span, "success");
                        return Ok(value);
                    }
                    Err(err) => err,
                };

                if let Some(kind) = err.kind() {
                    tracing::warn!(%kind, attempt, error = %err, "call failed");
                }

                match policy.decide(attempt, &err) {
                    RetryDecision::Retry => {
                        tracing::info!(attempt, max_attempts = policy.max_attempts(), "retrying call");
                        attempt += 1;
                    }
                    RetryDecision::Propagate => {
                        spans::record_outcome(&span, "failed");
                        return Err(err);
                    }
                    RetryDecision::Exhausted => {
                        spans::record_outcome(&span, "retry_limit_exceeded");
                        return Err(RequestError::RetryLimitExceeded {
                            attempts: attempt,
                            last: Box::new(err),
                        });
                    }
                }
            }
        };

        let timer = spans::Timer::start("call");
        let result = spans::instrument_future(attempts, span.clone()).await;
        timer.finish();
        result
    }

    /// One exchange: build, send, reject non-2xx statuses.
    async fn send(
        &self,
        descriptor: &CallDescriptor,
        options: &CallOptions,
        url: &str,
    ) -> Result<Response, RequestError> {
        let request = self.prepare(descriptor, options, url)?;

        tracing::debug!(method = %descriptor.method, url, "sending request");
        let response = request.send().await.map_err(RequestError::network)?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), url, "received response");

        if !status.is_success() {
            return Err(RequestError::status(status));
        }

        Ok(response)
    }

    /// Build the request for one attempt.
    pub fn prepare(
        &self,
        descriptor: &CallDescriptor,
        options: &CallOptions,
        url: &str,
    ) -> Result<reqwest::RequestBuilder, RequestError> {
        let parsed = Url::parse(url).map_err(|e| RequestError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let mut request = self.client.request(descriptor.method.clone(), parsed);

        let token = self.tokens.token().unwrap_or_default();
        if options.need_login && !token.is_empty() {
            request = request.bearer_auth(token);
        }

        request = match body::build_body(descriptor)? {
            PreparedBody::Empty => request,
            PreparedBody::Text { content_type, body } => {
                request.header(CONTENT_TYPE, content_type).body(body)
            }
            PreparedBody::Multipart(form) => request.multipart(form),
        };

        Ok(request)
    }
}

async fn read_envelope<T: DeserializeOwned>(
    response: Response,
) -> Result<ResponseEnvelope<T>, RequestError> {
    let status = response.status().as_u16();
    let bytes = response.bytes().await.map_err(RequestError::Read)?;

    let body: Value = serde_json::from_slice(&bytes).map_err(|source| RequestError::Decode {
        status,
        body: String::from_utf8_lossy(&bytes).to_string(),
        source,
    })?;

    envelope::classify(status, body)
}

async fn read_blob(response: Response) -> Result<Bytes, RequestError> {
    response.bytes().await.map_err(RequestError::Read)
}
