use std::{fmt, time::Duration};

use async_trait::async_trait;

use crate::{ClientError, Request, Response, Result};

/// Issues a single HTTP request.
///
/// Implementations return `Ok` for every response that was received,
/// whatever its status; retry and refresh decisions are made by the client.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends `request` to `url`, giving up after `timeout`.
    async fn execute(&self, url: &str, request: &Request, timeout: Duration) -> Result<Response>;
}

/// Default [`Transport`] backed by `reqwest`.
///
/// Keeps a cookie store so that session cookies renewed by the refresh
/// endpoint are sent with subsequent requests.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a cookie store.
    ///
    /// If the cookie-store client cannot be built, this falls back to a plain
    /// `reqwest::Client` **without** cookies: renewed session cookies are then
    /// never sent and every reissued request gets 401 again. Use
    /// [`ReqwestTransport::try_new`] to surface that failure instead.
    pub fn new() -> Self {
        Self::try_new().unwrap_or_else(|_err| {
            #[cfg(feature = "tracing")]
            tracing::warn!("falling back to a client without cookie store: {}", _err);
            Self::with_client(reqwest::Client::new())
        })
    }

    /// Creates a transport with a cookie store, failing with
    /// [`ClientError::Config`] when the underlying client cannot be built.
    pub fn try_new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|err| ClientError::Config(format!("cannot build HTTP client: {err}")))?;
        Ok(Self::with_client(http))
    }

    /// Wraps an already configured `reqwest::Client`.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn map_error(err: reqwest::Error, timeout: Duration) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    } else if err.is_builder() {
        ClientError::InvalidRequest(err.to_string())
    } else {
        ClientError::network(err)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, url: &str, request: &Request, timeout: Duration) -> Result<Response> {
        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .timeout(timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|err| map_error(err, timeout))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = match response.text().await {
            Ok(body) => body,
            // The status line already arrived: keep it so that a 4xx or 401
            // is not mistaken for a network failure.
            Err(_) if !status.is_success() => String::new(),
            Err(err) => return Err(map_error(err, timeout)),
        };
        Ok(Response::new(status, headers, body))
    }
}
