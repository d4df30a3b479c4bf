use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::time::sleep;

use crate::{
    classify::{classify, FailureClass},
    refresh::{RefreshCoordinator, RefreshOutcome},
    retry::RetryState,
    ClientError, ClientOptions, ReqwestTransport, Request, Response, Result, Transport,
};

/// HTTP client that absorbs transient failures and refreshes an expired
/// session once for all concurrent callers.
///
/// Clones share the transport and the refresh coordinator.
#[derive(Clone, Debug)]
pub struct ResilientClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    options: ClientOptions,
    coordinator: Arc<RefreshCoordinator>,
}

impl ResilientClient {
    /// Creates a client for `base_url` over the default `reqwest` transport.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_transport(base_url, ReqwestTransport::new())
    }

    /// Creates a client over a custom transport.
    pub fn with_transport(base_url: impl Into<String>, transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            base_url: base_url.into(),
            options: ClientOptions::default(),
            coordinator: Arc::new(RefreshCoordinator::default()),
        }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `RESILIENT_HTTP_BASE_URL` — API base URL (required)
    /// - `RESILIENT_HTTP_MAX_RETRIES` — retries after the first attempt
    /// - `RESILIENT_HTTP_BACKOFF_MS` — base backoff delay
    /// - `RESILIENT_HTTP_TIMEOUT_MS` — per-request timeout
    ///
    /// Unset optional variables keep their [`ClientOptions::default`] value.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use resilient_http::ResilientClient;
    ///
    /// let client = ResilientClient::from_env().expect("missing RESILIENT_HTTP_BASE_URL");
    /// ```
    pub fn from_env() -> std::result::Result<Self, String> {
        let base_url = std::env::var("RESILIENT_HTTP_BASE_URL")
            .map_err(|_| "missing RESILIENT_HTTP_BASE_URL environment variable".to_owned())?;
        if base_url.trim().is_empty() {
            return Err("RESILIENT_HTTP_BASE_URL is set but empty".to_owned());
        }

        let mut options = ClientOptions::default();
        if let Some(value) = env_number("RESILIENT_HTTP_MAX_RETRIES")? {
            options.max_retries = value;
        }
        if let Some(value) = env_number("RESILIENT_HTTP_BACKOFF_MS")? {
            options.retry_backoff_ms = value;
        }
        if let Some(value) = env_number("RESILIENT_HTTP_TIMEOUT_MS")? {
            options.timeout_ms = value;
        }
        Ok(Self::new(base_url.trim()).with_options(options))
    }

    /// Applies client options such as timeout, retry and refresh behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Base URL that relative request paths are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Options currently applied to every call.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Returns `true` while a session refresh is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.coordinator.is_refreshing()
    }

    /// Waits for the in-flight session refresh to complete.
    ///
    /// Returns `None` immediately when no refresh is running.
    pub async fn wait_for_refresh(&self) -> Option<RefreshOutcome> {
        let waiter = self.coordinator.subscribe()?;
        Some(waiter.await.unwrap_or(RefreshOutcome::Failed))
    }

    /// Sends a request, retrying transient failures and refreshing an
    /// expired session as needed.
    ///
    /// The returned error is final: retries are exhausted or the failure was
    /// not retryable. An unrecoverable session is reported as
    /// [`ClientError::SessionExpired`].
    pub async fn send(&self, request: Request) -> Result<Response> {
        let url = request.url(&self.base_url);
        let mut retry = RetryState::new(
            self.options.max_retries,
            self.options.retry_backoff_ms,
            self.options.max_backoff_ms,
        );
        let mut retried_for_auth = false;

        loop {
            let err = match self.attempt(&url, &request).await {
                Ok(response) => return Ok(response.with_retries(retry.attempt)),
                Err(err) => err,
            };

            match classify(&err) {
                FailureClass::Unauthenticated if !retried_for_auth => {
                    retried_for_auth = true;
                    self.refresh_session(err).await?;
                }
                FailureClass::Retryable if !retried_for_auth => {
                    let Some(next) = retry.next() else {
                        return Err(err);
                    };
                    let delay = next.delay();

                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        "retrying {} {} after {} ms (attempt {}/{}): {}",
                        request.method(),
                        url,
                        delay.as_millis(),
                        next.attempt,
                        next.max_retries,
                        err
                    );

                    sleep(delay).await;
                    retry = next;
                }
                _ => return Err(err),
            }
        }
    }

    /// Sends a GET request.
    pub async fn get(&self, path: &str) -> Result<Response> {
        self.send(Request::get(path)).await
    }

    /// Sends a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<Response> {
        self.send(Request::delete(path)).await
    }

    /// Sends a POST request with `body` serialized as JSON.
    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        self.send(Request::post(path).json(body)?).await
    }

    /// Sends a PUT request with `body` serialized as JSON.
    pub async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        self.send(Request::put(path).json(body)?).await
    }

    /// Sends a PATCH request with `body` serialized as JSON.
    pub async fn patch_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        self.send(Request::patch(path).json(body)?).await
    }

    /// Sends a GET request and decodes the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get(path).await?.json()
    }

    async fn attempt(&self, url: &str, request: &Request) -> Result<Response> {
        self.transport
            .execute(url, request, Duration::from_millis(self.options.timeout_ms))
            .await?
            .error_for_status()
    }

    /// Drives the session refresh for a call that just saw its first 401.
    ///
    /// Returns `Ok` when the caller should reissue its request. A call that
    /// finds a refresh already running gets its original error back.
    async fn refresh_session(&self, unauthorized: ClientError) -> Result<()> {
        let Some(guard) = self.coordinator.try_begin() else {
            #[cfg(feature = "tracing")]
            tracing::warn!("session refresh already in flight, rejecting request");
            return Err(unauthorized);
        };

        #[cfg(feature = "tracing")]
        tracing::debug!("session expired, refreshing via {}", self.options.refresh_path);

        let refresh = Request::post(self.options.refresh_path.as_str());
        let url = refresh.url(&self.base_url);
        match self.attempt(&url, &refresh).await {
            Ok(_) => {
                let _notified = guard.finish(RefreshOutcome::Refreshed);
                #[cfg(feature = "tracing")]
                tracing::debug!("session refreshed, {} waiter(s) notified", _notified);
                Ok(())
            }
            Err(err) => {
                let _notified = guard.finish(RefreshOutcome::Failed);
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    "session refresh failed, {} waiter(s) notified: {}",
                    _notified,
                    err
                );
                Err(ClientError::SessionExpired {
                    login_path: self.options.login_path.clone(),
                    source: Box::new(err),
                })
            }
        }
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> std::result::Result<Option<T>, String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("{name} must be a non-negative integer, got '{value}'")),
        _ => Ok(None),
    }
}
