use reqwest::{header::HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::{ClientError, Result};

/// Fully read HTTP response.
#[derive(Clone, Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
    retries: u32,
}

impl Response {
    /// Builds a response; used by [`Transport`](crate::Transport) implementations.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            retries: 0,
        }
    }

    /// HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Body as text.
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Consumes the response, returning the body.
    pub fn into_text(self) -> String {
        self.body
    }

    /// Number of backoff retries absorbed before this response arrived.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|err| {
            ClientError::Decode(format!("invalid JSON response: {err}; body: {}", self.body))
        })
    }

    pub(crate) fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Turns a non-2xx response into [`ClientError::Http`].
    pub(crate) fn error_for_status(self) -> Result<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(ClientError::Http {
                status: self.status.as_u16(),
                body: self.body,
            })
        }
    }
}
