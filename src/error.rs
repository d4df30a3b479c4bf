/// Boxed error used as the source of network failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No response was received (connect, send or body read failure).
    #[error("network error: {0}")]
    Network(#[source] BoxError),
    /// Client-side deadline or transport-level timeout.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
    /// The transport reports that the request was explicitly cancelled.
    #[error("request aborted")]
    Aborted,
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// The session could not be refreshed; the user has to sign in again.
    #[error("session expired, sign in again at {login_path}")]
    SessionExpired {
        /// Entry point the navigation layer should send the user to.
        login_path: String,
        /// Failure of the refresh call itself.
        #[source]
        source: Box<ClientError>,
    },
    /// The request descriptor could not be turned into a wire request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The client itself could not be set up.
    #[error("client configuration error: {0}")]
    Config(String),
    /// Response body decoding error.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ClientError {
    /// Wraps any error as a [`ClientError::Network`] failure.
    pub fn network(err: impl Into<BoxError>) -> Self {
        Self::Network(err.into())
    }

    /// Returns the HTTP status when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
