/// Configures timeout, retry and session-refresh behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Base retry backoff in milliseconds (exponential strategy).
    pub retry_backoff_ms: u64,
    /// Upper bound for a single backoff delay in milliseconds.
    pub max_backoff_ms: u64,
    /// Path of the session refresh endpoint, relative to the base URL.
    pub refresh_path: String,
    /// Login entry point reported when the session cannot be refreshed.
    pub login_path: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_retries: 3,
            retry_backoff_ms: 1_000,
            max_backoff_ms: 30_000,
            refresh_path: "/token/refresh/".to_owned(),
            login_path: "/login".to_owned(),
        }
    }
}
