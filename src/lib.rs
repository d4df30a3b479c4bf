//! `resilient-http` is an async HTTP client wrapper for session-cookie
//! backed REST APIs.
//!
//! Every call made through [`ResilientClient::send`] gets two policies:
//! - transient failures (network errors, timeouts, 5xx, 429) are retried
//!   with capped exponential backoff;
//! - a 401 triggers a single session refresh shared by all concurrent
//!   callers, after which the triggering request is reissued once.
//!
//! ```no_run
//! use resilient_http::{ClientOptions, ResilientClient};
//!
//! # async fn run() -> resilient_http::Result<()> {
//! let client = ResilientClient::new("https://dashboard.example.com/api").with_options(
//!     ClientOptions {
//!         max_retries: 3,
//!         retry_backoff_ms: 500,
//!         ..ClientOptions::default()
//!     },
//! );
//! let body = client.get("/reports/daily").await?.into_text();
//! # let _ = body;
//! # Ok(())
//! # }
//! ```

mod classify;
mod client;
mod error;
mod options;
mod refresh;
mod request;
mod response;
mod retry;
mod transport;

pub use classify::{classify, FailureClass};
pub use client::ResilientClient;
pub use error::{BoxError, ClientError};
pub use options::ClientOptions;
pub use refresh::RefreshOutcome;
pub use request::Request;
pub use response::Response;
pub use retry::RetryState;
pub use transport::{ReqwestTransport, Transport};

pub type Result<T> = std::result::Result<T, ClientError>;
