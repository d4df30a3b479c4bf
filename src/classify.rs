use reqwest::StatusCode;

use crate::ClientError;

/// How the dispatch loop reacts to a failed attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureClass {
    /// Transient: reissue after a backoff delay.
    Retryable,
    /// 401: hand over to the session refresh coordinator.
    Unauthenticated,
    /// Surface to the caller unchanged.
    Fatal,
}

/// Classifies a failed attempt.
///
/// Client errors (4xx) are never retried by backoff, except 429. A 401 is
/// routed to the session refresh path instead.
pub fn classify(err: &ClientError) -> FailureClass {
    match err {
        ClientError::Network(_) | ClientError::Timeout { .. } => FailureClass::Retryable,
        ClientError::Http { status, .. } => classify_status(*status),
        ClientError::Aborted
        | ClientError::SessionExpired { .. }
        | ClientError::InvalidRequest(_)
        | ClientError::Config(_)
        | ClientError::Decode(_) => FailureClass::Fatal,
    }
}

fn classify_status(status: u16) -> FailureClass {
    match StatusCode::from_u16(status) {
        Ok(StatusCode::UNAUTHORIZED) => FailureClass::Unauthenticated,
        Ok(StatusCode::TOO_MANY_REQUESTS) => FailureClass::Retryable,
        Ok(status) if status.is_client_error() => FailureClass::Fatal,
        Ok(status) if status.is_server_error() => FailureClass::Retryable,
        _ => FailureClass::Fatal,
    }
}
