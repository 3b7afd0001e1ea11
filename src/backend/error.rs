//! Mapping of HTTP failures into `NewsdeskError`.

use std::fmt;
use std::time::Duration;

use crate::error::NewsdeskError;

/// Retry hint used when a 429 response carries no `Retry-After` header
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// A non-success response from the content API.
///
/// Keeps the HTTP status so callers can distinguish rate limiting and missing
/// resources from other failures.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code, if available
    pub status: Option<reqwest::StatusCode>,
    /// Retry-After header value in seconds, if available
    pub retry_after: Option<u64>,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            retry_after: None,
            message: message.into(),
        }
    }

    pub fn with_status(message: impl Into<String>, status: reqwest::StatusCode) -> Self {
        Self {
            status: Some(status),
            retry_after: None,
            message: message.into(),
        }
    }

    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status.is_some_and(|s| s == reqwest::StatusCode::TOO_MANY_REQUESTS)
    }

    pub fn is_not_found(&self) -> bool {
        self.status.is_some_and(|s| s == reqwest::StatusCode::NOT_FOUND)
    }

    pub fn get_retry_after(&self) -> Option<Duration> {
        if !self.is_rate_limited() {
            return None;
        }
        Some(Duration::from_secs(
            self.retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        ))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({})", self.message, status.as_u16()),
            None => write!(f, "{}", self.message),
        }
    }
}

impl From<ApiError> for NewsdeskError {
    fn from(error: ApiError) -> Self {
        if let Some(duration) = error.get_retry_after() {
            return NewsdeskError::RateLimited(duration.as_secs());
        }
        if error.is_not_found() {
            return NewsdeskError::NotFound(error.message);
        }
        NewsdeskError::Api(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_rate_limited_uses_retry_after_header() {
        let err = ApiError::with_status("slow down", StatusCode::TOO_MANY_REQUESTS)
            .with_retry_after(12);
        match NewsdeskError::from(err) {
            NewsdeskError::RateLimited(secs) => assert_eq!(secs, 12),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rate_limited_defaults_to_sixty_seconds() {
        let err = ApiError::with_status("slow down", StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.get_retry_after(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_not_found_maps_to_not_found() {
        let err = ApiError::with_status("job 'x'", StatusCode::NOT_FOUND);
        assert!(matches!(
            NewsdeskError::from(err),
            NewsdeskError::NotFound(msg) if msg == "job 'x'"
        ));
    }

    #[test]
    fn test_server_error_maps_to_api_error() {
        let err = ApiError::with_status("upstream failed", StatusCode::BAD_GATEWAY);
        let converted = NewsdeskError::from(err);
        assert_eq!(converted.to_string(), "API error: upstream failed (502)");
    }

    #[test]
    fn test_error_without_status() {
        let err = ApiError::new("malformed body");
        assert_eq!(err.get_retry_after(), None);
        assert_eq!(err.to_string(), "malformed body");
    }
}
