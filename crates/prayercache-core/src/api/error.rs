use reqwest::StatusCode;
use thiserror::Error;

/// Failures of one calendar request.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The API rejected the query, usually coordinates or a method id it doesn't know
    #[error("Calendar request rejected: {0}")]
    BadRequest(String),

    #[error("Rate limited by the prayer times API")]
    RateLimited,

    #[error("Prayer times API unavailable: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No prayer times data received from API")]
    MissingData,
}

/// Longest response body kept in an error message
const MAX_ERROR_BODY_LENGTH: usize = 500;

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} bytes)", &body[..end], body.len())
}

impl ApiError {
    /// Classify a non-success calendar response.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let body = truncate_body(body);
        match status {
            StatusCode::BAD_REQUEST => ApiError::BadRequest(body),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
            s if s.is_server_error() => ApiError::ServerError(format!("{}: {}", s, body)),
            s => ApiError::InvalidResponse(format!("Status {}: {}", s, body)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        match ApiError::from_status(StatusCode::BAD_REQUEST, "Please specify a valid latitude") {
            ApiError::BadRequest(msg) => assert!(msg.contains("valid latitude")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream"),
            ApiError::ServerError(_)
        ));

        // Statuses the calendar endpoint never sends on purpose
        for status in [StatusCode::FORBIDDEN, StatusCode::NOT_FOUND] {
            match ApiError::from_status(status, "nope") {
                ApiError::InvalidResponse(msg) => {
                    assert!(msg.contains(status.as_str()));
                    assert!(msg.contains("nope"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "x".repeat(2000);
        match ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body) {
            ApiError::ServerError(msg) => {
                assert!(msg.len() < 600);
                assert!(msg.contains("2000 bytes"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
