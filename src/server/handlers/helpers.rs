//! Shared response helpers for handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::error::ScrapeError;

/// JSON `{"error": ...}` body with the given status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

/// Map a scraping failure onto an HTTP status.
pub fn status_for(err: &ScrapeError) -> StatusCode {
    match err {
        ScrapeError::TransportUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ScrapeError::InvalidSelector(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    }
}

pub fn scrape_error_response(err: ScrapeError) -> Response {
    let status = status_for(&err);
    warn!("Request failed with {}: {}", status.as_u16(), err);
    error_response(status, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&ScrapeError::TransportUnavailable("x".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&ScrapeError::NavigationTimeout("x".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&ScrapeError::ResourceLaunchFailure("x".into())),
            StatusCode::BAD_GATEWAY
        );
    }
}
