//! API error type and its HTTP mapping.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use signals_core::{AccessError, SignalsError, StoreError, Tier, WebhookError};
use thiserror::Error;
use tracing::error;

/// Every failure a request can end in.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Rate limit exceeded")]
    RateLimited { tier: Tier, limit: u64 },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn method_not_allowed() -> Self {
        ApiError::MethodNotAllowed("Method not allowed".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::RateLimited { tier, limit } => {
                let mut response = (
                    status,
                    Json(json!({ "error": "Rate limit exceeded", "tier": tier, "limit": limit })),
                )
                    .into_response();
                let headers = response.headers_mut();
                headers.insert("x-ratelimit-limit", HeaderValue::from(limit));
                headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
                response
            }
            other => (status, Json(json!({ "error": other.to_string() }))).into_response(),
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::RateLimitExceeded { tier, limit } => ApiError::RateLimited { tier, limit },
            AccessError::CounterUnavailable(_) => {
                ApiError::Unavailable("Rate limiting temporarily unavailable".to_string())
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        error!(error = %e, "Backing data unavailable");
        ApiError::Unavailable("Unavailable".to_string())
    }
}

impl From<WebhookError> for ApiError {
    fn from(e: WebhookError) -> Self {
        match e {
            WebhookError::WebhooksNotAllowed { .. } => ApiError::Forbidden(e.to_string()),
            WebhookError::InvalidUrl(_) => {
                ApiError::BadRequest("url must be a valid HTTPS URL".to_string())
            }
            WebhookError::MissingSecret
            | WebhookError::Serialization(_)
            | WebhookError::Client(_) => {
                error!(error = %e, "Webhook operation failed");
                ApiError::Internal("Internal error".to_string())
            }
        }
    }
}

impl From<SignalsError> for ApiError {
    fn from(e: SignalsError) -> Self {
        match e {
            SignalsError::Access(e) => e.into(),
            SignalsError::Store(e) => e.into(),
            SignalsError::Webhook(e) => e.into(),
            SignalsError::Config(message) => {
                error!(error = %message, "Configuration error");
                ApiError::Internal("Internal error".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_status_codes() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                AccessError::RateLimitExceeded { tier: Tier::Free, limit: 100 }.into(),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                AccessError::CounterUnavailable("down".into()).into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (StoreError::Unavailable("gone".into()).into(), StatusCode::SERVICE_UNAVAILABLE),
            (WebhookError::WebhooksNotAllowed { tier: Tier::Free }.into(), StatusCode::FORBIDDEN),
            (WebhookError::InvalidUrl("x".into()).into(), StatusCode::BAD_REQUEST),
            (WebhookError::Client("tls".into()).into(), StatusCode::INTERNAL_SERVER_ERROR),
            (SignalsError::Config("bad".into()).into(), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::method_not_allowed(), StatusCode::METHOD_NOT_ALLOWED),
            (ApiError::NotFound, StatusCode::NOT_FOUND),
        ];
        for (error, status) in cases {
            assert_eq!(error.status(), status, "{error:?}");
        }
    }

    #[test]
    fn test_wrapped_errors_map_like_inner() {
        let inner = AccessError::RateLimitExceeded { tier: Tier::Pro, limit: 10 };
        let err: ApiError = SignalsError::from(inner).into();
        assert!(matches!(err, ApiError::RateLimited { tier: Tier::Pro, limit: 10 }));
    }

    #[test]
    fn test_rate_limited_headers() {
        let response = ApiError::RateLimited { tier: Tier::Free, limit: 100 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["x-ratelimit-limit"], "100");
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
    }
}
