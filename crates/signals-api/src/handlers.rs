//! Request handlers.

use crate::error::ApiError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderName, Method};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use signals_access::bearer_token;
use signals_core::Tier;
use signals_query::{parse_limit, SignalQuery};
use signals_webhooks::{SubscriptionRequest, AVAILABLE_TYPES};
use std::sync::Arc;
use tracing::info;

const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

const SUBSCRIBE_USAGE: &str = concat!(
    r#"POST with {"url": "https://your-server.com/webhook", "#,
    r#""types": ["NEW_BUY", "STOP_LOSS"]}"#
);

/// Raw `/api/signals` query parameters. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct SignalParams {
    #[serde(rename = "type")]
    pub signal_type: Option<String>,
    pub symbol: Option<String>,
    pub since: Option<String>,
    pub limit: Option<String>,
}

impl SignalParams {
    fn into_query(self) -> Result<SignalQuery, ApiError> {
        let mut query = SignalQuery::new().with_limit(parse_limit(self.limit.as_deref()));
        if let Some(t) = non_empty(self.signal_type) {
            query = query.with_type(t);
        }
        if let Some(s) = non_empty(self.symbol) {
            query = query.with_symbol(s);
        }
        if let Some(raw) = non_empty(self.since) {
            query = query.since(parse_since(&raw)?);
        }
        Ok(query)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// RFC 3339 instant, or a bare `YYYY-MM-DD` meaning midnight UTC.
fn parse_since(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid since timestamp: {}", raw)))
}

fn auth_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let tiers: Map<String, Value> = Tier::all()
        .iter()
        .map(|t| (t.as_str().to_string(), Value::String(state.tiers.describe(*t))))
        .collect();

    Json(json!({
        "status": "ok",
        "service": state.service.name,
        "version": state.service.version,
        "mode": state.service.mode,
        "tiers": tiers,
        "endpoints": ["/api/health", "/api/signals", "/api/portfolio", "/api/subscribe"],
    }))
}

/// GET /api/signals
pub async fn signals(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<SignalParams>,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let credential = state.resolver.authenticate(auth_token(&headers)).await?;
    let usage = state.limiter.check(&credential.identity, credential.tier, now).await?;

    let query = params.into_query()?;
    let signals = state.signals.load_signals().await?;
    let result = state.engine.execute(&signals, credential.tier, &query, now);

    Ok((
        [
            (RATE_LIMIT_LIMIT, usage.limit.to_string()),
            (RATE_LIMIT_REMAINING, usage.remaining().to_string()),
        ],
        Json(result),
    )
        .into_response())
}

/// GET /api/portfolio
pub async fn portfolio(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    match state.portfolio.load_portfolio().await? {
        Some(snapshot) => Ok(Json(snapshot.sanitize()).into_response()),
        None => Err(ApiError::Unavailable("Unavailable".to_string())),
    }
}

/// GET|POST /api/subscribe
///
/// Authentication is checked before the method so unauthenticated callers
/// always get 401/403.
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let token = auth_token(&headers).ok_or_else(|| {
        ApiError::Unauthorized("API key required. Get one at /api/health".to_string())
    })?;

    let credential = state.resolver.authenticate(Some(token)).await?;
    if !credential.is_authenticated() {
        return Err(ApiError::Forbidden("Invalid API key".to_string()));
    }
    state.subscriptions.check_tier(credential.tier)?;

    match method {
        Method::GET => Ok(Json(json!({
            "message": "Webhook subscription endpoint",
            "usage": SUBSCRIBE_USAGE,
            "availableTypes": AVAILABLE_TYPES,
            "tier": credential.tier,
        }))
        .into_response()),
        Method::POST => {
            let request: SubscriptionRequest = serde_json::from_slice(&body)
                .map_err(|_| ApiError::BadRequest("Invalid JSON".to_string()))?;
            let grant = state.subscriptions.validate(credential.tier, request)?;

            info!(identity = %credential.identity, url = %grant.url, "Webhook subscription issued");

            Ok(Json(json!({
                "success": true,
                "message": "Webhook registered. Use the secret to verify HMAC signatures \
                            on incoming payloads.",
                "webhook": grant,
                "note": "Subscriptions are activated by the operator once added to the \
                         subscriber registry.",
            }))
            .into_response())
        }
        _ => Err(ApiError::MethodNotAllowed("Use GET or POST".to_string())),
    }
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_since_forms() {
        let expected: DateTime<Utc> = "2026-01-31T00:00:00Z".parse().unwrap();
        assert_eq!(parse_since("2026-01-31T00:00:00Z").unwrap(), expected);
        assert_eq!(parse_since("2026-01-31T02:00:00+02:00").unwrap(), expected);
        assert_eq!(parse_since("2026-01-31").unwrap(), expected);
        assert!(matches!(parse_since("last tuesday"), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_empty_params_ignored() {
        let params = SignalParams {
            signal_type: Some(String::new()),
            symbol: Some("  ".to_string()),
            since: Some(String::new()),
            limit: Some("abc".to_string()),
        };
        let query = params.into_query().unwrap();
        assert!(query.signal_type.is_none());
        assert!(query.symbol.is_none());
        assert!(query.since.is_none());
        assert_eq!(query.limit, 50);
    }

    #[test]
    fn test_auth_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(auth_token(&headers), None);
        headers.insert(AUTHORIZATION, "Bearer  abc123 ".parse().unwrap());
        assert_eq!(auth_token(&headers), Some("abc123"));
        headers.insert(AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(auth_token(&headers), None);
    }
}
