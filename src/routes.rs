use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{any, get},
    Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    currency::CurrencyService,
    error::ProxyError,
    weather::{resolve_city, WeatherService},
};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<WeatherService>,
    pub currency: Arc<CurrencyService>,
}

/// Which CDN cache-control variant a response gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    Hit,
    Miss,
}

impl CachePolicy {
    fn header_value(self) -> &'static str {
        match self {
            CachePolicy::Hit => "s-maxage=120, stale-while-revalidate=300",
            CachePolicy::Miss => "s-maxage=60, stale-while-revalidate=120",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub erro: &'static str,
    pub details: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

/// CORS headers plus the cache-control variant, applied on every path
/// (including errors) so browsers can read the body.
pub fn cors_and_cache_headers(policy: CachePolicy) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(policy.header_value()),
    );
    headers
}

fn preflight() -> Response {
    (StatusCode::OK, cors_and_cache_headers(CachePolicy::Miss)).into_response()
}

fn failure(erro: &'static str, err: ProxyError) -> Response {
    tracing::error!(kind = err.kind(), "{}: {}", erro, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        cors_and_cache_headers(CachePolicy::Miss),
        Json(ErrorEnvelope {
            erro,
            details: err.to_string(),
        }),
    )
        .into_response()
}

// Route handlers
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn clima(
    State(state): State<AppState>,
    method: Method,
    query: Option<Query<HashMap<String, String>>>,
) -> Response {
    if method == Method::OPTIONS {
        return preflight();
    }

    let params = query.map(|Query(params)| params).unwrap_or_default();
    let city = resolve_city(
        params.get("q").map(String::as_str),
        params.get("Q").map(String::as_str),
    );

    match state.weather.current(&city).await {
        Ok(lookup) => {
            let policy = if lookup.cache_hit {
                CachePolicy::Hit
            } else {
                CachePolicy::Miss
            };
            (
                StatusCode::OK,
                cors_and_cache_headers(policy),
                Json(lookup.payload.as_ref().clone()),
            )
                .into_response()
        }
        Err(e) => failure("Falha em /clima", e),
    }
}

pub async fn cotacao(State(state): State<AppState>, method: Method) -> Response {
    if method == Method::OPTIONS {
        return preflight();
    }

    match state.currency.report().await {
        Ok(report) => (
            StatusCode::OK,
            cors_and_cache_headers(CachePolicy::Miss),
            Json(report),
        )
            .into_response(),
        Err(e) => failure("Falha em /cotacao", e),
    }
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/clima", any(clima))
        .route("/clima", any(clima))
        .route("/api/cotacao", any(cotacao))
        .route("/cotacao", any(cotacao))
        .with_state(state)
}
