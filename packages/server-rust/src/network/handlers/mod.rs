//! HTTP handlers for the gateway surface.
//!
//! Defines `AppState`, the error/JSON plumbing shared by every handler,
//! and re-exports the per-area handler functions for router assembly.

pub mod accounts;
pub mod health;
pub mod lookup;
pub mod vocabulary;

pub use health::{health_handler, liveness_handler, readiness_handler};

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lexgate_core::OuterError;

use crate::admission::RateLimiter;
use crate::network::middleware::TokenVerifier;
use crate::network::{NetworkConfig, ShutdownController};
use crate::service::GatewayService;

/// Shared state carried through axum extractors; all fields are cheap to
/// clone.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<GatewayService>,
    pub limiter: Arc<RateLimiter>,
    pub shutdown: Arc<ShutdownController>,
    pub verifier: Arc<TokenVerifier>,
    pub config: Arc<NetworkConfig>,
    pub start_time: Instant,
}

/// Response-side wrapper: any [`OuterError`] renders as its status plus the
/// JSON error envelope.
#[derive(Debug)]
pub struct ApiError(pub OuterError);

impl From<OuterError> for ApiError {
    fn from(err: OuterError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.envelope())).into_response()
    }
}

/// JSON extractor that reports malformed bodies through the standard error
/// envelope instead of axum's plain-text rejection.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError(OuterError::bad_request(rejection.body_text()))),
        }
    }
}
