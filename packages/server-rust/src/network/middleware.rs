//! Middleware for the gateway edge.
//!
//! Two kinds live here: the transport-level Tower stack (request ids,
//! tracing, compression, CORS, timeout, body limit) and the gateway's own
//! request middlewares (context, bearer auth, admission), applied with
//! `axum::middleware::from_fn_with_state`.
//!
//! Effective inbound order: transport stack, then context, then auth (on
//! authenticated routes), then admission, then the handler. Auth runs
//! before admission so authenticated callers are rate-limited by user id
//! rather than by IP.

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, DefaultBodyLimit, Request, State};
use axum::http::header::HeaderName;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use lexgate_core::{Operation, OuterError, RequestContext, TokenClaims};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;
use uuid::Uuid;

use super::config::NetworkConfig;
use super::handlers::{ApiError, AppState};
use super::shutdown::HealthState;
use crate::metrics::{ADMISSION_REJECTED_TOTAL, HTTP_REQUEST_DURATION_SECONDS, HTTP_RESPONSES_TOTAL};

/// The composed transport-level Tower stack, outermost first.
type HttpLayers = tower::layer::util::Stack<
    PropagateRequestIdLayer,
    tower::layer::util::Stack<
        DefaultBodyLimit,
        tower::layer::util::Stack<
            TimeoutLayer,
            tower::layer::util::Stack<
                CorsLayer,
                tower::layer::util::Stack<
                    CompressionLayer,
                    tower::layer::util::Stack<
                        TraceLayer<
                            tower_http::classify::SharedClassifier<
                                tower_http::classify::ServerErrorsAsFailures,
                            >,
                        >,
                        tower::layer::util::Stack<
                            SetRequestIdLayer<MakeRequestUuid>,
                            tower::layer::util::Identity,
                        >,
                    >,
                >,
            >,
        >,
    >,
>;

/// Builds the transport stack: request-id assignment, tracing,
/// compression, CORS, request timeout, body limit, request-id propagation.
#[must_use]
pub fn build_http_layers(config: &NetworkConfig) -> HttpLayers {
    let x_request_id = HeaderName::from_static("x-request-id");

    ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            x_request_id.clone(),
            MakeRequestUuid,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&config.cors_origins))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(DefaultBodyLimit::max(config.body_limit))
        .layer(PropagateRequestIdLayer::new(x_request_id))
        .into_inner()
}

/// A wildcard `"*"` allows any origin; otherwise each entry becomes part
/// of an explicit allowlist.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| o.parse().ok()))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

// --- request context ---------------------------------------------------

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Builds the per-request [`RequestContext`] from the inbound headers and
/// records request metrics around the rest of the chain. Draining
/// instances refuse new work here.
pub async fn context_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.shutdown.health_state() {
        HealthState::Ready => {}
        _ => {
            return ApiError(OuterError::internal("not accepting requests")).into_response();
        }
    }

    let headers = request.headers();
    let request_id = header_str(headers, "x-request-id")
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_string);
    let client_ip = header_str(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|info| info.0.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string());
    let device = header_str(headers, "user-agent")
        .unwrap_or("unknown")
        .to_string();
    let accept_language = header_str(headers, "accept-language")
        .unwrap_or("en")
        .to_string();

    let operation = Operation::from_path(request.uri().path());
    let ctx = RequestContext {
        request_id,
        client_ip,
        device,
        accept_language,
        claims: None,
    };
    request.extensions_mut().insert(ctx);

    let _guard = state.shutdown.in_flight_guard();
    let started = Instant::now();
    let response = next.run(request).await;

    if let Some(op) = operation {
        let status = response.status().as_u16().to_string();
        metrics::histogram!(HTTP_REQUEST_DURATION_SECONDS, "operation" => op.as_str())
            .record(started.elapsed().as_secs_f64());
        metrics::counter!(HTTP_RESPONSES_TOTAL, "operation" => op.as_str(), "status" => status)
            .increment(1);
    }
    response
}

// --- bearer auth -------------------------------------------------------

/// Access-token payload as minted by the auth service.
#[derive(Debug, Deserialize)]
struct AccessClaims {
    user_id: u64,
    token_id: String,
    #[allow(dead_code)]
    exp: u64,
}

/// Verifies HS256 access tokens against the shared signing secret.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// # Errors
    ///
    /// Returns a 401-shaped error when the token is missing, empty, or
    /// fails signature/expiry verification.
    pub fn verify(&self, headers: &HeaderMap) -> Result<TokenClaims, OuterError> {
        let header = header_str(headers, "authorization")
            .ok_or_else(|| OuterError::bad_authorization("failed to get authorization token"))?;
        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
        if token.is_empty() {
            return Err(OuterError::bad_authorization("authorization token is empty"));
        }

        let decoded = jsonwebtoken::decode::<AccessClaims>(token, &self.key, &self.validation)
            .map_err(|err| {
                debug!(error = %err, "access token rejected");
                OuterError::bad_authorization("authorization token is invalid")
            })?;
        Ok(TokenClaims {
            user_id: decoded.claims.user_id,
            token_id: decoded.claims.token_id,
        })
    }
}

/// Requires a valid bearer token and attaches its claims to the request
/// context. Applied only to the authenticated routes.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = match state.verifier.verify(request.headers()) {
        Ok(claims) => claims,
        Err(err) => return ApiError(err).into_response(),
    };

    if let Some(ctx) = request.extensions_mut().get_mut::<RequestContext>() {
        ctx.claims = Some(claims);
    }
    next.run(request).await
}

// --- admission ---------------------------------------------------------

/// Applies the per-operation quota against the caller key (user id when
/// authenticated, IP otherwise). Rejections short-circuit with 429 and
/// never reach the orchestrator.
pub async fn admission_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(op) = Operation::from_path(request.uri().path()) {
        let caller_key = request
            .extensions()
            .get::<RequestContext>()
            .map_or_else(|| "unknown".to_string(), RequestContext::caller_key);
        if !state.limiter.allow(op, &caller_key) {
            metrics::counter!(ADMISSION_REJECTED_TOTAL, "operation" => op.as_str()).increment(1);
            return ApiError(OuterError::too_many_requests()).into_response();
        }
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims {
        user_id: u64,
        token_id: String,
        exp: u64,
    }

    fn bearer(headers: &mut HeaderMap, token: &str) {
        headers.insert(
            "authorization",
            format!("Bearer {token}").parse().unwrap(),
        );
    }

    fn signed_token(secret: &[u8], exp: u64) -> String {
        encode(
            &Header::default(),
            &TestClaims {
                user_id: 42,
                token_id: "tok-9".to_string(),
                exp,
            },
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    fn far_future() -> u64 {
        4_102_444_800 // 2100-01-01
    }

    #[test]
    fn verify_accepts_a_valid_token() {
        let verifier = TokenVerifier::new(b"secret");
        let mut headers = HeaderMap::new();
        bearer(&mut headers, &signed_token(b"secret", far_future()));

        let claims = verifier.verify(&headers).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.token_id, "tok-9");
    }

    #[test]
    fn verify_rejects_a_missing_header() {
        let verifier = TokenVerifier::new(b"secret");
        let err = verifier.verify(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.message, "failed to get authorization token");
        assert_eq!(err.http_status, 401);
    }

    #[test]
    fn verify_rejects_an_empty_token() {
        let verifier = TokenVerifier::new(b"secret");
        let mut headers = HeaderMap::new();
        bearer(&mut headers, "");
        let err = verifier.verify(&headers).unwrap_err();
        assert_eq!(err.message, "authorization token is empty");
    }

    #[test]
    fn verify_rejects_a_foreign_signature() {
        let verifier = TokenVerifier::new(b"secret");
        let mut headers = HeaderMap::new();
        bearer(&mut headers, &signed_token(b"other-secret", far_future()));
        let err = verifier.verify(&headers).unwrap_err();
        assert_eq!(err.message, "authorization token is invalid");
    }

    #[test]
    fn verify_rejects_an_expired_token() {
        let verifier = TokenVerifier::new(b"secret");
        let mut headers = HeaderMap::new();
        bearer(&mut headers, &signed_token(b"secret", 1_000_000));
        let err = verifier.verify(&headers).unwrap_err();
        assert_eq!(err.message, "authorization token is invalid");
    }

    #[test]
    fn cors_layer_accepts_wildcard_and_lists() {
        let _any = build_cors_layer(&["*".to_string()]);
        let _list = build_cors_layer(&["https://app.example.com".to_string()]);
    }

    #[test]
    fn http_layers_build_with_defaults() {
        let _layers = build_http_layers(&NetworkConfig::default());
    }
}
