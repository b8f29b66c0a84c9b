//! Edge server lifecycle with deferred startup.
//!
//! `new()` allocates shared state, `start()` binds the listener, and
//! `serve()` accepts connections until the shutdown future resolves, then
//! drains in-flight requests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::config::NetworkConfig;
use super::handlers::{
    accounts, health_handler, liveness_handler, lookup, readiness_handler, vocabulary, AppState,
};
use super::middleware::{
    admission_middleware, auth_middleware, build_http_layers, context_middleware, TokenVerifier,
};
use super::shutdown::ShutdownController;
use crate::admission::RateLimiter;
use crate::service::GatewayService;

pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    service: Arc<GatewayService>,
    limiter: Arc<RateLimiter>,
    verifier: Arc<TokenVerifier>,
    shutdown: Arc<ShutdownController>,
}

impl NetworkModule {
    #[must_use]
    pub fn new(
        config: NetworkConfig,
        service: Arc<GatewayService>,
        limiter: Arc<RateLimiter>,
        verifier: Arc<TokenVerifier>,
    ) -> Self {
        Self {
            config,
            listener: None,
            service,
            limiter,
            verifier,
            shutdown: Arc::new(ShutdownController::new()),
        }
    }

    /// Shared shutdown controller, for signal wiring and health checks.
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    fn app_state(&self) -> AppState {
        AppState {
            service: Arc::clone(&self.service),
            limiter: Arc::clone(&self.limiter),
            shutdown: Arc::clone(&self.shutdown),
            verifier: Arc::clone(&self.verifier),
            config: Arc::new(self.config.clone()),
            start_time: Instant::now(),
        }
    }

    /// Assembles the full router.
    ///
    /// Health endpoints sit outside the request middlewares so probes keep
    /// answering while the instance drains. Every `/v1` route passes the
    /// context and admission middlewares; routes that need a caller also
    /// pass bearer auth, which runs before admission so authenticated
    /// traffic is throttled per user rather than per IP.
    #[must_use]
    pub fn build_router(&self) -> Router {
        let state = self.app_state();

        let public = Router::new()
            .route("/v1/SignUp", post(accounts::sign_up))
            .route("/v1/SignIn", post(accounts::sign_in))
            .route("/v1/RefreshTokens", post(accounts::refresh_tokens))
            .route("/v1/ConfirmEmail", post(accounts::confirm_email))
            .route("/v1/AskResetPassword", post(accounts::ask_reset_password))
            .route("/v1/ResetPassword", post(accounts::reset_password))
            .route("/v1/GetLanguages", post(lookup::get_languages))
            .route("/v1/GetVoiceover", post(lookup::get_voiceover))
            .route("/v1/GetTranslation", post(lookup::get_translation))
            .route_layer(from_fn_with_state(state.clone(), admission_middleware));

        let authed = Router::new()
            .route("/v1/Logout", post(accounts::logout))
            .route("/v1/GetUser", post(accounts::get_user))
            .route("/v1/UpdateUser", post(accounts::update_user))
            .route("/v1/CreateCollection", post(vocabulary::create_collection))
            .route("/v1/UpdateCollection", post(vocabulary::update_collection))
            .route("/v1/GetCollections", post(vocabulary::get_collections))
            .route("/v1/GetCollection", post(vocabulary::get_collection))
            .route("/v1/DeleteCollection", post(vocabulary::delete_collection))
            .route("/v1/CreateTerms", post(vocabulary::create_terms))
            .route("/v1/GetTerms", post(vocabulary::get_terms))
            .route("/v1/UpdateTerm", post(vocabulary::update_term))
            .route("/v1/DeleteTerms", post(vocabulary::delete_terms))
            .route(
                "/v1/ChangeTermStatus",
                post(vocabulary::change_term_status),
            )
            .route_layer(from_fn_with_state(state.clone(), admission_middleware))
            .route_layer(from_fn_with_state(state.clone(), auth_middleware));

        Router::new()
            .route("/health", get(health_handler))
            .route("/health/live", get(liveness_handler))
            .route("/health/ready", get(readiness_handler))
            .merge(
                Router::new()
                    .merge(public)
                    .merge(authed)
                    .layer(from_fn_with_state(state.clone(), context_middleware)),
            )
            .layer(build_http_layers(&self.config))
            .with_state(state)
    }

    /// Binds the listener; returns the bound port (useful with port 0).
    ///
    /// # Errors
    ///
    /// Returns an error when the address cannot be bound.
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();
        info!(host = %self.config.host, port, "listener bound");
        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves until the shutdown future resolves, then drains.
    ///
    /// # Errors
    ///
    /// Returns an error on fatal listener or TLS failures.
    ///
    /// # Panics
    ///
    /// Panics if `start()` was not called first.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let router = self.build_router();
        let NetworkModule {
            config,
            listener,
            shutdown: shutdown_ctrl,
            ..
        } = self;
        let listener = listener.expect("start() must be called before serve()");

        shutdown_ctrl.set_ready();

        if let Some(ref tls) = config.tls {
            serve_tls(listener, router, tls, shutdown).await?;
        } else {
            serve_plain(listener, router, shutdown).await?;
        }

        shutdown_ctrl.trigger_shutdown();
        if shutdown_ctrl.wait_for_drain(config.drain_timeout).await {
            info!("all in-flight requests drained");
        } else {
            warn!("drain timeout expired with requests still in flight");
        }
        Ok(())
    }
}

async fn serve_plain(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    info!("serving plain HTTP");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;
    Ok(())
}

async fn serve_tls(
    listener: TcpListener,
    router: Router,
    tls: &super::config::TlsConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let rustls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load TLS certificates: {e}"))?;

    let addr = listener.local_addr()?;
    let std_listener = listener.into_std()?;
    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();

    tokio::spawn(async move {
        shutdown.await;
        shutdown_handle.graceful_shutdown(None);
    });

    info!(%addr, "serving TLS");
    axum_server::from_tcp_rustls(std_listener, rustls_config)
        .handle(handle)
        .serve(router.into_make_service_with_connect_info::<SocketAddr>())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::QuotaTable;
    use crate::service::mocks::Mocks;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use lexgate_core::Operation;
    use tower::ServiceExt;

    fn module_with(limits: Vec<(Operation, u32)>) -> (NetworkModule, Mocks) {
        let mocks = Mocks::new();
        let module = NetworkModule::new(
            NetworkConfig::default(),
            Arc::new(mocks.service()),
            Arc::new(RateLimiter::new(QuotaTable::new(limits))),
            Arc::new(TokenVerifier::new(b"test-secret")),
        );
        (module, mocks)
    }

    fn post_json(path: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn liveness_answers_before_ready() {
        let (module, _mocks) = module_with(Vec::new());
        let router = module.build_router();

        let response = router
            .oneshot(Request::get("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_flips_with_health_state() {
        let (module, _mocks) = module_with(Vec::new());
        let shutdown = module.shutdown_controller();
        let router = module.build_router();

        let response = router
            .clone()
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        shutdown.set_ready();
        let response = router
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn public_operation_flows_to_the_orchestrator() {
        let (module, mocks) = module_with(Vec::new());
        module.shutdown_controller().set_ready();
        let router = module.build_router();

        let response = router
            .oneshot(post_json("/v1/GetLanguages", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(mocks.log.calls(), vec!["language.GetLanguages"]);
    }

    #[tokio::test]
    async fn authed_route_rejects_a_missing_token() {
        let (module, mocks) = module_with(Vec::new());
        module.shutdown_controller().set_ready();
        let router = module.build_router();

        let response = router
            .oneshot(post_json("/v1/GetCollections", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(mocks.log.calls().is_empty());
    }

    #[tokio::test]
    async fn exhausted_quota_returns_429() {
        let (module, _mocks) = module_with(vec![(Operation::GetLanguages, 1)]);
        module.shutdown_controller().set_ready();
        let router = module.build_router();

        let first = router
            .clone()
            .oneshot(post_json("/v1/GetLanguages", "{}"))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = router
            .oneshot(post_json("/v1/GetLanguages", "{}"))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn every_operation_is_routed_with_the_expected_auth_gate() {
        let (module, _mocks) = module_with(Vec::new());
        module.shutdown_controller().set_ready();
        let router = module.build_router();

        for op in Operation::ALL {
            let response = router
                .clone()
                .oneshot(post_json(&op.path(), "{}"))
                .await
                .unwrap();
            assert_ne!(response.status(), StatusCode::NOT_FOUND, "{op} is not routed");
            if op.requires_auth() {
                assert_eq!(
                    response.status(),
                    StatusCode::UNAUTHORIZED,
                    "{op} must demand a bearer token"
                );
            } else {
                assert_ne!(
                    response.status(),
                    StatusCode::UNAUTHORIZED,
                    "{op} must be reachable anonymously"
                );
            }
        }
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() {
        let mocks = Mocks::new();
        let module = NetworkModule::new(
            NetworkConfig {
                body_limit: 64,
                ..NetworkConfig::default()
            },
            Arc::new(mocks.service()),
            Arc::new(RateLimiter::new(QuotaTable::new(Vec::new()))),
            Arc::new(TokenVerifier::new(b"test-secret")),
        );
        module.shutdown_controller().set_ready();
        let router = module.build_router();

        let body = format!(
            r#"{{"email":"a@example.com","username":"u","password":"{}"}}"#,
            "x".repeat(512)
        );
        let response = router.oneshot(post_json("/v1/SignUp", &body)).await.unwrap();
        assert!(response.status().is_client_error());
        assert!(mocks.log.calls().is_empty());
    }

    #[tokio::test]
    async fn malformed_body_maps_to_the_error_envelope() {
        let (module, _mocks) = module_with(Vec::new());
        module.shutdown_controller().set_ready();
        let router = module.build_router();

        let response = router
            .oneshot(post_json("/v1/SignUp", "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn validation_failure_is_a_bad_request() {
        let (module, mocks) = module_with(Vec::new());
        module.shutdown_controller().set_ready();
        let router = module.build_router();

        let body = r#"{"email":"no-at-sign","username":"u","password":"longenough"}"#;
        let response = router.oneshot(post_json("/v1/SignUp", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(mocks.log.calls().is_empty());
    }

    #[tokio::test]
    async fn start_binds_an_ephemeral_port() {
        let (mut module, _mocks) = module_with(Vec::new());
        let port = module.start().await.unwrap();
        assert!(port > 0);
    }
}
