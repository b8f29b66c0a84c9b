//! Gateway entrypoint: parse config, warm the downstream pools, and serve
//! until SIGINT/SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lexgate_server::admission::RateLimiter;
use lexgate_server::clients::{
    ActionClient, AuthClient, IdentityClient, LanguageClient, NotificationClient, SpeakerClient,
    TranslationClient, UserClient, VocabularyClient,
};
use lexgate_server::config::Config;
use lexgate_server::network::{NetworkModule, TokenVerifier};
use lexgate_server::rpc::{ChannelPool, Endpoint};
use lexgate_server::metrics;
use lexgate_server::service::{Downstreams, GatewayService};

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Dials one channel up front so a misconfigured downstream fails the
/// process at startup instead of on the first request.
async fn warmed_pool(config: &Config, name: &str, endpoint: Endpoint) -> anyhow::Result<ChannelPool> {
    let pool = ChannelPool::for_endpoint(endpoint, config.pool_config());
    pool.warm()
        .await
        .with_context(|| format!("failed to reach the {name} service"))?;
    info!(service = name, "downstream pool warmed");
    Ok(pool)
}

async fn build_downstreams(config: &Config) -> anyhow::Result<Downstreams> {
    let users = UserClient::new(warmed_pool(config, "user", config.user_endpoint()).await?);
    let auth = AuthClient::new(warmed_pool(config, "auth", config.auth_endpoint()).await?);
    let actions = ActionClient::new(warmed_pool(config, "action", config.action_endpoint()).await?);
    let vocabulary =
        VocabularyClient::new(warmed_pool(config, "vocabulary", config.vocabulary_endpoint()).await?);
    let languages =
        LanguageClient::new(warmed_pool(config, "language", config.language_endpoint()).await?);
    let speaker = SpeakerClient::new(warmed_pool(config, "speaker", config.speaker_endpoint()).await?);
    let translation =
        TranslationClient::new(warmed_pool(config, "translation", config.translation_endpoint()).await?);
    let notifications = NotificationClient::start(config.notification_config());
    let identity = IdentityClient::new(&config.identity_api_url, config.identity_timeout())
        .context("failed to build the identity client")?;

    Ok(Downstreams {
        users: Arc::new(users),
        auth: Arc::new(auth),
        actions: Arc::new(actions),
        vocabulary: Arc::new(vocabulary),
        languages: Arc::new(languages),
        speaker: Arc::new(speaker),
        translation: Arc::new(translation),
        notifications: Arc::new(notifications),
        identity: Arc::new(identity),
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install the Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install the SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(&config);

    if config.metrics_enabled {
        metrics::install(config.metrics_address).context("failed to start the metrics exporter")?;
        info!(address = %config.metrics_address, "metrics exporter listening");
    }

    let downstreams = build_downstreams(&config).await?;
    let service = Arc::new(GatewayService::new(downstreams));
    let limiter = Arc::new(RateLimiter::new(config.quota_table()));
    let verifier = Arc::new(TokenVerifier::new(config.jwt_access_secret.as_bytes()));

    let mut module = NetworkModule::new(config.network_config(), service, limiter, verifier);
    let port = module.start().await.context("failed to bind the listener")?;
    info!(port, "gateway ready");

    module.serve(shutdown_signal()).await?;
    info!("gateway stopped");
    Ok(())
}
