//! Process configuration, parsed from CLI flags with environment fallback.
//!
//! Every knob has a flag and an env var; defaults give a runnable local
//! setup. Helper methods translate the flat flag surface into the typed
//! configs the subsystems take.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use lexgate_core::Operation;

use crate::admission::QuotaTable;
use crate::clients::NotificationConfig;
use crate::network::{NetworkConfig, TlsConfig};
use crate::rpc::{Endpoint, PoolConfig};

#[derive(Debug, Parser)]
#[command(name = "lexgate", about = "Edge gateway for the vocabulary platform", version)]
pub struct Config {
    // --- HTTP edge ------------------------------------------------------
    #[arg(long, env = "HTTP_HOST", default_value = "0.0.0.0")]
    pub http_host: String,
    #[arg(long, env = "HTTP_PORT", default_value_t = 8080)]
    pub http_port: u16,
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 30_000)]
    pub request_timeout_ms: u64,
    #[arg(long, env = "BODY_LIMIT_BYTES", default_value_t = 1_048_576)]
    pub body_limit_bytes: usize,
    /// How long to wait for in-flight requests after the listener stops.
    #[arg(long, env = "DRAIN_TIMEOUT_MS", default_value_t = 30_000)]
    pub drain_timeout_ms: u64,
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',', default_value = "*")]
    pub cors_origins: Vec<String>,
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<PathBuf>,
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<PathBuf>,

    // --- logging --------------------------------------------------------
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
    #[arg(long, env = "LOG_JSON", default_value_t = false, action = clap::ArgAction::Set)]
    pub log_json: bool,

    // --- auth -----------------------------------------------------------
    /// HS256 secret shared with the auth service. The default is for local
    /// development only.
    #[arg(
        long,
        env = "JWT_ACCESS_SECRET",
        default_value = "dev-access-secret",
        hide_env_values = true
    )]
    pub jwt_access_secret: String,

    // --- metrics --------------------------------------------------------
    #[arg(long, env = "METRICS_ENABLED", default_value_t = false, action = clap::ArgAction::Set)]
    pub metrics_enabled: bool,
    #[arg(long, env = "METRICS_ADDRESS", default_value = "0.0.0.0:9100")]
    pub metrics_address: SocketAddr,

    // --- admission ------------------------------------------------------
    /// When disabled, every operation is admitted without quota checks.
    #[arg(long, env = "RATE_LIMITER_ENABLED", default_value_t = true, action = clap::ArgAction::Set)]
    pub rate_limiter_enabled: bool,
    #[arg(long, env = "QUOTA_SIGN_UP", default_value_t = 30)]
    pub quota_sign_up: u32,
    #[arg(long, env = "QUOTA_SIGN_IN", default_value_t = 60)]
    pub quota_sign_in: u32,
    #[arg(long, env = "QUOTA_LOGOUT", default_value_t = 30)]
    pub quota_logout: u32,
    #[arg(long, env = "QUOTA_REFRESH_TOKENS", default_value_t = 30)]
    pub quota_refresh_tokens: u32,
    #[arg(long, env = "QUOTA_CONFIRM_EMAIL", default_value_t = 30)]
    pub quota_confirm_email: u32,
    #[arg(long, env = "QUOTA_ASK_RESET_PASSWORD", default_value_t = 15)]
    pub quota_ask_reset_password: u32,
    #[arg(long, env = "QUOTA_RESET_PASSWORD", default_value_t = 30)]
    pub quota_reset_password: u32,
    #[arg(long, env = "QUOTA_GET_USER", default_value_t = 120)]
    pub quota_get_user: u32,
    #[arg(long, env = "QUOTA_UPDATE_USER", default_value_t = 60)]
    pub quota_update_user: u32,
    #[arg(long, env = "QUOTA_CREATE_COLLECTION", default_value_t = 60)]
    pub quota_create_collection: u32,
    #[arg(long, env = "QUOTA_UPDATE_COLLECTION", default_value_t = 60)]
    pub quota_update_collection: u32,
    #[arg(long, env = "QUOTA_GET_COLLECTIONS", default_value_t = 120)]
    pub quota_get_collections: u32,
    #[arg(long, env = "QUOTA_GET_COLLECTION", default_value_t = 120)]
    pub quota_get_collection: u32,
    #[arg(long, env = "QUOTA_DELETE_COLLECTION", default_value_t = 60)]
    pub quota_delete_collection: u32,
    #[arg(long, env = "QUOTA_CREATE_TERMS", default_value_t = 120)]
    pub quota_create_terms: u32,
    #[arg(long, env = "QUOTA_GET_TERMS", default_value_t = 120)]
    pub quota_get_terms: u32,
    #[arg(long, env = "QUOTA_UPDATE_TERM", default_value_t = 120)]
    pub quota_update_term: u32,
    #[arg(long, env = "QUOTA_DELETE_TERMS", default_value_t = 120)]
    pub quota_delete_terms: u32,
    #[arg(long, env = "QUOTA_CHANGE_TERM_STATUS", default_value_t = 120)]
    pub quota_change_term_status: u32,
    #[arg(long, env = "QUOTA_GET_LANGUAGES", default_value_t = 120)]
    pub quota_get_languages: u32,
    #[arg(long, env = "QUOTA_GET_VOICEOVER", default_value_t = 120)]
    pub quota_get_voiceover: u32,
    #[arg(long, env = "QUOTA_GET_TRANSLATION", default_value_t = 60)]
    pub quota_get_translation: u32,

    // --- downstream channel pools ---------------------------------------
    /// Channels per downstream pool; also the per-downstream concurrency cap.
    #[arg(long, env = "POOL_SIZE", default_value_t = 10)]
    pub pool_size: usize,
    #[arg(long, env = "POOL_LEASE_TIMEOUT_MS", default_value_t = 30_000)]
    pub pool_lease_timeout_ms: u64,
    #[arg(long, env = "RPC_CONNECT_TIMEOUT_MS", default_value_t = 5_000)]
    pub rpc_connect_timeout_ms: u64,
    #[arg(long, env = "RPC_CALL_TIMEOUT_MS", default_value_t = 60_000)]
    pub rpc_call_timeout_ms: u64,

    #[arg(long, env = "USER_SERVICE_ADDRESS", default_value = "127.0.0.1:6001")]
    pub user_service_address: String,
    #[arg(long, env = "USER_SERVICE_TLS", default_value_t = false, action = clap::ArgAction::Set)]
    pub user_service_tls: bool,
    #[arg(long, env = "AUTH_SERVICE_ADDRESS", default_value = "127.0.0.1:6002")]
    pub auth_service_address: String,
    #[arg(long, env = "AUTH_SERVICE_TLS", default_value_t = false, action = clap::ArgAction::Set)]
    pub auth_service_tls: bool,
    #[arg(long, env = "ACTION_SERVICE_ADDRESS", default_value = "127.0.0.1:6003")]
    pub action_service_address: String,
    #[arg(long, env = "ACTION_SERVICE_TLS", default_value_t = false, action = clap::ArgAction::Set)]
    pub action_service_tls: bool,
    #[arg(long, env = "VOCABULARY_SERVICE_ADDRESS", default_value = "127.0.0.1:6004")]
    pub vocabulary_service_address: String,
    #[arg(long, env = "VOCABULARY_SERVICE_TLS", default_value_t = false, action = clap::ArgAction::Set)]
    pub vocabulary_service_tls: bool,
    #[arg(long, env = "LANGUAGE_SERVICE_ADDRESS", default_value = "127.0.0.1:6005")]
    pub language_service_address: String,
    #[arg(long, env = "LANGUAGE_SERVICE_TLS", default_value_t = false, action = clap::ArgAction::Set)]
    pub language_service_tls: bool,
    #[arg(long, env = "SPEAKER_SERVICE_ADDRESS", default_value = "127.0.0.1:6006")]
    pub speaker_service_address: String,
    #[arg(long, env = "SPEAKER_SERVICE_TLS", default_value_t = false, action = clap::ArgAction::Set)]
    pub speaker_service_tls: bool,
    #[arg(long, env = "TRANSLATION_SERVICE_ADDRESS", default_value = "127.0.0.1:6007")]
    pub translation_service_address: String,
    #[arg(long, env = "TRANSLATION_SERVICE_TLS", default_value_t = false, action = clap::ArgAction::Set)]
    pub translation_service_tls: bool,

    // --- identity provider ----------------------------------------------
    #[arg(long, env = "IDENTITY_API_URL", default_value = "https://www.googleapis.com")]
    pub identity_api_url: String,
    #[arg(long, env = "IDENTITY_TIMEOUT_MS", default_value_t = 10_000)]
    pub identity_timeout_ms: u64,

    // --- notifications --------------------------------------------------
    #[arg(long, env = "NOTIFICATION_ADDRESS", default_value = "127.0.0.1:6010")]
    pub notification_address: String,
    #[arg(long, env = "NOTIFICATION_QUEUE", default_value = "notification.emails")]
    pub notification_queue: String,
    #[arg(long, env = "NOTIFICATION_BUFFER", default_value_t = 1024)]
    pub notification_buffer: usize,
    #[arg(long, env = "NOTIFICATION_SEND_TIMEOUT_MS", default_value_t = 2_000)]
    pub notification_send_timeout_ms: u64,
}

impl Config {
    /// Per-operation quotas; empty (everything admitted) when the rate
    /// limiter is disabled.
    #[must_use]
    pub fn quota_table(&self) -> QuotaTable {
        if !self.rate_limiter_enabled {
            return QuotaTable::new(Vec::new());
        }
        QuotaTable::new([
            (Operation::SignUp, self.quota_sign_up),
            (Operation::SignIn, self.quota_sign_in),
            (Operation::Logout, self.quota_logout),
            (Operation::RefreshTokens, self.quota_refresh_tokens),
            (Operation::ConfirmEmail, self.quota_confirm_email),
            (Operation::AskResetPassword, self.quota_ask_reset_password),
            (Operation::ResetPassword, self.quota_reset_password),
            (Operation::GetUser, self.quota_get_user),
            (Operation::UpdateUser, self.quota_update_user),
            (Operation::CreateCollection, self.quota_create_collection),
            (Operation::UpdateCollection, self.quota_update_collection),
            (Operation::GetCollections, self.quota_get_collections),
            (Operation::GetCollection, self.quota_get_collection),
            (Operation::DeleteCollection, self.quota_delete_collection),
            (Operation::CreateTerms, self.quota_create_terms),
            (Operation::GetTerms, self.quota_get_terms),
            (Operation::UpdateTerm, self.quota_update_term),
            (Operation::DeleteTerms, self.quota_delete_terms),
            (Operation::ChangeTermStatus, self.quota_change_term_status),
            (Operation::GetLanguages, self.quota_get_languages),
            (Operation::GetVoiceover, self.quota_get_voiceover),
            (Operation::GetTranslation, self.quota_get_translation),
        ])
    }

    #[must_use]
    pub fn network_config(&self) -> NetworkConfig {
        let tls = match (&self.tls_cert_path, &self.tls_key_path) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: cert.clone(),
                key_path: key.clone(),
            }),
            _ => None,
        };
        NetworkConfig {
            host: self.http_host.clone(),
            port: self.http_port,
            tls,
            cors_origins: self.cors_origins.clone(),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            body_limit: self.body_limit_bytes,
            drain_timeout: Duration::from_millis(self.drain_timeout_ms),
        }
    }

    #[must_use]
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            size: self.pool_size,
            lease_timeout: Duration::from_millis(self.pool_lease_timeout_ms),
        }
    }

    fn endpoint(&self, addr: &str, tls: bool) -> Endpoint {
        Endpoint {
            addr: addr.to_string(),
            tls,
            connect_timeout: Duration::from_millis(self.rpc_connect_timeout_ms),
            call_timeout: Duration::from_millis(self.rpc_call_timeout_ms),
        }
    }

    #[must_use]
    pub fn user_endpoint(&self) -> Endpoint {
        self.endpoint(&self.user_service_address, self.user_service_tls)
    }

    #[must_use]
    pub fn auth_endpoint(&self) -> Endpoint {
        self.endpoint(&self.auth_service_address, self.auth_service_tls)
    }

    #[must_use]
    pub fn action_endpoint(&self) -> Endpoint {
        self.endpoint(&self.action_service_address, self.action_service_tls)
    }

    #[must_use]
    pub fn vocabulary_endpoint(&self) -> Endpoint {
        self.endpoint(&self.vocabulary_service_address, self.vocabulary_service_tls)
    }

    #[must_use]
    pub fn language_endpoint(&self) -> Endpoint {
        self.endpoint(&self.language_service_address, self.language_service_tls)
    }

    #[must_use]
    pub fn speaker_endpoint(&self) -> Endpoint {
        self.endpoint(&self.speaker_service_address, self.speaker_service_tls)
    }

    #[must_use]
    pub fn translation_endpoint(&self) -> Endpoint {
        self.endpoint(&self.translation_service_address, self.translation_service_tls)
    }

    #[must_use]
    pub fn identity_timeout(&self) -> Duration {
        Duration::from_millis(self.identity_timeout_ms)
    }

    #[must_use]
    pub fn notification_config(&self) -> NotificationConfig {
        NotificationConfig {
            addr: self.notification_address.clone(),
            queue: self.notification_queue.clone(),
            buffer: self.notification_buffer,
            send_timeout: Duration::from_millis(self.notification_send_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Config {
        Config::try_parse_from(["lexgate"]).unwrap()
    }

    #[test]
    fn defaults_parse() {
        let config = defaults();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.pool_size, 10);
        assert!(config.rate_limiter_enabled);
    }

    #[test]
    fn quota_table_carries_per_operation_limits() {
        let table = defaults().quota_table();
        assert_eq!(table.quota(Operation::SignUp), Some(30));
        assert_eq!(table.quota(Operation::AskResetPassword), Some(15));
        assert_eq!(table.quota(Operation::GetLanguages), Some(120));
    }

    #[test]
    fn disabled_rate_limiter_yields_an_empty_table() {
        let config = Config::try_parse_from(["lexgate", "--rate-limiter-enabled", "false"]).unwrap();
        assert_eq!(config.quota_table().quota(Operation::SignUp), None);
    }

    #[test]
    fn tls_requires_both_paths() {
        let config = Config::try_parse_from(["lexgate", "--tls-cert-path", "/tmp/c.pem"]).unwrap();
        assert!(config.network_config().tls.is_none());
    }

    #[test]
    fn tls_paths_flow_into_the_network_config() {
        let config = Config::try_parse_from([
            "lexgate",
            "--tls-cert-path",
            "/etc/lexgate/cert.pem",
            "--tls-key-path",
            "/etc/lexgate/key.pem",
        ])
        .unwrap();
        let tls = config.network_config().tls.unwrap();
        assert_eq!(tls.cert_path, PathBuf::from("/etc/lexgate/cert.pem"));
        assert_eq!(tls.key_path, PathBuf::from("/etc/lexgate/key.pem"));
    }

    #[test]
    fn cors_origins_split_on_commas() {
        let config = Config::try_parse_from([
            "lexgate",
            "--cors-origins",
            "https://a.example.com,https://b.example.com",
        ])
        .unwrap();
        assert_eq!(config.cors_origins.len(), 2);
    }

    #[test]
    fn endpoints_share_the_rpc_timeouts() {
        let config = defaults();
        let endpoint = config.vocabulary_endpoint();
        assert_eq!(endpoint.call_timeout, Duration::from_millis(60_000));
        assert!(!endpoint.tls);
    }
}
