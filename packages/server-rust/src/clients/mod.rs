//! Typed clients for the downstream services.
//!
//! The orchestrator talks to every downstream through a capability trait,
//! so its tests can swap in in-memory fakes. Production implementations
//! wrap a [`ChannelPool`](crate::rpc::ChannelPool) each, except the
//! identity client (outbound HTTPS) and the notification client
//! (fire-and-forget queue publisher).

mod action;
mod auth;
mod identity;
mod language;
mod notification;
mod speaker;
mod translation;
mod user;
mod vocabulary;

pub use action::ActionClient;
pub use auth::AuthClient;
pub use identity::IdentityClient;
pub use language::LanguageClient;
pub use notification::{NotificationClient, NotificationConfig, PublishError};
pub use speaker::SpeakerClient;
pub use translation::TranslationClient;
pub use user::UserClient;
pub use vocabulary::VocabularyClient;

use async_trait::async_trait;
use lexgate_core::entities::IdentityProfile;
use lexgate_core::messages;
use lexgate_core::rpc::CallMetadata;
use lexgate_core::{RequestContext, RpcCode, RpcError};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::metrics::POOL_LEASE_TIMEOUTS_TOTAL;
use crate::rpc::{ChannelPool, PoolError};

/// Failure of one downstream call, before it is mapped to an outer error.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error("identity provider: {0}")]
    Identity(String),
    #[error("encode payload: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
}

impl ClientError {
    /// The remote's status code, when the failure came from the remote.
    #[must_use]
    pub fn rpc_code(&self) -> Option<RpcCode> {
        match self {
            ClientError::Rpc(err) => Some(err.code),
            ClientError::Pool(PoolError::Connect(err)) => Some(err.code),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        self.rpc_code() == Some(RpcCode::AlreadyExists)
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.rpc_code() == Some(RpcCode::NotFound)
    }

    /// The remote's own message, when the failure came from the remote.
    #[must_use]
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            ClientError::Rpc(err) => Some(&err.message),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Identity(err.to_string())
    }
}

/// Leases a channel from the pool, performs one call, and returns the
/// channel. Channels poisoned by transport failures are discarded by the
/// lease on drop.
pub(crate) async fn call_pooled<Req, Resp>(
    pool: &ChannelPool,
    ctx: &RequestContext,
    method: &str,
    request: &Req,
) -> Result<Resp, ClientError>
where
    Req: Serialize + Sync,
    Resp: DeserializeOwned,
{
    let mut lease = match pool.lease().await {
        Ok(lease) => lease,
        Err(err) => {
            if matches!(err, PoolError::LeaseTimeout(_)) {
                let service = method.split('.').next().unwrap_or("unknown").to_string();
                metrics::counter!(POOL_LEASE_TIMEOUTS_TOTAL, "service" => service).increment(1);
            }
            return Err(err.into());
        }
    };
    let response = lease
        .call(method, CallMetadata::from_context(ctx), request)
        .await?;
    Ok(response)
}

// --- capability traits -------------------------------------------------

#[async_trait]
pub trait UserApi: Send + Sync {
    async fn get_user(
        &self,
        ctx: &RequestContext,
        req: messages::user::GetUserRequest,
    ) -> Result<messages::user::GetUserResponse, ClientError>;

    async fn get_user_by_credentials(
        &self,
        ctx: &RequestContext,
        req: messages::user::GetUserByCredentialsRequest,
    ) -> Result<messages::user::GetUserByCredentialsResponse, ClientError>;

    async fn create_user(
        &self,
        ctx: &RequestContext,
        req: messages::user::CreateUserRequest,
    ) -> Result<messages::user::CreateUserResponse, ClientError>;

    async fn update_user(
        &self,
        ctx: &RequestContext,
        req: messages::user::UpdateUserRequest,
    ) -> Result<messages::user::UpdateUserResponse, ClientError>;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn generate_tokens(
        &self,
        ctx: &RequestContext,
        req: messages::auth::GenerateTokensRequest,
    ) -> Result<messages::auth::GenerateTokensResponse, ClientError>;

    async fn refresh_tokens(
        &self,
        ctx: &RequestContext,
        req: messages::auth::RefreshTokensRequest,
    ) -> Result<messages::auth::RefreshTokensResponse, ClientError>;

    async fn delete_tokens(
        &self,
        ctx: &RequestContext,
        req: messages::auth::DeleteTokensRequest,
    ) -> Result<messages::auth::DeleteTokensResponse, ClientError>;
}

#[async_trait]
pub trait ActionApi: Send + Sync {
    async fn create_action(
        &self,
        ctx: &RequestContext,
        req: messages::action::CreateActionRequest,
    ) -> Result<messages::action::CreateActionResponse, ClientError>;

    async fn execute_action(
        &self,
        ctx: &RequestContext,
        req: messages::action::ExecuteActionRequest,
    ) -> Result<messages::action::ExecuteActionResponse, ClientError>;
}

#[async_trait]
pub trait VocabularyApi: Send + Sync {
    async fn create_collection(
        &self,
        ctx: &RequestContext,
        req: messages::vocabulary::CreateCollectionRequest,
    ) -> Result<messages::vocabulary::CreateCollectionResponse, ClientError>;

    async fn update_collection(
        &self,
        ctx: &RequestContext,
        req: messages::vocabulary::UpdateCollectionRequest,
    ) -> Result<messages::vocabulary::UpdateCollectionResponse, ClientError>;

    async fn get_collections(
        &self,
        ctx: &RequestContext,
        req: messages::vocabulary::GetCollectionsRequest,
    ) -> Result<messages::vocabulary::GetCollectionsResponse, ClientError>;

    async fn get_collection(
        &self,
        ctx: &RequestContext,
        req: messages::vocabulary::GetCollectionRequest,
    ) -> Result<messages::vocabulary::GetCollectionResponse, ClientError>;

    async fn delete_collection(
        &self,
        ctx: &RequestContext,
        req: messages::vocabulary::DeleteCollectionRequest,
    ) -> Result<messages::vocabulary::DeleteCollectionResponse, ClientError>;

    async fn create_terms(
        &self,
        ctx: &RequestContext,
        req: messages::vocabulary::CreateTermsRequest,
    ) -> Result<messages::vocabulary::CreateTermsResponse, ClientError>;

    async fn get_terms(
        &self,
        ctx: &RequestContext,
        req: messages::vocabulary::GetTermsRequest,
    ) -> Result<messages::vocabulary::GetTermsResponse, ClientError>;

    async fn update_term(
        &self,
        ctx: &RequestContext,
        req: messages::vocabulary::UpdateTermRequest,
    ) -> Result<messages::vocabulary::UpdateTermResponse, ClientError>;

    async fn delete_terms(
        &self,
        ctx: &RequestContext,
        req: messages::vocabulary::DeleteTermsRequest,
    ) -> Result<messages::vocabulary::DeleteTermsResponse, ClientError>;

    async fn change_term_status(
        &self,
        ctx: &RequestContext,
        req: messages::vocabulary::ChangeTermStatusRequest,
    ) -> Result<messages::vocabulary::ChangeTermStatusResponse, ClientError>;
}

#[async_trait]
pub trait LanguageApi: Send + Sync {
    async fn get_languages(
        &self,
        ctx: &RequestContext,
        req: messages::language::GetLanguagesRequest,
    ) -> Result<messages::language::GetLanguagesResponse, ClientError>;
}

#[async_trait]
pub trait SpeakerApi: Send + Sync {
    async fn get_voiceover(
        &self,
        ctx: &RequestContext,
        req: messages::speaker::GetVoiceoverRequest,
    ) -> Result<messages::speaker::GetVoiceoverResponse, ClientError>;
}

#[async_trait]
pub trait TranslationApi: Send + Sync {
    async fn get_translation(
        &self,
        ctx: &RequestContext,
        req: messages::translation::GetTranslationRequest,
    ) -> Result<messages::translation::GetTranslationResponse, ClientError>;
}

#[async_trait]
pub trait NotificationApi: Send + Sync {
    async fn send_email(
        &self,
        ctx: &RequestContext,
        req: messages::notification::SendEmailRequest,
    ) -> Result<(), ClientError>;
}

#[async_trait]
pub trait IdentityApi: Send + Sync {
    async fn get_profile(
        &self,
        ctx: &RequestContext,
        access_token: &str,
    ) -> Result<IdentityProfile, ClientError>;
}
