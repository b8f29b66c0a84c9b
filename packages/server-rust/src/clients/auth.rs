//! Auth service client.

use async_trait::async_trait;
use lexgate_core::messages::auth::{
    DeleteTokensRequest, DeleteTokensResponse, GenerateTokensRequest, GenerateTokensResponse,
    RefreshTokensRequest, RefreshTokensResponse,
};
use lexgate_core::RequestContext;

use super::{call_pooled, AuthApi, ClientError};
use crate::rpc::ChannelPool;

#[derive(Debug)]
pub struct AuthClient {
    pool: ChannelPool,
}

impl AuthClient {
    #[must_use]
    pub fn new(pool: ChannelPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthApi for AuthClient {
    async fn generate_tokens(
        &self,
        ctx: &RequestContext,
        req: GenerateTokensRequest,
    ) -> Result<GenerateTokensResponse, ClientError> {
        call_pooled(&self.pool, ctx, "auth.GenerateTokens", &req).await
    }

    async fn refresh_tokens(
        &self,
        ctx: &RequestContext,
        req: RefreshTokensRequest,
    ) -> Result<RefreshTokensResponse, ClientError> {
        call_pooled(&self.pool, ctx, "auth.RefreshTokens", &req).await
    }

    async fn delete_tokens(
        &self,
        ctx: &RequestContext,
        req: DeleteTokensRequest,
    ) -> Result<DeleteTokensResponse, ClientError> {
        call_pooled(&self.pool, ctx, "auth.DeleteTokens", &req).await
    }
}
