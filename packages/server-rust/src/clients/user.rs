//! User service client.

use async_trait::async_trait;
use lexgate_core::messages::user::{
    CreateUserRequest, CreateUserResponse, GetUserByCredentialsRequest,
    GetUserByCredentialsResponse, GetUserRequest, GetUserResponse, UpdateUserRequest,
    UpdateUserResponse,
};
use lexgate_core::RequestContext;

use super::{call_pooled, ClientError, UserApi};
use crate::rpc::ChannelPool;

#[derive(Debug)]
pub struct UserClient {
    pool: ChannelPool,
}

impl UserClient {
    #[must_use]
    pub fn new(pool: ChannelPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserApi for UserClient {
    async fn get_user(
        &self,
        ctx: &RequestContext,
        req: GetUserRequest,
    ) -> Result<GetUserResponse, ClientError> {
        call_pooled(&self.pool, ctx, "user.GetUser", &req).await
    }

    async fn get_user_by_credentials(
        &self,
        ctx: &RequestContext,
        req: GetUserByCredentialsRequest,
    ) -> Result<GetUserByCredentialsResponse, ClientError> {
        call_pooled(&self.pool, ctx, "user.GetUserByCredentials", &req).await
    }

    async fn create_user(
        &self,
        ctx: &RequestContext,
        req: CreateUserRequest,
    ) -> Result<CreateUserResponse, ClientError> {
        call_pooled(&self.pool, ctx, "user.CreateUser", &req).await
    }

    async fn update_user(
        &self,
        ctx: &RequestContext,
        req: UpdateUserRequest,
    ) -> Result<UpdateUserResponse, ClientError> {
        call_pooled(&self.pool, ctx, "user.UpdateUser", &req).await
    }
}
