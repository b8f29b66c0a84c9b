//! Action service client.

use async_trait::async_trait;
use lexgate_core::messages::action::{
    CreateActionRequest, CreateActionResponse, ExecuteActionRequest, ExecuteActionResponse,
};
use lexgate_core::RequestContext;

use super::{call_pooled, ActionApi, ClientError};
use crate::rpc::ChannelPool;

#[derive(Debug)]
pub struct ActionClient {
    pool: ChannelPool,
}

impl ActionClient {
    #[must_use]
    pub fn new(pool: ChannelPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActionApi for ActionClient {
    async fn create_action(
        &self,
        ctx: &RequestContext,
        req: CreateActionRequest,
    ) -> Result<CreateActionResponse, ClientError> {
        call_pooled(&self.pool, ctx, "action.CreateAction", &req).await
    }

    async fn execute_action(
        &self,
        ctx: &RequestContext,
        req: ExecuteActionRequest,
    ) -> Result<ExecuteActionResponse, ClientError> {
        call_pooled(&self.pool, ctx, "action.ExecuteAction", &req).await
    }
}
