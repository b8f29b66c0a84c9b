//! Language service client.

use async_trait::async_trait;
use lexgate_core::messages::language::{GetLanguagesRequest, GetLanguagesResponse};
use lexgate_core::RequestContext;

use super::{call_pooled, ClientError, LanguageApi};
use crate::rpc::ChannelPool;

#[derive(Debug)]
pub struct LanguageClient {
    pool: ChannelPool,
}

impl LanguageClient {
    #[must_use]
    pub fn new(pool: ChannelPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LanguageApi for LanguageClient {
    async fn get_languages(
        &self,
        ctx: &RequestContext,
        req: GetLanguagesRequest,
    ) -> Result<GetLanguagesResponse, ClientError> {
        call_pooled(&self.pool, ctx, "language.GetLanguages", &req).await
    }
}
