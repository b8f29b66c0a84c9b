//! Translation service client.

use async_trait::async_trait;
use lexgate_core::messages::translation::{GetTranslationRequest, GetTranslationResponse};
use lexgate_core::RequestContext;

use super::{call_pooled, ClientError, TranslationApi};
use crate::rpc::ChannelPool;

#[derive(Debug)]
pub struct TranslationClient {
    pool: ChannelPool,
}

impl TranslationClient {
    #[must_use]
    pub fn new(pool: ChannelPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TranslationApi for TranslationClient {
    async fn get_translation(
        &self,
        ctx: &RequestContext,
        req: GetTranslationRequest,
    ) -> Result<GetTranslationResponse, ClientError> {
        call_pooled(&self.pool, ctx, "translation.GetTranslation", &req).await
    }
}
