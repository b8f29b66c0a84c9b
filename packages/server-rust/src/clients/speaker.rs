//! Speaker service client.

use async_trait::async_trait;
use lexgate_core::messages::speaker::{GetVoiceoverRequest, GetVoiceoverResponse};
use lexgate_core::RequestContext;

use super::{call_pooled, ClientError, SpeakerApi};
use crate::rpc::ChannelPool;

#[derive(Debug)]
pub struct SpeakerClient {
    pool: ChannelPool,
}

impl SpeakerClient {
    #[must_use]
    pub fn new(pool: ChannelPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpeakerApi for SpeakerClient {
    async fn get_voiceover(
        &self,
        ctx: &RequestContext,
        req: GetVoiceoverRequest,
    ) -> Result<GetVoiceoverResponse, ClientError> {
        call_pooled(&self.pool, ctx, "speaker.GetVoiceover", &req).await
    }
}
