//! Vocabulary service client.

use async_trait::async_trait;
use lexgate_core::messages::vocabulary::{
    ChangeTermStatusRequest, ChangeTermStatusResponse, CreateCollectionRequest,
    CreateCollectionResponse, CreateTermsRequest, CreateTermsResponse, DeleteCollectionRequest,
    DeleteCollectionResponse, DeleteTermsRequest, DeleteTermsResponse, GetCollectionRequest,
    GetCollectionResponse, GetCollectionsRequest, GetCollectionsResponse, GetTermsRequest,
    GetTermsResponse, UpdateCollectionRequest, UpdateCollectionResponse, UpdateTermRequest,
    UpdateTermResponse,
};
use lexgate_core::RequestContext;

use super::{call_pooled, ClientError, VocabularyApi};
use crate::rpc::ChannelPool;

#[derive(Debug)]
pub struct VocabularyClient {
    pool: ChannelPool,
}

impl VocabularyClient {
    #[must_use]
    pub fn new(pool: ChannelPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VocabularyApi for VocabularyClient {
    async fn create_collection(
        &self,
        ctx: &RequestContext,
        req: CreateCollectionRequest,
    ) -> Result<CreateCollectionResponse, ClientError> {
        call_pooled(&self.pool, ctx, "vocabulary.CreateCollection", &req).await
    }

    async fn update_collection(
        &self,
        ctx: &RequestContext,
        req: UpdateCollectionRequest,
    ) -> Result<UpdateCollectionResponse, ClientError> {
        call_pooled(&self.pool, ctx, "vocabulary.UpdateCollection", &req).await
    }

    async fn get_collections(
        &self,
        ctx: &RequestContext,
        req: GetCollectionsRequest,
    ) -> Result<GetCollectionsResponse, ClientError> {
        call_pooled(&self.pool, ctx, "vocabulary.GetCollections", &req).await
    }

    async fn get_collection(
        &self,
        ctx: &RequestContext,
        req: GetCollectionRequest,
    ) -> Result<GetCollectionResponse, ClientError> {
        call_pooled(&self.pool, ctx, "vocabulary.GetCollection", &req).await
    }

    async fn delete_collection(
        &self,
        ctx: &RequestContext,
        req: DeleteCollectionRequest,
    ) -> Result<DeleteCollectionResponse, ClientError> {
        call_pooled(&self.pool, ctx, "vocabulary.DeleteCollection", &req).await
    }

    async fn create_terms(
        &self,
        ctx: &RequestContext,
        req: CreateTermsRequest,
    ) -> Result<CreateTermsResponse, ClientError> {
        call_pooled(&self.pool, ctx, "vocabulary.CreateTerms", &req).await
    }

    async fn get_terms(
        &self,
        ctx: &RequestContext,
        req: GetTermsRequest,
    ) -> Result<GetTermsResponse, ClientError> {
        call_pooled(&self.pool, ctx, "vocabulary.GetTerms", &req).await
    }

    async fn update_term(
        &self,
        ctx: &RequestContext,
        req: UpdateTermRequest,
    ) -> Result<UpdateTermResponse, ClientError> {
        call_pooled(&self.pool, ctx, "vocabulary.UpdateTerm", &req).await
    }

    async fn delete_terms(
        &self,
        ctx: &RequestContext,
        req: DeleteTermsRequest,
    ) -> Result<DeleteTermsResponse, ClientError> {
        call_pooled(&self.pool, ctx, "vocabulary.DeleteTerms", &req).await
    }

    async fn change_term_status(
        &self,
        ctx: &RequestContext,
        req: ChangeTermStatusRequest,
    ) -> Result<ChangeTermStatusResponse, ClientError> {
        call_pooled(&self.pool, ctx, "vocabulary.ChangeTermStatus", &req).await
    }
}
