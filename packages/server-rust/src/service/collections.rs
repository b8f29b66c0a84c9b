//! Collection operations. Reads of someone else's collection are allowed
//! only when it is public; everything else is owner-only, enforced by the
//! vocabulary service through the forwarded `user_id`.

use lexgate_core::messages::{gateway, vocabulary};
use lexgate_core::{OuterError, RequestContext};

use super::{claims, map_step, trimmed, trimmed_opt, GatewayService};

impl GatewayService {
    pub async fn create_collection(
        &self,
        ctx: &RequestContext,
        req: gateway::CreateCollectionRequest,
    ) -> Result<gateway::CreateCollectionResponse, OuterError> {
        let caller = claims(ctx)?;
        let created = map_step(
            ctx,
            "create_collection",
            self.vocabulary
                .create_collection(
                    ctx,
                    vocabulary::CreateCollectionRequest {
                        user_id: caller.user_id,
                        language_id: req.language_id,
                        name: trimmed(req.name),
                        description: trimmed(req.description),
                        is_public: req.is_public,
                    },
                )
                .await,
            OuterError::failed_to_create_collection,
        )?;
        Ok(gateway::CreateCollectionResponse {
            collection_id: created.collection_id,
        })
    }

    pub async fn update_collection(
        &self,
        ctx: &RequestContext,
        req: gateway::UpdateCollectionRequest,
    ) -> Result<gateway::UpdateCollectionResponse, OuterError> {
        let caller = claims(ctx)?;
        map_step(
            ctx,
            "update_collection",
            self.vocabulary
                .update_collection(
                    ctx,
                    vocabulary::UpdateCollectionRequest {
                        user_id: caller.user_id,
                        collection_id: req.collection_id,
                        language_id: req.language_id,
                        name: trimmed_opt(req.name),
                        description: trimmed_opt(req.description),
                        is_public: req.is_public,
                        is_pinned: req.is_pinned,
                    },
                )
                .await,
            OuterError::failed_to_update_collection,
        )?;
        Ok(gateway::UpdateCollectionResponse::default())
    }

    pub async fn get_collections(
        &self,
        ctx: &RequestContext,
        _req: gateway::GetCollectionsRequest,
    ) -> Result<gateway::GetCollectionsResponse, OuterError> {
        let caller = claims(ctx)?;
        let found = map_step(
            ctx,
            "get_collections",
            self.vocabulary
                .get_collections(
                    ctx,
                    vocabulary::GetCollectionsRequest {
                        user_id: caller.user_id,
                    },
                )
                .await,
            OuterError::failed_to_get_collections,
        )?;
        Ok(gateway::GetCollectionsResponse {
            collections: found.collections,
        })
    }

    pub async fn get_collection(
        &self,
        ctx: &RequestContext,
        req: gateway::GetCollectionRequest,
    ) -> Result<gateway::GetCollectionResponse, OuterError> {
        let caller = claims(ctx)?;
        let collection = self.fetch_collection(ctx, req.collection_id).await?;
        if collection.user_id != caller.user_id && !collection.is_public {
            return Err(OuterError::private_collection());
        }
        Ok(gateway::GetCollectionResponse { collection })
    }

    pub async fn delete_collection(
        &self,
        ctx: &RequestContext,
        req: gateway::DeleteCollectionRequest,
    ) -> Result<gateway::DeleteCollectionResponse, OuterError> {
        let caller = claims(ctx)?;
        map_step(
            ctx,
            "delete_collection",
            self.vocabulary
                .delete_collection(
                    ctx,
                    vocabulary::DeleteCollectionRequest {
                        user_id: caller.user_id,
                        collection_id: req.collection_id,
                    },
                )
                .await,
            OuterError::failed_to_delete_collection,
        )?;
        Ok(gateway::DeleteCollectionResponse::default())
    }

    /// Shared with the term reads, which gate on the same owner-or-public
    /// rule before touching terms.
    pub(super) async fn fetch_collection(
        &self,
        ctx: &RequestContext,
        collection_id: u64,
    ) -> Result<lexgate_core::entities::Collection, OuterError> {
        let found = map_step(
            ctx,
            "get_collection",
            self.vocabulary
                .get_collection(ctx, vocabulary::GetCollectionRequest { collection_id })
                .await,
            OuterError::failed_to_get_collection,
        )?;
        Ok(found.collection)
    }
}
