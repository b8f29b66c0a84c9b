//! Term operations. Batch creation is validated locally before any
//! downstream call; reads reuse the collection owner-or-public gate.

use lexgate_core::messages::{gateway, vocabulary};
use lexgate_core::{OuterError, RequestContext};

use super::{claims, map_step, trimmed, trimmed_opt, GatewayService};

impl GatewayService {
    /// A batch must target exactly one collection, and that collection must
    /// belong to the caller. Both checks run before the batch is sent.
    pub async fn create_terms(
        &self,
        ctx: &RequestContext,
        req: gateway::CreateTermsRequest,
    ) -> Result<gateway::CreateTermsResponse, OuterError> {
        let caller = claims(ctx)?;

        let Some(first) = req.terms.first() else {
            return Err(OuterError::failed_to_create_terms());
        };
        let collection_id = first.collection_id;
        if req.terms.iter().any(|t| t.collection_id != collection_id) {
            return Err(OuterError::cross_collection_batch());
        }

        let collection = self.fetch_collection(ctx, collection_id).await?;
        if collection.user_id != caller.user_id {
            return Err(OuterError::private_collection());
        }

        let terms = req
            .terms
            .into_iter()
            .map(|t| vocabulary::NewTerm {
                collection_id: t.collection_id,
                term_language_id: t.term_language_id,
                meaning_language_id: t.meaning_language_id,
                term: trimmed(t.term),
                meaning: trimmed(t.meaning),
                example: trimmed_opt(t.example),
                image_url: t.image_url,
            })
            .collect();

        map_step(
            ctx,
            "create_terms",
            self.vocabulary
                .create_terms(ctx, vocabulary::CreateTermsRequest { terms })
                .await,
            OuterError::failed_to_create_terms,
        )?;
        Ok(gateway::CreateTermsResponse::default())
    }

    pub async fn get_terms(
        &self,
        ctx: &RequestContext,
        req: gateway::GetTermsRequest,
    ) -> Result<gateway::GetTermsResponse, OuterError> {
        let caller = claims(ctx)?;
        let collection = self.fetch_collection(ctx, req.collection_id).await?;
        if collection.user_id != caller.user_id && !collection.is_public {
            return Err(OuterError::private_collection());
        }

        let found = map_step(
            ctx,
            "get_terms",
            self.vocabulary
                .get_terms(
                    ctx,
                    vocabulary::GetTermsRequest {
                        collection_id: req.collection_id,
                    },
                )
                .await,
            OuterError::failed_to_get_terms,
        )?;
        Ok(gateway::GetTermsResponse { terms: found.terms })
    }

    pub async fn update_term(
        &self,
        ctx: &RequestContext,
        req: gateway::UpdateTermRequest,
    ) -> Result<gateway::UpdateTermResponse, OuterError> {
        let caller = claims(ctx)?;
        map_step(
            ctx,
            "update_term",
            self.vocabulary
                .update_term(
                    ctx,
                    vocabulary::UpdateTermRequest {
                        user_id: caller.user_id,
                        term_id: req.term_id,
                        term_language_id: req.term_language_id,
                        meaning_language_id: req.meaning_language_id,
                        term: trimmed_opt(req.term),
                        meaning: trimmed_opt(req.meaning),
                        example: trimmed_opt(req.example),
                        image_url: req.image_url,
                    },
                )
                .await,
            OuterError::failed_to_update_term,
        )?;
        Ok(gateway::UpdateTermResponse::default())
    }

    pub async fn delete_terms(
        &self,
        ctx: &RequestContext,
        req: gateway::DeleteTermsRequest,
    ) -> Result<gateway::DeleteTermsResponse, OuterError> {
        let caller = claims(ctx)?;
        map_step(
            ctx,
            "delete_terms",
            self.vocabulary
                .delete_terms(
                    ctx,
                    vocabulary::DeleteTermsRequest {
                        user_id: caller.user_id,
                        collection_id: req.collection_id,
                        term_ids: req.term_ids,
                    },
                )
                .await,
            OuterError::failed_to_delete_terms,
        )?;
        Ok(gateway::DeleteTermsResponse::default())
    }

    pub async fn change_term_status(
        &self,
        ctx: &RequestContext,
        req: gateway::ChangeTermStatusRequest,
    ) -> Result<gateway::ChangeTermStatusResponse, OuterError> {
        let caller = claims(ctx)?;
        map_step(
            ctx,
            "change_term_status",
            self.vocabulary
                .change_term_status(
                    ctx,
                    vocabulary::ChangeTermStatusRequest {
                        user_id: caller.user_id,
                        term_id: req.term_id,
                        status: req.status,
                    },
                )
                .await,
            OuterError::failed_to_change_term_status,
        )?;
        Ok(gateway::ChangeTermStatusResponse::default())
    }
}
