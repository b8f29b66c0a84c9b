//! Collection and term endpoint handlers.

use axum::extract::State;
use axum::{Extension, Json};
use lexgate_core::messages::gateway;
use lexgate_core::{OuterError, RequestContext};

use super::{ApiError, ApiJson, AppState};

pub async fn create_collection(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<gateway::CreateCollectionRequest>,
) -> Result<Json<gateway::CreateCollectionResponse>, ApiError> {
    req.validate().map_err(OuterError::bad_request)?;
    Ok(Json(state.service.create_collection(&ctx, req).await?))
}

pub async fn update_collection(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<gateway::UpdateCollectionRequest>,
) -> Result<Json<gateway::UpdateCollectionResponse>, ApiError> {
    Ok(Json(state.service.update_collection(&ctx, req).await?))
}

pub async fn get_collections(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<gateway::GetCollectionsResponse>, ApiError> {
    Ok(Json(
        state
            .service
            .get_collections(&ctx, gateway::GetCollectionsRequest::default())
            .await?,
    ))
}

pub async fn get_collection(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<gateway::GetCollectionRequest>,
) -> Result<Json<gateway::GetCollectionResponse>, ApiError> {
    Ok(Json(state.service.get_collection(&ctx, req).await?))
}

pub async fn delete_collection(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<gateway::DeleteCollectionRequest>,
) -> Result<Json<gateway::DeleteCollectionResponse>, ApiError> {
    Ok(Json(state.service.delete_collection(&ctx, req).await?))
}

pub async fn create_terms(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<gateway::CreateTermsRequest>,
) -> Result<Json<gateway::CreateTermsResponse>, ApiError> {
    req.validate().map_err(OuterError::bad_request)?;
    Ok(Json(state.service.create_terms(&ctx, req).await?))
}

pub async fn get_terms(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<gateway::GetTermsRequest>,
) -> Result<Json<gateway::GetTermsResponse>, ApiError> {
    Ok(Json(state.service.get_terms(&ctx, req).await?))
}

pub async fn update_term(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<gateway::UpdateTermRequest>,
) -> Result<Json<gateway::UpdateTermResponse>, ApiError> {
    Ok(Json(state.service.update_term(&ctx, req).await?))
}

pub async fn delete_terms(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<gateway::DeleteTermsRequest>,
) -> Result<Json<gateway::DeleteTermsResponse>, ApiError> {
    req.validate().map_err(OuterError::bad_request)?;
    Ok(Json(state.service.delete_terms(&ctx, req).await?))
}

pub async fn change_term_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<gateway::ChangeTermStatusRequest>,
) -> Result<Json<gateway::ChangeTermStatusResponse>, ApiError> {
    Ok(Json(state.service.change_term_status(&ctx, req).await?))
}
