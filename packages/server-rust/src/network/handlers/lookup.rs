//! Lookup endpoint handlers.

use axum::extract::State;
use axum::{Extension, Json};
use lexgate_core::messages::gateway;
use lexgate_core::{OuterError, RequestContext};

use super::{ApiError, ApiJson, AppState};

pub async fn get_languages(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<gateway::GetLanguagesResponse>, ApiError> {
    Ok(Json(
        state
            .service
            .get_languages(&ctx, gateway::GetLanguagesRequest::default())
            .await?,
    ))
}

pub async fn get_voiceover(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<gateway::GetVoiceoverRequest>,
) -> Result<Json<gateway::GetVoiceoverResponse>, ApiError> {
    req.validate().map_err(OuterError::bad_request)?;
    Ok(Json(state.service.get_voiceover(&ctx, req).await?))
}

pub async fn get_translation(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<gateway::GetTranslationRequest>,
) -> Result<Json<gateway::GetTranslationResponse>, ApiError> {
    req.validate().map_err(OuterError::bad_request)?;
    Ok(Json(state.service.get_translation(&ctx, req).await?))
}
