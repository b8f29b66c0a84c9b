//! Account endpoint handlers.

use axum::extract::State;
use axum::{Extension, Json};
use lexgate_core::messages::gateway;
use lexgate_core::{OuterError, RequestContext};

use super::{ApiError, ApiJson, AppState};

pub async fn sign_up(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<gateway::SignUpRequest>,
) -> Result<Json<gateway::SignUpResponse>, ApiError> {
    req.validate().map_err(OuterError::bad_request)?;
    Ok(Json(state.service.sign_up(&ctx, req).await?))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<gateway::SignInRequest>,
) -> Result<Json<gateway::SignInResponse>, ApiError> {
    req.validate().map_err(OuterError::bad_request)?;
    Ok(Json(state.service.sign_in(&ctx, req).await?))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<gateway::LogoutResponse>, ApiError> {
    Ok(Json(
        state
            .service
            .logout(&ctx, gateway::LogoutRequest::default())
            .await?,
    ))
}

pub async fn refresh_tokens(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<gateway::RefreshTokensRequest>,
) -> Result<Json<gateway::RefreshTokensResponse>, ApiError> {
    req.validate().map_err(OuterError::bad_request)?;
    Ok(Json(state.service.refresh_tokens(&ctx, req).await?))
}

pub async fn confirm_email(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<gateway::ConfirmEmailRequest>,
) -> Result<Json<gateway::ConfirmEmailResponse>, ApiError> {
    req.validate().map_err(OuterError::bad_request)?;
    Ok(Json(state.service.confirm_email(&ctx, req).await?))
}

pub async fn ask_reset_password(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<gateway::AskResetPasswordRequest>,
) -> Result<Json<gateway::AskResetPasswordResponse>, ApiError> {
    req.validate().map_err(OuterError::bad_request)?;
    Ok(Json(state.service.ask_reset_password(&ctx, req).await?))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<gateway::ResetPasswordRequest>,
) -> Result<Json<gateway::ResetPasswordResponse>, ApiError> {
    req.validate().map_err(OuterError::bad_request)?;
    Ok(Json(state.service.reset_password(&ctx, req).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<gateway::GetUserResponse>, ApiError> {
    Ok(Json(
        state
            .service
            .get_user(&ctx, gateway::GetUserRequest::default())
            .await?,
    ))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<gateway::UpdateUserRequest>,
) -> Result<Json<gateway::UpdateUserResponse>, ApiError> {
    Ok(Json(state.service.update_user(&ctx, req).await?))
}
