//! Account operations: registration, both sign-in paths, token lifecycle,
//! email confirmation, and password reset.

use lexgate_core::messages::action::{
    ActionParams, CreateActionRequest, ExecuteActionRequest, ExecuteParams,
};
use lexgate_core::messages::notification::{EmailKind, SendEmailRequest};
use lexgate_core::messages::{auth, gateway, user};
use lexgate_core::{OuterError, RequestContext, RpcCode};
use rand::Rng;
use tracing::error;

use super::{claims, map_step, now_ms, trimmed, GatewayService};
use crate::clients::ClientError;

impl GatewayService {
    /// Create user, issue tokens, create the email-confirmation action,
    /// send the confirmation email. A duplicate account is the one
    /// downstream error whose message passes through verbatim.
    pub async fn sign_up(
        &self,
        ctx: &RequestContext,
        req: gateway::SignUpRequest,
    ) -> Result<gateway::SignUpResponse, OuterError> {
        let created = self
            .users
            .create_user(
                ctx,
                user::CreateUserRequest {
                    email: trimmed(req.email),
                    username: trimmed(req.username),
                    password: req.password,
                    email_verified_at: None,
                    settings: req.settings,
                },
            )
            .await
            .map_err(|err| {
                if err.is_already_exists() {
                    return OuterError::already_exists(
                        err.remote_message().unwrap_or("already exists"),
                    );
                }
                error!(request_id = %ctx.request_id, error = %err, "downstream call failed");
                OuterError::failed_to_create_user()
            })?;
        let account = created.user;

        let tokens = self.issue_tokens(ctx, account.user_id).await?;

        let action = map_step(
            ctx,
            "create_email_confirmation_action",
            self.actions
                .create_action(
                    ctx,
                    CreateActionRequest {
                        params: ActionParams::EmailConfirmation {
                            user_id: account.user_id,
                        },
                    },
                )
                .await,
            OuterError::failed_to_create_action,
        )?;

        map_step(
            ctx,
            "send_confirmation_email",
            self.notifications
                .send_email(
                    ctx,
                    SendEmailRequest {
                        email: account.email.clone(),
                        kind: EmailKind::EmailConfirmation,
                        action_uuid: action.action_uuid,
                    },
                )
                .await,
            OuterError::failed_to_send_confirmation_email,
        )?;

        Ok(gateway::SignUpResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user: account,
        })
    }

    /// Either sign-in path ends with a token issue against the resolved
    /// account. Only the identity path checks email verification; the
    /// provider's word is the gate there, while credential accounts are
    /// gated at registration time.
    pub async fn sign_in(
        &self,
        ctx: &RequestContext,
        req: gateway::SignInRequest,
    ) -> Result<gateway::SignInResponse, OuterError> {
        let account = match req.identity_token {
            Some(token) => self.resolve_identity_account(ctx, &token).await?,
            None => self.resolve_credentials_account(ctx, req).await?,
        };

        let tokens = self.issue_tokens(ctx, account.user_id).await?;

        Ok(gateway::SignInResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user: account,
        })
    }

    pub async fn logout(
        &self,
        ctx: &RequestContext,
        _req: gateway::LogoutRequest,
    ) -> Result<gateway::LogoutResponse, OuterError> {
        let caller = claims(ctx)?;
        map_step(
            ctx,
            "delete_tokens",
            self.auth
                .delete_tokens(
                    ctx,
                    auth::DeleteTokensRequest {
                        user_id: caller.user_id,
                        token_id: caller.token_id.clone(),
                    },
                )
                .await,
            OuterError::failed_to_delete_tokens,
        )?;
        Ok(gateway::LogoutResponse::default())
    }

    pub async fn refresh_tokens(
        &self,
        ctx: &RequestContext,
        req: gateway::RefreshTokensRequest,
    ) -> Result<gateway::RefreshTokensResponse, OuterError> {
        let refreshed = map_step(
            ctx,
            "refresh_tokens",
            self.auth
                .refresh_tokens(
                    ctx,
                    auth::RefreshTokensRequest {
                        refresh_token: req.refresh_token,
                    },
                )
                .await,
            OuterError::failed_to_refresh_tokens,
        )?;
        Ok(gateway::RefreshTokensResponse {
            access_token: refreshed.access_token,
            refresh_token: refreshed.refresh_token,
        })
    }

    pub async fn confirm_email(
        &self,
        ctx: &RequestContext,
        req: gateway::ConfirmEmailRequest,
    ) -> Result<gateway::ConfirmEmailResponse, OuterError> {
        map_step(
            ctx,
            "execute_email_confirmation",
            self.actions
                .execute_action(
                    ctx,
                    ExecuteActionRequest {
                        action_uuid: req.action_uuid,
                        params: ExecuteParams::EmailConfirmation {},
                    },
                )
                .await,
            OuterError::failed_to_confirm_email,
        )?;
        Ok(gateway::ConfirmEmailResponse::default())
    }

    /// Look up the account, create the reset action, and mail its handle.
    /// An unknown address fails on the lookup, before any action exists.
    pub async fn ask_reset_password(
        &self,
        ctx: &RequestContext,
        req: gateway::AskResetPasswordRequest,
    ) -> Result<gateway::AskResetPasswordResponse, OuterError> {
        let email = trimmed(req.email);
        map_step(
            ctx,
            "get_user_by_email",
            self.users
                .get_user(
                    ctx,
                    user::GetUserRequest {
                        find_by: user::FindUserBy::Email(email.clone()),
                    },
                )
                .await,
            OuterError::failed_to_get_user,
        )?;

        let action = map_step(
            ctx,
            "create_reset_password_action",
            self.actions
                .create_action(
                    ctx,
                    CreateActionRequest {
                        params: ActionParams::ResetPassword {
                            email: email.clone(),
                        },
                    },
                )
                .await,
            OuterError::failed_to_create_action,
        )?;

        map_step(
            ctx,
            "send_reset_password_email",
            self.notifications
                .send_email(
                    ctx,
                    SendEmailRequest {
                        email,
                        kind: EmailKind::ResetPassword,
                        action_uuid: action.action_uuid,
                    },
                )
                .await,
            OuterError::failed_to_send_reset_password_email,
        )?;
        Ok(gateway::AskResetPasswordResponse::default())
    }

    pub async fn reset_password(
        &self,
        ctx: &RequestContext,
        req: gateway::ResetPasswordRequest,
    ) -> Result<gateway::ResetPasswordResponse, OuterError> {
        map_step(
            ctx,
            "execute_reset_password",
            self.actions
                .execute_action(
                    ctx,
                    ExecuteActionRequest {
                        action_uuid: req.action_uuid,
                        params: ExecuteParams::ResetPassword {
                            password: req.password,
                        },
                    },
                )
                .await,
            OuterError::failed_to_reset_password,
        )?;
        Ok(gateway::ResetPasswordResponse::default())
    }

    pub async fn get_user(
        &self,
        ctx: &RequestContext,
        _req: gateway::GetUserRequest,
    ) -> Result<gateway::GetUserResponse, OuterError> {
        let caller = claims(ctx)?;
        let found = map_step(
            ctx,
            "get_user",
            self.users
                .get_user(
                    ctx,
                    user::GetUserRequest {
                        find_by: user::FindUserBy::UserId(caller.user_id),
                    },
                )
                .await,
            OuterError::failed_to_get_user,
        )?;
        Ok(gateway::GetUserResponse { user: found.user })
    }

    pub async fn update_user(
        &self,
        ctx: &RequestContext,
        req: gateway::UpdateUserRequest,
    ) -> Result<gateway::UpdateUserResponse, OuterError> {
        let caller = claims(ctx)?;
        let settings = req.settings.unwrap_or_default();
        map_step(
            ctx,
            "update_user",
            self.users
                .update_user(
                    ctx,
                    user::UpdateUserRequest {
                        user_id: caller.user_id,
                        username: req.username.map(trimmed),
                        speaker_gender: settings.speaker_gender,
                        interface_language_id: settings.interface_language_id,
                    },
                )
                .await,
            OuterError::failed_to_update_user,
        )?;
        Ok(gateway::UpdateUserResponse::default())
    }

    // --- sign-in helpers ---------------------------------------------------

    async fn issue_tokens(
        &self,
        ctx: &RequestContext,
        user_id: u64,
    ) -> Result<auth::GenerateTokensResponse, OuterError> {
        map_step(
            ctx,
            "generate_tokens",
            self.auth
                .generate_tokens(
                    ctx,
                    auth::GenerateTokensRequest {
                        user_id,
                        ip: ctx.client_ip.clone(),
                        device: ctx.device.clone(),
                    },
                )
                .await,
            OuterError::failed_to_generate_tokens,
        )
    }

    /// Resolves the account behind an identity-provider token, provisioning
    /// a local account on first sign-in. Provisioned accounts get generated
    /// credentials and skip email confirmation, since the provider already
    /// verified the address.
    async fn resolve_identity_account(
        &self,
        ctx: &RequestContext,
        token: &str,
    ) -> Result<lexgate_core::entities::User, OuterError> {
        let profile = map_step(
            ctx,
            "get_identity_profile",
            self.identity.get_profile(ctx, token).await,
            OuterError::failed_to_get_identity_profile,
        )?;
        if !profile.verified_email {
            return Err(OuterError::failed_to_sign_in_email_not_confirmed());
        }

        match self
            .users
            .get_user(
                ctx,
                user::GetUserRequest {
                    find_by: user::FindUserBy::Email(profile.email.clone()),
                },
            )
            .await
        {
            Ok(found) => Ok(found.user),
            Err(err) if err.is_not_found() => {
                let created = map_step(
                    ctx,
                    "provision_identity_user",
                    self.users
                        .create_user(
                            ctx,
                            user::CreateUserRequest {
                                email: profile.email,
                                username: generated_username(),
                                password: generated_password(),
                                email_verified_at: Some(now_ms()),
                                settings: None,
                            },
                        )
                        .await,
                    OuterError::failed_to_create_user,
                )?;
                Ok(created.user)
            }
            Err(err) => {
                error!(request_id = %ctx.request_id, error = %err, "downstream call failed");
                Err(OuterError::failed_to_sign_in())
            }
        }
    }

    async fn resolve_credentials_account(
        &self,
        ctx: &RequestContext,
        req: gateway::SignInRequest,
    ) -> Result<lexgate_core::entities::User, OuterError> {
        let Some(password) = req.password else {
            return Err(OuterError::failed_to_sign_in_wrong_password());
        };
        let login_by = match (req.email, req.username) {
            (Some(email), _) => user::LoginBy::Email(trimmed(email)),
            (None, Some(username)) => user::LoginBy::Username(trimmed(username)),
            (None, None) => return Err(OuterError::failed_to_sign_in()),
        };

        let found = self
            .users
            .get_user_by_credentials(
                ctx,
                user::GetUserByCredentialsRequest { login_by, password },
            )
            .await
            .map_err(|err| credentials_error(ctx, &err))?;
        Ok(found.user)
    }
}

/// Unknown login or rejected password both read as "wrong password", so a
/// probe cannot tell registered and unregistered logins apart.
fn credentials_error(ctx: &RequestContext, err: &ClientError) -> OuterError {
    error!(request_id = %ctx.request_id, error = %err, "downstream call failed");
    match err.rpc_code() {
        Some(RpcCode::NotFound | RpcCode::InvalidArgument | RpcCode::PermissionDenied) => {
            OuterError::failed_to_sign_in_wrong_password()
        }
        _ => OuterError::failed_to_sign_in(),
    }
}

fn generated_username() -> String {
    let suffix: u64 = rand::rng().random_range(1_000_000_000..10_000_000_000);
    format!("user_{suffix}")
}

fn generated_password() -> String {
    format!("pass_{}", rand::rng().random::<u64>())
}
