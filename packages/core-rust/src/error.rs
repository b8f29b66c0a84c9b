//! The normalized error shape crossing the gateway boundary.
//!
//! Every internal failure — admission rejection, missing claims, downstream
//! RPC error, pool exhaustion — is converted to exactly one [`OuterError`]
//! before leaving the orchestrator. The constructors below form the full
//! catalogue: one per operation/step pair, plus the handful of generic
//! shapes (bad request, unauthorized, conflict, internal).

use serde::Serialize;

use crate::rpc::RpcCode;

/// Externally visible error: message, HTTP status, RPC status, optional detail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct OuterError {
    /// Human-readable message returned to the caller.
    pub message: String,
    /// HTTP status code for the error envelope.
    pub http_status: u16,
    /// RPC status code, kept for parity with the downstream contracts.
    pub rpc_code: RpcCode,
    /// Optional structured detail (only populated by the generic shapes).
    pub detail: Option<String>,
}

/// JSON envelope written to the HTTP response body.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope<'a> {
    pub http_status: u16,
    pub message: &'a str,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<&'a str>,
}

impl OuterError {
    fn fixed(message: &'static str, http_status: u16, rpc_code: RpcCode) -> Self {
        Self {
            message: message.to_string(),
            http_status,
            rpc_code,
            detail: None,
        }
    }

    /// The default shape for a failed downstream step: a 400 with the
    /// operation-specific message and no internal detail.
    fn operation_failed(message: &'static str) -> Self {
        Self::fixed(message, 400, RpcCode::InvalidArgument)
    }

    /// Serializable envelope view of this error.
    #[must_use]
    pub fn envelope(&self) -> ErrorEnvelope<'_> {
        ErrorEnvelope {
            http_status: self.http_status,
            message: &self.message,
            code: self.rpc_code.as_str(),
            details: self.detail.as_deref(),
        }
    }

    // -- admission ----------------------------------------------------------

    #[must_use]
    pub fn too_many_requests() -> Self {
        Self::fixed("too many requests", 429, RpcCode::Unavailable)
    }

    // -- authentication / authorization -------------------------------------

    #[must_use]
    pub fn token_claims_not_set() -> Self {
        Self::fixed("the token is not set", 401, RpcCode::PermissionDenied)
    }

    /// Bearer-token extraction or verification failure at the edge.
    pub fn bad_authorization(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            http_status: 401,
            rpc_code: RpcCode::PermissionDenied,
            detail: None,
        }
    }

    #[must_use]
    pub fn private_collection() -> Self {
        Self::fixed("private collection", 403, RpcCode::PermissionDenied)
    }

    // -- generic shapes ------------------------------------------------------

    /// Malformed inbound request (body read/decode/validation failures).
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            message: "incorrect request".to_string(),
            http_status: 400,
            rpc_code: RpcCode::InvalidArgument,
            detail: Some(detail.into()),
        }
    }

    /// Unexpected internal failure; detail is logged, not trusted.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            message: "internal error".to_string(),
            http_status: 500,
            rpc_code: RpcCode::Internal,
            detail: Some(detail.into()),
        }
    }

    /// Conflict re-mapped from a downstream `already_exists`, carrying the
    /// downstream's own message (the one allow-listed passthrough).
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            http_status: 400,
            rpc_code: RpcCode::AlreadyExists,
            detail: None,
        }
    }

    // -- per-operation/step constants ----------------------------------------

    #[must_use]
    pub fn failed_to_create_user() -> Self {
        Self::operation_failed("failed to create user")
    }

    #[must_use]
    pub fn failed_to_update_user() -> Self {
        Self::operation_failed("failed to update user")
    }

    #[must_use]
    pub fn failed_to_get_user() -> Self {
        Self::operation_failed("failed to get user")
    }

    #[must_use]
    pub fn failed_to_generate_tokens() -> Self {
        Self::operation_failed("failed to generate tokens")
    }

    #[must_use]
    pub fn failed_to_refresh_tokens() -> Self {
        Self::operation_failed("failed to refresh tokens")
    }

    #[must_use]
    pub fn failed_to_delete_tokens() -> Self {
        Self::operation_failed("failed to delete tokens")
    }

    #[must_use]
    pub fn failed_to_sign_in() -> Self {
        Self::operation_failed("failed to sign in")
    }

    #[must_use]
    pub fn failed_to_sign_in_wrong_password() -> Self {
        Self::operation_failed("failed to sign in, wrong password")
    }

    #[must_use]
    pub fn failed_to_sign_in_email_not_confirmed() -> Self {
        Self::operation_failed("failed to sign in, email did not confirmed")
    }

    #[must_use]
    pub fn failed_to_confirm_email() -> Self {
        Self::operation_failed("failed to confirm email")
    }

    #[must_use]
    pub fn failed_to_reset_password() -> Self {
        Self::operation_failed("failed to reset password")
    }

    #[must_use]
    pub fn failed_to_create_action() -> Self {
        Self::operation_failed("failed to create action")
    }

    #[must_use]
    pub fn failed_to_send_confirmation_email() -> Self {
        Self::operation_failed("failed to send confirmation email")
    }

    #[must_use]
    pub fn failed_to_send_reset_password_email() -> Self {
        Self::operation_failed("failed to send reset password email")
    }

    #[must_use]
    pub fn failed_to_get_identity_profile() -> Self {
        Self::operation_failed("failed to get identity profile")
    }

    #[must_use]
    pub fn failed_to_get_languages() -> Self {
        Self::operation_failed("failed to get languages")
    }

    #[must_use]
    pub fn failed_to_get_collections() -> Self {
        Self::operation_failed("failed to get collections")
    }

    #[must_use]
    pub fn failed_to_get_collection() -> Self {
        Self::operation_failed("failed to get collection")
    }

    #[must_use]
    pub fn failed_to_create_collection() -> Self {
        Self::operation_failed("failed to create collection")
    }

    #[must_use]
    pub fn failed_to_update_collection() -> Self {
        Self::operation_failed("failed to update collection")
    }

    #[must_use]
    pub fn failed_to_delete_collection() -> Self {
        Self::operation_failed("failed to delete collection")
    }

    #[must_use]
    pub fn failed_to_create_terms() -> Self {
        Self::operation_failed("failed to create terms")
    }

    #[must_use]
    pub fn cross_collection_batch() -> Self {
        Self::operation_failed("collection_id not same")
    }

    #[must_use]
    pub fn failed_to_get_terms() -> Self {
        Self::operation_failed("failed to get terms")
    }

    #[must_use]
    pub fn failed_to_update_term() -> Self {
        Self::operation_failed("failed to update term")
    }

    #[must_use]
    pub fn failed_to_delete_terms() -> Self {
        Self::operation_failed("failed to delete terms")
    }

    #[must_use]
    pub fn failed_to_change_term_status() -> Self {
        Self::operation_failed("failed to change term status")
    }

    #[must_use]
    pub fn failed_to_get_voiceover() -> Self {
        Self::operation_failed("failed to get voiceover")
    }

    #[must_use]
    pub fn failed_to_get_translation() -> Self {
        Self::operation_failed("failed to get translation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_without_empty_details() {
        let err = OuterError::too_many_requests();
        let json = serde_json::to_value(err.envelope()).unwrap();
        assert_eq!(json["http_status"], 429);
        assert_eq!(json["message"], "too many requests");
        assert_eq!(json["code"], "unavailable");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn envelope_carries_details_for_generic_shapes() {
        let err = OuterError::bad_request("missing field `email`");
        let json = serde_json::to_value(err.envelope()).unwrap();
        assert_eq!(json["http_status"], 400);
        assert_eq!(json["details"], "missing field `email`");
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(OuterError::too_many_requests().http_status, 429);
        assert_eq!(OuterError::token_claims_not_set().http_status, 401);
        assert_eq!(OuterError::private_collection().http_status, 403);
        assert_eq!(OuterError::failed_to_create_user().http_status, 400);
        assert_eq!(OuterError::internal("boom").http_status, 500);
    }

    #[test]
    fn already_exists_keeps_downstream_message() {
        let err = OuterError::already_exists("user already exists");
        assert_eq!(err.message, "user already exists");
        assert_eq!(err.rpc_code, RpcCode::AlreadyExists);
    }
}
