//! JSON schemas for the public gateway surface.
//!
//! One request/response pair per [`crate::Operation`]. `validate()` covers
//! per-field checks the edge performs before invoking the orchestrator;
//! cross-field business checks (ownership, batch consistency) live in the
//! orchestrator itself.

use serde::{Deserialize, Serialize};

use crate::entities::{Collection, GenderType, Language, Term, TermStatus, User, UserSettings};
use crate::messages::translation::Translation;
use crate::messages::vocabulary::NewTerm;

/// Per-field validation failure, reported as a bad-request detail string.
pub type ValidationError = String;

fn require(ok: bool, what: &str) -> Result<(), ValidationError> {
    if ok {
        Ok(())
    } else {
        Err(format!("invalid field: {what}"))
    }
}

/// Partial settings update; absent fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettingsPatch {
    pub speaker_gender: Option<GenderType>,
    pub interface_language_id: Option<u64>,
}

// -- accounts ---------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub settings: Option<UserSettings>,
}

impl SignUpRequest {
    /// # Errors
    /// Returns the first failing field check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(self.email.contains('@'), "email")?;
        require(!self.username.trim().is_empty(), "username")?;
        require(self.password.len() >= 8, "password")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Access token from the third-party identity provider. When present,
    /// the credential fields are ignored.
    pub identity_token: Option<String>,
}

impl SignInRequest {
    /// # Errors
    /// Returns the first failing field check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.identity_token.is_some() {
            return Ok(());
        }
        require(
            self.email.is_some() || self.username.is_some(),
            "email or username",
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutRequest {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutResponse {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokensRequest {
    pub refresh_token: String,
}

impl RefreshTokensRequest {
    /// # Errors
    /// Returns the first failing field check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(!self.refresh_token.is_empty(), "refresh_token")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokensResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmEmailRequest {
    pub action_uuid: String,
}

impl ConfirmEmailRequest {
    /// # Errors
    /// Returns the first failing field check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(!self.action_uuid.is_empty(), "action_uuid")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmEmailResponse {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResetPasswordRequest {
    pub email: String,
}

impl AskResetPasswordRequest {
    /// # Errors
    /// Returns the first failing field check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(self.email.contains('@'), "email")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResetPasswordResponse {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub action_uuid: String,
    pub password: String,
}

impl ResetPasswordRequest {
    /// # Errors
    /// Returns the first failing field check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(!self.action_uuid.is_empty(), "action_uuid")?;
        require(self.password.len() >= 8, "password")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPasswordResponse {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUserRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUserResponse {
    pub user: User,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub settings: Option<UserSettingsPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserResponse {}

// -- collections ------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCollectionRequest {
    pub language_id: u64,
    pub name: String,
    pub description: String,
    pub is_public: bool,
}

impl CreateCollectionRequest {
    /// # Errors
    /// Returns the first failing field check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(!self.name.trim().is_empty(), "name")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCollectionResponse {
    pub collection_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCollectionRequest {
    pub collection_id: u64,
    pub language_id: u64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: bool,
    pub is_pinned: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCollectionResponse {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCollectionsRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCollectionsResponse {
    pub collections: Vec<Collection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCollectionRequest {
    pub collection_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCollectionResponse {
    pub collection: Collection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteCollectionRequest {
    pub collection_id: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteCollectionResponse {}

// -- terms ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTermsRequest {
    pub terms: Vec<NewTerm>,
}

impl CreateTermsRequest {
    /// # Errors
    /// Returns the first failing field check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(!self.terms.is_empty(), "terms")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTermsResponse {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetTermsRequest {
    pub collection_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetTermsResponse {
    pub terms: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTermRequest {
    pub term_id: u64,
    pub term_language_id: u64,
    pub meaning_language_id: u64,
    pub term: Option<String>,
    pub meaning: Option<String>,
    pub example: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTermResponse {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTermsRequest {
    pub collection_id: u64,
    pub term_ids: Vec<u64>,
}

impl DeleteTermsRequest {
    /// # Errors
    /// Returns the first failing field check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(!self.term_ids.is_empty(), "term_ids")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTermsResponse {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeTermStatusRequest {
    pub term_id: u64,
    pub status: TermStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeTermStatusResponse {}

// -- lookups ----------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetLanguagesRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetLanguagesResponse {
    pub languages: Vec<Language>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetVoiceoverRequest {
    pub text: String,
    pub language_id: u64,
    pub gender: GenderType,
}

impl GetVoiceoverRequest {
    /// # Errors
    /// Returns the first failing field check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(!self.text.trim().is_empty(), "text")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetVoiceoverResponse {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetTranslationRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
}

impl GetTranslationRequest {
    /// # Errors
    /// Returns the first failing field check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(!self.text.trim().is_empty(), "text")?;
        require(!self.source_language.is_empty(), "source_language")?;
        require(!self.target_language.is_empty(), "target_language")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetTranslationResponse {
    pub translations: Vec<Translation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_up_rejects_short_password() {
        let req = SignUpRequest {
            email: "a@b.c".to_string(),
            username: "alice".to_string(),
            password: "short".to_string(),
            settings: None,
        };
        assert_eq!(req.validate().unwrap_err(), "invalid field: password");
    }

    #[test]
    fn sign_in_requires_a_login_key_without_identity_token() {
        let req = SignInRequest::default();
        assert!(req.validate().is_err());

        let req = SignInRequest {
            identity_token: Some("tok".to_string()),
            ..SignInRequest::default()
        };
        assert!(req.validate().is_ok());

        let req = SignInRequest {
            username: Some("alice".to_string()),
            password: Some("secret".to_string()),
            ..SignInRequest::default()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_terms_rejects_empty_batch() {
        let req = CreateTermsRequest { terms: Vec::new() };
        assert!(req.validate().is_err());
    }
}
