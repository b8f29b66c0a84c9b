//! The fixed set of public gateway operations.
//!
//! Each operation is served at `POST /v1/<name>` and is the unit against
//! which admission quotas are configured.

use serde::{Deserialize, Serialize};

/// One public gateway operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    SignUp,
    SignIn,
    Logout,
    RefreshTokens,
    ConfirmEmail,
    AskResetPassword,
    ResetPassword,
    GetUser,
    UpdateUser,
    CreateCollection,
    UpdateCollection,
    GetCollections,
    GetCollection,
    DeleteCollection,
    CreateTerms,
    GetTerms,
    UpdateTerm,
    DeleteTerms,
    ChangeTermStatus,
    GetLanguages,
    GetVoiceover,
    GetTranslation,
}

impl Operation {
    /// Every gateway operation, in route-registration order.
    pub const ALL: [Operation; 22] = [
        Operation::SignUp,
        Operation::SignIn,
        Operation::Logout,
        Operation::RefreshTokens,
        Operation::ConfirmEmail,
        Operation::AskResetPassword,
        Operation::ResetPassword,
        Operation::GetUser,
        Operation::UpdateUser,
        Operation::CreateCollection,
        Operation::UpdateCollection,
        Operation::GetCollections,
        Operation::GetCollection,
        Operation::DeleteCollection,
        Operation::CreateTerms,
        Operation::GetTerms,
        Operation::UpdateTerm,
        Operation::DeleteTerms,
        Operation::ChangeTermStatus,
        Operation::GetLanguages,
        Operation::GetVoiceover,
        Operation::GetTranslation,
    ];

    /// Operation name as it appears in routes, logs, and metrics labels.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::SignUp => "SignUp",
            Operation::SignIn => "SignIn",
            Operation::Logout => "Logout",
            Operation::RefreshTokens => "RefreshTokens",
            Operation::ConfirmEmail => "ConfirmEmail",
            Operation::AskResetPassword => "AskResetPassword",
            Operation::ResetPassword => "ResetPassword",
            Operation::GetUser => "GetUser",
            Operation::UpdateUser => "UpdateUser",
            Operation::CreateCollection => "CreateCollection",
            Operation::UpdateCollection => "UpdateCollection",
            Operation::GetCollections => "GetCollections",
            Operation::GetCollection => "GetCollection",
            Operation::DeleteCollection => "DeleteCollection",
            Operation::CreateTerms => "CreateTerms",
            Operation::GetTerms => "GetTerms",
            Operation::UpdateTerm => "UpdateTerm",
            Operation::DeleteTerms => "DeleteTerms",
            Operation::ChangeTermStatus => "ChangeTermStatus",
            Operation::GetLanguages => "GetLanguages",
            Operation::GetVoiceover => "GetVoiceover",
            Operation::GetTranslation => "GetTranslation",
        }
    }

    /// HTTP route path for this operation.
    #[must_use]
    pub fn path(self) -> String {
        format!("/v1/{}", self.as_str())
    }

    /// Resolves a request path like `/v1/SignUp` back to its operation.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Operation> {
        let name = path.strip_prefix("/v1/")?;
        Operation::ALL.iter().copied().find(|op| op.as_str() == name)
    }

    /// Whether the operation requires a verified bearer token.
    #[must_use]
    pub fn requires_auth(self) -> bool {
        !matches!(
            self,
            Operation::SignUp
                | Operation::SignIn
                | Operation::RefreshTokens
                | Operation::ConfirmEmail
                | Operation::AskResetPassword
                | Operation::ResetPassword
                | Operation::GetLanguages
                | Operation::GetVoiceover
                | Operation::GetTranslation
        )
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
