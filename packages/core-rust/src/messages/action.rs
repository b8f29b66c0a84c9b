//! Action service contract (pending one-shot actions such as email
//! confirmation and password reset).

use serde::{Deserialize, Serialize};

/// Parameters captured when the action is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionParams {
    EmailConfirmation { user_id: u64 },
    ResetPassword { email: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateActionRequest {
    pub params: ActionParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateActionResponse {
    /// Opaque handle mailed to the user and later presented for execution.
    pub action_uuid: String,
}

/// Parameters supplied when the action is executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteParams {
    EmailConfirmation {},
    ResetPassword { password: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteActionRequest {
    pub action_uuid: String,
    pub params: ExecuteParams,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteActionResponse {}
