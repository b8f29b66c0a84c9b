//! User service contract.

use serde::{Deserialize, Serialize};

use crate::entities::{GenderType, User, UserSettings};

/// Lookup key for [`GetUserRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindUserBy {
    UserId(u64),
    Email(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUserRequest {
    pub find_by: FindUserBy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUserResponse {
    pub user: User,
}

/// Login key for [`GetUserByCredentialsRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginBy {
    Email(String),
    Username(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUserByCredentialsRequest {
    pub login_by: LoginBy,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUserByCredentialsResponse {
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    /// Set when the user is provisioned from an already-verified identity
    /// profile; `None` means the address still needs confirmation.
    pub email_verified_at: Option<i64>,
    pub settings: Option<UserSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub user_id: u64,
    pub username: Option<String>,
    pub speaker_gender: Option<GenderType>,
    pub interface_language_id: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserResponse {}
