//! Domain entities shared by the gateway surface and the downstream
//! message schemas.
//!
//! Timestamps are unix epoch milliseconds, matching what the downstream
//! services report.

use serde::{Deserialize, Serialize};

/// Speaker voice preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenderType {
    #[default]
    Unspecified,
    Male,
    Female,
}

/// Learning state of a term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermStatus {
    #[default]
    New,
    Learning,
    Learned,
}

/// Per-user interface preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub speaker_gender: GenderType,
    pub interface_language_id: u64,
}

/// A registered user as reported by the user service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: u64,
    pub email: String,
    pub username: String,
    pub email_verified_at: Option<i64>,
    pub created_at: i64,
    pub settings: UserSettings,
}

/// A term collection owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub collection_id: u64,
    pub user_id: u64,
    pub language_id: u64,
    pub name: String,
    pub description: String,
    pub is_pinned: bool,
    pub is_public: bool,
    pub total_terms: u32,
    pub learned_terms: u32,
    pub opened_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One vocabulary term inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub term_id: u64,
    pub collection_id: u64,
    pub term_language_id: u64,
    pub meaning_language_id: u64,
    pub term: String,
    pub meaning: String,
    pub example: Option<String>,
    pub image_url: Option<String>,
    pub status: TermStatus,
    pub is_phrase: bool,
    pub repeated_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A supported language as reported by the language service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub language_id: u64,
    pub code: String,
    pub short_code: String,
    pub name: String,
    pub i18n_slug: String,
    pub site_language: bool,
    pub order: i32,
}

/// Profile returned by the third-party identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub id: String,
    pub email: String,
    pub verified_email: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub picture: String,
    #[serde(default)]
    pub locale: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_profile_tolerates_sparse_payloads() {
        let profile: IdentityProfile = serde_json::from_str(
            r#"{"id":"abc","email":"a@b.c","verified_email":true}"#,
        )
        .unwrap();
        assert!(profile.verified_email);
        assert_eq!(profile.email, "a@b.c");
        assert!(profile.name.is_empty());
    }

    #[test]
    fn gender_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&GenderType::Female).unwrap(),
            "\"female\""
        );
    }
}
