//! Multi-step orchestration over the downstream services.
//!
//! One async method per public operation. Steps within an operation run
//! sequentially; the first failing step aborts the rest and is mapped to
//! its operation-specific [`OuterError`]. Effects of steps that already
//! completed are deliberately not rolled back (there is no distributed
//! transaction here), so e.g. a sign-up whose confirmation email fails
//! still leaves the account created.

mod accounts;
mod collections;
mod lookup;
mod terms;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use lexgate_core::{OuterError, RequestContext, TokenClaims};
use tracing::error;

use crate::clients::{
    ActionApi, AuthApi, ClientError, IdentityApi, LanguageApi, NotificationApi, SpeakerApi,
    TranslationApi, UserApi, VocabularyApi,
};

/// The full set of downstream handles the orchestrator dispatches to.
pub struct Downstreams {
    pub users: Arc<dyn UserApi>,
    pub auth: Arc<dyn AuthApi>,
    pub actions: Arc<dyn ActionApi>,
    pub vocabulary: Arc<dyn VocabularyApi>,
    pub languages: Arc<dyn LanguageApi>,
    pub speaker: Arc<dyn SpeakerApi>,
    pub translation: Arc<dyn TranslationApi>,
    pub notifications: Arc<dyn NotificationApi>,
    pub identity: Arc<dyn IdentityApi>,
}

/// Stateless orchestrator; all state lives downstream.
pub struct GatewayService {
    users: Arc<dyn UserApi>,
    auth: Arc<dyn AuthApi>,
    actions: Arc<dyn ActionApi>,
    vocabulary: Arc<dyn VocabularyApi>,
    languages: Arc<dyn LanguageApi>,
    speaker: Arc<dyn SpeakerApi>,
    translation: Arc<dyn TranslationApi>,
    notifications: Arc<dyn NotificationApi>,
    identity: Arc<dyn IdentityApi>,
}

impl GatewayService {
    #[must_use]
    pub fn new(downstreams: Downstreams) -> Self {
        Self {
            users: downstreams.users,
            auth: downstreams.auth,
            actions: downstreams.actions,
            vocabulary: downstreams.vocabulary,
            languages: downstreams.languages,
            speaker: downstreams.speaker,
            translation: downstreams.translation,
            notifications: downstreams.notifications,
            identity: downstreams.identity,
        }
    }
}

/// Claims of the authenticated caller; authed routes guarantee these are
/// present, so absence is a wiring fault surfaced as a 401.
fn claims(ctx: &RequestContext) -> Result<&TokenClaims, OuterError> {
    ctx.claims
        .as_ref()
        .ok_or_else(OuterError::token_claims_not_set)
}

/// Logs a failed downstream step and substitutes its operation-specific
/// outer error. The internal message never reaches the caller.
fn map_step<T>(
    ctx: &RequestContext,
    step: &'static str,
    result: Result<T, ClientError>,
    outer: impl FnOnce() -> OuterError,
) -> Result<T, OuterError> {
    result.map_err(|err| {
        error!(request_id = %ctx.request_id, step, error = %err, "downstream call failed");
        outer()
    })
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

fn trimmed_opt(value: Option<String>) -> Option<String> {
    value.map(trimmed)
}

#[cfg(test)]
pub(crate) mod mocks {
    //! In-memory downstream fakes with canned data, per-method failure
    //! injection, and a shared ordered call log.

    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use lexgate_core::entities::{
        Collection, IdentityProfile, Language, Term, User, UserSettings,
    };
    use lexgate_core::messages::{
        action, auth, language, notification, speaker, translation, user, vocabulary,
    };
    use lexgate_core::{RequestContext, RpcCode, RpcError, TokenClaims};
    use parking_lot::Mutex;

    use super::{Downstreams, GatewayService};
    use crate::clients::{
        ActionApi, AuthApi, ClientError, IdentityApi, LanguageApi, NotificationApi, SpeakerApi,
        TranslationApi, UserApi, VocabularyApi,
    };

    pub fn ctx_with_user(user_id: u64) -> RequestContext {
        RequestContext {
            request_id: "req-test".to_string(),
            client_ip: "10.0.0.9".to_string(),
            device: "test-agent".to_string(),
            accept_language: "en".to_string(),
            claims: Some(TokenClaims {
                user_id,
                token_id: "token-test".to_string(),
            }),
        }
    }

    pub fn ctx_anonymous() -> RequestContext {
        RequestContext {
            claims: None,
            ..ctx_with_user(0)
        }
    }

    pub fn test_user(user_id: u64) -> User {
        User {
            user_id,
            email: "alice@example.com".to_string(),
            username: "alice".to_string(),
            email_verified_at: Some(1_700_000_000_000),
            created_at: 1_699_000_000_000,
            settings: UserSettings::default(),
        }
    }

    pub fn test_collection(collection_id: u64, user_id: u64, is_public: bool) -> Collection {
        Collection {
            collection_id,
            user_id,
            language_id: 2,
            name: "Verbs".to_string(),
            description: String::new(),
            is_pinned: false,
            is_public,
            total_terms: 1,
            learned_terms: 0,
            opened_at: None,
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
        }
    }

    pub fn test_term(term_id: u64, collection_id: u64) -> Term {
        Term {
            term_id,
            collection_id,
            term_language_id: 2,
            meaning_language_id: 1,
            term: "laufen".to_string(),
            meaning: "to run".to_string(),
            example: None,
            image_url: None,
            status: lexgate_core::entities::TermStatus::New,
            is_phrase: false,
            repeated_at: None,
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
        }
    }

    #[derive(Clone, Default)]
    pub struct Log(Arc<Mutex<Vec<String>>>);

    impl Log {
        fn push(&self, call: &str) {
            self.0.lock().push(call.to_string());
        }

        pub fn calls(&self) -> Vec<String> {
            self.0.lock().clone()
        }
    }

    /// Per-method injected failures, keyed by the wire method name.
    #[derive(Default)]
    pub struct Failures(Mutex<HashMap<String, (RpcCode, String)>>);

    impl Failures {
        pub fn set(&self, method: &str, code: RpcCode, message: &str) {
            self.0
                .lock()
                .insert(method.to_string(), (code, message.to_string()));
        }

        fn check(&self, method: &str) -> Result<(), ClientError> {
            match self.0.lock().get(method) {
                Some((code, message)) => Err(ClientError::Rpc(RpcError::new(*code, message))),
                None => Ok(()),
            }
        }
    }

    #[derive(Default)]
    pub struct MockUsers {
        pub log: Log,
        pub failures: Failures,
        pub user: Mutex<Option<User>>,
    }

    impl MockUsers {
        fn canned(&self, user_id: u64) -> User {
            self.user.lock().clone().unwrap_or_else(|| test_user(user_id))
        }
    }

    #[async_trait]
    impl UserApi for MockUsers {
        async fn get_user(
            &self,
            _ctx: &RequestContext,
            req: user::GetUserRequest,
        ) -> Result<user::GetUserResponse, ClientError> {
            self.log.push("user.GetUser");
            self.failures.check("user.GetUser")?;
            let mut canned = self.canned(7);
            if let user::FindUserBy::Email(email) = req.find_by {
                canned.email = email;
            }
            Ok(user::GetUserResponse { user: canned })
        }

        async fn get_user_by_credentials(
            &self,
            _ctx: &RequestContext,
            _req: user::GetUserByCredentialsRequest,
        ) -> Result<user::GetUserByCredentialsResponse, ClientError> {
            self.log.push("user.GetUserByCredentials");
            self.failures.check("user.GetUserByCredentials")?;
            Ok(user::GetUserByCredentialsResponse {
                user: self.canned(7),
            })
        }

        async fn create_user(
            &self,
            _ctx: &RequestContext,
            req: user::CreateUserRequest,
        ) -> Result<user::CreateUserResponse, ClientError> {
            self.log.push("user.CreateUser");
            self.failures.check("user.CreateUser")?;
            let mut created = self.canned(7);
            created.email = req.email;
            created.username = req.username;
            created.email_verified_at = req.email_verified_at;
            Ok(user::CreateUserResponse { user: created })
        }

        async fn update_user(
            &self,
            _ctx: &RequestContext,
            _req: user::UpdateUserRequest,
        ) -> Result<user::UpdateUserResponse, ClientError> {
            self.log.push("user.UpdateUser");
            self.failures.check("user.UpdateUser")?;
            Ok(user::UpdateUserResponse::default())
        }
    }

    #[derive(Default)]
    pub struct MockAuth {
        pub log: Log,
        pub failures: Failures,
    }

    #[async_trait]
    impl AuthApi for MockAuth {
        async fn generate_tokens(
            &self,
            _ctx: &RequestContext,
            _req: auth::GenerateTokensRequest,
        ) -> Result<auth::GenerateTokensResponse, ClientError> {
            self.log.push("auth.GenerateTokens");
            self.failures.check("auth.GenerateTokens")?;
            Ok(auth::GenerateTokensResponse {
                access_token: "access-1".to_string(),
                refresh_token: "refresh-1".to_string(),
            })
        }

        async fn refresh_tokens(
            &self,
            _ctx: &RequestContext,
            _req: auth::RefreshTokensRequest,
        ) -> Result<auth::RefreshTokensResponse, ClientError> {
            self.log.push("auth.RefreshTokens");
            self.failures.check("auth.RefreshTokens")?;
            Ok(auth::RefreshTokensResponse {
                access_token: "access-2".to_string(),
                refresh_token: "refresh-2".to_string(),
            })
        }

        async fn delete_tokens(
            &self,
            _ctx: &RequestContext,
            _req: auth::DeleteTokensRequest,
        ) -> Result<auth::DeleteTokensResponse, ClientError> {
            self.log.push("auth.DeleteTokens");
            self.failures.check("auth.DeleteTokens")?;
            Ok(auth::DeleteTokensResponse::default())
        }
    }

    #[derive(Default)]
    pub struct MockActions {
        pub log: Log,
        pub failures: Failures,
    }

    #[async_trait]
    impl ActionApi for MockActions {
        async fn create_action(
            &self,
            _ctx: &RequestContext,
            _req: action::CreateActionRequest,
        ) -> Result<action::CreateActionResponse, ClientError> {
            self.log.push("action.CreateAction");
            self.failures.check("action.CreateAction")?;
            Ok(action::CreateActionResponse {
                action_uuid: "action-uuid-1".to_string(),
            })
        }

        async fn execute_action(
            &self,
            _ctx: &RequestContext,
            _req: action::ExecuteActionRequest,
        ) -> Result<action::ExecuteActionResponse, ClientError> {
            self.log.push("action.ExecuteAction");
            self.failures.check("action.ExecuteAction")?;
            Ok(action::ExecuteActionResponse::default())
        }
    }

    #[derive(Default)]
    pub struct MockVocabulary {
        pub log: Log,
        pub failures: Failures,
        pub collection: Mutex<Option<Collection>>,
    }

    impl MockVocabulary {
        fn canned_collection(&self) -> Collection {
            self.collection
                .lock()
                .clone()
                .unwrap_or_else(|| test_collection(11, 7, false))
        }
    }

    #[async_trait]
    impl VocabularyApi for MockVocabulary {
        async fn create_collection(
            &self,
            _ctx: &RequestContext,
            _req: vocabulary::CreateCollectionRequest,
        ) -> Result<vocabulary::CreateCollectionResponse, ClientError> {
            self.log.push("vocabulary.CreateCollection");
            self.failures.check("vocabulary.CreateCollection")?;
            Ok(vocabulary::CreateCollectionResponse { collection_id: 11 })
        }

        async fn update_collection(
            &self,
            _ctx: &RequestContext,
            _req: vocabulary::UpdateCollectionRequest,
        ) -> Result<vocabulary::UpdateCollectionResponse, ClientError> {
            self.log.push("vocabulary.UpdateCollection");
            self.failures.check("vocabulary.UpdateCollection")?;
            Ok(vocabulary::UpdateCollectionResponse::default())
        }

        async fn get_collections(
            &self,
            _ctx: &RequestContext,
            _req: vocabulary::GetCollectionsRequest,
        ) -> Result<vocabulary::GetCollectionsResponse, ClientError> {
            self.log.push("vocabulary.GetCollections");
            self.failures.check("vocabulary.GetCollections")?;
            Ok(vocabulary::GetCollectionsResponse {
                collections: vec![self.canned_collection()],
            })
        }

        async fn get_collection(
            &self,
            _ctx: &RequestContext,
            _req: vocabulary::GetCollectionRequest,
        ) -> Result<vocabulary::GetCollectionResponse, ClientError> {
            self.log.push("vocabulary.GetCollection");
            self.failures.check("vocabulary.GetCollection")?;
            Ok(vocabulary::GetCollectionResponse {
                collection: self.canned_collection(),
            })
        }

        async fn delete_collection(
            &self,
            _ctx: &RequestContext,
            _req: vocabulary::DeleteCollectionRequest,
        ) -> Result<vocabulary::DeleteCollectionResponse, ClientError> {
            self.log.push("vocabulary.DeleteCollection");
            self.failures.check("vocabulary.DeleteCollection")?;
            Ok(vocabulary::DeleteCollectionResponse::default())
        }

        async fn create_terms(
            &self,
            _ctx: &RequestContext,
            _req: vocabulary::CreateTermsRequest,
        ) -> Result<vocabulary::CreateTermsResponse, ClientError> {
            self.log.push("vocabulary.CreateTerms");
            self.failures.check("vocabulary.CreateTerms")?;
            Ok(vocabulary::CreateTermsResponse::default())
        }

        async fn get_terms(
            &self,
            _ctx: &RequestContext,
            req: vocabulary::GetTermsRequest,
        ) -> Result<vocabulary::GetTermsResponse, ClientError> {
            self.log.push("vocabulary.GetTerms");
            self.failures.check("vocabulary.GetTerms")?;
            Ok(vocabulary::GetTermsResponse {
                terms: vec![test_term(21, req.collection_id)],
            })
        }

        async fn update_term(
            &self,
            _ctx: &RequestContext,
            _req: vocabulary::UpdateTermRequest,
        ) -> Result<vocabulary::UpdateTermResponse, ClientError> {
            self.log.push("vocabulary.UpdateTerm");
            self.failures.check("vocabulary.UpdateTerm")?;
            Ok(vocabulary::UpdateTermResponse::default())
        }

        async fn delete_terms(
            &self,
            _ctx: &RequestContext,
            _req: vocabulary::DeleteTermsRequest,
        ) -> Result<vocabulary::DeleteTermsResponse, ClientError> {
            self.log.push("vocabulary.DeleteTerms");
            self.failures.check("vocabulary.DeleteTerms")?;
            Ok(vocabulary::DeleteTermsResponse::default())
        }

        async fn change_term_status(
            &self,
            _ctx: &RequestContext,
            _req: vocabulary::ChangeTermStatusRequest,
        ) -> Result<vocabulary::ChangeTermStatusResponse, ClientError> {
            self.log.push("vocabulary.ChangeTermStatus");
            self.failures.check("vocabulary.ChangeTermStatus")?;
            Ok(vocabulary::ChangeTermStatusResponse::default())
        }
    }

    #[derive(Default)]
    pub struct MockLanguages {
        pub log: Log,
        pub failures: Failures,
    }

    #[async_trait]
    impl LanguageApi for MockLanguages {
        async fn get_languages(
            &self,
            _ctx: &RequestContext,
            _req: language::GetLanguagesRequest,
        ) -> Result<language::GetLanguagesResponse, ClientError> {
            self.log.push("language.GetLanguages");
            self.failures.check("language.GetLanguages")?;
            Ok(language::GetLanguagesResponse {
                languages: vec![Language {
                    language_id: 1,
                    code: "en-US".to_string(),
                    short_code: "en".to_string(),
                    name: "English".to_string(),
                    i18n_slug: "lang.english".to_string(),
                    site_language: true,
                    order: 1,
                }],
            })
        }
    }

    #[derive(Default)]
    pub struct MockSpeaker {
        pub log: Log,
        pub failures: Failures,
    }

    #[async_trait]
    impl SpeakerApi for MockSpeaker {
        async fn get_voiceover(
            &self,
            _ctx: &RequestContext,
            _req: speaker::GetVoiceoverRequest,
        ) -> Result<speaker::GetVoiceoverResponse, ClientError> {
            self.log.push("speaker.GetVoiceover");
            self.failures.check("speaker.GetVoiceover")?;
            Ok(speaker::GetVoiceoverResponse {
                url: "https://cdn.example.com/v/1.mp3".to_string(),
            })
        }
    }

    #[derive(Default)]
    pub struct MockTranslation {
        pub log: Log,
        pub failures: Failures,
    }

    #[async_trait]
    impl TranslationApi for MockTranslation {
        async fn get_translation(
            &self,
            _ctx: &RequestContext,
            _req: translation::GetTranslationRequest,
        ) -> Result<translation::GetTranslationResponse, ClientError> {
            self.log.push("translation.GetTranslation");
            self.failures.check("translation.GetTranslation")?;
            Ok(translation::GetTranslationResponse {
                translations: vec![translation::Translation {
                    text: "to run".to_string(),
                }],
            })
        }
    }

    #[derive(Default)]
    pub struct MockNotifications {
        pub log: Log,
        pub failures: Failures,
        pub sent: Mutex<Vec<notification::SendEmailRequest>>,
    }

    #[async_trait]
    impl NotificationApi for MockNotifications {
        async fn send_email(
            &self,
            _ctx: &RequestContext,
            req: notification::SendEmailRequest,
        ) -> Result<(), ClientError> {
            self.log.push("notification.SendEmail");
            self.failures.check("notification.SendEmail")?;
            self.sent.lock().push(req);
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MockIdentity {
        pub log: Log,
        pub failures: Failures,
        pub profile: Mutex<Option<IdentityProfile>>,
    }

    #[async_trait]
    impl IdentityApi for MockIdentity {
        async fn get_profile(
            &self,
            _ctx: &RequestContext,
            _access_token: &str,
        ) -> Result<IdentityProfile, ClientError> {
            self.log.push("identity.GetProfile");
            self.failures.check("identity.GetProfile")?;
            Ok(self.profile.lock().clone().unwrap_or(IdentityProfile {
                id: "ext-1".to_string(),
                email: "alice@example.com".to_string(),
                verified_email: true,
                ..IdentityProfile::default()
            }))
        }
    }

    /// All mocks wired into one service, sharing a single ordered log.
    pub struct Mocks {
        pub log: Log,
        pub users: Arc<MockUsers>,
        pub auth: Arc<MockAuth>,
        pub actions: Arc<MockActions>,
        pub vocabulary: Arc<MockVocabulary>,
        pub languages: Arc<MockLanguages>,
        pub speaker: Arc<MockSpeaker>,
        pub translation: Arc<MockTranslation>,
        pub notifications: Arc<MockNotifications>,
        pub identity: Arc<MockIdentity>,
    }

    impl Mocks {
        pub fn new() -> Self {
            let log = Log::default();
            Self {
                users: Arc::new(MockUsers {
                    log: log.clone(),
                    ..MockUsers::default()
                }),
                auth: Arc::new(MockAuth {
                    log: log.clone(),
                    ..MockAuth::default()
                }),
                actions: Arc::new(MockActions {
                    log: log.clone(),
                    ..MockActions::default()
                }),
                vocabulary: Arc::new(MockVocabulary {
                    log: log.clone(),
                    ..MockVocabulary::default()
                }),
                languages: Arc::new(MockLanguages {
                    log: log.clone(),
                    ..MockLanguages::default()
                }),
                speaker: Arc::new(MockSpeaker {
                    log: log.clone(),
                    ..MockSpeaker::default()
                }),
                translation: Arc::new(MockTranslation {
                    log: log.clone(),
                    ..MockTranslation::default()
                }),
                notifications: Arc::new(MockNotifications {
                    log: log.clone(),
                    ..MockNotifications::default()
                }),
                identity: Arc::new(MockIdentity {
                    log: log.clone(),
                    ..MockIdentity::default()
                }),
                log,
            }
        }

        pub fn service(&self) -> GatewayService {
            GatewayService::new(Downstreams {
                users: Arc::clone(&self.users) as Arc<dyn UserApi>,
                auth: Arc::clone(&self.auth) as Arc<dyn AuthApi>,
                actions: Arc::clone(&self.actions) as Arc<dyn ActionApi>,
                vocabulary: Arc::clone(&self.vocabulary) as Arc<dyn VocabularyApi>,
                languages: Arc::clone(&self.languages) as Arc<dyn LanguageApi>,
                speaker: Arc::clone(&self.speaker) as Arc<dyn SpeakerApi>,
                translation: Arc::clone(&self.translation) as Arc<dyn TranslationApi>,
                notifications: Arc::clone(&self.notifications) as Arc<dyn NotificationApi>,
                identity: Arc::clone(&self.identity) as Arc<dyn IdentityApi>,
            })
        }
    }
}
