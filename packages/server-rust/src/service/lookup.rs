//! Pass-through lookups: languages, voiceovers, translations.

use lexgate_core::messages::{gateway, language, speaker, translation};
use lexgate_core::{OuterError, RequestContext};

use super::{map_step, GatewayService};

impl GatewayService {
    pub async fn get_languages(
        &self,
        ctx: &RequestContext,
        _req: gateway::GetLanguagesRequest,
    ) -> Result<gateway::GetLanguagesResponse, OuterError> {
        let found = map_step(
            ctx,
            "get_languages",
            self.languages
                .get_languages(ctx, language::GetLanguagesRequest::default())
                .await,
            OuterError::failed_to_get_languages,
        )?;
        Ok(gateway::GetLanguagesResponse {
            languages: found.languages,
        })
    }

    pub async fn get_voiceover(
        &self,
        ctx: &RequestContext,
        req: gateway::GetVoiceoverRequest,
    ) -> Result<gateway::GetVoiceoverResponse, OuterError> {
        let found = map_step(
            ctx,
            "get_voiceover",
            self.speaker
                .get_voiceover(
                    ctx,
                    speaker::GetVoiceoverRequest {
                        text: req.text,
                        language_id: req.language_id,
                        gender: req.gender,
                    },
                )
                .await,
            OuterError::failed_to_get_voiceover,
        )?;
        Ok(gateway::GetVoiceoverResponse { url: found.url })
    }

    pub async fn get_translation(
        &self,
        ctx: &RequestContext,
        req: gateway::GetTranslationRequest,
    ) -> Result<gateway::GetTranslationResponse, OuterError> {
        let found = map_step(
            ctx,
            "get_translation",
            self.translation
                .get_translation(
                    ctx,
                    translation::GetTranslationRequest {
                        text: req.text,
                        source_language: req.source_language,
                        target_language: req.target_language,
                    },
                )
                .await,
            OuterError::failed_to_get_translation,
        )?;
        Ok(gateway::GetTranslationResponse {
            translations: found.translations,
        })
    }
}
