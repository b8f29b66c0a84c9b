//! Speaker service contract (text-to-speech voiceovers).

use serde::{Deserialize, Serialize};

use crate::entities::GenderType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetVoiceoverRequest {
    pub text: String,
    pub language_id: u64,
    pub gender: GenderType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetVoiceoverResponse {
    pub url: String,
}
