//! Language service contract.

use serde::{Deserialize, Serialize};

use crate::entities::Language;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetLanguagesRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetLanguagesResponse {
    pub languages: Vec<Language>,
}
