//! Vocabulary service contract (collections and terms).

use serde::{Deserialize, Serialize};

use crate::entities::{Collection, Term, TermStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCollectionRequest {
    pub user_id: u64,
    pub language_id: u64,
    pub name: String,
    pub description: String,
    pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCollectionResponse {
    pub collection_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCollectionRequest {
    pub user_id: u64,
    pub collection_id: u64,
    pub language_id: u64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: bool,
    pub is_pinned: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCollectionResponse {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCollectionsRequest {
    pub user_id: u64,
}

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
    pub user_id: u64,
    pub collection_id: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteCollectionResponse {}

/// One term to create; also the inbound batch-item shape on the gateway
/// surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTerm {
    pub collection_id: u64,
    pub term_language_id: u64,
    pub meaning_language_id: u64,
    pub term: String,
    pub meaning: String,
    pub example: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTermsRequest {
    pub terms: Vec<NewTerm>,
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
    pub user_id: u64,
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
    pub user_id: u64,
    pub collection_id: u64,
    pub term_ids: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTermsResponse {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeTermStatusRequest {
    pub user_id: u64,
    pub term_id: u64,
    pub status: TermStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeTermStatusResponse {}
