/// Claims decoded from a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Identifier of the authenticated user.
    pub user_id: u64,
    /// Identifier of the token itself, used for token revocation.
    pub token_id: String,
}

/// Per-request context carrying identity and tracing information.
/// Threaded through every orchestration step; immutable after creation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation token, generated at the edge or propagated from the
    /// inbound `X-Request-Id` header.
    pub request_id: String,
    /// Remote address of the caller.
    pub client_ip: String,
    /// Caller device descriptor (`User-Agent`).
    pub device: String,
    /// `Accept-Language` tag forwarded to downstream services.
    pub accept_language: String,
    /// Decoded token claims for authenticated operations.
    pub claims: Option<TokenClaims>,
}

impl RequestContext {
    /// Key used for rate-limit bucketing: the authenticated user id when
    /// available, otherwise the caller IP.
    #[must_use]
    pub fn caller_key(&self) -> String {
        match &self.claims {
            Some(claims) => claims.user_id.to_string(),
            None => self.client_ip.clone(),
        }
    }
}
