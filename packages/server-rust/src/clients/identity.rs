//! Third-party identity provider client (OAuth2 userinfo lookup).

use std::time::Duration;

use async_trait::async_trait;
use lexgate_core::entities::IdentityProfile;
use lexgate_core::RequestContext;

use super::{ClientError, IdentityApi};

#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
}

impl IdentityClient {
    /// Builds the client. The base URL is the provider origin, e.g.
    /// `https://www.googleapis.com`.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl IdentityApi for IdentityClient {
    async fn get_profile(
        &self,
        ctx: &RequestContext,
        access_token: &str,
    ) -> Result<IdentityProfile, ClientError> {
        let url = format!("{}/oauth2/v1/userinfo", self.base_url);
        let profile = self
            .http
            .get(url)
            .query(&[("alt", "json"), ("access_token", access_token)])
            .header("X-Request-Id", &ctx.request_id)
            .send()
            .await?
            .error_for_status()?
            .json::<IdentityProfile>()
            .await?;
        Ok(profile)
    }
}
