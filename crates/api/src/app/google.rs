//! External identity verifier (Google userinfo endpoint).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Verified profile returned by the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: String,
}

#[derive(Debug, Error)]
pub enum GoogleVerifyError {
    /// The provider did not accept the credential.
    #[error("identity provider rejected the token")]
    Rejected,

    /// Transport or decode failure talking to the provider.
    #[error("identity provider call failed: {0}")]
    Upstream(String),
}

/// Exchange an opaque bearer credential for a verified profile.
#[async_trait]
pub trait GoogleVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<GoogleProfile, GoogleVerifyError>;
}

/// Live verifier calling the provider's userinfo endpoint.
pub struct HttpGoogleVerifier {
    client: reqwest::Client,
    userinfo_url: String,
}

impl HttpGoogleVerifier {
    pub fn new(userinfo_url: impl Into<String>) -> Result<Self, GoogleVerifyError> {
        // Bounded request time so a hanging provider cannot stall logins.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GoogleVerifyError::Upstream(e.to_string()))?;

        Ok(Self {
            client,
            userinfo_url: userinfo_url.into(),
        })
    }
}

#[async_trait]
impl GoogleVerifier for HttpGoogleVerifier {
    async fn verify(&self, token: &str) -> Result<GoogleProfile, GoogleVerifyError> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| GoogleVerifyError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GoogleVerifyError::Rejected);
        }

        response
            .json::<GoogleProfile>()
            .await
            .map_err(|e| GoogleVerifyError::Upstream(e.to_string()))
    }
}
