use std::collections::HashMap;

use async_trait::async_trait;

use super::errors::ProviderError;
use super::types::{AccessToken, SocialIdentity};

/// One configured identity provider.
///
/// Implementations wrap a concrete protocol library and HTTP client; the
/// orchestrator only sees the three handshake operations and the
/// [`ProviderError`] failure modes.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Build the URL the user agent is redirected to for authorization.
    async fn authorization_url(&self) -> Result<String, ProviderError>;

    /// Exchange the callback query parameters for an access token.
    async fn exchange_code(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<AccessToken, ProviderError>;

    /// Fetch the normalized identity using a previously obtained token.
    async fn fetch_identity(&self, token: &AccessToken) -> Result<SocialIdentity, ProviderError>;
}
