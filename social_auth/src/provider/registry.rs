use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::errors::ProviderError;
use super::gateway::ProviderGateway;
use super::types::{AccessToken, SocialIdentity};

/// Configured providers, keyed by name.
///
/// Every registered gateway is wrapped with a per-call timeout so a hanging
/// provider cannot block a request indefinitely; an elapsed timeout surfaces
/// as [`ProviderError::Timeout`].
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn ProviderGateway>>,
    timeout: Duration,
}

impl ProviderRegistry {
    pub fn new(timeout: Duration) -> Self {
        Self {
            providers: HashMap::new(),
            timeout,
        }
    }

    pub fn register(&mut self, name: impl Into<String>, gateway: Arc<dyn ProviderGateway>) {
        let name = name.into();
        tracing::debug!(provider = %name, "registering provider gateway");
        self.providers.insert(
            name,
            Arc::new(TimeoutGateway {
                inner: gateway,
                timeout: self.timeout,
            }),
        );
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ProviderGateway>> {
        self.providers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }
}

struct TimeoutGateway {
    inner: Arc<dyn ProviderGateway>,
    timeout: Duration,
}

#[async_trait]
impl ProviderGateway for TimeoutGateway {
    async fn authorization_url(&self) -> Result<String, ProviderError> {
        tokio::time::timeout(self.timeout, self.inner.authorization_url())
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))?
    }

    async fn exchange_code(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<AccessToken, ProviderError> {
        tokio::time::timeout(self.timeout, self.inner.exchange_code(params))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))?
    }

    async fn fetch_identity(&self, token: &AccessToken) -> Result<SocialIdentity, ProviderError> {
        tokio::time::timeout(self.timeout, self.inner.fetch_identity(token))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))?
    }
}
