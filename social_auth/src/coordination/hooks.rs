use async_trait::async_trait;
use serde_json::Value;

use crate::profile::SocialProfile;
use crate::session::SessionStore;
use crate::userdb::UserRecord;

use super::types::{AuthRequest, AuthStatus};

/// Host extension points, injected at construction.
///
/// Every method has a no-op default; hosts override what they need. The one
/// hook with no workable default is [`AuthHooks::create_user`]: the default
/// returns `None`, which the orchestrator treats as a fatal configuration
/// error the first time an unlinked profile shows up.
#[async_trait]
pub trait AuthHooks: Send + Sync {
    /// Create (and persist) a local user for a profile that has never been
    /// linked. Returning `None` aborts the request as a hard error.
    async fn create_user(
        &self,
        _profile: &SocialProfile,
        _session: &mut dyn SessionStore,
    ) -> Option<UserRecord> {
        None
    }

    /// Inspect or fully replace the user value after identification,
    /// before it is written to the session.
    fn after_identify(&self, _user: &Value) -> Option<Value> {
        None
    }

    /// Override the redirect target computed for a finished callback.
    /// Fired for every outcome, success and classified failures alike.
    fn before_redirect(
        &self,
        _url: &str,
        _status: AuthStatus,
        _request: &AuthRequest,
    ) -> Option<String> {
        None
    }
}

/// The all-defaults hook set.
#[derive(Debug, Default)]
pub struct DefaultHooks;

impl AuthHooks for DefaultHooks {}
