use std::sync::Arc;

use serde_json::Value;

use crate::config::AuthConfig;
use crate::profile::{ProfileError, ProfileStore, SocialProfile};
use crate::provider::{
    AccessToken, ProviderError, ProviderGateway, ProviderRegistry, SocialIdentity,
};
use crate::session::{PROVIDER_KEY, SessionStore, store_redirect_url, take_redirect_url};
use crate::userdb::{UserRecord, UserStore};

use super::classify::classify;
use super::errors::AuthError;
use super::hooks::{AuthHooks, DefaultHooks};
use super::types::{AuthAction, AuthOutcome, AuthRequest, AuthStatus};

/// Request-scoped social-login state machine.
///
/// Classifies requests into login / callback / passthrough, drives the
/// provider handshake, reconciles the social profile with a local user and
/// decides the outcome: a redirect (success or classified failure) or a
/// fatal [`AuthError`].
pub struct SocialAuthenticator {
    config: AuthConfig,
    providers: ProviderRegistry,
    profiles: Arc<dyn ProfileStore>,
    users: Arc<dyn UserStore>,
    hooks: Arc<dyn AuthHooks>,
}

impl SocialAuthenticator {
    pub fn new(
        config: AuthConfig,
        providers: ProviderRegistry,
        profiles: Arc<dyn ProfileStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            config,
            providers,
            profiles,
            users,
            hooks: Arc::new(DefaultHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn AuthHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Handle one request.
    ///
    /// Requests whose route does not carry the auth tags come back as
    /// [`AuthOutcome::Passthrough`] with no side effects.
    pub async fn handle(
        &self,
        request: &AuthRequest,
        session: &mut dyn SessionStore,
    ) -> Result<AuthOutcome, AuthError> {
        match classify(&request.route) {
            AuthAction::Passthrough => Ok(AuthOutcome::Passthrough),
            AuthAction::Login => self.handle_login(request, session).await,
            AuthAction::Callback => self.handle_callback(request, session).await,
        }
    }

    /// Login phase: validate the request, remember the return target and
    /// send the user agent to the provider. No profile or user I/O here.
    async fn handle_login(
        &self,
        request: &AuthRequest,
        session: &mut dyn SessionStore,
    ) -> Result<AuthOutcome, AuthError> {
        if request.method != self.config.request_method {
            return Err(AuthError::MethodNotAllowed(request.method.clone()).log());
        }

        let provider_name = request
            .route
            .provider
            .as_deref()
            .ok_or_else(|| AuthError::MissingProvider.log())?;
        let gateway = self
            .providers
            .get(provider_name)
            .ok_or_else(|| AuthError::UnknownProvider(provider_name.to_string()).log())?;

        let location = gateway.authorization_url().await?;

        // Noted for the provider-less callback route.
        session.set(PROVIDER_KEY, Value::String(provider_name.to_string()));
        store_redirect_url(session, &request.query);

        tracing::debug!(provider = provider_name, "redirecting to provider");
        Ok(AuthOutcome::ProviderRedirect { location })
    }

    /// Callback phase: acquire the identity, reconcile profile and user,
    /// establish the session.
    async fn handle_callback(
        &self,
        request: &AuthRequest,
        session: &mut dyn SessionStore,
    ) -> Result<AuthOutcome, AuthError> {
        let provider_name = request
            .route
            .provider
            .clone()
            .or_else(|| {
                session
                    .get(PROVIDER_KEY)
                    .and_then(|v| v.as_str().map(str::to_string))
            })
            .ok_or_else(|| AuthError::MissingProvider.log())?;
        let gateway = self
            .providers
            .get(&provider_name)
            .ok_or_else(|| AuthError::UnknownProvider(provider_name.clone()).log())?;

        // Stage 1: identity acquisition. Every failure here, including an
        // identity without an id, is a classified provider failure; nothing
        // has been persisted yet.
        let (identity, access_token) = match self.acquire_identity(&*gateway, request).await {
            Ok(acquired) => acquired,
            Err(err) => {
                self.log_provider_failure(request, &err);
                return Ok(self.finish_failure(request, AuthStatus::ProviderFailure));
            }
        };

        // Stage 2: profile lookup/upsert with refresh-always semantics.
        let mut profile = self
            .upsert_profile(&provider_name, &identity, &access_token)
            .await?;

        // Stage 3: user resolution.
        let mut newly_linked = false;
        let user = match profile.user_id {
            Some(user_id) => {
                match self.users.find_by_id(user_id, &self.config.finder).await? {
                    Some(user) => user,
                    None => {
                        tracing::debug!(
                            user_id,
                            finder = %self.config.finder,
                            "linked user excluded by finder"
                        );
                        return Ok(self.finish_failure(request, AuthStatus::FinderFailure));
                    }
                }
            }
            None => {
                let user = self
                    .hooks
                    .create_user(&profile, &mut *session)
                    .await
                    .ok_or_else(|| AuthError::CreateUserFailed.log())?;
                profile.user_id = Some(user.id);
                newly_linked = true;
                user
            }
        };

        // Identity-mismatch guard: an already-authenticated session must
        // not be swapped to a different account by a replayed or foreign
        // callback. Compared by primary key of the session user value.
        if let Some(session_user_id) = session_user_id(&*session, &self.config.session_key)
            && session_user_id != user.id
        {
            tracing::debug!(
                session_user = session_user_id,
                resolved_user = user.id,
                "session already authenticated as a different user"
            );
            return Ok(self.finish_failure(request, AuthStatus::IdentityMismatch));
        }

        // Persist the new link. An unsaveable profile is fatal, not a
        // classified failure.
        if newly_linked {
            profile = self.profiles.save(profile).await?;
        }

        // Stage 4: finalize. Strip the password-like field, let the host
        // inspect or replace the value, establish the session.
        let mut user = user;
        user.strip_field(&self.config.password_field);
        let mut user_value = user.session_value(self.config.user_entity);
        attach_profile(&mut user_value, &profile)?;
        if let Some(replacement) = self.hooks.after_identify(&user_value) {
            user_value = replacement;
        }
        session.set(&self.config.session_key, user_value);

        let target = take_redirect_url(session, &self.config.login_redirect);
        Ok(self.finish(request, target, AuthStatus::Success))
    }

    async fn acquire_identity(
        &self,
        gateway: &dyn ProviderGateway,
        request: &AuthRequest,
    ) -> Result<(SocialIdentity, AccessToken), ProviderError> {
        let access_token = gateway.exchange_code(&request.query).await?;
        let identity = gateway.fetch_identity(&access_token).await?;
        if identity.id.is_empty() {
            return Err(ProviderError::MissingIdentifier);
        }
        Ok((identity, access_token))
    }

    /// Look up the profile by natural key, refresh it from the latest
    /// identity, and persist only when something actually changed.
    ///
    /// A duplicate-key failure on insert means a concurrent callback for
    /// the same identity won the race; the stored row is authoritative, so
    /// re-read and refresh it instead of failing or double-creating.
    async fn upsert_profile(
        &self,
        provider: &str,
        identity: &SocialIdentity,
        access_token: &AccessToken,
    ) -> Result<SocialProfile, AuthError> {
        match self
            .profiles
            .find_by_provider(provider, &identity.id)
            .await?
        {
            Some(loaded) => self.refresh_profile(loaded, identity, access_token).await,
            None => {
                let fresh = SocialProfile::new(provider, identity, access_token.clone());
                match self.profiles.save(fresh).await {
                    Ok(saved) => Ok(saved),
                    Err(ProfileError::Duplicate { .. }) => {
                        tracing::debug!(
                            provider,
                            identifier = %identity.id,
                            "profile insert raced with a concurrent callback, reusing stored row"
                        );
                        let loaded = self
                            .profiles
                            .find_by_provider(provider, &identity.id)
                            .await?
                            .ok_or_else(|| {
                                AuthError::from(ProfileError::Storage(
                                    "profile missing after duplicate insert".to_string(),
                                ))
                            })?;
                        self.refresh_profile(loaded, identity, access_token).await
                    }
                    Err(err) => Err(err.into()),
                }
            }
        }
    }

    async fn refresh_profile(
        &self,
        loaded: SocialProfile,
        identity: &SocialIdentity,
        access_token: &AccessToken,
    ) -> Result<SocialProfile, AuthError> {
        let mut profile = loaded.clone();
        profile.apply_identity(identity, access_token.clone());
        if profile != loaded {
            Ok(self.profiles.save(profile).await?)
        } else {
            Ok(profile)
        }
    }

    fn log_provider_failure(&self, request: &AuthRequest, error: &ProviderError) {
        if !self.config.log_errors {
            return;
        }
        tracing::error!(
            error = %error,
            request_target = %request.target,
            referer = request.referer.as_deref().unwrap_or(""),
            provider_response = error.response_body().unwrap_or(""),
            "provider handshake failed"
        );
    }

    fn finish_failure(&self, request: &AuthRequest, status: AuthStatus) -> AuthOutcome {
        let separator = if self.config.login_url.contains('?') {
            '&'
        } else {
            '?'
        };
        let location = format!(
            "{}{}error={}",
            self.config.login_url,
            separator,
            status.as_str()
        );
        self.finish(request, location, status)
    }

    fn finish(&self, request: &AuthRequest, location: String, status: AuthStatus) -> AuthOutcome {
        let location = self
            .hooks
            .before_redirect(&location, status, request)
            .unwrap_or(location);
        AuthOutcome::Completed { location, status }
    }
}

/// Primary key of the user currently held in the session, if any.
///
/// Both session value forms (entity envelope and plain map) carry the key
/// as a top-level `id` member; that member is what the identity-mismatch
/// guard compares.
fn session_user_id(session: &dyn SessionStore, session_key: &str) -> Option<i64> {
    session.get(session_key)?.get("id")?.as_i64()
}

/// Attach the reconciled profile to the session value under
/// `social_profile`, with the token blanked; session consumers get the
/// mirrored identity attributes, not the credential.
fn attach_profile(user_value: &mut Value, profile: &SocialProfile) -> Result<(), AuthError> {
    if let Value::Object(map) = user_value {
        let mut attached = profile.clone();
        attached.access_token = AccessToken::default();
        map.insert(
            "social_profile".to_string(),
            serde_json::to_value(&attached).map_err(|e| AuthError::Serde(e.to_string()))?,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySession;
    use serde_json::json;

    #[test]
    fn test_session_user_id_reads_both_value_forms() {
        let mut session = MemorySession::new();

        // Plain map form
        session.set("auth.user", json!({"id": 3, "email": "a@b.c"}));
        assert_eq!(session_user_id(&session, "auth.user"), Some(3));

        // Entity envelope form
        session.set("auth.user", json!({"id": 5, "fields": {"email": "a@b.c"}}));
        assert_eq!(session_user_id(&session, "auth.user"), Some(5));

        // Nothing stored
        assert_eq!(session_user_id(&session, "other.key"), None);
    }

    #[test]
    fn test_attach_profile_blanks_the_token() {
        let identity = SocialIdentity {
            id: "fbid".to_string(),
            ..SocialIdentity::default()
        };
        let profile = SocialProfile::new("facebook", &identity, AccessToken::bearer("secret"));

        let mut value = json!({"id": 1});
        attach_profile(&mut value, &profile).unwrap();

        assert_eq!(
            value.pointer("/social_profile/identifier"),
            Some(&json!("fbid"))
        );
        assert_eq!(
            value.pointer("/social_profile/access_token"),
            Some(&Value::Null)
        );
    }
}
