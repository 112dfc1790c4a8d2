use http::{Method, StatusCode};
use thiserror::Error;

use crate::profile::ProfileError;
use crate::provider::ProviderError;
use crate::userdb::UserError;

/// Fatal conditions of the auth orchestrator.
///
/// Everything here aborts the request loudly; recoverable auth outcomes
/// (provider failure, finder exclusion, identity mismatch) are classified
/// redirects, not errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login was attempted with a method other than the configured one.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(Method),

    /// The named provider is not configured; a deployment error, not a
    /// recoverable auth failure.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Neither the route nor the session names a provider.
    #[error("No provider in route or session")]
    MissingProvider,

    /// The create-user hook did not return a persisted user record.
    #[error("create_user hook did not return a persisted user")]
    CreateUserFailed,

    #[error("Unknown auth status: {0}")]
    UnknownStatus(String),

    /// Provider error outside the classified callback path (e.g. while
    /// building the authorization URL during login).
    #[error("Provider error: {0}")]
    Provider(ProviderError),

    /// Error from profile storage.
    #[error("Profile error: {0}")]
    Profile(ProfileError),

    /// Error from the user store.
    #[error("User error: {0}")]
    User(UserError),

    #[error("Serde error: {0}")]
    Serde(String),
}

impl AuthError {
    /// Log the error and return self, for chaining at the raise site.
    pub fn log(self) -> Self {
        tracing::error!("{}", self);
        self
    }

    /// HTTP status a host should answer with when this error aborts the
    /// request.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingProvider => StatusCode::NOT_FOUND,
            Self::UnknownProvider(_)
            | Self::CreateUserFailed
            | Self::UnknownStatus(_)
            | Self::Provider(_)
            | Self::Profile(_)
            | Self::User(_)
            | Self::Serde(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// From impls log on conversion so error paths stay visible without
// boilerplate at every call site.

impl From<ProviderError> for AuthError {
    fn from(err: ProviderError) -> Self {
        let error = Self::Provider(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<ProfileError> for AuthError {
    fn from(err: ProfileError) -> Self {
        let error = Self::Profile(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<UserError> for AuthError {
    fn from(err: UserError) -> Self {
        let error = Self::User(err);
        tracing::error!("{}", error);
        error
    }
}
