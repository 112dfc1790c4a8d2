use std::collections::HashMap;
use std::str::FromStr;

use http::Method;
use serde::{Deserialize, Serialize};

use super::errors::AuthError;

/// Plugin tag an auth route must carry.
pub const AUTH_PLUGIN: &str = "social-auth";

/// Controller tag an auth route must carry.
pub const AUTH_CONTROLLER: &str = "auth";

/// Routing attributes of the incoming request, as resolved by the host
/// framework's router.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteAttributes {
    pub plugin: Option<String>,
    pub controller: Option<String>,
    pub action: Option<String>,
    pub provider: Option<String>,
}

impl RouteAttributes {
    /// Attributes of the login route for `provider`.
    pub fn login(provider: &str) -> Self {
        Self::auth("login", Some(provider))
    }

    /// Attributes of the callback route; the provider segment is optional
    /// (a bare `/callback` resolves it from the session).
    pub fn callback(provider: Option<&str>) -> Self {
        Self::auth("callback", provider)
    }

    fn auth(action: &str, provider: Option<&str>) -> Self {
        Self {
            plugin: Some(AUTH_PLUGIN.to_string()),
            controller: Some(AUTH_CONTROLLER.to_string()),
            action: Some(action.to_string()),
            provider: provider.map(str::to_string),
        }
    }
}

/// The slice of the incoming request the orchestrator needs.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub method: Method,
    /// Request target, for failure diagnostics.
    pub target: String,
    pub query: HashMap<String, String>,
    pub referer: Option<String>,
    pub route: RouteAttributes,
}

impl AuthRequest {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            query: HashMap::new(),
            referer: None,
            route: RouteAttributes::default(),
        }
    }

    pub fn with_route(mut self, route: RouteAttributes) -> Self {
        self.route = route;
        self
    }

    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }
}

/// What the classifier decided to do with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    /// Not an auth URL; the request is none of our business.
    Passthrough,
    Login,
    Callback,
}

/// Outcome classification of a finished callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    Success,
    /// The provider handshake failed or returned an unusable identity.
    ProviderFailure,
    /// The linked user exists but the configured finder excluded it.
    FinderFailure,
    /// The session is already authenticated as a different user.
    IdentityMismatch,
}

impl AuthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::ProviderFailure => "provider_failure",
            Self::FinderFailure => "finder_failure",
            Self::IdentityMismatch => "identity_mismatch",
        }
    }
}

impl FromStr for AuthStatus {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "provider_failure" => Ok(Self::ProviderFailure),
            "finder_failure" => Ok(Self::FinderFailure),
            "identity_mismatch" => Ok(Self::IdentityMismatch),
            _ => Err(AuthError::UnknownStatus(s.to_string())),
        }
    }
}

/// How the orchestrator answered a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Delegate the unchanged request downstream.
    Passthrough,
    /// Login accepted; 302 to the provider's authorization URL.
    ProviderRedirect { location: String },
    /// Callback finished; 302 to `location` with the classified status.
    Completed {
        location: String,
        status: AuthStatus,
    },
}

impl AuthOutcome {
    /// Redirect target, when this outcome is a redirect.
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Passthrough => None,
            Self::ProviderRedirect { location } | Self::Completed { location, .. } => {
                Some(location)
            }
        }
    }
}
