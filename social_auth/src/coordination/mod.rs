//! The auth orchestrator: request classification, the login/callback state
//! machine, and identity reconciliation.

mod authenticator;
mod classify;
mod errors;
mod hooks;
mod types;

pub use authenticator::SocialAuthenticator;
pub use classify::classify;
pub use errors::AuthError;
pub use hooks::{AuthHooks, DefaultHooks};
pub use types::{
    AUTH_CONTROLLER, AUTH_PLUGIN, AuthAction, AuthOutcome, AuthRequest, AuthStatus, RouteAttributes,
};
