//! social-auth - social login integration core for web applications
//!
//! This crate drives an OAuth/OpenID-style handshake against third-party
//! identity providers, maps the returned identity onto a persisted social
//! profile, links that profile to a local user account (creating one through
//! a host hook if needed) and establishes the authenticated session.
//!
//! The host framework supplies the edges: routing attributes come in as
//! [`RouteAttributes`], storage as [`ProfileStore`]/[`UserStore`]
//! implementations, the per-request session as a [`SessionStore`], and the
//! provider protocol work as [`ProviderGateway`] implementations. The
//! [`SocialAuthenticator`] in the middle classifies each request, runs the
//! login/callback state machine and answers with an [`AuthOutcome`].

mod config;
mod coordination;
mod profile;
mod provider;
mod session;
mod userdb;

pub use config::AuthConfig;

pub use coordination::{
    AUTH_CONTROLLER, AUTH_PLUGIN, AuthAction, AuthError, AuthHooks, AuthOutcome, AuthRequest,
    AuthStatus, DefaultHooks, RouteAttributes, SocialAuthenticator, classify,
};

pub use profile::{MemoryProfileStore, ProfileError, ProfileStore, SocialProfile, SqliteProfileStore};

pub use provider::{AccessToken, ProviderError, ProviderGateway, ProviderRegistry, SocialIdentity};

pub use session::{
    MemorySession, PROVIDER_KEY, QUERY_STRING_REDIRECT, REDIRECT_URL_KEY, SessionStore,
};

pub use userdb::{MemoryUserStore, UserError, UserRecord, UserStore};
