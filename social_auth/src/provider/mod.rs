//! Provider gateway capability.
//!
//! The actual OAuth/OpenID protocol work (authorization URL construction,
//! code-for-token exchange, identity fetch) lives behind the
//! [`ProviderGateway`] trait; this crate only drives the handshake and
//! classifies its failures.

mod errors;
mod gateway;
mod registry;
mod types;

pub use errors::ProviderError;
pub use gateway::ProviderGateway;
pub use registry::ProviderRegistry;
pub use types::{AccessToken, SocialIdentity};
