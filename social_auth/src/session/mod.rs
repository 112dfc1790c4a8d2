//! Request-scoped session access and the redirect-target manager.
//!
//! The session is an explicit key-value store handed to the orchestrator per
//! request, never ambient state. Keys owned by this crate:
//!
//! - [`REDIRECT_URL_KEY`] — post-login return target, single use
//! - [`PROVIDER_KEY`] — provider name noted at login for the bare
//!   `/callback` route
//! - the configured `session_key` — the authenticated user value

mod redirect;

use std::collections::HashMap;

use serde_json::Value;

pub(crate) use redirect::{store_redirect_url, take_redirect_url};
pub use redirect::QUERY_STRING_REDIRECT;

/// Session key holding the post-login redirect target.
pub const REDIRECT_URL_KEY: &str = "social_auth.redirect_url";

/// Session key holding the provider name for the current handshake.
pub const PROVIDER_KEY: &str = "social_auth.provider";

/// Key-value session access for one request.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
    fn delete(&mut self, key: &str) -> Option<Value>;
}

/// Plain map session, used in tests and by hosts without a session backend.
#[derive(Debug, Default)]
pub struct MemorySession {
    values: HashMap<String, Value>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn delete(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }
}
