use std::collections::HashMap;

use serde_json::Value;

use super::{REDIRECT_URL_KEY, SessionStore};

/// Query-string key carrying the desired post-login redirect target.
pub const QUERY_STRING_REDIRECT: &str = "redirect";

/// Remember the caller's post-login return target across the provider
/// round-trip.
///
/// Any previously stored value is cleared first. Only same-origin absolute
/// paths are accepted; anything else (external URLs, scheme-relative
/// `//host` values) is dropped silently and the configured default applies
/// after the callback.
pub(crate) fn store_redirect_url(session: &mut dyn SessionStore, query: &HashMap<String, String>) {
    session.delete(REDIRECT_URL_KEY);

    let Some(target) = query.get(QUERY_STRING_REDIRECT) else {
        return;
    };
    if !is_safe_redirect(target) {
        tracing::debug!(target = %target, "ignoring unsafe redirect hint");
        return;
    }

    session.set(REDIRECT_URL_KEY, Value::String(target.clone()));
}

/// Consume the stored return target, falling back to `fallback`.
///
/// Read-then-delete: the stored hint is single use.
pub(crate) fn take_redirect_url(session: &mut dyn SessionStore, fallback: &str) -> String {
    match session.delete(REDIRECT_URL_KEY) {
        Some(Value::String(target)) => target,
        _ => fallback.to_string(),
    }
}

fn is_safe_redirect(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySession;

    fn query(target: &str) -> HashMap<String, String> {
        HashMap::from([(QUERY_STRING_REDIRECT.to_string(), target.to_string())])
    }

    #[test]
    fn test_valid_path_is_stored_and_single_use() {
        // Given a login request with a same-origin path hint
        let mut session = MemorySession::new();
        store_redirect_url(&mut session, &query("/dashboard"));

        // Then the first read consumes it
        assert_eq!(take_redirect_url(&mut session, "/"), "/dashboard");

        // And a second read falls back to the default
        assert_eq!(take_redirect_url(&mut session, "/"), "/");
    }

    #[test]
    fn test_scheme_relative_url_is_dropped() {
        // //evil.test would resolve to a foreign origin
        let mut session = MemorySession::new();
        store_redirect_url(&mut session, &query("//evil.test"));

        assert_eq!(take_redirect_url(&mut session, "/"), "/");
    }

    #[test]
    fn test_absolute_url_is_dropped() {
        let mut session = MemorySession::new();
        store_redirect_url(&mut session, &query("https://evil.test/phish"));

        assert_eq!(take_redirect_url(&mut session, "/"), "/");
    }

    #[test]
    fn test_missing_hint_leaves_no_value() {
        let mut session = MemorySession::new();
        store_redirect_url(&mut session, &HashMap::new());

        assert_eq!(session.get(REDIRECT_URL_KEY), None);
    }

    #[test]
    fn test_invalid_hint_clears_prior_value() {
        // A stale stored target must not survive a new login attempt with a
        // bad hint.
        let mut session = MemorySession::new();
        store_redirect_url(&mut session, &query("/old-target"));
        store_redirect_url(&mut session, &query("//evil.test"));

        assert_eq!(take_redirect_url(&mut session, "/"), "/");
    }
}
