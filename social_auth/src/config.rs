use std::env;
use std::time::Duration;

use http::Method;

/// Middleware configuration.
///
/// ### Options
///
/// - `request_method`: HTTP method the login action accepts. Default `POST`.
/// - `login_url`: login page URL; auth failures redirect here with an
///   `error` query string var.
/// - `login_redirect`: default post-login target when no hint was stored.
/// - `user_entity`: write the structured user record to the session instead
///   of a plain map. Default `false`.
/// - `finder`: named query scope applied to the user lookup. Default `all`.
/// - `password_field`: field stripped from the user before session exposure.
/// - `session_key`: session key the authenticated user is written under.
/// - `log_errors`: log provider handshake failures. Default `true`.
/// - `provider_timeout`: upper bound on any single provider call.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub request_method: Method,
    pub login_url: String,
    pub login_redirect: String,
    pub user_entity: bool,
    pub finder: String,
    pub password_field: String,
    pub session_key: String,
    pub log_errors: bool,
    pub provider_timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            request_method: Method::POST,
            login_url: "/users/login".to_string(),
            login_redirect: "/".to_string(),
            user_entity: false,
            finder: "all".to_string(),
            password_field: "password".to_string(),
            session_key: "auth.user".to_string(),
            log_errors: true,
            provider_timeout: Duration::from_secs(10),
        }
    }
}

impl AuthConfig {
    /// Defaults overridden by `SOCIAL_AUTH_*` environment variables.
    ///
    /// Unparsable values keep the default rather than failing startup.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(method) = env::var("SOCIAL_AUTH_REQUEST_METHOD")
            .ok()
            .and_then(|v| v.parse::<Method>().ok())
        {
            config.request_method = method;
        }
        if let Ok(url) = env::var("SOCIAL_AUTH_LOGIN_URL") {
            config.login_url = url;
        }
        if let Ok(target) = env::var("SOCIAL_AUTH_LOGIN_REDIRECT") {
            config.login_redirect = target;
        }
        if let Some(entity) = env::var("SOCIAL_AUTH_USER_ENTITY")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
        {
            config.user_entity = entity;
        }
        if let Ok(finder) = env::var("SOCIAL_AUTH_FINDER") {
            config.finder = finder;
        }
        if let Ok(field) = env::var("SOCIAL_AUTH_PASSWORD_FIELD") {
            config.password_field = field;
        }
        if let Ok(key) = env::var("SOCIAL_AUTH_SESSION_KEY") {
            config.session_key = key;
        }
        if let Some(log_errors) = env::var("SOCIAL_AUTH_LOG_ERRORS")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
        {
            config.log_errors = log_errors;
        }
        if let Some(secs) = env::var("SOCIAL_AUTH_PROVIDER_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.provider_timeout = Duration::from_secs(secs);
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();

        assert_eq!(config.request_method, Method::POST);
        assert_eq!(config.login_url, "/users/login");
        assert_eq!(config.login_redirect, "/");
        assert!(!config.user_entity);
        assert_eq!(config.finder, "all");
        assert_eq!(config.password_field, "password");
        assert_eq!(config.session_key, "auth.user");
        assert!(config.log_errors);
        assert_eq!(config.provider_timeout, Duration::from_secs(10));
    }

    #[test]
    #[serial(social_auth_env)]
    fn test_env_overrides() {
        unsafe {
            env::set_var("SOCIAL_AUTH_REQUEST_METHOD", "GET");
            env::set_var("SOCIAL_AUTH_LOGIN_URL", "/signin");
            env::set_var("SOCIAL_AUTH_PROVIDER_TIMEOUT", "3");
        }

        let config = AuthConfig::from_env();

        unsafe {
            env::remove_var("SOCIAL_AUTH_REQUEST_METHOD");
            env::remove_var("SOCIAL_AUTH_LOGIN_URL");
            env::remove_var("SOCIAL_AUTH_PROVIDER_TIMEOUT");
        }

        assert_eq!(config.request_method, Method::GET);
        assert_eq!(config.login_url, "/signin");
        assert_eq!(config.provider_timeout, Duration::from_secs(3));
    }

    #[test]
    #[serial(social_auth_env)]
    fn test_unparsable_env_value_keeps_default() {
        unsafe {
            env::set_var("SOCIAL_AUTH_PROVIDER_TIMEOUT", "soon");
        }

        let config = AuthConfig::from_env();

        unsafe {
            env::remove_var("SOCIAL_AUTH_PROVIDER_TIMEOUT");
        }

        assert_eq!(config.provider_timeout, Duration::from_secs(10));
    }
}
