use super::types::{AUTH_CONTROLLER, AUTH_PLUGIN, AuthAction, RouteAttributes};

/// Decide what to do with a request based on its routing attributes.
///
/// Pure and side-effect free: all of plugin tag, controller tag and a known
/// action must match, otherwise the request passes through untouched.
pub fn classify(route: &RouteAttributes) -> AuthAction {
    if route.plugin.as_deref() != Some(AUTH_PLUGIN)
        || route.controller.as_deref() != Some(AUTH_CONTROLLER)
    {
        return AuthAction::Passthrough;
    }

    match route.action.as_deref() {
        Some("login") => AuthAction::Login,
        Some("callback") => AuthAction::Callback,
        _ => AuthAction::Passthrough,
    }
}
