//! Route Guard: maps auth state to a navigation decision.
//!
//! SYSTEM CONTEXT
//! ==============
//! Public views (`/login`, `/register`) bounce authenticated users to
//! `/contacts`; protected views (`/contacts`, `/change-password`) bounce
//! anonymous users to `/login`. Nothing is decided while the session is
//! still loading from storage.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use crate::state::auth::AuthState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Root,
    Login,
    Register,
    Contacts,
    ChangePassword,
}

impl Route {
    /// Match a path, ignoring a trailing slash.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Some(Self::Root),
            "/login" => Some(Self::Login),
            "/register" => Some(Self::Register),
            "/contacts" => Some(Self::Contacts),
            "/change-password" => Some(Self::ChangePassword),
            _ => None,
        }
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Contacts => "/contacts",
            Self::ChangePassword => "/change-password",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session still loading; show a neutral waiting view.
    Wait,
    Allow,
    Redirect(Route),
    NotFound,
}

/// Decide what to render for `route` given the current auth state.
#[must_use]
pub fn guard(state: &AuthState, route: Route) -> RouteDecision {
    if state.is_loading() {
        return RouteDecision::Wait;
    }
    let authed = state.is_authenticated();
    match route {
        Route::Login | Route::Register if authed => RouteDecision::Redirect(Route::Contacts),
        Route::Login | Route::Register => RouteDecision::Allow,
        Route::Contacts | Route::ChangePassword if authed => RouteDecision::Allow,
        Route::Contacts | Route::ChangePassword => RouteDecision::Redirect(Route::Login),
        Route::Root if authed => RouteDecision::Redirect(Route::Contacts),
        Route::Root => RouteDecision::Redirect(Route::Login),
    }
}

/// [`guard`] for a raw path; unknown paths are `NotFound` once loading is done.
#[must_use]
pub fn resolve(state: &AuthState, path: &str) -> RouteDecision {
    if state.is_loading() {
        return RouteDecision::Wait;
    }
    Route::parse(path).map_or(RouteDecision::NotFound, |route| guard(state, route))
}
