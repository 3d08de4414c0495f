use super::*;
use crate::test_support::ada;

const ALL_ROUTES: [Route; 5] = [Route::Root, Route::Login, Route::Register, Route::Contacts, Route::ChangePassword];

fn authed() -> AuthState {
    AuthState::authenticated(ada(), "abc".into())
}

#[test]
fn every_route_waits_while_loading() {
    for route in ALL_ROUTES {
        assert_eq!(guard(&AuthState::loading(), route), RouteDecision::Wait, "{route:?}");
    }
}

#[test]
fn anonymous_users_see_public_views() {
    let state = AuthState::anonymous();
    assert_eq!(guard(&state, Route::Login), RouteDecision::Allow);
    assert_eq!(guard(&state, Route::Register), RouteDecision::Allow);
}

#[test]
fn anonymous_users_are_sent_to_login_from_protected_views() {
    let state = AuthState::anonymous();
    assert_eq!(guard(&state, Route::Contacts), RouteDecision::Redirect(Route::Login));
    assert_eq!(guard(&state, Route::ChangePassword), RouteDecision::Redirect(Route::Login));
    assert_eq!(guard(&state, Route::Root), RouteDecision::Redirect(Route::Login));
}

#[test]
fn authenticated_users_see_protected_views() {
    let state = authed();
    assert_eq!(guard(&state, Route::Contacts), RouteDecision::Allow);
    assert_eq!(guard(&state, Route::ChangePassword), RouteDecision::Allow);
}

#[test]
fn authenticated_users_are_sent_to_contacts_from_public_views() {
    let state = authed();
    assert_eq!(guard(&state, Route::Login), RouteDecision::Redirect(Route::Contacts));
    assert_eq!(guard(&state, Route::Register), RouteDecision::Redirect(Route::Contacts));
    assert_eq!(guard(&state, Route::Root), RouteDecision::Redirect(Route::Contacts));
}

#[test]
fn parse_round_trips_paths() {
    for route in ALL_ROUTES {
        assert_eq!(Route::parse(route.path()), Some(route));
    }
}

#[test]
fn parse_ignores_trailing_slash() {
    assert_eq!(Route::parse("/contacts/"), Some(Route::Contacts));
}

#[test]
fn resolve_unknown_path_is_not_found() {
    assert_eq!(resolve(&AuthState::anonymous(), "/admin"), RouteDecision::NotFound);
    assert_eq!(resolve(&authed(), "/admin"), RouteDecision::NotFound);
}

#[test]
fn resolve_waits_while_loading_even_for_unknown_paths() {
    assert_eq!(resolve(&AuthState::loading(), "/admin"), RouteDecision::Wait);
}

#[test]
fn resolve_delegates_to_guard() {
    assert_eq!(resolve(&authed(), "/login"), RouteDecision::Redirect(Route::Contacts));
}
