use super::*;

#[test]
fn authentication_display_includes_backend_message() {
    let err = ClientError::Authentication { status: 401, message: "Bad credentials".into() };
    assert_eq!(err.to_string(), "authentication failed (401): Bad credentials");
}

#[test]
fn unauthenticated_display_is_stable() {
    assert_eq!(ClientError::Unauthenticated.to_string(), "user is not authenticated");
}

#[test]
fn validation_display_is_the_bare_message() {
    let err = ClientError::Validation("Passwords do not match.".into());
    assert_eq!(err.to_string(), "Passwords do not match.");
}

#[test]
fn error_codes_are_distinct_per_variant() {
    let errors = [
        ClientError::Authentication { status: 401, message: String::new() },
        ClientError::Api { status: 404, message: String::new() },
        ClientError::Validation(String::new()),
        ClientError::CorruptPersistedState(String::new()),
        ClientError::Unauthenticated,
        ClientError::Decode(String::new()),
        ClientError::Storage(String::new()),
        ClientError::HttpClientBuild(String::new()),
    ];
    let mut codes: Vec<&str> = errors.iter().map(ErrorCode::error_code).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), errors.len());
}

#[test]
fn server_errors_and_rate_limits_are_retryable() {
    assert!(ClientError::Api { status: 503, message: String::new() }.retryable());
    assert!(ClientError::Api { status: 429, message: String::new() }.retryable());
    assert!(!ClientError::Api { status: 404, message: String::new() }.retryable());
    assert!(!ClientError::Authentication { status: 500, message: String::new() }.retryable());
    assert!(!ClientError::Unauthenticated.retryable());
}

#[test]
fn into_authentication_retags_api_errors_only() {
    let retagged = ClientError::Api { status: 400, message: "nope".into() }.into_authentication();
    assert!(matches!(retagged, ClientError::Authentication { status: 400, ref message } if message == "nope"));

    let untouched = ClientError::Decode("bad".into()).into_authentication();
    assert!(matches!(untouched, ClientError::Decode(_)));
}

#[test]
fn status_reports_backend_status() {
    assert_eq!(ClientError::Api { status: 404, message: String::new() }.status(), Some(404));
    assert_eq!(ClientError::Unauthenticated.status(), None);
}
