//! Registration and credential verification behavior.

mod common;

use common::{TEST_PASSWORD, register, register_request, test_state};
use vidhive_api::credentials::{change_password, register_user, verify_credentials};
use vidhive_api::error::ApiError;

#[test]
fn registration_normalizes_and_returns_public_fields() {
    let state = test_state();

    let mut req = register_request("alice");
    req.username = "  Alice ".into();
    req.email = " Alice@Example.COM ".into();

    let user = register_user(&state, &req).unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.avatar, "avatar.png");
    assert!(user.cover_image.is_none());
}

#[test]
fn duplicate_username_any_case_is_rejected() {
    let state = test_state();
    register(&state, "alice");

    let mut req = register_request("ALICE");
    req.email = "different@example.com".into();
    assert!(matches!(
        register_user(&state, &req),
        Err(ApiError::DuplicateIdentity)
    ));
}

#[test]
fn duplicate_email_any_case_is_rejected() {
    let state = test_state();
    register(&state, "alice");

    let mut req = register_request("somebody-else");
    req.email = "ALICE@example.com".into();
    assert!(matches!(
        register_user(&state, &req),
        Err(ApiError::DuplicateIdentity)
    ));
}

#[test]
fn empty_fields_fail_validation() {
    let state = test_state();

    for field in ["username", "email", "full_name", "password", "avatar"] {
        let mut req = register_request("alice");
        match field {
            "username" => req.username = "   ".into(),
            "email" => req.email = String::new(),
            "full_name" => req.full_name = " ".into(),
            "password" => req.password = String::new(),
            "avatar" => req.avatar = "  ".into(),
            _ => unreachable!(),
        }
        assert!(
            matches!(register_user(&state, &req), Err(ApiError::Validation(_))),
            "field {field} should be required"
        );
    }
}

#[test]
fn verify_accepts_username_or_email() {
    let state = test_state();
    let user = register(&state, "alice");

    let by_name = verify_credentials(&state, "alice", TEST_PASSWORD).unwrap();
    let by_email = verify_credentials(&state, "Alice@Example.com", TEST_PASSWORD).unwrap();
    assert_eq!(by_name.id, user.id.to_string());
    assert_eq!(by_email.id, user.id.to_string());
}

#[test]
fn wrong_password_and_unknown_user_are_indistinguishable() {
    let state = test_state();
    register(&state, "alice");

    let wrong_password = verify_credentials(&state, "alice", "not the password");
    let unknown_user = verify_credentials(&state, "nobody", TEST_PASSWORD);

    // Same error kind, same message — no enumeration signal.
    let a = wrong_password.err().expect("must fail");
    let b = unknown_user.err().expect("must fail");
    assert!(matches!(a, ApiError::InvalidCredentials));
    assert!(matches!(b, ApiError::InvalidCredentials));
    assert_eq!(a.to_string(), b.to_string());
}

#[test]
fn password_with_surrounding_spaces_round_trips() {
    let state = test_state();

    let mut req = register_request("alice");
    req.password = " spaced password ".into();
    register_user(&state, &req).unwrap();

    // The password is hashed exactly as supplied, so the exact string the
    // user registered with must verify — and nothing else.
    verify_credentials(&state, "alice", " spaced password ").unwrap();
    assert!(matches!(
        verify_credentials(&state, "alice", "spaced password"),
        Err(ApiError::InvalidCredentials)
    ));
}

#[test]
fn changed_password_with_spaces_round_trips() {
    let state = test_state();
    let user = register(&state, "alice");

    change_password(&state, &user.id, TEST_PASSWORD, " padded secret ").unwrap();
    verify_credentials(&state, "alice", " padded secret ").unwrap();
    assert!(matches!(
        verify_credentials(&state, "alice", "padded secret"),
        Err(ApiError::InvalidCredentials)
    ));
}

#[test]
fn change_password_requires_current_and_takes_effect() {
    let state = test_state();
    let user = register(&state, "alice");

    assert!(matches!(
        change_password(&state, &user.id, "wrong", "new-password"),
        Err(ApiError::InvalidCredentials)
    ));

    change_password(&state, &user.id, TEST_PASSWORD, "new-password").unwrap();

    assert!(matches!(
        verify_credentials(&state, "alice", TEST_PASSWORD),
        Err(ApiError::InvalidCredentials)
    ));
    verify_credentials(&state, "alice", "new-password").unwrap();
}
