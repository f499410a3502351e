//! Integration tests for sign-in, sign-out, and password changes.

mod helpers;

use clubdesk_auth::rbac::{Capability, Section};
use clubdesk_core::ErrorKind;
use clubdesk_entity::session::SessionPhase;
use clubdesk_entity::user::Role;

#[tokio::test]
async fn test_staff_sign_in_grants_operations_only() {
    let app = helpers::TestApp::new().await;
    let snapshot = app.sign_in(helpers::STAFF_EMAIL).await;

    assert_eq!(snapshot.phase, SessionPhase::Authenticated);
    assert_eq!(snapshot.role, Some(Role::Staff));
    assert_eq!(snapshot.full_name.as_deref(), Some("Baraka Mwita"));
    assert!(!snapshot.loading);

    assert!(app.session.can(Capability::ViewOperations));
    assert!(app.session.can(Capability::ManageOperations));
    assert!(!app.session.can(Capability::ViewFinance));
    assert!(!app.session.can(Capability::RecordFinance));
    assert!(!app.session.can(Capability::ManageUsers));

    let sections = Section::visible_to(snapshot.role);
    assert!(sections.contains(&Section::Players));
    assert!(!sections.contains(&Section::Finances));
    assert!(!sections.contains(&Section::Users));
}

#[tokio::test]
async fn test_blocked_account_is_signed_out_again() {
    let app = helpers::TestApp::new().await;

    let err = app
        .session
        .sign_in(helpers::BLOCKED_EMAIL, helpers::PASSWORD)
        .await
        .unwrap_err();

    assert!(err.is(ErrorKind::AccountBlocked));
    assert_eq!(err.message, "Account is blocked. Contact an admin.");
    assert_eq!(app.session.snapshot().phase, SessionPhase::Anonymous);
    assert_eq!(app.provider.calls().sign_out, 1);
    assert!(!app.session.can(Capability::ViewOperations));
}

#[tokio::test]
async fn test_wrong_password_reports_provider_message() {
    let app = helpers::TestApp::new().await;

    let err = app
        .session
        .sign_in(helpers::STAFF_EMAIL, "not-the-password")
        .await
        .unwrap_err();

    assert!(err.is(ErrorKind::InvalidCredentials));
    assert_eq!(err.message, "Invalid login credentials");
    assert_eq!(app.session.snapshot().phase, SessionPhase::Anonymous);
}

#[tokio::test]
async fn test_unrecognized_role_has_no_access() {
    let app = helpers::TestApp::new().await;
    let snapshot = app.sign_in(helpers::COACH_EMAIL).await;

    assert_eq!(snapshot.phase, SessionPhase::Authenticated);
    assert_eq!(snapshot.role, None);
    for capability in Capability::ALL {
        assert!(!app.session.can(capability), "{capability} should be denied");
    }
    assert!(Section::visible_to(snapshot.role).is_empty());
}

#[tokio::test]
async fn test_short_password_never_reaches_provider() {
    let app = helpers::TestApp::new().await;
    app.sign_in(helpers::STAFF_EMAIL).await;

    let err = app.session.change_password("abc", "abc").await.unwrap_err();

    assert!(err.is(ErrorKind::WeakPassword));
    assert_eq!(err.message, "Password must be at least 6 characters.");
    assert_eq!(app.provider.calls().update_password, 0);
    assert_eq!(app.session.snapshot().phase, SessionPhase::Authenticated);
}

#[tokio::test]
async fn test_password_change_round_trip() {
    let app = helpers::TestApp::new().await;
    app.sign_in(helpers::FINANCE_EMAIL).await;

    app.session
        .change_password("finance2025", "finance2025")
        .await
        .unwrap();
    assert_eq!(app.provider.calls().update_password, 1);

    app.session.sign_out().await;
    let snapshot = app
        .session
        .sign_in(helpers::FINANCE_EMAIL, "finance2025")
        .await
        .unwrap();
    assert_eq!(snapshot.role, Some(Role::Finance));
}

#[tokio::test]
async fn test_sign_out_is_idempotent() {
    let app = helpers::TestApp::new().await;
    app.sign_in(helpers::ADMIN_EMAIL).await;

    app.session.sign_out().await;
    app.session.sign_out().await;

    assert_eq!(app.session.snapshot().phase, SessionPhase::Anonymous);
    assert_eq!(app.provider.calls().sign_out, 1);
}

#[tokio::test]
async fn test_concurrent_sign_outs_call_provider_once() {
    let app = helpers::TestApp::new().await;
    app.sign_in(helpers::ADMIN_EMAIL).await;

    let first = app.session.clone();
    let second = app.session.clone();
    tokio::join!(first.sign_out(), second.sign_out());

    assert_eq!(app.session.snapshot().phase, SessionPhase::Anonymous);
    assert_eq!(app.provider.calls().sign_out, 1);
}

#[tokio::test]
async fn test_existing_provider_session_is_resumed() {
    let app = helpers::TestApp::uninitialized();
    let other = helpers::second_session(&app.provider);
    other.initialize().await;
    other
        .sign_in(helpers::ADMIN_EMAIL, helpers::PASSWORD)
        .await
        .unwrap();

    let snapshot = app.session.initialize().await;
    assert_eq!(snapshot.phase, SessionPhase::Authenticated);
    assert_eq!(snapshot.role, Some(Role::Admin));
}

#[tokio::test]
async fn test_unreachable_provider_starts_signed_out() {
    let app = helpers::TestApp::uninitialized();
    app.provider.set_offline(true);

    let snapshot = app.session.initialize().await;
    assert_eq!(snapshot.phase, SessionPhase::Anonymous);

    let err = app
        .session
        .sign_in(helpers::STAFF_EMAIL, helpers::PASSWORD)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::BackendUnavailable));
}
