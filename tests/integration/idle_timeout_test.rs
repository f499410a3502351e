//! Integration tests for the five-minute idle timeout.

mod helpers;

use std::time::Duration;

use clubdesk_auth::IDLE_TIMEOUT;
use clubdesk_entity::session::{ActivitySignal, SessionPhase};

#[tokio::test(start_paused = true)]
async fn test_idle_session_expires_after_five_minutes() {
    let app = helpers::TestApp::new().await;
    app.sign_in(helpers::STAFF_EMAIL).await;
    assert_eq!(IDLE_TIMEOUT, Duration::from_secs(300));

    tokio::time::sleep(Duration::from_secs(299)).await;
    assert_eq!(app.session.snapshot().phase, SessionPhase::Authenticated);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(app.session.snapshot().phase, SessionPhase::Anonymous);
    assert_eq!(app.provider.calls().sign_out, 1);
}

#[tokio::test(start_paused = true)]
async fn test_idle_timer_fires_once() {
    let app = helpers::TestApp::new().await;
    app.sign_in(helpers::STAFF_EMAIL).await;

    tokio::time::sleep(IDLE_TIMEOUT + Duration::from_secs(1)).await;
    tokio::time::sleep(IDLE_TIMEOUT * 3).await;

    assert_eq!(app.session.snapshot().phase, SessionPhase::Anonymous);
    assert_eq!(app.provider.calls().sign_out, 1);
}

#[tokio::test(start_paused = true)]
async fn test_activity_postpones_expiry() {
    let app = helpers::TestApp::new().await;
    app.sign_in(helpers::FINANCE_EMAIL).await;

    for signal in [ActivitySignal::PointerMove, ActivitySignal::Scroll, ActivitySignal::KeyDown] {
        tokio::time::sleep(Duration::from_secs(240)).await;
        app.session.record_activity(signal).await;
    }
    assert_eq!(app.session.snapshot().phase, SessionPhase::Authenticated);
    assert!(app.session.idle_for().await.unwrap() < Duration::from_secs(1));

    tokio::time::sleep(IDLE_TIMEOUT + Duration::from_secs(1)).await;
    assert_eq!(app.session.snapshot().phase, SessionPhase::Anonymous);
}

#[tokio::test(start_paused = true)]
async fn test_manual_sign_out_disarms_timer() {
    let app = helpers::TestApp::new().await;
    app.sign_in(helpers::ADMIN_EMAIL).await;

    tokio::time::sleep(Duration::from_secs(60)).await;
    app.session.sign_out().await;
    tokio::time::sleep(IDLE_TIMEOUT * 2).await;

    assert_eq!(app.session.snapshot().phase, SessionPhase::Anonymous);
    assert_eq!(app.provider.calls().sign_out, 1);
}

#[tokio::test(start_paused = true)]
async fn test_activity_while_signed_out_is_ignored() {
    let app = helpers::TestApp::new().await;

    app.session.record_activity(ActivitySignal::Click).await;
    assert!(app.session.idle_for().await.is_none());

    tokio::time::sleep(IDLE_TIMEOUT * 2).await;
    assert_eq!(app.provider.calls().sign_out, 0);
}
