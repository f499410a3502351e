//! Integration tests for admin actions and their effect on live sessions.

mod helpers;

use chrono::NaiveDate;

use clubdesk_auth::rbac::Capability;
use clubdesk_core::ErrorKind;
use clubdesk_core::types::MemberId;
use clubdesk_entity::contract::{ContractDraft, ContractStatus, ContractType};
use clubdesk_entity::audit::AuditAction;
use clubdesk_entity::finance::{LedgerCategory, LedgerDraft};
use clubdesk_entity::member::{MemberDraft, MemberType};
use clubdesk_entity::session::SessionPhase;
use clubdesk_entity::user::{Role, UpdateUser};

fn contract_draft() -> ContractDraft {
    ContractDraft {
        member_id: MemberId::new(),
        contract_type: ContractType::Player,
        position_title: Some("Goalkeeper".into()),
        start_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
        monthly_allowance: 200_000.0,
        registration_fee: 50_000.0,
        status: ContractStatus::Active,
        notes: None,
    }
}

#[tokio::test]
async fn test_admin_cannot_block_own_account() {
    let app = helpers::TestApp::new().await;
    app.sign_in(helpers::ADMIN_EMAIL).await;
    let ctx = app.actor();

    let err = app
        .users
        .block_user(&ctx, app.admin_id, Some("testing"))
        .await
        .unwrap_err();

    assert!(err.is(ErrorKind::PermissionDenied));
    assert_eq!(err.message, "You cannot block your own account.");
    assert_eq!(app.provider.calls().admin_writes, 0);
    assert!(app.provider.profile(app.admin_id).unwrap().is_active);
}

#[tokio::test]
async fn test_admin_cannot_remove_own_admin_role() {
    let app = helpers::TestApp::new().await;
    app.sign_in(helpers::ADMIN_EMAIL).await;
    let ctx = app.actor();

    let update = UpdateUser {
        email: helpers::ADMIN_EMAIL.into(),
        full_name: "Amani Juma".into(),
        role: Role::Finance,
        is_active: true,
    };
    let err = app
        .users
        .update_user(&ctx, app.admin_id, update)
        .await
        .unwrap_err();

    assert!(err.is(ErrorKind::PermissionDenied));
    assert_eq!(err.message, "You cannot remove your own admin role.");
    assert_eq!(app.provider.calls().admin_writes, 0);
}

#[tokio::test]
async fn test_blocked_user_is_signed_out_on_next_check() {
    let app = helpers::TestApp::new().await;
    app.sign_in(helpers::STAFF_EMAIL).await;

    // An admin elsewhere blocks the signed-in staff account.
    let admin_ctx = clubdesk_service::ActorContext {
        user_id: app.admin_id,
        email: helpers::ADMIN_EMAIL.into(),
        full_name: None,
        role: Some(Role::Admin),
        acted_at: chrono::Utc::now(),
    };
    app.users
        .block_user(&admin_ctx, app.staff_id, Some("Contract ended"))
        .await
        .unwrap();

    let snapshot = app.session.recheck().await;
    assert_eq!(snapshot.phase, SessionPhase::Anonymous);
    assert_eq!(app.provider.calls().sign_out, 1);

    let err = app
        .session
        .sign_in(helpers::STAFF_EMAIL, helpers::PASSWORD)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::AccountBlocked));
}

#[tokio::test]
async fn test_role_change_applies_to_next_action() {
    let app = helpers::TestApp::new().await;
    app.sign_in(helpers::STAFF_EMAIL).await;
    assert!(!app.session.can(Capability::ViewFinance));

    app.provider.set_role(app.staff_id, Some(Role::Finance));
    let snapshot = app.session.recheck().await;

    assert_eq!(snapshot.role, Some(Role::Finance));
    assert!(app.session.can(Capability::ViewFinance));
    assert!(!app.session.can(Capability::ViewOperations));
    let err = app
        .contracts
        .list(&app.actor(), None)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::PermissionDenied));
}

#[tokio::test]
async fn test_staff_creates_contract_but_cannot_terminate() {
    let app = helpers::TestApp::new().await;
    app.sign_in(helpers::STAFF_EMAIL).await;
    let staff = app.actor();

    let contract = app.contracts.create(&staff, contract_draft()).await.unwrap();
    assert!(contract.contract_no.starts_with("FFC-PLY-"));
    assert!(contract.contract_no.ends_with("-001"));

    let err = app
        .contracts
        .terminate(&staff, contract.id, Some("Released".into()))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::PermissionDenied));

    app.session.sign_out().await;
    app.sign_in(helpers::ADMIN_EMAIL).await;
    let ended = app
        .contracts
        .terminate(&app.actor(), contract.id, Some("Released".into()))
        .await
        .unwrap();
    assert_eq!(ended.status, ContractStatus::Terminated);
}

#[tokio::test]
async fn test_finance_records_and_admin_edits() {
    let app = helpers::TestApp::new().await;
    app.sign_in(helpers::FINANCE_EMAIL).await;
    let finance = app.actor();

    let date = NaiveDate::from_ymd_opt(2025, 8, 15).unwrap();
    let entry = app
        .finance
        .record(&finance, LedgerCategory::Income, LedgerDraft::new(750_000.0, date))
        .await
        .unwrap();
    app.finance
        .record(&finance, LedgerCategory::MatchExpense, LedgerDraft::new(150_000.0, date))
        .await
        .unwrap();

    let err = app
        .finance
        .edit(&finance, LedgerCategory::Income, entry.id, LedgerDraft::new(1.0, date))
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::PermissionDenied));

    let summary = app.finance.summary(&finance).await.unwrap();
    assert_eq!(summary.net_balance(), 600_000.0);

    app.session.sign_out().await;
    app.sign_in(helpers::ADMIN_EMAIL).await;
    let admin = app.actor();
    app.finance
        .edit(&admin, LedgerCategory::Income, entry.id, LedgerDraft::new(800_000.0, date))
        .await
        .unwrap();
    let summary = app.finance.summary(&admin).await.unwrap();
    assert_eq!(summary.net_balance(), 650_000.0);
}

#[tokio::test]
async fn test_member_register_payments_and_audit_trail() {
    let app = helpers::TestApp::new().await;
    app.sign_in(helpers::STAFF_EMAIL).await;
    let staff = app.actor();

    let draft = MemberDraft {
        full_name: "Aishi Manula".into(),
        id_no: Some("TZ-19950913".into()),
        date_of_birth: NaiveDate::from_ymd_opt(1995, 9, 13).unwrap(),
        phone: "+255713000111".into(),
        role: "Goalkeeper".into(),
        member_type: MemberType::Player,
        monthly_salary: 500_000.0,
        registration_fee: 100_000.0,
    };
    let member = app.members.create(&staff, draft.clone()).await.unwrap();
    let err = app.members.delete(&staff, member.id).await.unwrap_err();
    assert!(err.is(ErrorKind::PermissionDenied));
    let err = app.audit.list(&staff, 50).await.unwrap_err();
    assert!(err.is(ErrorKind::PermissionDenied));

    app.session.sign_out().await;
    app.sign_in(helpers::FINANCE_EMAIL).await;
    let finance = app.actor();
    let date = NaiveDate::from_ymd_opt(2025, 9, 30).unwrap();
    app.finance
        .record(
            &finance,
            LedgerCategory::SalaryPayment,
            LedgerDraft::new(500_000.0, date).for_member(member.id),
        )
        .await
        .unwrap();
    let history = app.members.payments(&finance, member.id).await.unwrap();
    assert_eq!(history.member.full_name, "Aishi Manula");
    assert_eq!(history.total_cost(), 500_000.0);

    app.session.sign_out().await;
    app.sign_in(helpers::ADMIN_EMAIL).await;
    let admin = app.actor();
    let mut raise = draft;
    raise.monthly_salary = 650_000.0;
    app.members.update(&admin, member.id, raise).await.unwrap();

    let entries = app.audit.list(&admin, 50).await.unwrap();
    let actions: Vec<AuditAction> = entries.iter().map(|e| e.action).collect();
    assert_eq!(actions, vec![AuditAction::Update, AuditAction::Insert]);
    assert_eq!(entries[0].summary(), "Changed: monthly_salary");
}

#[tokio::test]
async fn test_signed_out_actor_is_rejected() {
    let app = helpers::TestApp::new().await;
    let err = clubdesk_service::ActorContext::current(&app.session).unwrap_err();
    assert!(err.is(ErrorKind::NotAuthenticated));
}
