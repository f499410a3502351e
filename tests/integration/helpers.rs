//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use clubdesk_auth::SessionManager;
use clubdesk_backend::Backend;
use clubdesk_backend::memory::MemoryAuthBackend;
use clubdesk_core::config::{AuthConfig, SessionConfig};
use clubdesk_core::types::UserId;
use clubdesk_entity::session::SessionSnapshot;
use clubdesk_entity::user::Role;
use clubdesk_service::{
    ActorContext, AuditService, ContractService, FinanceService, MemberService, UserAdminService,
};

/// Password of every seeded account.
pub const PASSWORD: &str = "secret123";

pub const ADMIN_EMAIL: &str = "admin@fahari.fc";
pub const STAFF_EMAIL: &str = "staff@fahari.fc";
pub const FINANCE_EMAIL: &str = "finance@fahari.fc";
pub const BLOCKED_EMAIL: &str = "former@fahari.fc";
pub const COACH_EMAIL: &str = "coach@fahari.fc";

/// Test application context
pub struct TestApp {
    /// In-memory provider, kept for call counts and direct manipulation
    pub provider: MemoryAuthBackend,
    /// The session under test
    pub session: SessionManager,
    pub users: UserAdminService,
    pub members: MemberService,
    pub contracts: ContractService,
    pub finance: FinanceService,
    pub audit: AuditService,
    pub admin_id: UserId,
    pub staff_id: UserId,
    pub finance_id: UserId,
    pub blocked_id: UserId,
    pub coach_id: UserId,
}

impl TestApp {
    /// Seeded backend with an initialized, signed-out session.
    pub async fn new() -> Self {
        let app = Self::uninitialized();
        let snapshot = app.session.initialize().await;
        assert!(!snapshot.is_authenticated());
        app
    }

    /// Seeded backend; `initialize` has not run yet.
    pub fn uninitialized() -> Self {
        let provider = MemoryAuthBackend::new();
        let admin_id = provider.add_user(ADMIN_EMAIL, PASSWORD, Some("Amani Juma"), Some(Role::Admin));
        let staff_id = provider.add_user(STAFF_EMAIL, PASSWORD, Some("Baraka Mwita"), Some(Role::Staff));
        let finance_id =
            provider.add_user(FINANCE_EMAIL, PASSWORD, Some("Neema Said"), Some(Role::Finance));
        let blocked_id = provider.add_user(BLOCKED_EMAIL, PASSWORD, None, Some(Role::Staff));
        provider.set_blocked(blocked_id, Some("Contract ended"));
        // A profile row whose role string was not recognized is stored as no role.
        let coach_id = provider.add_user(COACH_EMAIL, PASSWORD, None, None);

        let stores = Backend::memory(provider.clone());
        let session = new_session(&stores);
        Self {
            users: UserAdminService::new(stores.profiles.clone(), session.password_policy().clone()),
            members: MemberService::new(stores.members.clone(), stores.ledger.clone()),
            contracts: ContractService::new(stores.contracts.clone()),
            finance: FinanceService::new(stores.ledger.clone()),
            audit: AuditService::new(stores.audit.clone()),
            provider,
            session,
            admin_id,
            staff_id,
            finance_id,
            blocked_id,
            coach_id,
        }
    }

    /// Sign in through the session manager.
    pub async fn sign_in(&self, email: &str) -> SessionSnapshot {
        self.session
            .sign_in(email, PASSWORD)
            .await
            .expect("sign-in failed")
    }

    /// The actor for the current session.
    pub fn actor(&self) -> ActorContext {
        ActorContext::current(&self.session).expect("not signed in")
    }
}

fn new_session(stores: &Backend) -> SessionManager {
    SessionManager::new(
        stores.credentials.clone(),
        stores.profiles.clone(),
        &AuthConfig::default(),
        &SessionConfig::default(),
    )
}

/// A second session manager sharing the same provider, like another window.
pub fn second_session(provider: &MemoryAuthBackend) -> SessionManager {
    let provider = Arc::new(provider.clone());
    SessionManager::new(
        provider.clone(),
        provider,
        &AuthConfig::default(),
        &SessionConfig::default(),
    )
}
