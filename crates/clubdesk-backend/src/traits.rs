//! Store traits implemented by every backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use clubdesk_core::events::AuthEvent;
use clubdesk_core::result::AppResult;
use clubdesk_core::types::{ContractId, Identity, LedgerEntryId, MemberId, UserId};
use clubdesk_entity::audit::AuditLogEntry;
use clubdesk_entity::contract::{Contract, ContractDraft, ContractStatusChange, ContractType};
use clubdesk_entity::finance::{LedgerCategory, LedgerDraft, LedgerEntry};
use clubdesk_entity::member::{Member, MemberDraft, MemberType};
use clubdesk_entity::user::{CreateUser, UpdateUser, UserProfile};

/// The hosted authentication provider.
///
/// Owns identities and the provider session. Credential failures come
/// back as `InvalidCredentials` carrying the provider's message.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug + 'static {
    /// The identity of the live provider session, if any.
    async fn current_session(&self) -> AppResult<Option<Identity>>;

    /// Subscribe to auth-state changes, including ones made elsewhere.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;

    /// Establish a session with email and password.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Identity>;

    /// End the provider session.
    async fn sign_out(&self) -> AppResult<()>;

    /// Change the password of the signed-in identity.
    async fn update_password(&self, new_password: &str) -> AppResult<()>;
}

/// Profile rows and the privileged account operations.
///
/// The admin operations are enforced server-side as well; callers still
/// check capabilities first.
#[async_trait]
pub trait ProfileStore: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch the profile of one identity. `None` when no row exists.
    async fn get_profile(&self, user_id: UserId) -> AppResult<Option<UserProfile>>;

    /// All profiles, newest first.
    async fn list_profiles(&self) -> AppResult<Vec<UserProfile>>;

    /// Block or unblock an account.
    async fn set_active(
        &self,
        user_id: UserId,
        is_active: bool,
        reason: Option<&str>,
    ) -> AppResult<()>;

    /// Provision an identity and its profile. Returns the new id.
    async fn create_user(&self, user: &CreateUser) -> AppResult<UserId>;

    /// Update email, name, role, and active flag.
    async fn update_user(&self, user_id: UserId, update: &UpdateUser) -> AppResult<()>;

    /// Set a new password for another account.
    async fn reset_password(&self, user_id: UserId, new_password: &str) -> AppResult<()>;
}

/// Players and staff.
#[async_trait]
pub trait MemberStore: Send + Sync + std::fmt::Debug + 'static {
    /// Members of one type, ordered by name.
    async fn list(&self, member_type: MemberType) -> AppResult<Vec<Member>>;

    /// Fetch one member. `None` when no row exists.
    async fn get(&self, id: MemberId) -> AppResult<Option<Member>>;

    /// Insert a member.
    async fn insert(&self, draft: &MemberDraft) -> AppResult<Member>;

    /// Replace a member's fields.
    async fn update(&self, id: MemberId, draft: &MemberDraft) -> AppResult<Member>;

    /// Remove a member.
    async fn delete(&self, id: MemberId) -> AppResult<()>;
}

/// Member contracts.
#[async_trait]
pub trait ContractStore: Send + Sync + std::fmt::Debug + 'static {
    /// Contracts, newest first, optionally of one type.
    async fn list(&self, contract_type: Option<ContractType>) -> AppResult<Vec<Contract>>;

    /// Number of contracts of a type, used for numbering.
    async fn count_by_type(&self, contract_type: ContractType) -> AppResult<u64>;

    /// Insert a contract under the given number. A duplicate number is a `Conflict`.
    async fn insert(
        &self,
        contract_no: &str,
        draft: &ContractDraft,
        terminated_at: Option<DateTime<Utc>>,
    ) -> AppResult<Contract>;

    /// Replace the editable fields of a contract.
    async fn update(
        &self,
        id: ContractId,
        draft: &ContractDraft,
        terminated_at: Option<DateTime<Utc>>,
    ) -> AppResult<Contract>;

    /// Apply an activate or terminate transition.
    async fn set_status(&self, id: ContractId, change: &ContractStatusChange)
    -> AppResult<Contract>;
}

/// Payment, expense, and income ledgers.
#[async_trait]
pub trait LedgerStore: Send + Sync + std::fmt::Debug + 'static {
    /// Entries of one category, newest first.
    async fn list(&self, category: LedgerCategory) -> AppResult<Vec<LedgerEntry>>;

    /// Entries of one category paid to a member, newest first.
    async fn list_for_member(
        &self,
        category: LedgerCategory,
        member_id: MemberId,
    ) -> AppResult<Vec<LedgerEntry>>;

    /// Record a new entry.
    async fn insert(&self, category: LedgerCategory, draft: &LedgerDraft)
    -> AppResult<LedgerEntry>;

    /// Replace an entry's fields.
    async fn update(
        &self,
        category: LedgerCategory,
        id: LedgerEntryId,
        draft: &LedgerDraft,
    ) -> AppResult<LedgerEntry>;

    /// Remove an entry.
    async fn delete(&self, category: LedgerCategory, id: LedgerEntryId) -> AppResult<()>;
}

/// The audit trail written by the backend on every table change.
#[async_trait]
pub trait AuditLogStore: Send + Sync + std::fmt::Debug + 'static {
    /// The most recent `limit` entries, newest first.
    async fn list(&self, limit: usize) -> AppResult<Vec<AuditLogEntry>>;
}
