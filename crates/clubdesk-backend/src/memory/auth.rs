//! In-memory credential provider and profile table.
//!
//! Behaves like the hosted provider closely enough for the session
//! manager: it pushes [`AuthEvent`]s, fails with the same error kinds, and
//! counts provider calls so tests can assert that none were made.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, warn};

use clubdesk_core::AppError;
use clubdesk_core::config::backend::SeedUser;
use clubdesk_core::events::AuthEvent;
use clubdesk_core::result::AppResult;
use clubdesk_core::types::{Identity, UserId};
use clubdesk_entity::user::{CreateUser, Role, UpdateUser, UserProfile};

use crate::traits::{CredentialStore, ProfileStore};

const EVENT_CAPACITY: usize = 64;

/// A stored login.
#[derive(Debug, Clone)]
struct Account {
    id: UserId,
    email: String,
    password: String,
    full_name: Option<String>,
}

impl Account {
    fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
        }
    }
}

/// Snapshot of the provider call counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// `sign_in_with_password` calls.
    pub sign_in: u64,
    /// `sign_out` calls.
    pub sign_out: u64,
    /// `update_password` calls.
    pub update_password: u64,
    /// `get_profile` calls.
    pub profile_reads: u64,
    /// Admin mutations (`set_active`, `create_user`, `update_user`, `reset_password`).
    pub admin_writes: u64,
}

#[derive(Debug, Default)]
struct Counters {
    sign_in: AtomicU64,
    sign_out: AtomicU64,
    update_password: AtomicU64,
    profile_reads: AtomicU64,
    admin_writes: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::SeqCst);
}

/// In-memory [`CredentialStore`] and [`ProfileStore`].
#[derive(Debug, Clone)]
pub struct MemoryAuthBackend {
    /// Logins keyed by lowercase email.
    accounts: Arc<DashMap<String, Account>>,
    /// Profile rows keyed by identity id.
    profiles: Arc<DashMap<UserId, UserProfile>>,
    /// The live provider session.
    current: Arc<RwLock<Option<Identity>>>,
    /// Auth-state change broadcaster.
    events: broadcast::Sender<AuthEvent>,
    counters: Arc<Counters>,
    /// Every call fails with `BackendUnavailable` while set.
    offline: Arc<AtomicBool>,
    /// The next `sign_out` fails once.
    fail_next_sign_out: Arc<AtomicBool>,
    /// Profile reads fail while set.
    fail_profile_reads: Arc<AtomicBool>,
}

impl Default for MemoryAuthBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuthBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            accounts: Arc::new(DashMap::new()),
            profiles: Arc::new(DashMap::new()),
            current: Arc::new(RwLock::new(None)),
            events,
            counters: Arc::new(Counters::default()),
            offline: Arc::new(AtomicBool::new(false)),
            fail_next_sign_out: Arc::new(AtomicBool::new(false)),
            fail_profile_reads: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a backend holding the configured seed accounts.
    ///
    /// Role names that are not recognized are stored as "no role".
    pub fn seeded(seeds: &[SeedUser]) -> Self {
        let backend = Self::new();
        for seed in seeds {
            let role = seed.role.as_deref().and_then(|r| {
                let role = Role::from_stored(r);
                if role.is_none() {
                    warn!(email = %seed.email, role = %r, "Unrecognized seed role, storing no role");
                }
                role
            });
            let id = backend.add_user(&seed.email, &seed.password, seed.full_name.as_deref(), role);
            if !seed.is_active {
                backend.set_blocked(id, Some("Seeded as blocked"));
            }
        }
        backend
    }

    /// Add an active account with a profile. Returns the new id.
    pub fn add_user(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
        role: Option<Role>,
    ) -> UserId {
        let id = UserId::new();
        self.accounts.insert(
            email.to_lowercase(),
            Account {
                id,
                email: email.to_string(),
                password: password.to_string(),
                full_name: full_name.map(str::to_string),
            },
        );

        let mut profile = UserProfile::new(id, role);
        profile.email = Some(email.to_string());
        profile.full_name = full_name.map(str::to_string);
        profile.created_at = Some(Utc::now());
        self.profiles.insert(id, profile);
        id
    }

    /// Change a stored role directly, bypassing admin checks.
    pub fn set_role(&self, user_id: UserId, role: Option<Role>) {
        if let Some(mut profile) = self.profiles.get_mut(&user_id) {
            profile.role = role;
        }
    }

    /// Block an account directly, bypassing admin checks.
    pub fn set_blocked(&self, user_id: UserId, reason: Option<&str>) {
        if let Some(mut profile) = self.profiles.get_mut(&user_id) {
            profile.is_active = false;
            profile.blocked_at = Some(Utc::now());
            profile.blocked_reason = reason.map(str::to_string);
        }
    }

    /// Drop the profile row of an identity, leaving the login in place.
    pub fn remove_profile(&self, user_id: UserId) {
        self.profiles.remove(&user_id);
    }

    /// Peek at a stored profile without counting a read.
    pub fn profile(&self, user_id: UserId) -> Option<UserProfile> {
        self.profiles.get(&user_id).map(|p| p.clone())
    }

    /// Whether `password` is the stored password of `email`.
    pub fn password_matches(&self, email: &str, password: &str) -> bool {
        self.accounts
            .get(&email.to_lowercase())
            .is_some_and(|a| a.password == password)
    }

    /// End the provider session from outside, as an admin revoke would.
    pub async fn revoke_session(&self) {
        *self.current.write().await = None;
        let _ = self.events.send(AuthEvent::SignedOut);
    }

    /// Push an arbitrary event to subscribers.
    pub fn emit(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }

    /// Make every call fail with `BackendUnavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make the next `sign_out` call fail.
    pub fn fail_next_sign_out(&self) {
        self.fail_next_sign_out.store(true, Ordering::SeqCst);
    }

    /// Make profile reads fail while set.
    pub fn fail_profile_reads(&self, fail: bool) {
        self.fail_profile_reads.store(fail, Ordering::SeqCst);
    }

    /// Current provider call counts.
    pub fn calls(&self) -> CallCounts {
        CallCounts {
            sign_in: self.counters.sign_in.load(Ordering::SeqCst),
            sign_out: self.counters.sign_out.load(Ordering::SeqCst),
            update_password: self.counters.update_password.load(Ordering::SeqCst),
            profile_reads: self.counters.profile_reads.load(Ordering::SeqCst),
            admin_writes: self.counters.admin_writes.load(Ordering::SeqCst),
        }
    }

    fn ensure_online(&self) -> AppResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::backend_unavailable("Backend is unreachable"));
        }
        Ok(())
    }

    fn account_by_id(&self, user_id: UserId) -> AppResult<Account> {
        self.accounts
            .iter()
            .find(|a| a.id == user_id)
            .map(|a| a.clone())
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }
}

#[async_trait]
impl CredentialStore for MemoryAuthBackend {
    async fn current_session(&self) -> AppResult<Option<Identity>> {
        self.ensure_online()?;
        Ok(self.current.read().await.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Identity> {
        bump(&self.counters.sign_in);
        self.ensure_online()?;

        let identity = match self.accounts.get(&email.trim().to_lowercase()) {
            Some(account) if account.password == password => account.identity(),
            _ => return Err(AppError::invalid_credentials("Invalid login credentials")),
        };

        *self.current.write().await = Some(identity.clone());
        debug!(user_id = %identity.id, "Memory provider session established");
        let _ = self.events.send(AuthEvent::SignedIn {
            identity: identity.clone(),
        });
        Ok(identity)
    }

    async fn sign_out(&self) -> AppResult<()> {
        bump(&self.counters.sign_out);
        self.ensure_online()?;
        if self.fail_next_sign_out.swap(false, Ordering::SeqCst) {
            return Err(AppError::backend_unavailable("Sign-out request failed"));
        }

        *self.current.write().await = None;
        let _ = self.events.send(AuthEvent::SignedOut);
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> AppResult<()> {
        bump(&self.counters.update_password);
        self.ensure_online()?;

        let identity = self
            .current
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::not_authenticated("Auth session missing"))?;

        let mut account = self
            .accounts
            .get_mut(&identity.email.to_lowercase())
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if account.password == new_password {
            return Err(AppError::validation(
                "New password should be different from the old password.",
            ));
        }
        account.password = new_password.to_string();
        drop(account);

        let _ = self.events.send(AuthEvent::UserUpdated { identity });
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryAuthBackend {
    async fn get_profile(&self, user_id: UserId) -> AppResult<Option<UserProfile>> {
        bump(&self.counters.profile_reads);
        self.ensure_online()?;
        if self.fail_profile_reads.load(Ordering::SeqCst) {
            return Err(AppError::backend_unavailable("Profile query failed"));
        }
        Ok(self.profiles.get(&user_id).map(|p| p.clone()))
    }

    async fn list_profiles(&self) -> AppResult<Vec<UserProfile>> {
        self.ensure_online()?;
        let mut profiles: Vec<UserProfile> = self.profiles.iter().map(|p| p.clone()).collect();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }

    async fn set_active(
        &self,
        user_id: UserId,
        is_active: bool,
        reason: Option<&str>,
    ) -> AppResult<()> {
        bump(&self.counters.admin_writes);
        self.ensure_online()?;

        let mut profile = self
            .profiles
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(format!("Profile {user_id} not found")))?;
        profile.is_active = is_active;
        if is_active {
            profile.blocked_at = None;
            profile.blocked_reason = None;
        } else {
            profile.blocked_at = Some(Utc::now());
            profile.blocked_reason = reason.map(str::to_string);
        }
        Ok(())
    }

    async fn create_user(&self, user: &CreateUser) -> AppResult<UserId> {
        bump(&self.counters.admin_writes);
        self.ensure_online()?;

        if self.accounts.contains_key(&user.email.to_lowercase()) {
            return Err(AppError::conflict(format!(
                "A user with email '{}' already exists",
                user.email
            )));
        }
        Ok(self.add_user(
            &user.email,
            &user.password,
            Some(&user.full_name),
            Some(user.role),
        ))
    }

    async fn update_user(&self, user_id: UserId, update: &UpdateUser) -> AppResult<()> {
        bump(&self.counters.admin_writes);
        self.ensure_online()?;

        let mut account = self.account_by_id(user_id)?;
        let new_key = update.email.to_lowercase();
        if new_key != account.email.to_lowercase() && self.accounts.contains_key(&new_key) {
            return Err(AppError::conflict(format!(
                "A user with email '{}' already exists",
                update.email
            )));
        }

        self.accounts.remove(&account.email.to_lowercase());
        account.email = update.email.clone();
        account.full_name = Some(update.full_name.clone());
        self.accounts.insert(new_key, account);

        let mut profile = self
            .profiles
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found(format!("Profile {user_id} not found")))?;
        profile.email = Some(update.email.clone());
        profile.full_name = Some(update.full_name.clone());
        profile.role = Some(update.role);
        if profile.is_active != update.is_active {
            profile.is_active = update.is_active;
            profile.blocked_at = (!update.is_active).then(Utc::now);
            if update.is_active {
                profile.blocked_reason = None;
            }
        }
        Ok(())
    }

    async fn reset_password(&self, user_id: UserId, new_password: &str) -> AppResult<()> {
        bump(&self.counters.admin_writes);
        self.ensure_online()?;

        let account = self.account_by_id(user_id)?;
        if let Some(mut stored) = self.accounts.get_mut(&account.email.to_lowercase()) {
            stored.password = new_password.to_string();
        }
        Ok(())
    }
}
