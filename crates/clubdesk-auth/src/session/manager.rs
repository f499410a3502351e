//! Session lifecycle manager: initialize, sign-in, sign-out, profile
//! resolution, idle expiry, and provider push events.
//!
//! All transitions run under one async mutex, so concurrent triggers
//! (an idle expiry racing a manual sign-out, a provider event racing a
//! sign-in) are serialized and a second sign-out finds nothing to end.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use clubdesk_backend::traits::{CredentialStore, ProfileStore};
use clubdesk_core::config::{AuthConfig, SessionConfig};
use clubdesk_core::error::AppError;
use clubdesk_core::events::AuthEvent;
use clubdesk_core::result::AppResult;
use clubdesk_core::types::Identity;
use clubdesk_entity::session::{ActivitySignal, SessionSnapshot};
use clubdesk_entity::user::UserProfile;

use crate::password::PasswordValidator;
use crate::rbac::{Capability, RbacEnforcer};

use super::listener::{self, ListenerSignal};
use super::watchdog::IdleWatchdog;

/// Inactivity window after which an authenticated session is signed out.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

const ACCOUNT_BLOCKED: &str = "Account is blocked. Contact an admin.";

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndReason {
    /// Explicit sign-out request.
    SignOut,
    /// No activity for [`IDLE_TIMEOUT`].
    IdleTimeout,
    /// The profile turned out to be blocked.
    Blocked,
    /// The provider reported there is no session any more.
    ProviderSignedOut,
    /// The provider reported a different identity signed in.
    Replaced,
    /// Process teardown.
    Shutdown,
}

impl EndReason {
    fn as_str(&self) -> &'static str {
        match self {
            Self::SignOut => "sign_out",
            Self::IdleTimeout => "idle_timeout",
            Self::Blocked => "blocked",
            Self::ProviderSignedOut => "provider_signed_out",
            Self::Replaced => "replaced",
            Self::Shutdown => "shutdown",
        }
    }

    /// Whether the provider session must be invalidated too.
    fn signs_out_provider(&self) -> bool {
        matches!(self, Self::SignOut | Self::IdleTimeout | Self::Blocked)
    }
}

/// The one live session.
struct ActiveSession {
    identity: Identity,
    profile: Option<UserProfile>,
    last_activity: Instant,
    watchdog: IdleWatchdog,
}

/// Mutable session state guarded by the transition lock.
///
/// `epoch` changes whenever a session starts or ends; an idle timer only
/// acts while the epoch it was armed with is still current.
#[derive(Default)]
struct SessionSlot {
    epoch: u64,
    active: Option<ActiveSession>,
}

struct SessionInner {
    /// Credential provider.
    credentials: Arc<dyn CredentialStore>,
    /// Profile table.
    profiles: Arc<dyn ProfileStore>,
    /// Local password policy.
    validator: PasswordValidator,
    /// Capability decisions.
    rbac: RbacEnforcer,
    /// Background profile re-check interval, if enabled.
    recheck_interval: Option<Duration>,
    /// Published snapshot.
    state: watch::Sender<SessionSnapshot>,
    /// Transition lock and session state.
    slot: Mutex<SessionSlot>,
    /// Listener and re-check tasks.
    tasks: Mutex<Vec<JoinHandle<()>>>,
    started: AtomicBool,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        for handle in self.tasks.get_mut().drain(..) {
            handle.abort();
        }
    }
}

/// Owns "who is signed in, with what role, and whether that session is
/// still valid".
///
/// Cheap to clone; clones share one session. Views read
/// [`snapshot`](Self::snapshot) or watch [`subscribe`](Self::subscribe).
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.inner.state.borrow();
        f.debug_struct("SessionManager")
            .field("phase", &snapshot.phase)
            .field("role", &snapshot.role)
            .field("recheck_interval", &self.inner.recheck_interval)
            .finish()
    }
}

impl SessionManager {
    /// Creates a session manager in the `Initializing` phase.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        profiles: Arc<dyn ProfileStore>,
        auth_config: &AuthConfig,
        session_config: &SessionConfig,
    ) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::initializing());
        let recheck_interval = (session_config.profile_recheck_seconds > 0)
            .then(|| Duration::from_secs(session_config.profile_recheck_seconds));

        Self {
            inner: Arc::new(SessionInner {
                credentials,
                profiles,
                validator: PasswordValidator::new(auth_config),
                rbac: RbacEnforcer::new(),
                recheck_interval,
                state,
                slot: Mutex::new(SessionSlot::default()),
                tasks: Mutex::new(Vec::new()),
                started: AtomicBool::new(false),
            }),
        }
    }

    fn upgrade(weak: &Weak<SessionInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Starts the event listener and looks for an existing provider session.
    ///
    /// Never fails: an unreachable provider leaves the manager `Anonymous`.
    pub async fn initialize(&self) -> SessionSnapshot {
        self.start_background().await;

        let mut slot = self.inner.slot.lock().await;
        if slot.active.is_some() {
            return self.snapshot();
        }
        self.publish(SessionSnapshot::initializing());

        match self.inner.credentials.current_session().await {
            Ok(Some(identity)) => {
                debug!(user_id = %identity.id, "Resuming provider session");
                if let Err(e) = self.open_locked(&mut slot, identity).await {
                    info!(error = %e, "Existing provider session not resumed");
                }
            }
            Ok(None) => {
                debug!("No provider session at startup");
                self.publish(SessionSnapshot::anonymous());
            }
            Err(e) => {
                warn!(error = %e, "Credential provider unavailable at startup, continuing signed out");
                self.publish(SessionSnapshot::anonymous());
            }
        }

        self.snapshot()
    }

    /// Signs in with email and password.
    ///
    /// A blocked profile ends the provider session again and fails with
    /// `AccountBlocked`. Credential errors are returned as the provider
    /// reported them.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<SessionSnapshot> {
        let mut slot = self.inner.slot.lock().await;
        if slot.active.is_some() {
            return Err(AppError::conflict("Already signed in. Sign out first."));
        }

        let identity = match self
            .inner
            .credentials
            .sign_in_with_password(email, password)
            .await
        {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error_kind = %e.kind, "Sign-in rejected");
                self.publish(SessionSnapshot::anonymous());
                return Err(e);
            }
        };

        info!(user_id = %identity.id, "Credentials accepted");
        self.open_locked(&mut slot, identity).await
    }

    /// Ends the session. Always reaches `Anonymous`; a provider failure is
    /// only logged. A no-op when already signed out.
    pub async fn sign_out(&self) {
        let mut slot = self.inner.slot.lock().await;
        if !self.end_locked(&mut slot, EndReason::SignOut).await {
            debug!("Sign-out requested while signed out");
        }
    }

    /// Changes the signed-in user's password.
    ///
    /// Local validation failures return `WeakPassword` without contacting
    /// the provider; provider errors are returned unchanged.
    pub async fn change_password(&self, new_password: &str, confirmation: &str) -> AppResult<()> {
        let identity = self
            .inner
            .slot
            .lock()
            .await
            .active
            .as_ref()
            .map(|a| a.identity.clone())
            .ok_or_else(|| AppError::not_authenticated("Sign in to change your password"))?;

        self.inner
            .validator
            .validate_with_confirmation(new_password, confirmation)?;
        self.inner.credentials.update_password(new_password).await?;

        info!(user_id = %identity.id, "Password changed");
        Ok(())
    }

    /// Resets the idle timer. Ignored while not signed in.
    pub async fn record_activity(&self, signal: ActivitySignal) {
        let mut slot = self.inner.slot.lock().await;
        if let Some(active) = slot.active.as_mut() {
            active.last_activity = Instant::now();
            active.watchdog.touch();
            trace!(signal = %signal, "Activity recorded");
        }
    }

    /// Time since the last recorded activity, while signed in.
    pub async fn idle_for(&self) -> Option<Duration> {
        self.inner
            .slot
            .lock()
            .await
            .active
            .as_ref()
            .map(|a| a.last_activity.elapsed())
    }

    /// Re-reads the profile of the signed-in identity so a role change or
    /// block takes effect now.
    pub async fn recheck(&self) -> SessionSnapshot {
        let mut slot = self.inner.slot.lock().await;
        if let Some(identity) = slot.active.as_ref().map(|a| a.identity.clone()) {
            self.refresh_locked(&mut slot, identity).await;
        }
        self.snapshot()
    }

    /// Stops background tasks and drops the local session without calling
    /// the provider.
    pub async fn shutdown(&self) {
        for handle in self.inner.tasks.lock().await.drain(..) {
            handle.abort();
        }
        let mut slot = self.inner.slot.lock().await;
        self.end_locked(&mut slot, EndReason::Shutdown).await;
    }

    /// The current read-only snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Watch snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    /// Whether the current role holds `capability`. Re-evaluated on every call.
    pub fn can(&self, capability: Capability) -> bool {
        let snapshot = self.inner.state.borrow();
        snapshot.is_authenticated() && self.inner.rbac.decide(snapshot.role, capability)
    }

    /// Checks `capability` for the current session.
    ///
    /// Returns the snapshot the decision was made on, `NotAuthenticated`
    /// when signed out, or `PermissionDenied`.
    pub fn require(&self, capability: Capability) -> AppResult<SessionSnapshot> {
        let snapshot = self.snapshot();
        if !snapshot.is_authenticated() {
            return Err(AppError::not_authenticated("Sign in to continue"));
        }
        self.inner.rbac.require(snapshot.role, capability)?;
        Ok(snapshot)
    }

    /// The local password policy.
    pub fn password_policy(&self) -> &PasswordValidator {
        &self.inner.validator
    }

    async fn start_background(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut tasks = self.inner.tasks.lock().await;

        let weak = Arc::downgrade(&self.inner);
        tasks.push(listener::spawn_event_listener(
            self.inner.credentials.subscribe(),
            move |signal| {
                let weak = weak.clone();
                async move {
                    let Some(manager) = Self::upgrade(&weak) else {
                        return false;
                    };
                    manager.handle_signal(signal).await;
                    true
                }
            },
        ));

        if let Some(every) = self.inner.recheck_interval {
            info!(every_secs = every.as_secs(), "Periodic profile re-check enabled");
            let weak = Arc::downgrade(&self.inner);
            tasks.push(listener::spawn_periodic(every, move || {
                let weak = weak.clone();
                async move {
                    let Some(manager) = Self::upgrade(&weak) else {
                        return false;
                    };
                    manager.recheck().await;
                    true
                }
            }));
        }
    }

    async fn handle_signal(&self, signal: ListenerSignal) {
        match signal {
            ListenerSignal::Event(event) => self.handle_event(event).await,
            ListenerSignal::Lagged(_) => self.reconcile().await,
        }
    }

    async fn handle_event(&self, event: AuthEvent) {
        let mut slot = self.inner.slot.lock().await;
        match event {
            AuthEvent::SignedOut => {
                let Some(id) = slot.active.as_ref().map(|a| a.identity.id) else {
                    return;
                };
                // Our own earlier sign-out may be delivered after a new sign-in.
                match self.inner.credentials.current_session().await {
                    Ok(Some(current)) if current.id == id => {
                        debug!(user_id = %id, "Stale sign-out event ignored");
                    }
                    Ok(_) => {
                        self.end_locked(&mut slot, EndReason::ProviderSignedOut).await;
                    }
                    Err(e) => {
                        warn!(error = %e, "Could not confirm provider sign-out, ending session");
                        self.end_locked(&mut slot, EndReason::ProviderSignedOut).await;
                    }
                }
            }
            AuthEvent::TokenRefreshed { identity } | AuthEvent::UserUpdated { identity } => {
                let current = slot.active.as_ref().map(|a| a.identity.id);
                if current == Some(identity.id) {
                    self.refresh_locked(&mut slot, identity).await;
                } else {
                    debug!(user_id = %identity.id, "Ignoring provider update for another session");
                }
            }
            AuthEvent::SignedIn { identity } => {
                if slot
                    .active
                    .as_ref()
                    .is_some_and(|a| a.identity.id == identity.id)
                {
                    return;
                }
                self.confirm_locked(&mut slot, identity).await;
            }
        }
    }

    /// Resynchronizes with the provider after missed events.
    async fn reconcile(&self) {
        let mut slot = self.inner.slot.lock().await;
        let current = match self.inner.credentials.current_session().await {
            Ok(current) => current,
            Err(e) => {
                warn!(error = %e, "Could not reconcile session after missed events");
                return;
            }
        };

        match (current, slot.active.as_ref().map(|a| a.identity.id)) {
            (Some(identity), Some(id)) if identity.id == id => {
                self.refresh_locked(&mut slot, identity).await;
            }
            (Some(identity), active) => {
                if active.is_some() {
                    self.end_locked(&mut slot, EndReason::Replaced).await;
                }
                if let Err(e) = self.open_locked(&mut slot, identity).await {
                    info!(error = %e, "Provider session not resumed");
                }
            }
            (None, _) => {
                self.end_locked(&mut slot, EndReason::ProviderSignedOut).await;
            }
        }
    }

    /// Acts on a sign-in announced by the provider only if the provider
    /// still reports that session. A different live session is replaced.
    async fn confirm_locked(&self, slot: &mut SessionSlot, announced: Identity) {
        match self.inner.credentials.current_session().await {
            Ok(Some(current)) if current.id == announced.id => {
                self.end_locked(slot, EndReason::Replaced).await;
                if let Err(e) = self.open_locked(slot, current).await {
                    info!(error = %e, "Announced session not resumed");
                }
            }
            Ok(_) => debug!(user_id = %announced.id, "Stale sign-in event ignored"),
            Err(e) => warn!(error = %e, "Could not confirm announced sign-in"),
        }
    }

    /// ResolvingProfile for a new session: blocked ends it, anything else
    /// becomes Authenticated.
    async fn open_locked(
        &self,
        slot: &mut SessionSlot,
        identity: Identity,
    ) -> AppResult<SessionSnapshot> {
        self.publish(SessionSnapshot::resolving(identity.clone()));
        let profile = self.load_profile(&identity).await;

        if profile.as_ref().is_some_and(|p| !p.is_active) {
            warn!(user_id = %identity.id, "Account is blocked, ending provider session");
            self.provider_sign_out(&identity, EndReason::Blocked).await;
            self.publish(SessionSnapshot::anonymous());
            return Err(AppError::account_blocked(ACCOUNT_BLOCKED));
        }

        Ok(self.establish_locked(slot, identity, profile))
    }

    fn establish_locked(
        &self,
        slot: &mut SessionSlot,
        identity: Identity,
        profile: Option<UserProfile>,
    ) -> SessionSnapshot {
        slot.epoch += 1;
        let epoch = slot.epoch;
        let watchdog = self.arm_watchdog(epoch, IDLE_TIMEOUT);

        let snapshot = SessionSnapshot::authenticated(identity.clone(), profile.as_ref());
        info!(user_id = %identity.id, role = ?snapshot.role, epoch, "Session established");

        slot.active = Some(ActiveSession {
            identity,
            profile,
            last_activity: Instant::now(),
            watchdog,
        });
        self.publish(snapshot.clone());
        snapshot
    }

    /// ResolvingProfile for the live session, keeping its idle timer.
    async fn refresh_locked(&self, slot: &mut SessionSlot, identity: Identity) {
        self.publish(SessionSnapshot::resolving(identity.clone()));
        let profile = self.load_profile(&identity).await;

        if profile.as_ref().is_some_and(|p| !p.is_active) {
            warn!(user_id = %identity.id, "Account was blocked during the session");
            self.end_locked(slot, EndReason::Blocked).await;
            return;
        }

        if let Some(active) = slot.active.as_mut() {
            let snapshot = SessionSnapshot::authenticated(identity.clone(), profile.as_ref());
            debug!(user_id = %identity.id, role = ?snapshot.role, "Profile re-resolved");
            active.identity = identity;
            active.profile = profile;
            self.publish(snapshot);
        }
    }

    /// Returns `false` when there was no session to end.
    async fn end_locked(&self, slot: &mut SessionSlot, reason: EndReason) -> bool {
        let Some(active) = slot.active.take() else {
            return false;
        };
        slot.epoch += 1;
        active.watchdog.disarm();
        self.publish(SessionSnapshot::anonymous());
        info!(user_id = %active.identity.id, reason = reason.as_str(), "Session ended");

        if reason.signs_out_provider() {
            self.provider_sign_out(&active.identity, reason).await;
        }
        true
    }

    fn arm_watchdog(&self, epoch: u64, timeout: Duration) -> IdleWatchdog {
        let weak = Arc::downgrade(&self.inner);
        IdleWatchdog::arm(timeout, move || async move {
            if let Some(manager) = Self::upgrade(&weak) {
                manager.expire(epoch).await;
            }
        })
    }

    /// Ends the session only when the full window has passed since the
    /// last activity; activity that won the race with the timer re-arms it.
    async fn expire(&self, epoch: u64) {
        let mut slot = self.inner.slot.lock().await;
        let idle = match slot.active.as_ref() {
            Some(active) if slot.epoch == epoch => active.last_activity.elapsed(),
            _ => {
                debug!(epoch, current = slot.epoch, "Stale idle timer ignored");
                return;
            }
        };
        if idle < IDLE_TIMEOUT {
            let remaining = IDLE_TIMEOUT - idle;
            debug!(
                epoch,
                remaining_secs = remaining.as_secs(),
                "Activity after the timer fired, re-arming"
            );
            let watchdog = self.arm_watchdog(epoch, remaining);
            if let Some(active) = slot.active.as_mut() {
                active.watchdog = watchdog;
            }
            return;
        }
        info!(idle_secs = IDLE_TIMEOUT.as_secs(), "Idle timeout reached");
        self.end_locked(&mut slot, EndReason::IdleTimeout).await;
    }

    async fn load_profile(&self, identity: &Identity) -> Option<UserProfile> {
        match self.inner.profiles.get_profile(identity.id).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => {
                warn!(user_id = %identity.id, "No profile row, treating as no role");
                None
            }
            Err(e) => {
                warn!(user_id = %identity.id, error = %e, "Profile lookup failed, treating as no role");
                None
            }
        }
    }

    async fn provider_sign_out(&self, identity: &Identity, reason: EndReason) {
        if let Err(e) = self.inner.credentials.sign_out().await {
            warn!(
                user_id = %identity.id,
                reason = reason.as_str(),
                error = %e,
                "Provider sign-out failed, local session cleared anyway"
            );
        }
    }

    fn publish(&self, snapshot: SessionSnapshot) {
        self.inner.state.send_replace(snapshot);
    }
}
