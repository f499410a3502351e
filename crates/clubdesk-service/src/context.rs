//! Actor context carrying the signed-in identity and its current role.

use chrono::{DateTime, Utc};
use serde::Serialize;

use clubdesk_auth::SessionManager;
use clubdesk_core::AppError;
use clubdesk_core::result::AppResult;
use clubdesk_core::types::UserId;
use clubdesk_entity::session::SessionSnapshot;
use clubdesk_entity::user::Role;

/// Who is acting, captured from the session right before an action.
///
/// Built fresh for every action so a role change or block that the
/// session has picked up applies to the very next call.
#[derive(Debug, Clone, Serialize)]
pub struct ActorContext {
    /// The signed-in identity's id.
    pub user_id: UserId,
    /// Login email.
    pub email: String,
    /// Display name from the profile or provider metadata.
    pub full_name: Option<String>,
    /// Role at the time of the action.
    pub role: Option<Role>,
    /// When the context was captured.
    pub acted_at: DateTime<Utc>,
}

impl ActorContext {
    /// Captures the actor from a session snapshot.
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> AppResult<Self> {
        let identity = match (&snapshot.identity, snapshot.is_authenticated()) {
            (Some(identity), true) => identity,
            _ => return Err(AppError::not_authenticated("Sign in to continue")),
        };
        Ok(Self {
            user_id: identity.id,
            email: identity.email.clone(),
            full_name: snapshot.full_name.clone(),
            role: snapshot.role,
            acted_at: Utc::now(),
        })
    }

    /// Captures the actor from the live session.
    pub fn current(session: &SessionManager) -> AppResult<Self> {
        Self::from_snapshot(&session.snapshot())
    }

    /// Returns whether the actor is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_some_and(|r| r.is_admin())
    }

    /// Name to greet the actor with.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.email)
    }
}
