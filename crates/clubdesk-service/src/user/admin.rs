//! Admin user management: listing, provisioning, edits, blocking, and
//! password resets.

use std::sync::Arc;

use tracing::info;

use clubdesk_auth::password::PasswordValidator;
use clubdesk_auth::rbac::{Capability, RbacEnforcer};
use clubdesk_backend::traits::ProfileStore;
use clubdesk_core::AppError;
use clubdesk_core::result::AppResult;
use clubdesk_core::types::UserId;
use clubdesk_entity::user::{CreateUser, Role, UpdateUser, UserProfile};

use crate::context::ActorContext;
use crate::input;

/// Handles administrative user management operations.
#[derive(Debug, Clone)]
pub struct UserAdminService {
    /// Profile store and privileged account operations.
    profiles: Arc<dyn ProfileStore>,
    /// Policy for initial and reset passwords.
    validator: PasswordValidator,
    /// RBAC enforcer.
    rbac: RbacEnforcer,
}

impl UserAdminService {
    /// Creates a new admin user service.
    pub fn new(profiles: Arc<dyn ProfileStore>, validator: PasswordValidator) -> Self {
        Self {
            profiles,
            validator,
            rbac: RbacEnforcer::new(),
        }
    }

    /// Lists all users, newest first.
    pub async fn list_users(&self, ctx: &ActorContext) -> AppResult<Vec<UserProfile>> {
        self.rbac.require(ctx.role, Capability::ManageUsers)?;
        self.profiles.list_profiles().await
    }

    /// Gets a single user by ID.
    pub async fn get_user(&self, ctx: &ActorContext, user_id: UserId) -> AppResult<UserProfile> {
        self.rbac.require(ctx.role, Capability::ManageUsers)?;
        self.profiles
            .get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Provisions a new identity and profile.
    pub async fn create_user(&self, ctx: &ActorContext, req: CreateUser) -> AppResult<UserId> {
        self.rbac.require(ctx.role, Capability::ManageUsers)?;
        input::check(&req)?;
        self.validator.validate(&req.password)?;

        let user_id = self.profiles.create_user(&req).await?;

        info!(
            admin_id = %ctx.user_id,
            new_user_id = %user_id,
            role = %req.role,
            "User created by admin"
        );
        Ok(user_id)
    }

    /// Updates email, name, role, and active flag.
    ///
    /// An admin editing their own account must stay an active admin.
    pub async fn update_user(
        &self,
        ctx: &ActorContext,
        user_id: UserId,
        req: UpdateUser,
    ) -> AppResult<()> {
        self.rbac.require(ctx.role, Capability::ManageUsers)?;

        if user_id == ctx.user_id {
            if req.role != Role::Admin {
                return Err(AppError::permission_denied(
                    "You cannot remove your own admin role.",
                ));
            }
            if !req.is_active {
                return Err(AppError::permission_denied(
                    "You cannot block your own account.",
                ));
            }
        }
        input::check(&req)?;

        self.profiles.update_user(user_id, &req).await?;

        info!(
            admin_id = %ctx.user_id,
            target_id = %user_id,
            role = %req.role,
            is_active = req.is_active,
            "User updated by admin"
        );
        Ok(())
    }

    /// Blocks an account. The user is signed out on their next profile check.
    pub async fn block_user(
        &self,
        ctx: &ActorContext,
        user_id: UserId,
        reason: Option<&str>,
    ) -> AppResult<()> {
        self.rbac.require(ctx.role, Capability::ManageUsers)?;

        if user_id == ctx.user_id {
            return Err(AppError::permission_denied(
                "You cannot block your own account.",
            ));
        }

        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        self.profiles.set_active(user_id, false, reason).await?;

        info!(
            admin_id = %ctx.user_id,
            target_id = %user_id,
            reason = reason.unwrap_or("-"),
            "User blocked"
        );
        Ok(())
    }

    /// Unblocks an account.
    pub async fn unblock_user(&self, ctx: &ActorContext, user_id: UserId) -> AppResult<()> {
        self.rbac.require(ctx.role, Capability::ManageUsers)?;
        self.profiles.set_active(user_id, true, None).await?;

        info!(admin_id = %ctx.user_id, target_id = %user_id, "User unblocked");
        Ok(())
    }

    /// Resets another user's password (admin).
    pub async fn reset_password(
        &self,
        ctx: &ActorContext,
        user_id: UserId,
        new_password: &str,
        confirmation: &str,
    ) -> AppResult<()> {
        self.rbac.require(ctx.role, Capability::ManageUsers)?;
        self.validator
            .validate_with_confirmation(new_password, confirmation)?;

        self.profiles.reset_password(user_id, new_password).await?;

        info!(
            admin_id = %ctx.user_id,
            target_id = %user_id,
            "Password reset by admin"
        );
        Ok(())
    }
}
