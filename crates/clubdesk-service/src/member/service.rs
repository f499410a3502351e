//! Member register and per-member payment history.

use std::sync::Arc;

use tracing::info;

use clubdesk_auth::rbac::{Capability, RbacEnforcer};
use clubdesk_backend::traits::{LedgerStore, MemberStore};
use clubdesk_core::AppError;
use clubdesk_core::result::AppResult;
use clubdesk_core::types::MemberId;
use clubdesk_entity::finance::LedgerCategory;
use clubdesk_entity::member::{Member, MemberDraft, MemberPayments, MemberType};

use crate::context::ActorContext;
use crate::input;

/// Member operations. Registering a member needs `ManageOperations`;
/// editing or removing one needs `AdminOperations`.
#[derive(Debug, Clone)]
pub struct MemberService {
    /// Member table.
    members: Arc<dyn MemberStore>,
    /// Ledger tables, read for payment history.
    ledger: Arc<dyn LedgerStore>,
    /// RBAC enforcer.
    rbac: RbacEnforcer,
}

impl MemberService {
    /// Creates a new member service.
    pub fn new(members: Arc<dyn MemberStore>, ledger: Arc<dyn LedgerStore>) -> Self {
        Self {
            members,
            ledger,
            rbac: RbacEnforcer::new(),
        }
    }

    /// Lists players or staff by name.
    pub async fn list(&self, ctx: &ActorContext, member_type: MemberType) -> AppResult<Vec<Member>> {
        self.rbac.require(ctx.role, Capability::ViewOperations)?;
        self.members.list(member_type).await
    }

    /// Fetches one member.
    pub async fn get(&self, ctx: &ActorContext, id: MemberId) -> AppResult<Member> {
        self.rbac.require(ctx.role, Capability::ViewOperations)?;
        self.find(id).await
    }

    /// Registers a member.
    pub async fn create(&self, ctx: &ActorContext, draft: MemberDraft) -> AppResult<Member> {
        self.rbac.require(ctx.role, Capability::ManageOperations)?;
        let draft = draft.normalized();
        input::check(&draft)?;

        let member = self.members.insert(&draft).await?;
        info!(
            actor_id = %ctx.user_id,
            member_id = %member.id,
            member_type = %member.member_type,
            "Member registered"
        );
        Ok(member)
    }

    /// Replaces a member's fields.
    pub async fn update(
        &self,
        ctx: &ActorContext,
        id: MemberId,
        draft: MemberDraft,
    ) -> AppResult<Member> {
        self.rbac.require(ctx.role, Capability::AdminOperations)?;
        let draft = draft.normalized();
        input::check(&draft)?;

        let member = self.members.update(id, &draft).await?;
        info!(actor_id = %ctx.user_id, member_id = %id, "Member updated");
        Ok(member)
    }

    /// Removes a member.
    pub async fn delete(&self, ctx: &ActorContext, id: MemberId) -> AppResult<()> {
        self.rbac.require(ctx.role, Capability::AdminOperations)?;
        self.members.delete(id).await?;
        info!(actor_id = %ctx.user_id, member_id = %id, "Member deleted");
        Ok(())
    }

    /// A member with every salary and extra payment made to them.
    ///
    /// Gated on `ViewFinance` alone, so the finance role can open a
    /// payee's history without operations access.
    pub async fn payments(&self, ctx: &ActorContext, id: MemberId) -> AppResult<MemberPayments> {
        self.rbac.require(ctx.role, Capability::ViewFinance)?;
        let member = self.find(id).await?;
        let salary_payments = self
            .ledger
            .list_for_member(LedgerCategory::SalaryPayment, id)
            .await?;
        let extra_payments = self
            .ledger
            .list_for_member(LedgerCategory::ExtraPayment, id)
            .await?;
        Ok(MemberPayments {
            member,
            salary_payments,
            extra_payments,
        })
    }

    async fn find(&self, id: MemberId) -> AppResult<Member> {
        self.members
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Member {id} not found")))
    }
}
