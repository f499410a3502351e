//! In-memory member table.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use clubdesk_core::AppError;
use clubdesk_core::result::AppResult;
use clubdesk_core::types::MemberId;
use clubdesk_entity::audit::AuditAction;
use clubdesk_entity::member::{Member, MemberDraft, MemberType};

use super::audit::{MemoryAuditLog, audit_row};
use crate::traits::MemberStore;

const TABLE: &str = "members";

/// In-memory [`MemberStore`]. Every change is appended to the audit log.
#[derive(Debug, Clone, Default)]
pub struct MemoryMemberStore {
    members: Arc<DashMap<MemberId, Member>>,
    audit: MemoryAuditLog,
}

impl MemoryMemberStore {
    /// Create an empty store writing to its own audit log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store writing to a shared audit log.
    pub fn with_audit(audit: MemoryAuditLog) -> Self {
        Self {
            members: Arc::default(),
            audit,
        }
    }

    fn not_found(id: MemberId) -> AppError {
        AppError::not_found(format!("Member {id} not found"))
    }
}

fn apply(member: &mut Member, draft: &MemberDraft) {
    member.full_name = draft.full_name.clone();
    member.id_no = draft.id_no.clone();
    member.date_of_birth = draft.date_of_birth;
    member.phone = draft.phone.clone();
    member.role = draft.role.clone();
    member.member_type = draft.member_type;
    member.monthly_salary = draft.monthly_salary;
    member.registration_fee = draft.registration_fee;
}

#[async_trait]
impl MemberStore for MemoryMemberStore {
    async fn list(&self, member_type: MemberType) -> AppResult<Vec<Member>> {
        let mut members: Vec<Member> = self
            .members
            .iter()
            .filter(|m| m.member_type == member_type)
            .map(|m| m.clone())
            .collect();
        members.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(members)
    }

    async fn get(&self, id: MemberId) -> AppResult<Option<Member>> {
        Ok(self.members.get(&id).map(|m| m.clone()))
    }

    async fn insert(&self, draft: &MemberDraft) -> AppResult<Member> {
        let member = Member {
            id: MemberId::new(),
            full_name: draft.full_name.clone(),
            id_no: draft.id_no.clone(),
            date_of_birth: draft.date_of_birth,
            phone: draft.phone.clone(),
            role: draft.role.clone(),
            member_type: draft.member_type,
            monthly_salary: draft.monthly_salary,
            registration_fee: draft.registration_fee,
            created_at: Some(Utc::now()),
        };
        self.members.insert(member.id, member.clone());
        self.audit
            .record(TABLE, member.id.to_string(), AuditAction::Insert, None, audit_row(&member))
            .await;
        Ok(member)
    }

    async fn update(&self, id: MemberId, draft: &MemberDraft) -> AppResult<Member> {
        let (before, after) = {
            let mut member = self.members.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
            let before = member.clone();
            apply(&mut member, draft);
            (before, member.clone())
        };
        self.audit
            .record(
                TABLE,
                id.to_string(),
                AuditAction::Update,
                audit_row(&before),
                audit_row(&after),
            )
            .await;
        Ok(after)
    }

    async fn delete(&self, id: MemberId) -> AppResult<()> {
        let (_, removed) = self.members.remove(&id).ok_or_else(|| Self::not_found(id))?;
        self.audit
            .record(TABLE, id.to_string(), AuditAction::Delete, audit_row(&removed), None)
            .await;
        Ok(())
    }
}
