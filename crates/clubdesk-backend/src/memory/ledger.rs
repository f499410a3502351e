//! In-memory payment, expense, and income ledgers.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use clubdesk_core::AppError;
use clubdesk_core::result::AppResult;
use clubdesk_core::types::{LedgerEntryId, MemberId};
use clubdesk_entity::finance::{LedgerCategory, LedgerDraft, LedgerEntry};

use crate::traits::LedgerStore;

/// In-memory [`LedgerStore`] holding all five categories.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    entries: Arc<DashMap<LedgerEntryId, LedgerEntry>>,
}

impl MemoryLedgerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn list(&self, category: LedgerCategory) -> AppResult<Vec<LedgerEntry>> {
        let mut entries: Vec<LedgerEntry> = self
            .entries
            .iter()
            .filter(|e| e.category == category)
            .map(|e| e.clone())
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }

    async fn list_for_member(
        &self,
        category: LedgerCategory,
        member_id: MemberId,
    ) -> AppResult<Vec<LedgerEntry>> {
        let mut entries = self.list(category).await?;
        entries.retain(|e| e.member_id() == Some(member_id));
        Ok(entries)
    }

    async fn insert(
        &self,
        category: LedgerCategory,
        draft: &LedgerDraft,
    ) -> AppResult<LedgerEntry> {
        let entry = LedgerEntry {
            id: LedgerEntryId::new(),
            category,
            amount: draft.amount,
            date: draft.date,
            notes: draft.notes.clone(),
            details: draft.details.clone(),
            created_at: Some(Utc::now()),
        };
        self.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn update(
        &self,
        category: LedgerCategory,
        id: LedgerEntryId,
        draft: &LedgerDraft,
    ) -> AppResult<LedgerEntry> {
        let mut entry = self
            .entries
            .get_mut(&id)
            .filter(|e| e.category == category)
            .ok_or_else(|| AppError::not_found(format!("{category} entry {id} not found")))?;
        entry.amount = draft.amount;
        entry.date = draft.date;
        entry.notes = draft.notes.clone();
        entry.details = draft.details.clone();
        Ok(entry.clone())
    }

    async fn delete(&self, category: LedgerCategory, id: LedgerEntryId) -> AppResult<()> {
        self.entries
            .remove_if(&id, |_, e| e.category == category)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("{category} entry {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use clubdesk_core::ErrorKind;

    #[tokio::test]
    async fn test_categories_are_separate() {
        let store = MemoryLedgerStore::new();
        let date = NaiveDate::from_ymd_opt(2025, 2, 14).unwrap();
        let income = store
            .insert(LedgerCategory::Income, &LedgerDraft::new(500_000.0, date))
            .await
            .unwrap();
        store
            .insert(LedgerCategory::OtherExpense, &LedgerDraft::new(20_000.0, date))
            .await
            .unwrap();

        assert_eq!(store.list(LedgerCategory::Income).await.unwrap().len(), 1);
        let err = store
            .delete(LedgerCategory::OtherExpense, income.id)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
        store.delete(LedgerCategory::Income, income.id).await.unwrap();
        assert!(store.list(LedgerCategory::Income).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_for_member_filters_payee() {
        let store = MemoryLedgerStore::new();
        let date = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let keeper = MemberId::new();
        store
            .insert(
                LedgerCategory::SalaryPayment,
                &LedgerDraft::new(300_000.0, date).for_member(keeper),
            )
            .await
            .unwrap();
        store
            .insert(
                LedgerCategory::SalaryPayment,
                &LedgerDraft::new(250_000.0, date).for_member(MemberId::new()),
            )
            .await
            .unwrap();

        let paid = store
            .list_for_member(LedgerCategory::SalaryPayment, keeper)
            .await
            .unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].amount, 300_000.0);
        assert!(store
            .list_for_member(LedgerCategory::ExtraPayment, keeper)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = MemoryLedgerStore::new();
        for day in [3, 10, 7] {
            let date = NaiveDate::from_ymd_opt(2025, 5, day).unwrap();
            store
                .insert(LedgerCategory::SalaryPayment, &LedgerDraft::new(1.0, date))
                .await
                .unwrap();
        }
        let days: Vec<_> = store
            .list(LedgerCategory::SalaryPayment)
            .await
            .unwrap()
            .iter()
            .map(|e| e.date.format("%d").to_string())
            .collect();
        assert_eq!(days, vec!["10", "07", "03"]);
    }
}
