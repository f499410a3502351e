//! Store bundle selected from configuration.

use std::sync::Arc;

use tracing::info;

use clubdesk_core::AppError;
use clubdesk_core::config::{BackendConfig, BackendMode};
use clubdesk_core::result::AppResult;

use crate::traits::{
    AuditLogStore, ContractStore, CredentialStore, LedgerStore, MemberStore, ProfileStore,
};

/// The stores the application talks to.
///
/// All of them point at the same backend; the split only mirrors the
/// separate concerns.
#[derive(Debug, Clone)]
pub struct Backend {
    /// Credential provider.
    pub credentials: Arc<dyn CredentialStore>,
    /// Profile table and admin operations.
    pub profiles: Arc<dyn ProfileStore>,
    /// Contract table.
    pub contracts: Arc<dyn ContractStore>,
    /// Ledger tables.
    pub ledger: Arc<dyn LedgerStore>,
    /// Member register.
    pub members: Arc<dyn MemberStore>,
    /// Change history, read-only.
    pub audit: Arc<dyn AuditLogStore>,
}

impl Backend {
    /// Build the stores for the configured backend mode.
    pub fn from_config(config: &BackendConfig) -> AppResult<Self> {
        match config.mode {
            #[cfg(feature = "rest")]
            BackendMode::Rest => {
                info!("Initializing hosted REST backend");
                let client = Arc::new(crate::rest::RestClient::new(config)?);
                Ok(Self {
                    credentials: client.clone(),
                    profiles: client.clone(),
                    contracts: client.clone(),
                    ledger: client.clone(),
                    members: client.clone(),
                    audit: client,
                })
            }
            #[cfg(feature = "memory")]
            BackendMode::Memory => {
                info!(
                    seed_users = config.seed_users.len(),
                    "Initializing in-memory backend"
                );
                let auth = crate::memory::MemoryAuthBackend::seeded(&config.seed_users);
                Ok(Self::memory(auth))
            }
            #[allow(unreachable_patterns)]
            other => Err(AppError::configuration(format!(
                "Backend mode {other:?} is not compiled in"
            ))),
        }
    }

    /// Stores backed by an existing in-memory auth backend and empty tables.
    #[cfg(feature = "memory")]
    pub fn memory(auth: crate::memory::MemoryAuthBackend) -> Self {
        let auth = Arc::new(auth);
        let audit = crate::memory::MemoryAuditLog::new();
        Self {
            credentials: auth.clone(),
            profiles: auth,
            contracts: Arc::new(crate::memory::MemoryContractStore::new()),
            ledger: Arc::new(crate::memory::MemoryLedgerStore::new()),
            members: Arc::new(crate::memory::MemoryMemberStore::with_audit(audit.clone())),
            audit: Arc::new(audit),
        }
    }
}
