//! Newtype wrappers around [`uuid::Uuid`] for domain identifiers.
//!
//! Using distinct types prevents accidentally passing a `UserId` where a
//! `ContractId` is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a newtype ID wrapper around `Uuid`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Return a reference to the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

define_id!(
    /// Identifier issued by the credential provider; shared by the profile row.
    UserId
);

define_id!(
    /// Unique identifier for a member (player or staff).
    MemberId
);

define_id!(
    /// Unique identifier for a contract.
    ContractId
);

define_id!(
    /// Unique identifier for a ledger entry (payment, expense, or income).
    LedgerEntryId
);

define_id!(
    /// Unique identifier for an audit log row.
    AuditLogId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_new() {
        let id1 = UserId::new();
        let id2 = UserId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_user_id_from_str() {
        let uuid = Uuid::new_v4();
        let id: UserId = uuid.to_string().parse().expect("should parse");
        assert_eq!(id.0, uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn test_user_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }
}
