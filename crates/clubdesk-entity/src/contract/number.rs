//! Contract number format: `FFC-{PLY|STF}-{year}-{sequence:03}`.

use std::fmt;
use std::str::FromStr;

use clubdesk_core::AppError;

use super::model::ContractType;

const PREFIX: &str = "FFC";

/// A parsed contract number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContractNumber {
    /// Player or staff.
    pub contract_type: ContractType,
    /// Calendar year of issue.
    pub year: i32,
    /// 1-based sequence within the type.
    pub sequence: u32,
}

impl ContractNumber {
    /// The number that follows `existing` contracts of this type.
    pub fn next(contract_type: ContractType, year: i32, existing: u64) -> Self {
        Self {
            contract_type,
            year,
            sequence: u32::try_from(existing.saturating_add(1)).unwrap_or(u32::MAX),
        }
    }
}

impl fmt::Display for ContractNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{PREFIX}-{}-{}-{:03}",
            self.contract_type.code(),
            self.year,
            self.sequence
        )
    }
}

impl FromStr for ContractNumber {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::validation(format!("Invalid contract number: '{s}'"));

        let mut parts = s.split('-');
        if parts.next() != Some(PREFIX) {
            return Err(invalid());
        }
        let contract_type = match parts.next() {
            Some("PLY") => ContractType::Player,
            Some("STF") => ContractType::Staff,
            _ => return Err(invalid()),
        };
        let year = parts
            .next()
            .and_then(|y| y.parse::<i32>().ok())
            .ok_or_else(invalid)?;
        let sequence = parts
            .next()
            .and_then(|n| n.parse::<u32>().ok())
            .ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            contract_type,
            year,
            sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_pads_sequence() {
        let n = ContractNumber::next(ContractType::Player, 2025, 0);
        assert_eq!(n.to_string(), "FFC-PLY-2025-001");

        let n = ContractNumber::next(ContractType::Staff, 2026, 41);
        assert_eq!(n.to_string(), "FFC-STF-2026-042");
    }

    #[test]
    fn test_sequence_beyond_three_digits() {
        let n = ContractNumber::next(ContractType::Player, 2025, 1203);
        assert_eq!(n.to_string(), "FFC-PLY-2025-1204");
    }

    #[test]
    fn test_parse() {
        let n: ContractNumber = "FFC-STF-2024-007".parse().unwrap();
        assert_eq!(n.contract_type, ContractType::Staff);
        assert_eq!(n.year, 2024);
        assert_eq!(n.sequence, 7);

        assert!("FFC-XXX-2024-007".parse::<ContractNumber>().is_err());
        assert!("ABC-PLY-2024-007".parse::<ContractNumber>().is_err());
        assert!("FFC-PLY-2024".parse::<ContractNumber>().is_err());
    }
}
