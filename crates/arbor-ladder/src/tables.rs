//! Per-activity distribution tables
//!
//! Each activity maps to an ordered list of basis-point shares, one per
//! ancestor level (index 0 = direct sponsor). Tables may sum to less
//! than 100%; whatever the walk does not pay out accrues to the treasury
//! as residual.

use arbor_core::constants::{MAX_BPS, MAX_REFERRAL_LEVELS};
use arbor_core::{ActivityKind, ArborError, Result};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Default table for the transfer-tax referral share: the full share
/// spread over seven levels
const DEFAULT_TOKEN_TRANSFER: &[u16] = &[4_000, 2_500, 1_500, 1_000, 500, 300, 200];

/// Default table for license activation fees; the remainder backs the
/// treasury
const DEFAULT_LICENSE_PURCHASE: &[u16] = &[3_000, 2_000, 1_000, 500, 250, 150, 100];

/// Default table for bridge swap fees - shallow, three levels only
const DEFAULT_SWAP: &[u16] = &[1_000, 500, 250];

/// Activity type -> per-level shares
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActivityTables {
    tables: HashMap<ActivityKind, Vec<u16>>,
}

impl ActivityTables {
    /// Empty table set; call [`seed_defaults`](Self::seed_defaults) or
    /// configure explicitly
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the stock tables. Re-seeding overwrites any prior
    /// configuration rather than appending.
    pub fn seed_defaults(&mut self) {
        self.tables
            .insert(ActivityKind::TokenTransfer, DEFAULT_TOKEN_TRANSFER.to_vec());
        self.tables
            .insert(ActivityKind::LicensePurchase, DEFAULT_LICENSE_PURCHASE.to_vec());
        self.tables.insert(ActivityKind::Swap, DEFAULT_SWAP.to_vec());
    }

    /// Replace one activity's table
    pub fn set_table(&mut self, kind: ActivityKind, levels: Vec<u16>) -> Result<()> {
        if levels.len() > MAX_REFERRAL_LEVELS {
            return Err(ArborError::InvalidReferralTable("too many levels"));
        }
        let total: u32 = levels.iter().map(|bps| *bps as u32).sum();
        if total > MAX_BPS as u32 {
            return Err(ArborError::InvalidReferralTable("levels sum past 100%"));
        }
        self.tables.insert(kind, levels);
        Ok(())
    }

    /// Table for an activity (empty if never seeded)
    pub fn table(&self, kind: ActivityKind) -> &[u16] {
        self.tables.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any tables are configured
    pub fn is_seeded(&self) -> bool {
        !self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_defaults_covers_all_activities() {
        let mut tables = ActivityTables::new();
        tables.seed_defaults();
        for kind in ActivityKind::ALL {
            assert!(!tables.table(kind).is_empty());
        }
    }

    #[test]
    fn test_reseeding_overwrites() {
        let mut tables = ActivityTables::new();
        tables.set_table(ActivityKind::Swap, vec![9_999]).unwrap();
        tables.seed_defaults();
        assert_eq!(tables.table(ActivityKind::Swap), DEFAULT_SWAP);
    }

    #[test]
    fn test_table_validation() {
        let mut tables = ActivityTables::new();

        let err = tables
            .set_table(ActivityKind::Swap, vec![100; MAX_REFERRAL_LEVELS + 1])
            .unwrap_err();
        assert!(matches!(err, ArborError::InvalidReferralTable(_)));

        let err = tables
            .set_table(ActivityKind::Swap, vec![6_000, 5_000])
            .unwrap_err();
        assert!(matches!(err, ArborError::InvalidReferralTable(_)));
    }

    #[test]
    fn test_default_tables_within_bounds() {
        for table in [DEFAULT_TOKEN_TRANSFER, DEFAULT_LICENSE_PURCHASE, DEFAULT_SWAP] {
            assert!(table.len() <= MAX_REFERRAL_LEVELS);
            let total: u32 = table.iter().map(|bps| *bps as u32).sum();
            assert!(total <= MAX_BPS as u32);
        }
    }
}
