//! License tier catalog
//!
//! Ordered list of purchasable tiers. Seeded once at genesis; mutable
//! afterwards only through the owner-gated upsert.

use arbor_core::constants::{DAY_SECS, MAX_REFERRAL_LEVELS, ONE_ARBR};
use arbor_core::{Amount, ArborError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One purchasable license tier
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseTier {
    /// Tier level, 1-based and unique
    pub level: u8,
    /// Display name
    pub name: String,
    /// Activation price in ARBR
    pub price: Amount,
    /// Referral depth this tier lets its holder earn at
    pub ladder_level: u8,
    /// Validity window after activation
    pub duration_secs: u64,
}

impl LicenseTier {
    fn validate(&self) -> Result<()> {
        if self.level == 0 {
            return Err(ArborError::UnknownLicenseTier(0));
        }
        if self.price == 0 {
            return Err(ArborError::InvalidAmount("tier price cannot be zero"));
        }
        if self.duration_secs == 0 {
            return Err(ArborError::InvalidAmount("tier duration cannot be zero"));
        }
        if self.ladder_level as usize > MAX_REFERRAL_LEVELS {
            return Err(ArborError::InvalidReferralTable("ladder level too deep"));
        }
        Ok(())
    }
}

/// The ordered tier catalog
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TierCatalog {
    tiers: IndexMap<u8, LicenseTier>,
}

impl TierCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the stock tiers, replacing any existing catalog
    pub fn seed_defaults(&mut self) {
        self.tiers.clear();
        for tier in Self::default_tiers() {
            self.tiers.insert(tier.level, tier);
        }
    }

    /// Stock tier ladder
    pub fn default_tiers() -> Vec<LicenseTier> {
        vec![
            LicenseTier {
                level: 1,
                name: "Scout".into(),
                price: 100 * ONE_ARBR,
                ladder_level: 1,
                duration_secs: 90 * DAY_SECS,
            },
            LicenseTier {
                level: 2,
                name: "Pioneer".into(),
                price: 1_000 * ONE_ARBR,
                ladder_level: 3,
                duration_secs: 180 * DAY_SECS,
            },
            LicenseTier {
                level: 3,
                name: "Steward".into(),
                price: 5_000 * ONE_ARBR,
                ladder_level: 5,
                duration_secs: 270 * DAY_SECS,
            },
            LicenseTier {
                level: 4,
                name: "Luminary".into(),
                price: 10_000 * ONE_ARBR,
                ladder_level: 7,
                duration_secs: 365 * DAY_SECS,
            },
        ]
    }

    /// Insert or replace a tier (admin path; the manager gates the caller)
    pub fn upsert(&mut self, tier: LicenseTier) -> Result<()> {
        tier.validate()?;
        self.tiers.insert(tier.level, tier);
        self.tiers.sort_keys();
        Ok(())
    }

    /// Look up a tier by level
    pub fn tier_of(&self, level: u8) -> Result<&LicenseTier> {
        self.tiers
            .get(&level)
            .ok_or(ArborError::UnknownLicenseTier(level))
    }

    /// All tiers in level order
    pub fn all(&self) -> Vec<LicenseTier> {
        self.tiers.values().cloned().collect()
    }

    /// Number of tiers
    pub fn count(&self) -> usize {
        self.tiers.len()
    }
}
