//! Collaborator registry
//!
//! The original design resolved collaborators through a mutable global
//! directory. Here the registry is a plain immutable value: every
//! well-known account is fixed at genesis and injected into the
//! components that need it. Accessors exist for embedders; nothing
//! rebinds after construction.

use arbor_core::{Address, ArborError, Result};
use serde::{Deserialize, Serialize};

/// Well-known accounts of one ecosystem deployment
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CollaboratorRegistry {
    /// Administrative owner; also the ladder root
    pub owner: Address,
    /// Treasury pool backing reserve
    pub treasury: Address,
    /// Achievement pools' joint account
    pub achievement: Address,
    /// Staked tokens sit here
    pub farm_custody: Address,
    /// Farm rewards pay out of here
    pub farm_rewards: Address,
    /// Referral shares park here before distribution
    pub ladder_pool: Address,
    /// Bridge swap custody
    pub bridge: Address,
    /// License fees pass through and LP stakes lock here
    pub license_custody: Address,
    /// Auto-liquidity share accumulates here
    pub liquidity: Address,
}

impl CollaboratorRegistry {
    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn treasury(&self) -> Address {
        self.treasury
    }

    pub fn achievement(&self) -> Address {
        self.achievement
    }

    pub fn farm_custody(&self) -> Address {
        self.farm_custody
    }

    pub fn farm_rewards(&self) -> Address {
        self.farm_rewards
    }

    pub fn ladder_pool(&self) -> Address {
        self.ladder_pool
    }

    pub fn bridge(&self) -> Address {
        self.bridge
    }

    pub fn license_custody(&self) -> Address {
        self.license_custody
    }

    pub fn liquidity(&self) -> Address {
        self.liquidity
    }

    /// Accounts the token must treat as fee-exempt plumbing
    pub fn system_accounts(&self) -> [Address; 8] {
        [
            self.treasury,
            self.achievement,
            self.farm_custody,
            self.farm_rewards,
            self.ladder_pool,
            self.bridge,
            self.license_custody,
            self.liquidity,
        ]
    }

    /// Reject registries with duplicated or zero accounts - shared slots
    /// would silently merge unrelated reserves
    pub fn validate(&self) -> Result<()> {
        let mut all = self.system_accounts().to_vec();
        all.push(self.owner);
        for (i, a) in all.iter().enumerate() {
            if a.is_zero() {
                return Err(ArborError::Config("registry account unset".into()));
            }
            if all[i + 1..].contains(a) {
                return Err(ArborError::Config(format!("registry account reused: {a}")));
            }
        }
        Ok(())
    }
}

impl Default for CollaboratorRegistry {
    fn default() -> Self {
        Self {
            owner: Address::from_tag(0x01),
            treasury: Address::from_tag(0xA1),
            achievement: Address::from_tag(0xA2),
            farm_custody: Address::from_tag(0xA3),
            farm_rewards: Address::from_tag(0xA4),
            ladder_pool: Address::from_tag(0xA5),
            bridge: Address::from_tag(0xA6),
            license_custody: Address::from_tag(0xA7),
            liquidity: Address::from_tag(0xA8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_validates() {
        assert!(CollaboratorRegistry::default().validate().is_ok());
    }

    #[test]
    fn test_duplicate_account_rejected() {
        let mut registry = CollaboratorRegistry::default();
        registry.bridge = registry.treasury;
        assert!(matches!(
            registry.validate().unwrap_err(),
            ArborError::Config(_)
        ));
    }

    #[test]
    fn test_zero_account_rejected() {
        let mut registry = CollaboratorRegistry::default();
        registry.liquidity = Address::ZERO;
        assert!(registry.validate().is_err());
    }
}
