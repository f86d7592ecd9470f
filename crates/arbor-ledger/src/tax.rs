//! Transfer tax configuration and assessment
//!
//! Six named channels, each independently lockable with its own rate in
//! basis points. The sum of unlocked rates may never exceed 100%. Share
//! arithmetic truncates toward zero, so rounding dust stays with the
//! recipient rather than inflating the tax.

use arbor_core::{bps_share, constants::MAX_BPS, Amount, ArborError, Result};
use serde::{Deserialize, Serialize};

/// The named tax channels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxChannelKind {
    /// Auto-liquidity reserve
    Liquidity,
    /// Supply burn
    Burn,
    /// Treasury pool backing reserve
    Treasury,
    /// Achievement reward pools
    Achievement,
    /// Staking farm reward reserve
    Farming,
    /// Referral ladder pool
    Referral,
}

impl TaxChannelKind {
    /// All channels in assessment order
    pub const ALL: [TaxChannelKind; 6] = [
        TaxChannelKind::Liquidity,
        TaxChannelKind::Burn,
        TaxChannelKind::Treasury,
        TaxChannelKind::Achievement,
        TaxChannelKind::Farming,
        TaxChannelKind::Referral,
    ];

    /// Stable name for logs and metrics
    pub fn name(&self) -> &'static str {
        match self {
            Self::Liquidity => "liquidity",
            Self::Burn => "burn",
            Self::Treasury => "treasury",
            Self::Achievement => "achievement",
            Self::Farming => "farming",
            Self::Referral => "referral",
        }
    }
}

/// One tax channel: a lock toggle and a rate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxChannel {
    /// A locked channel collects nothing
    pub locked: bool,
    /// Rate in basis points while unlocked
    pub rate_bps: u16,
}

impl TaxChannel {
    /// Unlocked channel at the given rate
    pub fn unlocked(rate_bps: u16) -> Self {
        Self { locked: false, rate_bps }
    }

    /// Rate actually collected
    pub fn effective_bps(&self) -> u16 {
        if self.locked {
            0
        } else {
            self.rate_bps
        }
    }
}

/// Full transfer-tax configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxConfig {
    pub liquidity: TaxChannel,
    pub burn: TaxChannel,
    pub treasury: TaxChannel,
    pub achievement: TaxChannel,
    pub farming: TaxChannel,
    pub referral: TaxChannel,
}

impl TaxConfig {
    /// Configuration with every channel locked (no tax)
    pub fn all_locked() -> Self {
        let off = TaxChannel { locked: true, rate_bps: 0 };
        Self {
            liquidity: off,
            burn: off,
            treasury: off,
            achievement: off,
            farming: off,
            referral: off,
        }
    }

    /// Channel accessor by kind
    pub fn channel(&self, kind: TaxChannelKind) -> TaxChannel {
        match kind {
            TaxChannelKind::Liquidity => self.liquidity,
            TaxChannelKind::Burn => self.burn,
            TaxChannelKind::Treasury => self.treasury,
            TaxChannelKind::Achievement => self.achievement,
            TaxChannelKind::Farming => self.farming,
            TaxChannelKind::Referral => self.referral,
        }
    }

    /// Mutable channel accessor by kind
    pub fn channel_mut(&mut self, kind: TaxChannelKind) -> &mut TaxChannel {
        match kind {
            TaxChannelKind::Liquidity => &mut self.liquidity,
            TaxChannelKind::Burn => &mut self.burn,
            TaxChannelKind::Treasury => &mut self.treasury,
            TaxChannelKind::Achievement => &mut self.achievement,
            TaxChannelKind::Farming => &mut self.farming,
            TaxChannelKind::Referral => &mut self.referral,
        }
    }

    /// Flip every lock flag in one call, channel order matching
    /// [`TaxChannelKind::ALL`]
    pub fn set_lock_status(
        &mut self,
        liquidity: bool,
        burn: bool,
        treasury: bool,
        achievement: bool,
        farming: bool,
        referral: bool,
    ) {
        self.liquidity.locked = liquidity;
        self.burn.locked = burn;
        self.treasury.locked = treasury;
        self.achievement.locked = achievement;
        self.farming.locked = farming;
        self.referral.locked = referral;
    }

    /// Sum of unlocked rates
    pub fn total_unlocked_bps(&self) -> u32 {
        TaxChannelKind::ALL
            .iter()
            .map(|k| self.channel(*k).effective_bps() as u32)
            .sum()
    }

    /// Reject configurations that would tax more than the full amount
    pub fn validate(&self) -> Result<()> {
        let total = self.total_unlocked_bps();
        if total > MAX_BPS as u32 {
            return Err(ArborError::TaxTooHigh { total_bps: total });
        }
        Ok(())
    }

    /// Assess the tax on a transfer amount
    pub fn assess(&self, amount: Amount) -> TaxBreakdown {
        TaxBreakdown {
            liquidity: bps_share(amount, self.liquidity.effective_bps()),
            burn: bps_share(amount, self.burn.effective_bps()),
            treasury: bps_share(amount, self.treasury.effective_bps()),
            achievement: bps_share(amount, self.achievement.effective_bps()),
            farming: bps_share(amount, self.farming.effective_bps()),
            referral: bps_share(amount, self.referral.effective_bps()),
        }
    }
}

impl Default for TaxConfig {
    /// Launch configuration: 6% total across the six channels
    fn default() -> Self {
        Self {
            liquidity: TaxChannel::unlocked(100),
            burn: TaxChannel::unlocked(50),
            treasury: TaxChannel::unlocked(100),
            achievement: TaxChannel::unlocked(100),
            farming: TaxChannel::unlocked(100),
            referral: TaxChannel::unlocked(150),
        }
    }
}

/// Per-channel tax amounts for one transfer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaxBreakdown {
    pub liquidity: Amount,
    pub burn: Amount,
    pub treasury: Amount,
    pub achievement: Amount,
    pub farming: Amount,
    pub referral: Amount,
}

impl TaxBreakdown {
    /// Share for a given channel
    pub fn share(&self, kind: TaxChannelKind) -> Amount {
        match kind {
            TaxChannelKind::Liquidity => self.liquidity,
            TaxChannelKind::Burn => self.burn,
            TaxChannelKind::Treasury => self.treasury,
            TaxChannelKind::Achievement => self.achievement,
            TaxChannelKind::Farming => self.farming,
            TaxChannelKind::Referral => self.referral,
        }
    }

    /// Total tax across all channels.
    ///
    /// Computed as the sum of truncated shares, so recipient + shares +
    /// debit always reconcile exactly.
    pub fn total(&self) -> Amount {
        TaxChannelKind::ALL
            .iter()
            .fold(0, |acc: Amount, k| acc.saturating_add(self.share(*k)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = TaxConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total_unlocked_bps(), 600);
    }

    #[test]
    fn test_locked_channel_collects_nothing() {
        let mut config = TaxConfig::default();
        config.set_lock_status(true, true, true, true, true, true);
        let breakdown = config.assess(1_000_000);
        assert_eq!(breakdown.total(), 0);
    }

    #[test]
    fn test_assessment_shares() {
        let config = TaxConfig::default();
        let breakdown = config.assess(10_000);
        assert_eq!(breakdown.liquidity, 100); // 1%
        assert_eq!(breakdown.burn, 50); // 0.5%
        assert_eq!(breakdown.referral, 150); // 1.5%
        assert_eq!(breakdown.total(), 600);
    }

    #[test]
    fn test_overtaxed_config_rejected() {
        let mut config = TaxConfig::default();
        config.treasury.rate_bps = 9_900;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ArborError::TaxTooHigh { .. }));
    }

    #[test]
    fn test_truncation_never_exceeds_amount() {
        let config = TaxConfig::default();
        for amount in [0u128, 1, 7, 99, 10_001] {
            let breakdown = config.assess(amount);
            assert!(breakdown.total() <= amount);
        }
    }
}
