//! Error types for Arbor economic operations

use crate::types::{Address, Amount};
use thiserror::Error;

/// Result type alias for Arbor operations
pub type Result<T> = std::result::Result<T, ArborError>;

/// Errors that can occur across the Arbor economic engine.
///
/// All errors are synchronous and non-recoverable within the failing call:
/// the operation commits nothing and surfaces the error verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArborError {
    // === Ledger ===
    /// Sender balance does not cover the requested amount
    #[error("Insufficient balance: need {required}, have {available}")]
    InsufficientBalance { required: Amount, available: Amount },

    /// Delegated spend exceeds the approved allowance
    #[error("Insufficient allowance: need {required}, approved {approved}")]
    InsufficientAllowance { required: Amount, approved: Amount },

    /// Zero or otherwise meaningless amount for this operation
    #[error("Invalid amount: {0}")]
    InvalidAmount(&'static str),

    /// Arithmetic overflow on supply or balance math
    #[error("Amount overflow")]
    AmountOverflow,

    /// Enabled tax channels sum past 100%
    #[error("Tax rates exceed 100%: {total_bps} bps")]
    TaxTooHigh { total_bps: u32 },

    // === Staking Farm ===
    /// Withdrawal larger than the staked balance
    #[error("Insufficient stake: need {required}, staked {staked}")]
    InsufficientStake { required: Amount, staked: Amount },

    /// Claim with zero accrued reward
    #[error("Nothing to claim for {0}")]
    NothingToClaim(Address),

    /// Reward reserve cannot cover the notified period
    #[error("Reward reserve too low: rate needs {required}, reserve holds {available}")]
    InsufficientRewardReserve { required: Amount, available: Amount },

    /// Operation must wait for the current reward period to finish
    #[error("Reward period still active for {remaining}s")]
    RewardPeriodActive { remaining: u64 },

    // === License Manager ===
    /// Account already holds a license record
    #[error("License already registered for {0}")]
    AlreadyRegistered(Address),

    /// Operation requires a registered license
    #[error("No registered license for {0}")]
    NotRegistered(Address),

    /// Sponsor has no license record and is not the root
    #[error("Invalid sponsor: {0}")]
    InvalidSponsor(Address),

    /// Liquidation attempted before expiry
    #[error("License still active for {remaining}s")]
    StillActive { remaining: u64 },

    /// Extension attempted before expiry
    #[error("License not expired: {remaining}s remaining")]
    NotExpired { remaining: u64 },

    /// License was already liquidated
    #[error("License already liquidated for {0}")]
    AlreadyLiquidated(Address),

    /// No such tier in the catalog
    #[error("Unknown license tier: {0}")]
    UnknownLicenseTier(u8),

    // === Bridge ===
    /// Caller holds no active license and is not exempt
    #[error("Intermediary not licensed: {0}")]
    IntermediaryNotLicensed(Address),

    /// Deadline parameter lies in the past
    #[error("Deadline expired: deadline {deadline}, now {now}")]
    DeadlineExpired { deadline: u64, now: u64 },

    /// Error reported by the external AMM router, propagated unchanged
    #[error("Router error: {0}")]
    Router(String),

    // === General ===
    /// Caller lacks the required role
    #[error("Unauthorized caller: {0}")]
    Unauthorized(Address),

    /// Malformed address input
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Referral table rejected (too many levels or rates too high)
    #[error("Invalid referral table: {0}")]
    InvalidReferralTable(&'static str),

    /// Malformed or inconsistent ecosystem configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ArborError {
    /// Stable numeric code for embedders and API layers
    pub fn code(&self) -> u32 {
        match self {
            Self::InsufficientBalance { .. } => 1001,
            Self::InsufficientAllowance { .. } => 1002,
            Self::InvalidAmount(_) => 1003,
            Self::AmountOverflow => 1004,
            Self::TaxTooHigh { .. } => 1005,
            Self::InsufficientStake { .. } => 2001,
            Self::NothingToClaim(_) => 2002,
            Self::InsufficientRewardReserve { .. } => 2003,
            Self::RewardPeriodActive { .. } => 2004,
            Self::AlreadyRegistered(_) => 3001,
            Self::NotRegistered(_) => 3002,
            Self::InvalidSponsor(_) => 3003,
            Self::StillActive { .. } => 3004,
            Self::NotExpired { .. } => 3005,
            Self::AlreadyLiquidated(_) => 3006,
            Self::UnknownLicenseTier(_) => 3007,
            Self::IntermediaryNotLicensed(_) => 4001,
            Self::DeadlineExpired { .. } => 4002,
            Self::Router(_) => 4003,
            Self::Unauthorized(_) => 9001,
            Self::InvalidAddress(_) => 9002,
            Self::InvalidReferralTable(_) => 9003,
            Self::Config(_) => 9004,
        }
    }

    /// Whether the error stems from caller input rather than configuration
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            Self::TaxTooHigh { .. }
                | Self::InsufficientRewardReserve { .. }
                | Self::RewardPeriodActive { .. }
                | Self::InvalidReferralTable(_)
                | Self::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            ArborError::InsufficientBalance { required: 1, available: 0 },
            ArborError::InsufficientStake { required: 1, staked: 0 },
            ArborError::NotRegistered(Address::ZERO),
            ArborError::IntermediaryNotLicensed(Address::ZERO),
            ArborError::Unauthorized(Address::ZERO),
        ];
        let mut codes: Vec<u32> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_error_display() {
        let err = ArborError::InsufficientBalance { required: 100, available: 7 };
        let msg = format!("{}", err);
        assert!(msg.contains("need 100"));
        assert!(msg.contains("have 7"));
    }

    #[test]
    fn test_user_error_classification() {
        assert!(ArborError::NothingToClaim(Address::ZERO).is_user_error());
        assert!(!ArborError::TaxTooHigh { total_bps: 12_000 }.is_user_error());
    }
}
