//! Core type definitions for the Arbor economic engine
//!
//! Accounts are opaque 20-byte addresses; amounts are 18-decimal
//! fixed-point integers carried as `u128`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token quantity in base units (18 decimals)
pub type Amount = u128;

/// Account identifier - opaque 20-byte address
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address {
    bytes: [u8; 20],
}

impl Address {
    /// Create an address from raw bytes
    pub fn new(bytes: [u8; 20]) -> Self {
        Self { bytes }
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.bytes
    }

    /// Convert to 0x-prefixed hex string
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    /// Parse from a hex string, with or without the 0x prefix
    pub fn from_hex(s: &str) -> crate::error::Result<Self> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(stripped)
            .map_err(|e| crate::error::ArborError::InvalidAddress(e.to_string()))?;
        if decoded.len() != 20 {
            return Err(crate::error::ArborError::InvalidAddress(format!(
                "expected 20 bytes, got {}",
                decoded.len()
            )));
        }
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&decoded);
        Ok(Self { bytes })
    }

    /// Deterministic address with a single distinguishing byte.
    ///
    /// Handy for genesis wiring and tests; byte 0 carries the tag.
    pub fn from_tag(tag: u8) -> Self {
        let mut bytes = [0u8; 20];
        bytes[0] = tag;
        Self { bytes }
    }

    /// Check whether this is the zero sentinel
    pub fn is_zero(&self) -> bool {
        self.bytes == [0u8; 20]
    }

    /// Zero/null address (unset collaborator slots, burn sink)
    pub const ZERO: Self = Self { bytes: [0u8; 20] };
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", &self.to_hex()[..10])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Activity categories the referral ladder splits fees for.
///
/// Each activity has its own per-level percentage table; see
/// `arbor-ladder` for the defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityKind {
    /// Referral share of the transfer tax
    TokenTransfer,
    /// Referral share of a license activation fee
    LicensePurchase,
    /// Referral share collected on bridge swaps
    Swap,
}

impl ActivityKind {
    /// All known activities, in seeding order
    pub const ALL: [ActivityKind; 3] = [
        ActivityKind::TokenTransfer,
        ActivityKind::LicensePurchase,
        ActivityKind::Swap,
    ];

    /// Stable name for logs and metrics labels
    pub fn name(&self) -> &'static str {
        match self {
            Self::TokenTransfer => "token_transfer",
            Self::LicensePurchase => "license_purchase",
            Self::Swap => "swap",
        }
    }
}

/// Protocol-wide constants
pub mod constants {
    use super::Amount;

    /// Token name
    pub const TOKEN_NAME: &str = "Arbor Token";

    /// Token symbol
    pub const TOKEN_SYMBOL: &str = "ARBR";

    /// Decimal places (same as ETH)
    pub const DECIMALS: u8 = 18;

    /// One ARBR in base units
    pub const ONE_ARBR: Amount = 1_000_000_000_000_000_000;

    /// Default genesis supply: 1 billion ARBR
    pub const GENESIS_SUPPLY: Amount = 1_000_000_000 * ONE_ARBR;

    /// Maximum basis points (100%)
    pub const MAX_BPS: u16 = 10_000;

    /// Maximum referral depth the ladder will ever walk
    pub const MAX_REFERRAL_LEVELS: usize = 7;

    /// Seconds in a day, for duration arithmetic
    pub const DAY_SECS: u64 = 24 * 3600;
}

/// Compute a basis-point share of an amount, truncating toward zero.
///
/// Truncation rounds in the protocol's favour by construction.
pub fn bps_share(amount: Amount, bps: u16) -> Amount {
    amount.saturating_mul(bps as Amount) / constants::MAX_BPS as Amount
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = Address::from_tag(0xAB);
        let hex = addr.to_hex();
        assert!(hex.starts_with("0xab"));
        assert_eq!(Address::from_hex(&hex).unwrap(), addr);
    }

    #[test]
    fn test_address_rejects_bad_length() {
        assert!(Address::from_hex("0xdeadbeef").is_err());
        assert!(Address::from_hex("not hex at all").is_err());
    }

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::from_tag(1).is_zero());
    }

    #[test]
    fn test_bps_share() {
        assert_eq!(bps_share(10_000, 100), 100); // 1%
        assert_eq!(bps_share(10_000, 10_000), 10_000); // 100%
        assert_eq!(bps_share(3, 5_000), 1); // truncates 1.5 -> 1
        assert_eq!(bps_share(1_000, 0), 0);
    }

    #[test]
    fn test_activity_names_are_stable() {
        for kind in ActivityKind::ALL {
            assert!(!kind.name().is_empty());
        }
    }
}
