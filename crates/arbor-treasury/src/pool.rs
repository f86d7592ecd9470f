//! Treasury pool - passive backing reserve
//!
//! The pool never initiates movements; it is the account other
//! components credit. Pair reserves reported by the external AMM are
//! stored for display and accounting only.

use arbor_core::{Address, Amount};
use arbor_ledger::BalanceBook;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Externally-reported reserves of one AMM pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairReserves {
    pub reserve0: Amount,
    pub reserve1: Amount,
    /// Ledger time of the report
    pub updated_at: u64,
}

/// The treasury pool
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TreasuryPool {
    account: Address,
    reported: HashMap<String, PairReserves>,
}

impl TreasuryPool {
    /// Wrap the treasury account
    pub fn new(account: Address) -> Self {
        Self {
            account,
            reported: HashMap::new(),
        }
    }

    /// The treasury account address
    pub fn account(&self) -> Address {
        self.account
    }

    /// Reserve held in a given asset book
    pub fn reserves(&self, book: &BalanceBook) -> Amount {
        book.balance_of(self.account)
    }

    /// Record reserves reported by the external AMM for a pair
    pub fn record_pair_reserves(
        &mut self,
        pair: impl Into<String>,
        reserve0: Amount,
        reserve1: Amount,
        now: u64,
    ) {
        let pair = pair.into();
        tracing::debug!(%pair, reserve0, reserve1, "pair reserves reported");
        self.reported
            .insert(pair, PairReserves { reserve0, reserve1, updated_at: now });
    }

    /// Last reported reserves for a pair
    pub fn pair_reserves(&self, pair: &str) -> Option<PairReserves> {
        self.reported.get(pair).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserves_read_the_book() {
        let treasury = TreasuryPool::new(Address::from_tag(0xA2));
        let mut book = BalanceBook::new("ARBR");
        book.mint(treasury.account(), 5_000).unwrap();
        assert_eq!(treasury.reserves(&book), 5_000);
    }

    #[test]
    fn test_pair_reports_overwrite() {
        let mut treasury = TreasuryPool::new(Address::from_tag(0xA2));
        treasury.record_pair_reserves("ARBR/AUSD", 10, 20, 100);
        treasury.record_pair_reserves("ARBR/AUSD", 30, 40, 200);

        let reserves = treasury.pair_reserves("ARBR/AUSD").unwrap();
        assert_eq!(reserves.reserve0, 30);
        assert_eq!(reserves.updated_at, 200);
        assert!(treasury.pair_reserves("ARBR/NATIVE").is_none());
    }
}
