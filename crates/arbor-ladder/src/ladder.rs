//! Referral distribution engine
//!
//! Walks the sponsor chain upward from the activity's origin, paying
//! each ancestor its table share when the ancestor's earning depth
//! covers that level. Short chains, ineligible ancestors and exhausted
//! tables never fail - every unpaid unit accrues to the treasury.

use crate::tables::ActivityTables;
use crate::tree::SponsorTree;
use arbor_core::{bps_share, ActivityKind, Address, Amount, Result};
use arbor_ledger::BalanceBook;
use serde::{Deserialize, Serialize};

/// One ancestor payout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelPayout {
    /// Ancestor level, 1 = direct sponsor
    pub level: u8,
    pub account: Address,
    pub amount: Amount,
}

/// Outcome of one distribution
#[derive(Clone, Debug)]
pub struct DistributionReport {
    pub kind: ActivityKind,
    pub origin: Address,
    /// Amount drawn from the ladder pool
    pub amount: Amount,
    pub paid: Vec<LevelPayout>,
    /// Remainder credited to the treasury
    pub residual: Amount,
}

impl DistributionReport {
    /// Sum paid to ancestors
    pub fn total_paid(&self) -> Amount {
        self.paid.iter().fold(0, |acc: Amount, p| acc.saturating_add(p.amount))
    }
}

/// The referral ladder: sponsor tree + activity tables + pool wiring
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReferralLadder {
    tree: SponsorTree,
    tables: ActivityTables,
    /// Account the undistributed activity shares sit in
    pool: Address,
    /// Residual sink
    treasury: Address,
}

impl ReferralLadder {
    /// Wire up the ladder. `pool` is the account fee shares are parked
    /// in before distribution; `treasury` absorbs residuals.
    pub fn new(root: Address, pool: Address, treasury: Address) -> Self {
        Self {
            tree: SponsorTree::new(root),
            tables: ActivityTables::new(),
            pool,
            treasury,
        }
    }

    /// Sponsor tree accessor
    pub fn tree(&self) -> &SponsorTree {
        &self.tree
    }

    /// Ladder pool account
    pub fn pool(&self) -> Address {
        self.pool
    }

    /// Record a sponsor edge (license registration path)
    pub fn register(&mut self, account: Address, sponsor: Address, now: u64) -> Result<()> {
        self.tree.register(account, sponsor, now)
    }

    /// Grant or revoke earning depth (license activation path)
    pub fn set_earn_levels(&mut self, account: Address, depth: u8) -> Result<()> {
        self.tree.set_earn_levels(account, depth)
    }

    /// Seed the stock per-activity tables; idempotent by overwrite
    pub fn seed_default_tables(&mut self) {
        self.tables.seed_defaults();
    }

    /// Replace one activity's table
    pub fn set_table(&mut self, kind: ActivityKind, levels: Vec<u16>) -> Result<()> {
        self.tables.set_table(kind, levels)
    }

    /// Table accessor
    pub fn table(&self, kind: ActivityKind) -> &[u16] {
        self.tables.table(kind)
    }

    /// Distribute an activity amount from the ladder pool up the chain.
    ///
    /// Fails only if the pool does not hold `amount`; chain shape never
    /// causes a failure.
    pub fn distribute(
        &self,
        book: &mut BalanceBook,
        kind: ActivityKind,
        origin: Address,
        amount: Amount,
    ) -> Result<DistributionReport> {
        if amount == 0 {
            return Ok(DistributionReport {
                kind,
                origin,
                amount,
                paid: Vec::new(),
                residual: 0,
            });
        }

        book.debit(self.pool, amount)?;

        let table = self.tables.table(kind);
        let mut paid = Vec::new();
        let mut paid_total: Amount = 0;

        for (idx, ancestor) in self.tree.ancestors(origin).enumerate() {
            if idx >= table.len() {
                break;
            }
            let level = (idx + 1) as u8;
            let share = bps_share(amount, table[idx]);
            if share == 0 {
                continue;
            }
            if self.tree.earn_levels(ancestor) < level {
                // Depth not granted at this level; share joins the residual
                continue;
            }
            book.credit(ancestor, share);
            paid_total = paid_total.saturating_add(share);
            paid.push(LevelPayout { level, account: ancestor, amount: share });
        }

        let residual = amount - paid_total;
        if residual > 0 {
            book.credit(self.treasury, residual);
        }

        tracing::debug!(
            activity = kind.name(),
            %origin,
            amount,
            paid = paid.len(),
            residual,
            "ladder distribution"
        );

        Ok(DistributionReport { kind, origin, amount, paid, residual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(tag: u8) -> Address {
        Address::from_tag(tag)
    }

    const ROOT: u8 = 0xFF;
    const POOL: u8 = 0xE0;
    const TREASURY: u8 = 0xE1;

    /// root <- s3 <- s2 <- s1 <- origin, everyone fully eligible
    fn ladder_with_chain() -> (ReferralLadder, BalanceBook) {
        let mut ladder = ReferralLadder::new(addr(ROOT), addr(POOL), addr(TREASURY));
        ladder.register(addr(13), addr(ROOT), 0).unwrap();
        ladder.register(addr(12), addr(13), 0).unwrap();
        ladder.register(addr(11), addr(12), 0).unwrap();
        ladder.register(addr(10), addr(11), 0).unwrap();
        for tag in [11, 12, 13] {
            ladder.set_earn_levels(addr(tag), 7).unwrap();
        }

        let mut book = BalanceBook::new("ARBR");
        book.mint(addr(POOL), 1_000_000).unwrap();
        (ladder, book)
    }

    #[test]
    fn test_three_level_example() {
        // The canonical case: 10% / 5% / 2% over a 1000-unit activity
        let (mut ladder, mut book) = ladder_with_chain();
        ladder
            .set_table(ActivityKind::Swap, vec![1_000, 500, 200])
            .unwrap();

        let report = ladder
            .distribute(&mut book, ActivityKind::Swap, addr(10), 1_000)
            .unwrap();

        assert_eq!(book.balance_of(addr(11)), 100);
        assert_eq!(book.balance_of(addr(12)), 50);
        assert_eq!(book.balance_of(addr(13)), 20);
        assert_eq!(report.residual, 830);
        assert_eq!(book.balance_of(addr(TREASURY)), 830);
        assert!(book.reconciles());
    }

    #[test]
    fn test_short_chain_residual_to_treasury() {
        let mut ladder = ReferralLadder::new(addr(ROOT), addr(POOL), addr(TREASURY));
        ladder.register(addr(11), addr(ROOT), 0).unwrap();
        ladder.register(addr(10), addr(11), 0).unwrap();
        ladder.set_earn_levels(addr(11), 7).unwrap();
        ladder
            .set_table(ActivityKind::Swap, vec![1_000, 500, 200])
            .unwrap();

        let mut book = BalanceBook::new("ARBR");
        book.mint(addr(POOL), 10_000).unwrap();

        // Chain is origin -> 11 -> root; levels 2 and 3 cannot be paid
        let report = ladder
            .distribute(&mut book, ActivityKind::Swap, addr(10), 1_000)
            .unwrap();
        assert_eq!(book.balance_of(addr(11)), 100);
        assert_eq!(report.residual, 900);
        assert!(book.reconciles());
    }

    #[test]
    fn test_unregistered_origin_all_residual() {
        let (mut ladder, mut book) = ladder_with_chain();
        ladder
            .set_table(ActivityKind::Swap, vec![1_000, 500, 200])
            .unwrap();

        let report = ladder
            .distribute(&mut book, ActivityKind::Swap, addr(99), 1_000)
            .unwrap();
        assert!(report.paid.is_empty());
        assert_eq!(report.residual, 1_000);
    }

    #[test]
    fn test_ineligible_ancestor_share_skipped() {
        let (mut ladder, mut book) = ladder_with_chain();
        ladder
            .set_table(ActivityKind::Swap, vec![1_000, 500, 200])
            .unwrap();
        // Level-1 ancestor may only earn level 0 (no active license)
        ladder.set_earn_levels(addr(11), 0).unwrap();

        let report = ladder
            .distribute(&mut book, ActivityKind::Swap, addr(10), 1_000)
            .unwrap();
        assert_eq!(book.balance_of(addr(11)), 0);
        assert_eq!(book.balance_of(addr(12)), 50);
        assert_eq!(book.balance_of(addr(13)), 20);
        assert_eq!(report.residual, 930);
    }

    #[test]
    fn test_pool_must_cover_distribution() {
        let (mut ladder, mut book) = ladder_with_chain();
        ladder
            .set_table(ActivityKind::Swap, vec![1_000])
            .unwrap();
        let err = ladder
            .distribute(&mut book, ActivityKind::Swap, addr(10), 2_000_000)
            .unwrap_err();
        assert!(matches!(err, arbor_core::ArborError::InsufficientBalance { .. }));
    }

    #[test]
    fn test_zero_amount_is_noop() {
        let (ladder, mut book) = ladder_with_chain();
        let before = book.balance_of(addr(POOL));
        let report = ladder
            .distribute(&mut book, ActivityKind::TokenTransfer, addr(10), 0)
            .unwrap();
        assert_eq!(report.residual, 0);
        assert_eq!(book.balance_of(addr(POOL)), before);
    }
}
