//! Staking farm state and operations
//!
//! Stake moves into a custody account; rewards pay out of a separate
//! reward reserve that distributors fund before notifying. The global
//! accumulator settles at the top of every mutating call so no reward
//! second is ever counted twice across a rate change.

use arbor_core::math::mul_div_floor;
use arbor_core::{Address, Amount, ArborError, Result};
use arbor_ledger::BalanceBook;
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

/// Fixed-point scale for reward-per-token figures
pub const REWARD_PRECISION: u128 = 1_000_000_000_000_000_000;

/// Default reward period length: one week
pub const DEFAULT_REWARDS_DURATION: u64 = 7 * 24 * 3600;

/// Per-staker accounting record
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakerPosition {
    /// Staked balance held in farm custody
    pub balance: Amount,
    /// Accrued but unclaimed reward
    pub rewards: Amount,
    /// Accumulator checkpoint at last interaction (1e18-scaled)
    pub reward_per_token_paid: u128,
    /// Ledger time of last interaction
    pub last_updated: u64,
}

/// The staking farm
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StakingFarm {
    /// Administrative owner (distributor list, duration changes)
    owner: Address,
    /// Account staked tokens sit in
    custody: Address,
    /// Account rewards pay out of
    reward_reserve: Address,
    /// Accounts allowed to inject reward funding
    distributors: HashSet<Address>,

    positions: HashMap<Address, StakerPosition>,
    total_staked: Amount,

    reward_rate: Amount,
    rewards_duration: u64,
    period_finish: u64,
    last_update: u64,
    reward_per_token_stored: u128,
}

impl StakingFarm {
    /// Create a farm with an empty distributor list
    pub fn new(
        owner: Address,
        custody: Address,
        reward_reserve: Address,
        rewards_duration: u64,
    ) -> Self {
        Self {
            owner,
            custody,
            reward_reserve,
            distributors: HashSet::new(),
            positions: HashMap::new(),
            total_staked: 0,
            reward_rate: 0,
            rewards_duration: rewards_duration.max(1),
            period_finish: 0,
            last_update: 0,
            reward_per_token_stored: 0,
        }
    }

    /// Custody account
    pub fn custody(&self) -> Address {
        self.custody
    }

    /// Reward reserve account
    pub fn reward_reserve(&self) -> Address {
        self.reward_reserve
    }

    /// Total ARBR staked
    pub fn total_staked(&self) -> Amount {
        self.total_staked
    }

    /// Current emission rate (tokens per second)
    pub fn reward_rate(&self) -> Amount {
        self.reward_rate
    }

    /// End of the current reward period
    pub fn period_finish(&self) -> u64 {
        self.period_finish
    }

    /// Number of accounts with a position record
    pub fn staker_count(&self) -> usize {
        self.positions.len()
    }

    /// Position snapshot (zeroed record for unknown accounts)
    pub fn position_of(&self, account: Address) -> StakerPosition {
        self.positions.get(&account).copied().unwrap_or_default()
    }

    /// Whether an account may notify reward amounts
    pub fn is_distributor(&self, account: Address) -> bool {
        self.distributors.contains(&account)
    }

    /// Allow an account to inject reward funding (owner only)
    pub fn add_distributor(&mut self, caller: Address, account: Address) -> Result<()> {
        if caller != self.owner {
            return Err(ArborError::Unauthorized(caller));
        }
        self.distributors.insert(account);
        tracing::info!(%account, "distributor added");
        Ok(())
    }

    /// Remove an account from the distributor list (owner only)
    pub fn remove_distributor(&mut self, caller: Address, account: Address) -> Result<()> {
        if caller != self.owner {
            return Err(ArborError::Unauthorized(caller));
        }
        self.distributors.remove(&account);
        Ok(())
    }

    /// Last timestamp rewards apply at
    fn last_time_reward_applicable(&self, now: u64) -> u64 {
        now.min(self.period_finish)
    }

    /// Current reward-per-token figure (1e18-scaled), without mutating
    pub fn reward_per_token(&self, now: u64) -> u128 {
        if self.total_staked == 0 {
            return self.reward_per_token_stored;
        }
        let elapsed = self
            .last_time_reward_applicable(now)
            .saturating_sub(self.last_update) as u128;
        let accrued = elapsed.saturating_mul(self.reward_rate);
        self.reward_per_token_stored
            .saturating_add(mul_div_floor(accrued, REWARD_PRECISION, self.total_staked))
    }

    /// Claimable reward for an account at `now`
    pub fn earned(&self, account: Address, now: u64) -> Amount {
        let position = self.position_of(account);
        let delta = self
            .reward_per_token(now)
            .saturating_sub(position.reward_per_token_paid);
        position
            .rewards
            .saturating_add(mul_div_floor(position.balance, delta, REWARD_PRECISION))
    }

    /// Settle the global accumulator up to `now`
    fn settle(&mut self, now: u64) {
        self.reward_per_token_stored = self.reward_per_token(now);
        self.last_update = self.last_time_reward_applicable(now);
    }

    /// Settle and checkpoint one account
    fn update_account(&mut self, account: Address, now: u64) {
        self.settle(now);
        let earned = self.earned(account, now);
        let stored = self.reward_per_token_stored;
        let position = self.positions.entry(account).or_default();
        position.rewards = earned;
        position.reward_per_token_paid = stored;
        position.last_updated = now;
    }

    /// Stake ARBR into farm custody
    pub fn stake(
        &mut self,
        book: &mut BalanceBook,
        account: Address,
        amount: Amount,
        now: u64,
    ) -> Result<()> {
        if amount == 0 {
            return Err(ArborError::InvalidAmount("cannot stake zero"));
        }
        let available = book.balance_of(account);
        if available < amount {
            return Err(ArborError::InsufficientBalance {
                required: amount,
                available,
            });
        }

        self.update_account(account, now);
        // Cannot fail: balance checked above.
        let _ = book.transfer(account, self.custody, amount);

        self.total_staked = self.total_staked.saturating_add(amount);
        let position = self.positions.entry(account).or_default();
        position.balance = position.balance.saturating_add(amount);

        tracing::info!(%account, amount, total = self.total_staked, "staked");
        Ok(())
    }

    /// Withdraw staked ARBR back to the account
    pub fn withdraw(
        &mut self,
        book: &mut BalanceBook,
        account: Address,
        amount: Amount,
        now: u64,
    ) -> Result<()> {
        if amount == 0 {
            return Err(ArborError::InvalidAmount("cannot withdraw zero"));
        }
        let staked = self.position_of(account).balance;
        if staked < amount {
            return Err(ArborError::InsufficientStake {
                required: amount,
                staked,
            });
        }

        self.update_account(account, now);
        let _ = book.transfer(self.custody, account, amount);

        self.total_staked = self.total_staked.saturating_sub(amount);
        let position = self.positions.entry(account).or_default();
        position.balance = position.balance.saturating_sub(amount);

        tracing::info!(%account, amount, total = self.total_staked, "withdrawn");
        Ok(())
    }

    /// Pay out the account's accrued reward from the reserve
    pub fn claim(
        &mut self,
        book: &mut BalanceBook,
        account: Address,
        now: u64,
    ) -> Result<Amount> {
        self.update_account(account, now);

        let reward = self.position_of(account).rewards;
        if reward == 0 {
            return Err(ArborError::NothingToClaim(account));
        }
        book.transfer(self.reward_reserve, account, reward)?;

        if let Some(position) = self.positions.get_mut(&account) {
            position.rewards = 0;
        }
        tracing::info!(%account, reward, "reward claimed");
        Ok(reward)
    }

    /// Withdraw everything and claim whatever reward has accrued
    pub fn exit(&mut self, book: &mut BalanceBook, account: Address, now: u64) -> Result<Amount> {
        let staked = self.position_of(account).balance;
        if staked > 0 {
            self.withdraw(book, account, staked, now)?;
        }
        match self.claim(book, account, now) {
            Ok(reward) => Ok(reward),
            Err(ArborError::NothingToClaim(_)) => Ok(0),
            Err(e) => Err(e),
        }
    }

    /// Fold new funding into the reward rate and restart the period.
    ///
    /// Only allow-listed distributors may call this, and the reserve
    /// account must already hold enough to cover the whole new period.
    pub fn notify_reward_amount(
        &mut self,
        book: &BalanceBook,
        caller: Address,
        amount: Amount,
        now: u64,
    ) -> Result<()> {
        if !self.is_distributor(caller) {
            return Err(ArborError::Unauthorized(caller));
        }
        if amount == 0 {
            return Err(ArborError::InvalidAmount("cannot notify zero reward"));
        }

        // Force a settlement boundary so no reward time is double-counted
        // across the rate change. Computed before validation, committed
        // only on success.
        let settled_rpt = self.reward_per_token(now);

        let leftover = if now < self.period_finish {
            (self.period_finish - now) as Amount * self.reward_rate
        } else {
            0
        };
        let new_rate = amount.saturating_add(leftover) / self.rewards_duration as Amount;
        if new_rate == 0 {
            return Err(ArborError::InvalidAmount("reward too small for duration"));
        }

        let required = new_rate.saturating_mul(self.rewards_duration as Amount);
        let available = book.balance_of(self.reward_reserve);
        if available < required {
            return Err(ArborError::InsufficientRewardReserve { required, available });
        }

        self.reward_per_token_stored = settled_rpt;
        self.reward_rate = new_rate;
        self.last_update = now;
        self.period_finish = now + self.rewards_duration;

        tracing::info!(
            %caller,
            amount,
            leftover,
            rate = new_rate,
            period_finish = self.period_finish,
            "reward notified"
        );
        Ok(())
    }

    /// Change the period length (owner only, between periods)
    pub fn set_rewards_duration(&mut self, caller: Address, duration: u64, now: u64) -> Result<()> {
        if caller != self.owner {
            return Err(ArborError::Unauthorized(caller));
        }
        if duration == 0 {
            return Err(ArborError::InvalidAmount("zero rewards duration"));
        }
        if now < self.period_finish {
            return Err(ArborError::RewardPeriodActive {
                remaining: self.period_finish - now,
            });
        }
        self.rewards_duration = duration;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(tag: u8) -> Address {
        Address::from_tag(tag)
    }

    const OWNER: u8 = 0xF0;
    const CUSTODY: u8 = 0xF1;
    const RESERVE: u8 = 0xF2;
    const DIST: u8 = 0xF3;

    fn setup(reward_funding: Amount) -> (StakingFarm, BalanceBook) {
        let mut farm = StakingFarm::new(
            addr(OWNER),
            addr(CUSTODY),
            addr(RESERVE),
            1_000, // short period for test arithmetic
        );
        farm.add_distributor(addr(OWNER), addr(DIST)).unwrap();

        let mut book = BalanceBook::new("ARBR");
        book.mint(addr(1), 1_000_000).unwrap();
        book.mint(addr(2), 1_000_000).unwrap();
        book.mint(addr(RESERVE), reward_funding).unwrap();
        (farm, book)
    }

    #[test]
    fn test_stake_and_withdraw() {
        let (mut farm, mut book) = setup(0);
        farm.stake(&mut book, addr(1), 500, 0).unwrap();
        assert_eq!(farm.total_staked(), 500);
        assert_eq!(book.balance_of(addr(CUSTODY)), 500);

        farm.withdraw(&mut book, addr(1), 200, 10).unwrap();
        assert_eq!(farm.total_staked(), 300);
        assert_eq!(book.balance_of(addr(1)), 1_000_000 - 300);

        let err = farm.withdraw(&mut book, addr(1), 301, 20).unwrap_err();
        assert!(matches!(err, ArborError::InsufficientStake { .. }));
    }

    #[test]
    fn test_single_staker_collects_full_rate() {
        let (mut farm, mut book) = setup(100_000);
        farm.stake(&mut book, addr(1), 1_000, 0).unwrap();
        farm.notify_reward_amount(&book, addr(DIST), 100_000, 0).unwrap();
        // rate = 100 per second over 1000s

        assert_eq!(farm.earned(addr(1), 500), 50_000);
        let paid = farm.claim(&mut book, addr(1), 500).unwrap();
        assert_eq!(paid, 50_000);
        assert_eq!(book.balance_of(addr(1)), 1_000_000 - 1_000 + 50_000);

        // Accrual past period_finish stops
        assert_eq!(farm.earned(addr(1), 5_000), 50_000);
    }

    #[test]
    fn test_two_stakers_split_proportionally() {
        let (mut farm, mut book) = setup(100_000);
        farm.stake(&mut book, addr(1), 300, 0).unwrap();
        farm.stake(&mut book, addr(2), 700, 0).unwrap();
        farm.notify_reward_amount(&book, addr(DIST), 100_000, 0).unwrap();

        assert_eq!(farm.earned(addr(1), 1_000), 30_000);
        assert_eq!(farm.earned(addr(2), 1_000), 70_000);
    }

    #[test]
    fn test_notify_then_immediate_claim_pays_nothing() {
        let (mut farm, mut book) = setup(100_000);
        farm.stake(&mut book, addr(1), 1_000, 0).unwrap();
        farm.notify_reward_amount(&book, addr(DIST), 100_000, 0).unwrap();

        // Zero elapsed time: nothing accrued yet
        let err = farm.claim(&mut book, addr(1), 0).unwrap_err();
        assert!(matches!(err, ArborError::NothingToClaim(_)));
    }

    #[test]
    fn test_accrual_is_monotonic() {
        let (mut farm, mut book) = setup(100_000);
        farm.stake(&mut book, addr(1), 777, 0).unwrap();
        farm.notify_reward_amount(&book, addr(DIST), 100_000, 0).unwrap();

        let mut last = 0;
        for now in (0..=1_200).step_by(100) {
            let earned = farm.earned(addr(1), now);
            assert!(earned >= last);
            last = earned;
        }
    }

    #[test]
    fn test_accumulator_frozen_with_no_stakers() {
        let (mut farm, mut book) = setup(100_000);
        farm.notify_reward_amount(&book, addr(DIST), 100_000, 0).unwrap();

        // Nobody staked for 500s; the accumulator must not advance
        farm.stake(&mut book, addr(1), 1_000, 500).unwrap();
        assert_eq!(farm.earned(addr(1), 500), 0);
        // Remaining 500s of the period accrue normally
        assert_eq!(farm.earned(addr(1), 1_000), 50_000);
    }

    #[test]
    fn test_notify_requires_distributor() {
        let (mut farm, book) = setup(100_000);
        let err = farm
            .notify_reward_amount(&book, addr(9), 100_000, 0)
            .unwrap_err();
        assert!(matches!(err, ArborError::Unauthorized(_)));
    }

    #[test]
    fn test_notify_requires_funded_reserve() {
        let (mut farm, book) = setup(10); // nearly empty reserve
        let err = farm
            .notify_reward_amount(&book, addr(DIST), 100_000, 0)
            .unwrap_err();
        assert!(matches!(err, ArborError::InsufficientRewardReserve { .. }));
    }

    #[test]
    fn test_notify_folds_leftover_into_rate() {
        let (mut farm, mut book) = setup(300_000);
        farm.stake(&mut book, addr(1), 1_000, 0).unwrap();
        farm.notify_reward_amount(&book, addr(DIST), 100_000, 0).unwrap();
        assert_eq!(farm.reward_rate(), 100);

        // Halfway through, add another 150k: leftover 50k folds in
        farm.notify_reward_amount(&book, addr(DIST), 150_000, 500).unwrap();
        assert_eq!(farm.reward_rate(), 200);
        assert_eq!(farm.period_finish(), 1_500);

        // First half accrued at the old rate
        assert_eq!(farm.earned(addr(1), 500), 50_000);
    }

    #[test]
    fn test_set_rewards_duration_blocked_mid_period() {
        let (mut farm, mut book) = setup(100_000);
        farm.stake(&mut book, addr(1), 1_000, 0).unwrap();
        farm.notify_reward_amount(&book, addr(DIST), 100_000, 0).unwrap();

        let err = farm.set_rewards_duration(addr(OWNER), 2_000, 500).unwrap_err();
        assert!(matches!(err, ArborError::RewardPeriodActive { .. }));
        farm.set_rewards_duration(addr(OWNER), 2_000, 1_001).unwrap();
    }

    #[test]
    fn test_exit_returns_stake_and_rewards() {
        let (mut farm, mut book) = setup(100_000);
        farm.stake(&mut book, addr(1), 1_000, 0).unwrap();
        farm.notify_reward_amount(&book, addr(DIST), 100_000, 0).unwrap();

        let reward = farm.exit(&mut book, addr(1), 250).unwrap();
        assert_eq!(reward, 25_000);
        assert_eq!(farm.total_staked(), 0);
        assert_eq!(book.balance_of(addr(1)), 1_000_000 + 25_000);
    }

}
