//! Ecosystem operation façade
//!
//! One struct owns every component and the ledger clock, and exposes the
//! public operation surface. Cross-component effects - the referral
//! share of a taxed transfer walking the ladder, license activation
//! paying through the token book - happen inside a single façade call,
//! so each external invocation commits or fails as a unit.

use crate::metrics::EcosystemMetrics;
use crate::registry::CollaboratorRegistry;
use arbor_core::{
    ActivityKind, Address, Amount, ArborError, LedgerClock, Result,
};
use arbor_farm::{StakerPosition, StakingFarm};
use arbor_ladder::ReferralLadder;
use arbor_ledger::{BalanceBook, TaxChannelKind, TaxedToken, TransferOutcome};
use arbor_license::{License, LicenseManager, LicenseTier};
use arbor_treasury::{AmmRouter, PairReserves, SwapBridge, TreasuryPool};

/// The assembled ecosystem, generic over the external AMM router
pub struct Ecosystem<R: AmmRouter> {
    pub(crate) registry: CollaboratorRegistry,
    pub(crate) clock: LedgerClock,
    pub(crate) metrics: EcosystemMetrics,

    pub(crate) token: TaxedToken,
    pub(crate) stable: BalanceBook,
    pub(crate) native: BalanceBook,
    pub(crate) lp: BalanceBook,

    pub(crate) farm: StakingFarm,
    pub(crate) ladder: ReferralLadder,
    pub(crate) licenses: LicenseManager,
    pub(crate) treasury: TreasuryPool,
    pub(crate) bridge: SwapBridge,
    pub(crate) router: R,
}

impl<R: AmmRouter> Ecosystem<R> {
    fn ensure_owner(&self, caller: Address) -> Result<()> {
        if caller != self.registry.owner() {
            return Err(ArborError::Unauthorized(caller));
        }
        Ok(())
    }

    // === Time ===

    /// Current ledger time
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Advance ledger time
    pub fn advance_time(&mut self, secs: u64) -> u64 {
        self.clock.advance(secs)
    }

    // === Read surface ===

    pub fn registry(&self) -> &CollaboratorRegistry {
        &self.registry
    }

    pub fn token(&self) -> &TaxedToken {
        &self.token
    }

    pub fn ladder(&self) -> &ReferralLadder {
        &self.ladder
    }

    pub fn farm(&self) -> &StakingFarm {
        &self.farm
    }

    pub fn licenses(&self) -> &LicenseManager {
        &self.licenses
    }

    pub fn metrics(&self) -> &EcosystemMetrics {
        &self.metrics
    }

    pub fn balance_of(&self, account: Address) -> Amount {
        self.token.balance_of(account)
    }

    pub fn total_supply(&self) -> Amount {
        self.token.total_supply()
    }

    pub fn stable_balance_of(&self, account: Address) -> Amount {
        self.stable.balance_of(account)
    }

    pub fn native_balance_of(&self, account: Address) -> Amount {
        self.native.balance_of(account)
    }

    pub fn lp_balance_of(&self, account: Address) -> Amount {
        self.lp.balance_of(account)
    }

    /// Treasury reserve in ARBR
    pub fn treasury_reserves(&self) -> Amount {
        self.treasury.reserves(self.token.book())
    }

    /// Treasury reserve in the stable asset
    pub fn treasury_stable_reserves(&self) -> Amount {
        self.treasury.reserves(&self.stable)
    }

    /// Last externally-reported reserves for an AMM pair
    pub fn pair_reserves(&self, pair: &str) -> Option<PairReserves> {
        self.treasury.pair_reserves(pair)
    }

    /// Every balance book reconciles against its supply
    pub fn check_invariants(&self) -> bool {
        self.token.book().reconciles()
            && self.stable.reconciles()
            && self.native.reconciles()
            && self.lp.reconciles()
    }

    // === Token operations ===

    /// Taxed transfer; the referral share walks the ladder in the same
    /// operation
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<TransferOutcome> {
        let outcome = self.token.transfer(from, to, amount)?;
        self.settle_transfer_side_effects(&outcome)?;
        Ok(outcome)
    }

    /// Delegated taxed transfer
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<TransferOutcome> {
        let outcome = self.token.transfer_from(spender, from, to, amount)?;
        self.settle_transfer_side_effects(&outcome)?;
        Ok(outcome)
    }

    fn settle_transfer_side_effects(&mut self, outcome: &TransferOutcome) -> Result<()> {
        // Only distribute what actually landed in the ladder pool; with
        // the referral recipient unwired the share already fell back to
        // the treasury or recipient.
        let pool = self.ladder.pool();
        let referral: Amount = outcome
            .routed
            .iter()
            .filter(|s| s.channel == TaxChannelKind::Referral && s.recipient == pool)
            .map(|s| s.amount)
            .sum();
        if referral > 0 {
            self.ladder.distribute(
                self.token.book_mut(),
                ActivityKind::TokenTransfer,
                outcome.from,
                referral,
            )?;
        }
        self.metrics.record_transfer(outcome.taxed());
        Ok(())
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: Amount) {
        self.token.approve(owner, spender, amount);
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.token.allowance(owner, spender)
    }

    /// Mint new ARBR supply (owner only; bootstrap path)
    pub fn mint(&mut self, caller: Address, to: Address, amount: Amount) -> Result<()> {
        self.ensure_owner(caller)?;
        self.token.mint(to, amount)
    }

    /// Mint stable-asset units (owner only; stands in for external
    /// issuance, which is not modeled)
    pub fn mint_stable(&mut self, caller: Address, to: Address, amount: Amount) -> Result<()> {
        self.ensure_owner(caller)?;
        self.stable.mint(to, amount)
    }

    /// Mint native-coin units (owner only; test and bootstrap path)
    pub fn mint_native(&mut self, caller: Address, to: Address, amount: Amount) -> Result<()> {
        self.ensure_owner(caller)?;
        self.native.mint(to, amount)
    }

    /// Mint LP-token units (owner only; the AMM mints these in
    /// production, which is outside this core)
    pub fn mint_lp(&mut self, caller: Address, to: Address, amount: Amount) -> Result<()> {
        self.ensure_owner(caller)?;
        self.lp.mint(to, amount)
    }

    // === Tax administration (owner only) ===

    pub fn set_tax_lock_status(
        &mut self,
        caller: Address,
        liquidity: bool,
        burn: bool,
        treasury: bool,
        achievement: bool,
        farming: bool,
        referral: bool,
    ) -> Result<()> {
        self.ensure_owner(caller)?;
        self.token
            .set_tax_lock_status(liquidity, burn, treasury, achievement, farming, referral)
    }

    pub fn set_tax_rate(
        &mut self,
        caller: Address,
        kind: TaxChannelKind,
        rate_bps: u16,
    ) -> Result<()> {
        self.ensure_owner(caller)?;
        self.token.set_tax_rate(kind, rate_bps)
    }

    pub fn exclude_from_fee(
        &mut self,
        caller: Address,
        account: Address,
        excluded: bool,
    ) -> Result<()> {
        self.ensure_owner(caller)?;
        self.token.exclude_from_fee(account, excluded);
        Ok(())
    }

    // === License operations ===

    pub fn register_license(
        &mut self,
        account: Address,
        level: u8,
        sponsor: Address,
        display_name: impl Into<String>,
        contact: impl Into<String>,
    ) -> Result<()> {
        let now = self.clock.now();
        self.licenses.register_license(
            &mut self.ladder,
            account,
            level,
            sponsor,
            display_name,
            contact,
            now,
        )
    }

    pub fn activate_license(&mut self, account: Address) -> Result<()> {
        let now = self.clock.now();
        self.licenses.activate_license(
            &mut self.token,
            &mut self.lp,
            &mut self.ladder,
            account,
            now,
        )?;
        self.metrics.record_activation();
        Ok(())
    }

    pub fn liquidate_license(&mut self, account: Address) -> Result<Amount> {
        let now = self.clock.now();
        self.licenses
            .liquidate_license(&mut self.lp, &mut self.ladder, account, now)
    }

    pub fn extend_license(&mut self, account: Address) -> Result<()> {
        let now = self.clock.now();
        self.licenses.extend_license(&mut self.native, account, now)
    }

    pub fn license_of(&self, account: Address) -> Option<&License> {
        self.licenses.license_of(account)
    }

    pub fn fetch_all_licenses(&self) -> Vec<LicenseTier> {
        self.licenses.fetch_all_licenses()
    }

    pub fn license_type_of(&self, level: u8) -> Result<&LicenseTier> {
        self.licenses.license_type_of(level)
    }

    pub fn count_of_licenses(&self) -> usize {
        self.licenses.count_of_licenses()
    }

    pub fn enabled_intermediary(&self, account: Address) -> bool {
        self.licenses.enabled_intermediary(account, self.clock.now())
    }

    pub fn upsert_tier(&mut self, caller: Address, tier: LicenseTier) -> Result<()> {
        self.licenses.upsert_tier(caller, tier)
    }

    pub fn set_exempt_intermediary(
        &mut self,
        caller: Address,
        account: Address,
        exempt: bool,
    ) -> Result<()> {
        self.licenses.set_exempt_intermediary(caller, account, exempt)
    }

    // === Farm operations ===

    pub fn stake(&mut self, account: Address, amount: Amount) -> Result<()> {
        let now = self.clock.now();
        self.farm
            .stake(self.token.book_mut(), account, amount, now)?;
        self.metrics.set_total_staked(self.farm.total_staked());
        Ok(())
    }

    pub fn withdraw(&mut self, account: Address, amount: Amount) -> Result<()> {
        let now = self.clock.now();
        self.farm
            .withdraw(self.token.book_mut(), account, amount, now)?;
        self.metrics.set_total_staked(self.farm.total_staked());
        Ok(())
    }

    pub fn claim_reward(&mut self, account: Address) -> Result<Amount> {
        let now = self.clock.now();
        let reward = self.farm.claim(self.token.book_mut(), account, now)?;
        self.metrics.record_claim(reward);
        Ok(reward)
    }

    pub fn exit_farm(&mut self, account: Address) -> Result<Amount> {
        let now = self.clock.now();
        let reward = self.farm.exit(self.token.book_mut(), account, now)?;
        self.metrics.set_total_staked(self.farm.total_staked());
        Ok(reward)
    }

    pub fn notify_reward_amount(&mut self, caller: Address, amount: Amount) -> Result<()> {
        let now = self.clock.now();
        self.farm
            .notify_reward_amount(self.token.book(), caller, amount, now)
    }

    pub fn add_distributor(&mut self, caller: Address, account: Address) -> Result<()> {
        self.farm.add_distributor(caller, account)
    }

    pub fn remove_distributor(&mut self, caller: Address, account: Address) -> Result<()> {
        self.farm.remove_distributor(caller, account)
    }

    pub fn set_rewards_duration(&mut self, caller: Address, duration: u64) -> Result<()> {
        let now = self.clock.now();
        self.farm.set_rewards_duration(caller, duration, now)
    }

    pub fn earned(&self, account: Address) -> Amount {
        self.farm.earned(account, self.clock.now())
    }

    pub fn farm_position(&self, account: Address) -> StakerPosition {
        self.farm.position_of(account)
    }

    // === Ladder administration ===

    pub fn set_ladder_table(
        &mut self,
        caller: Address,
        kind: ActivityKind,
        levels: Vec<u16>,
    ) -> Result<()> {
        self.ensure_owner(caller)?;
        self.ladder.set_table(kind, levels)
    }

    /// Re-seed the stock activity tables (owner only; overwrites)
    pub fn init_activities(&mut self, caller: Address) -> Result<()> {
        self.ensure_owner(caller)?;
        self.ladder.seed_default_tables();
        Ok(())
    }

    // === Bridge operations ===

    /// Swap an exact ARBR input for the stable asset through the
    /// external router; licensed intermediaries only
    pub fn swap_exact_tokens_for_stable(
        &mut self,
        caller: Address,
        amount_in: Amount,
        min_out: Amount,
        to: Address,
        deadline: u64,
    ) -> Result<Amount> {
        let now = self.clock.now();
        let out = self.bridge.swap_exact_tokens_supporting_fee(
            &self.licenses,
            &mut self.router,
            &mut self.token,
            &mut self.stable,
            caller,
            amount_in,
            min_out,
            to,
            deadline,
            now,
        )?;
        self.metrics.record_swap();
        Ok(out)
    }

    /// Swap an exact ARBR input for the native coin
    pub fn swap_exact_tokens_for_native(
        &mut self,
        caller: Address,
        amount_in: Amount,
        min_out: Amount,
        to: Address,
        deadline: u64,
    ) -> Result<Amount> {
        let now = self.clock.now();
        let out = self.bridge.swap_exact_tokens_supporting_fee(
            &self.licenses,
            &mut self.router,
            &mut self.token,
            &mut self.native,
            caller,
            amount_in,
            min_out,
            to,
            deadline,
            now,
        )?;
        self.metrics.record_swap();
        Ok(out)
    }

    /// Router quote for an ARBR -> stable swap
    pub fn quote_stable_out(&self, amount_in: Amount) -> Result<Amount> {
        self.router
            .get_amounts_out(self.token.book(), &self.stable, amount_in)
    }

    // === Treasury ===

    /// Record externally-reported AMM pair reserves (owner only;
    /// display and accounting, never balance-affecting)
    pub fn record_pair_reserves(
        &mut self,
        caller: Address,
        pair: &str,
        reserve0: Amount,
        reserve1: Amount,
    ) -> Result<()> {
        self.ensure_owner(caller)?;
        let now = self.clock.now();
        self.treasury.record_pair_reserves(pair, reserve0, reserve1, now);
        Ok(())
    }
}
