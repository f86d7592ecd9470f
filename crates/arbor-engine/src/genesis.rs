//! Genesis bootstrap
//!
//! Assembles the ecosystem from a validated configuration: books are
//! created, the genesis supply lands with the owner, system accounts
//! become fee-exempt, the tier catalog and activity tables are seeded,
//! and the owner joins the farm's distributor list. The wiring order
//! mirrors the production deployment sequence.

use crate::config::EcosystemConfig;
use crate::engine::Ecosystem;
use crate::metrics::EcosystemMetrics;
use arbor_core::{ArborError, LedgerClock, Result};
use arbor_farm::StakingFarm;
use arbor_ladder::ReferralLadder;
use arbor_ledger::{BalanceBook, TaxRecipients, TaxedToken};
use arbor_license::LicenseManager;
use arbor_treasury::{AmmRouter, SwapBridge, TreasuryPool};

/// Build a fully wired ecosystem.
///
/// `router` is the external AMM collaborator; `clock` seeds ledger time
/// (use [`LedgerClock::from_system_time`] outside of tests).
pub fn bootstrap<R: AmmRouter>(
    config: &EcosystemConfig,
    router: R,
    clock: LedgerClock,
) -> Result<Ecosystem<R>> {
    config.validate()?;
    let accounts = config.accounts;

    let recipients = TaxRecipients {
        liquidity: Some(accounts.liquidity()),
        treasury: Some(accounts.treasury()),
        achievement: Some(accounts.achievement()),
        farming: Some(accounts.farm_rewards()),
        referral: Some(accounts.ladder_pool()),
    };

    let mut token = TaxedToken::new(
        config.token.symbol.clone(),
        config.token.tax,
        recipients,
        config.token.unrouted,
    );
    token.mint(accounts.owner(), config.token.genesis_supply_units())?;
    for account in accounts.system_accounts() {
        token.exclude_from_fee(account, true);
    }
    // The owner seeds liquidity and distributes the launch float untaxed.
    token.exclude_from_fee(accounts.owner(), true);

    let stable = BalanceBook::new(config.assets.stable_symbol.clone());
    let native = BalanceBook::new(config.assets.native_symbol.clone());
    let lp = BalanceBook::new(config.assets.lp_symbol.clone());

    let mut farm = StakingFarm::new(
        accounts.owner(),
        accounts.farm_custody(),
        accounts.farm_rewards(),
        config.farm.rewards_duration,
    );
    farm.add_distributor(accounts.owner(), accounts.owner())?;

    let mut ladder = ReferralLadder::new(
        accounts.owner(),
        accounts.ladder_pool(),
        accounts.treasury(),
    );
    ladder.seed_default_tables();

    let mut licenses = LicenseManager::new(
        accounts.owner(),
        accounts.license_custody(),
        accounts.treasury(),
        accounts.achievement(),
        config.license.split,
        config.license.liquidation_penalty_bps,
        config.license.extension_fee_units(),
    );
    licenses.seed_catalog();

    let treasury = TreasuryPool::new(accounts.treasury());
    let bridge = SwapBridge::new(accounts.bridge());

    let metrics = EcosystemMetrics::new()
        .map_err(|e| ArborError::Config(format!("metrics registration: {e}")))?;

    tracing::info!(
        symbol = %config.token.symbol,
        supply = config.token.genesis_supply,
        owner = %accounts.owner(),
        "ecosystem bootstrapped"
    );

    Ok(Ecosystem {
        registry: accounts,
        clock,
        metrics,
        token,
        stable,
        native,
        lp,
        farm,
        ladder,
        licenses,
        treasury,
        bridge,
        router,
    })
}
