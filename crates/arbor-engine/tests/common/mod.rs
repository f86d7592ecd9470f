//! Shared fixtures for the engine integration tests

use arbor_core::math::mul_div_floor;
use arbor_core::{Address, Amount, ArborError, LedgerClock, Result};
use arbor_engine::{bootstrap, Ecosystem, EcosystemConfig};
use arbor_ledger::BalanceBook;
use arbor_treasury::AmmRouter;

pub const ONE: Amount = arbor_core::constants::ONE_ARBR;

/// Account the stub AMM keeps its reserves in
pub const AMM_POOL: u8 = 0xEE;

pub fn addr(tag: u8) -> Address {
    Address::from_tag(tag)
}

/// Constant-product (x*y=k) AMM stub backed by a pool account in each
/// book. Quote and swap share the same formula, so a swap at an
/// unchanged pool state pays exactly its quote.
pub struct ConstantProductRouter {
    pub pool: Address,
}

impl ConstantProductRouter {
    fn quote(
        &self,
        token_in: &BalanceBook,
        token_out: &BalanceBook,
        amount_in: Amount,
    ) -> Result<Amount> {
        let reserve_in = token_in.balance_of(self.pool);
        let reserve_out = token_out.balance_of(self.pool);
        if reserve_in == 0 || reserve_out == 0 {
            return Err(ArborError::Router("insufficient liquidity".into()));
        }
        Ok(mul_div_floor(reserve_out, amount_in, reserve_in + amount_in))
    }
}

impl AmmRouter for ConstantProductRouter {
    fn get_amounts_out(
        &self,
        token_in: &BalanceBook,
        token_out: &BalanceBook,
        amount_in: Amount,
    ) -> Result<Amount> {
        self.quote(token_in, token_out, amount_in)
    }

    fn get_reserves(&self, token_in: &BalanceBook, token_out: &BalanceBook) -> (Amount, Amount) {
        (
            token_in.balance_of(self.pool),
            token_out.balance_of(self.pool),
        )
    }

    fn swap_exact_tokens_for_tokens(
        &mut self,
        token_in: &mut BalanceBook,
        token_out: &mut BalanceBook,
        amount_in: Amount,
        min_out: Amount,
        from: Address,
        to: Address,
    ) -> Result<Amount> {
        let out = self.quote(token_in, token_out, amount_in)?;
        if out < min_out {
            return Err(ArborError::Router("insufficient output amount".into()));
        }
        token_in.transfer(from, self.pool, amount_in)?;
        token_out.transfer(self.pool, to, out)?;
        Ok(out)
    }
}

/// Bootstrapped ecosystem with AMM liquidity seeded:
/// 100k ARBR / 200k AUSD in the stub pool
pub fn ecosystem_with<F>(tweak: F) -> Ecosystem<ConstantProductRouter>
where
    F: FnOnce(&mut EcosystemConfig),
{
    let mut config = EcosystemConfig::default();
    tweak(&mut config);

    let router = ConstantProductRouter { pool: addr(AMM_POOL) };
    let mut eco = bootstrap(&config, router, LedgerClock::starting_at(1_000_000)).unwrap();

    let owner = eco.registry().owner();
    eco.transfer(owner, addr(AMM_POOL), 100_000 * ONE).unwrap();
    eco.mint_stable(owner, addr(AMM_POOL), 200_000 * ONE).unwrap();
    eco
}

pub fn ecosystem() -> Ecosystem<ConstantProductRouter> {
    ecosystem_with(|_| {})
}

/// Fund an account, register it under `sponsor` and activate the tier
#[allow(dead_code)]
pub fn fund_and_license(
    eco: &mut Ecosystem<ConstantProductRouter>,
    user: Address,
    sponsor: Address,
    level: u8,
) {
    let owner = eco.registry().owner();
    let custody = eco.registry().license_custody();
    let price = eco.license_type_of(level).unwrap().price;

    eco.transfer(owner, user, price + 1_000 * ONE).unwrap();
    eco.mint_lp(owner, user, price).unwrap();
    eco.register_license(user, level, sponsor, "member", "tg:@member").unwrap();
    eco.approve(user, custody, price);
    eco.activate_license(user).unwrap();
}
