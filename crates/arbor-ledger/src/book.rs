//! BalanceBook - per-asset balance and allowance ledger
//!
//! One book exists per asset. The book owns balances and total supply;
//! every debit is checked, every credit saturates (a credit can never
//! overflow while the supply invariant holds, since the sum of balances
//! never exceeds total supply).

use arbor_core::{Address, Amount, ArborError, Result};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Balance ledger for a single asset
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BalanceBook {
    /// Asset symbol, for logs and errors
    symbol: String,

    /// Account balances
    balances: HashMap<Address, Amount>,

    /// Delegated-spend approvals: (owner, spender) -> remaining
    allowances: HashMap<(Address, Address), Amount>,

    /// Circulating supply (mint increases, burn decreases)
    total_supply: Amount,

    /// Cumulative amount burned
    total_burned: Amount,
}

impl BalanceBook {
    /// Create an empty book for an asset
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: 0,
            total_burned: 0,
        }
    }

    /// Asset symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Balance of an account (zero if unknown)
    pub fn balance_of(&self, account: Address) -> Amount {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    /// Circulating supply
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Cumulative burned amount
    pub fn total_burned(&self) -> Amount {
        self.total_burned
    }

    /// Number of accounts with a recorded balance
    pub fn holder_count(&self) -> usize {
        self.balances.values().filter(|b| **b > 0).count()
    }

    /// Mint new supply to an account. Bootstrap and admin paths only;
    /// authorization is enforced by the caller.
    pub fn mint(&mut self, to: Address, amount: Amount) -> Result<()> {
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(ArborError::AmountOverflow)?;
        self.total_supply = new_supply;
        self.credit(to, amount);
        tracing::debug!(asset = %self.symbol, %to, amount, "minted");
        Ok(())
    }

    /// Burn from an account, reducing circulating supply
    pub fn burn(&mut self, from: Address, amount: Amount) -> Result<()> {
        self.debit(from, amount)?;
        self.retire(amount);
        Ok(())
    }

    /// Retire already-debited value from circulation.
    ///
    /// Pairs with a prior `debit` whose amount was not re-credited; the
    /// taxed token uses this for the burn share of a transfer.
    pub fn retire(&mut self, amount: Amount) {
        self.total_supply = self.total_supply.saturating_sub(amount);
        self.total_burned = self.total_burned.saturating_add(amount);
    }

    /// Credit an account. Saturating: cannot overflow while the supply
    /// invariant holds.
    pub fn credit(&mut self, to: Address, amount: Amount) {
        let balance = self.balances.entry(to).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Debit an account, failing if the balance does not cover it
    pub fn debit(&mut self, from: Address, amount: Amount) -> Result<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(ArborError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        self.balances.insert(from, available - amount);
        Ok(())
    }

    /// Move value between accounts with no tax applied
    pub fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<()> {
        self.debit(from, amount)?;
        self.credit(to, amount);
        Ok(())
    }

    /// Approve a spender for delegated transfers (overwrites)
    pub fn approve(&mut self, owner: Address, spender: Address, amount: Amount) {
        if amount == 0 {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
    }

    /// Remaining allowance of a spender over an owner's balance
    pub fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    /// Spend part of an allowance without moving funds.
    ///
    /// Callers combine this with their own movement logic; both checks
    /// (balance and allowance) must pass before either side mutates.
    pub fn spend_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<()> {
        let approved = self.allowance(owner, spender);
        if approved < amount {
            return Err(ArborError::InsufficientAllowance {
                required: amount,
                approved,
            });
        }
        self.approve(owner, spender, approved - amount);
        Ok(())
    }

    /// Delegated transfer: spender moves owner funds within the allowance
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        // Validate both preconditions before mutating either side.
        let available = self.balance_of(from);
        if available < amount {
            return Err(ArborError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        self.spend_allowance(from, spender, amount)?;
        self.balances.insert(from, available - amount);
        self.credit(to, amount);
        Ok(())
    }

    /// Whether the sum of balances matches circulating supply.
    ///
    /// Cheap enough to assert in tests after every operation.
    pub fn reconciles(&self) -> bool {
        let sum: Amount = self.balances.values().fold(0, |acc, b| acc.saturating_add(*b));
        sum == self.total_supply
    }
}
