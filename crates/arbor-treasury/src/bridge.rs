//! Swap bridge - the licensed gateway to the external AMM
//!
//! The bridge pulls the input amount into its own custody, then hands
//! the swap to the router. Callers must hold an active license or an
//! explicit exemption. If the router rejects the swap (slippage, thin
//! reserves), the pulled tokens return to the caller so the failed call
//! leaves no partial state.

use crate::router::AmmRouter;
use arbor_core::{Address, Amount, ArborError, Result};
use arbor_ledger::{BalanceBook, TaxedToken};
use arbor_license::LicenseManager;
use serde::{Deserialize, Serialize};

/// The swap bridge
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SwapBridge {
    custody: Address,
}

impl SwapBridge {
    /// Wrap the bridge custody account
    pub fn new(custody: Address) -> Self {
        Self { custody }
    }

    /// Bridge custody account
    pub fn custody(&self) -> Address {
        self.custody
    }

    /// Swap an exact ARBR input for the out-asset, tolerating the
    /// transfer tax on the way in.
    ///
    /// `out_book` selects the path: the stable book for the
    /// token->stable pair, the native book for token->native. Everything
    /// else matches the classic fee-on-transfer router surface:
    /// `(amount_in, min_out, to, deadline)`.
    #[allow(clippy::too_many_arguments)]
    pub fn swap_exact_tokens_supporting_fee<R: AmmRouter>(
        &self,
        licenses: &LicenseManager,
        router: &mut R,
        token: &mut TaxedToken,
        out_book: &mut BalanceBook,
        caller: Address,
        amount_in: Amount,
        min_out: Amount,
        to: Address,
        deadline: u64,
        now: u64,
    ) -> Result<Amount> {
        if !licenses.enabled_intermediary(caller, now) {
            return Err(ArborError::IntermediaryNotLicensed(caller));
        }
        if now > deadline {
            return Err(ArborError::DeadlineExpired { deadline, now });
        }
        if amount_in == 0 {
            return Err(ArborError::InvalidAmount("cannot swap zero"));
        }

        // Pull the input into custody; with the custody account
        // fee-exempt this arrives whole, otherwise the swap proceeds on
        // the after-tax amount.
        let outcome = token.transfer(caller, self.custody, amount_in)?;
        let received = outcome.net;

        match router.swap_exact_tokens_for_tokens(
            token.book_mut(),
            out_book,
            received,
            min_out,
            self.custody,
            to,
        ) {
            Ok(amount_out) => {
                tracing::info!(
                    %caller,
                    amount_in,
                    received,
                    amount_out,
                    out = out_book.symbol(),
                    "bridge swap"
                );
                Ok(amount_out)
            }
            Err(e) => {
                // Unwind the pull so the failed swap commits nothing.
                // The tax already collected on the way in stays collected;
                // only the custody leg reverts.
                let _ = token.book_mut().transfer(self.custody, caller, received);
                Err(e)
            }
        }
    }
}
