//! AMM router seam
//!
//! The decentralized exchange is an external collaborator. This trait is
//! the whole surface Arbor consumes from it; the engine is generic over
//! the implementation and the workspace ships only test doubles.

use arbor_core::{Address, Amount, Result};
use arbor_ledger::BalanceBook;

/// Black-box AMM router.
///
/// Implementations move value between the two asset books handed to
/// them: the input amount leaves `from` in `token_in`, the output is
/// credited to `to` in `token_out`. A swap MUST fail - without partial
/// effects - if the output would undercut `min_out`; that contract is
/// what lets the bridge treat router errors as clean rejections.
pub trait AmmRouter {
    /// Quoted output for an exact input on the pair identified by the
    /// two books
    fn get_amounts_out(
        &self,
        token_in: &BalanceBook,
        token_out: &BalanceBook,
        amount_in: Amount,
    ) -> Result<Amount>;

    /// Current pool reserves for the pair, (in-asset, out-asset)
    fn get_reserves(&self, token_in: &BalanceBook, token_out: &BalanceBook) -> (Amount, Amount);

    /// Execute an exact-input swap
    #[allow(clippy::too_many_arguments)]
    fn swap_exact_tokens_for_tokens(
        &mut self,
        token_in: &mut BalanceBook,
        token_out: &mut BalanceBook,
        amount_in: Amount,
        min_out: Amount,
        from: Address,
        to: Address,
    ) -> Result<Amount>;
}
