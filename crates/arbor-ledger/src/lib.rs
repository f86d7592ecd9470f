//! # Arbor Ledger
//!
//! Balance accounting for every asset in the ecosystem, plus the taxed
//! ARBR token itself.
//!
//! - [`BalanceBook`] - one ledger per asset (ARBR, stable coin, native
//!   coin, LP token): balances, allowances, supply
//! - [`TaxConfig`] - six lockable transfer-tax channels in basis points
//! - [`TaxedToken`] - the ARBR book wrapped with tax assessment, fee
//!   exemptions and per-channel share routing
//!
//! The book owns its asset's state exclusively; other components move
//! value only through its transfer calls.

pub mod book;
pub mod tax;
pub mod token;

pub use book::BalanceBook;
pub use tax::{TaxBreakdown, TaxChannel, TaxChannelKind, TaxConfig};
pub use token::{RoutedShare, TaxRecipients, TaxedToken, TransferOutcome, UnroutedShare};
