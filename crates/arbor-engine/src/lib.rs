//! # Arbor Engine
//!
//! Composition root of the Arbor economic core. The engine wires the
//! token ledger, referral ladder, staking farm, license manager and
//! treasury/bridge together behind one operation façade, with an
//! explicit ledger clock and a prometheus metrics bundle.
//!
//! ## Quick start
//!
//! ```no_run
//! use arbor_engine::{bootstrap, EcosystemConfig};
//! use arbor_core::LedgerClock;
//! # use arbor_core::{Address, Amount, Result};
//! # use arbor_ledger::BalanceBook;
//! # struct MyRouter;
//! # impl arbor_treasury::AmmRouter for MyRouter {
//! #     fn get_amounts_out(&self, _: &BalanceBook, _: &BalanceBook, a: Amount) -> Result<Amount> { Ok(a) }
//! #     fn get_reserves(&self, _: &BalanceBook, _: &BalanceBook) -> (Amount, Amount) { (0, 0) }
//! #     fn swap_exact_tokens_for_tokens(&mut self, _: &mut BalanceBook, _: &mut BalanceBook, a: Amount, _: Amount, _: Address, _: Address) -> Result<Amount> { Ok(a) }
//! # }
//!
//! let config = EcosystemConfig::default();
//! let mut eco = bootstrap(&config, MyRouter, LedgerClock::from_system_time())?;
//! let owner = eco.registry().owner();
//! eco.transfer(owner, Address::from_tag(0x42), 1_000)?;
//! # Ok::<(), arbor_core::ArborError>(())
//! ```
//!
//! Components never resolve each other through shared mutable state;
//! every collaborator is injected at bootstrap and cross-component
//! effects run inside a single façade call.

pub mod config;
pub mod engine;
pub mod genesis;
pub mod metrics;
pub mod registry;

pub use config::{AssetSettings, EcosystemConfig, FarmSettings, LicenseSettings, TokenSettings};
pub use engine::Ecosystem;
pub use genesis::bootstrap;
pub use metrics::EcosystemMetrics;
pub use registry::CollaboratorRegistry;

use arbor_treasury::AmmRouter;
use std::sync::Arc;

/// Shared-ownership handle for embedders that drive the engine from
/// several threads; calls remain one-at-a-time under the lock
pub type EcosystemHandle<R> = Arc<parking_lot::RwLock<Ecosystem<R>>>;

/// Wrap an ecosystem in a shared handle
pub fn into_handle<R: AmmRouter>(eco: Ecosystem<R>) -> EcosystemHandle<R> {
    Arc::new(parking_lot::RwLock::new(eco))
}
