//! # Arbor License
//!
//! Time-boxed licenses that lock an LP-token stake and unlock elevated
//! privileges - most importantly the right to route swaps through the
//! bridge and to earn referral shares at depth.
//!
//! Lifecycle per account:
//!
//! ```text
//! Unregistered ──register──► Registered ──activate──► Active
//!                                               │        │ (expire_at passes)
//!                                               │        ▼
//!                                               │     Expired ──extend──► Active
//!                                               │        │
//!                                               └────────┴──liquidate──► Liquidated
//! ```
//!
//! `Expired` is derived from ledger time, never stored - there is no
//! coordinator to flip a flag at expiry. Records are never deleted;
//! status transitions only.

pub mod catalog;
pub mod manager;

pub use catalog::{LicenseTier, TierCatalog};
pub use manager::{ActivationSplit, License, LicenseManager, LicenseStatus, LP_STAKE_DIVISOR};
