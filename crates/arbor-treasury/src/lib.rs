//! # Arbor Treasury
//!
//! Two small pieces sit in this crate:
//!
//! - [`TreasuryPool`] - the passive backing reserve that tax shares,
//!   ladder residuals and penalties accumulate in, plus display-only
//!   tracking of externally-reported AMM pair reserves
//! - [`SwapBridge`] - the restricted pass-through in front of the
//!   external AMM router; only accounts with an active license (or an
//!   explicit exemption) may convert ARBR out through it
//!
//! The AMM itself is a black box behind the [`AmmRouter`] trait; this
//! workspace ships no production implementation.

pub mod bridge;
pub mod pool;
pub mod router;

pub use bridge::SwapBridge;
pub use pool::{PairReserves, TreasuryPool};
pub use router::AmmRouter;
