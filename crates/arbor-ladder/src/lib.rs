//! # Arbor Ladder
//!
//! The referral subsystem: a sponsor tree built at license registration
//! time, and per-activity percentage tables that split fee shares upward
//! through a bounded number of ancestor levels.
//!
//! The tree is an arena of immutable back-references - a sponsor must
//! already exist (or be the designated root) before a new account can
//! register, so the graph is acyclic by construction. Earning depth per
//! account is granted by the license manager when a license activates.

pub mod ladder;
pub mod tables;
pub mod tree;

pub use ladder::{DistributionReport, LevelPayout, ReferralLadder};
pub use tables::ActivityTables;
pub use tree::{SponsorLink, SponsorTree};
