//! # Arbor Farm
//!
//! Staking rewards over ARBR, accounted with a reward-per-token
//! accumulator so payouts never require iterating the staker set.
//!
//! ```text
//! reward_per_token(t) = stored + (min(t, period_finish) - last_update)
//!                                * reward_rate * 1e18 / total_staked
//! earned(a)           = balance(a) * (rpt - paid(a)) / 1e18 + rewards(a)
//! ```
//!
//! The accumulator settles at the top of every mutating call; all rate
//! math is 1e18 fixed point with truncating division, so rounding always
//! favours the reward reserve.

pub mod farm;

pub use farm::{StakerPosition, StakingFarm, DEFAULT_REWARDS_DURATION, REWARD_PRECISION};
