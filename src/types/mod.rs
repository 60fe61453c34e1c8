//! Core data types for the auction engine
//!
//! Snapshot and receipt types implement SSZ serialization for deterministic
//! encoding. Token amounts are atomic `u128` units; prices are Q64.96 sqrt
//! prices or AMM ticks.
//!
//! ## Types
//!
//! - [`AuctionConfig`]: Immutable auction parameters
//! - [`AuctionState`]: Mutable accounting state (with [`StateSnapshot`])
//! - [`Slug`] / [`SlugSet`]: Liquidity ranges placed by the auction
//! - [`PoolKey`] / [`PoolId`]: Pool identity
//! - [`BalanceDelta`]: Signed token movement of one pool operation
//! - [`MigrationReceipt`]: Settlement summary

mod config;
mod pool;
mod receipt;
mod slug;
mod state;
pub mod price;

// Re-export all types at module level
pub use config::{AuctionConfig, TickOrientation, MAX_PRICE_DISCOVERY_SLUGS, MAX_TICK_SPACING, WAD};
pub use pool::{Address, BalanceDelta, PoolId, PoolKey, Shortfall, TokenAmounts};
pub use receipt::MigrationReceipt;
pub use slug::{Slug, SlugKind, SlugSet};
pub use state::{AuctionState, StateSnapshot};
