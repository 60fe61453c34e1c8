//! Auction engine.
//!
//! ## Components
//!
//! - **ConfigValidator**: rejects bad configs at creation
//! - **EpochClock**: wall-clock time to 1-based epochs
//! - **PriceTrajectoryPlanner**: moves the tick accumulator each epoch
//! - **SlugAllocator**: lays out and registers liquidity ranges
//! - **SwapGate**: admission and post-swap bounds
//! - **ProceedsLedger**: sold and proceeds totals
//! - **MigrationCoordinator**: one-shot teardown
//!
//! [`DutchAuction`] wires them together behind the [`LiquidityHook`] trait.
//!
//! ## Design Principles
//!
//! 1. **Determinism**: identical call sequences produce identical state roots
//! 2. **Integer Math**: no floating point; WAD and Q64.96 fixed point only
//! 3. **Protocol-favouring Rounding**: liquidity rounds down, fees round up

mod allocator;
mod auction;
mod epoch;
mod error;
mod gate;
mod hook;
mod ledger;
mod migration;
mod planner;
mod validator;

pub use allocator::{AllocationInputs, SlugAllocator};
pub use auction::DutchAuction;
pub use epoch::EpochClock;
pub use error::{AuctionError, MigrationBlocker};
pub use gate::{AuctionPhase, SwapDirection, SwapGate};
pub use hook::{LiquidityHook, SwapContext, SwapReport};
pub use ledger::{LedgerEntry, ProceedsLedger};
pub use migration::MigrationCoordinator;
pub use planner::{PriceTrajectoryPlanner, Trajectory};
pub use validator::ConfigValidator;
