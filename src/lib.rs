//! # GDA Engine
//!
//! Gradual Dutch auction liquidity engine over a concentrated-liquidity AMM.
//!
//! ## Architecture
//!
//! - **Types**: configs, state, slugs, pool identity, receipts
//! - **Math**: tick and liquidity math in Q64.96 fixed point
//! - **AMM**: the pool manager interface and an in-memory venue
//! - **Engine**: trajectory planning, slug placement, swap gating, accounting
//! - **Registry**: per-pool auction arena with all-or-nothing calls
//!
//! ## Design Principles
//!
//! 1. **Determinism**: identical call sequences give identical state roots
//! 2. **No Floating Point**: WAD (1e18) and Q64.96 integer math throughout
//! 3. **Transactional Calls**: a failed call leaves no effects
//! 4. **Synchronous Execution**: no async, no background work

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: config, state, slugs, pool identity
pub mod types;

/// Fixed-point tick and liquidity math
pub mod math;

/// Concentrated-liquidity venue interface
pub mod amm;

/// Auction engine: planner, allocator, gate, ledger, migration
pub mod engine;

/// Auction arena and transactional host
pub mod registry;

/// Simulator settings (TOML)
pub mod settings;

/// Logging bootstrap
pub mod telemetry;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use amm::{PoolManager, SimulatedPoolManager, SwapParams};
pub use engine::{AuctionError, AuctionPhase, DutchAuction, LiquidityHook};
pub use registry::{AuctionRegistry, SwapOutcome};
pub use types::{Address, AuctionConfig, AuctionState, MigrationReceipt, PoolId, PoolKey, SlugSet};
