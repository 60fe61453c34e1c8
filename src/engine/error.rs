//! Auction errors.

use std::fmt;

use thiserror::Error;

use crate::amm::AmmError;
use crate::math::MathError;
use crate::types::{Address, PoolId, Shortfall};

/// Why a migration was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationBlocker {
    AuctionNotEnded { now: u64, ending_time: u64 },
    InsufficientProceeds { proceeds: u128, minimum: u128 },
    AlreadyMigrated,
}

impl fmt::Display for MigrationBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationBlocker::AuctionNotEnded { now, ending_time } => {
                write!(f, "auction ends at {}, now is {}", ending_time, now)
            }
            MigrationBlocker::InsufficientProceeds { proceeds, minimum } => {
                write!(f, "proceeds {} below minimum {}", proceeds, minimum)
            }
            MigrationBlocker::AlreadyMigrated => write!(f, "already migrated"),
        }
    }
}

/// Every way an auction call can fail. A failed call leaves no effects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuctionError {
    // ========================================================================
    // Configuration
    // ========================================================================
    #[error("invalid tick range: starting {starting_tick}, ending {ending_tick} (asset is token0: {is_token0})")]
    InvalidTickRange {
        starting_tick: i32,
        ending_tick: i32,
        is_token0: bool,
    },

    #[error("gamma {gamma} must be positive and a multiple of tick spacing {tick_spacing}")]
    InvalidGamma { gamma: i32, tick_spacing: i32 },

    #[error("tick range {tick_delta} is not a multiple of gamma {gamma} over {total_epochs} epochs")]
    InvalidGammaRange {
        tick_delta: i64,
        gamma: i32,
        total_epochs: u64,
    },

    #[error("epoch length {epoch_length} does not evenly divide duration {duration}")]
    InvalidEpochLength { epoch_length: u64, duration: u64 },

    #[error("starting time {starting_time} is not before ending time {ending_time}")]
    InvalidTimeRange { starting_time: u64, ending_time: u64 },

    #[error("starting time {starting_time} is before creation time {creation_time}")]
    StartTimeBeforeCreation { starting_time: u64, creation_time: u64 },

    #[error("tick spacing {tick_spacing} is outside 1..={max}")]
    InvalidTickSpacing { tick_spacing: i32, max: i32 },

    #[error("{count} price discovery slugs is outside 1..={max}")]
    InvalidNumPriceDiscoverySlugs { count: usize, max: usize },

    #[error("minimum proceeds {minimum} exceed maximum proceeds {maximum}")]
    InvalidProceedsLimits { minimum: u128, maximum: u128 },

    #[error("number of tokens to sell must be positive")]
    InvalidNumTokensToSell,

    // ========================================================================
    // Authorization
    // ========================================================================
    #[error("caller {caller} is not authorized (expected {expected})")]
    Unauthorized { caller: Address, expected: Address },

    // ========================================================================
    // Timing
    // ========================================================================
    #[error("cannot swap at {now}, auction starts at {starting_time}")]
    CannotSwapBeforeStartTime { now: u64, starting_time: u64 },

    #[error("auction ended with proceeds {proceeds} below minimum {minimum}; only sells are allowed")]
    InvalidSwapAfterMaturityInsufficientProceeds { proceeds: u128, minimum: u128 },

    #[error("auction ended with proceeds {proceeds} reaching minimum {minimum}; swaps are closed")]
    InvalidSwapAfterMaturitySufficientProceeds { proceeds: u128, minimum: u128 },

    // ========================================================================
    // Market bounds
    // ========================================================================
    #[error("swap moved the price to tick {tick}, below the auction floor {floor_tick}")]
    SwapBelowRange { tick: i32, floor_tick: i32 },

    #[error("proceeds {proceeds} exceed maximum {maximum}")]
    MaximumProceedsReached { proceeds: u128, maximum: u128 },

    // ========================================================================
    // Lifecycle
    // ========================================================================
    #[error("an auction already exists for pool {0}")]
    AlreadyInitialized(PoolId),

    #[error("no auction for pool {0}")]
    UnknownPool(PoolId),

    #[error("cannot migrate: {0}")]
    CannotMigrate(MigrationBlocker),

    // ========================================================================
    // Internal
    // ========================================================================
    #[error("auction holds {available}, needs {needed} (currency0: {currency0})")]
    InsufficientReserves {
        currency0: bool,
        needed: u128,
        available: u128,
    },

    #[error("arithmetic overflow")]
    MathOverflow,

    #[error("state serialization failed: {0}")]
    Serialization(String),

    #[error("pool manager: {0}")]
    Amm(#[from] AmmError),
}

impl From<MathError> for AuctionError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::Overflow => AuctionError::MathOverflow,
            other => AuctionError::Amm(AmmError::Math(other)),
        }
    }
}

impl From<Shortfall> for AuctionError {
    fn from(shortfall: Shortfall) -> Self {
        AuctionError::InsufficientReserves {
            currency0: shortfall.currency0,
            needed: shortfall.needed,
            available: shortfall.available,
        }
    }
}

impl From<ssz_rs::SerializeError> for AuctionError {
    fn from(err: ssz_rs::SerializeError) -> Self {
        AuctionError::Serialization(format!("{:?}", err))
    }
}
