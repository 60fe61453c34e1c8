//! Construction-time checks on [`AuctionConfig`].

use super::error::AuctionError;
use crate::math::{MAX_TICK, MIN_TICK};
use crate::types::{AuctionConfig, MAX_PRICE_DISCOVERY_SLUGS, MAX_TICK_SPACING};

/// Rejects configs that would break epoch or tick arithmetic later.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate `config` for a pool with `tick_spacing`, created at `creation_time`.
    ///
    /// Checks run in a fixed order and the first failure is returned.
    pub fn validate(config: &AuctionConfig, tick_spacing: i32, creation_time: u64) -> Result<(), AuctionError> {
        if tick_spacing <= 0 || tick_spacing > MAX_TICK_SPACING {
            return Err(AuctionError::InvalidTickSpacing {
                tick_spacing,
                max: MAX_TICK_SPACING,
            });
        }

        Self::check_times(config, creation_time)?;
        Self::check_ticks(config, tick_spacing)?;

        if config.num_price_discovery_slugs == 0 || config.num_price_discovery_slugs > MAX_PRICE_DISCOVERY_SLUGS {
            return Err(AuctionError::InvalidNumPriceDiscoverySlugs {
                count: config.num_price_discovery_slugs,
                max: MAX_PRICE_DISCOVERY_SLUGS,
            });
        }
        if config.minimum_proceeds > config.maximum_proceeds {
            return Err(AuctionError::InvalidProceedsLimits {
                minimum: config.minimum_proceeds,
                maximum: config.maximum_proceeds,
            });
        }
        if config.num_tokens_to_sell == 0 {
            return Err(AuctionError::InvalidNumTokensToSell);
        }
        Ok(())
    }

    fn check_times(config: &AuctionConfig, creation_time: u64) -> Result<(), AuctionError> {
        if config.starting_time >= config.ending_time {
            return Err(AuctionError::InvalidTimeRange {
                starting_time: config.starting_time,
                ending_time: config.ending_time,
            });
        }
        if config.starting_time < creation_time {
            return Err(AuctionError::StartTimeBeforeCreation {
                starting_time: config.starting_time,
                creation_time,
            });
        }
        let duration = config.duration();
        if config.epoch_length == 0 || duration % config.epoch_length != 0 {
            return Err(AuctionError::InvalidEpochLength {
                epoch_length: config.epoch_length,
                duration,
            });
        }
        Ok(())
    }

    fn check_ticks(config: &AuctionConfig, tick_spacing: i32) -> Result<(), AuctionError> {
        let range_error = AuctionError::InvalidTickRange {
            starting_tick: config.starting_tick,
            ending_tick: config.ending_tick,
            is_token0: config.is_token0,
        };
        if config.starting_tick == config.ending_tick || (config.starting_tick > config.ending_tick) != config.is_token0 {
            return Err(range_error);
        }

        if config.gamma <= 0 || config.gamma % tick_spacing != 0 {
            return Err(AuctionError::InvalidGamma {
                gamma: config.gamma,
                tick_spacing,
            });
        }

        let total_epochs = config.total_epochs();
        let step = i64::try_from(total_epochs)
            .ok()
            .and_then(|epochs| (config.gamma as i64).checked_mul(epochs));
        match step {
            Some(step) if step != 0 && config.tick_delta() % step == 0 => {}
            _ => {
                return Err(AuctionError::InvalidGammaRange {
                    tick_delta: config.tick_delta(),
                    gamma: config.gamma,
                    total_epochs,
                })
            }
        }

        // Room for a full gamma step either side of the trajectory
        let gamma = config.gamma as i64;
        let in_bounds = |tick: i32| {
            let tick = tick as i64;
            tick - gamma >= MIN_TICK as i64 && tick + gamma <= MAX_TICK as i64
        };
        if !in_bounds(config.starting_tick) || !in_bounds(config.ending_tick) {
            return Err(range_error);
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const E18: u128 = 1_000_000_000_000_000_000;

    fn config() -> AuctionConfig {
        AuctionConfig {
            num_tokens_to_sell: 100_000 * E18,
            minimum_proceeds: 100 * E18,
            maximum_proceeds: 10_000 * E18,
            starting_time: 10_000,
            ending_time: 10_000 + 86_400,
            starting_tick: 1_600,
            ending_tick: -171_200,
            epoch_length: 400,
            gamma: 800,
            is_token0: true,
            num_price_discovery_slugs: 3,
        }
    }

    #[test]
    fn test_valid_config() {
        assert_eq!(ConfigValidator::validate(&config(), 8, 9_000), Ok(()));

        let mirrored = AuctionConfig {
            starting_tick: -1_600,
            ending_tick: 171_200,
            is_token0: false,
            ..config()
        };
        assert_eq!(ConfigValidator::validate(&mirrored, 8, 9_000), Ok(()));
    }

    #[test]
    fn test_gamma_not_dividing_range() {
        // 100 ticks in one epoch with gamma 3
        let c = AuctionConfig {
            starting_tick: 100,
            ending_tick: 0,
            gamma: 3,
            epoch_length: 86_400,
            ..config()
        };
        assert_eq!(
            ConfigValidator::validate(&c, 1, 9_000),
            Err(AuctionError::InvalidGammaRange {
                tick_delta: 100,
                gamma: 3,
                total_epochs: 1,
            })
        );
    }

    #[test]
    fn test_huge_epoch_count_rejected() {
        for ending_time in [1u64 << 62, u64::MAX] {
            let c = AuctionConfig {
                starting_time: 0,
                ending_time,
                epoch_length: 1,
                ..config()
            };
            assert_eq!(
                ConfigValidator::validate(&c, 8, 0),
                Err(AuctionError::InvalidGammaRange {
                    tick_delta: 172_800,
                    gamma: 800,
                    total_epochs: ending_time,
                })
            );
        }
    }

    #[test]
    fn test_tick_direction_must_match_orientation() {
        let c = AuctionConfig { is_token0: false, ..config() };
        assert!(matches!(
            ConfigValidator::validate(&c, 8, 9_000),
            Err(AuctionError::InvalidTickRange { .. })
        ));

        let c = AuctionConfig { ending_tick: 1_600, ..config() };
        assert!(matches!(
            ConfigValidator::validate(&c, 8, 9_000),
            Err(AuctionError::InvalidTickRange { .. })
        ));
    }

    #[test]
    fn test_ticks_near_bounds_rejected() {
        let c = AuctionConfig {
            starting_tick: 887_200,
            ending_tick: 887_200 - 172_800,
            ..config()
        };
        assert!(matches!(
            ConfigValidator::validate(&c, 8, 9_000),
            Err(AuctionError::InvalidTickRange { .. })
        ));
    }

    #[test]
    fn test_gamma_spacing() {
        let c = AuctionConfig { gamma: 804, ..config() };
        assert_eq!(
            ConfigValidator::validate(&c, 8, 9_000),
            Err(AuctionError::InvalidGamma { gamma: 804, tick_spacing: 8 })
        );

        let c = AuctionConfig { gamma: 0, ..config() };
        assert!(matches!(ConfigValidator::validate(&c, 8, 9_000), Err(AuctionError::InvalidGamma { .. })));
    }

    #[test]
    fn test_time_checks() {
        let c = AuctionConfig { ending_time: 10_000, ..config() };
        assert!(matches!(ConfigValidator::validate(&c, 8, 9_000), Err(AuctionError::InvalidTimeRange { .. })));

        assert_eq!(
            ConfigValidator::validate(&config(), 8, 10_001),
            Err(AuctionError::StartTimeBeforeCreation {
                starting_time: 10_000,
                creation_time: 10_001,
            })
        );

        let c = AuctionConfig { epoch_length: 401, ..config() };
        assert_eq!(
            ConfigValidator::validate(&c, 8, 9_000),
            Err(AuctionError::InvalidEpochLength { epoch_length: 401, duration: 86_400 })
        );

        let c = AuctionConfig { epoch_length: 0, ..config() };
        assert!(matches!(ConfigValidator::validate(&c, 8, 9_000), Err(AuctionError::InvalidEpochLength { .. })));
    }

    #[test]
    fn test_tick_spacing_limits() {
        assert_eq!(
            ConfigValidator::validate(&config(), 32, 9_000),
            Err(AuctionError::InvalidTickSpacing { tick_spacing: 32, max: 30 })
        );
        assert!(matches!(
            ConfigValidator::validate(&config(), 0, 9_000),
            Err(AuctionError::InvalidTickSpacing { .. })
        ));
    }

    #[test]
    fn test_slug_count_limits() {
        for count in [0, MAX_PRICE_DISCOVERY_SLUGS + 1] {
            let c = AuctionConfig { num_price_discovery_slugs: count, ..config() };
            assert_eq!(
                ConfigValidator::validate(&c, 8, 9_000),
                Err(AuctionError::InvalidNumPriceDiscoverySlugs { count, max: 10 })
            );
        }
        let c = AuctionConfig { num_price_discovery_slugs: 10, ..config() };
        assert_eq!(ConfigValidator::validate(&c, 8, 9_000), Ok(()));
    }

    #[test]
    fn test_proceeds_and_supply() {
        let c = AuctionConfig {
            minimum_proceeds: 2,
            maximum_proceeds: 1,
            ..config()
        };
        assert_eq!(
            ConfigValidator::validate(&c, 8, 9_000),
            Err(AuctionError::InvalidProceedsLimits { minimum: 2, maximum: 1 })
        );

        let c = AuctionConfig { num_tokens_to_sell: 0, ..config() };
        assert_eq!(ConfigValidator::validate(&c, 8, 9_000), Err(AuctionError::InvalidNumTokensToSell));
    }
}
