//! Wall-clock time to epoch mapping.

use crate::math::full_math::mul_div_u128;
use crate::math::MathError;
use crate::types::AuctionConfig;

/// Epoch arithmetic for one auction.
///
/// Epochs are 1-based: the first `epoch_length` seconds from
/// `starting_time` are epoch 1. Built from a validated config, so
/// `epoch_length` is non-zero and divides the duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochClock {
    starting_time: u64,
    ending_time: u64,
    epoch_length: u64,
}

impl EpochClock {
    pub fn new(config: &AuctionConfig) -> Self {
        Self {
            starting_time: config.starting_time,
            ending_time: config.ending_time,
            epoch_length: config.epoch_length.max(1),
        }
    }

    #[inline]
    pub fn starting_time(&self) -> u64 {
        self.starting_time
    }

    #[inline]
    pub fn ending_time(&self) -> u64 {
        self.ending_time
    }

    #[inline]
    pub fn duration(&self) -> u64 {
        self.ending_time.saturating_sub(self.starting_time)
    }

    #[inline]
    pub fn total_epochs(&self) -> u64 {
        self.duration() / self.epoch_length
    }

    /// Epoch containing `now`, or `None` before the start
    #[inline]
    pub fn epoch_of(&self, now: u64) -> Option<u64> {
        now.checked_sub(self.starting_time)
            .map(|elapsed| elapsed / self.epoch_length + 1)
    }

    /// Last second (exclusive) of `epoch`, capped at the end of the auction
    #[inline]
    pub fn epoch_end(&self, epoch: u64) -> u64 {
        let end = self
            .starting_time
            .saturating_add(epoch.saturating_mul(self.epoch_length));
        end.min(self.ending_time)
    }

    #[inline]
    pub fn has_started(&self, now: u64) -> bool {
        now >= self.starting_time
    }

    #[inline]
    pub fn has_ended(&self, now: u64) -> bool {
        now >= self.ending_time
    }

    /// Seconds since the start, clamped to the auction window
    #[inline]
    pub fn elapsed(&self, now: u64) -> u64 {
        now.min(self.ending_time).saturating_sub(self.starting_time)
    }

    /// Share of `total` due by `now` on a linear schedule
    pub fn linear_share(&self, total: u128, now: u64) -> Result<u128, MathError> {
        mul_div_u128(total, self.elapsed(now) as u128, self.duration() as u128)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> EpochClock {
        EpochClock {
            starting_time: 1_000,
            ending_time: 1_000 + 86_400,
            epoch_length: 400,
        }
    }

    #[test]
    fn test_epoch_of() {
        let c = clock();
        assert_eq!(c.epoch_of(999), None);
        assert_eq!(c.epoch_of(1_000), Some(1));
        assert_eq!(c.epoch_of(1_399), Some(1));
        assert_eq!(c.epoch_of(1_400), Some(2));
        assert_eq!(c.epoch_of(1_000 + 86_399), Some(216));
    }

    #[test]
    fn test_total_epochs_and_end() {
        let c = clock();
        assert_eq!(c.total_epochs(), 216);
        assert_eq!(c.epoch_end(1), 1_400);
        assert_eq!(c.epoch_end(216), 1_000 + 86_400);
        assert_eq!(c.epoch_end(10_000), 1_000 + 86_400);
    }

    #[test]
    fn test_elapsed_is_clamped() {
        let c = clock();
        assert_eq!(c.elapsed(0), 0);
        assert_eq!(c.elapsed(1_200), 200);
        assert_eq!(c.elapsed(u64::MAX), 86_400);
        assert!(c.has_started(1_000));
        assert!(!c.has_ended(1_000 + 86_399));
        assert!(c.has_ended(1_000 + 86_400));
    }

    #[test]
    fn test_linear_share() {
        let c = clock();
        assert_eq!(c.linear_share(86_400, 1_400).unwrap(), 400);
        assert_eq!(c.linear_share(1_000, 0).unwrap(), 0);
        assert_eq!(c.linear_share(u128::MAX, u64::MAX).unwrap(), u128::MAX);
    }
}
