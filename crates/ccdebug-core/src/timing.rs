//! Protocol timing
//!
//! Every delay in the protocol is a named [`Timing`] entry rather than a
//! loop count, so the values can be audited and calibrated per platform.
//! The defaults are comfortably slower than the target's minimums.

use core::time::Duration;

/// Named hold times used by the protocol engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Hold after each `DC` edge during byte transfers and ready polling
    pub clock_half_period: Duration,
    /// Hold between `DC` edges of the debug entry handshake
    pub entry_pulse: Duration,
    /// Hold around `RST` transitions during debug entry
    pub reset_settle: Duration,
    /// Settling time after turning the data line around (t_dir_change)
    pub direction_change: Duration,
    /// Extra settling after the target finished a busy wait (t_sample_wait)
    pub sample_wait: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            clock_half_period: Duration::from_micros(1),
            entry_pulse: Duration::from_micros(1),
            reset_settle: Duration::from_micros(50),
            direction_change: Duration::from_micros(1),
            sample_wait: Duration::from_micros(1),
        }
    }
}

impl Timing {
    /// All holds set to zero (simulated targets, tests)
    pub const fn zero() -> Self {
        Self {
            clock_half_period: Duration::ZERO,
            entry_pulse: Duration::ZERO,
            reset_settle: Duration::ZERO,
            direction_change: Duration::ZERO,
            sample_wait: Duration::ZERO,
        }
    }

    /// Multiply every hold by `factor` (for long wires or slow level shifters)
    pub fn scaled(self, factor: u32) -> Self {
        Self {
            clock_half_period: self.clock_half_period * factor,
            entry_pulse: self.entry_pulse * factor,
            reset_settle: self.reset_settle * factor,
            direction_change: self.direction_change * factor,
            sample_wait: self.sample_wait * factor,
        }
    }

    /// Set the clock half period
    pub fn with_clock_half_period(mut self, period: Duration) -> Self {
        self.clock_half_period = period;
        self
    }

    /// Approximate bit rate of byte transfers in bits per second
    ///
    /// Returns `None` when the half period is zero.
    pub fn bit_rate(&self) -> Option<u64> {
        let period_ns = self.clock_half_period.as_nanos() * 2;
        if period_ns == 0 {
            None
        } else {
            Some((1_000_000_000 / period_ns) as u64)
        }
    }
}
