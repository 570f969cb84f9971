//! Debug status and configuration registers
//!
//! Bit layouts of the byte returned by `READ_STATUS` and the byte exchanged by
//! `RD_CONFIG` / `WR_CONFIG` on CC253x/CC254x parts.

use bitflags::bitflags;

bitflags! {
    /// Debug status byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DebugStatus: u8 {
        /// Chip erase in progress
        const CHIP_ERASE_BUSY   = 1 << 7;
        /// PCON.IDLE is set
        const PCON_IDLE         = 1 << 6;
        /// CPU is halted
        const CPU_HALTED        = 1 << 5;
        /// Chip is in power mode 0 (active)
        const PM_ACTIVE         = 1 << 4;
        /// Halt caused by a breakpoint or HALT command
        const HALT_STATUS       = 1 << 3;
        /// Debug lock bit is set, most commands are refused
        const DEBUG_LOCKED      = 1 << 2;
        /// Oscillators are stable
        const OSCILLATOR_STABLE = 1 << 1;
        /// Stack overflow occurred
        const STACK_OVERFLOW    = 1 << 0;
    }
}

bitflags! {
    /// Debug configuration byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DebugConfig: u8 {
        /// Enter power modes on PCON writes even while halted
        const SOFT_POWER_MODE = 1 << 5;
        /// Disable timers while halted
        const TIMERS_OFF      = 1 << 3;
        /// Pause DMA while halted
        const DMA_PAUSE       = 1 << 2;
        /// Suspend timers while halted
        const TIMER_SUSPEND   = 1 << 1;
    }
}

impl Default for DebugStatus {
    fn default() -> Self {
        DebugStatus::empty()
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        DebugConfig::empty()
    }
}

impl DebugStatus {
    /// CPU is halted and accepting debug instructions
    pub fn is_halted(self) -> bool {
        self.contains(Self::CPU_HALTED)
    }

    /// A chip erase has not finished yet
    pub fn erase_busy(self) -> bool {
        self.contains(Self::CHIP_ERASE_BUSY)
    }

    /// Debug access is locked
    pub fn is_locked(self) -> bool {
        self.contains(Self::DEBUG_LOCKED)
    }
}
