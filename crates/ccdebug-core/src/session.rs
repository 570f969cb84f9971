//! Session controller
//!
//! [`CcDebugger`] is the consumer-facing API. It owns the protocol engine
//! (and through it the lines), drives the activate/deactivate lifecycle, and
//! exposes the command catalogue with `Result` returns.
//!
//! ```text
//!              new()                enter_debug_mode()
//!   ──────────────► Active/OutOfDebug ──────────────► Active/InDebug
//!                    ▲       │   ▲                        │
//!        activate(true)      │   └──── exit_debug_mode() ─┘
//!                    │       │ activate(false)            │ activate(false)
//!                    │       ▼                            │ (RESUME first)
//!                    └──── Inactive ◄─────────────────────┘
//! ```

use crate::chip::ChipId;
use crate::command;
use crate::compat::SentinelApi;
use crate::error::{Error, Result};
use crate::line::LineController;
use crate::protocol::ProtocolEngine;
use crate::state::SessionState;
use crate::status::{DebugConfig, DebugStatus};
use crate::timing::Timing;

/// Default bound on busy polls in `switch_to_read`
pub const DEFAULT_READY_POLL_LIMIT: u32 = 10_000;

/// Debugger configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebuggerConfig {
    /// Protocol hold times
    pub timing: Timing,
    /// Give up waiting for the target after this many busy polls
    ///
    /// `None` waits indefinitely, which is what the target protocol itself
    /// specifies; a stuck target then blocks the caller forever.
    pub ready_poll_limit: Option<u32>,
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self {
            timing: Timing::default(),
            ready_poll_limit: Some(DEFAULT_READY_POLL_LIMIT),
        }
    }
}

impl DebuggerConfig {
    /// Set the protocol timing
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Set the ready poll limit (`None` for unbounded)
    pub fn with_ready_poll_limit(mut self, limit: Option<u32>) -> Self {
        self.ready_poll_limit = limit;
        self
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self::default().with_timing(Timing::zero())
    }
}

/// CC debug interface session
///
/// Construction configures the lines and leaves the session active but out
/// of debug mode. Every operation checks the session state first; rejected
/// calls return an [`Error`] and also record it as [`last_error`].
///
/// [`last_error`]: CcDebugger::last_error
pub struct CcDebugger<L: LineController> {
    engine: ProtocolEngine<L>,
}

impl<L: LineController> CcDebugger<L> {
    /// Take ownership of the lines and configure them for debugging
    pub fn new(lines: L, config: DebuggerConfig) -> Self {
        let mut engine = ProtocolEngine::new(lines, config);
        engine.configure_active();
        log::debug!(
            "ccdebug: session created (ready poll limit: {:?})",
            config.ready_poll_limit
        );
        Self { engine }
    }

    /// Activate or deactivate the debugger
    ///
    /// Deactivating while in debug mode resumes the target first, then
    /// releases every line to high impedance. Activating reconfigures the
    /// lines; the target has to be put into debug mode again. Either way the
    /// last error is cleared, even when the state does not change.
    pub fn activate(&mut self, on: bool) {
        self.engine.state_mut().last_error = None;

        if on == self.engine.state().active {
            return;
        }

        if on {
            self.engine.state_mut().active = true;
            self.engine.configure_active();
            log::debug!("ccdebug: activated");
        } else {
            if self.engine.state().in_debug_mode {
                if let Err(e) = command::resume(&mut self.engine) {
                    log::warn!("ccdebug: failed to leave debug mode on deactivation: {}", e);
                }
            }
            self.engine.release_lines();
            let state = self.engine.state_mut();
            state.active = false;
            state.in_debug_mode = false;
            log::debug!("ccdebug: deactivated");
        }
    }

    /// Whether the debugger owns the lines
    pub fn is_active(&self) -> bool {
        self.engine.state().active
    }

    /// Whether the target is in debug mode
    pub fn in_debug_mode(&self) -> bool {
        self.engine.state().in_debug_mode
    }

    /// Most recent rejection, `None` if the last checkpoint was clean
    pub fn last_error(&self) -> Option<Error> {
        self.engine.state().last_error
    }

    /// Snapshot of the session state
    pub fn state(&self) -> SessionState {
        *self.engine.state()
    }

    /// Force the target into debug mode
    pub fn enter_debug_mode(&mut self) -> Result<()> {
        self.engine.enter_debug_mode()
    }

    /// Resume the target and leave debug mode, returning the debug status
    pub fn exit_debug_mode(&mut self) -> Result<u8> {
        command::resume(&mut self.engine)
    }

    /// Read the raw debug configuration byte
    pub fn get_config(&mut self) -> Result<u8> {
        command::read_config(&mut self.engine)
    }

    /// Write the raw debug configuration byte
    pub fn set_config(&mut self, config: u8) -> Result<u8> {
        command::write_config(&mut self.engine, config)
    }

    /// Read the debug configuration
    pub fn read_config(&mut self) -> Result<DebugConfig> {
        self.get_config().map(DebugConfig::from_bits_retain)
    }

    /// Write the debug configuration, returning what the target reports back
    pub fn write_config(&mut self, config: DebugConfig) -> Result<DebugConfig> {
        self.set_config(config.bits())
            .map(DebugConfig::from_bits_retain)
    }

    /// Execute a one byte instruction
    pub fn exec1(&mut self, oc0: u8) -> Result<u8> {
        command::exec1(&mut self.engine, oc0)
    }

    /// Execute a two byte instruction
    pub fn exec2(&mut self, oc0: u8, oc1: u8) -> Result<u8> {
        command::exec2(&mut self.engine, oc0, oc1)
    }

    /// Execute a three byte instruction
    pub fn exec3(&mut self, oc0: u8, oc1: u8, oc2: u8) -> Result<u8> {
        command::exec3(&mut self.engine, oc0, oc1, oc2)
    }

    /// Execute an opcode with a 16-bit immediate
    pub fn exec_imm16(&mut self, oc0: u8, imm: u16) -> Result<u8> {
        command::exec_imm16(&mut self.engine, oc0, imm)
    }

    /// Read the raw 16-bit chip ID
    pub fn get_chip_id(&mut self) -> Result<u16> {
        command::get_chip_id(&mut self.engine)
    }

    /// Read and decode the chip ID
    pub fn chip_id(&mut self) -> Result<ChipId> {
        self.get_chip_id().map(ChipId::from_raw)
    }

    /// Read the program counter
    pub fn get_pc(&mut self) -> Result<u16> {
        command::get_pc(&mut self.engine)
    }

    /// Read the raw debug status byte
    pub fn get_status(&mut self) -> Result<u8> {
        command::read_status(&mut self.engine)
    }

    /// Read the debug status
    pub fn read_status(&mut self) -> Result<DebugStatus> {
        self.get_status().map(DebugStatus::from_bits_retain)
    }

    /// Step one instruction, returning the accumulator
    pub fn step(&mut self) -> Result<u8> {
        command::step(&mut self.engine)
    }

    /// Start a mass erase, returning the debug status
    pub fn chip_erase(&mut self) -> Result<u8> {
        command::chip_erase(&mut self.engine)
    }

    /// Sentinel-returning view with the legacy numeric error codes
    pub fn sentinel(&mut self) -> SentinelApi<'_, L> {
        SentinelApi::new(self)
    }

    /// Borrow the protocol engine for raw transactions
    pub fn engine(&mut self) -> &mut ProtocolEngine<L> {
        &mut self.engine
    }

    /// Borrow the line controller
    pub fn lines(&self) -> &L {
        self.engine.lines()
    }

    /// Consume the session and return the line controller
    ///
    /// The lines are returned as they are; call `activate(false)` first to
    /// resume the target and release them.
    pub fn into_lines(self) -> L {
        self.engine.into_lines()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::{Direction, Line};
    use crate::testing::{Event, InputMode, MockLines};
    use std::vec;

    fn debugger(mode: InputMode) -> CcDebugger<MockLines> {
        CcDebugger::new(MockLines::new(mode), DebuggerConfig::for_tests())
    }

    type Op = fn(&mut CcDebugger<MockLines>) -> Result<u16>;

    /// Every catalogue entry, widened to a common return type
    fn catalogue() -> [Op; 12] {
        [
            |d| d.exit_debug_mode().map(u16::from),
            |d| d.get_config().map(u16::from),
            |d| d.set_config(0x22).map(u16::from),
            |d| d.exec1(0x00).map(u16::from),
            |d| d.exec2(0x74, 0x01).map(u16::from),
            |d| d.exec3(0x90, 0x00, 0x00).map(u16::from),
            |d| d.exec_imm16(0x90, 0xF000).map(u16::from),
            |d| d.get_chip_id(),
            |d| d.get_pc(),
            |d| d.get_status().map(u16::from),
            |d| d.step().map(u16::from),
            |d| d.chip_erase().map(u16::from),
        ]
    }

    #[test]
    fn test_construction_state() {
        let dbg = debugger(InputMode::Low);
        assert!(dbg.is_active());
        assert!(!dbg.in_debug_mode());
        assert_eq!(dbg.last_error(), None);
        assert_eq!(dbg.state().dd_direction, Direction::Input);
        assert_eq!(dbg.lines().direction(Line::Clock), Direction::Output);
        assert_eq!(dbg.lines().direction(Line::Reset), Direction::Output);
        assert_eq!(dbg.lines().direction(Line::DataOut), Direction::Input);
    }

    #[test]
    fn test_inactive_commands_rejected() {
        for op in catalogue() {
            let mut dbg = debugger(InputMode::Low);
            dbg.enter_debug_mode().unwrap();
            dbg.activate(false);
            dbg.engine().lines_mut().clear();

            assert_eq!(op(&mut dbg), Err(Error::Inactive));
            assert_eq!(dbg.last_error(), Some(Error::Inactive));
            assert!(dbg.lines().events().is_empty());
        }
    }

    #[test]
    fn test_out_of_debug_commands_rejected() {
        for op in catalogue() {
            let mut dbg = debugger(InputMode::Low);
            dbg.engine().lines_mut().clear();

            assert_eq!(op(&mut dbg), Err(Error::NotInDebugMode));
            assert_eq!(dbg.last_error(), Some(Error::NotInDebugMode));
            assert!(dbg.lines().events().is_empty());
        }
    }

    #[test]
    fn test_enter_debug_mode_inactive() {
        let mut dbg = debugger(InputMode::Low);
        dbg.activate(false);
        assert_eq!(dbg.enter_debug_mode(), Err(Error::Inactive));
        assert!(!dbg.in_debug_mode());
    }

    #[test]
    fn test_deactivate_in_debug_mode_resumes_once_before_release() {
        let mut dbg = debugger(InputMode::Low);
        dbg.enter_debug_mode().unwrap();
        dbg.engine().lines_mut().clear();

        dbg.activate(false);

        let lines = dbg.lines();
        assert_eq!(lines.written_bytes(), vec![0x48]);

        let last_clock = lines
            .events()
            .iter()
            .rposition(|e| matches!(e, Event::Level(Line::Clock, _)))
            .unwrap();
        let first_release = lines
            .position(|e| matches!(e, Event::Direction(Line::Reset | Line::Clock, Direction::Input)))
            .unwrap();
        assert!(last_clock < first_release);

        for line in Line::REQUIRED {
            assert_eq!(lines.direction(line), Direction::Input);
        }
        assert!(!dbg.is_active());
        assert!(!dbg.in_debug_mode());
        assert_eq!(dbg.state().dd_direction, Direction::Input);
    }

    #[test]
    fn test_deactivate_leaves_every_line_input_low() {
        let mut lines = MockLines::new(InputMode::Low);
        lines.enable_indicators();
        let mut dbg = CcDebugger::new(lines, DebuggerConfig::for_tests());
        dbg.enter_debug_mode().unwrap();
        dbg.engine().lines_mut().clear();

        dbg.activate(false);

        let lines = dbg.lines();
        for line in Line::ALL {
            assert_eq!(lines.direction(line), Direction::Input, "{}", line.name());
            assert!(!lines.output_level(line), "{}", line.name());

            let to_input = lines
                .position(|e| *e == Event::Direction(line, Direction::Input))
                .unwrap();
            let dropped = lines
                .events()
                .iter()
                .rposition(|e| *e == Event::Level(line, false))
                .unwrap();
            assert!(to_input < dropped, "{}", line.name());
        }
    }

    #[test]
    fn test_deactivate_out_of_debug_mode_sends_nothing() {
        let mut dbg = debugger(InputMode::Low);
        dbg.engine().lines_mut().clear();
        dbg.activate(false);
        assert!(dbg.lines().written_bytes().is_empty());
        assert_eq!(dbg.lines().rising_edges(Line::Clock), 0);
    }

    #[test]
    fn test_deactivate_with_stuck_target_still_releases() {
        let config = DebuggerConfig::for_tests().with_ready_poll_limit(Some(3));
        let mut dbg = CcDebugger::new(MockLines::new(InputMode::High), config);
        dbg.enter_debug_mode().unwrap();

        dbg.activate(false);
        assert!(!dbg.is_active());
        assert!(!dbg.in_debug_mode());
        assert_eq!(dbg.last_error(), Some(Error::TargetNotReady));
        assert_eq!(dbg.lines().direction(Line::Clock), Direction::Input);
    }

    #[test]
    fn test_reactivate() {
        let mut dbg = debugger(InputMode::Low);
        dbg.activate(false);
        let _ = dbg.get_status();
        assert_eq!(dbg.last_error(), Some(Error::Inactive));

        dbg.activate(true);
        assert!(dbg.is_active());
        assert!(!dbg.in_debug_mode());
        assert_eq!(dbg.last_error(), None);
        assert_eq!(dbg.lines().direction(Line::Clock), Direction::Output);
        assert!(!dbg.lines().output_level(Line::Reset));
    }

    #[test]
    fn test_activate_when_active_only_clears_error() {
        let mut dbg = debugger(InputMode::Low);
        let _ = dbg.step();
        assert_eq!(dbg.last_error(), Some(Error::NotInDebugMode));
        dbg.engine().lines_mut().clear();

        dbg.activate(true);
        assert_eq!(dbg.last_error(), None);
        assert!(dbg.lines().events().is_empty());
    }

    #[test]
    fn test_exit_debug_mode_transition() {
        let mut dbg = debugger(InputMode::Low);
        dbg.enter_debug_mode().unwrap();
        assert!(dbg.in_debug_mode());
        dbg.exit_debug_mode().unwrap();
        assert!(!dbg.in_debug_mode());
        assert!(dbg.is_active());
    }

    #[test]
    fn test_typed_accessors() {
        let mut dbg = debugger(InputMode::Low);
        dbg.enter_debug_mode().unwrap();

        dbg.engine()
            .lines_mut()
            .set_mode(InputMode::response(&[0xA2]));
        let status = dbg.read_status().unwrap();
        assert!(status.is_halted());
        assert!(status.erase_busy());

        dbg.engine()
            .lines_mut()
            .set_mode(InputMode::response(&[0x41, 0x01]));
        let chip = dbg.chip_id().unwrap();
        assert_eq!(chip.name(), Some("CC2541"));

        dbg.engine()
            .lines_mut()
            .set_mode(InputMode::response(&[0x22]));
        let config = dbg
            .write_config(DebugConfig::SOFT_POWER_MODE | DebugConfig::TIMER_SUSPEND)
            .unwrap();
        assert_eq!(config.bits(), 0x22);
    }
}
