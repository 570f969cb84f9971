//! Protocol engine
//!
//! Bit-level half of the debug interface: forcing the target into debug
//! mode, turning the shared `DD` line around, and clocking bytes in and out
//! MSB first. Everything here goes through a [`LineController`]; nothing
//! above this module touches a line directly.
//!
//! ## Wire format
//!
//! ```text
//!         ┌──┐  ┌──┐  ┌──┐        ┌──┐
//!   DC  ──┘  └──┘  └──┘  └─ .. ───┘  └──
//!   DD   <b7 ><b6 ><b5 >   ..    <b0 >
//! ```
//!
//! The host sets `DD` while `DC` is low; the target samples on the rising
//! edge. When reading, the target drives `DD` after the rising edge and the
//! host samples while `DC` is high.

use core::time::Duration;

use crate::error::{Error, Result};
use crate::line::{Direction, Line, LineController};
use crate::session::DebuggerConfig;
use crate::state::SessionState;
use crate::timing::Timing;

/// Bit-level debug protocol driver
///
/// Owns the line controller and the session state. Each primitive checks
/// its preconditions before touching any line, records a rejection in
/// [`SessionState::last_error`], and returns it as an `Err`.
pub struct ProtocolEngine<L: LineController> {
    lines: L,
    state: SessionState,
    timing: Timing,
    ready_poll_limit: Option<u32>,
}

impl<L: LineController> ProtocolEngine<L> {
    /// Create an engine in the post-construction state
    ///
    /// Lines are not touched; the session controller configures them.
    pub fn new(lines: L, config: DebuggerConfig) -> Self {
        Self {
            lines,
            state: SessionState::new(),
            timing: config.timing,
            ready_poll_limit: config.ready_poll_limit,
        }
    }

    /// Current session state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    /// Protocol timing in use
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Maximum number of ready polls before giving up (`None` = unbounded)
    pub fn ready_poll_limit(&self) -> Option<u32> {
        self.ready_poll_limit
    }

    /// Borrow the line controller
    pub fn lines(&self) -> &L {
        &self.lines
    }

    /// Mutably borrow the line controller
    ///
    /// Intended for backends and test harnesses; driving lines behind the
    /// engine's back breaks the direction invariant.
    pub fn lines_mut(&mut self) -> &mut L {
        &mut self.lines
    }

    /// Consume the engine and return the line controller
    pub fn into_lines(self) -> L {
        self.lines
    }

    /// Record a rejection and hand it back for returning
    fn reject(&mut self, err: Error) -> Error {
        log::trace!("ccdebug: rejected: {}", err);
        self.state.last_error = Some(err);
        err
    }

    /// Fail with `Inactive` unless the session is active
    pub fn require_active(&mut self) -> Result<()> {
        if !self.state.active {
            return Err(self.reject(Error::Inactive));
        }
        Ok(())
    }

    /// Fail unless the session is active and the target is in debug mode
    pub fn require_debug_mode(&mut self) -> Result<()> {
        self.require_active()?;
        if !self.state.in_debug_mode {
            return Err(self.reject(Error::NotInDebugMode));
        }
        Ok(())
    }

    /// Force the target into debug mode
    ///
    /// Holds `RST` low while giving `DC` two rising edges, then releases
    /// reset. The target latches debug mode on the `RST` rising edge.
    pub fn enter_debug_mode(&mut self) -> Result<()> {
        self.require_active()?;
        self.indicate(Line::WriteIndicator, true);

        self.state.last_error = None;

        let t = self.timing;
        self.lines.set_level(Line::Reset, false);
        self.lines.hold(t.reset_settle);
        self.lines.set_level(Line::Clock, true);
        self.lines.hold(t.entry_pulse);
        self.lines.set_level(Line::Clock, false);
        self.lines.hold(t.entry_pulse);
        self.lines.set_level(Line::Clock, true);
        self.lines.hold(t.entry_pulse);
        self.lines.set_level(Line::Clock, false);
        self.lines.hold(t.reset_settle);
        self.lines.set_level(Line::Reset, true);
        self.lines.hold(t.reset_settle);

        self.state.in_debug_mode = true;
        log::debug!("ccdebug: entered debug mode");

        self.indicate(Line::WriteIndicator, false);
        Ok(())
    }

    /// Clock one byte out to the target, MSB first
    pub fn write_byte(&mut self, value: u8) -> Result<()> {
        self.require_debug_mode()?;
        self.indicate(Line::WriteIndicator, true);

        self.set_dd_direction(Direction::Output);

        let half = self.timing.clock_half_period;
        let mut data = value;
        for _ in 0..8 {
            self.lines.set_level(Line::DataOut, data & 0x80 != 0);
            self.lines.set_level(Line::Clock, true);
            data <<= 1;
            self.lines.hold(half);
            self.lines.set_level(Line::Clock, false);
            self.lines.hold(half);
        }

        self.indicate(Line::WriteIndicator, false);
        Ok(())
    }

    /// Clock out several bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Clock one byte in from the target, MSB first
    ///
    /// Only requires an active session; debug mode is not checked so the
    /// primitive can be exercised on a loopback harness.
    pub fn read_byte(&mut self) -> Result<u8> {
        self.require_active()?;
        self.indicate(Line::ReadIndicator, true);

        self.set_dd_direction(Direction::Input);

        let half = self.timing.clock_half_period;
        let mut data = 0u8;
        for _ in 0..8 {
            self.lines.set_level(Line::Clock, true);
            self.lines.hold(half);
            data <<= 1;
            if self.lines.level(Line::DataIn) {
                data |= 0x01;
            }
            self.lines.set_level(Line::Clock, false);
            self.lines.hold(half);
        }

        self.indicate(Line::ReadIndicator, false);
        Ok(data)
    }

    /// Turn the data line around and wait for the target to become ready
    ///
    /// The target holds `DD` high while it is still busy with the last
    /// command; each busy poll costs 8 clock pulses. With no poll limit this
    /// waits for as long as the target stays busy.
    pub fn switch_to_read(&mut self) -> Result<()> {
        self.require_debug_mode()?;
        self.indicate(Line::ReadIndicator, true);

        self.set_dd_direction(Direction::Input);
        self.lines.hold(self.timing.direction_change);

        let mut polls = 0u32;
        while self.lines.level(Line::DataIn) {
            if let Some(limit) = self.ready_poll_limit {
                if polls >= limit {
                    log::warn!("ccdebug: target still busy after {} polls", polls);
                    self.indicate(Line::ReadIndicator, false);
                    return Err(self.reject(Error::TargetNotReady));
                }
            }
            for _ in 0..8 {
                self.pulse_clock();
            }
            polls = polls.saturating_add(1);
        }

        if polls > 0 {
            log::trace!("ccdebug: target ready after {} polls", polls);
            self.lines.hold(self.timing.sample_wait);
        }

        self.indicate(Line::ReadIndicator, false);
        Ok(())
    }

    /// Take the data line back for writing
    pub fn switch_to_write(&mut self) -> Result<()> {
        self.require_active()?;
        self.set_dd_direction(Direction::Output);
        Ok(())
    }

    /// One `DC` pulse with byte transfer timing
    fn pulse_clock(&mut self) {
        let half = self.timing.clock_half_period;
        self.lines.set_level(Line::Clock, true);
        self.lines.hold(half);
        self.lines.set_level(Line::Clock, false);
        self.lines.hold(half);
    }

    /// Change the `DD` direction, doing nothing if it is already set
    fn set_dd_direction(&mut self, direction: Direction) {
        if self.state.dd_direction == direction {
            return;
        }
        self.state.dd_direction = direction;

        match direction {
            Direction::Output => {
                self.lines.set_direction(Line::DataOut, Direction::Output);
                self.lines.set_level(Line::DataOut, false);
            }
            Direction::Input => {
                self.lines.set_direction(Line::DataOut, Direction::Input);
            }
        }
    }

    /// Drive an indicator, if the backend has it
    fn indicate(&mut self, line: Line, on: bool) {
        if self.lines.has_line(line) {
            self.lines.set_level(line, on);
        }
    }

    /// Put all lines in the active idle configuration
    ///
    /// `DC` and `RST` are driven low, the data line is released to input.
    pub(crate) fn configure_active(&mut self) {
        self.lines.set_direction(Line::Clock, Direction::Output);
        self.lines.set_level(Line::Clock, false);
        self.lines.set_direction(Line::DataIn, Direction::Input);
        self.lines.set_direction(Line::DataOut, Direction::Input);
        self.lines.set_direction(Line::Reset, Direction::Output);
        self.lines.set_level(Line::Reset, false);

        for line in [Line::ReadIndicator, Line::WriteIndicator] {
            if self.lines.has_line(line) {
                self.lines.set_direction(line, Direction::Output);
                self.lines.set_level(line, false);
            }
        }

        self.state.dd_direction = Direction::Input;
    }

    /// Release every line to high impedance
    ///
    /// Each line is turned to input before its level is dropped, so `RST`
    /// is never driven low on the way out.
    pub(crate) fn release_lines(&mut self) {
        for line in Line::ALL {
            if self.lines.has_line(line) {
                self.lines.set_direction(line, Direction::Input);
                self.lines.set_level(line, false);
            }
        }
        self.state.dd_direction = Direction::Input;
    }

    /// Hold for an arbitrary duration using the line controller's clock
    pub fn hold(&mut self, duration: Duration) {
        self.lines.hold(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, InputMode, MockLines};
    use std::vec;
    use std::vec::Vec;

    fn engine(mode: InputMode) -> ProtocolEngine<MockLines> {
        let mut engine = ProtocolEngine::new(MockLines::new(mode), DebuggerConfig::for_tests());
        engine.configure_active();
        engine.lines_mut().clear();
        engine
    }

    fn debug_engine(mode: InputMode) -> ProtocolEngine<MockLines> {
        let mut engine = engine(mode);
        engine.enter_debug_mode().unwrap();
        engine.lines_mut().clear();
        engine
    }

    #[test]
    fn test_enter_debug_mode_sequence() {
        let timing = Timing::default();
        let config = DebuggerConfig::default().with_timing(timing);
        let mut engine = ProtocolEngine::new(MockLines::new(InputMode::Low), config);

        assert!(!engine.state().in_debug_mode);
        engine.enter_debug_mode().unwrap();
        assert!(engine.state().in_debug_mode);

        let expected = vec![
            Event::Level(Line::Reset, false),
            Event::Hold(timing.reset_settle),
            Event::Level(Line::Clock, true),
            Event::Hold(timing.entry_pulse),
            Event::Level(Line::Clock, false),
            Event::Hold(timing.entry_pulse),
            Event::Level(Line::Clock, true),
            Event::Hold(timing.entry_pulse),
            Event::Level(Line::Clock, false),
            Event::Hold(timing.reset_settle),
            Event::Level(Line::Reset, true),
            Event::Hold(timing.reset_settle),
        ];
        assert_eq!(engine.lines().events(), expected.as_slice());
    }

    #[test]
    fn test_enter_debug_mode_keeps_direction() {
        let mut engine = debug_engine(InputMode::Low);
        engine.switch_to_write().unwrap();
        engine.enter_debug_mode().unwrap();
        assert_eq!(engine.state().dd_direction, Direction::Output);
        assert_eq!(engine.lines().direction(Line::DataOut), Direction::Output);

        engine.switch_to_read().unwrap();
        engine.enter_debug_mode().unwrap();
        assert_eq!(engine.state().dd_direction, Direction::Input);
        assert_eq!(engine.lines().direction(Line::DataOut), Direction::Input);
    }

    #[test]
    fn test_enter_debug_mode_clears_last_error() {
        let mut engine = engine(InputMode::Low);
        assert_eq!(engine.write_byte(0x30), Err(Error::NotInDebugMode));
        assert_eq!(engine.state().last_error, Some(Error::NotInDebugMode));
        engine.enter_debug_mode().unwrap();
        assert_eq!(engine.state().last_error, None);
    }

    #[test]
    fn test_write_byte_msb_first() {
        let mut engine = debug_engine(InputMode::Low);
        engine.write_byte(0xA5).unwrap();
        assert_eq!(engine.lines().written_bytes(), vec![0xA5]);
        assert_eq!(engine.state().dd_direction, Direction::Output);
        // Eight rising edges, clock left low
        assert_eq!(engine.lines().rising_edges(Line::Clock), 8);
        assert!(!engine.lines().output_level(Line::Clock));
    }

    #[test]
    fn test_loopback_roundtrip_all_values() {
        let mut engine = debug_engine(InputMode::Loopback);
        for value in 0..=255u8 {
            engine.write_byte(value).unwrap();
            assert_eq!(engine.read_byte().unwrap(), value, "value 0x{:02X}", value);
        }
    }

    #[test]
    fn test_read_byte_samples_while_clock_high() {
        let mut engine = debug_engine(InputMode::bits_of(&[0x12]));
        let value = engine.read_byte().unwrap();
        assert_eq!(value, 0x12);

        let events = engine.lines().events();
        let mut clock_high = false;
        for event in events {
            match event {
                Event::Level(Line::Clock, high) => clock_high = *high,
                Event::Read(Line::DataIn) => assert!(clock_high),
                _ => {}
            }
        }
    }

    #[test]
    fn test_read_byte_requires_only_active() {
        let mut engine = engine(InputMode::bits_of(&[0x5A]));
        assert_eq!(engine.read_byte(), Ok(0x5A));

        engine.state_mut().active = false;
        engine.lines_mut().clear();
        assert_eq!(engine.read_byte(), Err(Error::Inactive));
        assert!(engine.lines().events().is_empty());
    }

    #[test]
    fn test_write_byte_rejected_without_line_activity() {
        let mut engine = engine(InputMode::Low);
        assert_eq!(engine.write_byte(0xFF), Err(Error::NotInDebugMode));
        assert!(engine.lines().events().is_empty());

        engine.state_mut().active = false;
        assert_eq!(engine.write_byte(0xFF), Err(Error::Inactive));
        assert_eq!(engine.state().last_error, Some(Error::Inactive));
        assert!(engine.lines().events().is_empty());
    }

    #[test]
    fn test_switch_to_read_ready_immediately() {
        let mut engine = debug_engine(InputMode::Low);
        engine.switch_to_write().unwrap();
        engine.lines_mut().clear();

        engine.switch_to_read().unwrap();
        assert_eq!(engine.state().dd_direction, Direction::Input);
        assert_eq!(engine.lines().rising_edges(Line::Clock), 0);
    }

    #[test]
    fn test_switch_to_read_polls_until_ready() {
        // Busy for three polls, then ready
        let mut engine = debug_engine(InputMode::Bits(vec![true, true, true, false].into()));
        engine.switch_to_read().unwrap();
        assert_eq!(engine.lines().rising_edges(Line::Clock), 3 * 8);
        let holds: Vec<_> = engine
            .lines()
            .events()
            .iter()
            .filter(|e| matches!(e, Event::Hold(_)))
            .collect();
        // direction change + 2 per clock + sample wait
        assert_eq!(holds.len(), 1 + 3 * 8 * 2 + 1);
    }

    #[test]
    fn test_switch_to_read_never_ready_hits_limit() {
        let config = DebuggerConfig::for_tests().with_ready_poll_limit(Some(5));
        let mut engine = ProtocolEngine::new(MockLines::new(InputMode::High), config);
        engine.configure_active();
        engine.enter_debug_mode().unwrap();
        engine.lines_mut().clear();

        // Under an unbounded wait this would spin forever; the injected
        // bound turns it into exactly five polls and an error.
        assert_eq!(engine.switch_to_read(), Err(Error::TargetNotReady));
        assert_eq!(engine.lines().rising_edges(Line::Clock), 5 * 8);
        assert_eq!(engine.state().last_error, Some(Error::TargetNotReady));
        assert_eq!(engine.state().dd_direction, Direction::Input);
    }

    #[test]
    fn test_unbounded_wait_outlasts_default_limit() {
        let busy = 2 * crate::session::DEFAULT_READY_POLL_LIMIT;
        let mut bits: std::collections::VecDeque<bool> = (0..busy).map(|_| true).collect();
        bits.push_back(false);

        let config = DebuggerConfig::for_tests().with_ready_poll_limit(None);
        let mut engine = ProtocolEngine::new(MockLines::new(InputMode::Bits(bits)), config);
        engine.configure_active();
        engine.enter_debug_mode().unwrap();
        engine.lines_mut().clear();

        assert_eq!(engine.switch_to_read(), Ok(()));
        assert_eq!(engine.lines().rising_edges(Line::Clock), busy as usize * 8);
        assert_eq!(engine.state().last_error, None);
    }

    #[test]
    fn test_direction_switch_is_idempotent() {
        let mut engine = debug_engine(InputMode::Low);
        engine.switch_to_write().unwrap();
        engine.switch_to_write().unwrap();
        let switches = engine
            .lines()
            .events()
            .iter()
            .filter(|e| matches!(e, Event::Direction(Line::DataOut, _)))
            .count();
        assert_eq!(switches, 1);
    }

    #[test]
    fn test_indicators_pulse_around_primitives() {
        let mut lines = MockLines::new(InputMode::Low);
        lines.enable_indicators();
        let mut engine = ProtocolEngine::new(lines, DebuggerConfig::for_tests());
        engine.configure_active();
        engine.enter_debug_mode().unwrap();
        engine.lines_mut().clear();

        engine.write_byte(0x00).unwrap();
        let events = engine.lines().events();
        assert_eq!(events.first(), Some(&Event::Level(Line::WriteIndicator, true)));
        assert_eq!(events.last(), Some(&Event::Level(Line::WriteIndicator, false)));

        engine.lines_mut().clear();
        engine.read_byte().unwrap();
        let events = engine.lines().events();
        assert_eq!(events.first(), Some(&Event::Level(Line::ReadIndicator, true)));
        assert_eq!(events.last(), Some(&Event::Level(Line::ReadIndicator, false)));
    }
}
