//! ccdebug-sim - Simulated CC debug target
//!
//! This crate provides a [`SimTarget`] that implements
//! [`LineController`] by emulating the target end of the wire: it watches
//! `RST` and `DC` for the debug entry handshake, shifts in command bytes on
//! rising clock edges, and answers on `DD` exactly like a real part would,
//! busy polls included. It is useful for testing and development without
//! real hardware.
//!
//! The CPU model is deliberately tiny: an accumulator, `DPTR`, a program
//! counter and XDATA memory, enough for the handful of 8051 instructions a
//! debugger typically injects.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;
use core::time::Duration;

use ccdebug_core::command::opcodes;
use ccdebug_core::{DebugConfig, DebugStatus, Direction, Line, LineController};

/// Configuration for the simulated target
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Chip ID byte returned by `GET_CHIP_ID`
    pub chip_id: u8,
    /// Revision byte returned by `GET_CHIP_ID`
    pub revision: u8,
    /// Busy polls (8 clocks each) before every response
    pub busy_polls: u32,
    /// Never signal ready
    pub never_ready: bool,
    /// XDATA size in bytes
    pub xdata_size: usize,
    /// `READ_STATUS` reads that still report an erase in progress
    pub erase_status_reads: u32,
    /// Whether the indicator lines exist
    pub indicators: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            chip_id: 0x8D, // CC2540
            revision: 0x03,
            busy_polls: 0,
            never_ready: false,
            xdata_size: 8 * 1024,
            erase_status_reads: 2,
            indicators: false,
        }
    }
}

/// What the target is doing with the data line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Shifting in command bytes
    Receive,
    /// Holding `DD` high, counting clocks
    Busy,
    /// Shifting out the response
    Transmit,
}

/// Simulated CC253x/CC254x target
pub struct SimTarget {
    config: SimConfig,

    // Host-side wire state
    levels: [bool; Line::COUNT],
    directions: [Direction; Line::COUNT],
    elapsed: Duration,

    // Debug interface
    entry_edges: u8,
    debug_mode: bool,
    phase: Phase,
    shift: u8,
    bits: u8,
    dd_target: bool,
    command: Vec<u8>,
    response: Vec<u8>,
    response_pos: usize,
    busy_left: u32,
    busy_edges: u8,
    busy_clocks: u32,
    commands: Vec<Vec<u8>>,

    // CPU
    acc: u8,
    dptr: u16,
    pc: u16,
    debug_config: DebugConfig,
    status: DebugStatus,
    erase_reads_left: u32,
    xdata: Vec<u8>,
}

impl SimTarget {
    /// Create a new simulated target with the given configuration
    pub fn new(config: SimConfig) -> Self {
        let xdata = vec![0u8; config.xdata_size];
        Self {
            levels: [false; Line::COUNT],
            directions: [Direction::Input; Line::COUNT],
            elapsed: Duration::ZERO,
            entry_edges: 0,
            debug_mode: false,
            phase: Phase::Receive,
            shift: 0,
            bits: 0,
            dd_target: false,
            command: Vec::new(),
            response: Vec::new(),
            response_pos: 0,
            busy_left: 0,
            busy_edges: 0,
            busy_clocks: 0,
            commands: Vec::new(),
            acc: 0,
            dptr: 0,
            pc: 0,
            debug_config: DebugConfig::empty(),
            status: DebugStatus::OSCILLATOR_STABLE,
            erase_reads_left: 0,
            xdata,
            config,
        }
    }

    /// Create a simulated CC2540 with default settings
    pub fn new_default() -> Self {
        Self::new(SimConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Whether the target latched debug mode
    pub fn in_debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// Every complete command received so far, opcode first
    pub fn commands(&self) -> &[Vec<u8>] {
        &self.commands
    }

    /// Clock pulses spent in busy polls
    pub fn busy_clocks(&self) -> u32 {
        self.busy_clocks
    }

    /// Total time the host asked to hold
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Current accumulator
    pub fn acc(&self) -> u8 {
        self.acc
    }

    /// Current program counter
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Set the program counter
    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    /// XDATA contents
    pub fn xdata(&self) -> &[u8] {
        &self.xdata
    }

    /// Mutable XDATA contents
    pub fn xdata_mut(&mut self) -> &mut [u8] {
        &mut self.xdata
    }

    /// Host-side level of a line
    pub fn host_level(&self, line: Line) -> bool {
        self.levels[line.index()]
    }

    /// Host-side direction of a line
    pub fn host_direction(&self, line: Line) -> Direction {
        self.directions[line.index()]
    }

    fn on_reset(&mut self, high: bool) {
        let was_high = self.levels[Line::Reset.index()];
        if !high && was_high {
            self.entry_edges = 0;
        } else if high && !was_high {
            self.debug_mode = self.entry_edges == 2;
            self.entry_edges = 0;
            self.start_receive();
            if self.debug_mode {
                self.status |= DebugStatus::CPU_HALTED;
                log::debug!("sim: entered debug mode");
            } else {
                self.status.remove(DebugStatus::CPU_HALTED);
            }
        }
    }

    fn on_clock_rising(&mut self) {
        if !self.levels[Line::Reset.index()] {
            self.entry_edges = self.entry_edges.saturating_add(1);
            return;
        }
        if !self.debug_mode {
            return;
        }

        match self.phase {
            Phase::Receive => {
                if self.directions[Line::DataOut.index()] != Direction::Output {
                    return;
                }
                self.shift = (self.shift << 1) | self.levels[Line::DataOut.index()] as u8;
                self.bits += 1;
                if self.bits == 8 {
                    let byte = self.shift;
                    self.shift = 0;
                    self.bits = 0;
                    self.on_byte(byte);
                }
            }
            Phase::Busy => {
                self.busy_clocks += 1;
                self.busy_edges += 1;
                if self.busy_edges == 8 {
                    self.busy_edges = 0;
                    if !self.config.never_ready {
                        self.busy_left = self.busy_left.saturating_sub(1);
                        if self.busy_left == 0 {
                            self.phase = Phase::Transmit;
                            self.dd_target = false;
                        }
                    }
                }
            }
            Phase::Transmit => {
                let byte = self.response.get(self.response_pos).copied().unwrap_or(0);
                self.dd_target = (byte >> (7 - self.bits)) & 1 != 0;
                self.bits += 1;
                if self.bits == 8 {
                    self.bits = 0;
                    self.response_pos += 1;
                }
            }
        }
    }

    fn start_receive(&mut self) {
        self.phase = Phase::Receive;
        self.shift = 0;
        self.bits = 0;
        self.command.clear();
    }

    fn on_byte(&mut self, byte: u8) {
        self.command.push(byte);
        if self.command.len() < command_len(self.command[0]) {
            return;
        }

        let command = core::mem::take(&mut self.command);
        log::trace!("sim: command {:02X?}", command);
        self.response = self.execute(&command);
        self.response_pos = 0;
        self.commands.push(command);

        if self.config.never_ready || self.config.busy_polls > 0 {
            self.phase = Phase::Busy;
            self.busy_left = self.config.busy_polls;
            self.busy_edges = 0;
            self.dd_target = true;
        } else {
            self.phase = Phase::Transmit;
            self.dd_target = false;
        }
    }

    fn execute(&mut self, command: &[u8]) -> Vec<u8> {
        match command[0] {
            opcodes::RESUME => {
                self.status.remove(DebugStatus::CPU_HALTED);
                vec![self.status.bits()]
            }
            opcodes::RD_CONFIG => vec![self.debug_config.bits()],
            opcodes::WR_CONFIG => {
                self.debug_config = DebugConfig::from_bits_retain(command[1]);
                vec![self.debug_config.bits()]
            }
            opcodes::DEBUG_INSTR_1 | opcodes::DEBUG_INSTR_2 | opcodes::DEBUG_INSTR_3 => {
                self.run_instruction(&command[1..]);
                vec![self.acc]
            }
            opcodes::GET_CHIP_ID => vec![self.config.chip_id, self.config.revision],
            opcodes::GET_PC => self.pc.to_be_bytes().to_vec(),
            opcodes::READ_STATUS => {
                let mut status = self.status;
                if self.erase_reads_left > 0 {
                    self.erase_reads_left -= 1;
                    status |= DebugStatus::CHIP_ERASE_BUSY;
                }
                vec![status.bits()]
            }
            opcodes::STEP_INSTR => {
                self.pc = self.pc.wrapping_add(1);
                vec![self.acc]
            }
            opcodes::CHIP_ERASE => {
                self.xdata.fill(0xFF);
                self.erase_reads_left = self.config.erase_status_reads;
                vec![(self.status | DebugStatus::CHIP_ERASE_BUSY).bits()]
            }
            other => {
                log::warn!("sim: unsupported command 0x{:02X}", other);
                vec![0]
            }
        }
    }

    fn run_instruction(&mut self, instr: &[u8]) {
        match *instr {
            // NOP
            [0x00] => {}
            // INC A
            [0x04] => self.acc = self.acc.wrapping_add(1),
            // MOV A,#imm
            [0x74, imm] => self.acc = imm,
            // MOV DPTR,#imm16
            [0x90, hi, lo] => self.dptr = u16::from_be_bytes([hi, lo]),
            // INC DPTR
            [0xA3] => self.dptr = self.dptr.wrapping_add(1),
            // MOVX A,@DPTR
            [0xE0] => self.acc = self.xdata_at(self.dptr),
            // MOVX @DPTR,A
            [0xF0] => {
                let len = self.xdata.len();
                if len > 0 {
                    let idx = self.dptr as usize % len;
                    self.xdata[idx] = self.acc;
                }
            }
            _ => log::warn!("sim: unsupported instruction {:02X?}", instr),
        }
        self.pc = self.pc.wrapping_add(instr.len() as u16);
    }

    fn xdata_at(&self, addr: u16) -> u8 {
        if self.xdata.is_empty() {
            0
        } else {
            self.xdata[addr as usize % self.xdata.len()]
        }
    }
}

/// Total command length in bytes, opcode included
fn command_len(opcode: u8) -> usize {
    match opcode {
        opcodes::WR_CONFIG | opcodes::DEBUG_INSTR_1 => 2,
        opcodes::DEBUG_INSTR_2 => 3,
        opcodes::DEBUG_INSTR_3 => 4,
        _ => 1,
    }
}

impl LineController for SimTarget {
    fn set_level(&mut self, line: Line, high: bool) {
        match line {
            Line::Reset => self.on_reset(high),
            Line::Clock => {
                if high && !self.levels[line.index()] {
                    // Latch the new level first so DD_O changes made while
                    // the clock is high are not sampled
                    self.levels[line.index()] = high;
                    self.on_clock_rising();
                    return;
                }
            }
            _ => {}
        }
        self.levels[line.index()] = high;
    }

    fn level(&mut self, line: Line) -> bool {
        match line {
            Line::DataIn => {
                if self.directions[Line::DataOut.index()] == Direction::Output {
                    // Host is driving the shared wire
                    self.levels[Line::DataOut.index()]
                } else if self.debug_mode {
                    self.dd_target
                } else {
                    false
                }
            }
            _ => self.levels[line.index()],
        }
    }

    fn set_direction(&mut self, line: Line, direction: Direction) {
        let previous = self.directions[line.index()];
        self.directions[line.index()] = direction;

        // Host took the data line back: the next bits are a new command
        if line == Line::DataOut
            && direction == Direction::Output
            && previous != Direction::Output
            && self.debug_mode
        {
            self.start_receive();
        }
    }

    fn has_line(&self, line: Line) -> bool {
        !line.is_indicator() || self.config.indicators
    }

    fn hold(&mut self, duration: Duration) {
        self.elapsed += duration;
    }
}
