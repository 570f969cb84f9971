//! Debug command catalogue
//!
//! Each function here is one fixed transaction over the
//! [`ProtocolEngine`]. All of them require an active session in debug mode
//! and leave the data line in output direction on success.
//!
//! | Function | Written | Response |
//! |----------|---------|----------|
//! | [`resume`] | `48` | status |
//! | [`read_config`] | `20` | config |
//! | [`write_config`] | `18 cc` | config |
//! | [`exec1`] | `51 i0` | A |
//! | [`exec2`] | `52 i0 i1` | A |
//! | [`exec3`] | `53 i0 i1 i2` | A |
//! | [`exec_imm16`] | `53 i0 hh ll` | A |
//! | [`get_chip_id`] | `68` | chip, rev |
//! | [`get_pc`] | `28` | pc_hi, pc_lo |
//! | [`read_status`] | `30` | status |
//! | [`step`] | `58` | A |
//! | [`chip_erase`] | `10` | status |

pub mod opcodes;
mod transaction;

pub use transaction::{execute, Transaction, MAX_PARAMS, MAX_RESPONSE};

use crate::error::Result;
use crate::line::LineController;
use crate::protocol::ProtocolEngine;

/// Transaction with a one byte response
fn byte_command<L: LineController>(
    engine: &mut ProtocolEngine<L>,
    opcode: u8,
    params: &[u8],
) -> Result<u8> {
    let mut buf = [0u8; 1];
    execute(engine, &mut Transaction::with_params(opcode, params, &mut buf))?;
    Ok(buf[0])
}

/// Transaction with a two byte, high-byte-first response
fn word_command<L: LineController>(engine: &mut ProtocolEngine<L>, opcode: u8) -> Result<u16> {
    let mut buf = [0u8; 2];
    execute(engine, &mut Transaction::new(opcode, &mut buf))?;
    Ok(u16::from_be_bytes(buf))
}

/// Resume the CPU and leave debug mode, returning the debug status
///
/// The session's debug-mode flag is only cleared once the target answered.
pub fn resume<L: LineController>(engine: &mut ProtocolEngine<L>) -> Result<u8> {
    let status = byte_command(engine, opcodes::RESUME, &[])?;
    engine.state_mut().in_debug_mode = false;
    log::debug!("ccdebug: left debug mode (status 0x{:02X})", status);
    Ok(status)
}

/// Read the debug configuration byte
pub fn read_config<L: LineController>(engine: &mut ProtocolEngine<L>) -> Result<u8> {
    byte_command(engine, opcodes::RD_CONFIG, &[])
}

/// Write the debug configuration byte, returning the value read back
pub fn write_config<L: LineController>(engine: &mut ProtocolEngine<L>, config: u8) -> Result<u8> {
    byte_command(engine, opcodes::WR_CONFIG, &[config])
}

/// Execute a one byte instruction, returning the accumulator
pub fn exec1<L: LineController>(engine: &mut ProtocolEngine<L>, oc0: u8) -> Result<u8> {
    byte_command(engine, opcodes::DEBUG_INSTR_1, &[oc0])
}

/// Execute a two byte instruction, returning the accumulator
pub fn exec2<L: LineController>(engine: &mut ProtocolEngine<L>, oc0: u8, oc1: u8) -> Result<u8> {
    byte_command(engine, opcodes::DEBUG_INSTR_2, &[oc0, oc1])
}

/// Execute a three byte instruction, returning the accumulator
pub fn exec3<L: LineController>(
    engine: &mut ProtocolEngine<L>,
    oc0: u8,
    oc1: u8,
    oc2: u8,
) -> Result<u8> {
    byte_command(engine, opcodes::DEBUG_INSTR_3, &[oc0, oc1, oc2])
}

/// Execute an opcode with a 16-bit big-endian immediate
///
/// Shares `DEBUG_INSTR_3`: the immediate fills the two remaining slots
/// (e.g. `MOV DPTR,#imm16`).
pub fn exec_imm16<L: LineController>(
    engine: &mut ProtocolEngine<L>,
    oc0: u8,
    imm: u16,
) -> Result<u8> {
    let [hi, lo] = imm.to_be_bytes();
    byte_command(engine, opcodes::DEBUG_INSTR_3, &[oc0, hi, lo])
}

/// Read the chip ID, chip byte in the high half
pub fn get_chip_id<L: LineController>(engine: &mut ProtocolEngine<L>) -> Result<u16> {
    word_command(engine, opcodes::GET_CHIP_ID)
}

/// Read the program counter
pub fn get_pc<L: LineController>(engine: &mut ProtocolEngine<L>) -> Result<u16> {
    word_command(engine, opcodes::GET_PC)
}

/// Read the debug status byte
pub fn read_status<L: LineController>(engine: &mut ProtocolEngine<L>) -> Result<u8> {
    byte_command(engine, opcodes::READ_STATUS, &[])
}

/// Step one instruction, returning the accumulator
pub fn step<L: LineController>(engine: &mut ProtocolEngine<L>) -> Result<u8> {
    byte_command(engine, opcodes::STEP_INSTR, &[])
}

/// Start a mass erase, returning the debug status
///
/// The erase runs on after the command returns; poll the status for
/// `CHIP_ERASE_BUSY` to see when it finished.
pub fn chip_erase<L: LineController>(engine: &mut ProtocolEngine<L>) -> Result<u8> {
    log::info!("ccdebug: issuing chip erase");
    byte_command(engine, opcodes::CHIP_ERASE, &[])
}
