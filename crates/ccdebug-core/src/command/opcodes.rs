//! Debug command opcodes
//!
//! First byte of every debug transaction. The low bits of the
//! `DEBUG_INSTR_*` opcodes carry the number of instruction bytes that follow.

/// Erase flash, configuration and lock bits
pub const CHIP_ERASE: u8 = 0x10;
/// Write the debug configuration byte
pub const WR_CONFIG: u8 = 0x18;
/// Read the debug configuration byte
pub const RD_CONFIG: u8 = 0x20;
/// Read the program counter (2 bytes, high first)
pub const GET_PC: u8 = 0x28;
/// Read the debug status byte
pub const READ_STATUS: u8 = 0x30;
/// Resume CPU execution, leaving debug mode
pub const RESUME: u8 = 0x48;
/// Execute a 1-byte instruction
pub const DEBUG_INSTR_1: u8 = 0x51;
/// Execute a 2-byte instruction
pub const DEBUG_INSTR_2: u8 = 0x52;
/// Execute a 3-byte instruction
pub const DEBUG_INSTR_3: u8 = 0x53;
/// Step one instruction
pub const STEP_INSTR: u8 = 0x58;
/// Read the chip ID (2 bytes: chip, revision)
pub const GET_CHIP_ID: u8 = 0x68;

/// Human readable name of a command opcode
pub fn name(opcode: u8) -> &'static str {
    match opcode {
        CHIP_ERASE => "CHIP_ERASE",
        WR_CONFIG => "WR_CONFIG",
        RD_CONFIG => "RD_CONFIG",
        GET_PC => "GET_PC",
        READ_STATUS => "READ_STATUS",
        RESUME => "RESUME",
        DEBUG_INSTR_1 => "DEBUG_INSTR_1",
        DEBUG_INSTR_2 => "DEBUG_INSTR_2",
        DEBUG_INSTR_3 => "DEBUG_INSTR_3",
        STEP_INSTR => "STEP_INSTR",
        GET_CHIP_ID => "GET_CHIP_ID",
        _ => "UNKNOWN",
    }
}
