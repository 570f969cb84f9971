//! Command implementations

mod erase;
mod info;

pub use erase::run_erase;
pub use info::{run_info, run_status};

use ccdebug_core::{CcDebugger, DebugStatus, LineController};

/// Errors raised by the CLI commands on top of the debugger's own
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Debug interface failure
    #[error("debug interface error: {0}")]
    Debug(#[from] ccdebug_core::Error),
    /// Nothing answered the chip ID request
    #[error("no target detected (chip ID reads back as 0x{0:04X})")]
    NoTarget(u16),
    /// Erase still running after the poll budget
    #[error("chip erase did not finish after {0} status reads")]
    EraseTimeout(u32),
    /// Malformed instruction byte on the command line
    #[error("invalid instruction byte '{0}'")]
    InvalidByte(String),
}

/// Result type for CLI commands
pub type Result<T> = std::result::Result<T, CommandError>;

/// Enter debug mode and make sure something answers
pub fn attach<L: LineController>(dbg: &mut CcDebugger<L>) -> Result<ccdebug_core::ChipId> {
    dbg.enter_debug_mode()?;
    let id = dbg.chip_id()?;
    if !id.is_present() {
        return Err(CommandError::NoTarget(id.raw()));
    }
    log::debug!("Attached to {}", id);
    Ok(id)
}

/// Single-step `count` instructions, printing the PC after each
pub fn run_step<L: LineController>(dbg: &mut CcDebugger<L>, count: u32) -> Result<()> {
    attach(dbg)?;
    for _ in 0..count {
        let acc = dbg.step()?;
        let pc = dbg.get_pc()?;
        println!("PC=0x{:04X} A=0x{:02X}", pc, acc);
    }
    Ok(())
}

/// Run one instruction given as hex strings
pub fn run_exec<L: LineController>(dbg: &mut CcDebugger<L>, bytes: &[String]) -> Result<()> {
    let opcode = parse_instruction(bytes)?;
    attach(dbg)?;

    let acc = match opcode.as_slice() {
        [a] => dbg.exec1(*a)?,
        [a, b] => dbg.exec2(*a, *b)?,
        [a, b, c] => dbg.exec3(*a, *b, *c)?,
        _ => return Err(CommandError::InvalidByte(bytes.join(" "))),
    };
    println!("A=0x{:02X}", acc);
    Ok(())
}

/// Leave debug mode, letting the CPU run
pub fn run_resume<L: LineController>(dbg: &mut CcDebugger<L>) -> Result<DebugStatus> {
    attach(dbg)?;
    let status = DebugStatus::from_bits_retain(dbg.exit_debug_mode()?);
    println!("Resumed (status=0x{:02X})", status.bits());
    Ok(status)
}

fn parse_instruction(bytes: &[String]) -> Result<Vec<u8>> {
    bytes
        .iter()
        .map(|s| {
            let digits = s
                .strip_prefix("0x")
                .or_else(|| s.strip_prefix("0X"))
                .unwrap_or(s);
            u8::from_str_radix(digits, 16).map_err(|_| CommandError::InvalidByte(s.clone()))
        })
        .collect()
}
