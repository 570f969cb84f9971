//! Info and status commands

use super::{attach, Result};
use ccdebug_core::{CcDebugger, DebugStatus, LineController};

/// Print chip identity, PC, status and configuration
pub fn run_info<L: LineController>(dbg: &mut CcDebugger<L>) -> Result<()> {
    let id = attach(dbg)?;
    let pc = dbg.get_pc()?;
    let status = dbg.read_status()?;
    let config = dbg.read_config()?;

    println!("Chip:     {}", id);
    println!("PC:       0x{:04X}", pc);
    println!("Status:   0x{:02X}", status.bits());
    println!("Config:   0x{:02X} {:?}", config.bits(), config);
    if status.is_locked() {
        println!("Debug interface is locked; only chip erase is available");
    }
    Ok(())
}

/// Print the decoded status byte
pub fn run_status<L: LineController>(dbg: &mut CcDebugger<L>) -> Result<()> {
    attach(dbg)?;
    let status = dbg.read_status()?;
    println!("Status: 0x{:02X}", status.bits());
    print_flags(status);
    Ok(())
}

fn print_flags(status: DebugStatus) {
    for (name, flag) in status.iter_names() {
        println!("  {:<18} ({:#04x})", name, flag.bits());
    }
}
