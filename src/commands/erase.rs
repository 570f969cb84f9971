//! Chip erase command

use super::{attach, CommandError, Result};
use ccdebug_core::{CcDebugger, LineController};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Start a mass erase and wait for the busy flag to clear
pub fn run_erase<L: LineController>(dbg: &mut CcDebugger<L>, max_polls: u32) -> Result<()> {
    let id = attach(dbg)?;
    log::info!("Erasing {}", id);
    dbg.chip_erase()?;

    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message("Erasing...");

    for _ in 0..max_polls {
        let status = dbg.read_status()?;
        if !status.erase_busy() {
            pb.finish_with_message("Erase complete");
            return Ok(());
        }
        pb.tick();
        std::thread::sleep(POLL_INTERVAL);
    }

    pb.abandon_with_message("Erase timed out");
    Err(CommandError::EraseTimeout(max_polls))
}

#[cfg(all(test, feature = "sim"))]
mod tests {
    use super::*;
    use ccdebug_core::{DebuggerConfig, Timing};
    use ccdebug_sim::{SimConfig, SimTarget};

    fn debugger(erase_status_reads: u32) -> CcDebugger<SimTarget> {
        let sim = SimTarget::new(SimConfig {
            erase_status_reads,
            ..SimConfig::default()
        });
        CcDebugger::new(sim, DebuggerConfig::default().with_timing(Timing::zero()))
    }

    #[test]
    fn test_erase_waits_for_busy_flag() {
        let mut dbg = debugger(2);
        run_erase(&mut dbg, 10).unwrap();
    }

    #[test]
    fn test_erase_timeout() {
        let mut dbg = debugger(50);
        assert!(matches!(
            run_erase(&mut dbg, 3),
            Err(CommandError::EraseTimeout(3))
        ));
    }
}
