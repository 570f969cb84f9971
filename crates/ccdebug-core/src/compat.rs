//! Sentinel-value compatibility API
//!
//! Some callers expect the classic contract: every call returns a plain
//! value, `0` on rejection, and the caller checks a numeric error code
//! afterwards. [`SentinelApi`] provides that on top of [`CcDebugger`].
//!
//! A genuine response of `0` and a rejected call look the same here; only
//! [`SentinelApi::error`] tells them apart, so check it after every call
//! whose result matters. The `Result` API on [`CcDebugger`] has no such
//! ambiguity.

use crate::error::Result;
use crate::line::LineController;
use crate::session::CcDebugger;

/// Collapse a result to its value or the `0` sentinel
fn sentinel<T: Default>(result: Result<T>) -> T {
    result.unwrap_or_default()
}

/// Borrowed sentinel-returning view of a [`CcDebugger`]
pub struct SentinelApi<'a, L: LineController> {
    dbg: &'a mut CcDebugger<L>,
}

impl<'a, L: LineController> SentinelApi<'a, L> {
    pub(crate) fn new(dbg: &'a mut CcDebugger<L>) -> Self {
        Self { dbg }
    }

    /// Numeric last error: 0 none, 1 inactive, 2 not in debug mode,
    /// 3 target not ready
    pub fn error(&self) -> u8 {
        self.dbg.last_error().map_or(0, |e| e.code())
    }

    /// Activate or deactivate the debugger
    pub fn set_active(&mut self, on: bool) {
        self.dbg.activate(on)
    }

    /// Enter debug mode; always returns 0
    pub fn enter(&mut self) -> u8 {
        let _ = self.dbg.enter_debug_mode();
        0
    }

    /// Leave debug mode; always returns 0
    pub fn exit(&mut self) -> u8 {
        let _ = self.dbg.exit_debug_mode();
        0
    }

    /// Raw debug configuration, 0 on rejection
    pub fn get_config(&mut self) -> u8 {
        sentinel(self.dbg.get_config())
    }

    /// Write debug configuration, 0 on rejection
    pub fn set_config(&mut self, config: u8) -> u8 {
        sentinel(self.dbg.set_config(config))
    }

    /// Execute a one byte instruction, 0 on rejection
    pub fn exec1(&mut self, oc0: u8) -> u8 {
        sentinel(self.dbg.exec1(oc0))
    }

    /// Execute a two byte instruction, 0 on rejection
    pub fn exec2(&mut self, oc0: u8, oc1: u8) -> u8 {
        sentinel(self.dbg.exec2(oc0, oc1))
    }

    /// Execute a three byte instruction, 0 on rejection
    pub fn exec3(&mut self, oc0: u8, oc1: u8, oc2: u8) -> u8 {
        sentinel(self.dbg.exec3(oc0, oc1, oc2))
    }

    /// Execute an opcode with a 16-bit immediate, 0 on rejection
    pub fn execi(&mut self, oc0: u8, imm: u16) -> u8 {
        sentinel(self.dbg.exec_imm16(oc0, imm))
    }

    /// Chip ID, 0 on rejection
    pub fn get_chip_id(&mut self) -> u16 {
        sentinel(self.dbg.get_chip_id())
    }

    /// Program counter, 0 on rejection
    pub fn get_pc(&mut self) -> u16 {
        sentinel(self.dbg.get_pc())
    }

    /// Debug status, 0 on rejection
    pub fn get_status(&mut self) -> u8 {
        sentinel(self.dbg.get_status())
    }

    /// Step one instruction, 0 on rejection
    pub fn step(&mut self) -> u8 {
        sentinel(self.dbg.step())
    }

    /// Start a chip erase, 0 on rejection
    pub fn chip_erase(&mut self) -> u8 {
        sentinel(self.dbg.chip_erase())
    }
}
