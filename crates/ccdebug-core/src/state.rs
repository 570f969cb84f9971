//! Session state

use crate::error::Error;
use crate::line::Direction;

/// Mutable state of a debug session
///
/// Owned by the [`ProtocolEngine`](crate::protocol::ProtocolEngine) and only
/// changed by it or by the session controller on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    /// Lines are configured and owned by the debugger
    pub active: bool,
    /// Target has been forced into debug mode
    pub in_debug_mode: bool,
    /// Most recent rejected operation, cleared on (de)activation and debug entry
    pub last_error: Option<Error>,
    /// Current direction of the data line, mirrors `DD_O`'s configuration
    pub dd_direction: Direction,
}

impl SessionState {
    /// State right after construction: active, out of debug mode, input
    pub const fn new() -> Self {
        Self {
            active: true,
            in_debug_mode: false,
            last_error: None,
            dd_direction: Direction::Input,
        }
    }

    /// Whether transactions may be issued
    pub const fn ready_for_commands(&self) -> bool {
        self.active && self.in_debug_mode
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
