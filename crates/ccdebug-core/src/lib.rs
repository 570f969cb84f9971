//! ccdebug-core - Protocol engine for the CC debug interface
//!
//! This crate drives the two-wire in-circuit debug interface found on the
//! 8051-based CC253x/CC254x radio SoCs. It is designed to be `no_std`
//! compatible so the same engine can run on a host (via a GPIO backend) or
//! directly on a microcontroller acting as the debugger.
//!
//! The crate is layered bottom-up:
//!
//! - [`line`] - the [`LineController`] capability trait over the physical
//!   `RST`, `DC`, `DD_I` and `DD_O` lines
//! - [`protocol`] - debug mode entry, direction switching and bit-level
//!   byte transfer
//! - [`command`] - the fixed catalogue of debug transactions
//! - [`session`] - activation lifecycle and the consumer-facing
//!   [`CcDebugger`]
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable heap allocation
//!
//! # Example
//!
//! ```ignore
//! use ccdebug_core::{CcDebugger, DebuggerConfig};
//!
//! fn identify<L: ccdebug_core::LineController>(lines: L) -> ccdebug_core::Result<()> {
//!     let mut dbg = CcDebugger::new(lines, DebuggerConfig::default());
//!     dbg.enter_debug_mode()?;
//!     let chip = dbg.chip_id()?;
//!     println!("Found: {}", chip);
//!     dbg.exit_debug_mode()?;
//!     Ok(())
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod chip;
pub mod command;
pub mod compat;
pub mod error;
pub mod line;
pub mod protocol;
pub mod session;
pub mod state;
pub mod status;
pub mod timing;

#[cfg(test)]
mod testing;

pub use chip::ChipId;
pub use error::{Error, Result};
pub use line::{Direction, Line, LineController};
pub use protocol::ProtocolEngine;
pub use session::{CcDebugger, DebuggerConfig};
pub use state::SessionState;
pub use status::{DebugConfig, DebugStatus};
pub use timing::Timing;
