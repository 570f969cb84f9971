//! ccdebug-linux-gpio - Linux GPIO backend for the CC debug interface
//!
//! This crate drives the CC debug interface from ordinary GPIO pins using the
//! Linux character device interface (gpiocdev), e.g. on a Raspberry Pi.
//!
//! # Example
//!
//! ```no_run
//! use ccdebug_core::{CcDebugger, DebuggerConfig};
//! use ccdebug_linux_gpio::{LinuxGpioConfig, LinuxGpioLines};
//!
//! let config = LinuxGpioConfig::new("/dev/gpiochip0", 24, 23, 22, 27);
//! //                                  device          RST DC DD_I DD_O
//! let lines = LinuxGpioLines::open(&config)?;
//!
//! let mut dbg = CcDebugger::new(lines, DebuggerConfig::default());
//! dbg.enter_debug_mode()?;
//! println!("Chip: {}", dbg.chip_id()?);
//! dbg.activate(false);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with the ccdebug CLI
//!
//! ```bash
//! ccdebug info -b linux_gpio:gpiochip=0,rst=24,dc=23,dd_i=22,dd_o=27
//!
//! # With activity LEDs
//! ccdebug info -b linux_gpio:dev=/dev/gpiochip0,rst=24,dc=23,dd_i=22,dd_o=27,led_r=5,led_w=6
//! ```
//!
//! # Wiring
//!
//! | Target pin | GPIO role | Notes |
//! |------------|-----------|-------|
//! | RESET_N    | `rst`     | |
//! | P2.2 (DC)  | `dc`      | |
//! | P2.1 (DD)  | `dd_i`    | Direct connection |
//! | P2.1 (DD)  | `dd_o`    | Through a series resistor (~1 kΩ) |
//! | GND        | GND       | |
//!
//! `DD_I` and `DD_O` both go to the target's single `DD` pin. The resistor
//! on `DD_O` protects against both sides driving at once.

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, LinuxGpioConfig, LinuxGpioLines};
pub use error::{LinuxGpioError, Result};

/// Open Linux GPIO lines from CLI-style options
///
/// See [`parse_options`] for the accepted keys.
pub fn open_linux_gpio(options: &[(&str, &str)]) -> Result<LinuxGpioLines> {
    let config = parse_options(options)?;
    LinuxGpioLines::open(&config)
}
