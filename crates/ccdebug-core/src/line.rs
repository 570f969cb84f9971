//! Line controller abstraction
//!
//! The [`LineController`] trait is the only way the rest of the crate touches
//! hardware. It is intentionally minimal: set a level, read a level, change a
//! direction, and hold for a duration. Backends implement it for real GPIO
//! (Linux character devices, MCU pins) or for a simulated target.
//!
//! ## Line roles
//!
//! | Line | Role |
//! |------|------|
//! | `Reset` | Target reset, active low |
//! | `Clock` | Debug clock (`DC`), also used for the debug entry handshake |
//! | `DataIn` | Host-side input path of the bidirectional `DD` line |
//! | `DataOut` | Host-side output path of the bidirectional `DD` line |
//! | `ReadIndicator` | Optional activity output, high while reading |
//! | `WriteIndicator` | Optional activity output, high while writing |

use core::time::Duration;

/// Physical lines owned by a debugger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    /// Target reset (`RST`)
    Reset = 0,
    /// Debug clock / direction control (`DC`)
    Clock = 1,
    /// Data line, input path (`DD_I`)
    DataIn = 2,
    /// Data line, output path (`DD_O`)
    DataOut = 3,
    /// Read activity indicator (optional)
    ReadIndicator = 4,
    /// Write activity indicator (optional)
    WriteIndicator = 5,
}

impl Line {
    /// Number of line roles
    pub const COUNT: usize = 6;

    /// All line roles, in index order
    pub const ALL: [Line; Self::COUNT] = [
        Line::Reset,
        Line::Clock,
        Line::DataIn,
        Line::DataOut,
        Line::ReadIndicator,
        Line::WriteIndicator,
    ];

    /// The four lines every debugger must provide
    pub const REQUIRED: [Line; 4] = [Line::Reset, Line::Clock, Line::DataIn, Line::DataOut];

    /// Index into per-line tables
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether this line is an optional activity indicator
    pub const fn is_indicator(self) -> bool {
        matches!(self, Line::ReadIndicator | Line::WriteIndicator)
    }

    /// Short name as printed on debug headers
    pub const fn name(self) -> &'static str {
        match self {
            Line::Reset => "RST",
            Line::Clock => "DC",
            Line::DataIn => "DD_I",
            Line::DataOut => "DD_O",
            Line::ReadIndicator => "LED_R",
            Line::WriteIndicator => "LED_W",
        }
    }
}

/// Electrical direction of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// High impedance input
    #[default]
    Input,
    /// Driven output
    Output,
}

/// Minimal capability interface over the debugger's physical lines
///
/// Calls have an immediate, synchronous effect; nothing is buffered. The
/// trait is infallible: a backend that can fail mid-transfer logs the error
/// and carries on, so a bit stream is never abandoned half way.
pub trait LineController {
    /// Drive a line high or low
    fn set_level(&mut self, line: Line, high: bool);

    /// Sample the current level of a line
    fn level(&mut self, line: Line) -> bool;

    /// Configure a line as input or output
    fn set_direction(&mut self, line: Line, direction: Direction);

    /// Whether the backend has this line wired up
    ///
    /// The required lines are always present; indicators are optional and
    /// default to absent.
    fn has_line(&self, line: Line) -> bool {
        !line.is_indicator()
    }

    /// Busy-wait for the given duration without yielding
    fn hold(&mut self, duration: Duration);
}

impl<T: LineController + ?Sized> LineController for &mut T {
    fn set_level(&mut self, line: Line, high: bool) {
        (**self).set_level(line, high)
    }

    fn level(&mut self, line: Line) -> bool {
        (**self).level(line)
    }

    fn set_direction(&mut self, line: Line, direction: Direction) {
        (**self).set_direction(line, direction)
    }

    fn has_line(&self, line: Line) -> bool {
        (**self).has_line(line)
    }

    fn hold(&mut self, duration: Duration) {
        (**self).hold(duration)
    }
}

#[cfg(feature = "alloc")]
impl<T: LineController + ?Sized> LineController for alloc::boxed::Box<T> {
    fn set_level(&mut self, line: Line, high: bool) {
        (**self).set_level(line, high)
    }

    fn level(&mut self, line: Line) -> bool {
        (**self).level(line)
    }

    fn set_direction(&mut self, line: Line, direction: Direction) {
        (**self).set_direction(line, direction)
    }

    fn has_line(&self, line: Line) -> bool {
        (**self).has_line(line)
    }

    fn hold(&mut self, duration: Duration) {
        (**self).hold(duration)
    }
}
