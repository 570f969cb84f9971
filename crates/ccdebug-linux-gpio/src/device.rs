//! Linux GPIO line controller
//!
//! [`LinuxGpioLines`] implements [`LineController`] on top of a single
//! gpiocdev line request covering every configured line. Direction changes
//! reconfigure the whole request, so the kernel always sees one consistent
//! configuration.

use std::time::{Duration, Instant};

use crate::error::{LinuxGpioError, Result};

use gpiocdev::line::{Bias, Offset, Value};
use gpiocdev::request::{Config, Request};

use ccdebug_core::{Direction, Line, LineController};

/// Configuration for opening Linux GPIO debugger lines
#[derive(Debug, Clone, Default)]
pub struct LinuxGpioConfig {
    /// Device path (e.g., "/dev/gpiochip0")
    pub device: String,
    /// Target reset line offset
    pub rst: Offset,
    /// Debug clock line offset
    pub dc: Offset,
    /// Data line input path offset
    pub dd_i: Offset,
    /// Data line output path offset
    pub dd_o: Offset,
    /// Read activity LED offset (optional)
    pub led_r: Option<Offset>,
    /// Write activity LED offset (optional)
    pub led_w: Option<Offset>,
    /// Lower bound on every hold in nanoseconds (0 = use protocol timing as is)
    pub min_hold_ns: u64,
}

impl LinuxGpioConfig {
    /// Create a new configuration with the given device path and required lines
    pub fn new(
        device: impl Into<String>,
        rst: Offset,
        dc: Offset,
        dd_i: Offset,
        dd_o: Offset,
    ) -> Self {
        Self {
            device: device.into(),
            rst,
            dc,
            dd_i,
            dd_o,
            ..Default::default()
        }
    }

    /// Set activity indicator lines
    pub fn with_indicators(mut self, led_r: Option<Offset>, led_w: Option<Offset>) -> Self {
        self.led_r = led_r;
        self.led_w = led_w;
        self
    }

    /// Stretch every hold to at least `ns` nanoseconds
    ///
    /// For slow level shifters or long wires where the default protocol
    /// timing is too fast for the target to follow.
    pub fn with_min_hold_ns(mut self, ns: u64) -> Self {
        self.min_hold_ns = ns;
        self
    }

    /// Offsets indexed by [`Line::index`]
    fn offsets(&self) -> [Option<Offset>; Line::COUNT] {
        let mut offsets = [None; Line::COUNT];
        offsets[Line::Reset.index()] = Some(self.rst);
        offsets[Line::Clock.index()] = Some(self.dc);
        offsets[Line::DataIn.index()] = Some(self.dd_i);
        offsets[Line::DataOut.index()] = Some(self.dd_o);
        offsets[Line::ReadIndicator.index()] = self.led_r;
        offsets[Line::WriteIndicator.index()] = self.led_w;
        offsets
    }

    /// Check that no offset is used for two roles
    pub fn validate(&self) -> Result<()> {
        if self.device.is_empty() {
            return Err(LinuxGpioError::NoDevice);
        }

        let offsets = self.offsets();
        for (i, a) in Line::ALL.iter().enumerate() {
            for b in &Line::ALL[i + 1..] {
                if let (Some(x), Some(y)) = (offsets[a.index()], offsets[b.index()]) {
                    if x == y {
                        return Err(LinuxGpioError::DuplicateLine {
                            offset: x,
                            first: a.name(),
                            second: b.name(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Direction and last driven level of every requested line
///
/// gpiocdev reconfigures a request as a whole and sends the output value
/// of every line with it, so the config handed to `reconfigure` has to
/// carry the level each output currently holds.
#[derive(Debug, Clone)]
struct LineBook {
    offsets: [Option<Offset>; Line::COUNT],
    directions: [Direction; Line::COUNT],
    levels: [bool; Line::COUNT],
}

impl LineBook {
    fn new(offsets: [Option<Offset>; Line::COUNT]) -> Self {
        Self {
            offsets,
            directions: [Direction::Input; Line::COUNT],
            levels: [false; Line::COUNT],
        }
    }

    fn offset(&self, line: Line) -> Option<Offset> {
        self.offsets[line.index()]
    }

    fn is_output(&self, line: Line) -> bool {
        self.directions[line.index()] == Direction::Output
    }

    fn set_level(&mut self, line: Line, high: bool) {
        self.levels[line.index()] = high;
    }

    /// Record a direction change; a line turned to output starts low
    fn set_direction(&mut self, line: Line, direction: Direction) {
        if direction == Direction::Output && !self.is_output(line) {
            self.levels[line.index()] = false;
        }
        self.directions[line.index()] = direction;
    }

    /// Full request configuration for the recorded state
    fn request_config(&self) -> Config {
        let mut config = Config::default();
        for line in Line::ALL {
            let Some(offset) = self.offset(line) else {
                continue;
            };
            match self.directions[line.index()] {
                Direction::Output => {
                    config
                        .with_line(offset)
                        .as_output(to_value(self.levels[line.index()]));
                }
                Direction::Input => {
                    config
                        .with_line(offset)
                        .as_input()
                        .with_bias(Bias::Disabled);
                }
            }
        }
        config
    }
}

fn to_value(high: bool) -> Value {
    if high {
        Value::Active
    } else {
        Value::Inactive
    }
}

/// Debugger lines on a Linux GPIO chip
pub struct LinuxGpioLines {
    /// GPIO line request handle
    request: Request,
    /// Per-line state the request is reconfigured from
    book: LineBook,
    /// Lower bound applied to every hold
    min_hold: Duration,
}

impl LinuxGpioLines {
    /// Request the configured lines
    ///
    /// All lines start as inputs with bias disabled; the session
    /// configures them when it is created.
    pub fn open(config: &LinuxGpioConfig) -> Result<Self> {
        config.validate()?;

        log::debug!("linux_gpio: Opening device {}", config.device);

        let book = LineBook::new(config.offsets());

        let request = Request::from_config(book.request_config())
            .on_chip(&config.device)
            .with_consumer("ccdebug")
            .request()
            .map_err(|source| LinuxGpioError::LineRequestFailed {
                path: config.device.clone(),
                source,
            })?;

        log::info!(
            "linux_gpio: Opened {} (rst={}, dc={}, dd_i={}, dd_o={}{}{})",
            config.device,
            config.rst,
            config.dc,
            config.dd_i,
            config.dd_o,
            config
                .led_r
                .map(|o| format!(", led_r={}", o))
                .unwrap_or_default(),
            config
                .led_w
                .map(|o| format!(", led_w={}", o))
                .unwrap_or_default(),
        );

        if config.min_hold_ns > 0 {
            log::debug!("linux_gpio: Minimum hold {} ns", config.min_hold_ns);
        }

        Ok(Self {
            request,
            book,
            min_hold: Duration::from_nanos(config.min_hold_ns),
        })
    }
}

impl LineController for LinuxGpioLines {
    fn set_level(&mut self, line: Line, high: bool) {
        let Some(offset) = self.book.offset(line) else {
            return;
        };
        self.book.set_level(line, high);
        // Inputs only remember the level for the next turn to output
        if !self.book.is_output(line) {
            return;
        }
        if let Err(e) = self.request.set_value(offset, to_value(high)) {
            log::error!("linux_gpio: Failed to set {}: {}", line.name(), e);
        }
    }

    fn level(&mut self, line: Line) -> bool {
        let Some(offset) = self.book.offset(line) else {
            return false;
        };
        match self.request.value(offset) {
            Ok(Value::Active) => true,
            Ok(Value::Inactive) => false,
            Err(e) => {
                log::error!("linux_gpio: Failed to get {}: {}", line.name(), e);
                false
            }
        }
    }

    fn set_direction(&mut self, line: Line, direction: Direction) {
        if self.book.offset(line).is_none() {
            return;
        }
        self.book.set_direction(line, direction);

        if let Err(e) = self.request.reconfigure(&self.book.request_config()) {
            log::error!(
                "linux_gpio: Failed to configure {} as {:?}: {}",
                line.name(),
                direction,
                e
            );
        }
    }

    fn has_line(&self, line: Line) -> bool {
        self.book.offset(line).is_some()
    }

    fn hold(&mut self, duration: Duration) {
        let duration = duration.max(self.min_hold);
        if duration.is_zero() {
            return;
        }
        // Busy wait: scheduler sleeps are far too coarse for bit timing
        let deadline = Instant::now() + duration;
        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
    }
}

/// Parse backend options from a list of key-value pairs
///
/// # Supported Options
///
/// - `dev=/dev/gpiochipN` - GPIO chip device path (required, or use gpiochip)
/// - `gpiochip=N` - GPIO chip number (alternative to dev)
/// - `rst=N` - Reset line offset (required)
/// - `dc=N` - Debug clock line offset (required)
/// - `dd_i=N` or `ddi=N` - Data input line offset (required)
/// - `dd_o=N` or `ddo=N` - Data output line offset (required)
/// - `led_r=N` - Read activity LED (optional)
/// - `led_w=N` - Write activity LED (optional)
/// - `delay_ns=N` - Minimum hold time in nanoseconds (optional)
pub fn parse_options(options: &[(&str, &str)]) -> Result<LinuxGpioConfig> {
    let mut config = LinuxGpioConfig::default();
    let mut rst = None;
    let mut dc = None;
    let mut dd_i = None;
    let mut dd_o = None;
    let mut gpiochip: Option<u32> = None;

    for (key, value) in options {
        match *key {
            "dev" => config.device = value.to_string(),
            "gpiochip" => gpiochip = Some(parse_offset("gpiochip", value)?),
            "rst" => rst = Some(parse_offset("rst", value)?),
            "dc" => dc = Some(parse_offset("dc", value)?),
            "dd_i" | "ddi" => dd_i = Some(parse_offset("dd_i", value)?),
            "dd_o" | "ddo" => dd_o = Some(parse_offset("dd_o", value)?),
            "led_r" => config.led_r = Some(parse_offset("led_r", value)?),
            "led_w" => config.led_w = Some(parse_offset("led_w", value)?),
            "delay_ns" => {
                config.min_hold_ns =
                    value.parse().map_err(|_| LinuxGpioError::InvalidParameter {
                        name: "delay_ns",
                        value: value.to_string(),
                    })?;
            }
            _ => {
                log::warn!("linux_gpio: Unknown option: {}={}", key, value);
            }
        }
    }

    // Handle dev vs gpiochip
    match (config.device.is_empty(), gpiochip) {
        (true, Some(n)) => config.device = format!("/dev/gpiochip{}", n),
        (true, None) => return Err(LinuxGpioError::NoDevice),
        (false, Some(_)) => return Err(LinuxGpioError::ConflictingDevice),
        (false, None) => {}
    }

    config.rst = rst.ok_or(LinuxGpioError::MissingParameter("rst"))?;
    config.dc = dc.ok_or(LinuxGpioError::MissingParameter("dc"))?;
    config.dd_i = dd_i.ok_or(LinuxGpioError::MissingParameter("dd_i"))?;
    config.dd_o = dd_o.ok_or(LinuxGpioError::MissingParameter("dd_o"))?;

    config.validate()?;
    Ok(config)
}

fn parse_offset(name: &'static str, value: &str) -> Result<Offset> {
    value
        .parse()
        .map_err(|_| LinuxGpioError::InvalidParameter {
            name,
            value: value.to_string(),
        })
}
