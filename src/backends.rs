//! Backend registration and dispatch
//!
//! A backend string has the form `name` or `name:key=value,key=value`, for
//! example `sim:chip=0x41` or `linux_gpio:gpiochip=0,rst=24,dc=23,dd_i=22,dd_o=27`.

use ccdebug_core::LineController;

/// Information about a backend
pub struct BackendInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all backends enabled at compile time
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_backends() -> Vec<BackendInfo> {
    let mut backends = Vec::new();

    #[cfg(feature = "sim")]
    backends.push(BackendInfo {
        name: "sim",
        aliases: &["dummy"],
        description: "Simulated target for testing (chip=<id>,rev=<rev>,busy=<polls>)",
    });

    #[cfg(feature = "linux-gpio")]
    backends.push(BackendInfo {
        name: "linux_gpio",
        aliases: &["linux-gpio"],
        description: "Linux GPIO character device (dev=|gpiochip=,rst=,dc=,dd_i=,dd_o=[,led_r=,led_w=])",
    });

    backends
}

/// Comma separated list of backend names for help text
pub fn backend_names_short() -> String {
    available_backends()
        .iter()
        .map(|b| b.name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parsed backend string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendParams {
    /// Backend name
    pub name: String,
    /// Options in the order given
    pub params: Vec<(String, String)>,
}

impl BackendParams {
    /// Options as borrowed pairs, the form the backend crates take
    pub fn as_pairs(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Split a backend string into name and options
pub fn parse_backend_params(s: &str) -> Result<BackendParams, Box<dyn std::error::Error>> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    let mut params = Vec::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.push((key.to_string(), value.to_string()));
            } else {
                return Err(
                    format!("Invalid parameter format: '{}' (expected key=value)", opt).into(),
                );
            }
        }
    }

    Ok(BackendParams {
        name: name.to_string(),
        params,
    })
}

/// Open the lines for a backend string
pub fn open_backend(
    backend: &str,
) -> Result<Box<dyn LineController>, Box<dyn std::error::Error>> {
    let params = parse_backend_params(backend)?;

    match params.name.as_str() {
        #[cfg(feature = "sim")]
        "sim" | "dummy" => open_sim(&params),

        #[cfg(feature = "linux-gpio")]
        "linux_gpio" | "linux-gpio" => {
            let lines = ccdebug_linux_gpio::open_linux_gpio(&params.as_pairs())?;
            Ok(Box::new(lines))
        }

        _ => Err(format!(
            "Unknown backend: {} (available: {})",
            params.name,
            backend_names_short()
        )
        .into()),
    }
}

#[cfg(feature = "sim")]
fn open_sim(params: &BackendParams) -> Result<Box<dyn LineController>, Box<dyn std::error::Error>> {
    use ccdebug_sim::{SimConfig, SimTarget};

    let mut config = SimConfig::default();
    for (key, value) in &params.params {
        match key.as_str() {
            "chip" => config.chip_id = parse_hex_u8(value)?,
            "rev" => config.revision = parse_hex_u8(value)?,
            "busy" => config.busy_polls = value.parse()?,
            _ => log::warn!("sim: Unknown option: {}={}", key, value),
        }
    }

    log::info!(
        "sim: Simulated target chip=0x{:02X} rev=0x{:02X}",
        config.chip_id,
        config.revision
    );
    Ok(Box::new(SimTarget::new(config)))
}

/// Parse a hex (`0x` prefixed) or decimal byte
pub fn parse_hex_u8(s: &str) -> Result<u8, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value '{}': {}", s, e))
    } else {
        s.parse::<u8>()
            .map_err(|e| format!("Invalid number '{}': {}", s, e))
    }
}
