//! Error types for Linux GPIO debugger operations

use thiserror::Error;

/// Linux GPIO debugger specific errors
#[derive(Debug, Error)]
pub enum LinuxGpioError {
    /// Failed to request GPIO lines
    #[error("Failed to request GPIO lines on '{path}': {source}")]
    LineRequestFailed {
        path: String,
        #[source]
        source: gpiocdev::Error,
    },

    /// Invalid parameter value
    #[error("Invalid value for {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },

    /// Missing required parameter
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// GPIO chip or device not specified
    #[error("No GPIO chip specified. Use dev=/dev/gpiochipN or gpiochip=N")]
    NoDevice,

    /// Both dev and gpiochip given
    #[error("Only one of 'dev' or 'gpiochip' can be specified")]
    ConflictingDevice,

    /// The same GPIO offset is used for two roles
    #[error("GPIO line {offset} assigned to both {first} and {second}")]
    DuplicateLine {
        offset: u32,
        first: &'static str,
        second: &'static str,
    },
}

/// Result type for Linux GPIO debugger operations
pub type Result<T> = std::result::Result<T, LinuxGpioError>;
