//! Error types for ccdebug-core
//!
//! The debug interface has a deliberately small failure taxonomy. Every
//! rejected call is also recorded as the session's last error, see
//! [`SessionState::last_error`](crate::state::SessionState).

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// Operation attempted while the debugger is deactivated
    Inactive,
    /// Operation requires debug mode but the target is not in it
    NotInDebugMode,
    /// Target kept `DD` high for longer than the configured ready poll limit
    TargetNotReady,
}

impl Error {
    /// Numeric error code as reported by the sentinel API
    ///
    /// `0` is reserved for "no error".
    pub const fn code(self) -> u8 {
        match self {
            Self::Inactive => 1,
            Self::NotInDebugMode => 2,
            Self::TargetNotReady => 3,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactive => write!(f, "debugger is not active"),
            Self::NotInDebugMode => write!(f, "target is not in debug mode"),
            Self::TargetNotReady => write!(f, "target did not signal ready"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
