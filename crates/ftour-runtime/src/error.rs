#![forbid(unsafe_code)]

//! Error types.
//!
//! | Error | Raised by | Controller behaviour |
//! |-------|-----------|----------------------|
//! | [`CapabilityError`] | navigator, narrator, UI surface | logged at `warn`, step continues |
//! | [`TourError::Script`] | script loading | tour is not started |
//! | [`TourError::InvalidConfig`] | `try_from_env` | caller decides; `from_env` ignores |

use std::fmt;

use ftour_script::ScriptError;

/// Failure reported by a host capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// The capability is absent in this host (no speech engine, headless UI).
    Unavailable(&'static str),
    /// The host refused the request.
    Rejected(String),
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityError::Unavailable(what) => write!(f, "{what} unavailable"),
            CapabilityError::Rejected(msg) => write!(f, "request rejected: {msg}"),
        }
    }
}

impl std::error::Error for CapabilityError {}

/// Result type for capability calls.
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Errors surfaced to the application embedding the tour.
#[derive(Debug)]
pub enum TourError {
    Script(ScriptError),
    /// An `FTOUR_*` variable held an unparsable value.
    InvalidConfig { key: &'static str, value: String },
}

impl fmt::Display for TourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TourError::Script(e) => write!(f, "script error: {e}"),
            TourError::InvalidConfig { key, value } => {
                write!(f, "invalid value for {key}: {value:?}")
            }
        }
    }
}

impl std::error::Error for TourError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TourError::Script(e) => Some(e),
            TourError::InvalidConfig { .. } => None,
        }
    }
}

impl From<ScriptError> for TourError {
    fn from(e: ScriptError) -> Self {
        TourError::Script(e)
    }
}

/// Result type for tour setup.
pub type TourResult<T> = Result<T, TourError>;
