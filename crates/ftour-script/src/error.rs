#![forbid(unsafe_code)]

//! Script validation and loading errors.

use std::fmt;

use crate::step::ActionKind;

/// Why a script was rejected.
#[derive(Debug)]
pub enum ScriptError {
    /// The script has no steps.
    Empty,
    /// Two steps share an id.
    DuplicateStepId(String),
    /// A step declares a zero duration.
    ZeroDuration { step: String },
    /// The host cannot resolve a step route.
    UnknownRoute { step: String, route: String },
    /// A scroll/point/highlight action without a selector.
    MissingSelector {
        step: String,
        action: usize,
        kind: ActionKind,
    },
    /// A move action without a position.
    MissingPosition { step: String, action: usize },
    /// A move target outside `[0, 100]²`.
    PositionOutOfRange {
        step: String,
        action: usize,
        x: f32,
        y: f32,
    },
    /// JSON decode failure.
    Json(serde_json::Error),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Empty => write!(f, "script has no steps"),
            ScriptError::DuplicateStepId(id) => write!(f, "duplicate step id: {id}"),
            ScriptError::ZeroDuration { step } => {
                write!(f, "step {step}: duration must be greater than zero")
            }
            ScriptError::UnknownRoute { step, route } => {
                write!(f, "step {step}: route {route} is not known to the host")
            }
            ScriptError::MissingSelector { step, action, kind } => {
                write!(f, "step {step}: {kind} action #{action} needs a selector")
            }
            ScriptError::MissingPosition { step, action } => {
                write!(f, "step {step}: move action #{action} needs a position")
            }
            ScriptError::PositionOutOfRange { step, action, x, y } => write!(
                f,
                "step {step}: move action #{action} targets ({x}, {y}), outside 0-100"
            ),
            ScriptError::Json(e) => write!(f, "invalid script JSON: {e}"),
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScriptError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ScriptError {
    fn from(e: serde_json::Error) -> Self {
        ScriptError::Json(e)
    }
}

/// Result type for script operations.
pub type ScriptResult<T> = Result<T, ScriptError>;
