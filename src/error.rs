//! Errors raised by the tour core.
//!
//! Bounds and empty inputs are never errors: index operations clamp and an empty
//! query is skipped. What remains are construction-time failures and pattern
//! compilation failures, all local to the call that produced them.

use thiserror::Error;

/// Errors specific to building and driving a tour
#[derive(Error, Debug)]
pub enum TourError {
    #[error("step {step} has no heading to use as its title")]
    MissingTitle { step: usize },

    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("search pattern could not be compiled: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("unknown key name '{0}'")]
    UnknownKey(String),

    #[error("invalid tour manifest: {0}")]
    Manifest(String),

    #[error("failed to read tour: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = TourError> = std::result::Result<T, E>;
