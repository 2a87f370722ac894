//! Error types for the Screenplay core

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::ability::AbilityKind;
use crate::driver::DriverError;

/// Result type alias using the Screenplay Error
pub type Result<T> = std::result::Result<T, Error>;

/// Why an element interaction did not happen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionFailure {
    /// No element ever matched the locator
    ElementNotFound,
    /// An element matched but never reached the required state
    Timeout { waited: Duration },
    /// The driver refused the action itself
    Rejected(String),
}

impl fmt::Display for InteractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionFailure::ElementNotFound => f.write_str("element not found"),
            InteractionFailure::Timeout { waited } => {
                write!(f, "not ready after {}ms", waited.as_millis())
            }
            InteractionFailure::Rejected(reason) => write!(f, "rejected: {}", reason),
        }
    }
}

impl InteractionFailure {
    /// Classifies a driver failure raised while waiting on or acting upon an element
    pub fn from_driver(error: DriverError) -> Self {
        match error {
            DriverError::ElementNotFound { .. } => InteractionFailure::ElementNotFound,
            DriverError::Timeout { timeout, .. } => InteractionFailure::Timeout { waited: timeout },
            other => InteractionFailure::Rejected(other.to_string()),
        }
    }
}

/// Screenplay error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Actor {actor} does not have the ability {ability}")]
    MissingAbility { actor: String, ability: AbilityKind },

    #[error("Could not {action} '{locator}': {reason}")]
    Interaction {
        action: &'static str,
        locator: String,
        reason: InteractionFailure,
    },

    #[error("Navigation to {url} did not complete: {source}")]
    Navigation {
        url: String,
        #[source]
        source: DriverError,
    },

    #[error("Ability unavailable: {0}")]
    AbilityUnavailable(String),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Unknown environment: {name}. Available: {}", .available.join(", "))]
    UnknownEnvironment { name: String, available: Vec<String> },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn interaction(action: &'static str, locator: &str, error: DriverError) -> Self {
        Error::Interaction {
            action,
            locator: locator.to_string(),
            reason: InteractionFailure::from_driver(error),
        }
    }

    /// Whether this failure came from an element wait exceeding its budget
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Interaction {
                reason: InteractionFailure::Timeout { .. },
                ..
            } | Error::Driver(DriverError::Timeout { .. })
                | Error::Navigation {
                    source: DriverError::Timeout { .. },
                    ..
                }
        )
    }
}
