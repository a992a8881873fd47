//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use kiln_core::LoadError;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The arena's fixed capacity cannot hold the request.
    ///
    /// Arenas never grow, so this is final for the arena's lifetime.
    CapacityExceeded {
        /// Name of the arena.
        arena: &'static str,
        /// Number of bytes (or records) requested.
        requested: usize,
        /// Number of bytes (or records) already in use.
        used: usize,
        /// Total capacity.
        capacity: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                arena,
                requested,
                used,
                capacity,
            } => {
                write!(
                    f,
                    "{arena} arena capacity exceeded: requested {requested}, \
                     used {used} of {capacity}"
                )
            }
        }
    }
}

impl Error for ArenaError {}

impl From<ArenaError> for LoadError {
    fn from(e: ArenaError) -> Self {
        match e {
            ArenaError::CapacityExceeded {
                arena,
                requested,
                capacity,
                ..
            } => LoadError::AllocationExhausted {
                arena,
                requested,
                capacity,
            },
        }
    }
}
