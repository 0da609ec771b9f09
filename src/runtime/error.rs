//! Error types for the embedding layer.
//!
//! Two kinds of failure exist here and they are deliberately kept apart:
//! - [`InvariantViolation`]: misuse by the embedder (wrong teardown order, a
//!   context from another engine). These are never handed back as values; they
//!   are raised and end the process.
//! - [`EngineError`]: ordinary setup failures of the engine helpers (bad heap
//!   limits, a failing bootstrap script). These are returned as `Result`.

use super::engine::EngineId;
use thiserror::Error;

/// A broken lifecycle invariant.
///
/// Construct one and call [`InvariantViolation::raise`]; there is no API that
/// returns it inside a `Result`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// The context handed to environment creation was created on a different
    /// engine instance than the isolate data.
    #[error("context belongs to engine {found}, but the isolate data was created for engine {expected}")]
    ForeignContext { expected: EngineId, found: EngineId },

    /// Isolate data was freed while environments built on it were still alive.
    #[error("isolate data {isolate_data_id} freed while {live} environment(s) still reference it")]
    IsolateDataInUse { isolate_data_id: u64, live: usize },

    /// An environment was freed before its engine-level handles were cleaned up.
    #[error("environment {env_id} freed with {pending} handle(s) still retained; call cleanup_handles first")]
    HandlesNotCleanedUp { env_id: u64, pending: usize },
}

impl InvariantViolation {
    /// Report the violation and terminate.
    ///
    /// Release builds are compiled with `panic = "abort"`, so this ends the
    /// process. In test builds it unwinds, which lets `#[should_panic]` observe it.
    #[cold]
    #[track_caller]
    pub fn raise(self) -> ! {
        tracing::error!(violation = %self, "fatal invariant violation");
        panic!("invariant violation: {self}")
    }
}

/// Recoverable failures while setting up the engine collaborator.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("initial_heap_size requires max_heap_size to be set as well")]
    InitialHeapWithoutMax,

    #[error("initial_heap_size ({initial}) cannot exceed max_heap_size ({max})")]
    InitialHeapExceedsMax { initial: usize, max: usize },

    #[error("bootstrap script failed: {0}")]
    Bootstrap(String),

    #[error("failed to build event loop: {0}")]
    EventLoop(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_messages() {
        let err = InvariantViolation::HandlesNotCleanedUp {
            env_id: 7,
            pending: 2,
        };
        assert_eq!(
            err.to_string(),
            "environment 7 freed with 2 handle(s) still retained; call cleanup_handles first"
        );

        let err = InvariantViolation::IsolateDataInUse {
            isolate_data_id: 3,
            live: 1,
        };
        assert!(err.to_string().contains("1 environment(s)"));
    }

    #[test]
    #[should_panic(expected = "invariant violation: isolate data 9 freed")]
    fn test_raise_panics() {
        InvariantViolation::IsolateDataInUse {
            isolate_data_id: 9,
            live: 4,
        }
        .raise();
    }

    #[test]
    fn test_engine_error_messages() {
        let err = EngineError::InitialHeapExceedsMax {
            initial: 20,
            max: 10,
        };
        assert_eq!(
            err.to_string(),
            "initial_heap_size (20) cannot exceed max_heap_size (10)"
        );
    }
}
