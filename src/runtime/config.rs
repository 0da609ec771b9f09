//! Engine configuration.
//!
//! This module defines the configuration used to construct an
//! [`EngineInstance`](super::engine::EngineInstance): heap limits and an
//! optional bootstrap script.

use super::error::EngineError;

/// Configuration for a single engine instance (one V8 isolate).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum heap size in bytes (None = V8 default)
    pub max_heap_size: Option<usize>,

    /// Initial heap size in bytes (None = V8 default)
    pub initial_heap_size: Option<usize>,

    /// Bootstrap script to run in the main context on startup
    pub bootstrap_script: Option<String>,
}

impl EngineConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_heap_size(mut self, bytes: usize) -> Self {
        self.max_heap_size = Some(bytes);
        self
    }

    pub fn with_initial_heap_size(mut self, bytes: usize) -> Self {
        self.initial_heap_size = Some(bytes);
        self
    }

    pub fn with_bootstrap(mut self, source: String) -> Self {
        self.bootstrap_script = Some(source);
        self
    }

    /// Resolve the heap limits to hand to V8.
    ///
    /// Returns `Ok(None)` when no limits are configured, `Ok(Some((initial, max)))`
    /// otherwise.
    pub fn heap_limits(&self) -> Result<Option<(usize, usize)>, EngineError> {
        match (self.initial_heap_size, self.max_heap_size) {
            (Some(_), None) => Err(EngineError::InitialHeapWithoutMax),
            (Some(initial), Some(max)) if initial > max => {
                Err(EngineError::InitialHeapExceedsMax { initial, max })
            }
            (initial, Some(max)) => Ok(Some((initial.unwrap_or(0), max))),
            (None, None) => Ok(None),
        }
    }
}
