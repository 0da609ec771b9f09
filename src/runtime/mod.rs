//! Environment lifecycle and shutdown hooks for embedders of `deno_core`.
//!
//! One engine instance (a V8 isolate) can host many environments. Each
//! environment is bound to its own context and owns its own AtExit registry
//! and retained handles; the engine-instance-wide handles (event loop,
//! platform) live in a [`SharedIsolateData`] that every environment on that
//! instance borrows.

pub mod at_exit;
pub mod config;
pub mod embedder;
pub mod engine;
pub mod environment;
pub mod error;
pub mod handle;
pub mod isolate_data;
pub mod process_args;

use deno_core::v8;
use once_cell::sync::OnceCell;

/// Global V8 platform instance.
///
/// V8 accepts exactly one platform per process. It is created on first access
/// and handed to every engine instance and isolate data.
static V8_PLATFORM: OnceCell<v8::SharedRef<v8::Platform>> = OnceCell::new();

/// Shared handle to the process-wide V8 platform.
///
/// Safe to call any number of times; the platform is created once.
pub fn v8_platform() -> v8::SharedRef<v8::Platform> {
    V8_PLATFORM
        .get_or_init(|| v8::new_default_platform(0, false).make_shared())
        .clone()
}

/// Check if the V8 platform has been created.
pub fn is_platform_initialized() -> bool {
    V8_PLATFORM.get().is_some()
}

// Re-export key types for convenience
pub use at_exit::{AtExitArgument, AtExitRegistry};
pub use config::EngineConfig;
pub use engine::{new_event_loop, ContextHandle, EngineId, EngineInstance};
pub use environment::Environment;
pub use error::{EngineError, InvariantViolation};
pub use handle::HandleId;
pub use isolate_data::SharedIsolateData;
pub use process_args::ProcessArguments;
