//! jsenv: isolated execution environments on a shared `deno_core` engine.
//!
//! This crate is the embedder-facing lifecycle layer: it creates per-engine
//! [`SharedIsolateData`], builds independent [`Environment`]s on it, and gives
//! each environment its own AtExit registry for deterministic shutdown hooks.
//! It does not run user code or expose anything to scripts.

pub mod runtime;

pub use runtime::embedder;
pub use runtime::{
    is_platform_initialized, new_event_loop, v8_platform, AtExitArgument, AtExitRegistry,
    ContextHandle, EngineConfig, EngineError, EngineId, EngineInstance, Environment, HandleId,
    InvariantViolation, ProcessArguments, SharedIsolateData,
};
