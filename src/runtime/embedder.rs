//! Free-function embedding API.
//!
//! Thin wrappers over [`SharedIsolateData`] and [`Environment`] for embedders
//! that prefer a flat, procedural surface:
//!
//! ```ignore
//! let data = create_isolate_data(&mut engine, event_loop.handle().clone(), v8_platform());
//! let mut env = create_environment(&data, engine.new_context(), args);
//! at_exit(&mut env, |_| flush_logs(), None);
//! // ...
//! run_at_exit(&mut env);
//! cleanup_handles(&mut env);
//! free_environment(env);
//! free_isolate_data(data);
//! ```

use super::at_exit::AtExitArgument;
use super::engine::{ContextHandle, EngineInstance};
use super::environment::Environment;
use super::isolate_data::SharedIsolateData;
use super::process_args::ProcessArguments;
use deno_core::v8;
use std::any::Any;

pub fn create_isolate_data(
    engine: &mut EngineInstance,
    event_loop: tokio::runtime::Handle,
    platform: v8::SharedRef<v8::Platform>,
) -> SharedIsolateData {
    SharedIsolateData::create(engine, event_loop, platform)
}

pub fn free_isolate_data(isolate_data: SharedIsolateData) {
    isolate_data.free();
}

pub fn create_environment(
    isolate_data: &SharedIsolateData,
    context: ContextHandle,
    process_arguments: ProcessArguments,
) -> Environment<'_> {
    Environment::create(isolate_data, context, process_arguments)
}

pub fn free_environment(env: Environment<'_>) {
    env.free();
}

pub fn cleanup_handles(env: &mut Environment<'_>) {
    env.cleanup_handles();
}

/// Register `callback` to run with `argument` when [`run_at_exit`] is called on `env`.
pub fn at_exit<F>(env: &mut Environment<'_>, callback: F, argument: Option<AtExitArgument>)
where
    F: FnOnce(Option<&dyn Any>) + 'static,
{
    env.register_at_exit(callback, argument);
}

pub fn run_at_exit(env: &mut Environment<'_>) {
    env.run_at_exit();
}
