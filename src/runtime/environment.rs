//! One isolated execution context on a shared engine instance.
//!
//! An [`Environment`] binds a single script context to the
//! [`SharedIsolateData`] of the engine it lives on and owns two pieces of
//! per-context teardown state: its AtExit registry and its retained
//! engine-level handles. Nothing in either is visible to another environment,
//! including ones built on the same isolate data.
//!
//! Teardown happens in a fixed order:
//!
//! ```text
//! env.run_at_exit();        // explicit, optional
//! env.cleanup_handles();    // before the environment is freed
//! env.free();               // discards pending AtExit entries, releases the context
//! isolate_data.free();      // after every environment on it is gone
//! ```

use super::at_exit::{AtExitArgument, AtExitRegistry};
use super::engine::ContextHandle;
use super::error::InvariantViolation;
use super::handle::{HandleCleanupQueue, HandleId};
use super::isolate_data::SharedIsolateData;
use super::process_args::ProcessArguments;
use deno_core::v8;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

static ENVIRONMENT_IDS: AtomicU64 = AtomicU64::new(1);

pub struct Environment<'d> {
    id: u64,
    isolate_data: &'d SharedIsolateData,
    process_arguments: ProcessArguments,
    at_exit: AtExitRegistry,
    handles: HandleCleanupQueue,
    // Declared last so it is released after everything above.
    context: ContextHandle,
}

impl<'d> Environment<'d> {
    /// Create an environment bound to `context`.
    ///
    /// `context` must have been created on the engine instance `isolate_data`
    /// was built for; anything else is a fatal invariant violation.
    pub fn create(
        isolate_data: &'d SharedIsolateData,
        context: ContextHandle,
        process_arguments: ProcessArguments,
    ) -> Self {
        if context.engine_id() != isolate_data.engine_id() {
            InvariantViolation::ForeignContext {
                expected: isolate_data.engine_id(),
                found: context.engine_id(),
            }
            .raise();
        }

        let id = ENVIRONMENT_IDS.fetch_add(1, Ordering::Relaxed);
        isolate_data.attach_environment();
        tracing::info!(
            env_id = id,
            isolate_data_id = isolate_data.id(),
            argc = process_arguments.argument_count(),
            "environment created"
        );

        Self {
            id,
            isolate_data,
            process_arguments,
            at_exit: AtExitRegistry::new(),
            handles: HandleCleanupQueue::new(),
            context,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn context(&self) -> &v8::Global<v8::Context> {
        self.context.global()
    }

    pub fn isolate_data(&self) -> &'d SharedIsolateData {
        self.isolate_data
    }

    pub fn process_arguments(&self) -> &ProcessArguments {
        &self.process_arguments
    }

    /// Register a shutdown hook on this environment.
    ///
    /// `callback` receives `argument` (or `None`) when [`run_at_exit`](Self::run_at_exit)
    /// is called. It is never run by [`free`](Self::free).
    pub fn register_at_exit<F>(&mut self, callback: F, argument: Option<AtExitArgument>)
    where
        F: FnOnce(Option<&dyn Any>) + 'static,
    {
        self.at_exit.register(callback, argument);
        tracing::debug!(
            env_id = self.id,
            pending = self.at_exit.len(),
            "at_exit callback registered"
        );
    }

    /// Run this environment's shutdown hooks, most recently registered first.
    ///
    /// The registry is empty afterwards, so calling this again without new
    /// registrations does nothing.
    pub fn run_at_exit(&mut self) {
        let ran = self.at_exit.run();
        tracing::debug!(env_id = self.id, ran, "at_exit callbacks run");
    }

    /// Number of shutdown hooks waiting for [`run_at_exit`](Self::run_at_exit).
    pub fn pending_at_exit(&self) -> usize {
        self.at_exit.len()
    }

    /// Retain an engine-level resource released by `cleanup` during
    /// [`cleanup_handles`](Self::cleanup_handles).
    pub fn register_handle_cleanup<F>(&mut self, cleanup: F) -> HandleId
    where
        F: FnOnce() + 'static,
    {
        self.handles.register(cleanup)
    }

    /// Spawn a watcher task on the shared event loop and retain it.
    ///
    /// The task is aborted by [`cleanup_handles`](Self::cleanup_handles).
    pub fn spawn_tracked<F>(&mut self, future: F) -> HandleId
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let task = self.isolate_data.event_loop().spawn(future);
        self.handles.track(task)
    }

    /// Stop retaining a handle whose owner already closed it.
    pub fn release_handle(&mut self, id: HandleId) -> bool {
        self.handles.forget(id)
    }

    /// Number of retained handles.
    pub fn pending_handles(&self) -> usize {
        self.handles.len()
    }

    /// Release every retained engine-level handle.
    ///
    /// Must run before [`free`](Self::free). Calling it again is harmless.
    pub fn cleanup_handles(&mut self) {
        let released = self.handles.cleanup();
        tracing::debug!(env_id = self.id, released, "environment handles cleaned up");
    }

    /// Free the environment.
    ///
    /// Pending AtExit entries are discarded without running. Freeing an
    /// environment that still retains handles is a fatal invariant violation.
    pub fn free(self) {
        let pending = self.handles.len();
        if pending != 0 {
            InvariantViolation::HandlesNotCleanedUp {
                env_id: self.id,
                pending,
            }
            .raise();
        }
        tracing::info!(env_id = self.id, "environment freed");
    }
}

impl Drop for Environment<'_> {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            tracing::warn!(
                env_id = self.id,
                pending = self.handles.len(),
                "environment dropped without cleanup_handles; releasing handles now"
            );
            self.handles.cleanup();
        }

        let discarded = self.at_exit.clear();
        if discarded > 0 {
            tracing::warn!(
                env_id = self.id,
                discarded,
                "discarding at_exit callbacks that were never run"
            );
        }

        self.isolate_data.detach_environment();
    }
}

impl fmt::Debug for Environment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("id", &self.id)
            .field("isolate_data_id", &self.isolate_data.id())
            .field("pending_at_exit", &self.at_exit.len())
            .field("pending_handles", &self.handles.len())
            .finish_non_exhaustive()
    }
}
