//! Engine collaborator backed by `deno_core::JsRuntime`.
//!
//! The lifecycle layer never executes user code; it only needs an engine
//! instance to hang environments off and a way to create fresh contexts on it.
//! [`EngineInstance`] owns one `JsRuntime` (and therefore one V8 isolate) and
//! hands out [`ContextHandle`]s tagged with the engine they were created on.

use super::config::EngineConfig;
use super::error::EngineError;
use super::v8_platform;
use deno_core::{v8, JsRuntime, RuntimeOptions};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static ENGINE_IDS: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of an [`EngineInstance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineId(u64);

impl EngineId {
    fn next() -> Self {
        Self(ENGINE_IDS.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Exclusively owned handle to a script context.
///
/// Not `Clone`: an environment takes the handle by value and is the only owner
/// of the context for as long as it lives.
pub struct ContextHandle {
    engine_id: EngineId,
    context: v8::Global<v8::Context>,
}

impl ContextHandle {
    /// Engine instance this context was created on.
    pub fn engine_id(&self) -> EngineId {
        self.engine_id
    }

    pub fn global(&self) -> &v8::Global<v8::Context> {
        &self.context
    }
}

impl fmt::Debug for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextHandle")
            .field("engine_id", &self.engine_id)
            .finish_non_exhaustive()
    }
}

/// One engine instance: a V8 isolate with its main context.
pub struct EngineInstance {
    id: EngineId,
    js_runtime: JsRuntime,
}

impl EngineInstance {
    /// Create a new engine instance from `config`.
    ///
    /// Initializes the process-wide platform on first use.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let create_params = config
            .heap_limits()?
            .map(|(initial, max)| v8::CreateParams::default().heap_limits(initial, max));

        let mut js_runtime = JsRuntime::new(RuntimeOptions {
            create_params,
            v8_platform: Some(v8_platform()),
            ..Default::default()
        });

        if let Some(script) = config.bootstrap_script {
            js_runtime
                .execute_script("<bootstrap>", script)
                .map_err(|err| EngineError::Bootstrap(err.to_string()))?;
        }

        let id = EngineId::next();
        tracing::debug!(engine_id = id.get(), "engine instance created");
        Ok(Self { id, js_runtime })
    }

    pub fn id(&self) -> EngineId {
        self.id
    }

    /// Thread-safe, non-owning handle to the underlying isolate.
    pub fn isolate_handle(&mut self) -> v8::IsolateHandle {
        self.js_runtime.v8_isolate().thread_safe_handle()
    }

    /// Create a fresh, empty context on this engine.
    ///
    /// Each call yields an independent global object.
    pub fn new_context(&mut self) -> ContextHandle {
        let scope = &mut self.js_runtime.handle_scope();
        let context = v8::Context::new(scope, Default::default());
        let context = v8::Global::new(scope, context);
        ContextHandle {
            engine_id: self.id,
            context,
        }
    }

    /// Handle to the runtime's main context (the one the bootstrap ran in).
    pub fn main_context(&mut self) -> ContextHandle {
        ContextHandle {
            engine_id: self.id,
            context: self.js_runtime.main_context(),
        }
    }

    /// Read a global property of `context` as a string, if present.
    ///
    /// Used by embedders to inspect state a bootstrap script left behind.
    pub fn read_global(&mut self, context: &ContextHandle, name: &str) -> Option<String> {
        let scope = &mut self.js_runtime.handle_scope();
        let context = v8::Local::new(scope, &context.context);
        let scope = &mut v8::ContextScope::new(scope, context);
        let key = v8::String::new(scope, name)?;
        let value = context.global(scope).get(scope, key.into())?;
        if value.is_undefined() {
            return None;
        }
        Some(value.to_string(scope)?.to_rust_string_lossy(scope))
    }
}

impl fmt::Debug for EngineInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineInstance")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Build the single-threaded event loop an engine's environments share.
pub fn new_event_loop() -> Result<tokio::runtime::Runtime, EngineError> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_ids_are_unique() {
        let a = EngineInstance::new(EngineConfig::default()).unwrap();
        let b = EngineInstance::new(EngineConfig::default()).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_contexts_are_tagged_with_engine() {
        let mut engine = EngineInstance::new(EngineConfig::default()).unwrap();
        let ctx1 = engine.new_context();
        let ctx2 = engine.main_context();
        assert_eq!(ctx1.engine_id(), engine.id());
        assert_eq!(ctx2.engine_id(), engine.id());
    }

    #[test]
    fn test_bootstrap_runs_in_main_context() {
        let config =
            EngineConfig::new().with_bootstrap("globalThis.VERSION = '1.0.0';".to_string());
        let mut engine = EngineInstance::new(config).unwrap();

        let main = engine.main_context();
        assert_eq!(engine.read_global(&main, "VERSION").as_deref(), Some("1.0.0"));

        // Fresh contexts get their own global object.
        let fresh = engine.new_context();
        assert_eq!(engine.read_global(&fresh, "VERSION"), None);
    }

    #[test]
    fn test_bootstrap_failure() {
        let config = EngineConfig::new().with_bootstrap("throw new Error('boom')".to_string());
        let err = EngineInstance::new(config).unwrap_err();
        assert!(matches!(err, EngineError::Bootstrap(_)));
    }

    #[test]
    fn test_invalid_heap_limits_rejected() {
        let config = EngineConfig::new().with_initial_heap_size(1024);
        assert!(matches!(
            EngineInstance::new(config),
            Err(EngineError::InitialHeapWithoutMax)
        ));
    }

    #[test]
    fn test_event_loop_runs_tasks() {
        let rt = new_event_loop().unwrap();
        let value = rt.block_on(async { rt.handle().spawn(async { 40 + 2 }).await.unwrap() });
        assert_eq!(value, 42);
    }
}
