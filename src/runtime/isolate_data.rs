//! State shared by every environment created on one engine instance.

use super::engine::{EngineId, EngineInstance};
use super::error::InvariantViolation;
use deno_core::v8;
use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static ISOLATE_DATA_IDS: AtomicU64 = AtomicU64::new(1);

/// Engine-instance-wide handles grouped for the environments built on them.
///
/// All held handles are borrowed, non-owning references: the isolate handle
/// does not keep the engine alive, and the loop and platform handles are
/// shared with the embedder. Nothing here is mutated after creation except
/// the count of live environments.
///
/// Environments borrow the isolate data for their whole lifetime, so
/// [`SharedIsolateData::free`] cannot be reached while one of them exists.
pub struct SharedIsolateData {
    id: u64,
    engine_id: EngineId,
    isolate: v8::IsolateHandle,
    event_loop: tokio::runtime::Handle,
    platform: v8::SharedRef<v8::Platform>,
    live_environments: Cell<usize>,
}

impl SharedIsolateData {
    /// Group the handles of `engine` with the event loop and platform it runs on.
    pub fn create(
        engine: &mut EngineInstance,
        event_loop: tokio::runtime::Handle,
        platform: v8::SharedRef<v8::Platform>,
    ) -> Self {
        let id = ISOLATE_DATA_IDS.fetch_add(1, Ordering::Relaxed);
        let engine_id = engine.id();
        tracing::debug!(
            isolate_data_id = id,
            engine_id = engine_id.get(),
            "isolate data created"
        );
        Self {
            id,
            engine_id,
            isolate: engine.isolate_handle(),
            event_loop,
            platform,
            live_environments: Cell::new(0),
        }
    }

    /// Release the held handles.
    ///
    /// Every environment built on this isolate data must already be freed; a
    /// leaked environment is a fatal invariant violation.
    pub fn free(self) {
        let live = self.live_environments.get();
        if live != 0 {
            InvariantViolation::IsolateDataInUse {
                isolate_data_id: self.id,
                live,
            }
            .raise();
        }
        tracing::debug!(isolate_data_id = self.id, "isolate data freed");
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Engine instance these handles belong to.
    pub fn engine_id(&self) -> EngineId {
        self.engine_id
    }

    pub fn isolate_handle(&self) -> &v8::IsolateHandle {
        &self.isolate
    }

    /// Loop handle shared by all environments on this engine instance.
    pub fn event_loop(&self) -> &tokio::runtime::Handle {
        &self.event_loop
    }

    pub fn platform(&self) -> &v8::SharedRef<v8::Platform> {
        &self.platform
    }

    /// Number of environments currently built on this isolate data.
    pub fn live_environments(&self) -> usize {
        self.live_environments.get()
    }

    pub(crate) fn attach_environment(&self) {
        self.live_environments.set(self.live_environments.get() + 1);
    }

    pub(crate) fn detach_environment(&self) {
        self.live_environments
            .set(self.live_environments.get().saturating_sub(1));
    }
}

impl fmt::Debug for SharedIsolateData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedIsolateData")
            .field("id", &self.id)
            .field("engine_id", &self.engine_id)
            .field("live_environments", &self.live_environments.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::config::EngineConfig;
    use crate::runtime::engine::new_event_loop;
    use crate::runtime::v8_platform;

    #[test]
    fn test_create_and_free() {
        let event_loop = new_event_loop().unwrap();
        let mut engine = EngineInstance::new(EngineConfig::default()).unwrap();

        let data = SharedIsolateData::create(&mut engine, event_loop.handle().clone(), v8_platform());
        assert_eq!(data.engine_id(), engine.id());
        assert_eq!(data.live_environments(), 0);
        data.free();
    }

    #[test]
    fn test_ids_are_unique_per_engine() {
        let event_loop = new_event_loop().unwrap();
        let mut engine = EngineInstance::new(EngineConfig::default()).unwrap();

        let a = SharedIsolateData::create(&mut engine, event_loop.handle().clone(), v8_platform());
        let b = SharedIsolateData::create(&mut engine, event_loop.handle().clone(), v8_platform());
        assert_ne!(a.id(), b.id());
        assert_eq!(a.engine_id(), b.engine_id());
        b.free();
        a.free();
    }

    #[test]
    #[should_panic(expected = "still reference it")]
    fn test_free_with_live_environment_is_fatal() {
        let event_loop = new_event_loop().unwrap();
        let mut engine = EngineInstance::new(EngineConfig::default()).unwrap();

        let data = SharedIsolateData::create(&mut engine, event_loop.handle().clone(), v8_platform());
        data.attach_environment();
        data.free();
    }
}
