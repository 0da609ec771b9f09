//! Engine-level resource handles retained by an environment.
//!
//! Some resources must be torn down before the environment's context is
//! released: watcher tasks running on the shared event loop, or embedder
//! objects with an explicit close step. They are retained here and released in
//! registration order by [`HandleCleanupQueue::cleanup`].

use indexmap::IndexMap;
use std::fmt;
use tokio::task::JoinHandle;

/// Identifier of a retained handle, unique within one environment.
pub type HandleId = u64;

enum RetainedHandle {
    /// Embedder-supplied release step.
    Cleanup(Box<dyn FnOnce()>),
    /// Task spawned on the shared event loop.
    Task(JoinHandle<()>),
}

impl RetainedHandle {
    fn release(self) {
        match self {
            RetainedHandle::Cleanup(cleanup) => cleanup(),
            RetainedHandle::Task(task) => task.abort(),
        }
    }
}

#[derive(Default)]
pub struct HandleCleanupQueue {
    handles: IndexMap<HandleId, RetainedHandle>,
    next_id: HandleId,
}

impl HandleCleanupQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, handle: RetainedHandle) -> HandleId {
        let id = self.next_id;
        self.next_id += 1;
        self.handles.insert(id, handle);
        id
    }

    /// Retain a resource whose release step is `cleanup`.
    pub fn register<F>(&mut self, cleanup: F) -> HandleId
    where
        F: FnOnce() + 'static,
    {
        self.insert(RetainedHandle::Cleanup(Box::new(cleanup)))
    }

    /// Retain a task; it is aborted on cleanup.
    pub fn track(&mut self, task: JoinHandle<()>) -> HandleId {
        self.insert(RetainedHandle::Task(task))
    }

    /// Stop retaining a handle without releasing it.
    ///
    /// Returns `false` if `id` was not retained.
    pub fn forget(&mut self, id: HandleId) -> bool {
        self.handles.shift_remove(&id).is_some()
    }

    /// Release every retained handle in registration order.
    ///
    /// Returns the number of handles released.
    pub fn cleanup(&mut self) -> usize {
        let handles = std::mem::take(&mut self.handles);
        let count = handles.len();
        for (_, handle) in handles {
            handle.release();
        }
        count
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl fmt::Debug for HandleCleanupQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleCleanupQueue")
            .field("pending", &self.handles.len())
            .finish()
    }
}
