//! Per-environment shutdown hooks.
//!
//! Subsystems register `(callback, argument)` pairs against one environment.
//! The embedder runs them explicitly when that environment shuts down. The
//! registry is owned by exactly one [`Environment`](super::environment::Environment);
//! there is no process-global registry.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Opaque argument handed back to an AtExit callback.
///
/// The caller keeps its own clone of the `Rc` and stays the owner; the
/// registry only holds on to it until the entry runs or is discarded.
pub type AtExitArgument = Rc<dyn Any>;

type AtExitCallback = Box<dyn FnOnce(Option<&dyn Any>)>;

/// One registration.
pub struct AtExitEntry {
    callback: AtExitCallback,
    argument: Option<AtExitArgument>,
}

impl AtExitEntry {
    fn run(self) {
        (self.callback)(self.argument.as_deref());
    }
}

impl fmt::Debug for AtExitEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtExitEntry")
            .field("has_argument", &self.argument.is_some())
            .finish_non_exhaustive()
    }
}

/// Ordered collection of shutdown hooks.
///
/// Entries run most-recently-registered first, so a subsystem that registered
/// later (and may depend on an earlier one) is torn down before it.
#[derive(Debug, Default)]
pub struct AtExitRegistry {
    entries: Vec<AtExitEntry>,
}

impl AtExitRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback. It is not invoked now.
    ///
    /// The same callback may be registered any number of times, with a
    /// different argument each time; every registration runs once.
    pub fn register<F>(&mut self, callback: F, argument: Option<AtExitArgument>)
    where
        F: FnOnce(Option<&dyn Any>) + 'static,
    {
        self.entries.push(AtExitEntry {
            callback: Box::new(callback),
            argument,
        });
    }

    /// Run every pending entry in reverse registration order and leave the
    /// registry empty.
    ///
    /// The entries are detached before the first callback runs. Anything
    /// registered while the run is in progress stays pending for the next call.
    /// Returns the number of callbacks invoked.
    pub fn run(&mut self) -> usize {
        let entries = std::mem::take(&mut self.entries);
        let count = entries.len();
        for entry in entries.into_iter().rev() {
            entry.run();
        }
        count
    }

    /// Drop every pending entry without running it.
    ///
    /// Returns the number of entries discarded.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Get number of pending entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there is nothing to run.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
