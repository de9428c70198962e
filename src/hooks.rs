//! Completion hooks
//!
//! Ordered callbacks fired exactly once when the run phase finishes.

use tracing::debug;

type Hook = Box<dyn FnOnce() + Send>;

/// Registry of finish callbacks. Append-only before completion; a latch
/// guards against double invocation, and hooks registered after the
/// finish are ignored rather than invoked late.
#[derive(Default)]
pub struct CompletionHooks {
    hooks: Vec<Hook>,
    finished: bool,
}

impl CompletionHooks {
    /// Create an empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook. Returns `false` (and drops the hook) if the run
    /// already finished; this is a single-shot signal with no late-join
    /// semantics.
    pub fn push(&mut self, hook: impl FnOnce() + Send + 'static) -> bool {
        if self.finished {
            debug!("Ignoring finish hook registered after completion");
            return false;
        }
        self.hooks.push(Box::new(hook));
        true
    }

    /// Fire every registered hook synchronously, in registration order.
    /// Returns `true` the first time; subsequent calls are no-ops.
    pub fn finish(&mut self) -> bool {
        if self.finished {
            return false;
        }
        self.finished = true;

        for hook in self.hooks.drain(..) {
            hook();
        }
        true
    }

    /// Whether the finish latch has fired.
    pub fn has_finished(&self) -> bool {
        self.finished
    }

    /// Number of hooks currently registered.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
