//! Scheduler events and collaborator handles
//!
//! The runner never blocks a thread: collaborators re-enter it by firing
//! single-shot handles that post events onto the runner's channel. Each
//! handle either fires exactly once or reports its own abandonment on
//! drop, so a collaborator that forgets to call back fails the run
//! instead of hanging it.

use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

use crate::models::{TestBody, TestLocator};

/// Identifier of one dispatched run step. Fresh per dispatch; the run
/// scheduler accepts exactly the outstanding id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StepId(pub(crate) u64);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step #{}", self.0)
    }
}

/// Events delivered to the scheduler loops.
pub(crate) enum Event {
    /// A test definition registered its name and body.
    Registered { name: String, body: TestBody },

    /// A registrar was dropped unfired.
    RegistrarDropped { locator: TestLocator },

    /// A run step reported completion.
    StepDone { step: StepId },

    /// A step's completion signal was dropped unfired.
    StepDropped { step: StepId },
}

/// Load-completion handle passed to [`TestSource::load`].
///
/// The loaded definition must call [`register`](Registrar::register)
/// exactly once; the handle is consumed by the call, so a duplicate
/// registration from the same load is unrepresentable. Dropping the
/// handle unfired aborts the load phase.
///
/// [`TestSource::load`]: crate::harness::TestSource::load
pub struct Registrar {
    tx: Option<UnboundedSender<Event>>,
    locator: TestLocator,
}

impl Registrar {
    pub(crate) fn new(tx: UnboundedSender<Event>, locator: TestLocator) -> Self {
        Self {
            tx: Some(tx),
            locator,
        }
    }

    /// The locator this registrar was issued for.
    pub fn locator(&self) -> &TestLocator {
        &self.locator
    }

    /// Bind a name and body onto the test currently loading and let the
    /// load scheduler advance. May be called from a spawned task.
    pub fn register(mut self, name: impl Into<String>, body: TestBody) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Event::Registered {
                name: name.into(),
                body,
            });
        }
    }
}

impl Drop for Registrar {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Event::RegistrarDropped {
                locator: self.locator.clone(),
            });
        }
    }
}

impl fmt::Debug for Registrar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registrar")
            .field("locator", &self.locator)
            .field("fired", &self.tx.is_none())
            .finish()
    }
}

/// Single-shot completion signal carried inside a
/// [`TestContext`](crate::models::TestContext).
pub(crate) struct StepSignal {
    tx: Option<UnboundedSender<Event>>,
    step: StepId,
}

impl StepSignal {
    pub(crate) fn new(tx: UnboundedSender<Event>, step: StepId) -> Self {
        Self { tx: Some(tx), step }
    }

    pub(crate) fn complete(mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Event::StepDone { step: self.step });
        }
    }
}

impl Drop for StepSignal {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Event::StepDropped { step: self.step });
        }
    }
}
