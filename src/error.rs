//! Engine errors
//!
//! Protocol violations between the schedulers and their collaborators.
//! These are not recoverable conditions: each one means a collaborator
//! broke the call-back-exactly-once contract, and the run aborts.

use thiserror::Error;

use crate::models::TestLocator;
use crate::runner::StepId;

/// Scheduler protocol violations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A test source dropped its registrar without registering a
    /// definition. The original behavior here was an unbounded stall;
    /// dropping the handle fails the run fast instead.
    #[error("test '{0}' never registered a definition")]
    MissingRegistration(TestLocator),

    /// A registration arrived while no test was loading, or after the
    /// load phase already finished.
    #[error("unexpected registration of '{name}': no test is currently loading")]
    UnexpectedRegistration { name: String },

    /// A step completion arrived carrying the wrong step id. Duplicate
    /// and out-of-order completions are hard errors, never silent re-runs.
    #[error("stale completion: expected {expected}, got {got}")]
    StaleStepCompletion { expected: StepId, got: StepId },

    /// A test body dropped its completion signal without firing it.
    #[error("test '{test}' on page '{page}' dropped its completion signal without finishing")]
    StepAbandoned { page: String, test: String },

    /// A step completion was signalled while the load phase was still
    /// draining its worklist.
    #[error("step completion signalled during the load phase")]
    StepOutsideRunPhase,

    /// A test was dispatched whose definition never bound a body. The
    /// load phase guarantees this cannot happen for locators declared in
    /// the configuration; it guards tests added behind the runner's back.
    #[error("test '{0}' was dispatched before its definition loaded")]
    TestNotLoaded(TestLocator),

    /// Every collaborator handle was dropped while the scheduler was
    /// still waiting for an event.
    #[error("event channel closed while awaiting a collaborator")]
    ChannelClosed,
}
