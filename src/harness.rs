//! Collaborator seams
//!
//! The runner never fetches, injects, or executes anything itself. The
//! mechanism for evaluating a test definition and for presenting a page
//! under test lives behind these traits; the core only cares that each
//! collaborator eventually fires the handle it was given.

use crate::models::{Page, TestBody, TestContext, TestLocator};
use crate::runner::Registrar;

/// Fetches and evaluates test definitions.
///
/// `load` is called once per distinct locator, in load order. The loaded
/// definition must cause exactly one [`Registrar::register`] call; this
/// may happen inline or later from a spawned task. At most one load is in
/// flight at any instant.
pub trait TestSource {
    fn load(&mut self, locator: &TestLocator, registrar: Registrar);
}

/// Any `FnMut(&TestLocator, Registrar)` is a test source.
impl<F> TestSource for F
where
    F: FnMut(&TestLocator, Registrar),
{
    fn load(&mut self, locator: &TestLocator, registrar: Registrar) {
        self(locator, registrar)
    }
}

/// Presents pages and executes test bodies in page context.
pub trait PageHarness {
    /// Called once when `page` becomes the current page, before its first
    /// test dispatches. Presentation mechanics (navigation, frames) live
    /// here.
    fn prepare(&mut self, _page: &Page) {}

    /// Called once after the load phase drains, before any test runs.
    /// The analog of starting the underlying assertion framework.
    fn framework_ready(&mut self) {}

    /// Execute one test body. The body owns the completion signal inside
    /// `ctx`; the harness must invoke it (inline or on a task) and let it
    /// call [`TestContext::done`] when the step is over.
    fn invoke(&mut self, ctx: TestContext, body: TestBody);
}

/// Harness that invokes bodies synchronously on the caller's task.
/// Suited to embeddings with no page presentation of their own, and to
/// tests.
#[derive(Debug, Default)]
pub struct InlineHarness;

impl PageHarness for InlineHarness {
    fn invoke(&mut self, ctx: TestContext, body: TestBody) {
        body(ctx);
    }
}
