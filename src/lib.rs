//! pagedrive - sequential page-test orchestration engine
//!
//! Given a declarative configuration naming a set of pages and, for each,
//! a set of test scripts (plus tests applied globally to every page),
//! pagedrive loads every referenced test definition exactly once, then
//! drives execution page by page, test by test, waiting for each test to
//! signal completion before advancing.
//!
//! The engine runs two phases:
//!
//! - **Load phase**: the worklist of referenced tests drains one at a
//!   time through a [`TestSource`]; each loaded definition calls back
//!   with its name and body through a [`Registrar`] before the next load
//!   begins.
//! - **Run phase**: pages drain in config order; within a page, tests run
//!   in assignment order (global tests first), one at a time, each step's
//!   completion signalled out-of-band via [`TestContext::done`]. When the
//!   last page drains, the finish hooks fire exactly once.
//!
//! The engine itself performs no I/O and never blocks a thread; fetching,
//! evaluating, and presenting pages are collaborator concerns behind the
//! [`TestSource`] and [`PageHarness`] seams. A collaborator that breaks
//! the call-back-exactly-once protocol aborts the run with a typed
//! [`EngineError`] instead of stalling it.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use pagedrive::{
//!     InlineHarness, Location, Registrar, Runner, Settings, TestContext, TestLocator,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let location = Location::new("http://example.com/suite/runner.html");
//!     let settings = Settings::from_value(
//!         serde_json::json!({
//!             "globalTests": ["smoke.js"],
//!             "pages": [{ "url": "index.html", "tests": ["home.js"] }]
//!         }),
//!         &location,
//!     )?;
//!
//!     let mut runner = Runner::start(settings, &location)?;
//!     runner.on_finish(|| println!("all pages done"));
//!
//!     let mut source = |locator: &TestLocator, registrar: Registrar| {
//!         let name = locator.to_string();
//!         registrar.register(name, Arc::new(|ctx: TestContext| ctx.done()));
//!     };
//!
//!     let report = runner.run(&mut source, &mut InlineHarness).await?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod harness;
pub mod hooks;
pub mod logging;
pub mod models;
pub mod registry;
pub mod runner;

pub use config::{Location, PageSpec, ResolvedSettings, Settings};
pub use error::EngineError;
pub use harness::{InlineHarness, PageHarness, TestSource};
pub use hooks::CompletionHooks;
pub use logging::LogLevel;
pub use models::{
    LoadState, Page, PageReport, RunReport, Test, TestBody, TestContext, TestLocator,
};
pub use registry::TestRegistry;
pub use runner::{Registrar, Runner, StepId};
