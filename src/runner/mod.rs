//! Orchestration runner
//!
//! Owns the registry, the page worklist, and the completion hooks, and
//! drives the two phases in order: load every referenced test definition
//! exactly once, then run each page's assigned tests page by page. All
//! advancement is event-driven; the runner suspends whenever control is
//! with a collaborator and resumes when that collaborator fires its
//! handle.

pub(crate) mod events;
mod load;
mod run;

pub use events::{Registrar, StepId};

use std::collections::VecDeque;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::info;

use crate::config::{Location, ResolvedSettings, Settings};
use crate::error::EngineError;
use crate::harness::{PageHarness, TestSource};
use crate::hooks::CompletionHooks;
use crate::models::{Page, RunReport, Test, TestLocator};
use crate::registry::TestRegistry;
use events::Event;

/// Sequential test-orchestration runner.
///
/// Constructed per run via [`Runner::start`]; worklists, registry, and
/// hooks are owned exclusively by the instance and torn down with it.
pub struct Runner {
    settings: ResolvedSettings,
    registry: TestRegistry,
    pages: VecDeque<Page>,
    hooks: CompletionHooks,
    tx: UnboundedSender<Event>,
    rx: UnboundedReceiver<Event>,
}

impl Runner {
    /// Entry point. Validates and resolves `settings` against the current
    /// location, then builds the page worklist and the load worklist:
    /// pages in config order, and for each page its global tests followed
    /// by its own, deduplicated at first occurrence. Returns the runner
    /// for chaining.
    pub fn start(settings: Settings, location: &Location) -> anyhow::Result<Self> {
        settings.validate()?;
        let settings = ResolvedSettings::resolve(settings, location);
        let (tx, rx) = unbounded_channel();

        let mut runner = Self {
            settings,
            registry: TestRegistry::new(),
            pages: VecDeque::new(),
            hooks: CompletionHooks::new(),
            tx,
            rx,
        };
        runner.setup_tests();

        info!(
            "Configured {} pages, {} test definitions to load",
            runner.pages.len(),
            runner.registry.pending_loads()
        );
        Ok(runner)
    }

    /// Populate the worklists from the resolved settings. Runs once,
    /// before any loading begins; the registry is read-only afterwards
    /// apart from load-phase binding.
    fn setup_tests(&mut self) {
        let global_tests = self.settings.global_tests.clone();
        let specs = self.settings.pages.clone();

        for spec in specs {
            let mut page = Page::new(&spec.url, &self.settings.base_url);

            for locator in global_tests.iter().chain(spec.tests.iter()) {
                self.registry.get_or_create(locator);
                page.assign(locator.clone());
            }
            page.seal();
            self.pages.push_back(page);
        }
    }

    /// Register a hook invoked exactly once when the run finishes.
    pub fn on_finish(&mut self, hook: impl FnOnce() + Send + 'static) -> &mut Self {
        self.hooks.push(hook);
        self
    }

    /// Create a test for `locator` and enqueue it for loading.
    pub fn add_test(&mut self, locator: impl Into<TestLocator>) -> &Test {
        self.registry.add(locator.into())
    }

    /// Look up the test registered under `locator`, creating and
    /// enqueueing one on first reference.
    pub fn get_test(&mut self, locator: impl Into<TestLocator>) -> &Test {
        self.registry.get_or_create(&locator.into())
    }

    /// The resolved settings this runner operates under.
    pub fn settings(&self) -> &ResolvedSettings {
        &self.settings
    }

    /// Number of pages not yet consumed by the run phase.
    pub fn pending_pages(&self) -> usize {
        self.pages.len()
    }

    /// Number of tests not yet consumed by the load phase.
    pub fn pending_loads(&self) -> usize {
        self.registry.pending_loads()
    }

    /// Whether the finish hooks have fired.
    pub fn has_finished(&self) -> bool {
        self.hooks.has_finished()
    }

    /// Drive both phases to completion: load every referenced definition,
    /// signal the harness that the framework may start, run every page,
    /// fire the finish hooks, and return the run report.
    pub async fn run(
        &mut self,
        source: &mut dyn TestSource,
        harness: &mut dyn PageHarness,
    ) -> Result<RunReport, EngineError> {
        load::drive(&mut self.registry, &mut self.rx, &self.tx, source).await?;
        harness.framework_ready();

        run::drive(
            &self.registry,
            &mut self.pages,
            &mut self.hooks,
            &mut self.rx,
            &self.tx,
            harness,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::InlineHarness;
    use crate::models::{TestBody, TestContext};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    /// Source that registers every locator inline and records the order
    /// of loads and of body invocations.
    struct ScriptedSource {
        load_log: Log,
        run_log: Log,
    }

    impl ScriptedSource {
        fn new() -> (Self, Log, Log) {
            let load_log: Log = Arc::default();
            let run_log: Log = Arc::default();
            (
                Self {
                    load_log: Arc::clone(&load_log),
                    run_log: Arc::clone(&run_log),
                },
                load_log,
                run_log,
            )
        }
    }

    impl TestSource for ScriptedSource {
        fn load(&mut self, locator: &TestLocator, registrar: Registrar) {
            self.load_log.lock().unwrap().push(locator.to_string());

            let run_log = Arc::clone(&self.run_log);
            let name = format!("test {locator}");
            let body: TestBody = Arc::new(move |ctx: TestContext| {
                run_log
                    .lock()
                    .unwrap()
                    .push(format!("{} @ {}", ctx.test_name(), ctx.page_url()));
                ctx.done();
            });
            registrar.register(name, body);
        }
    }

    #[derive(Default)]
    struct CountingHarness {
        prepared: Vec<String>,
        ready: usize,
        invoked: usize,
    }

    impl PageHarness for CountingHarness {
        fn prepare(&mut self, page: &Page) {
            self.prepared.push(page.url().to_string());
        }

        fn framework_ready(&mut self) {
            self.ready += 1;
        }

        fn invoke(&mut self, ctx: TestContext, body: TestBody) {
            self.invoked += 1;
            body(ctx);
        }
    }

    fn scenario_settings() -> Settings {
        Settings::from_value(
            json!({
                "globalTests": ["a"],
                "pages": [
                    { "url": "/x", "tests": ["b"] },
                    { "url": "/y", "tests": [] }
                ]
            }),
            &Location::new("http://example.com/suite/runner.html"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_scenario_load_and_run_order() {
        let location = Location::new("http://example.com/suite/runner.html");
        let mut runner = Runner::start(scenario_settings(), &location).unwrap();

        let finishes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&finishes);
        runner.on_finish(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let (mut source, load_log, run_log) = ScriptedSource::new();
        let mut harness = CountingHarness::default();
        let report = runner.run(&mut source, &mut harness).await.unwrap();

        assert_eq!(*load_log.lock().unwrap(), ["a", "b"]);
        // global test 'a' runs on every page, including /y with no tests
        // of its own
        assert_eq!(
            *run_log.lock().unwrap(),
            ["test a @ /x", "test b @ /x", "test a @ /y"]
        );
        assert_eq!(finishes.load(Ordering::SeqCst), 1);
        assert!(runner.has_finished());

        assert_eq!(report.pages_visited, 2);
        assert_eq!(report.tests_run, 3);
        assert_eq!(harness.prepared, ["/x", "/y"]);
        assert_eq!(harness.ready, 1);
        assert_eq!(harness.invoked, 3);
    }

    #[tokio::test]
    async fn test_duplicate_locators_load_once_but_run_per_page() {
        let location = Location::new("http://example.com/");
        let settings = Settings::from_value(
            json!({
                "globalTests": ["g"],
                "pages": [
                    { "url": "/p1", "tests": ["t1", "t2"] },
                    { "url": "/p2", "tests": ["t1"] }
                ]
            }),
            &location,
        )
        .unwrap();
        let mut runner = Runner::start(settings, &location).unwrap();

        let (mut source, load_log, run_log) = ScriptedSource::new();
        let report = runner.run(&mut source, &mut InlineHarness).await.unwrap();

        assert_eq!(*load_log.lock().unwrap(), ["g", "t1", "t2"]);
        assert_eq!(
            *run_log.lock().unwrap(),
            [
                "test g @ /p1",
                "test t1 @ /p1",
                "test t2 @ /p1",
                "test g @ /p2",
                "test t1 @ /p2",
            ]
        );
        assert_eq!(report.tests_run, 5);
    }

    #[tokio::test]
    async fn test_empty_config_completes_immediately() {
        let location = Location::new("http://example.com/");
        let mut runner = Runner::start(Settings::default(), &location).unwrap();

        let finishes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&finishes);
        runner.on_finish(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let (mut source, load_log, _) = ScriptedSource::new();
        let mut harness = CountingHarness::default();
        let report = runner.run(&mut source, &mut harness).await.unwrap();

        assert!(load_log.lock().unwrap().is_empty());
        assert!(report.is_empty());
        assert_eq!(finishes.load(Ordering::SeqCst), 1);
        // the framework still starts even with nothing to load
        assert_eq!(harness.ready, 1);
        assert_eq!(harness.invoked, 0);
    }

    #[tokio::test]
    async fn test_page_without_tests_is_visited_and_skipped() {
        let location = Location::new("http://example.com/");
        let settings = Settings::from_value(
            json!({ "pages": [{ "url": "/empty" }] }),
            &location,
        )
        .unwrap();
        let mut runner = Runner::start(settings, &location).unwrap();

        let (mut source, _, run_log) = ScriptedSource::new();
        let mut harness = CountingHarness::default();
        let report = runner.run(&mut source, &mut harness).await.unwrap();

        assert!(run_log.lock().unwrap().is_empty());
        assert_eq!(report.pages_visited, 1);
        assert_eq!(report.tests_run, 0);
        assert_eq!(harness.prepared, ["/empty"]);
        assert_eq!(harness.invoked, 0);
    }

    #[tokio::test]
    async fn test_out_of_band_registration_and_completion() {
        let location = Location::new("http://example.com/");
        let settings = Settings::from_value(
            json!({ "pages": [{ "url": "/x", "tests": ["slow"] }] }),
            &location,
        )
        .unwrap();
        let mut runner = Runner::start(settings, &location).unwrap();

        // registration and step completion both happen on spawned tasks
        let mut source = |locator: &TestLocator, registrar: Registrar| {
            let name = format!("test {locator}");
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                let body: TestBody = Arc::new(|ctx: TestContext| {
                    tokio::spawn(async move {
                        tokio::task::yield_now().await;
                        ctx.done();
                    });
                });
                registrar.register(name, body);
            });
        };

        let report = runner.run(&mut source, &mut InlineHarness).await.unwrap();
        assert_eq!(report.tests_run, 1);
        assert!(runner.has_finished());
    }

    #[tokio::test]
    async fn test_dropped_registrar_fails_fast() {
        let location = Location::new("http://example.com/");
        let settings = Settings::from_value(
            json!({ "pages": [{ "url": "/x", "tests": ["ghost"] }] }),
            &location,
        )
        .unwrap();
        let mut runner = Runner::start(settings, &location).unwrap();

        let mut source = |_: &TestLocator, registrar: Registrar| drop(registrar);
        let err = runner
            .run(&mut source, &mut InlineHarness)
            .await
            .unwrap_err();

        match err {
            EngineError::MissingRegistration(locator) => {
                assert_eq!(locator, TestLocator::new("ghost"))
            }
            other => panic!("expected MissingRegistration, got: {other}"),
        }
        assert!(!runner.has_finished());
    }

    #[tokio::test]
    async fn test_abandoned_step_fails_fast() {
        struct AbandoningHarness;
        impl PageHarness for AbandoningHarness {
            fn invoke(&mut self, ctx: TestContext, _body: TestBody) {
                drop(ctx);
            }
        }

        let location = Location::new("http://example.com/");
        let settings = Settings::from_value(
            json!({ "pages": [{ "url": "/x", "tests": ["t"] }] }),
            &location,
        )
        .unwrap();
        let mut runner = Runner::start(settings, &location).unwrap();

        let (mut source, _, _) = ScriptedSource::new();
        let err = runner
            .run(&mut source, &mut AbandoningHarness)
            .await
            .unwrap_err();

        match err {
            EngineError::StepAbandoned { page, test } => {
                assert_eq!(page, "/x");
                assert_eq!(test, "t");
            }
            other => panic!("expected StepAbandoned, got: {other}"),
        }
        assert!(!runner.has_finished());
    }

    #[tokio::test]
    async fn test_relative_page_urls_gain_base() {
        let location = Location::new("http://example.com/suite/runner.html");
        let settings = Settings::from_value(
            json!({ "pages": [{ "url": "index.html", "tests": ["t"] }] }),
            &location,
        )
        .unwrap();
        let mut runner = Runner::start(settings, &location).unwrap();

        let (mut source, _, run_log) = ScriptedSource::new();
        runner.run(&mut source, &mut InlineHarness).await.unwrap();

        assert_eq!(
            *run_log.lock().unwrap(),
            ["test t @ http://example.com/suite/index.html"]
        );
    }

    #[test]
    fn test_registry_accessors() {
        let location = Location::new("http://example.com/");
        let mut runner = Runner::start(scenario_settings(), &location).unwrap();

        assert_eq!(runner.pending_pages(), 2);
        assert_eq!(runner.pending_loads(), 2);

        // repeated lookup resolves to the existing entity
        runner.get_test("a");
        assert_eq!(runner.pending_loads(), 2);

        runner.add_test("extra");
        assert_eq!(runner.pending_loads(), 3);
    }

    #[test]
    fn test_start_rejects_invalid_settings() {
        let location = Location::new("http://example.com/");
        let mut settings = Settings::default();
        settings.pages.push(crate::config::PageSpec {
            url: String::new(),
            tests: Vec::new(),
        });
        assert!(Runner::start(settings, &location).is_err());
    }
}
