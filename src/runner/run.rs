//! Run scheduler
//!
//! Drains the page worklist one page at a time. Within a page, tests
//! dispatch strictly one after another: each step's completion must be
//! signalled before the next dispatch, and a page reporting no more tests
//! advances the scheduler to the next page. When no pages remain the
//! finish latch fires the completion hooks, exactly once.

use chrono::Utc;
use std::collections::VecDeque;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use super::events::{Event, StepId, StepSignal};
use crate::error::EngineError;
use crate::harness::PageHarness;
use crate::hooks::CompletionHooks;
use crate::models::{Page, PageReport, RunReport, TestContext};
use crate::registry::TestRegistry;

/// Outcome of asking a page for its next test.
#[derive(Debug)]
enum Step {
    /// A test body was handed to the harness; its completion is pending.
    Dispatched(StepId),
    /// The page has no more tests.
    Exhausted,
}

/// Drive the run phase to completion and fire the finish hooks.
pub(crate) async fn drive(
    registry: &TestRegistry,
    pages: &mut VecDeque<Page>,
    hooks: &mut CompletionHooks,
    rx: &mut UnboundedReceiver<Event>,
    tx: &UnboundedSender<Event>,
    harness: &mut dyn PageHarness,
) -> Result<RunReport, EngineError> {
    let started_at = Utc::now();
    let mut visited: Vec<PageReport> = Vec::new();
    let mut next_step: u64 = 0;

    let mut current = pages.pop_front();
    if let Some(page) = current.as_ref() {
        info!("Starting page {}", page.url());
        harness.prepare(page);
    }

    while let Some(page) = current.as_mut() {
        match dispatch(page, registry, harness, tx, &mut next_step)? {
            Step::Dispatched(step) => await_completion(rx, step, page).await?,
            Step::Exhausted => {
                debug!("Page {} exhausted its tests", page.url());
                visited.push(PageReport {
                    url: page.url().to_string(),
                    tests_run: page.tests_run(),
                });

                current = pages.pop_front();
                if let Some(next) = current.as_ref() {
                    info!("Starting page {}", next.url());
                    harness.prepare(next);
                }
            }
        }
    }

    hooks.finish();
    let report = RunReport::new(started_at, visited);
    info!(
        "Run finished: {} tests across {} pages in {}ms",
        report.tests_run, report.pages_visited, report.duration_ms
    );
    Ok(report)
}

/// Hand the page's next test body to the harness, or report exhaustion.
/// A page with zero assigned tests exhausts on its very first dispatch.
fn dispatch(
    page: &mut Page,
    registry: &TestRegistry,
    harness: &mut dyn PageHarness,
    tx: &UnboundedSender<Event>,
    next_step: &mut u64,
) -> Result<Step, EngineError> {
    let Some(locator) = page.take_next() else {
        return Ok(Step::Exhausted);
    };

    let test = registry
        .get(&locator)
        .ok_or_else(|| EngineError::TestNotLoaded(locator.clone()))?;
    let body = test
        .body()
        .ok_or_else(|| EngineError::TestNotLoaded(locator.clone()))?;

    *next_step += 1;
    let step = StepId(*next_step);

    info!("Running '{}' on {}", test.display_name(), page.url());
    let ctx = TestContext::new(
        page.url(),
        test.display_name(),
        StepSignal::new(tx.clone(), step),
    );
    harness.invoke(ctx, body);

    Ok(Step::Dispatched(step))
}

async fn await_completion(
    rx: &mut UnboundedReceiver<Event>,
    expected: StepId,
    page: &Page,
) -> Result<(), EngineError> {
    match rx.recv().await {
        Some(Event::StepDone { step }) if step == expected => Ok(()),
        Some(Event::StepDone { step }) => Err(EngineError::StaleStepCompletion {
            expected,
            got: step,
        }),
        Some(Event::StepDropped { .. }) => Err(EngineError::StepAbandoned {
            page: page.url().to_string(),
            test: page
                .last_dispatched()
                .map(|locator| locator.to_string())
                .unwrap_or_default(),
        }),
        Some(Event::Registered { name, .. }) => Err(EngineError::UnexpectedRegistration { name }),
        Some(Event::RegistrarDropped { locator }) => Err(EngineError::MissingRegistration(locator)),
        None => Err(EngineError::ChannelClosed),
    }
}
