//! Load scheduler
//!
//! Drains the worklist of not-yet-loaded tests one at a time. Each test's
//! source is asked to load it; the loaded definition calls back through
//! its registrar, and only then does the next load begin. An empty
//! worklist transitions straight to done.

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use super::events::{Event, Registrar};
use crate::error::EngineError;
use crate::harness::TestSource;
use crate::models::TestLocator;
use crate::registry::TestRegistry;

/// Next action of the load scheduler.
enum NextLoad {
    Load(TestLocator),
    Done,
}

fn next_load(registry: &mut TestRegistry) -> NextLoad {
    match registry.next_unloaded() {
        Some(locator) => NextLoad::Load(locator),
        None => NextLoad::Done,
    }
}

/// Drive the load phase to completion. At most one test is loading at any
/// instant; the loop suspends until the in-flight definition registers.
pub(crate) async fn drive(
    registry: &mut TestRegistry,
    rx: &mut UnboundedReceiver<Event>,
    tx: &UnboundedSender<Event>,
    source: &mut dyn TestSource,
) -> Result<(), EngineError> {
    loop {
        match next_load(registry) {
            NextLoad::Load(locator) => {
                debug!("Loading test '{locator}'");
                source.load(&locator, Registrar::new(tx.clone(), locator.clone()));
                await_registration(registry, rx).await?;
            }
            NextLoad::Done => {
                info!("All {} test definitions loaded", registry.len());
                return Ok(());
            }
        }
    }
}

async fn await_registration(
    registry: &mut TestRegistry,
    rx: &mut UnboundedReceiver<Event>,
) -> Result<(), EngineError> {
    match rx.recv().await {
        Some(Event::Registered { name, body }) => match registry.bind_loading(name.clone(), body) {
            Some(locator) => {
                info!("Loaded test '{name}' from '{locator}'");
                Ok(())
            }
            None => Err(EngineError::UnexpectedRegistration { name }),
        },
        Some(Event::RegistrarDropped { locator }) => Err(EngineError::MissingRegistration(locator)),
        Some(Event::StepDone { .. }) | Some(Event::StepDropped { .. }) => {
            Err(EngineError::StepOutsideRunPhase)
        }
        None => Err(EngineError::ChannelClosed),
    }
}
