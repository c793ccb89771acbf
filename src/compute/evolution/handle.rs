//! Background execution: run the engine on its own thread while another
//! thread polls status and requests cancellation.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::error;

use crate::schema::{PopulationEntry, RunConfig, RunState, RunSummary, StatusSnapshot};

use super::engine::Engine;
use super::error::EvolutionError;

/// Holds the latest published snapshot.
///
/// Snapshots are replaced whole, never edited in place, so readers always see
/// the state of a single step boundary.
#[derive(Debug)]
pub struct StatusSlot<C> {
    current: RwLock<Arc<StatusSnapshot<C>>>,
}

impl<C> StatusSlot<C> {
    pub fn new(initial: StatusSnapshot<C>) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// Replace the current snapshot.
    pub fn publish(&self, snapshot: StatusSnapshot<C>) {
        let snapshot = Arc::new(snapshot);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    /// The most recently published snapshot.
    pub fn load(&self) -> Arc<StatusSnapshot<C>> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }
}

/// An engine returned from its background thread after a successful run.
pub struct FinishedRun<C> {
    pub engine: Engine<C>,
    pub summary: RunSummary,
}

type RunOutput<C> = (Engine<C>, Result<RunSummary, EvolutionError>);

/// Handle to an evolution run executing on a background thread.
pub struct EvolutionHandle<C> {
    status: Arc<StatusSlot<C>>,
    cancelled: Arc<AtomicBool>,
    thread: JoinHandle<RunOutput<C>>,
}

impl<C: Clone + Send + Sync + 'static> Engine<C> {
    /// Start evolving on a background thread.
    pub fn start(
        self,
        time_limit: Duration,
        filter_interval: usize,
    ) -> Result<EvolutionHandle<C>, EvolutionError> {
        let run = RunConfig {
            time_limit_secs: time_limit.as_secs_f64(),
            filter_interval,
            ..self.config().run.clone()
        };
        self.start_with(run)
    }

    /// Start evolving on a background thread with full run settings.
    ///
    /// Configuration and setup errors are reported here, before any thread is
    /// spawned.
    pub fn start_with(mut self, run: RunConfig) -> Result<EvolutionHandle<C>, EvolutionError> {
        let initial = self.begin(&run)?;
        let status = Arc::new(StatusSlot::new(initial));
        let cancelled = self.cancel_handle();

        let publisher = Arc::clone(&status);
        let thread = thread::Builder::new()
            .name("evolution".to_string())
            .spawn(move || {
                let result = self.run_loop(&run, |snapshot| publisher.publish(snapshot));
                (self, result)
            })?;

        Ok(EvolutionHandle {
            status,
            cancelled,
            thread,
        })
    }
}

impl<C: Clone> EvolutionHandle<C> {
    /// Request cancellation. The run stops before its next step.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Latest published snapshot.
    pub fn status(&self) -> Arc<StatusSnapshot<C>> {
        self.status.load()
    }

    /// True once the background thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the run to end and take the engine back.
    pub fn join(self) -> Result<FinishedRun<C>, EvolutionError> {
        match self.thread.join() {
            Ok((engine, result)) => result.map(|summary| FinishedRun { engine, summary }),
            Err(payload) => {
                let message = panic_message(payload);
                error!("Evolution thread panicked: {}", message);

                let last = self.status.load();
                let mut terminal = StatusSnapshot::clone(&last);
                terminal.state = RunState::Failed;
                terminal.error = Some(message.clone());
                self.status.publish(terminal);

                Err(EvolutionError::Panicked(message))
            }
        }
    }

    /// Wait for the run to end and return the lowest-penalty entry.
    pub fn wait_until_done(self) -> Result<PopulationEntry<C>, EvolutionError> {
        let finished = self.join()?;
        finished
            .engine
            .population()
            .best_by_penalty()
            .cloned()
            .ok_or(EvolutionError::NotSeeded)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic!".to_string()
    }
}
