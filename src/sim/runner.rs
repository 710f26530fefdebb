//! Background stepping with pause/resume and snapshot hand-off.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, PoisonError, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;

use super::Simulation;
use crate::error::{FieldError, Result, SimulationError};
use crate::fields::{FaceScalar, PrognosticFields};
use crate::numerics::MeshTables;

/// How long a paused worker sleeps before checking for commands again.
const PAUSED_POLL: Duration = Duration::from_millis(20);

/// Lifecycle of the worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Uninitialized,
    Running,
    Paused,
    Terminated,
}

/// Requests applied by the worker between steps.
#[derive(Debug)]
pub enum Command {
    ReplaceHeight(FaceScalar),
    Reset,
}

/// State shared between the worker and its owner.
struct Shared {
    snapshot: RwLock<Arc<PrognosticFields>>,
    paused: Mutex<bool>,
    wake: Condvar,
    /// Step of the latest published snapshot.
    published: Mutex<u64>,
    stepped: Condvar,
    terminate: AtomicBool,
}

impl Shared {
    fn publish(&self, fields: Arc<PrognosticFields>) {
        let step = fields.step;
        {
            let mut slot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
            *slot = fields;
        }
        *self.published.lock().unwrap_or_else(PoisonError::into_inner) = step;
        self.stepped.notify_all();
    }

    fn current(&self) -> Arc<PrognosticFields> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn set_paused(&self, paused: bool) {
        *self.paused.lock().unwrap_or_else(PoisonError::into_inner) = paused;
        self.wake.notify_all();
    }
}

/// Runs a [`Simulation`] on its own thread.
///
/// The worker steps continuously unless paused and publishes every new
/// snapshot by swapping an `Arc`; readers call [`SimulationRunner::current`]
/// at their own cadence and never see a partially built state. Edits go
/// through [`Command`]s so the worker applies them between steps.
pub struct SimulationRunner {
    shared: Arc<Shared>,
    tables: Arc<MeshTables>,
    state: RunState,
    /// Held here until started, and again after termination.
    simulation: Option<Simulation>,
    commands: Option<Sender<Command>>,
    worker: Option<JoinHandle<Simulation>>,
}

impl SimulationRunner {
    pub fn new(simulation: Simulation) -> Self {
        let shared = Arc::new(Shared {
            snapshot: RwLock::new(simulation.current()),
            paused: Mutex::new(false),
            wake: Condvar::new(),
            published: Mutex::new(simulation.current().step),
            stepped: Condvar::new(),
            terminate: AtomicBool::new(false),
        });
        Self {
            shared,
            tables: Arc::clone(simulation.tables()),
            state: RunState::Uninitialized,
            simulation: Some(simulation),
            commands: None,
            worker: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn tables(&self) -> &Arc<MeshTables> {
        &self.tables
    }

    /// Latest published snapshot.
    pub fn current(&self) -> Arc<PrognosticFields> {
        self.shared.current()
    }

    /// Spawn the worker, optionally starting paused.
    pub fn start(&mut self, paused: bool) -> Result<()> {
        match self.state {
            RunState::Uninitialized => {}
            RunState::Terminated => return Err(SimulationError::Terminated),
            RunState::Running | RunState::Paused => return Err(SimulationError::AlreadyStarted),
        }
        let simulation = self.simulation.take().ok_or(SimulationError::Terminated)?;
        let (tx, rx) = mpsc::channel();
        *self.shared.paused.lock().unwrap_or_else(PoisonError::into_inner) = paused;

        let shared = Arc::clone(&self.shared);
        let worker = std::thread::Builder::new()
            .name("simulation".into())
            .spawn(move || run_worker(simulation, shared, rx))?;

        self.worker = Some(worker);
        self.commands = Some(tx);
        self.state = if paused {
            RunState::Paused
        } else {
            RunState::Running
        };
        log::info!("Simulation worker started ({:?})", self.state);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        self.require_started()?;
        self.shared.set_paused(true);
        if self.state != RunState::Paused {
            log::info!("Simulation paused");
        }
        self.state = RunState::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.require_started()?;
        self.shared.set_paused(false);
        if self.state != RunState::Running {
            log::info!("Simulation resumed");
        }
        self.state = RunState::Running;
        Ok(())
    }

    pub fn toggle_pause(&mut self) -> Result<()> {
        match self.state {
            RunState::Paused => self.resume(),
            _ => self.pause(),
        }
    }

    /// Queue a command for the worker, or apply it directly if the worker has
    /// not been started.
    ///
    /// A replacement height from another mesh is rejected here rather than
    /// by the worker, so the caller sees the error.
    pub fn submit(&mut self, command: Command) -> Result<()> {
        if let Command::ReplaceHeight(height) = &command {
            if height.mesh_id() != self.tables.mesh_id() {
                return Err(FieldError::MeshMismatch {
                    left: height.mesh_id().0,
                    right: self.tables.mesh_id().0,
                }
                .into());
            }
        }
        match self.state {
            RunState::Terminated => Err(SimulationError::Terminated),
            RunState::Uninitialized => {
                let simulation = self.simulation.as_mut().ok_or(SimulationError::NotRunning)?;
                apply(simulation, command)?;
                self.shared.publish(simulation.current());
                Ok(())
            }
            RunState::Running | RunState::Paused => {
                let tx = self.commands.as_ref().ok_or(SimulationError::NotRunning)?;
                tx.send(command).map_err(|_| SimulationError::Terminated)?;
                self.shared.wake.notify_all();
                Ok(())
            }
        }
    }

    pub fn replace_height(&mut self, height: FaceScalar) -> Result<()> {
        self.submit(Command::ReplaceHeight(height))
    }

    pub fn reset(&mut self) -> Result<()> {
        self.submit(Command::Reset)
    }

    /// Block until a snapshot with at least `step` steps is published, or the
    /// timeout passes. Returns whether the step was reached.
    pub fn wait_for_step(&self, step: u64, timeout: Duration) -> bool {
        let published = self.shared.published.lock().unwrap_or_else(PoisonError::into_inner);
        let (published, _) = self
            .shared
            .stepped
            .wait_timeout_while(published, timeout, |published| *published < step)
            .unwrap_or_else(PoisonError::into_inner);
        *published >= step
    }

    /// Stop the worker and hand back the simulation.
    ///
    /// A step in progress is allowed to finish; nothing after it is published.
    pub fn terminate(&mut self) -> Result<Simulation> {
        if self.state == RunState::Terminated {
            return Err(SimulationError::Terminated);
        }
        self.shared.terminate.store(true, Ordering::SeqCst);
        self.shared.set_paused(false);
        self.commands = None;
        self.state = RunState::Terminated;

        let simulation = match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| SimulationError::WorkerPanicked)?,
            None => self.simulation.take().ok_or(SimulationError::NotRunning)?,
        };
        log::info!("Simulation terminated at step {}", simulation.step_count());
        Ok(simulation)
    }

    fn require_started(&self) -> Result<()> {
        match self.state {
            RunState::Uninitialized => Err(SimulationError::NotRunning),
            RunState::Terminated => Err(SimulationError::Terminated),
            RunState::Running | RunState::Paused => Ok(()),
        }
    }
}

impl Drop for SimulationRunner {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.shared.terminate.store(true, Ordering::SeqCst);
            self.shared.set_paused(false);
            let _ = worker.join();
        }
    }
}

fn apply(simulation: &mut Simulation, command: Command) -> Result<()> {
    match command {
        Command::ReplaceHeight(height) => simulation.replace_height(height)?,
        Command::Reset => simulation.reset(),
    }
    Ok(())
}

fn run_worker(
    mut simulation: Simulation,
    shared: Arc<Shared>,
    commands: Receiver<Command>,
) -> Simulation {
    let drain = |simulation: &mut Simulation| {
        let mut applied = false;
        while let Ok(command) = commands.try_recv() {
            if let Err(err) = apply(simulation, command) {
                log::warn!("Ignoring command: {}", err);
            } else {
                applied = true;
            }
        }
        if applied {
            shared.publish(simulation.current());
        }
    };

    while !shared.terminate.load(Ordering::SeqCst) {
        {
            let mut paused = shared.paused.lock().unwrap_or_else(PoisonError::into_inner);
            while *paused && !shared.terminate.load(Ordering::SeqCst) {
                drop(paused);
                drain(&mut simulation);
                paused = shared.paused.lock().unwrap_or_else(PoisonError::into_inner);
                if !*paused {
                    break;
                }
                paused = shared
                    .wake
                    .wait_timeout(paused, PAUSED_POLL)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0;
            }
        }
        if shared.terminate.load(Ordering::SeqCst) {
            break;
        }

        drain(&mut simulation);
        let next = simulation.step();
        shared.publish(next);
    }
    simulation
}
