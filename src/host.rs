// File: src/host.rs
//
// Concurrency boundary between a host application and the machine.
//
// The machine lives behind `Arc<Mutex<..>>`. Run requests are queued on an
// mpsc channel and drained in arrival order by a single worker thread, which
// takes the lock for the whole run. Readers (renderers, UI panels) use
// `try_snapshot`, which never waits on a run in progress.

use crate::errors::LogoError;
use crate::vm::{Machine, MachineSnapshot};
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Result of one queued run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub elapsed: Duration,
    pub error: Option<LogoError>,
}

impl RunOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostError {
    /// The worker has shut down; no more runs are accepted
    Stopped,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HostError::Stopped => write!(f, "host worker has stopped"),
        }
    }
}

impl std::error::Error for HostError {}

pub struct Host {
    machine: Arc<Mutex<Machine>>,
    requests: Option<Sender<String>>,
    outcomes: Receiver<RunOutcome>,
    worker: Option<JoinHandle<()>>,
}

impl Host {
    /// Take ownership of `machine` and start the worker thread
    pub fn spawn(machine: Machine) -> std::io::Result<Self> {
        let machine = Arc::new(Mutex::new(machine));
        let (request_tx, request_rx) = mpsc::channel::<String>();
        let (outcome_tx, outcome_rx) = mpsc::channel();

        let shared = Arc::clone(&machine);
        let worker = thread::Builder::new()
            .name("plogo-worker".to_string())
            .spawn(move || worker_loop(shared, request_rx, outcome_tx))?;

        Ok(Host { machine, requests: Some(request_tx), outcomes: outcome_rx, worker: Some(worker) })
    }

    /// Queue `source` to run against the current machine state
    pub fn submit(&self, source: impl Into<String>) -> Result<(), HostError> {
        match &self.requests {
            Some(tx) => tx.send(source.into()).map_err(|_| HostError::Stopped),
            None => Err(HostError::Stopped),
        }
    }

    /// Reset the machine and queue a fresh run of `source`.
    /// A soft reload (`hard == false`) keeps root-frame slider values.
    pub fn reload(&self, source: impl Into<String>, hard: bool) -> Result<(), HostError> {
        if self.requests.is_none() {
            return Err(HostError::Stopped);
        }
        lock(&self.machine).reset(hard, false);
        self.submit(source)
    }

    /// Block until the next run finishes. None once the worker is gone.
    pub fn recv_outcome(&self) -> Option<RunOutcome> {
        self.outcomes.recv().ok()
    }

    pub fn recv_outcome_timeout(&self, timeout: Duration) -> Option<RunOutcome> {
        self.outcomes.recv_timeout(timeout).ok()
    }

    pub fn try_recv_outcome(&self) -> Option<RunOutcome> {
        match self.outcomes.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Snapshot without waiting; None while a run holds the lock
    pub fn try_snapshot(&self) -> Option<MachineSnapshot> {
        match self.machine.try_lock() {
            Ok(machine) => Some(machine.snapshot()),
            Err(TryLockError::WouldBlock) => None,
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner().snapshot()),
        }
    }

    /// Blocking access for host-only writes (slider values, start pose)
    pub fn with_machine<R>(&self, f: impl FnOnce(&mut Machine) -> R) -> R {
        f(&mut lock(&self.machine))
    }

    /// Close the queue and wait for queued runs to drain
    pub fn shutdown(&mut self) {
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("plogo worker panicked");
            }
        }
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// A panic mid-run poisons the mutex; the machine is still structurally valid
fn lock(machine: &Mutex<Machine>) -> MutexGuard<'_, Machine> {
    machine.lock().unwrap_or_else(PoisonError::into_inner)
}

fn worker_loop(machine: Arc<Mutex<Machine>>, requests: Receiver<String>, outcomes: Sender<RunOutcome>) {
    for source in requests {
        let start = Instant::now();
        let result = {
            let mut guard = lock(&machine);
            crate::compile_and_run(&source, &mut guard)
        };
        let elapsed = start.elapsed();

        match &result {
            Ok(()) => tracing::debug!(elapsed_ms = elapsed.as_secs_f64() * 1000.0, "run finished"),
            Err(err) => tracing::warn!(
                kind = %err.kind,
                location = %err.location,
                "run failed: {}",
                err.message
            ),
        }

        // The host may have stopped listening; keep draining regardless
        let _ = outcomes.send(RunOutcome { elapsed, error: result.err() });
    }
    tracing::debug!("plogo worker exiting");
}
