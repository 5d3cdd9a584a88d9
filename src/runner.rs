use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use crate::error::Result;
use crate::scheduler::{GrowthPolicy, RunState, Scheduler, TickOutcome};

// messages from the owner to the tick thread
enum RunnerCommand {
    Shutdown,
}

/// what the tick thread reports after every scheduled tick. the receiver is the
/// rendering side; each update means "redraw".
#[derive(Clone, Debug)]
pub struct GrowthUpdate {
    pub outcome: TickOutcome,
    pub polygon_count: usize,
    pub ticks: u64,
    pub state: RunState,
}

/// Timed auto-growth on a background thread.
///
/// The thread wakes every `interval`, and if the scheduler is running, performs one
/// tick under the scheduler lock. `stop` takes the same lock, so once it returns no
/// tick can touch the store until the next `start`.
pub struct AutoRunner {
    scheduler: Arc<Mutex<Scheduler>>,
    command_tx: mpsc::Sender<RunnerCommand>,
    update_tx: mpsc::Sender<GrowthUpdate>,
    update_rx: mpsc::Receiver<GrowthUpdate>,
    handle: Option<thread::JoinHandle<()>>,
}

fn lock(scheduler: &Mutex<Scheduler>) -> MutexGuard<'_, Scheduler> {
    // a panicked tick leaves the store consistent (inserts are atomic), keep going
    scheduler.lock().unwrap_or_else(PoisonError::into_inner)
}

fn snapshot(s: &Scheduler, outcome: TickOutcome) -> GrowthUpdate {
    GrowthUpdate { outcome, polygon_count: s.store().len(), ticks: s.ticks(), state: s.state() }
}

impl AutoRunner {
    /// spawn the tick thread. the scheduler starts out however it was handed in.
    pub fn spawn(scheduler: Scheduler, interval: Duration) -> Result<Self> {
        let scheduler = Arc::new(Mutex::new(scheduler));
        let (command_tx, command_rx) = mpsc::channel();
        let (update_tx, update_rx) = mpsc::channel();

        let shared = Arc::clone(&scheduler);
        let tick_tx = update_tx.clone();
        let handle = thread::Builder::new().name("growth".to_owned()).spawn(move || {
            loop {
                profiling::scope!("growth_thread_loop");

                // sleep until the next tick unless told to quit
                match command_rx.recv_timeout(interval) {
                    Ok(RunnerCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }

                let mut s = lock(&shared);
                if !s.is_running() {
                    continue;
                }
                let outcome = s.tick();
                // sent under the lock so updates arrive in mutation order.
                // nobody listening is fine, growth continues
                let _ = tick_tx.send(snapshot(&s, outcome));
            }
        })?;

        Ok(Self { scheduler, command_tx, update_tx, update_rx, handle: Some(handle) })
    }

    /// begin timed growth. no-op when already running.
    pub fn start(&self, policy: GrowthPolicy) -> bool {
        lock(&self.scheduler).start(policy)
    }

    /// Halt timed growth. Synchronous: no tick mutates the store after this returns.
    /// Listeners get a final `Idle` update so they redraw without previews.
    pub fn stop(&self) {
        let mut s = lock(&self.scheduler);
        s.stop();
        let _ = self.update_tx.send(snapshot(&s, TickOutcome::Idle));
    }

    pub fn is_running(&self) -> bool {
        lock(&self.scheduler).is_running()
    }

    /// run `f` with exclusive access (rendering snapshots, manual picks, preset swaps)
    pub fn with_scheduler<T>(&self, f: impl FnOnce(&mut Scheduler) -> T) -> T {
        f(&mut lock(&self.scheduler))
    }

    /// false once the tick thread has exited (shut down or panicked)
    pub fn is_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn updates(&self) -> &mpsc::Receiver<GrowthUpdate> {
        &self.update_rx
    }

    /// stop the thread and hand the scheduler back. `None` only if the scheduler is
    /// still shared, which cannot happen once the thread has been joined.
    pub fn shutdown(mut self) -> Option<Scheduler> {
        self.join();
        let scheduler = Arc::clone(&self.scheduler);
        drop(self);
        Arc::try_unwrap(scheduler)
            .ok()
            .map(|m| m.into_inner().unwrap_or_else(PoisonError::into_inner))
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.command_tx.send(RunnerCommand::Shutdown);
            let _ = handle.join();
        }
    }
}

impl Drop for AutoRunner {
    fn drop(&mut self) {
        self.join();
    }
}
