//! SharedSignal - a signal fed by an upstream pump with idle teardown.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::{Signal, SignalClosed, Watcher};

type PumpFactory<T> =
    Box<dyn Fn(Signal<T>) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// A [`Signal`] whose value is produced by an upstream pump task.
///
/// The pump is spawned when the watcher count goes from zero to one and
/// aborted once the signal has had no watchers for a grace period; a
/// new watcher arriving inside the window cancels the teardown, and one
/// arriving after it restarts the pump from scratch. Watchers replay
/// the latest value either way, so a short-lived detach (a screen
/// rotation, a tab switch) neither loses state nor restarts upstream
/// work.
///
/// Aborting the pump never cancels work the pump has already handed to
/// the store; only the re-query loop stops.
pub struct SharedSignal<T> {
    inner: Arc<SharedInner<T>>,
}

impl<T> Clone for SharedSignal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SharedInner<T> {
    signal: Signal<T>,
    pump: PumpFactory<T>,
    control: Arc<ShareControl>,
}

struct ShareControl {
    runtime: Handle,
    grace: Duration,
    state: Mutex<ShareState>,
}

#[derive(Default)]
struct ShareState {
    watchers: usize,
    pump_task: Option<JoinHandle<()>>,
    /// Bumped on every watch; a pending teardown only fires if no watch
    /// happened after it was scheduled.
    epoch: u64,
}

impl<T: Clone + Send + Sync + 'static> SharedSignal<T> {
    /// Create a shared signal.
    ///
    /// `pump` is invoked on each activation with a handle to the
    /// underlying signal and runs until aborted (or until it returns on
    /// its own, after which the next watcher restarts it). Must be
    /// called from within a Tokio runtime; the pump and teardown timers
    /// are spawned on it.
    pub fn new<F, Fut>(initial: T, grace: Duration, pump: F) -> Self
    where
        F: Fn(Signal<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let pump: PumpFactory<T> = Box::new(move |signal| Box::pin(pump(signal)));
        Self {
            inner: Arc::new(SharedInner {
                signal: Signal::new(initial),
                pump,
                control: Arc::new(ShareControl {
                    runtime: Handle::current(),
                    grace,
                    state: Mutex::new(ShareState::default()),
                }),
            }),
        }
    }

    /// Snapshot of the latest value, without activating the pump.
    pub fn get(&self) -> T {
        self.inner.signal.get()
    }

    /// Attach a watcher, starting the pump if it is not running.
    pub fn watch(&self) -> SharedWatcher<T> {
        let control = &self.inner.control;
        let mut state = control.state.lock().unwrap();
        state.watchers += 1;
        state.epoch += 1;

        let running = state
            .pump_task
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false);
        if !running {
            if let Some(stale) = state.pump_task.take() {
                stale.abort();
            }
            let fut = (self.inner.pump)(self.inner.signal.clone());
            state.pump_task = Some(control.runtime.spawn(fut));
        }
        drop(state);

        SharedWatcher {
            watcher: self.inner.signal.watch(),
            control: Arc::clone(control),
        }
    }

    /// Whether the pump task is currently running.
    pub fn is_active(&self) -> bool {
        let state = self.inner.control.state.lock().unwrap();
        state
            .pump_task
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    /// The configured idle grace period.
    pub fn grace(&self) -> Duration {
        self.inner.control.grace
    }
}

/// A counted subscription to a [`SharedSignal`]. Dropping the last one
/// schedules the pump teardown after the grace period.
pub struct SharedWatcher<T> {
    watcher: Watcher<T>,
    control: Arc<ShareControl>,
}

impl<T: Clone> SharedWatcher<T> {
    /// The most recently published value.
    pub fn latest(&self) -> T {
        self.watcher.latest()
    }

    /// Wait until a value newer than the last seen one is published.
    pub async fn changed(&mut self) -> Result<(), SignalClosed> {
        self.watcher.changed().await
    }

    /// Wait for the next value and return it.
    pub async fn next(&mut self) -> Result<T, SignalClosed> {
        self.watcher.next().await
    }
}

impl<T> Drop for SharedWatcher<T> {
    fn drop(&mut self) {
        let Ok(mut state) = self.control.state.lock() else {
            return;
        };
        state.watchers -= 1;
        if state.watchers > 0 {
            return;
        }

        let epoch = state.epoch;
        drop(state);

        let control = Arc::clone(&self.control);
        self.control.runtime.spawn(async move {
            tokio::time::sleep(control.grace).await;
            let Ok(mut state) = control.state.lock() else {
                return;
            };
            if state.watchers == 0 && state.epoch == epoch {
                if let Some(task) = state.pump_task.take() {
                    task.abort();
                }
            }
        });
    }
}
