//! Signals - observable state cells for UI consumption.
//!
//! A [`Signal`] holds one value. Watchers always see the latest value
//! immediately (replay) and every subsequent change (multicast fan-out).
//! [`SharedSignal`] adds an upstream pump task with teardown-on-idle:
//! the pump starts with the first watcher and is stopped once the signal
//! has been unwatched for a grace period, then restarted lazily.
//!
//! ## Example
//!
//! ```ignore
//! use placemap::Signal;
//!
//! let visible = Signal::new(false);
//! let mut watcher = visible.watch();
//!
//! visible.set(true);
//! watcher.changed().await?;
//! assert!(watcher.latest());
//! ```

mod shared;

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

pub use shared::{SharedSignal, SharedWatcher};

/// A mutable observable cell holding the latest value of some state.
///
/// Cloning is cheap and every clone points at the same cell. Values are
/// delivered conflated: a watcher that falls behind only observes the
/// most recent value, never an intermediate backlog.
pub struct Signal<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: Clone> Signal<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Publish a new value to every watcher.
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Mutate the current value in place and publish the result.
    pub fn update<F: FnOnce(&mut T)>(&self, f: F) {
        self.tx.send_modify(f);
    }

    /// Attach a watcher. It replays the latest value via
    /// [`Watcher::latest`] and wakes on every later [`set`](Self::set).
    pub fn watch(&self) -> Watcher<T> {
        Watcher {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of currently attached watchers.
    pub fn watcher_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A subscription to a [`Signal`].
pub struct Watcher<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone> Watcher<T> {
    /// The most recently published value.
    pub fn latest(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Wait until a value newer than the last seen one is published.
    pub async fn changed(&mut self) -> Result<(), SignalClosed> {
        self.rx.changed().await.map_err(|_| SignalClosed)
    }

    /// Wait for the next value and return it.
    pub async fn next(&mut self) -> Result<T, SignalClosed> {
        self.changed().await?;
        Ok(self.latest())
    }
}

/// The watched signal was dropped; no further values will arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalClosed;

impl fmt::Display for SignalClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "signal closed: publisher dropped")
    }
}

impl std::error::Error for SignalClosed {}
