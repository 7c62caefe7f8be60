//! Write-behind persistent cache
//!
//! Producers hand values to [`WriteBehindCache::push`], which snapshots them
//! into a pending-write stack and returns immediately. A background
//! [`PeriodicTask`] wakes once per drain period and empties the whole stack
//! into the [`DurableStore`]. Readers go straight to the store through
//! [`WriteBehindCache::pop`].
//!
//! The stack is drained top first, so entries reach the store in reverse
//! push order: pushing `v1` then `v2` for the same key within one period
//! leaves `v1` persisted.
//!
//! Everything here is best effort. Failures are logged and absorbed; the
//! only thing a caller ever observes is a miss.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::defaults;
use crate::core::lifo::Lifo;
use crate::core::scheduler::PeriodicTask;
use crate::core::store::{DurableStore, Payload, Snapshot};
use crate::error::CacheError;

/// Timing of the drain task and of the blocking waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteBehindConfig {
    /// Period between drain cycles; the first cycle is deferred by one period
    pub drain_period: Duration,
    /// Sleep between two checks of the pending-write buffer
    pub poll_interval: Duration,
    /// Polls `stop()` waits for the buffer to drain
    pub stop_watchdog: u32,
    /// Polls a non-waiting `sync()` performs
    pub sync_watchdog: u32,
}

impl WriteBehindConfig {
    /// Scale every timing from a single time unit
    ///
    /// The drain period is one unit and the poll interval an eighth of it,
    /// so `stop()` waits at most ten units.
    #[must_use]
    pub fn with_time_unit(unit: Duration) -> Self {
        Self {
            drain_period: unit,
            poll_interval: unit / 8,
            ..Self::default()
        }
        .clamped()
    }

    /// Raise zero or sub-millisecond intervals to [`defaults::MIN_INTERVAL`]
    ///
    /// A zero period would make the drain thread and the watchdog loops spin.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            drain_period: self.drain_period.max(defaults::MIN_INTERVAL),
            poll_interval: self.poll_interval.max(defaults::MIN_INTERVAL),
            ..self
        }
    }
}

impl Default for WriteBehindConfig {
    fn default() -> Self {
        Self {
            drain_period: defaults::DRAIN_PERIOD,
            poll_interval: defaults::POLL_INTERVAL,
            stop_watchdog: defaults::STOP_WATCHDOG_POLLS,
            sync_watchdog: defaults::SYNC_WATCHDOG_POLLS,
        }
    }
}

/// A buffered write
#[derive(Debug)]
struct PendingWrite {
    key: String,
    payload: Payload,
}

/// State shared with the drain task, guarded by a single mutex
#[derive(Debug, Default)]
struct BufferState {
    alive: bool,
    /// Set while the drain task holds an entry it has not written yet
    flushing: bool,
    pending: Lifo<PendingWrite>,
}

impl BufferState {
    fn is_filled(&self) -> bool {
        self.flushing || self.pending.is_filled()
    }
}

struct Shared {
    state: Mutex<BufferState>,
    store: Option<Arc<dyn DurableStore>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, BufferState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// One drain cycle: empty the whole stack into the store
    fn drain(&self) {
        let Some(store) = self.store.as_deref() else {
            return;
        };

        let mut written = 0usize;
        loop {
            let entry = {
                let mut state = self.lock();
                if !state.alive {
                    break;
                }
                let Some(entry) = state.pending.pop() else {
                    break;
                };
                state.flushing = true;
                entry
            };
            let _in_flight = InFlight(self);

            if let Err(e) = store.write(&entry.key, &entry.payload) {
                tracing::warn!("Cache write for '{}' failed, skipping drain cycle: {e}", entry.key);
                break;
            }
            written += 1;
        }

        if written > 0 {
            tracing::trace!("Drain cycle persisted {written} cache entries");
        }
    }
}

/// Clears the in-flight flag when the popped entry is done with, even if
/// the store panicked while writing it
struct InFlight<'a>(&'a Shared);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.lock().flushing = false;
    }
}

/// Asynchronous write-behind cache
///
/// Construct once, call [`start`](Self::start) before use and
/// [`stop`](Self::stop) before exiting. While stopped, every push is
/// silently dropped.
pub struct WriteBehindCache {
    shared: Arc<Shared>,
    writer: Mutex<Option<PeriodicTask>>,
    config: WriteBehindConfig,
}

impl WriteBehindCache {
    /// Create a cache persisting into `store`
    pub fn new(store: Arc<dyn DurableStore>, config: WriteBehindConfig) -> Self {
        Self::build(Some(store), config)
    }

    /// Create a cache without durable storage
    ///
    /// Every persistence operation is a no-op and every read is a miss.
    pub fn detached(config: WriteBehindConfig) -> Self {
        Self::build(None, config)
    }

    fn build(store: Option<Arc<dyn DurableStore>>, config: WriteBehindConfig) -> Self {
        let config = config.clamped();
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(BufferState::default()),
                store,
            }),
            writer: Mutex::new(None),
            config,
        }
    }

    fn writer(&self) -> MutexGuard<'_, Option<PeriodicTask>> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start the drain task and begin accepting writes
    ///
    /// Any stale buffered writes are dropped first. Starting a started
    /// cache does nothing.
    pub fn start(&self) -> Result<(), CacheError> {
        let mut writer = self.writer();
        if writer.is_some() {
            tracing::debug!("Write-behind cache already started");
            return Ok(());
        }

        self.shared.lock().pending.clear();

        let shared = Arc::clone(&self.shared);
        let task = PeriodicTask::spawn(
            defaults::WRITER_THREAD_NAME,
            self.config.drain_period,
            true,
            move || shared.drain(),
        )
        .map_err(|e| CacheError::WriterSpawn {
            name: defaults::WRITER_THREAD_NAME.to_string(),
            error: e.to_string(),
        })?;
        *writer = Some(task);

        self.shared.lock().alive = true;
        tracing::info!(
            "Write-behind cache started (drain every {:?})",
            self.config.drain_period
        );
        Ok(())
    }

    /// Stop accepting writes and terminate the drain task
    ///
    /// Waits for the buffer to drain for at most `stop_watchdog` polls, then
    /// drops whatever is still buffered and joins the drain task.
    pub fn stop(&self) {
        let mut watchdog = self.config.stop_watchdog;
        while self.has_pending() && watchdog > 0 {
            watchdog -= 1;
            thread::sleep(self.config.poll_interval);
        }

        let dropped = {
            let mut state = self.shared.lock();
            state.alive = false;
            let dropped = state.pending.len();
            state.pending.clear();
            dropped
        };
        if dropped > 0 {
            tracing::warn!("Write-behind cache stopped with {dropped} unflushed entries");
        }

        let task = self.writer().take();
        if let Some(task) = task {
            let name = task.name().to_string();
            task.stop();
            tracing::info!("Write-behind cache stopped (writer '{name}' joined)");
        }
    }

    /// Whether the cache is accepting writes
    pub fn is_started(&self) -> bool {
        self.shared.lock().alive
    }

    /// Number of buffered writes
    pub fn pending(&self) -> usize {
        self.shared.lock().pending.len()
    }

    fn has_pending(&self) -> bool {
        self.shared.lock().is_filled()
    }

    /// Queue `value` for asynchronous persistence under `key`
    ///
    /// The value is snapshotted now; later changes to it are not persisted.
    /// A value that cannot be snapshotted is dropped with a warning.
    pub fn push<T: Snapshot + ?Sized>(&self, key: &str, value: &T) {
        if !self.is_started() || self.shared.store.is_none() {
            return;
        }

        let payload = match self.snapshot(key, value) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("{e}");
                return;
            }
        };

        let mut state = self.shared.lock();
        if state.alive {
            state.pending.push(PendingWrite {
                key: key.to_string(),
                payload,
            });
        }
    }

    /// Persist `value` under `key` right away, bypassing the buffer
    pub fn write_through<T: Snapshot + ?Sized>(&self, key: &str, value: &T) {
        if !self.is_started() {
            return;
        }
        let Some(store) = self.shared.store.as_deref() else {
            return;
        };

        let result = self
            .snapshot(key, value)
            .and_then(|payload| store.write(key, &payload).map_err(CacheError::from));
        if let Err(e) = result {
            tracing::warn!("{e}");
        }
    }

    fn snapshot<T: Snapshot + ?Sized>(&self, key: &str, value: &T) -> Result<Payload, CacheError> {
        value.snapshot().map_err(|e| CacheError::Snapshot {
            key: key.to_string(),
            error: e.to_string(),
        })
    }

    /// Read the persisted payload for `key`
    ///
    /// Does not look at buffered writes.
    pub fn pop_payload(&self, key: &str) -> Option<Payload> {
        let store = self.shared.store.as_deref()?;
        match store.read(key) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!("Cache read for '{key}' failed: {e}");
                None
            }
        }
    }

    /// Read and decode the persisted value for `key`
    pub fn pop<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let payload = self.pop_payload(key)?;
        match serde_json::from_value(payload) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("Cached value for '{key}' does not decode: {e}");
                None
            }
        }
    }

    /// Give the drain task a chance to flush, then empty the buffer
    ///
    /// With `wait` the call polls until the buffer is empty or the cache is
    /// stopped; otherwise it gives up after `sync_watchdog` polls. Anything
    /// still buffered at the end is dropped.
    pub fn sync(&self, wait: bool) {
        if !self.is_started() {
            self.shared.lock().pending.clear();
            return;
        }

        let mut watchdog = self.config.sync_watchdog;
        loop {
            {
                let state = self.shared.lock();
                if !state.is_filled() || !state.alive {
                    break;
                }
            }
            if !wait {
                if watchdog == 0 {
                    break;
                }
                watchdog -= 1;
            }
            thread::sleep(self.config.poll_interval);
        }

        self.shared.lock().pending.clear();
    }

    /// Drop every buffered write without persisting it
    pub fn discard(&self) {
        let mut state = self.shared.lock();
        let dropped = state.pending.len();
        state.pending.clear();
        tracing::debug!("Discarded {dropped} buffered cache writes");
    }
}

impl Drop for WriteBehindCache {
    fn drop(&mut self) {
        if self.writer().is_some() {
            self.stop();
        }
    }
}

impl std::fmt::Debug for WriteBehindCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteBehindCache")
            .field("config", &self.config)
            .field("started", &self.is_started())
            .field("pending", &self.pending())
            .field("detached", &self.shared.store.is_none())
            .finish()
    }
}
