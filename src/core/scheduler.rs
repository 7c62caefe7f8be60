//! Periodic background task
//!
//! Runs a job on its own named thread at a fixed period until told to stop.
//! Stopping is cooperative: the stop signal wakes the thread out of its wait
//! immediately, but a job that is already running is allowed to finish.
//! A panicking run is logged and the task keeps its schedule.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Handle to a running periodic task
///
/// Dropping the handle stops the task and joins its thread.
#[derive(Debug)]
pub struct PeriodicTask {
    name: String,
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Spawn a periodic task
    ///
    /// # Arguments
    ///
    /// * `name` - Thread name, also used in diagnostics
    /// * `period` - Delay between the end of one run and the start of the next
    /// * `delay_before` - Defer the first run by one full period
    /// * `job` - Work executed on every tick
    ///
    /// Blocks until the spawned thread is running.
    pub fn spawn<F>(
        name: &str,
        period: Duration,
        delay_before: bool,
        mut job: F,
    ) -> std::io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (ready_tx, ready_rx) = mpsc::channel::<()>();
        let task_name = name.to_string();
        let mut run = move || {
            if panic::catch_unwind(AssertUnwindSafe(&mut job)).is_err() {
                tracing::warn!("Periodic task '{task_name}' panicked; waiting for next run");
            }
        };

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let _ = ready_tx.send(());

                if !delay_before {
                    run();
                }

                loop {
                    match stop_rx.recv_timeout(period) {
                        Err(RecvTimeoutError::Timeout) => run(),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })?;

        // The sender only disappears without a message if the thread died first.
        let _ = ready_rx.recv();
        tracing::debug!("Periodic task '{name}' running every {period:?}");

        Ok(Self {
            name: name.to_string(),
            stop_tx,
            handle: Some(handle),
        })
    }

    /// Task name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signal termination and wait for the thread to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        let _ = self.stop_tx.send(());
        if handle.join().is_err() {
            tracing::warn!("Periodic task '{}' panicked", self.name);
        } else {
            tracing::debug!("Periodic task '{}' stopped", self.name);
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.shutdown();
    }
}
