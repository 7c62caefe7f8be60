//! Default configuration values

use std::time::Duration;

/// Period between two drain cycles of the write-behind cache (one time unit)
pub const DRAIN_PERIOD: Duration = Duration::from_secs(1);

/// Interval between two polls of the pending-write buffer (1/8 time unit)
pub const POLL_INTERVAL: Duration = Duration::from_millis(125);

/// Polls `stop()` waits for the buffer to drain before giving up
pub const STOP_WATCHDOG_POLLS: u32 = 80;

/// Polls a non-waiting `sync()` performs before giving up
pub const SYNC_WATCHDOG_POLLS: u32 = 40;

/// File extension of persisted cache artifacts
pub const ARTIFACT_EXTENSION: &str = "dmp";

/// Name of the background writer thread
pub const WRITER_THREAD_NAME: &str = "pkgcache-writer";

/// Version of the on-disk artifact envelope
pub const ARTIFACT_FORMAT: u32 = 1;

/// Shortest drain period or poll interval a write-behind cache runs with
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);
