//! Progress reporting for decoding runs.
//!
//! Readers report one unit per decoded row through a [`ProgressCallback`],
//! so the rendering backend (an `indicatif` bar in the CLI, nothing in
//! tests) stays out of this crate.

use std::sync::Arc;

/// Receives row-level progress from a decoding run.
pub trait ProgressCallback: Send + Sync {
    /// Sets the total number of rows expected.
    fn set_total(&self, total: u64);

    /// Advances progress by `delta` rows.
    fn inc(&self, delta: u64);

    /// Updates the message shown next to the indicator, typically the file
    /// being read.
    fn set_message(&self, msg: String);

    /// Marks the run as complete with a final message.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
