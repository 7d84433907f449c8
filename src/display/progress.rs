//! Progress event types and callback interface.
//!
//! Defines the events emitted by the ranking step and the test engine,
//! and the callback trait for receiving them.

use crate::fast::tests::Direction;
use std::time::Duration;

/// Test phases during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestPhase {
    /// Probing candidates to pick the test servers
    Ranking,
    /// Running the latency test against one server
    Latency,
    /// Running a throughput test against one server
    Throughput(Direction),
}

/// Progress events emitted during test execution.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A phase has started
    PhaseChange(TestPhase),
    /// Bytes moved so far by a running throughput test
    Throughput {
        direction: Direction,
        /// Bytes counted so far
        bytes: u64,
        /// Time since the test started
        elapsed: Duration,
    },
    /// A phase has finished
    PhaseComplete(TestPhase),
}

/// Callback interface for progress updates.
///
/// Implementations must be non-blocking to avoid affecting
/// measurement accuracy.
pub trait ProgressCallback: Send + Sync {
    /// Called when a progress event occurs.
    fn on_progress(&self, event: ProgressEvent);
}
