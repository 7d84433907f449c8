//! Run configuration and its validation.
//!
//! [`Options`] carries everything the command line decides. It is
//! validated once, before any network activity, and the [`TestConfig`]
//! it holds is then passed by reference to every test.

use crate::errors::SpeedTestError;
use crate::fast::tests::probe::ProbeKind;
use std::ops::RangeInclusive;
use std::time::Duration;

/// Largest chunk or payload the test servers accept, in bytes.
pub const MAX_TRANSFER_SIZE: u64 = 26_214_400;

/// Allowed number of servers to test against.
pub const SERVER_COUNT_RANGE: RangeInclusive<usize> = 1..=5;
/// Allowed number of parallel transfers.
pub const CONCURRENCY_RANGE: RangeInclusive<usize> = 1..=16;
/// Allowed test duration in seconds.
pub const DURATION_SECS_RANGE: RangeInclusive<u64> = 3..=30;
/// Allowed number of pings in the latency test.
pub const PING_COUNT_RANGE: RangeInclusive<usize> = 1..=5;
/// Allowed chunk and payload sizes in bytes.
pub const TRANSFER_SIZE_RANGE: RangeInclusive<u64> = 1..=MAX_TRANSFER_SIZE;

/// Parameters shared by the latency, download and upload tests.
#[derive(Debug, Clone, PartialEq)]
pub struct TestConfig {
    /// Number of transfers kept in flight.
    /// Default: 3
    pub concurrency: usize,

    /// Wall-clock budget of each throughput test.
    /// Default: 15s
    pub duration: Duration,

    /// Size of the upload body in bytes.
    /// Default: 25MiB
    pub payload_size: u64,

    /// Size of each ranged download in bytes.
    /// Default: 25MiB
    pub chunk_size: u64,

    /// Number of echo requests averaged in the latency test.
    /// Default: 3
    pub ping_count: usize,

    /// Use binary (KiB, Mibit/s) instead of decimal unit prefixes.
    pub binary_prefix: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            concurrency: 3,
            duration: Duration::from_secs(15),
            payload_size: MAX_TRANSFER_SIZE,
            chunk_size: MAX_TRANSFER_SIZE,
            ping_count: 3,
            binary_prefix: false,
        }
    }
}

/// Everything decided for one run of the tool.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Access token for the server list API; scraped from fast.com when absent.
    pub token: Option<String>,
    /// Number of lowest-latency servers to test.
    pub server_count: usize,
    /// How round-trip times are measured.
    pub probe: ProbeKind,
    pub run_download: bool,
    pub run_upload: bool,
    pub test: TestConfig,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            token: None,
            server_count: 1,
            probe: ProbeKind::Icmp,
            run_download: true,
            run_upload: true,
            test: TestConfig::default(),
        }
    }
}

impl Options {
    /// Check every bound, returning the first violation.
    pub fn validate(&self) -> Result<(), SpeedTestError> {
        check("count", self.server_count, &SERVER_COUNT_RANGE)?;
        check("concurrency", self.test.concurrency, &CONCURRENCY_RANGE)?;
        check("chunk size", self.test.chunk_size, &TRANSFER_SIZE_RANGE)?;
        check("payload size", self.test.payload_size, &TRANSFER_SIZE_RANGE)?;
        check(
            "duration",
            self.test.duration.as_secs(),
            &DURATION_SECS_RANGE,
        )?;
        if self.test.duration.subsec_nanos() != 0 {
            return Err(SpeedTestError::validation(
                "duration must be a whole number of seconds",
            ));
        }
        check("ping", self.test.ping_count, &PING_COUNT_RANGE)?;

        if let Some(token) = &self.token {
            if token.trim().is_empty() {
                return Err(SpeedTestError::validation(
                    "token must not be empty",
                ));
            }
        }

        Ok(())
    }
}

fn check<T>(
    name: &str,
    value: T,
    range: &RangeInclusive<T>,
) -> Result<(), SpeedTestError>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        return Ok(());
    }

    Err(SpeedTestError::validation(format!(
        "{} must be in the range {}-{} inclusive, got {}",
        name,
        range.start(),
        range.end(),
        value
    )))
}
