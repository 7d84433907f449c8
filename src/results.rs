//! Result data structures for speed test output.
//!
//! These structures describe a complete run: the client as seen by the
//! API, one entry per tested server, and the cross-server summaries.
//! All of them implement Serialize for JSON output.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::fast::server::ClientInfo;
use crate::fast::tests::engine::ServerOutcome;
use crate::fast::tests::throughput::ThroughputReport;
use crate::stats::{mean, std_dev};

/// Complete results from a speed test run.
#[derive(Debug, Clone, Serialize)]
pub struct SpeedTestResults {
    /// Timestamp when the test was completed
    pub timestamp: DateTime<Utc>,
    /// The client as reported by the targets endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientInfo>,
    /// Per-server results, in test order
    pub servers: Vec<ServerResults>,
    /// Download speed across all servers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download: Option<SpeedSummary>,
    /// Upload speed across all servers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload: Option<SpeedSummary>,
}

impl SpeedTestResults {
    pub fn from_outcomes(
        client: Option<ClientInfo>,
        outcomes: &[ServerOutcome],
    ) -> Self {
        let servers: Vec<ServerResults> =
            outcomes.iter().map(ServerResults::from_outcome).collect();

        let download = SpeedSummary::from_speeds(
            &servers
                .iter()
                .filter_map(|s| s.download.as_ref().map(|d| d.speed_mbps))
                .collect::<Vec<_>>(),
        );
        let upload = SpeedSummary::from_speeds(
            &servers
                .iter()
                .filter_map(|s| s.upload.as_ref().map(|u| u.speed_mbps))
                .collect::<Vec<_>>(),
        );

        Self { timestamp: Utc::now(), client, servers, download, upload }
    }
}

/// Results for one server.
#[derive(Debug, Clone, Serialize)]
pub struct ServerResults {
    pub name: String,
    pub url: String,
    pub city: String,
    pub country: String,
    /// Resolved address, absent when resolution failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Average round-trip time in milliseconds, absent when the latency
    /// test failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download: Option<ThroughputResults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload: Option<ThroughputResults>,
}

impl ServerResults {
    pub fn from_outcome(outcome: &ServerOutcome) -> Self {
        Self {
            name: outcome.server.name.clone(),
            url: outcome.server.url.clone(),
            city: outcome.server.location.city.clone(),
            country: outcome.server.location.country.clone(),
            ip: outcome.ip.map(|ip| ip.to_string()),
            latency_ms: outcome.latency.map(|d| d.as_secs_f64() * 1000.0),
            download: outcome.download.as_ref().map(ThroughputResults::from),
            upload: outcome.upload.as_ref().map(ThroughputResults::from),
        }
    }
}

/// One throughput test (download or upload).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThroughputResults {
    /// Bytes counted before the deadline
    pub bytes: u64,
    /// Test duration in seconds
    pub duration_secs: f64,
    pub bits_per_second: f64,
    pub speed_mbps: f64,
}

impl From<&ThroughputReport> for ThroughputResults {
    fn from(report: &ThroughputReport) -> Self {
        Self {
            bytes: report.bytes,
            duration_secs: report.duration.as_secs_f64(),
            bits_per_second: report.bits_per_second,
            speed_mbps: report.bits_per_second / 1_000_000.0,
        }
    }
}

/// Mean and population standard deviation of per-server speeds, in Mbps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedSummary {
    pub mean_mbps: f64,
    pub std_dev_mbps: f64,
    pub samples: usize,
}

impl SpeedSummary {
    /// `None` when no server produced a result.
    pub fn from_speeds(speeds: &[f64]) -> Option<Self> {
        if speeds.is_empty() {
            return None;
        }

        let mean_mbps = mean(speeds);

        Some(Self {
            mean_mbps,
            std_dev_mbps: std_dev(speeds, mean_mbps),
            samples: speeds.len(),
        })
    }
}
