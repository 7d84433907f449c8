//! Terminal output: transient status lines on stderr and the final report
//! on stdout.

use std::io::Write;

use colored::{Color, Colorize};
use log::debug;

use super::progress::{ProgressCallback, ProgressEvent, TestPhase};
use crate::fast::tests::Direction;
use crate::measurements::{current_rate, format_bytes, format_rate};
use crate::results::{ServerResults, SpeedSummary, SpeedTestResults, ThroughputResults};

/// Erase the current terminal line and return to its start.
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Get color for speed value based on thresholds.
///
/// - Green: >= 100 Mbps (fast)
/// - Yellow: 25-100 Mbps (moderate)
/// - Red: < 25 Mbps (slow)
pub fn speed_color(speed_mbps: f64) -> Color {
    if speed_mbps >= 100.0 {
        Color::Green
    } else if speed_mbps >= 25.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

/// Rewrites a single stderr line as tests progress.
pub struct ConsoleProgress {
    binary: bool,
}

impl ConsoleProgress {
    pub fn new(binary: bool) -> Self {
        Self { binary }
    }
}

impl ProgressCallback for ConsoleProgress {
    fn on_progress(&self, event: ProgressEvent) {
        if let ProgressEvent::PhaseComplete(phase) = &event {
            debug!("{:?} phase complete", phase);
        }

        let mut stderr = std::io::stderr().lock();

        // Write failures on a status line are not worth surfacing.
        let _ = match status_line(&event, self.binary) {
            Some(line) => write!(stderr, "{}{}", CLEAR_LINE, line),
            None => write!(stderr, "{}", CLEAR_LINE),
        };
        let _ = stderr.flush();
    }
}

/// The status text for `event`, or `None` when the line should be cleared.
pub fn status_line(event: &ProgressEvent, binary: bool) -> Option<String> {
    match event {
        ProgressEvent::PhaseChange(TestPhase::Ranking) => {
            Some("Selecting the closest servers...".to_string())
        }
        ProgressEvent::PhaseChange(TestPhase::Latency) => {
            Some("Running the latency test...".to_string())
        }
        ProgressEvent::PhaseChange(TestPhase::Throughput(direction)) => {
            Some(format!("Running the {} test...", direction))
        }
        ProgressEvent::Throughput { direction, bytes, elapsed } => {
            Some(format!(
                "Running the {} test ({})",
                direction,
                format_rate(current_rate(*bytes, *elapsed), binary)
            ))
        }
        ProgressEvent::PhaseComplete(_) => None,
    }
}

/// Print the human readable report to stdout.
pub fn print_report(results: &SpeedTestResults, binary: bool) {
    for line in report_lines(results, binary) {
        println!("{}", line);
    }
}

pub fn report_lines(results: &SpeedTestResults, binary: bool) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(client) = &results.client {
        lines.push(format!(
            "{} {} {}",
            "Client:".bold().white(),
            client.ip.bright_blue(),
            format!("({})", client.isp).bright_blue()
        ));
    }

    for server in &results.servers {
        lines.extend(server_lines(server, binary));
    }

    if results.servers.len() > 1 {
        if let Some(summary) = &results.download {
            lines.push(summary_line(Direction::Download, summary));
        }
        if let Some(summary) = &results.upload {
            lines.push(summary_line(Direction::Upload, summary));
        }
    }

    lines
}

fn server_lines(server: &ServerResults, binary: bool) -> Vec<String> {
    let mut lines = Vec::new();

    let address = server.ip.as_deref().unwrap_or(&server.name);
    let place = [server.city.as_str(), server.country.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ");

    if place.is_empty() {
        lines.push(format!("{} {}", "Server:".bold().white(), address.bright_blue()));
    } else {
        lines.push(format!(
            "{} {} {}",
            "Server:".bold().white(),
            address.bright_blue(),
            format!("({})", place).bright_blue()
        ));
    }

    match server.latency_ms {
        Some(latency) => {
            lines.push(format!("{} {:.2} ms", "Ping:".bold().white(), latency))
        }
        None => lines.push(format!(
            "{} {}",
            "Ping:".bold().white(),
            "unavailable".dimmed()
        )),
    }

    if let Some(download) = &server.download {
        lines.push(throughput_line(Direction::Download, download, binary));
    }
    if let Some(upload) = &server.upload {
        lines.push(throughput_line(Direction::Upload, upload, binary));
    }

    lines
}

fn throughput_line(
    direction: Direction,
    results: &ThroughputResults,
    binary: bool,
) -> String {
    format!(
        "{} {} {}",
        label(direction, "speed:").bold().white(),
        format_rate(results.bits_per_second, binary)
            .color(speed_color(results.speed_mbps)),
        format!("({})", format_bytes(results.bytes, binary)).dimmed()
    )
}

fn summary_line(direction: Direction, summary: &SpeedSummary) -> String {
    format!(
        "{} {} {}",
        label(direction, "average:").bold().white(),
        format!(
            "{:.2} Mbps ± {:.2}",
            summary.mean_mbps, summary.std_dev_mbps
        )
        .color(speed_color(summary.mean_mbps)),
        format!("over {} servers", summary.samples).dimmed()
    )
}

fn label(direction: Direction, suffix: &str) -> String {
    match direction {
        Direction::Download => format!("Download {}", suffix),
        Direction::Upload => format!("Upload {}", suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    fn server(name: &str, mbps: Option<f64>) -> ServerResults {
        ServerResults {
            name: name.to_string(),
            url: format!("https://{}/speedtest", name),
            city: "Lisbon".to_string(),
            country: "PT".to_string(),
            ip: Some("192.0.2.1".to_string()),
            latency_ms: Some(8.25),
            download: mbps.map(|speed_mbps| ThroughputResults {
                bytes: 1_000_000,
                duration_secs: 15.0,
                bits_per_second: speed_mbps * 1_000_000.0,
                speed_mbps,
            }),
            upload: None,
        }
    }

    #[test]
    fn test_speed_color_thresholds() {
        assert_eq!(speed_color(150.0), Color::Green);
        assert_eq!(speed_color(100.0), Color::Green);
        assert_eq!(speed_color(50.0), Color::Yellow);
        assert_eq!(speed_color(25.0), Color::Yellow);
        assert_eq!(speed_color(10.0), Color::Red);
    }

    #[test]
    fn test_status_lines() {
        assert_eq!(
            status_line(&ProgressEvent::PhaseChange(TestPhase::Latency), false)
                .as_deref(),
            Some("Running the latency test...")
        );

        let event = ProgressEvent::Throughput {
            direction: Direction::Download,
            bytes: 1_250_000,
            elapsed: Duration::from_secs(1),
        };
        assert_eq!(
            status_line(&event, false).as_deref(),
            Some("Running the download test (10.00 Mbps)")
        );

        let done = ProgressEvent::PhaseComplete(TestPhase::Throughput(
            Direction::Upload,
        ));
        assert!(status_line(&done, false).is_none());
    }

    #[test]
    fn test_status_line_before_any_time_passed() {
        let event = ProgressEvent::Throughput {
            direction: Direction::Upload,
            bytes: 0,
            elapsed: Duration::ZERO,
        };

        assert_eq!(
            status_line(&event, true).as_deref(),
            Some("Running the upload test (0.00 bit/s)")
        );
    }

    #[test]
    fn test_report_single_server() {
        let results = SpeedTestResults {
            timestamp: Utc::now(),
            client: None,
            servers: vec![server("a.example.net", Some(42.0))],
            download: SpeedSummary::from_speeds(&[42.0]),
            upload: None,
        };

        let report = report_lines(&results, false).join("\n");

        assert!(report.contains("192.0.2.1"));
        assert!(report.contains("(Lisbon, PT)"));
        assert!(report.contains("8.25 ms"));
        assert!(report.contains("42.00 Mbps"));
        assert!(report.contains("(1.00 MB)"));
        assert!(!report.contains("average"));
    }

    #[test]
    fn test_report_summarizes_multiple_servers() {
        let mut slow = server("b.example.net", Some(20.0));
        slow.latency_ms = None;

        let results = SpeedTestResults {
            timestamp: Utc::now(),
            client: None,
            servers: vec![server("a.example.net", Some(40.0)), slow],
            download: SpeedSummary::from_speeds(&[40.0, 20.0]),
            upload: None,
        };

        let report = report_lines(&results, false).join("\n");

        assert!(report.contains("unavailable"));
        assert!(report.contains("Download average:"));
        assert!(report.contains("30.00 Mbps ± 10.00"));
        assert!(report.contains("over 2 servers"));
        assert!(!report.contains("Upload average:"));
    }
}
