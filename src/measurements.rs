//! Bandwidth arithmetic and human readable unit formatting.

use std::time::Duration;

const DECIMAL_RATE_UNITS: [&str; 4] = ["bps", "Kbps", "Mbps", "Gbps"];
const BINARY_RATE_UNITS: [&str; 4] = ["bit/s", "Kibit/s", "Mibit/s", "Gibit/s"];
const DECIMAL_BYTE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
const BINARY_BYTE_UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

/// Bits per second for `bytes` moved in `elapsed_secs`.
///
/// The caller guarantees `elapsed_secs > 0`.
pub fn bits_per_second(bytes: u64, elapsed_secs: f64) -> f64 {
    (bytes as f64 * 8.0) / elapsed_secs
}

/// Current rate for `bytes` moved since a test started `elapsed` ago.
///
/// Returns 0 before any time has passed.
pub fn current_rate(bytes: u64, elapsed: Duration) -> f64 {
    if elapsed.is_zero() {
        return 0.0;
    }

    bits_per_second(bytes, elapsed.as_secs_f64())
}

/// Format a bit rate, e.g. `1.00 Mbps` or `1.00 Mibit/s`.
pub fn format_rate(bits_per_second: f64, binary: bool) -> String {
    let units =
        if binary { &BINARY_RATE_UNITS } else { &DECIMAL_RATE_UNITS };

    scale(bits_per_second, binary, units)
}

/// Format a byte count, e.g. `1.00 KB` or `1.00 KiB`.
pub fn format_bytes(bytes: u64, binary: bool) -> String {
    let units =
        if binary { &BINARY_BYTE_UNITS } else { &DECIMAL_BYTE_UNITS };

    scale(bytes as f64, binary, units)
}

fn scale(mut value: f64, binary: bool, units: &[&str]) -> String {
    let factor = if binary { 1024.0 } else { 1000.0 };
    let mut unit = 0;

    while value >= factor && unit < units.len() - 1 {
        value /= factor;
        unit += 1;
    }

    format!("{:.2} {}", value, units[unit])
}
