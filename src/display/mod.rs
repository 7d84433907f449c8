//! Console output for fast-speed.
//!
//! Live status lines while tests run, plus the final report in plain
//! text or JSON.

pub mod console;
pub mod display_mode;
pub mod progress;

pub use console::{print_report, ConsoleProgress};
pub use display_mode::DisplayMode;
pub use progress::{ProgressCallback, ProgressEvent, TestPhase};
