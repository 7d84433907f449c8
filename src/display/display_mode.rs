//! Display mode detection.
//!
//! Determines whether to show live progress, stay silent until the
//! final report, or print JSON, based on CLI flags and whether stderr is
//! a terminal.

/// The display mode for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Live status lines on stderr, then the report
    Progress,
    /// Silent mode - no output until the report
    Silent,
    /// JSON mode - structured output only
    Json,
}

impl DisplayMode {
    /// Determine display mode from CLI flags and environment.
    ///
    /// * `Json` when json_flag is true (regardless of is_tty)
    /// * `Progress` when json_flag is false AND is_tty is true
    /// * `Silent` when json_flag is false AND is_tty is false
    pub fn detect(json_flag: bool, is_tty: bool) -> Self {
        if json_flag {
            DisplayMode::Json
        } else if is_tty {
            DisplayMode::Progress
        } else {
            DisplayMode::Silent
        }
    }
}
