//! Custom error types for the speed test application.
//!
//! Every fallible operation in the crate reports a [`SpeedTestError`].
//! The [`ErrorKind`] decides the process exit code and whether a
//! suggestion is shown to the user.

use std::error::Error;
use std::fmt;

/// Exit codes for the application.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Network error (connection failed, timeout, probe failed).
    pub const NETWORK_ERROR: i32 = 1;
    /// API error (token rejected, no servers returned).
    pub const API_ERROR: i32 = 2;
    /// Configuration error (invalid arguments).
    pub const CONFIG_ERROR: i32 = 3;
    /// Interrupted by the user.
    pub const INTERRUPTED: i32 = 130;
    /// Unknown/unexpected error.
    pub const UNKNOWN_ERROR: i32 = 99;
}

/// Categories of errors that can occur during speed testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-supplied configuration outside the allowed bounds.
    Validation,
    /// The upstream API rejected the access token, or none could be found.
    Token,
    /// Ranking was invoked without any candidate servers.
    NoCandidates,
    /// A round-trip time measurement failed.
    Probe,
    /// Network connectivity issues.
    Network,
    /// DNS resolution failures.
    Dns,
    /// Connection timeout.
    Timeout,
    /// TLS/SSL handshake failures.
    Tls,
    /// API returned an error response.
    Api,
    /// Unknown or unexpected errors.
    Unknown,
}

impl ErrorKind {
    /// Get the exit code for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::Validation => exit_codes::CONFIG_ERROR,
            ErrorKind::Token => exit_codes::API_ERROR,
            ErrorKind::NoCandidates => exit_codes::API_ERROR,
            ErrorKind::Probe => exit_codes::NETWORK_ERROR,
            ErrorKind::Network => exit_codes::NETWORK_ERROR,
            ErrorKind::Dns => exit_codes::NETWORK_ERROR,
            ErrorKind::Timeout => exit_codes::NETWORK_ERROR,
            ErrorKind::Tls => exit_codes::NETWORK_ERROR,
            ErrorKind::Api => exit_codes::API_ERROR,
            ErrorKind::Unknown => exit_codes::UNKNOWN_ERROR,
        }
    }

    /// Get a user-friendly description of this error kind.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "Invalid configuration",
            ErrorKind::Token => "Access token error",
            ErrorKind::NoCandidates => "No test servers",
            ErrorKind::Probe => "Latency probe failed",
            ErrorKind::Network => "Network error",
            ErrorKind::Dns => "DNS resolution error",
            ErrorKind::Timeout => "Connection timeout",
            ErrorKind::Tls => "TLS/SSL error",
            ErrorKind::Api => "API error",
            ErrorKind::Unknown => "Unknown error",
        }
    }
}

/// A user-friendly error type for speed test operations.
#[derive(Debug)]
pub struct SpeedTestError {
    /// The kind of error.
    pub kind: ErrorKind,
    /// User-friendly error message.
    pub message: String,
    /// Optional suggestion for how to resolve the error.
    pub suggestion: Option<String>,
    /// The underlying error, if any.
    pub source: Option<Box<dyn Error + Send + Sync>>,
}

impl SpeedTestError {
    /// Create a new SpeedTestError.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), suggestion: None, source: None }
    }

    /// Add a suggestion for how to resolve the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add the underlying error source.
    pub fn with_source(
        mut self,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a token error.
    pub fn token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Token, message).with_suggestion(
            "Omit --token to fetch a fresh token from fast.com.",
        )
    }

    /// Create an error for an empty candidate list.
    pub fn no_candidates() -> Self {
        Self::new(ErrorKind::NoCandidates, "no candidate servers to rank")
            .with_suggestion("The server list was empty. Try again later.")
    }

    /// Create a probe error.
    pub fn probe(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Probe, message)
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
            .with_suggestion("Check your internet connection and try again.")
    }

    /// Create a DNS error.
    pub fn dns(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Dns, message).with_suggestion(
            "Check your DNS settings or try using a different DNS server.",
        )
    }

    /// Create an API error.
    pub fn api(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Api, message).with_suggestion(
            "The fast.com API may be experiencing issues. Try again later.",
        )
    }
}

impl fmt::Display for SpeedTestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.description(), self.message)?;

        if let Some(ref suggestion) = self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }

        Ok(())
    }
}

impl Error for SpeedTestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

/// Classify an error into an ErrorKind based on its message.
pub fn classify_error(error: &dyn Error) -> ErrorKind {
    let error_str = error_chain(error).to_lowercase();

    if error_str.contains("dns")
        || error_str.contains("resolve")
        || error_str.contains("no such host")
    {
        return ErrorKind::Dns;
    }

    if error_str.contains("timeout")
        || error_str.contains("timed out")
        || error_str.contains("deadline")
    {
        return ErrorKind::Timeout;
    }

    if error_str.contains("tls")
        || error_str.contains("ssl")
        || error_str.contains("certificate")
        || error_str.contains("handshake")
    {
        return ErrorKind::Tls;
    }

    if error_str.contains("connection refused")
        || error_str.contains("connection reset")
        || error_str.contains("network unreachable")
        || error_str.contains("host unreachable")
        || error_str.contains("no route")
        || error_str.contains("broken pipe")
        || error_str.contains("error sending request")
    {
        return ErrorKind::Network;
    }

    if error_str.contains("status: 4")
        || error_str.contains("status: 5")
        || error_str.contains("status client error")
        || error_str.contains("status server error")
        || error_str.contains("decoding")
    {
        return ErrorKind::Api;
    }

    ErrorKind::Unknown
}

/// Join an error and all of its sources into one line.
///
/// reqwest keeps the interesting part ("connection refused") in the
/// source chain, so classification has to look past the top level.
fn error_chain(error: &dyn Error) -> String {
    let mut out = error.to_string();
    let mut source = error.source();

    while let Some(inner) = source {
        out.push_str(": ");
        out.push_str(&inner.to_string());
        source = inner.source();
    }

    out
}

/// Convert a generic error into a SpeedTestError with appropriate classification.
pub fn to_speed_test_error(
    error: Box<dyn Error + Send + Sync>,
    context: &str,
) -> SpeedTestError {
    let kind = classify_error(error.as_ref());
    let message = format!("{}: {}", context, error);

    let mut speed_error = SpeedTestError::new(kind, message);
    speed_error.source = Some(error);

    speed_error = match kind {
        ErrorKind::Network => speed_error
            .with_suggestion("Check your internet connection and try again."),
        ErrorKind::Dns => speed_error.with_suggestion(
            "Check your DNS settings or try using a different DNS server.",
        ),
        ErrorKind::Timeout => speed_error.with_suggestion(
            "The server may be slow or unreachable. Try again later.",
        ),
        ErrorKind::Tls => speed_error.with_suggestion(
            "There may be a certificate issue. Check your system time.",
        ),
        ErrorKind::Api => speed_error.with_suggestion(
            "The fast.com API may be experiencing issues. Try again later.",
        ),
        _ => speed_error,
    };

    speed_error
}

/// Format an error for user display.
pub fn format_error_for_display(error: &SpeedTestError) -> String {
    let mut output =
        format!("Error: {}: {}", error.kind.description(), error.message);

    if let Some(ref suggestion) = error.suggestion {
        output.push_str(&format!("\n\nSuggestion: {}", suggestion));
    }

    output
}
