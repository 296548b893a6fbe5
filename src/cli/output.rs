//! Output formatting
//!
//! This module provides utilities for displaying status lines, errors, and
//! machine-readable output to the user. The configuration from the global
//! CLI flags is applied once at startup.

use std::sync::OnceLock;

/// Global output configuration from CLI flags
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Suppress all output except errors
    pub quiet: bool,
    /// Emit machine-readable JSON where supported
    pub json: bool,
    /// Verbosity level (-v for info, -vv for debug)
    pub verbose: u8,
}

static GLOBAL: OnceLock<OutputConfig> = OnceLock::new();

impl OutputConfig {
    /// Create a new output configuration
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Install this configuration process-wide
    ///
    /// Later calls are ignored; the first configuration wins.
    pub fn apply_global(self) {
        let _ = GLOBAL.set(self);
    }

    /// The installed configuration, or defaults if none was applied
    pub fn global() -> Self {
        GLOBAL.get().copied().unwrap_or_default()
    }
}

/// Whether JSON output was requested
pub fn is_json() -> bool {
    OutputConfig::global().json
}

/// Print a status line unless quiet or JSON mode is active
pub fn status_message(message: &str) {
    let config = OutputConfig::global();
    if !config.quiet && !config.json {
        println!("{message}");
    }
}

/// Print a status line only at raised verbosity
pub fn verbose_message(message: &str) {
    let config = OutputConfig::global();
    if !config.quiet && !config.json && config.verbose > 0 {
        println!("{message}");
    }
}

/// Print an error line; shown even in quiet mode
pub fn error_line(message: &str) {
    eprintln!("{} {message}", status::ERROR);
}

/// Display a fatal error and its cause chain
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} Error: {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}
