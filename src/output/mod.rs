//! Output mode handling for CLI commands.
//!
//! Decides once per invocation whether stdout gets JSON, colored text,
//! plain text, or nothing, so commands never check flags themselves.

use crate::error::Result;
use serde::Serialize;
use std::io::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human text with ANSI color
    Rich,
    /// Plain text, no ANSI codes (for piping)
    Plain,
    /// JSON output only
    Json,
    /// Minimal output (quiet mode)
    Quiet,
}

/// Central output coordinator that respects json/quiet/color flags.
#[derive(Debug, Clone, Copy)]
pub struct OutputContext {
    mode: OutputMode,
    width: usize,
}

impl OutputContext {
    /// Create from CLI-style flags.
    #[must_use]
    pub fn from_flags(json: bool, quiet: bool, no_color: bool) -> Self {
        let mode = if json {
            OutputMode::Json
        } else if quiet {
            OutputMode::Quiet
        } else if no_color || std::env::var("NO_COLOR").is_ok() || !std::io::stdout().is_terminal()
        {
            OutputMode::Plain
        } else {
            OutputMode::Rich
        };

        Self {
            mode,
            width: crate::format::terminal_width(),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> OutputMode {
        self.mode
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.mode == OutputMode::Quiet
    }

    #[must_use]
    pub fn use_color(&self) -> bool {
        self.mode == OutputMode::Rich
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Pretty-print a value as JSON on stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Print a line of human output unless quiet.
    pub fn println(&self, text: &str) {
        if !self.is_quiet() {
            println!("{text}");
        }
    }
}
