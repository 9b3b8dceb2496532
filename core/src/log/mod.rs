//! Human-facing progress output.
//!
//! This is deliberately separate from `tracing` diagnostics: the scripting
//! front-end replaces the sink to route echoed command lines and warnings
//! wherever it wants them.

use colored::Colorize;

/// Color requested for a progress line. `None` prints plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorHint {
    None,
    Black,
    Blue,
    Cyan,
    Green,
    Magenta,
    Red,
    White,
    Yellow,
}

impl ColorHint {
    /// Map a color name coming from the scripting layer. Unknown names fall
    /// back to plain text.
    pub fn from_name(name: &str) -> Self {
        match name {
            "black" => Self::Black,
            "blue" => Self::Blue,
            "cyan" => Self::Cyan,
            "green" => Self::Green,
            "magenta" => Self::Magenta,
            "red" => Self::Red,
            "white" => Self::White,
            "yellow" => Self::Yellow,
            _ => Self::None,
        }
    }
}

/// Replaceable collaborator for progress lines (echoed command lines,
/// ignored-failure warnings).
pub trait LogSink: Send + Sync {
    fn log(&self, message: &str, color: ColorHint);
}

/// Writes progress lines to stderr, colored only when stderr is a terminal.
pub struct StderrLog {
    tty: bool,
}

impl StderrLog {
    pub fn new() -> Self {
        Self {
            tty: atty::is(atty::Stream::Stderr),
        }
    }
}

impl Default for StderrLog {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for StderrLog {
    fn log(&self, message: &str, color: ColorHint) {
        if !self.tty || color == ColorHint::None {
            eprintln!("{message}");
            return;
        }
        let painted = match color {
            ColorHint::Black => message.black(),
            ColorHint::Blue => message.blue(),
            ColorHint::Cyan => message.cyan(),
            ColorHint::Green => message.green(),
            ColorHint::Magenta => message.magenta(),
            ColorHint::Red => message.red(),
            ColorHint::White => message.white(),
            ColorHint::Yellow => message.yellow(),
            ColorHint::None => unreachable!(),
        };
        eprintln!("{painted}");
    }
}

/// Discards everything. Used in tests.
pub struct NullLog;

impl LogSink for NullLog {
    fn log(&self, _message: &str, _color: ColorHint) {}
}
