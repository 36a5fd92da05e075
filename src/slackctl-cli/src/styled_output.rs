//! Styled status messages on stderr.
//!
//! Command results (timestamps, app IDs) go to stdout unstyled so they can
//! be piped. Everything else goes through here and respects `NO_COLOR`.
//!
//! # Examples
//!
//! ```
//! use slackctl_cli::styled_output::{print_info, print_success};
//!
//! print_info("Posting message...");
//! print_success("Message posted successfully!");
//! ```

use std::io::{IsTerminal, Write};

/// Check if colors should be disabled based on NO_COLOR env var.
fn colors_disabled() -> bool {
    std::env::var("NO_COLOR")
        .map(|v| !v.is_empty() && v != "0" && v.to_lowercase() != "false")
        .unwrap_or(false)
}

const SUCCESS: &str = "\x1b[38;2;0;245;212m";
const ERROR: &str = "\x1b[38;2;255;107;107m";
const WARNING: &str = "\x1b[38;2;255;200;87m";
const INFO: &str = "\x1b[38;2;72;202;228m";
const DIM: &str = "\x1b[38;2;130;154;177m";
const RESET: &str = "\x1b[0m";

/// Message type for styled output.
#[derive(Debug, Clone, Copy)]
pub enum MessageType {
    Success,
    Error,
    Warning,
    Info,
    /// Secondary information.
    Dim,
}

impl MessageType {
    fn icon(&self) -> &'static str {
        match self {
            MessageType::Success => "[OK]",
            MessageType::Error => "[ERROR]",
            MessageType::Warning => "[WARN]",
            MessageType::Info => "[INFO]",
            MessageType::Dim => "-",
        }
    }

    fn color(&self) -> &'static str {
        match self {
            MessageType::Success => SUCCESS,
            MessageType::Error => ERROR,
            MessageType::Warning => WARNING,
            MessageType::Info => INFO,
            MessageType::Dim => DIM,
        }
    }
}

/// Render a message, with color when `colored` is set.
pub fn format_styled(msg_type: MessageType, message: &str, colored: bool) -> String {
    if colored {
        format!("{}{} {}{}", msg_type.color(), msg_type.icon(), message, RESET)
    } else {
        format!("{} {}", msg_type.icon(), message)
    }
}

/// Print a styled message to stderr.
pub fn print_styled(msg_type: MessageType, message: &str) {
    let colored = !colors_disabled() && std::io::stderr().is_terminal();
    let _ = writeln!(
        std::io::stderr(),
        "{}",
        format_styled(msg_type, message, colored)
    );
}

/// Print a success message to stderr.
pub fn print_success(message: &str) {
    print_styled(MessageType::Success, message);
}

/// Print an error message to stderr.
pub fn print_error(message: &str) {
    print_styled(MessageType::Error, message);
}

/// Print a warning message to stderr.
pub fn print_warning(message: &str) {
    print_styled(MessageType::Warning, message);
}

/// Print an info message to stderr.
pub fn print_info(message: &str) {
    print_styled(MessageType::Info, message);
}

/// Print a dimmed message to stderr.
pub fn print_dim(message: &str) {
    print_styled(MessageType::Dim, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_plain() {
        assert_eq!(
            format_styled(MessageType::Success, "done", false),
            "[OK] done"
        );
        assert_eq!(format_styled(MessageType::Dim, "note", false), "- note");
    }

    #[test]
    fn test_format_colored() {
        let text = format_styled(MessageType::Error, "boom", true);
        assert!(text.starts_with(ERROR));
        assert!(text.ends_with(RESET));
        assert!(text.contains("[ERROR] boom"));
    }
}
