//! CLI argument parsing and command dispatch.
//!
//! # Module Structure
//!
//! - `args` - Command-line argument structures
//! - `styles` - ANSI styling for help output
//! - `handlers` - Command dispatch

pub mod args;
pub mod handlers;
pub mod styles;

// Re-export main types
pub use args::{Cli, Commands, LogLevel};
pub use handlers::dispatch_command;
pub use styles::{AFTER_HELP, get_styles};
