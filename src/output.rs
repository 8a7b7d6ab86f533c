//! Terminal output helpers
//!
//! Color handling follows the NO_COLOR standard (https://no-color.org/) and
//! the CLICOLOR conventions:
//! - `NO_COLOR`: if set (to any value), disable colors
//! - `CLICOLOR_FORCE`: if set to non-zero, force colors even when not a TTY
//! - `CLICOLOR`: if set to 0, disable colors
//!
//! Otherwise colors and spinners are shown only when stdout is a terminal.

use colored::control;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdout())
}

/// Configure color output for the whole program. Call early in main().
pub fn init_colors() {
    control::set_override(colors_enabled(|key| std::env::var(key).ok(), is_tty()));
}

fn colors_enabled(lookup: impl Fn(&str) -> Option<String>, is_tty: bool) -> bool {
    // NO_COLOR takes precedence over everything
    if lookup("NO_COLOR").is_some() {
        return false;
    }
    if lookup("CLICOLOR_FORCE").is_some_and(|v| v != "0") {
        return true;
    }
    if lookup("CLICOLOR").is_some_and(|v| v == "0") {
        return false;
    }
    is_tty
}

/// A steadily ticking spinner, or a hidden one when `visible` is false.
pub fn spinner(message: impl Into<String>, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Tree branch for the `index`th of `len` children.
pub fn branch(index: usize, len: usize) -> &'static str {
    if index + 1 == len { "└─" } else { "├─" }
}
