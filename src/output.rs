//! # Output Configuration
//!
//! This module controls how the CLI presents progress and results: colours,
//! emoji, and the spinner shown while a repository is provisioned.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! Without colours, emoji are replaced by bracketed words and the spinner is
//! hidden, so piped output stays plain text.

use std::env;
use std::time::Duration;

use clap::ValueEnum;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Value of the `--color` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// In auto mode, colors are disabled if `NO_COLOR` is set, `CLICOLOR=0`,
    /// `TERM=dumb`, or stdout is not a TTY (unless `CLICOLOR_FORCE=1`).
    pub fn new(choice: ColorChoice) -> Self {
        let use_color = match choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => Self::detect_color_support(),
        };
        console::set_colors_enabled(use_color);
        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    /// `message` prefixed with a success marker.
    pub fn success(&self, message: &str) -> String {
        format!("{} {}", emoji(self, "✅", "[OK]"), self.paint_green(message))
    }

    /// `message` prefixed with a failure marker.
    pub fn failure(&self, message: &str) -> String {
        format!("{} {}", emoji(self, "❌", "[FAILED]"), self.paint_red(message))
    }

    /// `message` prefixed with a warning marker.
    pub fn warning(&self, message: &str) -> String {
        format!("{} {}", emoji(self, "⚠️ ", "[WARN]"), message)
    }

    /// A `label: value` line for summaries.
    pub fn field(&self, label: &str, value: impl std::fmt::Display) -> String {
        if self.use_color {
            format!("  {} {}", style(format!("{}:", label)).bold(), value)
        } else {
            format!("  {}: {}", label, value)
        }
    }

    /// Spinner shown while a long remote operation runs. Hidden without
    /// colours.
    pub fn spinner(&self, message: impl Into<String>) -> ProgressBar {
        if !self.use_color {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.into());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    fn paint_green(&self, message: &str) -> String {
        if self.use_color {
            style(message).green().to_string()
        } else {
            message.to_string()
        }
    }

    fn paint_red(&self, message: &str) -> String {
        if self.use_color {
            style(message).red().to_string()
        } else {
            message.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::new(ColorChoice::Auto)
    }
}

/// Returns the emoji when colors are enabled, the plain text otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}
