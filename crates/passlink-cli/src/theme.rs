//! Terminal styling for command output.

use colored::Colorize;

/// Output styles shared by all commands.
pub(crate) struct Theme;

impl Theme {
    /// Section title.
    pub(crate) fn header(text: &str) -> String {
        text.bold().cyan().to_string()
    }

    /// Completed action.
    pub(crate) fn success(text: &str) -> String {
        format!("{} {text}", "ok".green().bold())
    }

    /// Fatal error, printed to stderr by `main`.
    pub(crate) fn error(text: &str) -> String {
        format!("{} {}", "error:".red().bold(), text)
    }

    /// Indented `label: value` line with the label dimmed.
    pub(crate) fn field(label: &str, value: &str) -> String {
        let label = format!("{:<14}", format!("{label}:"));
        format!("  {}{value}", label.dimmed())
    }
}
