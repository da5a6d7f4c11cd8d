//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::infrastructure::traits::Reporter;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print informational note (cyan)
pub fn note(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan());
}

/// Print plain output (no color, for data such as JSON bodies)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// `Reporter` backed by the functions above.
#[derive(Debug, Default)]
pub struct TerminalReporter;

impl Reporter for TerminalReporter {
    fn info(&self, msg: &str) {
        note(msg);
    }

    fn success(&self, msg: &str) {
        success(msg);
    }

    fn warning(&self, msg: &str) {
        warning(msg);
    }

    fn error(&self, msg: &str) {
        error(msg);
    }

    fn data(&self, text: &str) {
        info(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_terminal_reporter_when_reporting_every_kind_then_writes_without_error() {
        colored::control::set_override(false);
        let reporter: &dyn Reporter = &TerminalReporter;

        reporter.info("no flags found");
        reporter.success("Flag f1 created");
        reporter.warning("could not open a browser");
        reporter.error("invalid token");
        reporter.data("{\"key\": \"f1\"}");
        note("plain note");
    }
}
