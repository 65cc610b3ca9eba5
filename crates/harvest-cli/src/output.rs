//! Status lines for the CLI.
//!
//! Results go to stdout untouched; these helpers only decorate the
//! human-facing messages written to stderr.

use colored::*;

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Print a status line to stderr.
    pub fn status(&self, line: String) {
        eprintln!("{}", line);
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_messages() {
        let formatter = Formatter::new(false);
        assert_eq!(formatter.success("Saved"), "✓ Saved");
        assert_eq!(formatter.error("Failed"), "✗ Failed");
        assert_eq!(formatter.info("Fetching"), "ℹ Fetching");
        assert_eq!(formatter.warning("Empty"), "⚠ Empty");
    }

    #[test]
    fn test_colored_message_keeps_text() {
        colored::control::set_override(true);
        let line = Formatter::new(true).success("Saved");
        colored::control::unset_override();

        assert!(line.contains("✓ Saved"));
        assert_ne!(line, "✓ Saved");
    }
}
