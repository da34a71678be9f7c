use console::style;

use crate::types::{AttemptOutcome, ProviderAttempt};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Aligned `label: value` line
    pub fn field(&self, label: &str, value: &str) {
        println!("  {:<10} {}", style(format!("{}:", label)).dim(), value);
    }

    /// One line per provider attempt
    pub fn attempt(&self, attempt: &ProviderAttempt) {
        match &attempt.outcome {
            AttemptOutcome::Success(_) => println!(
                "  {} {} ({} ms)",
                style("✓").green(),
                attempt.provider_id,
                attempt.duration_ms
            ),
            AttemptOutcome::Failure(err) => println!(
                "  {} {} ({} ms) {}",
                style("✗").red(),
                attempt.provider_id,
                attempt.duration_ms,
                style(err).dim()
            ),
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
