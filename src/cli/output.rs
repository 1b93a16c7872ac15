//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the Sift CLI.

use crate::research::{ItemStatus, RequestStatus};
use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the Sift banner
    pub fn banner(&self) {
        let title = "Research Source Orchestration Server";
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n   {} {}\n   {} {}\n",
                "┌─┐┬┌─┐┌┬┐".bright_cyan().bold(),
                title.bright_white().bold(),
                "└─┐│├┤  │ ".cyan().bold(),
                version.dimmed()
            );
        } else {
            println!("\n   SIFT {}\n   {}\n", title, version);
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a step message (for multi-step operations)
    pub fn step(&self, step_num: u32, total: u32, message: &str) {
        if self.colored {
            println!(
                "  {} {}",
                format!("[{}/{}]", step_num, total).dimmed(),
                message.bright_white()
            );
        } else {
            println!("  [{}/{}] {}", step_num, total, message);
        }
    }

    /// Print a file creation message
    pub fn created(&self, file_type: &str, path: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "✓".green().bold(),
                file_type.dimmed(),
                path.bright_white()
            );
        } else {
            println!("  [CREATED] {} {}", file_type, path);
        }
    }

    /// Print a file skipped message
    pub fn skipped(&self, path: &str, reason: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "○".yellow(),
                path.dimmed(),
                format!("({})", reason).yellow()
            );
        } else {
            println!("  [SKIPPED] {} ({})", path, reason);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print a command suggestion
    pub fn command(&self, cmd: &str) {
        if self.colored {
            println!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            println!("     $ {}", cmd);
        }
    }

    /// Print completion message with next steps
    pub fn complete(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "🚀".green(), message.bright_green().bold());
        } else {
            println!("\n  [DONE] {}", message);
        }
    }

    /// Print one source of a research result: status, category, title and url
    pub fn source_row(&self, status: ItemStatus, category: &str, title: &str, url: &str) {
        let label = fit(status_label(status), 10);
        let category = fit(category, 10);
        let title = fit(title, 48);

        if self.colored {
            let label = match status {
                ItemStatus::Success => label.green().to_string(),
                ItemStatus::Failed => label.red().to_string(),
                ItemStatus::NoContent => label.yellow().to_string(),
                ItemStatus::Pending | ItemStatus::Loading => label.dimmed().to_string(),
            };
            println!("    {} {} {} {}", label, category.cyan(), title, url.dimmed());
        } else {
            println!("    {} {} {} {}", label, category, title, url);
        }
    }

    /// Print the final status line of a research request
    pub fn request_summary(&self, status: RequestStatus, progress: f64, detail: &str) {
        let line = format!(
            "{} ({:.0}%) {}",
            request_label(status),
            progress * 100.0,
            detail
        );
        match status {
            RequestStatus::Completed => self.success(&line),
            RequestStatus::Running => self.info(&line),
            RequestStatus::Failed => self.error(&line),
        }
    }
}

fn status_label(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::Pending => "pending",
        ItemStatus::Loading => "loading",
        ItemStatus::Success => "success",
        ItemStatus::Failed => "failed",
        ItemStatus::NoContent => "no content",
    }
}

fn request_label(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::Running => "running",
        RequestStatus::Completed => "completed",
        RequestStatus::Failed => "failed",
    }
}

/// Pad or cut `text` to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    } else {
        format!("{}{}", text, " ".repeat(width - count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_no_color() {
        assert!(Output::new().colored);
        assert!(!Output::no_color().colored);
        assert!(Output::default().colored);
    }

    #[test]
    fn test_fit_pads_and_cuts() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("Süddeutsche", 11), "Süddeutsche");
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_label(ItemStatus::NoContent), "no content");
        assert_eq!(request_label(RequestStatus::Completed), "completed");
    }

    #[test]
    fn test_output_methods_no_panic() {
        for output in [Output::no_color(), Output::new()] {
            output.banner();
            output.success("test success");
            output.info("test info");
            output.warning("test warning");
            output.error("test error");
            output.step(1, 2, "step message");
            output.created("file", "path/to/file");
            output.skipped("path", "reason");
            output.header("Test Header");
            output.kv("key", "value");
            output.hint("hint message");
            output.command("some command");
            output.complete("complete message");
            output.source_row(ItemStatus::Failed, "news", "A long title", "https://x");
            output.request_summary(RequestStatus::Completed, 1.0, "3 sources");
        }
    }
}
