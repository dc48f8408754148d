//! Terminal output for `shop` commands.
//!
//! Rendered listing documents go to stdout untouched so they can be piped
//! into a file or `jq`. Report lines are styled; status lines go to stderr.

use console::{style, StyledObject};

/// Width of the key column in key/value reports.
const KEY_WIDTH: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Success,
    Warn,
    Error,
    Debug,
}

impl Status {
    fn marker(self) -> StyledObject<&'static str> {
        match self {
            Status::Success => style("✓").green(),
            Status::Warn => style("⚠").yellow(),
            Status::Error => style("✗").red(),
            Status::Debug => style("→").dim(),
        }
    }
}

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    fn status(&self, status: Status, msg: &str) {
        match status {
            Status::Error if self.json => eprintln!("{}", serde_json::json!({ "error": msg })),
            _ if self.json => {}
            Status::Debug if !self.verbose => {}
            Status::Success => println!("{} {}", status.marker(), msg),
            Status::Error => eprintln!("{} {}", status.marker(), style(msg).red()),
            Status::Debug => eprintln!("{} {}", status.marker(), style(msg).dim()),
            Status::Warn => eprintln!("{} {}", status.marker(), msg),
        }
    }

    pub fn success(&self, msg: &str) {
        self.status(Status::Success, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.status(Status::Warn, msg);
    }

    /// Print an error; in JSON mode as `{"error": ...}` on stderr.
    pub fn error(&self, msg: &str) {
        self.status(Status::Error, msg);
    }

    /// Print a debug line (only with `--verbose`).
    pub fn debug(&self, msg: &str) {
        self.status(Status::Debug, msg);
    }

    /// Heading above a block of report lines.
    pub fn header(&self, title: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(title).bold().underlined());
    }

    /// `[name]` line opening a configuration section.
    pub fn section(&self, name: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(format!("[{}]", name)).cyan());
    }

    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {} {}", style(key_column(key)).dim(), value);
    }

    pub fn list_item(&self, item: &str) {
        if self.json {
            return;
        }
        println!("  {} {}", style("•").dim(), item);
    }

    /// Print a value as pretty JSON.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => self.error(&format!("Failed to serialize output: {}", e)),
        }
    }

    /// Write a rendered document or JSON block as-is.
    pub fn document(&self, body: &str) {
        println!("{}", body);
    }
}

/// Pad the key so values line up.
fn key_column(key: &str) -> String {
    format!("{:<width$}", format!("{}:", key), width = KEY_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_column_pads() {
        assert_eq!(key_column("url"), "url:        ");
        assert_eq!(key_column("context_path"), "context_path:");
    }
}
