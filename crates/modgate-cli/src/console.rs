//! CLI console utilities

use colored::*;
use modgate_core::Verdict;

/// Column width used by table rows
const COLUMN_WIDTH: usize = 32;

/// CLI console for formatted output
#[derive(Default)]
pub struct CliConsole;

impl CliConsole {
    pub const fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message.green());
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }

    /// Print a decision line colored by its verdict
    pub fn print_verdict(&self, verdict: Verdict, message: &str) {
        let line = match verdict {
            Verdict::Allowed => format!("{} {}", "✓".green().bold(), message.green()),
            Verdict::Denied => format!("{} {}", "✗".red().bold(), message.red()),
            Verdict::Unknown => format!("{} {}", "?".yellow().bold(), message.yellow()),
        };
        println!("{}", line);
    }

    pub fn print_header(&self, title: &str) {
        println!();
        println!("{}", title.bold().underline());
        println!("{}", "=".repeat(title.len()).dimmed());
    }

    pub fn print_table_row(&self, columns: &[&str]) {
        println!("{}", table_row(columns));
    }
}

fn table_row(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("{:<width$}", c, width = COLUMN_WIDTH))
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_row_pads_all_but_last() {
        let row = table_row(&["com.example.mod", "com.target.app"]);
        assert_eq!(row, format!("{:<32} com.target.app", "com.example.mod"));
        assert_eq!(table_row(&[]), "");
    }
}
