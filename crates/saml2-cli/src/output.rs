//! Output formatting utilities.

use std::path::Path;

use colored::Colorize;

/// Prints a success message.
pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// Writes a document to `path`, or to stdout.
pub fn document(xml: &str, path: Option<&Path>) -> crate::CliResult<()> {
    match path {
        Some(path) => {
            std::fs::write(path, xml)?;
            success(&format!("Wrote {}", path.display()));
        }
        None => println!("{xml}"),
    }
    Ok(())
}
