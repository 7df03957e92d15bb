//! Command implementations.

pub mod decrypt;
pub mod issue;
pub mod verify;

pub use decrypt::run_decrypt;
pub use issue::run_issue;
pub use verify::run_verify;

use std::path::Path;

/// Reads a document argument.
fn read_document(path: &Path) -> crate::CliResult<String> {
    let xml = std::fs::read_to_string(path)?;
    if xml.trim().is_empty() {
        return Err(crate::CliError::InvalidArgument(format!(
            "{} is empty",
            path.display()
        )));
    }
    Ok(xml)
}
