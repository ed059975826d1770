//! Command-line validation errors

use std::path::PathBuf;

use thiserror::Error;

/// Failures detected before the listener is bound; both exit the process
/// with code 1.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("directory '{}' not found", .0.display())]
    InvalidDirectory(PathBuf),

    #[error("port must be a number between 1 and 65535, got '{0}'")]
    InvalidPort(String),
}
