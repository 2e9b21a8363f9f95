//! Command handlers for the rebind CLI.
//!
//! Handlers return their output instead of printing it. Shared helpers such
//! as [`read_file`] live in the module root.

use std::path::{Path, PathBuf};

use rebind_config::ConfigError;
use rebind_rewrite::RewriteError;

mod lex;
mod rewrite;

pub use lex::lex_source;
pub use rewrite::{rewrite_file, RewriteOptions, RewriteOutcome};

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{}", read_message(.path, .source))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

fn read_message(path: &Path, error: &std::io::Error) -> String {
    let path = path.display();
    match error.kind() {
        std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
        std::io::ErrorKind::PermissionDenied => format!("permission denied reading '{path}'"),
        std::io::ErrorKind::InvalidData => format!("'{path}' contains invalid UTF-8 data"),
        _ => format!("error reading '{path}': {error}"),
    }
}

pub fn read_file(path: &Path) -> Result<String, CommandError> {
    std::fs::read_to_string(path).map_err(|source| CommandError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// `path` made absolute against the working directory and normalized, so
/// it can be compared with the filter paths of a loaded config.
pub(crate) fn absolute(path: &Path) -> PathBuf {
    let joined = match std::env::current_dir() {
        Ok(cwd) if path.is_relative() => cwd.join(path),
        _ => path.to_path_buf(),
    };
    rebind_config::normalize(&joined)
}
