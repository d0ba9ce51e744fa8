//! Error types for include resolution and output handling

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort a flatten run
#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Circular include detected: {} ({})", .path.display(), format_chain(.chain))]
    CircularInclude {
        path: PathBuf,
        /// Resolution path from the root file to the repeated file
        chain: Vec<PathBuf>,
    },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl FlattenError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| p.display().to_string())
        })
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_include_message_shows_chain() {
        let err = FlattenError::CircularInclude {
            path: PathBuf::from("/site/a.html"),
            chain: vec![
                PathBuf::from("/site/a.html"),
                PathBuf::from("/site/b.html"),
                PathBuf::from("/site/a.html"),
            ],
        };

        let msg = err.to_string();
        assert!(msg.contains("/site/a.html"));
        assert!(msg.contains("a.html -> b.html -> a.html"));
    }

    #[test]
    fn test_file_not_found_message() {
        let err = FlattenError::FileNotFound {
            path: PathBuf::from("/site/missing.html"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };

        assert_eq!(err.to_string(), "File not found: /site/missing.html");
    }
}
