//! Operator-facing diagnostics
//!
//! Degraded conditions never abort a run. Each one is logged at `debug` as it
//! is recorded and kept so callers can report it; the `hf` binary prints every
//! kept diagnostic to stderr regardless of log level.

use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Maximum number of tokens listed in a single message
const MAX_LISTED: usize = 10;

/// A non-fatal condition found while flattening
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An include target does not exist; a marker was left in its place
    MissingInclude {
        /// Path as written in the directive
        path: String,
        /// Where the resolver looked for it
        resolved: PathBuf,
    },

    /// A context object could not be parsed; the include resolved without substitution
    MalformedContext { path: String, reason: String },

    /// A context value contains an include directive, which is inserted literally
    DirectiveInContextValue { path: String, key: String },

    /// Placeholder tokens that no context supplied, removed from the output
    UnresolvedTokens { tokens: Vec<String> },

    /// The asset tree could not be copied next to the output
    AssetCopyFailed { source_dir: PathBuf, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInclude { resolved, .. } => {
                write!(f, "included file not found: {}", resolved.display())
            }
            Self::MalformedContext { path, reason } => {
                write!(f, "ignoring malformed context for include '{}': {}", path, reason)
            }
            Self::DirectiveInContextValue { path, key } => write!(
                f,
                "context value '{}' for include '{}' contains an include directive; it is not expanded",
                key, path
            ),
            Self::UnresolvedTokens { tokens } => {
                let shown = tokens.iter().take(MAX_LISTED).cloned().collect::<Vec<_>>().join(", ");
                let more = if tokens.len() > MAX_LISTED { "..." } else { "" };
                write!(f, "removed {} unresolved @@ tokens: {}{}", tokens.len(), shown, more)
            }
            Self::AssetCopyFailed { source_dir, reason } => {
                write!(f, "failed to copy assets from {}: {}", source_dir.display(), reason)
            }
        }
    }
}

/// Diagnostics collected over one flatten run
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and keep a diagnostic
    pub fn record(&mut self, diagnostic: Diagnostic) {
        debug!(%diagnostic, "Recorded diagnostic");
        self.entries.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Directive paths of every include that could not be found
    pub fn missing_includes(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|d| match d {
                Diagnostic::MissingInclude { path, .. } => Some(path.as_str()),
                _ => None,
            })
            .collect()
    }
}
