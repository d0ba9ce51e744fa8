//! Recursive include resolution
//!
//! Files are resolved depth-first, directives left to right. Every recursive
//! call extends an immutable [`VisitedChain`] that lives on the caller's
//! stack, so sibling branches never see each other's entries while a file
//! that reappears on its own root-to-leaf path is always caught.

use std::fs;
use std::iter;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::StarterConfig;
use crate::context::{self, ParsedContext};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::directive::{self, Directive};
use crate::error::FlattenError;
use crate::merge::{self, StarterInclude, StarterMerge};
use crate::paths;

/// Canonical paths on the current resolution path, innermost first
#[derive(Debug, Clone, Copy, Default)]
pub struct VisitedChain<'a> {
    link: Option<Link<'a>>,
}

#[derive(Debug, Clone, Copy)]
struct Link<'a> {
    path: &'a Path,
    parent: &'a VisitedChain<'a>,
}

impl<'a> VisitedChain<'a> {
    /// A chain with no entries
    pub fn new() -> Self {
        Self::default()
    }

    /// This chain with `path` pushed on top; `self` is unchanged
    pub fn with<'b>(&'b self, path: &'b Path) -> VisitedChain<'b> {
        VisitedChain {
            link: Some(Link { path, parent: self }),
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.iter().any(|p| p == path)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.link.is_none()
    }

    /// Entries from innermost to root
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        iter::successors(self.link.as_ref(), |link| link.parent.link.as_ref()).map(|link| link.path)
    }

    /// Entries from root to innermost
    pub fn to_vec(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.iter().map(Path::to_path_buf).collect();
        paths.reverse();
        paths
    }
}

/// Expands `@@include` directives into flattened text
#[derive(Debug, Clone)]
pub struct Resolver {
    starter: StarterMerge,
}

impl Resolver {
    pub fn new(config: StarterConfig) -> Result<Self, FlattenError> {
        Ok(Self {
            starter: StarterMerge::new(config)?,
        })
    }

    /// Fully flatten the file at `path`
    pub fn resolve(&self, path: &Path, diagnostics: &mut Diagnostics) -> Result<String, FlattenError> {
        info!(path = %path.display(), "Resolving includes");
        self.resolve_file(path, &VisitedChain::new(), diagnostics)
    }

    /// Flatten one file reached along `visited`
    pub fn resolve_file(
        &self,
        path: &Path,
        visited: &VisitedChain<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<String, FlattenError> {
        let canonical = paths::absolute(path).map_err(|source| FlattenError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;

        if visited.contains(&canonical) {
            let mut chain = visited.to_vec();
            chain.push(canonical.clone());
            return Err(FlattenError::CircularInclude { path: canonical, chain });
        }
        let visited = visited.with(&canonical);

        let text = fs::read_to_string(&canonical).map_err(|source| FlattenError::FileNotFound {
            path: canonical.clone(),
            source,
        })?;
        let base_dir = canonical.parent().unwrap_or_else(|| Path::new("/"));
        debug!(path = %canonical.display(), depth = visited.len(), "Read include source");

        if let Some(starter) = self.starter.detect(&text, base_dir) {
            return self.merge_starter(&starter, &text, base_dir, &visited, diagnostics);
        }

        self.resolve_text(&text, base_dir, &visited, diagnostics)
    }

    /// Expand every directive in `text`, resolving relative paths against `base_dir`
    ///
    /// Single left-to-right pass: text produced by an expansion is not scanned again.
    pub fn resolve_text(
        &self,
        text: &str,
        base_dir: &Path,
        visited: &VisitedChain<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<String, FlattenError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for found in directive::scan(text) {
            out.push_str(&text[last..found.span.start]);
            out.push_str(&self.expand(&found, base_dir, visited, diagnostics)?);
            last = found.span.end;
        }
        out.push_str(&text[last..]);

        Ok(out)
    }

    fn expand(
        &self,
        found: &Directive<'_>,
        base_dir: &Path,
        visited: &VisitedChain<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<String, FlattenError> {
        let target = merge::resolve_include_path(base_dir, found.path);

        if !target.is_file() {
            diagnostics.record(Diagnostic::MissingInclude {
                path: found.path.to_string(),
                resolved: target,
            });
            return Ok(format!("{} {} -->", crate::INCLUDE_NOT_FOUND_MARKER, found.path));
        }

        let included = self.resolve_file(&target, visited, diagnostics)?;
        Ok(apply_context(included, found.normalized_path(), found.context, diagnostics))
    }

    // The layout and the page body each get their own branch of `visited`
    fn merge_starter(
        &self,
        starter: &StarterInclude,
        text: &str,
        base_dir: &Path,
        visited: &VisitedChain<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<String, FlattenError> {
        debug!(layout = %starter.path.display(), "Merging page into starter layout");

        let layout = self.resolve_file(&starter.path, visited, diagnostics)?;
        let layout = apply_context(
            layout,
            &starter.path.display().to_string(),
            starter.context.as_deref(),
            diagnostics,
        );
        let page = self.resolve_text(&text[starter.content_start..], base_dir, visited, diagnostics)?;

        Ok(self.starter.splice(&layout, &page))
    }
}

/// Substitute the directive's context into its resolved text
fn apply_context(included: String, path: &str, raw: Option<&str>, diagnostics: &mut Diagnostics) -> String {
    match ParsedContext::parse(raw) {
        ParsedContext::Absent => included,
        ParsedContext::Parsed(ctx) => {
            for key in context::keys_with_directives(&ctx) {
                diagnostics.record(Diagnostic::DirectiveInContextValue {
                    path: path.to_string(),
                    key: key.to_string(),
                });
            }
            context::substitute(&included, &ctx)
        }
        ParsedContext::Malformed { reason, .. } => {
            diagnostics.record(Diagnostic::MalformedContext {
                path: path.to_string(),
                reason,
            });
            included
        }
    }
}
