//! Structural checks on flattened output
//!
//! All checks run and every finding is reported together; nothing here stops
//! at the first problem.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::assets;
use crate::paths;

/// Maximum number of missing assets named in one message
const MAX_LISTED: usize = 10;

struct TagPattern {
    tag: &'static str,
    open: Regex,
    close: Regex,
}

static TAG_PATTERNS: LazyLock<Vec<TagPattern>> = LazyLock::new(|| {
    ["html", "head", "body"]
        .into_iter()
        .map(|tag| TagPattern {
            tag,
            open: RegexBuilder::new(&format!(r"<\s*{}\b", tag))
                .case_insensitive(true)
                .build()
                .expect("open tag pattern is valid"),
            close: RegexBuilder::new(&format!(r"</\s*{}\s*>", tag))
                .case_insensitive(true)
                .build()
                .expect("close tag pattern is valid"),
        })
        .collect()
});

/// One validation problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// A document-level tag does not appear exactly once as an open/close pair
    TagCount { tag: &'static str, opens: usize, closes: usize },
    /// The output still carries include-not-found markers
    UnresolvedIncludes { count: usize },
    /// Local asset references that exist under none of the search roots
    MissingAssets { assets: Vec<String> },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TagCount { tag, opens, closes } => write!(
                f,
                "Expected exactly one <{tag}> and </{tag}> pair, found {opens} opens and {closes} closes"
            ),
            Self::UnresolvedIncludes { count } => write!(
                f,
                "{} include(s) were not found. Look for \"{} ... -->\" in the output.",
                count,
                crate::INCLUDE_NOT_FOUND_MARKER
            ),
            Self::MissingAssets { assets } => {
                let shown = assets.iter().take(MAX_LISTED).cloned().collect::<Vec<_>>().join(", ");
                let more = if assets.len() > MAX_LISTED { "..." } else { "" };
                write!(
                    f,
                    "Missing asset files referenced in output (checked relative to output and source dirs): {}{}",
                    shown, more
                )
            }
        }
    }
}

/// All findings of one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Missing asset references, if that check failed
    pub fn missing_assets(&self) -> &[String] {
        self.findings
            .iter()
            .find_map(|f| match f {
                Finding::MissingAssets { assets } => Some(assets.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Operator-facing report text
    pub fn render(&self) -> String {
        let mut out = String::from("Validation errors:\n");
        for finding in &self.findings {
            out.push_str(&format!(" - {}\n", finding));
        }
        out.push_str(
            "\nHint: run without --validate to skip these checks, or run with --copy-assets to copy referenced assets into the output folder.\n",
        );
        out
    }
}

/// Directories a local asset reference may resolve under
#[derive(Debug, Clone, Default)]
pub struct AssetRoots {
    /// Directory the output file is written to
    pub output_dir: PathBuf,
    /// Directory of the input file
    pub source_dir: PathBuf,
    /// Prefix applied to asset references, mapped back to the source asset folder
    pub asset_prefix: Option<String>,
    /// Source asset folder name
    pub asset_dir: String,
    /// Inferred project source root
    pub project_root: Option<PathBuf>,
}

impl AssetRoots {
    /// Whether `reference` names an existing file under any root
    pub fn resolves(&self, reference: &str) -> bool {
        let exists = |base: &Path, rel: &str| paths::normalize_path(&base.join(rel)).exists();

        if exists(&self.output_dir, reference) || exists(&self.source_dir, reference) {
            return true;
        }

        if let Some(prefix) = self.asset_prefix.as_deref()
            && let Some(suffix) = reference.strip_prefix(prefix)
            && exists(&self.source_dir.join(&self.asset_dir), suffix)
        {
            return true;
        }

        self.project_root
            .as_deref()
            .is_some_and(|root| exists(root, reference))
    }
}

/// Nearest ancestor named `root_name` (case-insensitive), joined with `source_subdir`
///
/// The search starts at the parent of `source_dir`.
pub fn infer_project_root(source_dir: &Path, root_name: &str, source_subdir: &str) -> Option<PathBuf> {
    source_dir
        .ancestors()
        .skip(1)
        .find(|dir| {
            dir.file_name()
                .is_some_and(|n| n.to_string_lossy().eq_ignore_ascii_case(root_name))
        })
        .map(|dir| paths::normalize_path(&dir.join(source_subdir)))
}

/// Run every check against `content`
pub fn validate(content: &str, roots: &AssetRoots) -> ValidationReport {
    let mut findings = Vec::new();

    for pattern in TAG_PATTERNS.iter() {
        let opens = pattern.open.find_iter(content).count();
        let closes = pattern.close.find_iter(content).count();
        if opens != 1 || closes != 1 {
            findings.push(Finding::TagCount {
                tag: pattern.tag,
                opens,
                closes,
            });
        }
    }

    let markers = content.matches(crate::INCLUDE_NOT_FOUND_MARKER).count();
    if markers > 0 {
        findings.push(Finding::UnresolvedIncludes { count: markers });
    }

    // Page links are not assets
    let missing: Vec<String> = assets::local_refs(content)
        .into_iter()
        .filter(|r| !r.to_ascii_lowercase().ends_with(".html"))
        .filter(|r| !roots.resolves(r))
        .collect();
    if !missing.is_empty() {
        findings.push(Finding::MissingAssets { assets: missing });
    }

    ValidationReport { findings }
}
