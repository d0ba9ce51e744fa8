//! Asset references in flattened markup
//!
//! References are read from `href=` / `src=` attribute values and CSS
//! `url(...)` constructs. Only textual matching is done; markup is never
//! parsed.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::paths;

static ATTR_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:href|src)\s*=\s*["']([^"']+)["']"#).expect("attribute reference pattern is valid")
});

static URL_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)url\(\s*["']?([^)"']+)["']?\s*\)"#).expect("url reference pattern is valid"));

const EXTERNAL_SCHEMES: &[&str] = &["http://", "https://", "//", "data:", "mailto:", "tel:", "javascript:"];

/// How a reference is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// Points off-site or at an inline resource
    External,
    /// Only a fragment (`#top`) or empty
    Fragment,
    /// A file expected on disk
    Local,
}

/// Every reference value in `text`: attribute values first, then `url(...)` values
pub fn extract_refs(text: &str) -> Vec<&str> {
    let attrs = ATTR_REF_RE.captures_iter(text).filter_map(|c| c.get(1));
    let urls = URL_REF_RE.captures_iter(text).filter_map(|c| c.get(1));
    attrs.chain(urls).map(|m| m.as_str()).collect()
}

/// Reference with any `?query` and `#fragment` removed
pub fn strip_suffixes(reference: &str) -> &str {
    let end = reference.find(['?', '#']).unwrap_or(reference.len());
    &reference[..end]
}

pub fn classify(reference: &str) -> RefKind {
    let lower = reference.trim().to_ascii_lowercase();
    if EXTERNAL_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        RefKind::External
    } else if strip_suffixes(&lower).is_empty() {
        RefKind::Fragment
    } else {
        RefKind::Local
    }
}

/// Unique local references in `text`, query and fragment removed
pub fn local_refs(text: &str) -> BTreeSet<String> {
    extract_refs(text)
        .into_iter()
        .filter(|r| classify(r) == RefKind::Local)
        .map(|r| strip_suffixes(r).to_string())
        .collect()
}

/// Rewrites references that start with the asset folder to start with a prefix
#[derive(Debug, Clone)]
pub struct AssetRewriter {
    attr: Regex,
    url: Regex,
    prefix: String,
}

impl AssetRewriter {
    pub fn new(dir_name: &str, prefix: impl Into<String>) -> Result<Self, regex::Error> {
        let dir = regex::escape(dir_name.trim_end_matches('/'));
        Ok(Self {
            attr: Regex::new(&format!(r#"(?P<attr>(?:href|src)\s*=\s*["']){}/"#, dir))?,
            url: Regex::new(&format!(r#"url\(\s*(?P<quote>['"]?){}/"#, dir))?,
            prefix: prefix.into(),
        })
    }

    pub fn rewrite(&self, text: &str) -> String {
        let text = self
            .attr
            .replace_all(text, |caps: &Captures<'_>| format!("{}{}", &caps["attr"], self.prefix));
        self.url
            .replace_all(&text, |caps: &Captures<'_>| format!("url({}{}", &caps["quote"], self.prefix))
            .into_owned()
    }
}

/// Prefix leading from the output file's directory to the source asset folder
///
/// `None` when the source has no asset folder next to it.
pub fn compute_prefix(source_dir: &Path, output_dir: &Path, dir_name: &str) -> Option<String> {
    let assets = source_dir.join(dir_name);
    if !assets.is_dir() {
        debug!(path = %assets.display(), "No source asset folder, leaving references untouched");
        return None;
    }

    let rel = paths::relative_path(&assets, output_dir);
    Some(format!("{}/", paths::to_forward_slashes(&rel)))
}

/// Replace `dest` with a copy of the `source` tree, returning the number of files copied
pub fn copy_tree(source: &Path, dest: &Path) -> io::Result<usize> {
    if paths::normalize_path(source) == paths::normalize_path(dest) {
        debug!(path = %source.display(), "Asset folder already in place");
        return Ok(0);
    }

    if dest.exists() {
        fs::remove_dir_all(dest)?;
    }
    fs::create_dir_all(dest)?;

    let mut copied = 0;
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        let rel = entry.path().strip_prefix(source).map_err(io::Error::other)?;
        let target: PathBuf = dest.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    info!(
        source = %source.display(),
        dest = %dest.display(),
        files = copied,
        "Copied asset tree"
    );
    Ok(copied)
}
