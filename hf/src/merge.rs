//! Starter layout merge
//!
//! Pages commonly begin with `@@include('./partials/pages-starter.html')` and
//! then carry their own markup. Flattening that sequentially puts the page
//! after the layout's `</html>`. When a file opens with the starter include,
//! the page markup is instead spliced into the layout's content container.
//!
//! Insertion point, first match wins:
//! 1. right before the first configured container marker
//! 2. right before the body close marker
//! 3. appended to the end of the layout

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::config::StarterConfig;
use crate::directive;
use crate::paths;

/// A starter include at the head of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarterInclude {
    /// Resolved location of the layout file
    pub path: PathBuf,
    /// Raw context object passed to the layout, if any
    pub context: Option<String>,
    /// Byte offset where the page content begins
    pub content_start: usize,
}

/// Where page content went in the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion<'m> {
    Container(&'m str),
    BodyClose,
    Appended,
}

/// Detects starter includes and splices page content into the layout
#[derive(Debug, Clone)]
pub struct StarterMerge {
    config: StarterConfig,
    head: Regex,
    title_block: Regex,
}

impl StarterMerge {
    pub fn new(config: StarterConfig) -> Result<Self, regex::Error> {
        let name = regex::escape(&config.file_name);
        let head = RegexBuilder::new(&format!(
            r#"\A\s*@@include\(\s*(?:'(?P<sq>[^']*{name})'|"(?P<dq>[^"]*{name})"){tail}\s*"#,
            tail = directive::ARGS_TAIL
        ))
        .case_insensitive(true)
        .build()?;

        let title_block = RegexBuilder::new(&format!(
            "{}.*?{}",
            regex::escape(&config.title_start),
            regex::escape(&config.title_end)
        ))
        .dot_matches_new_line(true)
        .build()?;

        Ok(Self {
            config,
            head,
            title_block,
        })
    }

    /// Starter include at the head of `text`, if the layout file exists
    ///
    /// Relative include paths resolve against `base_dir`.
    pub fn detect(&self, text: &str, base_dir: &Path) -> Option<StarterInclude> {
        let caps = self.head.captures(text)?;
        let raw = caps.name("sq").or_else(|| caps.name("dq"))?.as_str();
        let path = resolve_include_path(base_dir, raw);

        if !path.is_file() {
            debug!(?path, "Starter include target missing, resolving page normally");
            return None;
        }

        Some(StarterInclude {
            path,
            context: caps
                .name("context")
                .map(|m| m.as_str().trim())
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            content_start: caps.get(0)?.end(),
        })
    }

    /// Merge resolved page content into the resolved layout
    pub fn splice(&self, layout: &str, page: &str) -> String {
        let page = self.strip_duplicate_title(layout, page);
        let (merged, insertion) = self.insert(layout, &page);
        debug!(?insertion, "Spliced page content into starter layout");
        merged
    }

    /// Remove the page's first title block when the layout already has one
    pub fn strip_duplicate_title<'a>(&self, layout: &str, page: &'a str) -> Cow<'a, str> {
        let layout_has_title = (!self.config.title_probe.is_empty() && layout.contains(&self.config.title_probe))
            || layout.contains(&self.config.title_start);

        if layout_has_title {
            self.title_block.replacen(page, 1, "")
        } else {
            Cow::Borrowed(page)
        }
    }

    /// Insert `page` at the layout's content region
    pub fn insert(&self, layout: &str, page: &str) -> (String, Insertion<'_>) {
        for marker in self.config.insertion_markers.iter().filter(|m| !m.is_empty()) {
            if let Some(at) = layout.find(marker.as_str()) {
                return (splice_at(layout, at, page), Insertion::Container(marker.as_str()));
            }
        }

        if !self.config.body_close.is_empty()
            && let Some(at) = layout.find(&self.config.body_close)
        {
            return (splice_at(layout, at, page), Insertion::BodyClose);
        }

        (format!("{}\n{}", layout, page), Insertion::Appended)
    }
}

fn splice_at(layout: &str, at: usize, page: &str) -> String {
    let mut out = String::with_capacity(layout.len() + page.len() + 1);
    out.push_str(&layout[..at]);
    out.push_str(page);
    out.push('\n');
    out.push_str(&layout[at..]);
    out
}

/// Location of an include target relative to the including file's directory
pub fn resolve_include_path(base_dir: &Path, raw: &str) -> PathBuf {
    let raw_path = Path::new(raw);
    if raw_path.is_absolute() {
        paths::normalize_path(raw_path)
    } else {
        paths::normalize_path(&base_dir.join(raw_path))
    }
}
