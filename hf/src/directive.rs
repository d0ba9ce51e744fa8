//! `@@include(...)` directive scanner
//!
//! Recognizes `@@include('path')` and `@@include("path", {"key": "value"})`.
//! The context object is only captured when it follows a comma directly after
//! the path; it may span several lines. Any other argument after the comma is
//! captured as-is so the directive still resolves and the bad context gets
//! reported. Scanning is flat: directives nested inside a captured context
//! object are not reported.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// Optional `, {context}` argument and the closing parenthesis
///
/// An object is preferred; otherwise everything up to the first `)` is taken.
pub(crate) const ARGS_TAIL: &str = r"(?:\s*,\s*(?P<context>\{(?s:.*?)\}|[^)]*?))?\s*\)";

static INCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"@@include\(\s*(?:'(?P<sq>[^']+)'|"(?P<dq>[^"]+)"){}"#, ARGS_TAIL))
        .expect("include pattern is valid")
});

/// One include directive found in a text blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'a> {
    /// Byte span of the whole directive
    pub span: Range<usize>,
    /// Path literal exactly as written between the quotes
    pub path: &'a str,
    /// Raw context object text, if present
    pub context: Option<&'a str>,
}

impl<'a> Directive<'a> {
    /// Path with a leading `./` and any leading `/` removed
    pub fn normalized_path(&self) -> &'a str {
        let path = self.path.strip_prefix("./").unwrap_or(self.path);
        path.trim_start_matches('/')
    }
}

/// All directives in `text`, in document order
pub fn scan(text: &str) -> Vec<Directive<'_>> {
    INCLUDE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let path = caps.name("sq").or_else(|| caps.name("dq"))?;
            Some(Directive {
                span: whole.range(),
                path: path.as_str(),
                context: caps.name("context").map(|m| m.as_str().trim()).filter(|c| !c.is_empty()),
            })
        })
        .collect()
}

/// Whether `text` contains at least one directive
pub fn contains_directive(text: &str) -> bool {
    INCLUDE_RE.is_match(text)
}
