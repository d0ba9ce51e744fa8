//! End-to-end flatten pipeline
//!
//! resolve -> asset prefix (auto or given) -> optional asset copy -> prefix
//! rewrite -> leftover token stripping -> optional validation -> write.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::assets::{self, AssetRewriter};
use crate::config::Config;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::FlattenError;
use crate::paths;
use crate::resolver::Resolver;
use crate::validate::{self, AssetRoots, ValidationReport};

static LEFTOVER_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@@[A-Za-z0-9_-]+").expect("token pattern is valid"));

/// Per-run options
#[derive(Debug, Clone, Default)]
pub struct FlattenOptions {
    /// Prefix for local asset references; computed from the source tree when unset
    pub asset_prefix: Option<String>,
    /// Copy the source asset folder next to the output and point references at it
    pub copy_assets: bool,
    /// Run the output validator and refuse to write on findings
    pub validate: bool,
}

/// A flattened document and what was learned producing it
#[derive(Debug)]
pub struct Flattened {
    /// Final document text
    pub content: String,
    /// Local asset references in `content`, query and fragment removed
    pub asset_refs: BTreeSet<String>,
    /// Prefix applied to asset references, if any
    pub asset_prefix: Option<String>,
    /// Validation result when validation was requested
    pub validation: Option<ValidationReport>,
    /// Non-fatal conditions met along the way
    pub diagnostics: Diagnostics,
}

/// Result of [`Flattener::run`]
#[derive(Debug)]
pub enum Outcome {
    /// The output file was written
    Written(Flattened),
    /// Validation failed; nothing was written
    Rejected { report: ValidationReport, flattened: Flattened },
}

/// Drives one input file to one output file
#[derive(Debug, Clone)]
pub struct Flattener {
    config: Config,
    resolver: Resolver,
}

impl Flattener {
    pub fn new(config: Config) -> Result<Self, FlattenError> {
        let resolver = Resolver::new(config.starter.clone())?;
        Ok(Self { config, resolver })
    }

    /// Flatten `input` as if it were to be written to `output`
    ///
    /// Copy mode touches the filesystem next to `output`; the output file
    /// itself is not written.
    pub fn flatten(&self, input: &Path, output: &Path, options: &FlattenOptions) -> Result<Flattened, FlattenError> {
        let input = paths::absolute(input).map_err(|source| FlattenError::FileNotFound {
            path: input.to_path_buf(),
            source,
        })?;
        let output = paths::absolute(output).map_err(|e| FlattenError::io(output, e))?;
        let source_dir = parent_dir(&input);
        let output_dir = parent_dir(&output);

        let mut diagnostics = Diagnostics::new();
        let mut content = self.resolver.resolve(&input, &mut diagnostics)?;

        let assets_config = &self.config.assets;
        let mut asset_prefix = options
            .asset_prefix
            .clone()
            .filter(|p| !p.is_empty())
            .or_else(|| assets::compute_prefix(&source_dir, &output_dir, &assets_config.dir_name));

        if options.copy_assets {
            let source_assets = source_dir.join(&assets_config.dir_name);
            let dest_assets = output_dir.join(&assets_config.copy_dir_name);

            if source_assets.is_dir() {
                match assets::copy_tree(&source_assets, &dest_assets) {
                    Ok(_) => asset_prefix = Some(format!("{}/", assets_config.copy_dir_name)),
                    Err(e) => diagnostics.record(Diagnostic::AssetCopyFailed {
                        source_dir: source_assets,
                        reason: e.to_string(),
                    }),
                }
            } else {
                diagnostics.record(Diagnostic::AssetCopyFailed {
                    source_dir: source_assets,
                    reason: "source asset folder does not exist".to_string(),
                });
            }
        }

        if let Some(prefix) = asset_prefix.as_deref() {
            debug!(prefix, "Rewriting asset references");
            content = AssetRewriter::new(&assets_config.dir_name, prefix)?.rewrite(&content);
        }

        let (stripped, tokens) = strip_leftover_tokens(&content);
        if !tokens.is_empty() {
            diagnostics.record(Diagnostic::UnresolvedTokens { tokens });
            content = stripped;
        }

        let validation = options.validate.then(|| {
            let roots = AssetRoots {
                output_dir: output_dir.clone(),
                source_dir: source_dir.clone(),
                asset_prefix: asset_prefix.clone(),
                asset_dir: assets_config.dir_name.clone(),
                project_root: validate::infer_project_root(
                    &source_dir,
                    &assets_config.project_root_name,
                    &assets_config.source_subdir,
                ),
            };
            validate::validate(&content, &roots)
        });

        Ok(Flattened {
            asset_refs: assets::local_refs(&content),
            content,
            asset_prefix,
            validation,
            diagnostics,
        })
    }

    /// Flatten and write `output` unless validation refuses it
    pub fn run(&self, input: &Path, output: &Path, options: &FlattenOptions) -> Result<Outcome, FlattenError> {
        let flattened = self.flatten(input, output, options)?;

        if let Some(report) = flattened.validation.clone().filter(|r| !r.is_ok()) {
            return Ok(Outcome::Rejected { report, flattened });
        }

        write_output(output, &flattened.content)?;
        Ok(Outcome::Written(flattened))
    }
}

/// Write `content` to `path`, creating parent directories
pub fn write_output(path: &Path, content: &str) -> Result<(), FlattenError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| FlattenError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| FlattenError::io(path, e))?;
    info!(path = %path.display(), bytes = content.len(), "Wrote flattened output");
    Ok(())
}

/// Remove every `@@token`, returning the new text and the unique tokens removed
pub fn strip_leftover_tokens(text: &str) -> (String, Vec<String>) {
    let tokens: BTreeSet<&str> = LEFTOVER_TOKEN_RE.find_iter(text).map(|m| m.as_str()).collect();
    if tokens.is_empty() {
        return (text.to_string(), Vec::new());
    }

    let stripped = LEFTOVER_TOKEN_RE.replace_all(text, "").into_owned();
    (stripped, tokens.into_iter().map(str::to_string).collect())
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("/"))
}
