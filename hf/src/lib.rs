//! htmlflat - @@include() flattener for static HTML source trees
//!
//! Expands nested `@@include('path', {context})` directives into one
//! self-contained document, substitutes `@@key` placeholders from the
//! directive's context object, and splices pages that start by including the
//! shared starter layout into that layout's content region.
//!
//! # Pipeline
//!
//! ```text
//! input.html
//!   -> Resolver (directive scan, recursive expansion, cycle detection)
//!        -> StarterMerge (page body spliced into the layout)
//!        -> context substitution per directive
//!   -> asset prefix rewrite (optionally after copying the asset tree)
//!   -> leftover @@token stripping
//!   -> Output validation (optional)
//!   -> output.html
//! ```
//!
//! # Modules
//!
//! - [`directive`] - `@@include(...)` scanner
//! - [`context`] - context object parsing and `@@key` substitution
//! - [`resolver`] - recursive resolution with per-branch visited chains
//! - [`merge`] - starter layout merge heuristic
//! - [`assets`] - asset reference extraction, prefix rewriting and copying
//! - [`validate`] - structural checks on the flattened output
//! - [`flatten`] - the end-to-end pipeline
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface
//!
//! # Example
//!
//! ```ignore
//! use htmlflat::{Config, FlattenOptions, Flattener, Outcome};
//!
//! let flattener = Flattener::new(Config::default())?;
//! match flattener.run("src/index.html".as_ref(), "dist/index.html".as_ref(), &FlattenOptions::default())? {
//!     Outcome::Written(flat) => println!("{} local assets", flat.asset_refs.len()),
//!     Outcome::Rejected { report, .. } => eprintln!("{}", report.render()),
//! }
//! ```

pub mod assets;
pub mod cli;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod directive;
pub mod error;
pub mod flatten;
pub mod merge;
pub mod paths;
pub mod resolver;
pub mod validate;

pub use config::{AssetsConfig, Config, StarterConfig};
pub use context::{Context, ParsedContext};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use directive::Directive;
pub use error::FlattenError;
pub use flatten::{FlattenOptions, Flattened, Flattener, Outcome};
pub use merge::StarterMerge;
pub use resolver::{Resolver, VisitedChain};
pub use validate::{Finding, ValidationReport};

/// File name of the canonical starter layout
pub const DEFAULT_STARTER_FILE: &str = "pages-starter.html";

/// Folder name local asset references start with
pub const DEFAULT_ASSET_DIR: &str = "assets";

/// Opening of the marker left in place of an include whose target is missing
pub const INCLUDE_NOT_FOUND_MARKER: &str = "<!-- include not found:";

/// Exit status used when validation refuses to write the output
pub const EXIT_VALIDATION_FAILED: i32 = 2;
