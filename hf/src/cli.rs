//! CLI argument parsing for htmlflat

use clap::Parser;
use std::path::PathBuf;

use crate::flatten::FlattenOptions;

/// htmlflat - flatten @@include() HTML into one document
#[derive(Parser, Debug)]
#[command(name = "hf")]
#[command(author, version, about = "Flatten @@include() HTML source trees into single documents", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Page to flatten
    #[arg(short, long)]
    pub input: PathBuf,

    /// File to write the flattened document to
    #[arg(short, long)]
    pub output: PathBuf,

    /// Prefix for local asset references (e.g. ../src/assets/)
    #[arg(long)]
    pub asset_prefix: Option<String>,

    /// Copy the source asset folder into the output directory
    #[arg(long)]
    pub copy_assets: bool,

    /// Check the output and refuse to write it on any finding (exit status 2)
    #[arg(long)]
    pub validate: bool,

    /// Print the local asset references of the written output
    #[arg(long)]
    pub list_assets: bool,
}

impl Cli {
    pub fn flatten_options(&self) -> FlattenOptions {
        FlattenOptions {
            asset_prefix: self.asset_prefix.clone(),
            copy_assets: self.copy_assets,
            validate: self.validate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "hf",
            "-i",
            "src/index.html",
            "--output",
            "dist/index.html",
            "--asset-prefix",
            "../src/assets/",
            "--validate",
        ])
        .unwrap();

        let options = cli.flatten_options();
        assert_eq!(options.asset_prefix.as_deref(), Some("../src/assets/"));
        assert!(options.validate);
        assert!(!options.copy_assets);
        assert!(!cli.list_assets);
    }

    #[test]
    fn test_input_and_output_required() {
        assert!(Cli::try_parse_from(["hf", "-i", "a.html"]).is_err());
        assert!(Cli::try_parse_from(["hf", "-o", "b.html"]).is_err());
    }
}
