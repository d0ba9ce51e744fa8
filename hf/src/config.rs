//! Configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main htmlflat configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Starter layout merge settings
    pub starter: StarterConfig,

    /// Asset reference settings
    pub assets: AssetsConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: .htmlflat.yml
        let local_config = PathBuf::from(".htmlflat.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/htmlflat/htmlflat.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("htmlflat").join("htmlflat.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::debug!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Starter layout merge settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StarterConfig {
    /// File name a page's first include must end with to trigger the merge
    #[serde(rename = "file-name")]
    pub file_name: String,

    /// Container-closing markers tried in order; page content goes right before the first found
    #[serde(rename = "insertion-markers")]
    pub insertion_markers: Vec<String>,

    /// Fallback insertion point when no container marker is present
    #[serde(rename = "body-close")]
    pub body_close: String,

    /// Snippet whose presence in the layout means it already renders a page title
    #[serde(rename = "title-probe")]
    pub title_probe: String,

    /// Opening marker of a page-title block
    #[serde(rename = "title-start")]
    pub title_start: String,

    /// Closing marker of a page-title block
    #[serde(rename = "title-end")]
    pub title_end: String,
}

impl Default for StarterConfig {
    fn default() -> Self {
        Self {
            file_name: crate::DEFAULT_STARTER_FILE.to_string(),
            insertion_markers: vec![
                "</div> <!-- container -->".to_string(),
                "</div><!-- container -->".to_string(),
                "</div> <!--container-->".to_string(),
            ],
            body_close: "</body>".to_string(),
            title_probe: "<h4 class=\"page-title\">".to_string(),
            title_start: "<!-- start page title -->".to_string(),
            title_end: "<!-- end page title -->".to_string(),
        }
    }
}

/// Asset reference settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Folder name local asset references start with
    #[serde(rename = "dir-name")]
    pub dir_name: String,

    /// Folder created next to the output file in copy mode
    #[serde(rename = "copy-dir-name")]
    pub copy_dir_name: String,

    /// Ancestor directory name that marks the project root
    #[serde(rename = "project-root-name")]
    pub project_root_name: String,

    /// Source folder under the project root
    #[serde(rename = "source-subdir")]
    pub source_subdir: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir_name: crate::DEFAULT_ASSET_DIR.to_string(),
            copy_dir_name: crate::DEFAULT_ASSET_DIR.to_string(),
            project_root_name: "Admin".to_string(),
            source_subdir: "src".to_string(),
        }
    }
}
