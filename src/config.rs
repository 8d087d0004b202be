use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::RuleCatalog;
use crate::error::{Error, Result};

/// Maximum config file size (1 MB) - prevents memory exhaustion from malformed files
const MAX_CONFIG_SIZE: u64 = 1024 * 1024;

/// Name of the configuration file looked up next to the analyzed path.
pub const CONFIG_FILE_NAME: &str = "perfcheck.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Rule bundle replacing the embedded one. Relative paths resolve
    /// against the directory holding `perfcheck.toml`.
    pub bundle: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
    Sarif,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub color: ColorChoice,
}

impl Config {
    /// Load config from perfcheck.toml in the given path, or return default
    ///
    /// # Arguments
    ///
    /// * `path` - Directory (or unit file) whose directory may hold perfcheck.toml
    ///
    /// # Errors
    ///
    /// Returns an error if the path doesn't exist or if the config file
    /// exists but is too large or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::config(format!(
                "path does not exist: {}",
                path.display()
            )));
        }

        // If path is a file, use its parent directory for config lookup
        let dir_path = if path.is_file() {
            path.parent().unwrap_or(path)
        } else {
            path
        };

        let config_path = dir_path.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let metadata = std::fs::metadata(&config_path).map_err(|e| Error::io(&config_path, e))?;
        if metadata.len() > MAX_CONFIG_SIZE {
            return Err(Error::config(format!(
                "config file too large ({} bytes, max {} bytes): {}",
                metadata.len(),
                MAX_CONFIG_SIZE,
                config_path.display()
            )));
        }

        let content =
            std::fs::read_to_string(&config_path).map_err(|e| Error::io(&config_path, e))?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| Error::config(format!("{}: {}", config_path.display(), e)))?;

        if let Some(bundle) = config.catalog.bundle.take() {
            config.catalog.bundle = Some(dir_path.join(bundle));
        }

        Ok(config)
    }

    /// Catalog named by `[catalog] bundle`, or `None` to use the embedded one.
    pub fn custom_catalog(&self) -> Result<Option<RuleCatalog>> {
        match &self.catalog.bundle {
            Some(path) => {
                let catalog = RuleCatalog::from_file(path)?;
                catalog.verify_codes()?;
                Ok(Some(catalog))
            }
            None => Ok(None),
        }
    }

    /// Generate default TOML config
    pub fn default_toml() -> &'static str {
        r#"# perfcheck configuration

[catalog]
# Replace the embedded rule bundle (tab-separated: id, langs, description, category, severity)
# bundle = "rules.tsv"

[output]
format = "console"  # "console", "json", "sarif"
color = "auto"      # "auto", "always", "never"
"#
    }
}
