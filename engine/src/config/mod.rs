//! Configuration management
//!
//! This module handles loading, validation, and management of the widget
//! package subsystem configuration. Configuration is stored in TOML format
//! at ~/.stryde/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Packages directory, log level, running app version
//! - **marketplace**: Catalog URL, minimum trust level, trusted signature
//!   tokens
//!
//! # Path Expansion
//!
//! The configuration system automatically:
//! - Expands ~ to the user's home directory
//! - Creates the packages directory if it doesn't exist
//!
//! # Examples
//!
//! ```no_run
//! use stryde_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//! println!("Packages dir: {:?}", config.core.packages_dir);
//! # Ok(())
//! # }
//! ```

use sdk::errors::PackageError;
use sdk::types::TrustLevel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::marketplace::MarketplaceConfig;
use crate::verifier::Verifier;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core engine settings
    pub core: CoreConfig,

    /// Marketplace policy
    #[serde(default)]
    pub marketplace: MarketplaceSection,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Packages directory path (supports ~ expansion)
    #[serde(default = "default_packages_dir")]
    pub packages_dir: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Version of the running host app, used for package compatibility
    #[serde(default = "default_app_version")]
    pub app_version: String,
}

/// Marketplace configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceSection {
    /// Remote catalog endpoint; browsing is disabled when unset
    #[serde(default)]
    pub catalog_url: Option<String>,

    /// Minimum trust level required to install from the catalog
    #[serde(default = "default_minimum_trust")]
    pub minimum_trust: TrustLevel,

    /// Signature tokens that verify as `trusted`
    #[serde(default)]
    pub trusted_tokens: Vec<String>,
}

impl Default for MarketplaceSection {
    fn default() -> Self {
        Self {
            catalog_url: None,
            minimum_trust: default_minimum_trust(),
            trusted_tokens: Vec::new(),
        }
    }
}

fn default_packages_dir() -> PathBuf {
    PathBuf::from("~/.stryde/packages")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_app_version() -> String {
    "1.0.0".to_string()
}

fn default_minimum_trust() -> TrustLevel {
    TrustLevel::Signed
}

impl Config {
    /// Load configuration from the default location (~/.stryde/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default
    /// configuration. Validates the configuration after loading.
    pub fn load_or_create() -> Result<Self, PackageError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, PackageError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| PackageError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| PackageError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Marketplace policy derived from this configuration
    pub fn marketplace_config(&self) -> MarketplaceConfig {
        MarketplaceConfig {
            catalog_url: self.marketplace.catalog_url.clone(),
            minimum_trust: self.marketplace.minimum_trust,
        }
    }

    /// Verifier configured with this app version and trusted tokens
    pub fn verifier(&self) -> Verifier {
        Verifier::new(
            self.core.app_version.clone(),
            self.marketplace.trusted_tokens.clone(),
        )
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, PackageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PackageError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default_config();
        config.validate_and_process()?;

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| PackageError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| PackageError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.stryde/config.toml)
    fn default_config_path() -> Result<PathBuf, PackageError> {
        let home = dirs::home_dir().ok_or_else(|| {
            PackageError::Config("Could not determine home directory".to_string())
        })?;

        Ok(home.join(".stryde").join("config.toml"))
    }

    /// Create a default configuration
    fn default_config() -> Self {
        Self {
            core: CoreConfig {
                packages_dir: default_packages_dir(),
                log_level: default_log_level(),
                app_version: default_app_version(),
            },
            marketplace: MarketplaceSection::default(),
        }
    }

    /// Validate and process configuration
    ///
    /// Validates field values, expands ~ in the packages directory, and
    /// creates the directory if it doesn't exist.
    fn validate_and_process(&mut self) -> Result<(), PackageError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(PackageError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if self.core.app_version.trim().is_empty() {
            return Err(PackageError::Config(
                "app_version cannot be empty".to_string(),
            ));
        }

        if let Some(url) = &self.marketplace.catalog_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(PackageError::Config(format!(
                    "catalog_url must be an http(s) URL, got '{}'",
                    url
                )));
            }
        }

        self.core.packages_dir = expand_path(&self.core.packages_dir)?;
        if !self.core.packages_dir.exists() {
            fs::create_dir_all(&self.core.packages_dir).map_err(|e| {
                PackageError::Config(format!("Failed to create packages directory: {}", e))
            })?;
        }

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, PackageError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| PackageError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or_else(|| {
            PackageError::Config("Could not determine home directory".to_string())
        })?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| PackageError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}
