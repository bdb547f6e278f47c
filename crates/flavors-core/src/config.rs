//! Flavor configuration and its discovery on disk.
//!
//! The macro reads its settings from the same places `babel-plugin-macros`
//! does, under a single configuration key (`flavors` by default):
//!
//! ```json
//! // .babel-plugin-macrosrc.json
//! {
//!   "flavors": {
//!     "imports": { "./theme": "./theme.dark" },
//!     "values": { "layout-theme-key": "dark" }
//!   }
//! }
//! ```
//!
//! or `package.json` under `babelMacros.flavors`. The nearest file wins,
//! searching upward from the module being transformed.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::macros::predicates::is_blank;

/// Well-known configuration key the macro reads its settings from
pub const CONFIG_NAME: &str = "flavors";

/// Standalone macro configuration files, in lookup order
pub const MACROS_RC_FILES: &[&str] = &[
    ".babel-plugin-macrosrc",
    ".babel-plugin-macrosrc.json",
    "babel-plugin-macros.config.json",
];

/// Key holding macro configuration inside package.json
pub const PACKAGE_JSON_KEY: &str = "babelMacros";

/// Configuration loading errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid flavor configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid \"{key}\" section in {}: {source}", path.display())]
    InvalidSection {
        path: PathBuf,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} does not contain a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    #[error("Configuration name must not be blank")]
    BlankConfigName,
}

/// Read-only view of a flavor configuration
pub trait FlavorLookup {
    /// Replacement for an import path, if one is configured
    fn import_path(&self, raw_path: &str) -> Option<&str>;

    /// Value configured for a flavor key
    fn flavor_value(&self, key: &str) -> Option<&str>;
}

/// Parsed flavor configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlavorConfig {
    /// Import path mapping: path as written -> flavored path
    pub imports: IndexMap<String, String>,
    /// Flavor values: lookup key -> literal
    pub values: IndexMap<String, String>,
}

impl FlavorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_import(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.imports.insert(from.into(), to.into());
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.values.is_empty()
    }

    /// Parse a bare configuration object
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load an explicitly named file: either a macros file holding the
    /// configuration under `config_name`, or a bare configuration object
    pub fn load_file(path: &Path, config_name: &str) -> Result<Self, ConfigError> {
        let document = read_json(path)?;
        let object = document.as_object().ok_or_else(|| ConfigError::NotAnObject {
            path: path.to_path_buf(),
        })?;
        if object.contains_key(config_name) {
            return section(&document, config_name, path).map(Option::unwrap_or_default);
        }
        FlavorConfig::deserialize(&document).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl FlavorLookup for FlavorConfig {
    fn import_path(&self, raw_path: &str) -> Option<&str> {
        self.imports.get(raw_path).map(String::as_str)
    }

    fn flavor_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Configuration found on disk together with the file it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: FlavorConfig,
    pub source: PathBuf,
}

/// Search upward from `start_dir` for the nearest macros configuration.
///
/// A standalone macros file ends the search even when it lacks the key
/// (the configuration is then empty); a package.json without a
/// `babelMacros` entry is skipped.
pub fn discover(start_dir: &Path, config_name: &str) -> Result<Option<LoadedConfig>, ConfigError> {
    if is_blank(config_name) {
        return Err(ConfigError::BlankConfigName);
    }

    // Relative paths run out of ancestors before reaching the filesystem root
    let start = start_dir
        .canonicalize()
        .or_else(|_| std::path::absolute(start_dir))
        .map_err(|source| ConfigError::Io {
            path: start_dir.to_path_buf(),
            source,
        })?;

    for dir in start.ancestors() {
        for file_name in MACROS_RC_FILES {
            let path = dir.join(file_name);
            if !path.is_file() {
                continue;
            }
            let document = read_json(&path)?;
            let config = section(&document, config_name, &path)?.unwrap_or_default();
            tracing::debug!(path = %path.display(), "Loaded macros configuration");
            return Ok(Some(LoadedConfig {
                config,
                source: path,
            }));
        }

        let package_json = dir.join("package.json");
        if package_json.is_file() {
            let document = read_json(&package_json)?;
            if let Some(macros) = document.get(PACKAGE_JSON_KEY) {
                let config = section(macros, config_name, &package_json)?.unwrap_or_default();
                tracing::debug!(path = %package_json.display(), "Loaded macros configuration from package.json");
                return Ok(Some(LoadedConfig {
                    config,
                    source: package_json,
                }));
            }
        }
    }

    Ok(None)
}

fn read_json(path: &Path) -> Result<JsonValue, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn section(document: &JsonValue, key: &str, path: &Path) -> Result<Option<FlavorConfig>, ConfigError> {
    if !document.is_object() {
        return Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        });
    }
    match document.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(value) => FlavorConfig::deserialize(value)
            .map(Some)
            .map_err(|source| ConfigError::InvalidSection {
                path: path.to_path_buf(),
                key: key.to_string(),
                source,
            }),
    }
}
