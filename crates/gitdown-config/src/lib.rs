//! Configuration management for gitdown.
//!
//! Parses `gitdown.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [gitdown]
//! base_directory = "."
//!
//! [engine]
//! max_passes = 10000
//!
//! [variables.project]
//! name = "gitdown"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `gitdown.base_directory`
//! - every string under `[variables]`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the base directory for relative file resolution.
    pub base_directory: Option<PathBuf>,
    /// Override the pass ceiling (`0` disables it).
    pub max_passes: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "gitdown.toml";

/// Default ceiling on resolution passes.
const DEFAULT_MAX_PASSES: usize = 10_000;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings (paths are relative strings from TOML).
    gitdown: GitdownConfigRaw,
    /// Resolution engine settings.
    pub engine: EngineSettings,
    /// Variables table as parsed from TOML.
    variables: toml::Table,

    /// Resolved base directory (set after loading).
    #[serde(skip)]
    pub base_directory: PathBuf,
    /// Variables flattened to dotted names (set after loading).
    #[serde(skip)]
    pub variables_resolved: BTreeMap<String, String>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw general configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct GitdownConfigRaw {
    base_directory: Option<String>,
}

/// Resolution engine settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Maximum number of resolution passes; `0` disables the limit.
    pub max_passes: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl EngineSettings {
    /// Pass ceiling, or `None` when disabled.
    #[must_use]
    pub fn pass_limit(&self) -> Option<usize> {
        (self.max_passes > 0).then_some(self.max_passes)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`gitdown.base_directory`").
        field: String,
        /// Error message from the lookup.
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `gitdown.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Look up a flattened variable by dotted name.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables_resolved.get(name).map(String::as_str)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(base_directory) = &settings.base_directory {
            self.base_directory.clone_from(base_directory);
        }
        if let Some(max_passes) = settings.max_passes {
            self.engine.max_passes = max_passes;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            gitdown: GitdownConfigRaw::default(),
            engine: EngineSettings::default(),
            variables: toml::Table::new(),
            base_directory: base.to_path_buf(),
            variables_resolved: BTreeMap::new(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.variables_resolved = flatten_variables(&config.variables)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base_directory) = &self.gitdown.base_directory {
            require_non_empty(base_directory, "gitdown.base_directory")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref base_directory) = self.gitdown.base_directory {
            self.gitdown.base_directory = Some(expand::expand_env(
                base_directory,
                "gitdown.base_directory",
            )?);
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.base_directory = match &self.gitdown.base_directory {
            Some(dir) => config_dir.join(dir),
            None => config_dir.to_path_buf(),
        };
    }
}

/// Flatten the `[variables]` table to dotted names.
///
/// Nested tables extend the name with `.`; scalar values are stringified and
/// strings are environment-expanded. Arrays are not addressable and are skipped.
fn flatten_variables(table: &toml::Table) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut flat = BTreeMap::new();
    flatten_into(&mut flat, "", table)?;
    Ok(flat)
}

fn flatten_into(
    flat: &mut BTreeMap<String, String>,
    prefix: &str,
    table: &toml::Table,
) -> Result<(), ConfigError> {
    for (key, value) in table {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        let rendered = match value {
            toml::Value::Table(nested) => {
                flatten_into(flat, &name, nested)?;
                continue;
            }
            toml::Value::Array(_) => continue,
            toml::Value::String(s) => expand::expand_env(s, &format!("variables.{name}"))?,
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            toml::Value::Datetime(d) => d.to_string(),
        };

        flat.insert(name, rendered);
    }
    Ok(())
}
