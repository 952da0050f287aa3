//! Configuration management for wr.
//!
//! Parses `wr.toml` with serde and discovers it in the current directory or
//! its parents. [`CliSettings`] override file values after loading.
//!
//! ```toml
//! [cache]
//! enabled = true
//! dir = "${WR_CACHE_DIR:-.wr/cache}"
//! documents = ["^Main\\.", "^Help\\."]
//!
//! [render]
//! default_action = "view"
//! default_locale = "en"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields: `cache.dir`, `cache.version`, `render.default_locale`.

mod expand;

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "wr.toml";

/// Default cache directory, relative to the config file.
const DEFAULT_CACHE_DIR: &str = ".wr/cache";

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub cache_enabled: Option<bool>,
    pub cache_dir: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cache section as written in TOML.
    cache: CacheConfigRaw,
    pub render: RenderConfig,

    /// Resolved cache configuration (set after loading).
    #[serde(skip)]
    pub cache_resolved: CacheConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CacheConfigRaw {
    enabled: Option<bool>,
    dir: Option<String>,
    documents: Vec<String>,
    version: Option<String>,
}

/// Resolved rendering cache configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Absolute cache directory.
    pub dir: PathBuf,
    /// Patterns selecting cacheable documents; empty caches every document.
    pub documents: Vec<String>,
    /// Entries written under another version are discarded.
    pub version: String,
}

impl CacheConfig {
    fn with_base(base: &Path) -> Self {
        Self {
            enabled: true,
            dir: base.join(DEFAULT_CACHE_DIR),
            documents: Vec::new(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }

    /// Compile the document patterns.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the first invalid pattern.
    pub fn document_patterns(&self) -> Result<Vec<Regex>, ConfigError> {
        self.documents
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    ConfigError::Validation(format!("cache.documents: invalid pattern {pattern:?}: {e}"))
                })
            })
            .collect()
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::with_base(Path::new("."))
    }
}

/// Rendering defaults for requests that do not specify them.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub default_action: String,
    pub default_locale: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_action: "view".to_owned(),
            default_locale: String::new(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`cache.dir`").
        field: String,
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `wr.toml` in the current directory and its parents, falling back
    /// to defaults relative to the current directory.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, or if parsing,
    /// expansion or validation fails.
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

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(enabled) = settings.cache_enabled {
            self.cache_resolved.enabled = enabled;
        }
        if let Some(dir) = &settings.cache_dir {
            self.cache_resolved.dir.clone_from(dir);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        Self::discover_from(&cwd)
    }

    fn discover_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.is_file())
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            cache: CacheConfigRaw::default(),
            render: RenderConfig::default(),
            cache_resolved: CacheConfig::with_base(base),
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values. Called automatically after loading
    /// from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.render.default_action, "render.default_action")?;
        require_non_empty(&self.cache_resolved.version, "cache.version")?;
        self.cache_resolved.document_patterns()?;
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.cache.dir {
            self.cache.dir = Some(expand::expand_env(dir, "cache.dir")?);
        }
        if let Some(version) = &self.cache.version {
            self.cache.version = Some(expand::expand_env(version, "cache.version")?);
        }
        self.render.default_locale =
            expand::expand_env(&self.render.default_locale, "render.default_locale")?;
        Ok(())
    }

    /// Resolve the cache section against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = CacheConfig::with_base(config_dir);
        self.cache_resolved = CacheConfig {
            enabled: self.cache.enabled.unwrap_or(defaults.enabled),
            dir: self
                .cache
                .dir
                .as_deref()
                .map_or(defaults.dir, |dir| config_dir.join(dir)),
            documents: self.cache.documents.clone(),
            version: self.cache.version.clone().unwrap_or(defaults.version),
        };
    }
}
