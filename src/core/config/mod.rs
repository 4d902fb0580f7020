//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! Two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Overrides for one clone
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$STEWARD_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/addon-steward/config.toml`
//! 3. `~/.addon-steward/config.toml`
//!
//! # Repo Config Locations
//!
//! Searched in order:
//! 1. `.git/addon-steward/config.toml` (canonical)
//! 2. `.addon-steward.toml` at the work tree root (compatibility, warns)
//!
//! # Example
//!
//! ```no_run
//! use addon_steward::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/path/to/clone"))).unwrap();
//! for branch in result.config.maintainer_check_series() {
//!     println!("also honouring maintainers declared on {}", branch);
//! }
//! ```

pub mod schema;

pub use schema::{ConfigFile, ForgeConfig};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default environment variable holding the API token.
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence automatically: repo overrides global.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: ConfigFile,
    /// Repository configuration (if in a clone)
    pub repo: Option<ConfigFile>,
    global_path: Option<PathBuf>,
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `work_dir` is provided, also loads the repo-scoped config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or
    /// hold invalid values. Missing files are not an error.
    pub fn load(work_dir: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        Self::load_from(Self::find_global().as_deref(), work_dir)
    }

    /// Load configuration from an explicit global file and optional clone.
    pub fn load_from(
        global_file: Option<&Path>,
        work_dir: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let global = match global_file {
            Some(path) => Self::read_file(path)?,
            None => ConfigFile::default(),
        };

        let (repo, repo_path) = match work_dir {
            Some(dir) => Self::load_repo(dir, &mut warnings)?,
            None => (None, None),
        };

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        Ok(ConfigLoadResult {
            config: Config {
                global,
                repo,
                global_path: global_file.map(Path::to_path_buf),
                repo_path,
            },
            warnings,
        })
    }

    /// Build a configuration from already parsed files.
    pub fn from_files(global: ConfigFile, repo: Option<ConfigFile>) -> Self {
        Self {
            global,
            repo,
            global_path: None,
            repo_path: None,
        }
    }

    /// Locate the global config file, if any.
    fn find_global() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("STEWARD_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("addon-steward/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".addon-steward/config.toml"))
            .filter(|path| path.exists())
    }

    fn load_repo(
        work_dir: &Path,
        warnings: &mut Vec<ConfigWarning>,
    ) -> Result<(Option<ConfigFile>, Option<PathBuf>), ConfigError> {
        let canonical = Self::repo_config_path(work_dir);
        if canonical.exists() {
            let config = Self::read_file(&canonical)?;
            return Ok((Some(config), Some(canonical)));
        }

        let compat = work_dir.join(".addon-steward.toml");
        if compat.exists() {
            warnings.push(ConfigWarning {
                message: format!(
                    "Using work tree config location. Please move to '{}'",
                    canonical.display()
                ),
                path: compat.clone(),
            });
            let config = Self::read_file(&compat)?;
            return Ok((Some(config), Some(compat)));
        }

        Ok((None, None))
    }

    fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Canonical repo config path for a clone.
    pub fn repo_config_path(work_dir: &Path) -> PathBuf {
        work_dir.join(".git/addon-steward/config.toml")
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    fn pick<'a, T: ?Sized>(&'a self, get: impl Fn(&'a ConfigFile) -> Option<&'a T>) -> Option<&'a T> {
        self.repo.as_ref().and_then(&get).or_else(|| get(&self.global))
    }

    fn pick_forge(&self, get: impl Fn(&ForgeConfig) -> Option<&str>) -> Option<&str> {
        self.pick(|c| c.forge.as_ref().and_then(&get))
    }

    /// Extra release branches to check for maintainer declarations.
    ///
    /// Defaults to none.
    pub fn maintainer_check_series(&self) -> &[String] {
        self.pick(|c| c.maintainer_check_series.as_deref())
            .unwrap_or(&[])
    }

    /// Comment template for addons nobody maintains.
    pub fn adopt_an_addon_mention(&self) -> Option<&str> {
        self.pick(|c| c.adopt_an_addon_mention.as_deref())
    }

    /// Repository owner on the forge.
    pub fn forge_owner(&self) -> Option<&str> {
        self.pick_forge(|f| f.owner.as_deref())
    }

    /// Repository name on the forge.
    pub fn forge_repo(&self) -> Option<&str> {
        self.pick_forge(|f| f.repo.as_deref())
    }

    /// Forge API base URL. Defaults to the public GitHub API.
    pub fn api_base(&self) -> &str {
        self.pick_forge(|f| f.api_base.as_deref())
            .unwrap_or(DEFAULT_API_BASE)
    }

    /// Environment variable that holds the forge token. Defaults to `GITHUB_TOKEN`.
    pub fn token_env(&self) -> &str {
        self.pick_forge(|f| f.token_env.as_deref())
            .unwrap_or(DEFAULT_TOKEN_ENV)
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}
