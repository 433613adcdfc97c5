//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/deptree/deptree.toml`
//! 3. Local config: `--config <file>` or `./.deptree.toml`
//! 4. Environment variables: `DEPTREE_*` prefix

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::domain::Direction;

/// How trees are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    /// Two-space indentation per level
    #[default]
    Indent,
    /// Box-drawing branches
    Tree,
}

impl fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderStyle::Indent => write!(f, "indent"),
            RenderStyle::Tree => write!(f, "tree"),
        }
    }
}

impl FromStr for RenderStyle {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indent" => Ok(RenderStyle::Indent),
            "tree" => Ok(RenderStyle::Tree),
            other => Err(ApplicationError::Config {
                message: format!("unknown style: {other} (expected indent or tree)"),
            }),
        }
    }
}

fn parse_direction(s: &str) -> Result<Direction, ApplicationError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "ascending" | "asc" => Ok(Direction::Ascending),
        "descending" | "desc" => Ok(Direction::Descending),
        other => Err(ApplicationError::Config {
            message: format!("unknown ordering: {other} (expected ascending or descending)"),
        }),
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified, inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub ordering: Option<Direction>,
    pub style: Option<RenderStyle>,
    pub color: Option<bool>,
}

/// Unified configuration for deptree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Dependency direction of the default element (default: ascending)
    pub ordering: Direction,
    /// Output style for rendered trees (default: indent)
    pub style: RenderStyle,
    /// Colored terminal output (default: true)
    pub color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ordering: Direction::Ascending,
            style: RenderStyle::Indent,
            color: true,
        }
    }
}

/// Get the XDG config directory for deptree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "deptree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("deptree.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".deptree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            ordering: overlay.ordering.unwrap_or(self.ordering),
            style: overlay.style.unwrap_or(self.style),
            color: overlay.color.unwrap_or(self.color),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Explicit local config file; it must exist. When `None`,
    ///   `./.deptree.toml` is used if present.
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/deptree/deptree.toml`
    /// 3. Local config
    /// 4. Environment variables: `DEPTREE_*` prefix
    #[instrument(level = "debug")]
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Local config
        let local_path = match local {
            Some(path) if !path.exists() => {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            Some(path) => Some(path.to_path_buf()),
            None => Some(local_config_path(Path::new("."))).filter(|p| p.exists()),
        };
        if let Some(path) = local_path {
            debug!(path = %path.display(), "loading local config");
            current = current.merge_with(&load_raw_settings(&path)?);
        }

        // 4. Environment variables
        Self::apply_env_overrides(current)
    }

    /// Apply DEPTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("DEPTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;
        Self::apply_overrides(settings, &config)
    }

    /// Apply whatever keys `config` defines on top of `settings`.
    fn apply_overrides(mut settings: Self, config: &Config) -> Result<Self, ApplicationError> {
        if let Ok(val) = config.get_string("ordering") {
            settings.ordering = parse_direction(&val)?;
        }
        if let Ok(val) = config.get_string("style") {
            settings.style = val.parse()?;
        }
        if let Ok(val) = config.get_bool("color") {
            settings.color = val;
        }
        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# deptree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/deptree/deptree.toml
#   Local:  ./.deptree.toml, or the file given with --config
#   Env:    DEPTREE_ORDERING, DEPTREE_STYLE, DEPTREE_COLOR (explicit overrides)

# Which values depend on which:
#   "ascending"  - greater values depend on smaller ones (5 sits above 3)
#   "descending" - smaller values depend on greater ones (3 sits above 5)
# ordering = "ascending"

# Tree output: "indent" (two spaces per level) or "tree" (box drawing)
# style = "indent"

# Colored output (NO_COLOR is honored regardless)
# color = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
