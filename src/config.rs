//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/costtree/costtree.toml`
//! 3. Local config: `<data_dir>/.costtree.toml` (next to the snapshot files)
//! 4. Environment variables: `COSTTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{NumberFormat, NEUTRAL_STATUS};

/// Raw number format for intermediate parsing (None → inherit from base).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawNumberFormat {
    pub symbol: Option<String>,
    pub thousands_separator: Option<String>,
    pub decimal_separator: Option<String>,
    pub decimals: Option<usize>,
    pub quantity_decimals: Option<usize>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_dir: Option<PathBuf>,
    pub strict: Option<bool>,
    pub neutral_status: Option<String>,
    pub format: RawNumberFormat,
}

/// Unified configuration for costtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Snapshot directory used when `-C` is not given
    pub data_dir: Option<PathBuf>,
    /// Fail on unresolvable parent references instead of attaching to the budget root
    pub strict: bool,
    /// Status flag that suppresses level coloring
    pub neutral_status: String,
    /// Currency and quantity formatting
    pub format: NumberFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            strict: false,
            neutral_status: NEUTRAL_STATUS.to_string(),
            format: NumberFormat::default(),
        }
    }
}

/// Get the XDG config directory for costtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "costtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("costtree.toml"))
}

/// Get the path to the local config file in a snapshot directory.
pub fn local_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(".costtree.toml")
}

/// Expand `~`, `$VAR` and `${VAR}`; unexpandable input is returned unchanged.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
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

impl NumberFormat {
    /// Overlay wins for every field it specifies.
    fn merge(&self, overlay: &RawNumberFormat) -> Self {
        Self {
            symbol: overlay.symbol.clone().unwrap_or_else(|| self.symbol.clone()),
            thousands_separator: overlay
                .thousands_separator
                .clone()
                .unwrap_or_else(|| self.thousands_separator.clone()),
            decimal_separator: overlay
                .decimal_separator
                .clone()
                .unwrap_or_else(|| self.decimal_separator.clone()),
            decimals: overlay.decimals.unwrap_or(self.decimals),
            quantity_decimals: overlay.quantity_decimals.unwrap_or(self.quantity_decimals),
        }
    }
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(dir) = &self.data_dir {
            self.data_dir = Some(expand_path(dir));
        }
    }

    /// Merge overlay config onto self (base); scalars in overlay win.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_dir: overlay.data_dir.clone().or_else(|| self.data_dir.clone()),
            strict: overlay.strict.unwrap_or(self.strict),
            neutral_status: overlay
                .neutral_status
                .clone()
                .unwrap_or_else(|| self.neutral_status.clone()),
            format: self.format.merge(&overlay.format),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `data_dir` - Optional snapshot directory holding a local `.costtree.toml`
    pub fn load(data_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_with_global(global_config_path().as_deref(), data_dir)
    }

    /// Same as [`load`](Self::load) with an explicit global config file.
    pub fn load_with_global(
        global_path: Option<&Path>,
        data_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_path {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config next to the snapshot
        if let Some(dir) = data_dir {
            let local_path = local_config_path(&expand_path(dir));
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        let env = Config::builder()
            .add_source(
                Environment::with_prefix("COSTTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;
        current = Self::apply_overrides(current, &env);

        current.expand_paths();

        Ok(current)
    }

    /// Apply values present in `config` as explicit overrides.
    ///
    /// Keys follow the TOML layout (`data_dir`, `format.symbol`, ...).
    fn apply_overrides(mut settings: Self, config: &Config) -> Self {
        if let Ok(val) = config.get_string("data_dir") {
            settings.data_dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_bool("strict") {
            settings.strict = val;
        }
        if let Ok(val) = config.get_string("neutral_status") {
            settings.neutral_status = val;
        }
        if let Ok(val) = config.get_string("format.symbol") {
            settings.format.symbol = val;
        }
        if let Ok(val) = config.get_string("format.thousands_separator") {
            settings.format.thousands_separator = val;
        }
        if let Ok(val) = config.get_string("format.decimal_separator") {
            settings.format.decimal_separator = val;
        }
        if let Ok(val) = config.get::<usize>("format.decimals") {
            settings.format.decimals = val;
        }
        if let Ok(val) = config.get::<usize>("format.quantity_decimals") {
            settings.format.quantity_decimals = val;
        }
        settings
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# costtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/costtree/costtree.toml
#   Local:  <data_dir>/.costtree.toml   (next to the snapshot files)
#   Env:    COSTTREE_* environment variables, nested keys with "__"
#           e.g. COSTTREE_FORMAT__SYMBOL='$'

# Snapshot directory used when -C is not given
# data_dir = "~/budgets/current"

# Fail on parent references that do not resolve inside the same budget
# strict = false

# Status flag that suppresses level coloring
# neutral_status = "N"

[format]
# symbol = "R$"
# thousands_separator = "."
# decimal_separator = ","
# decimals = 2
# quantity_decimals = 2
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
