//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/atree/atree.toml`
//! 3. Local config: `<dir>/.atree.toml` (working directory by default)
//! 4. Environment variables: `ATREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{AND_EDGE_COLOR, DEFAULT_ROOT_NAME};

/// Name of the per-directory config file.
pub const LOCAL_CONFIG_FILE: &str = ".atree.toml";

/// Unified configuration for atree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Attack tree document (default: config/attack_tree_data.json)
    pub document_path: PathBuf,
    /// Directory for `export` output (default: export)
    pub export_dir: PathBuf,
    /// Name of the root node in a freshly created document
    pub root_name: String,
    /// Color of edges added without an explicit color
    pub edge_color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            document_path: PathBuf::from("config").join("attack_tree_data.json"),
            export_dir: PathBuf::from("export"),
            root_name: DEFAULT_ROOT_NAME.to_string(),
            edge_color: AND_EDGE_COLOR.to_string(),
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub document_path: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub root_name: Option<String>,
    pub edge_color: Option<String>,
}

/// Get the XDG config directory for atree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "atree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("atree.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_FILE)
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

fn expand(value: &str) -> String {
    shellexpand::full(value)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    ///
    /// Handles `~`, `$VAR`, and `${VAR}` syntax. Unknown variables are left as is.
    fn expand_paths(&mut self) {
        self.document_path = PathBuf::from(expand(&self.document_path.to_string_lossy()));
        self.export_dir = PathBuf::from(expand(&self.export_dir.to_string_lossy()));
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            document_path: overlay
                .document_path
                .clone()
                .unwrap_or_else(|| self.document_path.clone()),
            export_dir: overlay
                .export_dir
                .clone()
                .unwrap_or_else(|| self.export_dir.clone()),
            root_name: overlay
                .root_name
                .clone()
                .unwrap_or_else(|| self.root_name.clone()),
            edge_color: overlay
                .edge_color
                .clone()
                .unwrap_or_else(|| self.edge_color.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Directory searched for `.atree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), local_dir)
    }

    /// Like [`Settings::load`] with an explicit global config file.
    pub fn load_from(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_path {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply ATREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("ATREE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("document_path") {
            settings.document_path = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("export_dir") {
            settings.export_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("root_name") {
            settings.root_name = val;
        }
        if let Ok(val) = config.get_string("edge_color") {
            settings.edge_color = val;
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
        r#"# atree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/atree/atree.toml
#   Local:  ./.atree.toml
#   Env:    ATREE_* environment variables (e.g. ATREE_DOCUMENT_PATH)

# Attack tree document, rewritten on every change
# document_path = "config/attack_tree_data.json"

# Target directory of `atree export`
# export_dir = "export"

# Name of the root node when a new document is created
# root_name = "Node"

# Color of edges added without --color
# edge_color = "black"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_config_files_when_loading_then_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");

        let settings = Settings::load_from(None, Some(dir.path())).expect("load defaults");

        assert!(settings.document_path.ends_with("attack_tree_data.json"));
        assert_eq!(settings.root_name, "Node");
        assert_eq!(settings.edge_color, "black");
    }

    #[test]
    fn given_tilde_in_document_path_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            document_path: PathBuf::from("~/trees/web.json"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let path = settings.document_path.to_string_lossy();
        assert!(path.starts_with(&home), "should start with home dir: {path}");
        assert!(!path.contains('~'), "should not contain tilde: {path}");
    }

    #[test]
    fn given_env_var_in_export_dir_when_expand_paths_then_expands_variable() {
        let mut settings = Settings {
            export_dir: PathBuf::from("${HOME}/exports"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.export_dir.to_string_lossy().starts_with(&home));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_keep_base() {
        let base = Settings::default();
        let overlay = RawSettings {
            root_name: Some("Steal data".into()),
            ..RawSettings::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.root_name, "Steal data");
        assert_eq!(merged.document_path, base.document_path);
        assert_eq!(merged.edge_color, base.edge_color);
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.document_path.is_none());
    }
}
