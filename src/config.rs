//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/webgl-export/webgl-export.toml`
//! 3. Local config: `<project_dir>/.webgl-export.toml`
//! 4. Environment variables: `WEBGL_EXPORT_*` prefix, `__` for nesting
//!    (`WEBGL_EXPORT_RENDER__TITLE`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::services::{DEFAULT_SCRIPT_URL, DEFAULT_TITLE};
use crate::application::ApplicationError;
use crate::domain::SelfParentPolicy;

const APP_NAME: &str = "webgl-export";

/// HTML template parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    /// Document `<title>`
    pub title: String,
    /// Location of the XTK script
    pub script_url: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.into(),
            script_url: DEFAULT_SCRIPT_URL.into(),
        }
    }
}

/// Raw render config for intermediate parsing (`None` → inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRenderConfig {
    pub title: Option<String>,
    pub script_url: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub output: Option<PathBuf>,
    pub viewport: Option<usize>,
    pub self_parent: Option<SelfParentPolicy>,
    pub render: RawRenderConfig,
}

/// Unified configuration for webgl-export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Default output document (default: scene.html)
    pub output: PathBuf,
    /// 3D viewport whose camera and background are exported (default: 0)
    pub viewport: usize,
    /// Handling of nodes that name themselves as parent
    pub self_parent: SelfParentPolicy,
    /// HTML template settings
    pub render: RenderConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output: PathBuf::from("scene.html"),
            viewport: 0,
            self_parent: SelfParentPolicy::Skip,
            render: RenderConfig::default(),
        }
    }
}

/// Get the XDG config directory for webgl-export.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(format!("{APP_NAME}.toml")))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(format!(".{APP_NAME}.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
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
    /// Overlay wins wherever it says something.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            output: overlay.output.clone().unwrap_or_else(|| self.output.clone()),
            viewport: overlay.viewport.unwrap_or(self.viewport),
            self_parent: overlay.self_parent.unwrap_or(self.self_parent),
            render: RenderConfig {
                title: overlay
                    .render
                    .title
                    .clone()
                    .unwrap_or_else(|| self.render.title.clone()),
                script_url: overlay
                    .render
                    .script_url
                    .clone()
                    .unwrap_or_else(|| self.render.script_url.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional directory holding a local `.webgl-export.toml`
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        Self::load_from(global.as_deref(), project_dir)
    }

    /// Like [`Settings::load`] with an explicit global config file.
    pub fn load_from(global: Option<&Path>, project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global {
            let raw = load_raw_settings(global_path)?;
            current = current.merge_with(&raw);
        }

        // 3. Local project config
        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.output = PathBuf::from(expand_env_vars(&current.output.to_string_lossy()));

        Ok(current)
    }

    /// Apply WEBGL_EXPORT_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("WEBGL_EXPORT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("output") {
            settings.output = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("viewport") {
            settings.viewport = val.parse().map_err(|_| ApplicationError::Config {
                message: format!("WEBGL_EXPORT_VIEWPORT: not a viewport index: {}", val),
            })?;
        }
        if let Ok(val) = config.get_string("self_parent") {
            settings.self_parent = match val.to_lowercase().as_str() {
                "skip" => SelfParentPolicy::Skip,
                "reject" => SelfParentPolicy::Reject,
                other => {
                    return Err(ApplicationError::Config {
                        message: format!("WEBGL_EXPORT_SELF_PARENT: expected skip|reject, got {}", other),
                    })
                }
            };
        }
        if let Ok(val) = config.get_string("render.title") {
            settings.render.title = val;
        }
        if let Ok(val) = config.get_string("render.script_url") {
            settings.render.script_url = val;
        }

        Ok(settings)
    }

    /// Render as TOML for `config show`.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }
}
