use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::graph::TruncationCaps;

/// Typed validation failures for configuration values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A truncation cap was set to zero.
    #[error("truncate.{field} must be at least 1 (got 0)")]
    ZeroCap { field: &'static str },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub truncate: TruncateConfig,
}

/// Consumer-side truncation policy. The core itself treats missing caps as
/// unbounded; this is where the transport defaults live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncateConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_nodes")]
    pub max_nodes: Option<usize>,
    #[serde(default = "default_max_edges")]
    pub max_edges: Option<usize>,
}

impl Default for TruncateConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            max_nodes: default_max_nodes(),
            max_edges: default_max_edges(),
        }
    }
}

impl TruncateConfig {
    /// Validated caps for [`crate::truncate`]. Disabled truncation is unbounded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCap`] if either cap is zero.
    pub fn caps(&self) -> Result<TruncationCaps, ConfigError> {
        if !self.enabled {
            return Ok(TruncationCaps::unbounded());
        }
        if self.max_nodes == Some(0) {
            return Err(ConfigError::ZeroCap { field: "max_nodes" });
        }
        if self.max_edges == Some(0) {
            return Err(ConfigError::ZeroCap { field: "max_edges" });
        }
        Ok(TruncationCaps::new(self.max_nodes, self.max_edges))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

#[must_use]
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".flowmap/config.toml")
}

#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("flowmap/config.toml"))
}

pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_config_path(project_root);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(path) = user_config_path() else {
        return Ok(UserConfig::default());
    };
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load both config layers and resolve the output mode.
///
/// `cli_output` is the mode already chosen on the command line (`--format`,
/// else `--json`); it wins over `FORMAT`, the user config and the TTY check.
pub fn resolve_config(project_root: &Path, cli_output: Option<&str>) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(
        cli_output,
        user.output.clone(),
        env_format,
        std::io::stdout().is_terminal(),
    );

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
    })
}

/// Normalize an output mode name, accepting legacy aliases.
#[must_use]
pub fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "table" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

fn resolve_output(
    cli_output: Option<&str>,
    user_output: Option<String>,
    env_format: Option<String>,
    is_tty: bool,
) -> String {
    if let Some(mode) = cli_output.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    let fallback = if is_tty { "pretty" } else { "text" };
    fallback.to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_max_nodes() -> Option<usize> {
    Some(300)
}

const fn default_max_edges() -> Option<usize> {
    Some(600)
}
