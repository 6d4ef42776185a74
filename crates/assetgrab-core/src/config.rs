use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::extract::{DEFAULT_ATTRIBUTE, DEFAULT_VALUE_PATTERN};
use crate::fetch::{FetchOptions, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};

/// Global configuration loaded from `~/.config/assetgrab/config.toml`.
/// Command-line flags override these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabConfig {
    /// Seconds without progress (or to connect) before a request is abandoned.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Receive buffer size in bytes, clamped to 1024..=524288.
    pub chunk_size: usize,
    pub max_redirects: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Attribute whose values are matched (e.g. `src`).
    pub attribute: String,
    /// Regex the whole attribute value must match.
    pub pattern: String,
    pub output_dir: PathBuf,
    /// Where `grab` records discovered filenames (none = don't record).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
    /// Force downloaded files to this extension (e.g. `cgi`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl Default for GrabConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 10,
            chunk_size: 8192,
            max_redirects: 10,
            user_agent: None,
            attribute: DEFAULT_ATTRIBUTE.to_string(),
            pattern: DEFAULT_VALUE_PATTERN.to_string(),
            output_dir: PathBuf::from("."),
            manifest: None,
            extension: None,
        }
    }
}

impl GrabConfig {
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs.max(1)),
            chunk_size: self.chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE),
            max_redirects: self.max_redirects,
            user_agent: self.user_agent.clone(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("assetgrab")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GrabConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = GrabConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: GrabConfig =
        toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}
