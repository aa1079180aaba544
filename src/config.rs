use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Start-up configuration of the platform layer.
///
/// Every field has a default, so a host may deserialize a partial JSON
/// document or simply use [`PlatformConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Application name used for the settings directory and window titles.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Environment variable overriding the per-user configuration directory.
    #[serde(default = "default_config_env_var")]
    pub config_env_var: String,
    /// When enabled the logger is initialised at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional log file written alongside stderr output.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Socket of the space mouse daemon.
    #[serde(default = "default_spnav_socket")]
    pub spnav_socket: PathBuf,
    /// Initial inner size of the first window in points.
    #[serde(default = "default_initial_size")]
    pub initial_size: (f32, f32),
    /// PNG file used as the window icon.
    #[serde(default)]
    pub icon: Option<PathBuf>,
}

fn default_app_name() -> String {
    "SolveSpace".into()
}

fn default_config_env_var() -> String {
    "XDG_CONFIG_HOME".into()
}

fn default_spnav_socket() -> PathBuf {
    PathBuf::from("/var/run/spnav.sock")
}

fn default_initial_size() -> (f32, f32) {
    (910.0, 680.0)
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            config_env_var: default_config_env_var(),
            debug_logging: false,
            log_file: None,
            spnav_socket: default_spnav_socket(),
            initial_size: default_initial_size(),
            icon: None,
        }
    }
}

impl PlatformConfig {
    /// Load the configuration from a JSON file. A missing file yields the
    /// defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read platform config {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("deserialize platform config {}", path.display()))
    }
}
