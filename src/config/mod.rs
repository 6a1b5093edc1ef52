use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub mod conflist;

pub use conflist::{load_flat_conf, NetConfList};

/// Prefix of environment variables that override [`NcConfig`] fields
pub const ENV_PREFIX: &str = "NC_CNI_";

/// Locations and limits used when driving the CNI plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NcConfig {
    /// CNI bin directory, also handed to the plugin as `CNI_PATH`
    pub cni_bin_dir: PathBuf,
    /// Plugin binary name inside `cni_bin_dir`
    pub plugin_name: String,
    /// Network configuration list fed to the plugin
    pub conflist_path: PathBuf,
    /// Directory listing host interfaces
    pub sys_net_dir: PathBuf,
    /// Upper bound on a single plugin run; `None` or zero waits for the plugin indefinitely
    pub plugin_timeout_secs: Option<u64>,
}

impl Default for NcConfig {
    fn default() -> Self {
        Self {
            cni_bin_dir: PathBuf::from("/opt/cni/bin"),
            plugin_name: "azure-vnet".to_string(),
            conflist_path: PathBuf::from("/etc/cni/net.d/10-azure.conflist"),
            sys_net_dir: PathBuf::from("/sys/class/net"),
            plugin_timeout_secs: Some(60),
        }
    }
}

impl NcConfig {
    /// Load configuration from a JSON file; absent fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&content).map_err(ConfigError::Parse)
    }

    /// Apply `NC_CNI_*` overrides from the process environment
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` to resolve variable names
    pub fn apply_env_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(dir) = var("BIN_DIR") {
            self.cni_bin_dir = PathBuf::from(dir);
        }
        if let Some(name) = var("PLUGIN") {
            self.plugin_name = name;
        }
        if let Some(path) = var("CONFLIST") {
            self.conflist_path = PathBuf::from(path);
        }
        if let Some(dir) = var("SYS_NET_DIR") {
            self.sys_net_dir = PathBuf::from(dir);
        }
        if let Some(secs) = var("PLUGIN_TIMEOUT_SECS") {
            self.plugin_timeout_secs = match secs.trim() {
                "" | "0" => None,
                value => Some(value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: format!("{}PLUGIN_TIMEOUT_SECS", ENV_PREFIX),
                    value: secs.clone(),
                })?),
            };
        }

        Ok(self)
    }

    /// Full path of the plugin binary
    pub fn plugin_path(&self) -> PathBuf {
        self.cni_bin_dir.join(&self.plugin_name)
    }

    /// Deadline for one plugin run; zero seconds means no deadline, as with the env override
    pub fn plugin_timeout(&self) -> Option<Duration> {
        self.plugin_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
