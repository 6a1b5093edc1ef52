//! Network configuration lists and their single-plugin flattening.
//!
//! A `.conflist` file describes a chain of plugins:
//!
//! ```json
//! {"cniVersion": "0.4.0", "name": "azure", "plugins": [{"type": "vnet"}]}
//! ```
//!
//! Invoking one plugin directly needs a single network configuration instead,
//! so the first plugin entry is taken and the list-level `cniVersion` and
//! `name` are copied into it.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::ConfigError;

/// Parsed network configuration list
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NetConfList {
    #[serde(rename = "cniVersion")]
    pub cni_version: String,
    pub name: String,
    /// Plugin entries, kept opaque
    pub plugins: Vec<Map<String, Value>>,
}

impl NetConfList {
    /// Parse and check the list shape. Missing or mistyped `cniVersion`, `name`
    /// or `plugins`, and an empty plugin list, are rejected here.
    pub fn parse(bytes: &[u8]) -> Result<Self, ConfigError> {
        let list: NetConfList = serde_json::from_slice(bytes).map_err(ConfigError::Parse)?;
        if list.plugins.is_empty() {
            return Err(ConfigError::EmptyPlugins);
        }
        Ok(list)
    }

    /// First plugin entry with the list version and name merged in
    pub fn flatten(&self) -> Result<Map<String, Value>, ConfigError> {
        let mut flat = self.plugins.first().cloned().ok_or(ConfigError::EmptyPlugins)?;
        flat.insert("cniVersion".to_string(), Value::String(self.cni_version.clone()));
        flat.insert("name".to_string(), Value::String(self.name.clone()));
        Ok(flat)
    }

    /// Flattened configuration as the bytes written to the plugin
    pub fn to_flat_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        serde_json::to_vec(&self.flatten()?).map_err(ConfigError::Encode)
    }
}

/// Read the list at `path` and return its flattened form
pub fn load_flat_conf(path: &Path) -> Result<Vec<u8>, ConfigError> {
    let content = fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let list = NetConfList::parse(&content)?;
    debug!(
        path = %path.display(),
        name = %list.name,
        plugins = list.plugins.len(),
        "loaded network configuration list"
    );
    list.to_flat_bytes()
}
