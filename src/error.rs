//! Error types for network container interface updates

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::{NetworkContainerType, PluginError};

/// Top-level error returned by [`crate::NetworkContainerManager`]
#[derive(Debug, Error)]
pub enum NcError {
    #[error("unable to find CNI plugin at {}, cannot continue", path.display())]
    PluginNotFound { path: PathBuf },

    #[error("IP address in IP configuration of network container {container_id} is empty")]
    EmptyIpAddress { container_id: String },

    #[error("failed to decode {orchestrator} orchestrator context: {source}")]
    OrchestratorContext {
        orchestrator: NetworkContainerType,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("CNI plugin failed: {0}")]
    Plugin(#[from] PluginError),

    #[error("CNI plugin execution failed: {0}")]
    Exec(#[from] ExecError),
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed JSON document: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("network configuration list has no plugins")]
    EmptyPlugins,

    #[error("failed to encode flattened network configuration: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

/// Failures running the plugin process, as opposed to errors the plugin reports
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write network configuration to plugin stdin: {0}")]
    Stdin(#[source] io::Error),

    #[error("failed to read plugin stdout: {0}")]
    Stdout(#[source] io::Error),

    #[error("failed to wait for plugin: {0}")]
    Wait(#[source] io::Error),

    #[error("{} did not exit within {after:?}", path.display())]
    Timeout { path: PathBuf, after: Duration },
}
