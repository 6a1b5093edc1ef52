//! Network container interface updates through a CNI plugin
//!
//! This crate turns a network container request into a single CNI plugin call:
//! - Flattens the on-disk network configuration list for one plugin
//! - Builds the `CNI_*` environment for the plugin process
//! - Runs the plugin with a deadline and classifies how it finished

pub mod commands;
pub mod config;
pub mod error;
pub mod iface;
pub mod plugin;
pub mod types;

// Re-export commonly used items
pub use commands::{InterfaceOutcome, NetworkContainerManager, SkipReason};
pub use config::{NcConfig, NetConfList};
pub use error::{ConfigError, ExecError, NcError};
pub use types::{NetworkContainerRequest, PluginError, PodInfo, PodSandbox};
