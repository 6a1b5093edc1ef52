//! CNI plugin invocation: environment contract, process execution and
//! classification of the plugin's outcome.

pub mod args;
pub mod exec;

pub use args::{build_runtime_conf, format_cni_args, CniCommand, PluginArgs, RuntimeConf};
pub use exec::{interpret, plugin_error, PluginExec, PluginOutput, ProcessExec};
