use itertools::Itertools;
use std::fmt;
use std::path::Path;

/// CNI operation passed in `CNI_COMMAND`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CniCommand {
    Add,
    Del,
    Check,
    Update,
}

impl CniCommand {
    /// Value of `CNI_COMMAND` for this operation
    pub fn as_str(&self) -> &'static str {
        match self {
            CniCommand::Add => "ADD",
            CniCommand::Del => "DEL",
            CniCommand::Check => "CHECK",
            CniCommand::Update => "UPDATE",
        }
    }
}

impl fmt::Display for CniCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one plugin invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConf {
    /// Container ID
    pub container_id: String,
    /// Network namespace path
    pub netns: String,
    /// Interface name
    pub ifname: String,
    /// Ordered plugin arguments
    pub args: Vec<(String, String)>,
}

/// Build the runtime configuration for a pod interface
pub fn build_runtime_conf(
    pod_name: &str,
    pod_namespace: &str,
    sandbox_id: &str,
    netns_path: &str,
    ifname: &str,
) -> RuntimeConf {
    RuntimeConf {
        container_id: sandbox_id.to_string(),
        netns: netns_path.to_string(),
        ifname: ifname.to_string(),
        args: vec![
            ("K8S_POD_NAMESPACE".to_string(), pod_namespace.to_string()),
            ("K8S_POD_NAME".to_string(), pod_name.to_string()),
        ],
    }
}

/// Environment contract of a plugin call
#[derive(Debug, Clone)]
pub struct PluginArgs<'a> {
    pub command: CniCommand,
    pub runtime: &'a RuntimeConf,
    /// Plugin search path
    pub path: &'a Path,
}

impl<'a> PluginArgs<'a> {
    /// Bundle the operation, runtime identity and plugin search path of one call
    pub fn new(command: CniCommand, runtime: &'a RuntimeConf, path: &'a Path) -> Self {
        Self { command, runtime, path }
    }

    /// `CNI_*` variables in the order they are set on the child
    pub fn as_env(&self) -> Vec<(String, String)> {
        vec![
            ("CNI_COMMAND".to_string(), self.command.to_string()),
            ("CNI_CONTAINERID".to_string(), self.runtime.container_id.clone()),
            ("CNI_NETNS".to_string(), self.runtime.netns.clone()),
            ("CNI_ARGS".to_string(), format_cni_args(&self.runtime.args)),
            ("CNI_IFNAME".to_string(), self.runtime.ifname.clone()),
            ("CNI_PATH".to_string(), self.path.display().to_string()),
        ]
    }
}

/// Render argument pairs as `K1=V1;K2=V2`
pub fn format_cni_args(args: &[(String, String)]) -> String {
    args.iter().map(|(key, value)| format!("{}={}", key, value)).join(";")
}
