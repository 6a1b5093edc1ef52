use std::fs;
use std::io;
use tracing::{debug, error, info, warn};

use crate::config::{load_flat_conf, NcConfig};
use crate::error::NcError;
use crate::iface::{InterfaceProbe, SysfsProbe};
use crate::plugin::{build_runtime_conf, interpret, CniCommand, PluginArgs, PluginExec, ProcessExec};
use crate::types::{NetworkContainerRequest, NetworkContainerType, PodSandbox};

/// Why a request finished without running the plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Interfaces of this orchestrator are not managed here
    UnsupportedOrchestrator(NetworkContainerType),
    /// No interface exists yet; only updates are handled
    InterfaceNotFound,
}

/// Successful result of a lifecycle call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceOutcome {
    Updated,
    Skipped(SkipReason),
}

/// Updates network container interfaces through the CNI plugin.
///
/// Every call is a single blocking plugin run on the calling thread; callers
/// that need to stay responsive run it on a worker of their choosing.
/// Overlapping calls for the same container are not serialized.
pub struct NetworkContainerManager {
    config: NcConfig,
    probe: Box<dyn InterfaceProbe>,
    exec: Box<dyn PluginExec>,
}

impl NetworkContainerManager {
    /// Create a manager that probes sysfs and runs the plugin as a child process
    pub fn new(config: NcConfig) -> Self {
        let probe = SysfsProbe::new(config.sys_net_dir.clone());
        Self {
            config,
            probe: Box::new(probe),
            exec: Box::new(ProcessExec),
        }
    }

    pub fn with_probe(mut self, probe: impl InterfaceProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    pub fn with_executor(mut self, exec: impl PluginExec + 'static) -> Self {
        self.exec = Box::new(exec);
        self
    }

    pub fn config(&self) -> &NcConfig {
        &self.config
    }

    /// Bring the container's interface in line with `request`.
    ///
    /// Unsupported orchestrators and containers without an interface are
    /// successful no-ops.
    pub fn create_or_update_interface(
        &self,
        request: &NetworkContainerRequest,
        sandbox: &PodSandbox,
    ) -> Result<InterfaceOutcome, NcError> {
        let orchestrator = request.network_container_type;
        if !orchestrator.supports_interface_update() {
            info!(%orchestrator, "operation not supported for orchestrator, skipping");
            return Ok(InterfaceOutcome::Skipped(SkipReason::UnsupportedOrchestrator(
                orchestrator,
            )));
        }

        if !self.interface_exists(&request.network_container_id) {
            info!(
                nc_id = %request.network_container_id,
                "no existing interface, only update is supported"
            );
            return Ok(InterfaceOutcome::Skipped(SkipReason::InterfaceNotFound));
        }

        self.update_with_operation(request, sandbox, CniCommand::Update)?;
        Ok(InterfaceOutcome::Updated)
    }

    /// Run `command` against the plugin for `request` without the skip checks
    pub fn update_with_operation(
        &self,
        request: &NetworkContainerRequest,
        sandbox: &PodSandbox,
        command: CniCommand,
    ) -> Result<(), NcError> {
        info!(%command, nc_id = %request.network_container_id, "updating network container interface");

        let plugin = self.config.plugin_path();
        if let Err(e) = fs::metadata(&plugin) {
            if e.kind() == io::ErrorKind::NotFound {
                return Err(NcError::PluginNotFound { path: plugin });
            }
        }

        if request.ip_configuration.ip_subnet.ip_address.is_empty() {
            return Err(NcError::EmptyIpAddress {
                container_id: request.network_container_id.clone(),
            });
        }

        let pod = request.pod_info().map_err(|e| {
            error!("failed to decode orchestrator context: {}", e);
            e
        })?;
        debug!(?pod, "decoded pod info");

        let runtime = build_runtime_conf(
            &pod.pod_name,
            &pod.pod_namespace,
            &sandbox.container_id,
            &sandbox.netns_path,
            &request.network_container_id,
        );
        debug!(?runtime, "runtime configuration");

        let conf = load_flat_conf(&self.config.conflist_path).map_err(|e| {
            error!(path = %self.config.conflist_path.display(), "failed to build network configuration: {}", e);
            e
        })?;
        debug!(conf = %String::from_utf8_lossy(&conf), "network configuration");

        let env = PluginArgs::new(command, &runtime, &self.config.cni_bin_dir).as_env();
        let outcome = self.exec.exec(&plugin, &env, &conf, self.config.plugin_timeout());
        interpret(outcome)?;

        info!(%command, nc_id = %request.network_container_id, "network container interface updated");
        Ok(())
    }

    /// Interface removal needs no plugin call on this platform
    pub fn delete_interface(&self, network_container_id: &str) -> Result<(), NcError> {
        debug!(nc_id = %network_container_id, "delete interface is a no-op");
        Ok(())
    }

    fn interface_exists(&self, ifname: &str) -> bool {
        match self.probe.exists(ifname) {
            Ok(exists) => exists,
            Err(e) => {
                warn!(%ifname, "failed to look up interface: {}", e);
                false
            }
        }
    }
}
