use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use crate::error::{ExecError, NcError};
use crate::types::PluginError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Time between SIGTERM and SIGKILL for a plugin past its deadline
const KILL_GRACE: Duration = Duration::from_millis(500);

/// Exit status and captured stdout of a finished plugin
#[derive(Debug, Clone)]
pub struct PluginOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    /// Why stdout could not be read after a failed exit
    pub stdout_error: Option<String>,
}

/// Runs a plugin binary to completion
pub trait PluginExec: Send + Sync {
    /// Run `plugin` with `env` set on top of the inherited environment and
    /// `stdin` as its input. Blocks until the plugin exits or `timeout` passes.
    fn exec(
        &self,
        plugin: &Path,
        env: &[(String, String)],
        stdin: &[u8],
        timeout: Option<Duration>,
    ) -> Result<PluginOutput, ExecError>;
}

/// [`PluginExec`] backed by a child process
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExec;

impl PluginExec for ProcessExec {
    fn exec(
        &self,
        plugin: &Path,
        env: &[(String, String)],
        stdin: &[u8],
        timeout: Option<Duration>,
    ) -> Result<PluginOutput, ExecError> {
        debug!(plugin = %plugin.display(), ?env, "executing CNI plugin");

        let mut child = Command::new(plugin)
            .envs(env.iter().map(|(key, value)| (key.as_str(), value.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                path: plugin.to_path_buf(),
                source,
            })?;

        let input = child.stdin.take();
        let payload = stdin.to_vec();
        let writer = thread::spawn(move || write_stdin(input, &payload));

        let output = child.stdout.take();
        let reader = thread::spawn(move || -> io::Result<Vec<u8>> {
            let mut buf = Vec::new();
            if let Some(mut out) = output {
                out.read_to_end(&mut buf)?;
            }
            Ok(buf)
        });

        let status = match wait_until(&mut child, timeout).map_err(ExecError::Wait)? {
            Some(status) => status,
            None => {
                let after = timeout.unwrap_or_default();
                warn!(plugin = %plugin.display(), ?after, "CNI plugin timed out, terminating");
                terminate(&mut child);
                // Pipe helpers are left detached; a grandchild may still hold stdout open.
                return Err(ExecError::Timeout {
                    path: plugin.to_path_buf(),
                    after,
                });
            }
        };

        let written = writer
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
        let stdout = reader
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("stdout reader panicked")));

        // A failed exit outranks pipe errors so the plugin's own diagnostics win.
        if !status.success() {
            let (stdout, stdout_error) = match stdout {
                Ok(buf) => (buf, None),
                Err(e) => (Vec::new(), Some(e.to_string())),
            };
            return Ok(PluginOutput {
                status,
                stdout,
                stdout_error,
            });
        }
        written.map_err(ExecError::Stdin)?;
        let stdout = stdout.map_err(ExecError::Stdout)?;

        Ok(PluginOutput {
            status,
            stdout,
            stdout_error: None,
        })
    }
}

fn write_stdin(input: Option<std::process::ChildStdin>, payload: &[u8]) -> io::Result<()> {
    let Some(mut input) = input else {
        return Ok(());
    };
    match input.write_all(payload) {
        // The plugin is free to exit without reading its configuration.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

fn wait_until(child: &mut Child, timeout: Option<Duration>) -> io::Result<Option<ExitStatus>> {
    let Some(timeout) = timeout else {
        return child.wait().map(Some);
    };

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= timeout {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn terminate(child: &mut Child) {
    let pid = Pid::from_raw(child.id() as i32);
    if let Err(e) = kill(pid, Signal::SIGTERM) {
        warn!(%pid, "failed to send SIGTERM to CNI plugin: {}", e);
    }

    let start = Instant::now();
    while start.elapsed() < KILL_GRACE {
        if let Ok(Some(_)) = child.try_wait() {
            return;
        }
        thread::sleep(POLL_INTERVAL);
    }

    if let Err(e) = child.kill() {
        warn!(%pid, "failed to kill CNI plugin: {}", e);
    }
    let _ = child.wait();
}

/// Classify a plugin run: clean exit, plugin reported error, or execution failure
pub fn interpret(outcome: Result<PluginOutput, ExecError>) -> Result<(), NcError> {
    let output = outcome.map_err(|e| {
        error!("CNI plugin could not be run: {}", e);
        NcError::Exec(e)
    })?;

    if output.status.success() {
        return Ok(());
    }

    let err = match &output.stdout_error {
        Some(read_err) => PluginError::new(format!(
            "plugin failed but reading its diagnostic message failed: {}",
            read_err
        )),
        None => plugin_error(&output.stdout),
    };
    error!(status = %output.status, code = err.code, "CNI plugin failed: {}", err);
    Err(NcError::Plugin(err))
}

/// Decode the CNI error object a failed plugin wrote to stdout
pub fn plugin_error(output: &[u8]) -> PluginError {
    match serde_json::from_slice::<PluginError>(output) {
        Ok(err) => err,
        Err(parse_err) => PluginError::new(format!(
            "plugin failed but error parsing its diagnostic message '{}': {}",
            String::from_utf8_lossy(output),
            parse_err
        )),
    }
}
