//! Remote shell commands issued during a deployment.
//!
//! Chain names are parsed again here so that nothing but an allow-listed
//! name is ever interpolated into a command line.

use launchpad_core::{ChainName, CoreError};
use remote::{quote_path, ExecOptions};

pub const GO_PATH: &str = "export PATH=$PATH:/usr/local/go/bin";

/// Sets `$SUDO` to `sudo` unless the remote user is already root.
pub const SUDO_PREFIX: &str = r#"SUDO=$([ "$(id -u)" -eq 0 ] || echo sudo)"#;

pub const NOT_INSTALLED: &str = "NOT_INSTALLED";
pub const NOT_READY: &str = "NOT_READY";

/// Present in the body of a healthy node's RPC `/status` response.
pub const NODE_INFO_MARKER: &str = "\"node_info\"";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    pub command: String,
    pub options: ExecOptions,
}

impl RemoteCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            options: ExecOptions::default(),
        }
    }

    pub fn in_dir(mut self, dir: impl Into<String>) -> Self {
        self.options = ExecOptions::in_dir(dir);
        self
    }

    /// The command as it will appear in the log.
    pub fn display(&self) -> String {
        match &self.options.working_directory {
            Some(dir) => format!("cd {} && {}", quote_path(dir), self.command),
            None => self.command.clone(),
        }
    }
}

pub fn chain_dir(chain: &ChainName) -> String {
    format!("~/{}", chain)
}

pub fn scaffold_chain(chain_name: &str) -> Result<RemoteCommand, CoreError> {
    let chain = ChainName::parse(chain_name)?;
    Ok(RemoteCommand::new(format!(
        "{GO_PATH} && rm -rf {chain} && ignite scaffold chain {chain}"
    ))
    .in_dir("~"))
}

pub fn build_chain(chain_name: &str) -> Result<RemoteCommand, CoreError> {
    let chain = ChainName::parse(chain_name)?;
    Ok(RemoteCommand::new(format!("{GO_PATH} && ignite chain build")).in_dir(chain_dir(&chain)))
}

/// Stops any node left running by an earlier deployment, then launches the
/// chain detached with its output going to `~/chain-<name>.log`.
pub fn start_chain(chain_name: &str) -> Result<RemoteCommand, CoreError> {
    let chain = ChainName::parse(chain_name)?;
    // `[i]gnite` keeps pkill from matching the shell running this line.
    Ok(RemoteCommand::new(format!(
        "{GO_PATH} && (pkill -f \"[i]gnite chain serve\" || true) && \
         nohup ignite chain serve --verbose > ~/chain-{chain}.log 2>&1 < /dev/null &"
    ))
    .in_dir(chain_dir(&chain)))
}

pub fn probe_node(rpc_port: u16) -> RemoteCommand {
    RemoteCommand::new(format!(
        "curl -s http://localhost:{rpc_port}/status || echo \"{NOT_READY}\""
    ))
}

pub fn node_is_ready(probe_stdout: &str) -> bool {
    probe_stdout.contains(NODE_INFO_MARKER) && !probe_stdout.contains(NOT_READY)
}
