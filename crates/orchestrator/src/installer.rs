//! Toolchain provisioning on the target host.
//!
//! Dependencies are handled strictly in order. Each one is probed, installed
//! with a recipe picked from the host platform when missing, and probed
//! again. The first dependency that cannot be brought up aborts the phase.

use launchpad_core::{DeploymentStatus, LogStep};
use remote::RemoteSession;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::commands::{RemoteCommand, GO_PATH, NOT_INSTALLED, SUDO_PREFIX};
use crate::error::{OrchestratorError, Result};
use crate::runner::CommandRunner;

pub const GO_VERSION: &str = "1.21.6";
pub const BUF_VERSION: &str = "1.28.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    Go,
    Git,
    Ignite,
    Buf,
}

impl Dependency {
    /// Installation order. Ignite needs Go on the path.
    pub const ORDER: [Dependency; 4] = [
        Dependency::Go,
        Dependency::Git,
        Dependency::Ignite,
        Dependency::Buf,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dependency::Go => "go",
            Dependency::Git => "git",
            Dependency::Ignite => "ignite",
            Dependency::Buf => "buf",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Dependency::Go => "Go",
            Dependency::Git => "Git",
            Dependency::Ignite => "Ignite CLI",
            Dependency::Buf => "buf",
        }
    }

    pub fn probe(&self) -> RemoteCommand {
        let check = match self {
            Dependency::Go => format!("{GO_PATH} && go version"),
            Dependency::Git => "git --version".to_string(),
            Dependency::Ignite => format!("{GO_PATH} && ignite version"),
            Dependency::Buf => "buf --version".to_string(),
        };
        RemoteCommand::new(format!("{check} || echo \"{NOT_INSTALLED}\""))
    }

    /// Text a working installation prints from its probe.
    pub fn marker(&self) -> &'static str {
        match self {
            Dependency::Go => "go version",
            Dependency::Git => "git version",
            Dependency::Ignite => "Ignite CLI",
            Dependency::Buf => "1.",
        }
    }

    pub fn install(&self, platform: &Platform) -> std::result::Result<RemoteCommand, String> {
        let script = match self {
            Dependency::Go => {
                let arch = match (platform.os.as_str(), platform.arch.as_str()) {
                    ("Linux", "x86_64" | "amd64") => "amd64",
                    ("Linux", "aarch64" | "arm64") => "arm64",
                    _ => return Err(platform.unsupported()),
                };
                let tarball = format!("go{GO_VERSION}.linux-{arch}.tar.gz");
                format!(
                    "{SUDO_PREFIX} && cd /tmp && \
                     curl -sSLO https://go.dev/dl/{tarball} && \
                     $SUDO rm -rf /usr/local/go && \
                     $SUDO tar -C /usr/local -xzf {tarball} && \
                     rm -f {tarball} && \
                     echo '{GO_PATH}' >> ~/.bashrc && \
                     echo '{GO_PATH}' >> ~/.profile"
                )
            }
            Dependency::Git => {
                if platform.os != "Linux" {
                    return Err(platform.unsupported());
                }
                let install = match platform.distro {
                    Distro::Debian => "$SUDO apt-get update -y && $SUDO apt-get install -y git",
                    Distro::RedHat => "$SUDO yum install -y git",
                    Distro::Alpine => "$SUDO apk add --no-cache git",
                    Distro::Unknown => {
                        "$SUDO apt-get install -y git || $SUDO yum install -y git || $SUDO apk add --no-cache git"
                    }
                };
                format!("{SUDO_PREFIX} && {install}")
            }
            Dependency::Ignite => {
                if !matches!(platform.os.as_str(), "Linux" | "Darwin") {
                    return Err(platform.unsupported());
                }
                format!(
                    "{SUDO_PREFIX} && {GO_PATH} && cd /tmp && \
                     curl -sSL https://get.ignite.com/cli! | bash && \
                     if [ -f ignite ]; then $SUDO mv ignite /usr/local/bin/ignite; fi"
                )
            }
            Dependency::Buf => {
                if !matches!(platform.os.as_str(), "Linux" | "Darwin") {
                    return Err(platform.unsupported());
                }
                format!(
                    "{SUDO_PREFIX} && \
                     curl -sSL \"https://github.com/bufbuild/buf/releases/download/v{BUF_VERSION}/buf-$(uname -s)-$(uname -m)\" -o /tmp/buf && \
                     $SUDO mv /tmp/buf /usr/local/bin/buf && \
                     $SUDO chmod +x /usr/local/bin/buf"
                )
            }
        };
        Ok(RemoteCommand::new(script))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distro {
    Debian,
    RedHat,
    Alpine,
    Unknown,
}

impl Distro {
    pub fn from_os_release(os_release: &str) -> Self {
        let text = os_release.to_ascii_lowercase();
        if text.contains("ubuntu") || text.contains("debian") {
            Distro::Debian
        } else if ["centos", "rhel", "fedora", "rocky", "almalinux"]
            .iter()
            .any(|id| text.contains(id))
        {
            Distro::RedHat
        } else if text.contains("alpine") {
            Distro::Alpine
        } else {
            Distro::Unknown
        }
    }
}

/// What the host reported from `uname` and `/etc/os-release`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
    pub distro: Distro,
}

impl Platform {
    pub fn new(os: &str, arch: &str, os_release: &str) -> Self {
        Self {
            os: os.trim().to_string(),
            arch: arch.trim().to_string(),
            distro: Distro::from_os_release(os_release),
        }
    }

    fn unsupported(&self) -> String {
        format!("Unsupported OS/architecture: {}/{}", self.os, self.arch)
    }
}

fn probe_reports_installed(dependency: Dependency, exit_ok: bool, stdout: &str) -> bool {
    exit_ok && !stdout.contains(NOT_INSTALLED) && stdout.contains(dependency.marker())
}

/// Brings the fixed dependency set up on one host.
pub struct DependencyInstaller<'a> {
    runner: &'a CommandRunner,
    cancel: Option<&'a CancellationToken>,
    platform: Option<Platform>,
}

impl<'a> DependencyInstaller<'a> {
    pub fn new(runner: &'a CommandRunner) -> Self {
        Self {
            runner,
            cancel: None,
            platform: None,
        }
    }

    /// Cancellation is checked before each dependency, never during a command.
    pub fn with_cancel(mut self, cancel: &'a CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub async fn check_and_install(&mut self, session: &mut dyn RemoteSession) -> Result<()> {
        self.note("Checking dependencies...").await?;

        for dependency in Dependency::ORDER {
            if self.cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(OrchestratorError::Cancelled);
            }
            self.ensure(session, dependency).await?;
        }

        self.note("All dependencies ready!").await
    }

    async fn ensure(&mut self, session: &mut dyn RemoteSession, dependency: Dependency) -> Result<()> {
        let label = dependency.label();
        self.note(format!("Checking {} installation...", label)).await?;

        if self.is_installed(session, dependency).await? {
            return self.note(format!("{} already installed", label)).await;
        }

        let platform = self.platform(session).await?;
        let recipe = dependency
            .install(&platform)
            .map_err(|reason| OrchestratorError::dependency(dependency.name(), reason))?;

        info!(
            deployment_id = %self.runner.deployment_id(),
            dependency = dependency.name(),
            os = %platform.os,
            arch = %platform.arch,
            "Installing dependency"
        );
        self.note(format!("Installing {}...", label)).await?;

        let output = self.runner.run(session, LogStep::Install, &recipe).await?;
        if !output.success() {
            return Err(OrchestratorError::dependency(
                dependency.name(),
                format!("Command failed: {}", output.error_text()),
            ));
        }

        if !self.is_installed(session, dependency).await? {
            return Err(OrchestratorError::dependency(
                dependency.name(),
                format!("{} installation verification failed", label),
            ));
        }

        self.note(format!("{} installed successfully", label)).await
    }

    async fn is_installed(
        &self,
        session: &mut dyn RemoteSession,
        dependency: Dependency,
    ) -> Result<bool> {
        let output = self
            .runner
            .run(session, LogStep::Install, &dependency.probe())
            .await?;
        Ok(probe_reports_installed(
            dependency,
            output.success(),
            &output.stdout,
        ))
    }

    /// Detected once, on the first missing dependency.
    async fn platform(&mut self, session: &mut dyn RemoteSession) -> Result<Platform> {
        if let Some(platform) = &self.platform {
            return Ok(platform.clone());
        }

        let os = self
            .runner
            .run(session, LogStep::Install, &RemoteCommand::new("uname -s"))
            .await?;
        let arch = self
            .runner
            .run(session, LogStep::Install, &RemoteCommand::new("uname -m"))
            .await?;
        let release = self
            .runner
            .run(
                session,
                LogStep::Install,
                &RemoteCommand::new("cat /etc/os-release || echo \"unknown\""),
            )
            .await?;

        let platform = Platform::new(&os.stdout, &arch.stdout, &release.stdout);
        self.platform = Some(platform.clone());
        Ok(platform)
    }

    async fn note(&self, message: impl Into<String>) -> Result<()> {
        self.runner
            .note(DeploymentStatus::Installing, LogStep::Install, message)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux(arch: &str, release: &str) -> Platform {
        Platform::new("Linux\n", arch, release)
    }

    #[test]
    fn test_order_is_fixed() {
        let names: Vec<&str> = Dependency::ORDER.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["go", "git", "ignite", "buf"]);
    }

    #[test]
    fn test_probe_has_sentinel() {
        for dependency in Dependency::ORDER {
            assert!(dependency
                .probe()
                .command
                .ends_with("|| echo \"NOT_INSTALLED\""));
        }
    }

    #[test]
    fn test_probe_detection() {
        assert!(probe_reports_installed(
            Dependency::Go,
            true,
            "go version go1.21.6 linux/amd64"
        ));
        assert!(!probe_reports_installed(Dependency::Go, true, "NOT_INSTALLED"));
        assert!(!probe_reports_installed(Dependency::Buf, false, "1.28.1"));
        assert!(probe_reports_installed(
            Dependency::Ignite,
            true,
            "Ignite CLI version:\t\tv28.1.0"
        ));
    }

    #[test]
    fn test_go_recipe_by_arch() {
        let amd = Dependency::Go.install(&linux("x86_64", "")).unwrap();
        assert!(amd.command.contains("go1.21.6.linux-amd64.tar.gz"));
        assert!(amd.command.contains("tar -C /usr/local"));

        let arm = Dependency::Go.install(&linux("aarch64", "")).unwrap();
        assert!(arm.command.contains("go1.21.6.linux-arm64.tar.gz"));

        let err = Dependency::Go.install(&linux("riscv64", "")).unwrap_err();
        assert!(err.contains("riscv64"));

        let mac = Platform::new("Darwin", "arm64", "");
        assert!(Dependency::Go.install(&mac).is_err());
    }

    #[test]
    fn test_git_recipe_by_distro() {
        let debian = Dependency::Git
            .install(&linux("x86_64", "ID=ubuntu\nVERSION_ID=\"22.04\""))
            .unwrap();
        assert!(debian.command.contains("apt-get install -y git"));

        let rhel = Dependency::Git
            .install(&linux("x86_64", "ID=\"centos\""))
            .unwrap();
        assert!(rhel.command.contains("yum install -y git"));

        let alpine = Dependency::Git.install(&linux("x86_64", "ID=alpine")).unwrap();
        assert!(alpine.command.contains("apk add"));

        let unknown = Dependency::Git.install(&linux("x86_64", "unknown")).unwrap();
        assert!(unknown.command.contains("apt-get"));
        assert!(unknown.command.contains("yum"));
        assert!(unknown.command.contains("apk"));
    }

    #[test]
    fn test_ignite_and_buf_recipes() {
        let platform = linux("x86_64", "ID=debian");
        let ignite = Dependency::Ignite.install(&platform).unwrap();
        assert!(ignite.command.contains("https://get.ignite.com/cli!"));
        assert!(ignite.command.contains("/usr/local/bin"));

        let buf = Dependency::Buf.install(&platform).unwrap();
        assert!(buf.command.contains("v1.28.1/buf-$(uname -s)-$(uname -m)"));

        let windows = Platform::new("MINGW64_NT", "x86_64", "");
        assert!(Dependency::Buf.install(&windows).is_err());
    }

    #[test]
    fn test_distro_detection() {
        assert_eq!(Distro::from_os_release("ID=Debian"), Distro::Debian);
        assert_eq!(Distro::from_os_release("ID=fedora"), Distro::RedHat);
        assert_eq!(Distro::from_os_release("ID=arch"), Distro::Unknown);
    }
}
