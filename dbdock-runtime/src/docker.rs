//! Docker CLI implementation of the container runtime.
//!
//! All interaction goes through the `docker` binary so dbdock has no daemon
//! socket dependency; commands are built through a small fluent builder with
//! consistent error handling and logging.

use async_trait::async_trait;
use dbdock_core::error::{DbdockError, Result};
use tokio::process::Command;
use tracing::debug;

use crate::{ContainerInfo, ContainerRuntime, RunRequest};

/// Builder for Docker CLI invocations.
#[derive(Debug, Clone, Default)]
pub struct DockerCli {
    subcommand: Option<String>,
    args: Vec<String>,
}

impl DockerCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Docker subcommand (e.g. "run", "ps", "rm").
    pub fn subcommand<S: Into<String>>(mut self, cmd: S) -> Self {
        self.subcommand = Some(cmd.into());
        self
    }

    /// Add a single argument.
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Execute, discarding output. Use when only success/failure matters.
    pub async fn execute(self) -> Result<()> {
        self.execute_with_output().await.map(|_| ())
    }

    /// Execute and return trimmed stdout; a non-zero exit becomes a runtime
    /// error carrying stderr.
    pub async fn execute_with_output(self) -> Result<String> {
        let mut cmd = self.build_command();
        debug!(?cmd, "executing docker command");

        let output = cmd.output().await.map_err(|e| {
            DbdockError::Runtime(format!("failed to execute docker command: {}", e))
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(DbdockError::Runtime(format!(
                "docker command failed with status {}: {}",
                output.status,
                stderr.trim()
            )))
        }
    }

    fn build_command(self) -> Command {
        let mut cmd = Command::new("docker");
        if let Some(subcmd) = self.subcommand {
            cmd.arg(subcmd);
        }
        cmd.args(self.args);
        cmd.kill_on_drop(true);
        cmd
    }

    /// The argument vector this builder would pass to `docker`.
    #[allow(dead_code)] // exercised by the launch-contract tests
    fn argv(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.args.len() + 1);
        if let Some(subcmd) = &self.subcommand {
            out.push(subcmd.clone());
        }
        out.extend(self.args.iter().cloned());
        out
    }
}

/// Container runtime backed by the local Docker daemon.
#[derive(Debug, Clone, Default)]
pub struct DockerRuntime;

impl DockerRuntime {
    pub fn new() -> Self {
        Self
    }

    fn run_args(request: &RunRequest) -> DockerCli {
        let mut cli = DockerCli::new()
            .subcommand("run")
            .arg("--detach")
            .arg("--name")
            .arg(&request.name);

        for (key, value) in sorted(&request.labels) {
            cli = cli.arg("--label").arg(format!("{}={}", key, value));
        }
        for (key, value) in sorted(&request.env) {
            cli = cli.arg("--env").arg(format!("{}={}", key, value));
        }
        for mapping in &request.ports {
            cli = cli
                .arg("--publish")
                .arg(format!("{}:{}", mapping.host, mapping.container));
        }

        cli = cli.arg(&request.image);
        cli.args(request.cmd.iter())
    }
}

// Deterministic flag order keeps the invocations reproducible in logs.
fn sorted(map: &std::collections::HashMap<String, String>) -> Vec<(&String, &String)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by_key(|(k, _)| k.as_str());
    entries
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    fn name(&self) -> &'static str {
        "docker"
    }

    async fn ping(&self) -> Result<()> {
        DockerCli::new().subcommand("info").execute().await.map_err(|_| {
            DbdockError::Runtime(
                "Docker daemon is not running or not accessible; check `docker ps`".to_string(),
            )
        })
    }

    async fn run(&self, request: RunRequest) -> Result<String> {
        let id = Self::run_args(&request).execute_with_output().await?;
        if id.is_empty() {
            return Err(DbdockError::Runtime(format!(
                "docker run returned no container id for {}",
                request.name
            )));
        }
        debug!(container_id = %id, name = %request.name, "container started");
        Ok(id)
    }

    async fn terminate(&self, id: &str) -> Result<()> {
        debug!(container_id = %id, "removing container");
        DockerCli::new()
            .subcommand("rm")
            .arg("--force")
            .arg("--volumes")
            .arg(id)
            .execute()
            .await
    }

    async fn list(&self, labels: &[(String, String)]) -> Result<Vec<ContainerInfo>> {
        let mut cli = DockerCli::new().subcommand("ps").arg("--all");
        for (key, value) in labels {
            cli = cli.arg("--filter").arg(format!("label={}={}", key, value));
        }
        let output = cli
            .arg("--format")
            .arg("{{.ID}}\t{{.Names}}\t{{.State}}")
            .execute_with_output()
            .await?;

        Ok(parse_ps_output(&output))
    }
}

fn parse_ps_output(output: &str) -> Vec<ContainerInfo> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let id = fields.next()?.trim();
            let name = fields.next()?.trim();
            let state = fields.next().unwrap_or_default().trim();
            if id.is_empty() {
                return None;
            }
            Some(ContainerInfo {
                id: id.to_string(),
                name: name.to_string(),
                running: state == "running",
            })
        })
        .collect()
}
