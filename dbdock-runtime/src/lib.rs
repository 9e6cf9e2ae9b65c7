//! Container runtime abstraction for dbdock.
//!
//! This crate defines the contract dbdock uses to launch, list and terminate
//! the container processes that back database instances, together with the
//! Docker CLI implementation used in production. A recording mock is
//! available behind the `test-helpers` feature for lifecycle-ordering tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dbdock_core::Result;

pub mod docker;

// When the `test-helpers` feature is enabled, include the mock runtime.
#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;

pub use docker::DockerRuntime;

/// A host-port to container-port mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMapping {
    pub host: u16,
    pub container: u16,
}

/// Everything needed to launch one container process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequest {
    /// Image reference, e.g. `postgis/postgis:14-3.2-alpine`.
    pub image: String,
    /// Process environment.
    pub env: HashMap<String, String>,
    /// Optional command override; empty means the image default.
    pub cmd: Vec<String>,
    /// Host:container port mappings.
    pub ports: Vec<PortMapping>,
    /// Unique container name.
    pub name: String,
    /// Labels used later for discovery and teardown filtering.
    pub labels: HashMap<String, String>,
}

/// Lightweight descriptor of a container, as returned by [`ContainerRuntime::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    pub running: bool,
}

/// The contract for a container runtime.
///
/// dbdock drives a single logical database instance per orchestrator; the
/// runtime only has to start a process from an image, stop it again, and
/// enumerate processes by label.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Name of the runtime (e.g. "docker", "mock").
    fn name(&self) -> &'static str;

    /// Verify the runtime daemon is reachable.
    async fn ping(&self) -> Result<()>;

    /// Launch a container and return its identifier.
    async fn run(&self, request: RunRequest) -> Result<String>;

    /// Stop and remove a container.
    async fn terminate(&self, id: &str) -> Result<()>;

    /// List containers whose labels match every `key=value` pair in `labels`.
    async fn list(&self, labels: &[(String, String)]) -> Result<Vec<ContainerInfo>>;
}

/// Handle to a launched container, owned by the orchestrator that created it.
///
/// Termination consumes the handle, so a terminated container can never be
/// addressed again through it.
pub struct ContainerHandle {
    id: String,
    runtime: Arc<dyn ContainerRuntime>,
}

impl ContainerHandle {
    pub fn new(id: String, runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { id, runtime }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Stop and remove the underlying container.
    pub async fn terminate(self) -> Result<()> {
        self.runtime.terminate(&self.id).await
    }
}

impl std::fmt::Debug for ContainerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerHandle")
            .field("id", &self.id)
            .field("runtime", &self.runtime.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock::MockRuntime;

    #[tokio::test]
    async fn handle_terminate_consumes_and_forwards() {
        let runtime = Arc::new(MockRuntime::new());
        let id = runtime
            .run(RunRequest {
                image: "postgres:alpine".into(),
                name: "dbdock_pg_test".into(),
                ..Default::default()
            })
            .await
            .expect("mock run");

        let handle = ContainerHandle::new(id.clone(), runtime.clone());
        assert_eq!(handle.id(), id);
        handle.terminate().await.expect("mock terminate");

        assert_eq!(runtime.terminated(), vec![id]);
    }
}
