//! Recording mock runtime for lifecycle tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use dbdock_core::error::{DbdockError, Result};

use crate::{ContainerInfo, ContainerRuntime, RunRequest};

/// One observed runtime call, in invocation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    Run { id: String, request: RunRequest },
    Terminate { id: String },
}

#[derive(Debug, Default)]
struct MockState {
    containers: Vec<MockContainer>,
    events: Vec<RuntimeEvent>,
    fail_terminate: Vec<String>,
    fail_run_names: Vec<String>,
    next_id: u64,
}

#[derive(Debug, Clone)]
struct MockContainer {
    id: String,
    name: String,
    labels: HashMap<String, String>,
    running: bool,
}

/// In-memory [`ContainerRuntime`] that records every call so tests can
/// assert launch contracts and termination ordering.
#[derive(Debug, Default)]
pub struct MockRuntime {
    state: Mutex<MockState>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a container, as if something had launched it earlier.
    pub fn with_container(
        self,
        id: &str,
        name: &str,
        labels: &[(&str, &str)],
        running: bool,
    ) -> Self {
        self.state.lock().expect("mock state").containers.push(MockContainer {
            id: id.to_string(),
            name: name.to_string(),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            running,
        });
        self
    }

    /// Make every `terminate` of the given id fail.
    pub fn fail_terminate(&self, id: &str) {
        self.state
            .lock()
            .expect("mock state")
            .fail_terminate
            .push(id.to_string());
    }

    /// Make `run` fail for any request whose name starts with `prefix`.
    pub fn fail_run_named(&self, prefix: &str) {
        self.state
            .lock()
            .expect("mock state")
            .fail_run_names
            .push(prefix.to_string());
    }

    /// All recorded calls, in order.
    pub fn events(&self) -> Vec<RuntimeEvent> {
        self.state.lock().expect("mock state").events.clone()
    }

    /// Ids passed to `terminate`, in order (failed attempts included).
    pub fn terminated(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RuntimeEvent::Terminate { id } => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Requests passed to `run`, in order.
    pub fn launched(&self) -> Vec<RunRequest> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RuntimeEvent::Run { request, .. } => Some(request),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn run(&self, request: RunRequest) -> Result<String> {
        let mut state = self.state.lock().expect("mock state");
        if state
            .fail_run_names
            .iter()
            .any(|prefix| request.name.starts_with(prefix))
        {
            return Err(DbdockError::Runtime(format!(
                "mock refused to launch {}",
                request.name
            )));
        }

        state.next_id += 1;
        let id = format!("mock-{}", state.next_id);
        state.containers.push(MockContainer {
            id: id.clone(),
            name: request.name.clone(),
            labels: request.labels.clone(),
            running: true,
        });
        state.events.push(RuntimeEvent::Run {
            id: id.clone(),
            request,
        });
        Ok(id)
    }

    async fn terminate(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().expect("mock state");
        state.events.push(RuntimeEvent::Terminate { id: id.to_string() });
        if state.fail_terminate.iter().any(|f| f == id) {
            return Err(DbdockError::Runtime(format!(
                "mock failed to terminate {}",
                id
            )));
        }
        state.containers.retain(|c| c.id != id);
        Ok(())
    }

    async fn list(&self, labels: &[(String, String)]) -> Result<Vec<ContainerInfo>> {
        let state = self.state.lock().expect("mock state");
        Ok(state
            .containers
            .iter()
            .filter(|c| {
                labels
                    .iter()
                    .all(|(k, v)| c.labels.get(k).is_some_and(|actual| actual == v))
            })
            .map(|c| ContainerInfo {
                id: c.id.clone(),
                name: c.name.clone(),
                running: c.running,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_honors_label_filters() {
        let runtime = MockRuntime::new()
            .with_container("a", "dbdock_pg_1", &[("dbdock.type", "postgres")], true)
            .with_container("b", "dbdock_ui_1", &[("dbdock.type", "ui")], true)
            .with_container("c", "unrelated_pg", &[], true);

        let filter = vec![("dbdock.type".to_string(), "postgres".to_string())];
        let infos = runtime.list(&filter).await.expect("mock list");
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].id, "a");

        let all = runtime.list(&[]).await.expect("mock list");
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn injected_failures_surface_as_runtime_errors() {
        let runtime = MockRuntime::new();
        runtime.fail_run_named("dbdock_ui_");

        let err = runtime
            .run(RunRequest {
                name: "dbdock_ui_7".into(),
                ..Default::default()
            })
            .await
            .expect_err("run must fail");
        assert!(err.to_string().contains("dbdock_ui_7"));

        let id = runtime
            .run(RunRequest {
                name: "dbdock_pg_7".into(),
                ..Default::default()
            })
            .await
            .expect("run");
        runtime.fail_terminate(&id);
        assert!(runtime.terminate(&id).await.is_err());
        // The failed attempt is still recorded for ordering assertions.
        assert_eq!(runtime.terminated(), vec![id]);
    }
}
