//! `dbdock start` handler

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use dbdock_core::Result;
use dbdock_runtime::DockerRuntime;

use crate::postgres::config::{sql_files, Config};
use crate::postgres::Postgres;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    version: String,
    port: u16,
    user: String,
    password: String,
    name: String,
    migrations: Option<PathBuf>,
    fixtures: Option<PathBuf>,
    ui: bool,
    detach: bool,
) -> Result<()> {
    let cfg = Config {
        user,
        password,
        database: name,
        port,
        version,
        migrations: match migrations {
            Some(path) => sql_files(&path, true)?,
            None => Vec::new(),
        },
        fixtures: match fixtures {
            Some(path) => sql_files(&path, false)?,
            None => Vec::new(),
        },
        ui,
        detach,
    };

    let pg = Postgres::new(cfg, Arc::new(DockerRuntime::new()))?;

    let cancel = CancellationToken::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => signal.cancel(),
            Err(e) => warn!("failed to install Ctrl+C handler: {}", e),
        }
    });

    pg.start(cancel).await
}
