//! `dbdock create` handler

use std::path::PathBuf;
use std::sync::Arc;

use dbdock_core::{dbk_println, Result};
use dbdock_runtime::DockerRuntime;

use crate::postgres::config::{sql_files, Config};
use crate::postgres::{CreateDbRequest, Postgres};

pub async fn run(
    port: u16,
    user: String,
    password: String,
    migrations: Option<PathBuf>,
    fixtures: Option<PathBuf>,
) -> Result<()> {
    let cfg = Config {
        user,
        password,
        port,
        ..Default::default()
    };
    let pg = Postgres::new(cfg, Arc::new(DockerRuntime::new()))?;

    let request = CreateDbRequest {
        migrations: match migrations {
            Some(path) => sql_files(&path, true)?,
            None => Vec::new(),
        },
        fixtures: match fixtures {
            Some(path) => sql_files(&path, false)?,
            None => Vec::new(),
        },
    };

    let response = pg.create_db(&request).await?;
    dbk_println!("{}", response.uri);
    Ok(())
}
