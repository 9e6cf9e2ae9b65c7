//! `dbdock rm` handler

use std::sync::Arc;

use dbdock_core::{dbk_println, Result};
use dbdock_runtime::DockerRuntime;

use crate::postgres::config::Config;
use crate::postgres::Postgres;

pub async fn run(uri: &str, port: u16, user: String, password: String) -> Result<()> {
    let cfg = Config {
        user,
        password,
        port,
        ..Default::default()
    };
    let pg = Postgres::new(cfg, Arc::new(DockerRuntime::new()))?;

    pg.remove_db(uri).await?;
    dbk_println!("Database removed");
    Ok(())
}
