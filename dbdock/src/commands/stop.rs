//! `dbdock stop` handler

use dbdock_core::{dbk_println, Result};
use dbdock_runtime::DockerRuntime;

use crate::postgres::stop_all;

pub async fn run() -> Result<()> {
    let removed = stop_all(&DockerRuntime::new()).await?;
    dbk_println!("Removed {} container(s)", removed);
    Ok(())
}
