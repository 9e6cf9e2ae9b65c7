//! `dbdock ls` handler

use dbdock_core::{dbk_println, Result};
use dbdock_runtime::DockerRuntime;

use crate::cli::OutputFormat;
use crate::postgres::instances;

pub async fn run(format: OutputFormat) -> Result<()> {
    let runtime = DockerRuntime::new();
    let found = instances(&runtime).await?;

    match format {
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(&found)
                .map_err(|e| anyhow::anyhow!("rendering instance list: {}", e))?;
            dbk_println!("{}", rendered);
        }
        OutputFormat::Table => {
            dbk_println!("{:<14} {:<28} {:<10} {:<8}", "ID", "NAME", "TYPE", "STATUS");
            for instance in found {
                dbk_println!(
                    "{:<14} {:<28} {:<10} {:<8}",
                    instance.id,
                    instance.name,
                    instance.kind,
                    if instance.running { "running" } else { "stopped" }
                );
            }
        }
    }
    Ok(())
}
