//! Command handlers

mod create;
mod ls;
mod rm;
mod start;
mod stop;

use dbdock_core::Result;

use crate::cli::{Args, Command};

pub async fn execute_command(args: Args) -> Result<()> {
    match args.command {
        Command::Start {
            version,
            port,
            user,
            password,
            name,
            migrations,
            fixtures,
            ui,
            detach,
        } => {
            start::run(
                version, port, user, password, name, migrations, fixtures, ui, detach,
            )
            .await
        }
        Command::Create {
            port,
            user,
            password,
            migrations,
            fixtures,
        } => create::run(port, user, password, migrations, fixtures).await,
        Command::Rm {
            uri,
            port,
            user,
            password,
        } => rm::run(&uri, port, user, password).await,
        Command::Ls { format } => ls::run(format).await,
        Command::Stop => stop::run().await,
    }
}
