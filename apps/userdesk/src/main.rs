use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings, normalize_api_base},
    SyncController,
};
use shared::domain::{Draft, RecordId};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod render;
mod shell;

use render::View;

#[derive(Parser, Debug)]
#[command(name = "userdesk", about = "List, add and delete users on a remote user store")]
struct Cli {
    /// Backend base URL; takes precedence over userdesk.toml, API_BASE and APP__API_BASE.
    #[arg(long, global = true)]
    api_base: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show all users.
    List,
    /// Create a user, then show the refreshed table.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        city: String,
    },
    /// Delete a user by id, then show the refreshed table.
    Delete { id: String },
    /// Interactive session.
    Shell,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let api_base = match cli.api_base {
        Some(raw) => normalize_api_base(&raw)?,
        None => load_settings()?.api_base,
    };
    let controller = SyncController::connect(&api_base)
        .with_context(|| format!("failed to set up backend client for '{api_base}'"))?;
    let view = View::new(&api_base);
    let interactive = matches!(cli.command, Command::Shell);

    let succeeded = match cli.command {
        Command::Shell => {
            shell::run(&controller, &view).await?;
            true
        }
        Command::List => controller.list().await.is_ok(),
        Command::Add { name, email, city } => {
            // Same order as the page: load first, then submit.
            preload(&controller).await;
            let mut draft = Draft::new(name, email, city);
            controller.create(&mut draft).await.is_ok()
        }
        Command::Delete { id } => {
            preload(&controller).await;
            let id = RecordId::new(id);
            if controller.state().find(&id).is_none() {
                warn!(record_id = %id, "delete: id is not in the loaded users table");
            }
            controller.delete(&id).await.is_ok()
        }
    };

    if !interactive {
        print!("{}", view.render(&controller.state()));
    }

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

// The next operation clears `error_message`, so a failed load is reported here.
async fn preload(controller: &SyncController) {
    if let Err(err) = controller.list().await {
        warn!(kind = err.kind().as_str(), error = %err, "users could not be loaded before the change");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_preload_is_kept_in_state_until_next_operation() {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);
        let controller = SyncController::connect(&format!("http://{addr}")).expect("controller");

        preload(&controller).await;

        let state = controller.state();
        assert!(state.records.is_empty());
        assert!(state
            .error_message
            .expect("preload failure")
            .starts_with("Cannot load users."));
    }
}
