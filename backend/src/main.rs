//! Process entry point: parse the startup mode, assemble extensions, and
//! either serve HTTP or consume queue jobs.

use std::ffi::OsString;

use actix_web::web;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use backend::config::AppSettings;
use ortho_config::OrthoConfig;
use backend::inbound::http::HealthState;
use backend::outbound::queue::run_worker;
use backend::server::{create_server, Extensions, StartupMode};

#[derive(Debug, Parser)]
#[command(name = "backend", about = "Application backend server and worker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Serve the HTTP API and the WebSocket stream (default).
    Serve,
    /// Consume background jobs from the task queue.
    Worker,
}

fn startup_mode(command: Option<Command>) -> StartupMode {
    match command.unwrap_or(Command::Serve) {
        Command::Serve => StartupMode::Serve,
        Command::Worker => StartupMode::Worker,
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let mode = startup_mode(cli.command);

    // Settings come from the environment and the optional config file; the
    // CLI surface is owned by clap above.
    let settings = AppSettings::load_from_iter([OsString::from("backend")])
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;

    let extensions = Extensions::build(&settings, mode)
        .await
        .map_err(|err| std::io::Error::other(format!("assembly failed: {err}")))?;

    match mode {
        StartupMode::Serve => {
            let outcome = extensions
                .run_seed()
                .await
                .map_err(|err| std::io::Error::other(format!("seed failed: {err}")))?;
            info!(?outcome, "bootstrap seed complete");

            extensions.spawn_notification_bridge();

            let health_state = web::Data::new(HealthState::new());
            let bind_addr = settings.bind_addr().to_owned();
            info!(bind_addr = %bind_addr, "starting http server");
            create_server(&extensions, &bind_addr, health_state)?.await
        }
        StartupMode::Worker => {
            info!("starting queue worker");
            run_worker(extensions.queue.clone(), extensions.mailer.clone()).await
        }
    }
}
