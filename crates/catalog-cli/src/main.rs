mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use catalog_core::{NotificationBus, ProductStore};

use crate::cli::{Cli, Command};
use crate::commands::Context;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need the product service
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "catalog", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = catalog_config::load_config()?;
            let store_config = config::store_config(&cfg, &cli.global)?;
            let store = ProductStore::from_config(&store_config)?;
            let notifications = NotificationBus::new(store_config.notifications.clone());
            let ctx = Context::new(
                Arc::new(store),
                notifications,
                store_config.validation_debounce,
                output::should_color(&cli.global.color),
            );

            tracing::debug!(command = ?cmd, api_url = %store_config.api_url, "dispatching command");
            commands::dispatch(cmd, &ctx, &cli.global).await
        }
    }
}
