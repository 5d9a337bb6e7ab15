mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use finprod_core::Controller;

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let mut cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Config file defaults fill in whatever flags and env left unset
    let cfg = config::load_config_or_default();
    config::apply_defaults(&mut cli.global, &cfg.defaults);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli, &cfg).await {
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
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli, cfg: &Config) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a controller
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "finprod", &mut std::io::stdout());
            Ok(())
        }

        // Product commands connect lazily, after local validation
        Command::Products(args) => {
            let controller_config = config::resolve_controller_config(&cli.global, cfg)?;
            tracing::debug!(url = %controller_config.base_url, "resolved controller config");
            let controller = Controller::new(controller_config);

            let result = commands::products::handle(&controller, args, &cli.global, cfg).await;
            controller.disconnect().await;
            result
        }
    }
}
