use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use sbarc_cli::{Cli, CliError, Commands, bootstrap, handlers};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let Some(command) = cli.command else {
        // No command provided - show help
        Cli::command().print_help()?;
        return Ok(0);
    };

    let ctx = bootstrap()?;

    match command {
        Commands::Download(args) => {
            handlers::run::execute(&ctx, args.into_config().into(), cli.dry_run).await
        }
        Commands::Convert(args) => {
            handlers::run::execute(&ctx, args.into_config()?.into(), cli.dry_run).await
        }
        Commands::Preview { command } => handlers::preview::execute(&ctx, command).map(|()| 0),
        Commands::Settings { command } => handlers::settings::execute(&ctx, command).map(|()| 0),
        Commands::Resolve { tool } => handlers::resolve::execute(&ctx, tool).map(|()| 0),
    }
}

fn to_exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => to_exit_code(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            to_exit_code(err.downcast_ref::<CliError>().map_or(1, CliError::exit_code))
        }
    }
}
