//! CLI entry point - the composition root.
//!
//! Settings and the HTTP client are wired together via bootstrap; command
//! dispatch routes to handlers.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use ieltspeak_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

#[tokio::main]
async fn main() {
    // Load .env before parsing so clap's env fallbacks see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        std::process::exit(code);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::from_cli(&cli)?;

    let Some(command) = cli.command else {
        // No command provided - show help
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Tips => handlers::tips::execute(),
        Commands::Questions { category } => {
            let ctx = bootstrap(config)?;
            handlers::questions::execute(&ctx, category).await?;
        }
        Commands::Topics { category } => {
            let ctx = bootstrap(config)?;
            handlers::topics::execute(&ctx, category).await?;
        }
        Commands::Question { id } => {
            let ctx = bootstrap(config)?;
            handlers::question::execute(&ctx, &id).await?;
        }
        Commands::Practice(args) => {
            let ctx = bootstrap(config)?;
            handlers::practice::execute(&ctx, args).await?;
        }
    }

    Ok(())
}
