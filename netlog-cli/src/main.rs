use clap::Parser;
use tracing::error;

use netlog_cli::cli::{Cli, Commands};
use netlog_cli::commands;
use netlog_cli::error::CliError;
use netlog_cli::logging;
use netlog_cli::output::OutputWriter;
use netlog_core::config::GeneralConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = commands::config::load_effective(cli.config.as_deref()).await;

    // An unreadable config still gets logging so `config validate` can report it.
    let general = loaded
        .as_ref()
        .map(|l| l.config.general.clone())
        .unwrap_or_else(|_| GeneralConfig::default());
    if let Err(e) = logging::init_tracing(&general, cli.log_level.as_deref()) {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }

    let writer = OutputWriter::new(cli.output);

    let result: Result<(), CliError> = match cli.command {
        Commands::Run(args) => match loaded {
            Ok(l) => commands::run::execute(args, &l.config, &writer).await,
            Err(e) => Err(e),
        },
        Commands::Inspect(args) => match loaded {
            Ok(l) => commands::inspect::execute(args, &l.config, &writer).await,
            Err(e) => Err(e),
        },
        Commands::Config(args) => {
            commands::config::execute(args, cli.config.as_deref(), &writer).await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "command failed");
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}
