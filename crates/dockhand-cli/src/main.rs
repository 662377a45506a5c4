mod commands;
mod status;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dockhand", about = "Deploy compose stacks to docker-machine hosts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build, push, and run the stack on the configured machine
    Deploy,
    /// Resolve and print a machine's exported environment
    Env {
        /// Machine name (defaults to the configured one)
        machine: Option<String>,
    },
    /// Validate and print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Deploy => commands::deploy().await?,
        Commands::Env { machine } => commands::env(machine.as_deref()).await?,
        Commands::Config => commands::config()?,
    }

    Ok(())
}
