use clap::Parser;
use merchant_client::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Mappings(command) => cli::mappings::run(command).await,
        Command::Merchants(command) => cli::merchants::run(command).await,
    }
}
