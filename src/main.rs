use clap::Parser;
use keydeck::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::List(args) => cli::keys::list(args).await,
        Command::Create(args) => cli::keys::create(args).await,
        Command::Update(args) => cli::keys::update(args).await,
        Command::Delete { id } => cli::keys::delete(id).await,
        Command::Copy { id } => cli::keys::copy(id).await,
        Command::Validate { key } => cli::keys::validate(key).await,
        Command::Watch(args) => cli::watch::run(args).await,
    }
}
