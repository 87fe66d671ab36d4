use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    topgames::logging::init().context("init logging")?;

    let cli = topgames::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    // Chapter retrieval and SQLite access are blocking.
    match cli.command {
        topgames::cli::Command::Populate(args) => {
            tokio::task::block_in_place(|| topgames::populate::run(&args)).context("populate")?;
        }
        topgames::cli::Command::Run(args) => {
            tokio::task::block_in_place(|| topgames::populate::run(&args.populate))
                .context("populate")?;
            tracing::info!("launching web ui");
            topgames::server::serve(args.populate.db, args.addr)
                .await
                .context("serve")?;
        }
        topgames::cli::Command::Chapters(args) => {
            tokio::task::block_in_place(|| topgames::inspect::run(&args)).context("chapters")?;
        }
        topgames::cli::Command::Export(args) => {
            tokio::task::block_in_place(|| topgames::export::run(&args)).context("export")?;
        }
    }

    Ok(())
}
