use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::chapters::DEFAULT_CHAPTERS_API;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scrape every registered season into the database (skipped if it exists).
    Populate(PopulateArgs),
    /// Populate, then serve the leaderboard tables.
    Run(RunArgs),
    /// Parse one video's chapters and print the records that match.
    Chapters(ChaptersArgs),
    /// Write the stored entries as a season → player → games JSON tree.
    Export(ExportArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Season registry YAML (default: the built-in registry).
    #[arg(long)]
    pub seasons: Option<PathBuf>,

    /// Base URL of the chapter metadata service.
    #[arg(long, default_value = DEFAULT_CHAPTERS_API)]
    pub chapters_api: String,
}

#[derive(Debug, Clone, Args)]
pub struct PopulateArgs {
    /// SQLite database file.
    #[arg(long, default_value = "lite.db")]
    pub db: PathBuf,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub populate: PopulateArgs,

    /// Address to serve the tables on.
    #[arg(long, default_value = "0.0.0.0:7865")]
    pub addr: SocketAddr,
}

#[derive(Debug, Clone, Args)]
pub struct ChaptersArgs {
    /// Watch URL or video id.
    #[arg(long)]
    pub video: String,

    /// Season whose title rule to apply (default: latest registered).
    #[arg(long)]
    pub season: Option<i32>,

    /// Keep the first and last chapter too.
    #[arg(long)]
    pub all: bool,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// SQLite database file.
    #[arg(long, default_value = "lite.db")]
    pub db: PathBuf,

    /// Output JSON file.
    #[arg(long)]
    pub out: PathBuf,

    /// Overwrite the output if it exists.
    #[arg(long)]
    pub force: bool,
}
