use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "deepdelta",
    about = "Structural diff, apply and revert for JSON documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with diff settings (order_independent, ignore)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the changes that turn LEFT into RIGHT
    Diff(DiffArgs),
    /// Replay a list of changes onto a document
    Apply(PatchArgs),
    /// Undo a list of changes on a document
    Revert(PatchArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    pub left: PathBuf,
    pub right: PathBuf,
    /// Compare arrays as unordered collections
    #[arg(long)]
    pub order_independent: bool,
    /// Dotted path pattern to skip (repeatable, `*` matches one segment)
    #[arg(long)]
    pub ignore: Vec<String>,
}

#[derive(Args)]
pub struct PatchArgs {
    pub target: PathBuf,
    pub changes: PathBuf,
    /// Write the result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
