use std::path::PathBuf;

use clap::Parser;

use crate::types::Commands;

#[derive(Parser)]
#[clap(
    name = "quicknote",
    about = "Quick notes with reminders and a weekly report",
    version
)]
pub struct Cli {
    /// Sets a custom config file
    #[clap(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Overrides the note storage file
    #[clap(long, value_name = "FILE")]
    pub storage: Option<PathBuf>,

    /// Enables verbose output
    #[clap(short, long)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Commands,
}
