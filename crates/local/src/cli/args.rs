pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "polypod-local")]
#[command(about = "Drive a local pod from the terminal")]
pub struct Args {
    /// Path to the polypod directory (defaults to ~/.polypod)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Approve every consent prompt instead of asking
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: crate::Command,
}
