//! polypod-local - a pod driven from the terminal
//!
//! Opens the durable pod kept in the config directory with the terminal as
//! its host: consent prompts are asked on stderr and answered on stdin.

mod cli;
mod host;
mod state;

use clap::Subcommand;
use cli::{
    args::{Args, Parser},
    op::Op,
    Archive, Endpoint, Info, Init, Quads, Query, Update, Version,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

command_enum! {
    (Init, Init),
    (Version, Version),
    (Info, Info),
    (Archive, Archive),
    (Quads, Quads),
    (Query, Query),
    (Update, Update),
    (Endpoint, Endpoint),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing; stdout is reserved for command output
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    let log_level: tracing::Level = args.log_level.parse().unwrap_or(tracing::Level::WARN);
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(non_blocking_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();

    let build = common::version::build_info();
    tracing::debug!(version = build.version, profile = build.build_profile, "starting polypod-local");

    let ctx = cli::op::OpContext::new(args.config_path, args.yes);

    let code = match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };
    // flush buffered logs before exiting
    drop(_guard);
    std::process::exit(code);
}
