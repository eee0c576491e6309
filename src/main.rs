//! CLI entry point for paletteer.

mod app;
mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = cli::Args::parse();
    init_tracing(args.verbose);
    std::process::exit(app::entry::run(args));
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
