//! Gitdown CLI - markdown preprocessor.
//!
//! Resolves `{"gitdown": ...}` directives in a markdown file and writes the
//! result to a file or stdout.

mod error;
mod output;
mod render;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use error::CliError;
use output::Output;
use render::RenderArgs;

fn main() {
    let args = RenderArgs::parse();
    let output = Output::new();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(args.verbose, std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let result = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(CliError::from)
        .and_then(|rt| rt.block_on(args.execute()));

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

/// Build the log filter.
///
/// `--verbose` enables DEBUG for gitdown crates, otherwise `RUST_LOG` applies and
/// an unset or unparsable value falls back to WARN.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    if verbose {
        return EnvFilter::new("gitdown=debug,gitdown_engine=debug,gitdown_helpers=debug");
    }

    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}
