//! `gitdown` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use gitdown_config::{CliSettings, Config};
use gitdown_engine::{Engine, EngineConfig};

use crate::error::CliError;
use crate::output::Output;

/// Gitdown - resolve `{"gitdown": ...}` directives in a markdown file.
#[derive(Parser)]
#[command(name = "gitdown", version, about)]
pub(crate) struct RenderArgs {
    /// Markdown file to process.
    input: PathBuf,

    /// Write the result to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover gitdown.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base directory for relative file resolution (overrides config).
    #[arg(long, env = "GITDOWN_BASE_DIRECTORY")]
    base_directory: Option<PathBuf>,

    /// Maximum number of resolution passes, 0 for no limit (overrides config).
    #[arg(long)]
    max_passes: Option<usize>,

    /// Only validate directives, without running helpers.
    #[arg(long)]
    check: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl RenderArgs {
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            base_directory: self.base_directory.clone(),
            max_passes: self.max_passes,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        tracing::info!(
            input = %self.input.display(),
            base_directory = %config.base_directory.display(),
            "Processing document"
        );

        let markdown = std::fs::read_to_string(&self.input)?;
        let engine = build_engine(&config, self.input.clone());

        if self.check {
            let directives = engine.validate(&markdown)?;
            output.success(&format!(
                "{}: {} directive(s) OK",
                self.input.display(),
                directives.len()
            ));
            return Ok(());
        }

        let resolved = engine.resolve(&markdown).await?;

        if let Some(path) = &self.output {
            std::fs::write(path, &resolved)?;
            tracing::info!(output = %path.display(), "Wrote resolved document");
            output.success(&format!("Written to {}", path.display()));
        } else {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(resolved.as_bytes())?;
            stdout.flush()?;
        }

        Ok(())
    }
}

/// Create an engine with the built-in helpers from loaded configuration.
fn build_engine(config: &Config, source_path: PathBuf) -> Engine {
    let engine_config = EngineConfig::new()
        .with_base_dir(config.base_directory.clone())
        .with_source_path(source_path)
        .with_max_passes(config.engine.pass_limit())
        .with_variables(config.variables_resolved.clone());

    Engine::new(engine_config).with_registry(gitdown_helpers::registry())
}
