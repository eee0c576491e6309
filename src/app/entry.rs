//! Application entry orchestration for the paletteer CLI.

use crate::app::commands::{inspect, learn, sync, validate};
use crate::cli::{self, Command};
use paletteer::config::{load_config, Config, ConfigSource};
use paletteer::error::Error;
use paletteer::report::Renderer;
use paletteer::sync::{SyncMode, SyncOptions};
use std::io::IsTerminal;

/// Run one CLI invocation and return the process exit code.
pub(crate) fn run(args: cli::Args) -> i32 {
    let color = !args.no_color && std::io::stdout().is_terminal();
    let renderer = Renderer::new(color);

    let loaded = match load_config(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            renderer.error(&e.to_string());
            return 1;
        }
    };
    if loaded.source == ConfigSource::BuiltInDefaults {
        tracing::debug!("no config file found; using defaults");
    }

    match dispatch(&renderer, &loaded.config, &args.command) {
        Ok(code) => code,
        Err(e) => {
            renderer.error(&e.to_string());
            1
        }
    }
}

fn dispatch(renderer: &Renderer, config: &Config, command: &Command) -> Result<i32, Error> {
    match command {
        Command::Generate { dry_run } => sync::run_sync(
            renderer,
            config,
            SyncMode::Generate,
            SyncOptions {
                dry_run: *dry_run,
                force: false,
            },
        ),
        Command::Regenerate { dry_run, force } => sync::run_sync(
            renderer,
            config,
            SyncMode::Regenerate,
            SyncOptions {
                dry_run: *dry_run,
                force: *force,
            },
        ),
        Command::MarkExisting { dry_run } => sync::run_sync(
            renderer,
            config,
            SyncMode::MarkExisting,
            SyncOptions {
                dry_run: *dry_run,
                force: false,
            },
        ),
        Command::Learn { out, json } => learn::run_learn(renderer, config, out.as_deref(), *json),
        Command::Validate {
            strategy,
            json,
            baseline,
            record,
        } => validate::run_validate(
            renderer,
            config,
            *strategy,
            *json,
            baseline.as_deref(),
            record.as_deref(),
        ),
        Command::Analyze => learn::run_analyze(renderer, config),
        Command::Preview { theme } => inspect::run_preview(renderer, config, theme),
        Command::Features { theme } => inspect::run_features(renderer, config, theme),
    }
}
