use super::{load_rules, load_training_corpus};
use crate::cli::StrategyArg;
use paletteer::config::Config;
use paletteer::error::Error;
use paletteer::report::{self, Renderer};
use paletteer::validation::{Baseline, Strategy, ValidationHarness};
use std::path::Path;

/// Exit code 1 when a baseline is given and any field drifted.
pub(crate) fn run_validate(
    renderer: &Renderer,
    config: &Config,
    strategy: StrategyArg,
    json: bool,
    baseline: Option<&Path>,
    record: Option<&Path>,
) -> Result<i32, Error> {
    let corpus = load_training_corpus(config)?;
    let strategy = match strategy {
        StrategyArg::Rules => Strategy::Frozen(load_rules(config)?),
        StrategyArg::Relearn => Strategy::Relearn(config.learner),
        StrategyArg::Neighbor => Strategy::Neighbor(config.neighbor.clone()),
    };
    let report = ValidationHarness::new(&corpus, config.validation_options()).run(&strategy);

    if json {
        renderer.print(&format!("{}\n", serde_json::to_string_pretty(&report)?));
    } else {
        renderer.print(&report::render_validation(&report, renderer.color()));
    }

    let current = report.baseline();
    if let Some(path) = record {
        let text = serde_json::to_string_pretty(&current)?;
        std::fs::write(path, text).map_err(|e| Error::File(path.to_path_buf(), e))?;
        tracing::info!(path = %path.display(), "recorded baseline");
    }

    let Some(path) = baseline else {
        return Ok(0);
    };
    let text = std::fs::read_to_string(path).map_err(|e| Error::File(path.to_path_buf(), e))?;
    let recorded: Baseline = serde_json::from_str(&text)?;
    if recorded.strategy != current.strategy {
        renderer.warn(&format!(
            "baseline was recorded with `{}`, this run used `{}`",
            recorded.strategy, current.strategy
        ));
    }
    let drift = recorded.compare(&current);
    renderer.print(&report::render_drift(&drift, renderer.color()));
    Ok(if drift.is_empty() { 0 } else { 1 })
}
