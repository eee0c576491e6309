use super::load_training_corpus;
use paletteer::config::Config;
use paletteer::error::{Error, RulesError};
use paletteer::learner::{self, RuleLearner};
use paletteer::report::{self, Renderer};
use paletteer::rules::RuleSet;
use std::path::Path;

pub(crate) fn run_learn(
    renderer: &Renderer,
    config: &Config,
    out: Option<&Path>,
    json: bool,
) -> Result<i32, Error> {
    let corpus = load_training_corpus(config)?;
    let learned = RuleLearner::new(config.learner).learn(&corpus);

    if let Some(path) = out {
        let text = serialize_for(&learned.rules, path)?;
        std::fs::write(path, text).map_err(|e| Error::File(path.to_path_buf(), e))?;
        tracing::info!(path = %path.display(), "wrote learned rules");
    }

    if json {
        renderer.print(&format!("{}\n", learned.rules.to_json()?));
    } else {
        renderer.print(&report::render_learned(&learned, renderer.color()));
    }
    Ok(0)
}

pub(crate) fn run_analyze(renderer: &Renderer, config: &Config) -> Result<i32, Error> {
    let corpus = load_training_corpus(config)?;
    let frequencies = learner::slot_frequencies(&corpus, config.learner.acceptance_threshold);
    renderer.print(&report::render_frequencies(&frequencies, renderer.color()));
    Ok(0)
}

/// JSON for `.json` paths, TOML otherwise; matches what `RuleSet::load` reads.
fn serialize_for(rules: &RuleSet, path: &Path) -> Result<String, RulesError> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        rules.to_json()
    } else {
        rules.to_toml()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_selects_format() {
        let rules = RuleSet::builtin();
        let json = serialize_for(&rules, Path::new("rules.JSON")).unwrap();
        assert!(json.trim_start().starts_with('{'));
        let toml = serialize_for(&rules, Path::new("rules.toml")).unwrap();
        assert!(!toml.trim_start().starts_with('{'));
    }
}
