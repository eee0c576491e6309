//! Subcommand handlers.

use paletteer::config::Config;
use paletteer::corpus::Corpus;
use paletteer::error::Error;
use paletteer::generator::RuleBasedGenerator;
use paletteer::rules::RuleSet;
use paletteer::store;

/// `preview` and `features`.
pub(crate) mod inspect;
/// `learn` and `analyze`.
pub(crate) mod learn;
/// `generate`, `regenerate` and `mark-existing`.
pub(crate) mod sync;
/// `validate`.
pub(crate) mod validate;

/// The configured rule file, or the built-in rules when none is set.
pub(crate) fn load_rules(config: &Config) -> Result<RuleSet, Error> {
    match &config.corpus.rules {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading rules");
            Ok(RuleSet::load(path)?)
        }
        None => Ok(RuleSet::builtin()),
    }
}

pub(crate) fn load_generator(config: &Config) -> Result<RuleBasedGenerator, Error> {
    load_rules(config).map(RuleBasedGenerator::new)
}

/// Load every readable theme under the configured directory.
pub(crate) fn load_corpus(config: &Config) -> Result<Corpus, Error> {
    let loaded = store::load_corpus(&config.corpus.themes_dir)?;
    if !loaded.warnings.is_empty() {
        tracing::info!(skipped = loaded.warnings.len(), "some themes were not loaded");
    }
    Ok(loaded.corpus)
}

/// The corpus as learning and grading see it.
pub(crate) fn load_training_corpus(config: &Config) -> Result<Corpus, Error> {
    let corpus = load_corpus(config)?;
    if config.corpus.skip_generated {
        tracing::debug!("ignoring generated extended sections as ground truth");
        return Ok(corpus.without_generated_labels());
    }
    Ok(corpus)
}
